use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;

use crate::credential::config::Config;

const APP_DIR: &str = "short-url-admin";
const CREDENTIAL_FILE: &str = "credential";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read credential from {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write credential to {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("No configuration directory available; set CREDENTIAL_PATH")]
    NoConfigDir,
}

/// Durable client-local storage for a single credential string.
pub trait CredentialStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, value: &str) -> Result<(), StorageError>;
}

/// Keeps the credential as a plain string in a file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        let path = match &config.path {
            Some(path) => PathBuf::from(path),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR).join(CREDENTIAL_FILE))
                .ok_or(StorageError::NoConfigDir)?,
        };
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.trim_end_matches(['\r', '\n']).to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, value: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| self.write_error(e))?;
        // mode only applies on creation; tighten files that already existed
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| self.write_error(e))?;
        }
        file.write_all(value.as_bytes())
            .map_err(|e| self.write_error(e))
    }
}

/// In-process storage; clones share the same slot, which lets tests
/// simulate a reload by building a second store over a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    value: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        MemoryStorage {
            value: Arc::new(Mutex::new(Some(value.into()))),
        }
    }
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, value: &str) -> Result<(), StorageError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("credential"));

        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn file_round_trip_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("credential"));

        storage.save("abc").unwrap();

        assert_eq!(storage.load().unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn trailing_newline_from_hand_edits_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential");
        fs::write(&path, "abc\n").unwrap();

        assert_eq!(
            FileStorage::new(path).load().unwrap().as_deref(),
            Some("abc")
        );
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("credential"));
        storage.save("abc").unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_readable_file_is_tightened_before_writing() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileStorage::new(path);
        storage.save("new").unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(storage.load().unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn explicit_path_wins_over_config_dir() {
        let storage = FileStorage::from_config(&Config {
            path: Some("/tmp/short-url-admin-test/credential".to_string()),
        })
        .unwrap();

        assert_eq!(
            storage.path(),
            Path::new("/tmp/short-url-admin-test/credential")
        );
    }

    #[test]
    fn memory_clones_share_the_slot() {
        let storage = MemoryStorage::new();
        let reloaded = storage.clone();

        storage.save("abc").unwrap();

        assert_eq!(reloaded.load().unwrap().as_deref(), Some("abc"));
    }
}
