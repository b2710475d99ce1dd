use tokio::sync::watch;

use crate::{
    credential::storage::{CredentialStorage, StorageError},
    domain::models::Credential,
};

/// Owns the operator's credential and publishes every change.
///
/// The value is read from storage once, in [`CredentialStore::load`], and is
/// written back synchronously on each [`CredentialStore::set`].
pub struct CredentialStore {
    storage: Box<dyn CredentialStorage>,
    current: watch::Sender<Option<Credential>>,
}

impl CredentialStore {
    pub fn load(storage: impl CredentialStorage + 'static) -> Result<Self, StorageError> {
        let initial = storage.load()?.map(Credential::new);
        tracing::debug!(has_credential = initial.is_some(), "Credential loaded");

        let (current, _) = watch::channel(initial);
        Ok(CredentialStore {
            storage: Box::new(storage),
            current,
        })
    }

    pub fn get(&self) -> Option<Credential> {
        self.current.borrow().clone()
    }

    /// Persists and publishes `value`. Returns `false` when it equals the
    /// current credential, in which case subscribers are not notified.
    pub fn set(&self, value: impl Into<String>) -> Result<bool, StorageError> {
        let value = value.into();
        self.storage.save(&value)?;

        let credential = Credential::new(value);
        let changed = self.current.send_if_modified(|current| {
            if current.as_ref() == Some(&credential) {
                return false;
            }
            *current = Some(credential);
            true
        });

        tracing::info!(changed, "Credential updated");
        Ok(changed)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.current.subscribe()
    }
}
