use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const URL_SCHEMES: &[&str] = &["http://", "https://"];

/// One managed short link as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenedUrl {
    pub short_url: String, // always starts with '/'
    pub target_url: String,
    #[serde(default)]
    pub comment: String,
}

/// Opaque bearer string sent with every API call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Destination URL is required")]
    MissingTargetUrl,
}

/// Body of `POST /api/url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShortenedUrl {
    pub short_url: String,
    pub target_url: String,
    pub comment: String,
}

impl NewShortenedUrl {
    /// Normalizes form input into the body the backend expects.
    ///
    /// The short path always gains a leading `/` (an empty input becomes `/`),
    /// and a destination without a scheme is sent as `https://`.
    pub fn new(short_path: &str, target_url: &str, comment: &str) -> Result<Self, InputError> {
        let target_url = target_url.trim();
        if target_url.is_empty() {
            return Err(InputError::MissingTargetUrl);
        }

        Ok(Self {
            short_url: normalize_short_path(short_path.trim()),
            target_url: normalize_target_url(target_url),
            comment: comment.to_string(),
        })
    }
}

/// Body of `DELETE /api/url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteShortenedUrl {
    pub short_url: String,
}

pub fn normalize_short_path(short_path: &str) -> String {
    if short_path.starts_with('/') {
        short_path.to_string()
    } else {
        format!("/{short_path}")
    }
}

pub fn normalize_target_url(target_url: &str) -> String {
    let lower = target_url.to_ascii_lowercase();
    if URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        target_url.to_string()
    } else {
        format!("https://{target_url}")
    }
}
