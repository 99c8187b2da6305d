use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

/// Opaque bearer token issued by the backend.
///
/// Lives only in memory (zeroized on drop, redacted in Debug); it is never
/// serialized or written to disk.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }

    /// Value for an `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Shared holder for the current bearer credential.
///
/// Clones share the same slot. Writes replace the whole value, so readers
/// observe either the old token or the new one. Last write wins.
#[derive(Clone, Default)]
pub struct CredentialSlot {
    inner: Arc<RwLock<Option<AccessToken>>>,
}

impl CredentialSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held credential; `None` means unauthenticated
    pub fn set(&self, token: Option<AccessToken>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn clear(&self) {
        self.set(None);
    }

    pub fn get(&self) -> Option<AccessToken> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for CredentialSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}
