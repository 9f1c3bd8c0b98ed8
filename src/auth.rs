//! Credential storage for mutating store calls.
//!
//! Token acquisition (login, refresh) lives outside this crate; the core only
//! needs to know whether a bearer token is currently available. Reads against
//! the store are unauthenticated, mutations are not.

use crate::error::ExplorerError;
use parking_lot::RwLock;

/// Holds the optional bearer token shared by all store clients.
#[derive(Debug, Default)]
pub struct CredentialStore {
    token: RwLock<Option<String>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Token for a mutating call; absent credential is an `Auth` failure.
    pub fn require_token(&self) -> Result<String, ExplorerError> {
        self.token()
            .ok_or_else(|| ExplorerError::Auth("no credential available".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_token_without_credential_fails() {
        let store = CredentialStore::new();
        assert!(matches!(
            store.require_token(),
            Err(ExplorerError::Auth(_))
        ));
    }

    #[test]
    fn test_set_and_clear() {
        let store = CredentialStore::new();
        store.set_token("t0ken");
        assert_eq!(store.require_token().unwrap(), "t0ken");
        store.clear();
        assert!(store.token().is_none());
    }
}
