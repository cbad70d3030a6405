//! In-process bearer token holder.

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::entities::AuthToken;
use crate::domain::ports::TokenProviderPort;

/// Holds the token handed over by the authentication layer.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<AuthToken>>,
}

impl InMemoryTokenStore {
    /// Creates a store, optionally seeded with a token.
    #[must_use]
    pub fn new(token: Option<AuthToken>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    /// Replaces the current token.
    pub fn set(&self, token: AuthToken) {
        debug!(token = %token, "Bearer token updated");
        *self.token.write() = Some(token);
    }
}

impl TokenProviderPort for InMemoryTokenStore {
    fn token(&self) -> Option<AuthToken> {
        self.token.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_seeded_token() {
        let store = InMemoryTokenStore::new(AuthToken::new("first-token"));
        assert_eq!(store.token().unwrap().as_str(), "first-token");

        store.set(AuthToken::new("second-token").unwrap());
        assert_eq!(store.token().unwrap().as_str(), "second-token");
    }

    #[test]
    fn test_empty_store_has_no_token() {
        assert!(InMemoryTokenStore::default().token().is_none());
    }
}
