//! Port for the bearer token collaborator.

use crate::domain::entities::AuthToken;

/// Supplies the current bearer token, if signed in.
///
/// Token acquisition and refresh live outside this crate.
pub trait TokenProviderPort: Send + Sync {
    /// Returns the token to attach to requests.
    fn token(&self) -> Option<AuthToken>;
}
