//! Shared-secret bearer authorization for the cron endpoints.

use secrecy::{ExposeSecret, SecretString};

/// Exact-equality token check. Must run before any external call so a
/// rejected request has no side effects.
pub fn token_matches(presented: Option<&str>, secret: &SecretString) -> bool {
    presented == Some(secret.expose_secret())
}
