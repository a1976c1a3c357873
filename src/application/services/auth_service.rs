//! Authentication service for API token validation.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::Profile;
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use crate::utils::token::hash_token;

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before
/// comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<R: TokenRepository + ?Sized = dyn TokenRepository> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when tokens were issued.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Resolves a raw bearer token to the profile that owns it.
    ///
    /// On success the token's `last_used_at` is refreshed; a failure to do
    /// so is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<Profile, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let Some(profile) = self.repository.find_profile_by_hash(&token_hash).await? else {
            metrics::counter!("auth_failures_total").increment(1);
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            tracing::warn!(profile_id = profile.id, error = %e, "Failed to record token usage");
        }

        Ok(profile)
    }
}
