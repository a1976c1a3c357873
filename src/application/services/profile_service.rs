//! Profile administration.

use serde_json::json;
use std::sync::Arc;

use crate::application::access::ensure_admin;
use crate::domain::entities::{NewProfile, Profile, Role};
use crate::domain::repositories::ProfileRepository;
use crate::error::AppError;

pub struct ProfileService<P: ProfileRepository + ?Sized = dyn ProfileRepository> {
    profiles: Arc<P>,
}

impl<P: ProfileRepository + ?Sized> ProfileService<P> {
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }

    pub async fn list(&self, actor: &Profile, role: Option<Role>) -> Result<Vec<Profile>, AppError> {
        ensure_admin(actor)?;
        self.profiles.list(role).await
    }

    /// Registers a profile. Emails are stored trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless `actor` is an admin.
    /// Returns [`AppError::Conflict`] if the email is already registered.
    pub async fn create(
        &self,
        actor: &Profile,
        mut new_profile: NewProfile,
    ) -> Result<Profile, AppError> {
        ensure_admin(actor)?;

        new_profile.email = normalize_email(&new_profile.email);
        new_profile.name = new_profile.name.trim().to_string();

        let profile = self.profiles.create(new_profile).await?;

        tracing::info!(
            profile_id = profile.id,
            role = %profile.role,
            actor_id = actor.id,
            "Profile created"
        );

        Ok(profile)
    }

    /// Changes a profile's role. Admins cannot change their own role.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless `actor` is an admin.
    /// Returns [`AppError::Validation`] when `id` is the caller.
    /// Returns [`AppError::NotFound`] if the profile does not exist.
    pub async fn update_role(&self, actor: &Profile, id: i64, role: Role) -> Result<Profile, AppError> {
        ensure_admin(actor)?;

        if actor.id == id {
            return Err(AppError::bad_request(
                "Cannot change your own role",
                json!({ "profile_id": id }),
            ));
        }

        let profile = self.profiles.update_role(id, role).await?;

        tracing::info!(profile_id = id, role = %role, actor_id = actor.id, "Profile role changed");

        Ok(profile)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
