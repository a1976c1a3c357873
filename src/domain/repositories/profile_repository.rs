//! Repository trait for user profiles.

use crate::domain::entities::{NewProfile, Profile, Role};
use crate::error::AppError;
use async_trait::async_trait;
use serde::Serialize;

/// Profile totals by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoleCounts {
    pub admin: i64,
    pub staff: i64,
    pub student: i64,
}

impl RoleCounts {
    pub fn total(&self) -> i64 {
        self.admin + self.staff + self.student
    }

    pub fn add(&mut self, role: Role, count: i64) {
        match role {
            Role::Admin => self.admin += count,
            Role::Staff => self.staff += count,
            Role::Student => self.student += count,
        }
    }
}

/// Repository interface for profiles.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgProfileRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryProfileRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_profile.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Creates a profile.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_profile: NewProfile) -> Result<Profile, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Profile>, AppError>;

    /// Email lookup is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError>;

    /// Lists profiles ordered by id, optionally restricted to one role.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, role: Option<Role>) -> Result<Vec<Profile>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the profile does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_role(&self, id: i64, role: Role) -> Result<Profile, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_by_role(&self) -> Result<RoleCounts, AppError>;
}
