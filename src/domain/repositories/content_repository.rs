//! Repository trait for section content (lessons, quizzes, assignments).

use crate::domain::entities::{Content, ContentPatch, NewContent};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for content rows.
///
/// `body` maps to the `content` column and `content_type` to `type`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgContentRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryContentRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Lists the content of a section, sorted by order then id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_section(&self, section_id: i64) -> Result<Vec<Content>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Content>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the section does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_content: NewContent) -> Result<Content, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the content does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, patch: ContentPatch) -> Result<Content, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the content does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
