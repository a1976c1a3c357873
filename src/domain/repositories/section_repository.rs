//! Repository trait for course sections.

use crate::domain::entities::{NewSection, Section, SectionPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for section rows.
///
/// The `order` field maps to the `order_index` column. Listings are sorted
/// by order, then id.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSectionRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemorySectionRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SectionRepository: Send + Sync {
    /// Lists the sections of a course.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Section>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Section>, AppError>;

    /// Creates a section row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the course does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_section: NewSection) -> Result<Section, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the section does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, patch: SectionPatch) -> Result<Section, AppError>;

    /// Deletes a section and, by cascade, its content.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the section does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
