//! Repository trait for courses and whole course trees.

use crate::domain::entities::{Course, CoursePatch, CourseStatus, CourseTree, NewCourse};
use crate::domain::reconcile::{SaveOutcome, SavePlan};
use crate::error::AppError;
use async_trait::async_trait;
use serde::Serialize;

/// Filter for course listings. `None` fields do not restrict the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CourseFilter {
    pub status: Option<CourseStatus>,
    pub instructor_id: Option<i64>,
}

impl CourseFilter {
    pub fn published() -> Self {
        Self {
            status: Some(CourseStatus::Published),
            instructor_id: None,
        }
    }

    pub fn by_instructor(instructor_id: i64) -> Self {
        Self {
            status: None,
            instructor_id: Some(instructor_id),
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.status.is_none_or(|s| s == course.status)
            && self
                .instructor_id
                .is_none_or(|i| course.instructor_id == Some(i))
    }
}

/// A course with the number of its sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    pub section_count: i64,
}

/// Course totals by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CourseCounts {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
}

/// Repository interface for courses.
///
/// Course rows map `title` to the `name` column and `instructor_id` to
/// `instructor_id`. Listings are newest first.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCourseRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryCourseRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_course.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Lists courses matching `filter`, newest first, with section counts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, filter: CourseFilter) -> Result<Vec<CourseSummary>, AppError>;

    /// Finds a course row without its sections.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, AppError>;

    /// Loads a course with all sections and content, ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_tree(&self, id: i64) -> Result<Option<CourseTree>, AppError>;

    /// Creates a course row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the instructor does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_course: NewCourse) -> Result<Course, AppError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the course does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, patch: CoursePatch) -> Result<Course, AppError>;

    /// Deletes a course together with its sections, content and questions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the course does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Executes a save plan as one atomic unit.
    ///
    /// Either every write in the plan is applied or none is.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the plan updates a course, section
    /// or lesson that no longer exists, or references a section of another
    /// course. Returns [`AppError::Internal`] on database errors.
    async fn save_tree(&self, plan: &SavePlan) -> Result<SaveOutcome, AppError>;

    /// Counts courses by status.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn counts(&self) -> Result<CourseCounts, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn course(status: CourseStatus, instructor_id: Option<i64>) -> Course {
        let now = Utc::now();
        Course {
            id: 1,
            title: "C".to_string(),
            description: String::new(),
            instructor_id,
            status,
            enrollment_fee: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_filter_matches() {
        let published = course(CourseStatus::Published, Some(3));
        let draft = course(CourseStatus::Draft, None);

        assert!(CourseFilter::default().matches(&published));
        assert!(CourseFilter::published().matches(&published));
        assert!(!CourseFilter::published().matches(&draft));
        assert!(CourseFilter::by_instructor(3).matches(&published));
        assert!(!CourseFilter::by_instructor(3).matches(&draft));
    }
}
