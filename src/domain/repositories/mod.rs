//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data access
//! operations following the Repository pattern. These traits are implemented by
//! concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - PostgreSQL implementations live in `crate::infrastructure::persistence`
//! - In-memory implementations live in `crate::infrastructure::memory`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`CourseRepository`] - Course CRUD, tree loading and atomic tree saves
//! - [`SectionRepository`] - Section rows
//! - [`ContentRepository`] - Lesson, quiz and assignment rows
//! - [`QuizQuestionRepository`] - Questions of quiz content
//! - [`ProfileRepository`] - User profiles and roles
//! - [`TokenRepository`] - API token authentication
//!
//! Every method returns `Result<_, AppError>`; implementations never swallow
//! storage failures.

pub mod content_repository;
pub mod course_repository;
pub mod profile_repository;
pub mod quiz_question_repository;
pub mod section_repository;
pub mod token_repository;

pub use content_repository::ContentRepository;
pub use course_repository::{CourseCounts, CourseFilter, CourseRepository, CourseSummary};
pub use profile_repository::{ProfileRepository, RoleCounts};
pub use quiz_question_repository::QuizQuestionRepository;
pub use section_repository::SectionRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use content_repository::MockContentRepository;
#[cfg(test)]
pub use course_repository::MockCourseRepository;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
#[cfg(test)]
pub use quiz_question_repository::MockQuizQuestionRepository;
#[cfg(test)]
pub use section_repository::MockSectionRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
