//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries
//! are checked at runtime and decoded through private row types.
//!
//! # Repositories
//!
//! - [`PgCourseRepository`] - Courses, course trees and transactional tree saves
//! - [`PgSectionRepository`] - Section rows
//! - [`PgContentRepository`] - Lesson, quiz and assignment rows
//! - [`PgQuizQuestionRepository`] - Quiz questions
//! - [`PgProfileRepository`] - User profiles
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_content_repository;
pub mod pg_course_repository;
pub mod pg_profile_repository;
pub mod pg_quiz_question_repository;
pub mod pg_section_repository;
pub mod pg_token_repository;
mod rows;

pub use pg_content_repository::PgContentRepository;
pub use pg_course_repository::PgCourseRepository;
pub use pg_profile_repository::PgProfileRepository;
pub use pg_quiz_question_repository::PgQuizQuestionRepository;
pub use pg_section_repository::PgSectionRepository;
pub use pg_token_repository::PgTokenRepository;
