//! Repository trait for quiz questions.

use crate::domain::entities::{NewQuizQuestion, QuizQuestion, QuizQuestionPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for questions attached to quiz content.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgQuizQuestionRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryQuizQuestionRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizQuestionRepository: Send + Sync {
    /// Lists the questions of a content item, sorted by order then id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_content(&self, content_id: i64) -> Result<Vec<QuizQuestion>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<QuizQuestion>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the content does not exist.
    async fn create(&self, new_question: NewQuizQuestion) -> Result<QuizQuestion, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the question does not exist.
    async fn update(&self, id: i64, patch: QuizQuestionPatch) -> Result<QuizQuestion, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the question does not exist.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
