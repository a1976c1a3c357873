//! PostgreSQL implementation of quiz question repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use super::rows::{QUESTION_COLUMNS, QuestionRow, convert_all};
use crate::domain::entities::{NewQuizQuestion, QuizQuestion, QuizQuestionPatch};
use crate::domain::repositories::QuizQuestionRepository;
use crate::error::AppError;

/// Options are stored as a JSONB array of strings.
pub struct PgQuizQuestionRepository {
    pool: Arc<PgPool>,
}

impl PgQuizQuestionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn question_not_found(id: i64) -> AppError {
    AppError::not_found("Question not found", json!({ "question_id": id }))
}

#[async_trait]
impl QuizQuestionRepository for PgQuizQuestionRepository {
    async fn list_by_content(&self, content_id: i64) -> Result<Vec<QuizQuestion>, AppError> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE content_id = $1 \
             ORDER BY order_index, id"
        );
        let rows: Vec<QuestionRow> = sqlx::query_as(&sql)
            .bind(content_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        convert_all(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<QuizQuestion>, AppError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE id = $1");
        let row: Option<QuestionRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(QuizQuestion::try_from).transpose()
    }

    async fn create(&self, new_question: NewQuizQuestion) -> Result<QuizQuestion, AppError> {
        let sql = format!(
            "INSERT INTO quiz_questions \
                 (content_id, question, question_type, options, correct_answer, explanation, points, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {QUESTION_COLUMNS}"
        );
        let row: QuestionRow = sqlx::query_as(&sql)
            .bind(new_question.content_id)
            .bind(&new_question.question)
            .bind(new_question.question_type.as_str())
            .bind(Json(&new_question.options))
            .bind(&new_question.correct_answer)
            .bind(new_question.explanation.as_deref())
            .bind(new_question.points)
            .bind(new_question.order)
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn update(&self, id: i64, patch: QuizQuestionPatch) -> Result<QuizQuestion, AppError> {
        let sql = format!(
            r#"
            UPDATE quiz_questions
            SET question = COALESCE($2, question),
                question_type = COALESCE($3, question_type),
                options = COALESCE($4, options),
                correct_answer = COALESCE($5, correct_answer),
                explanation = CASE WHEN $6 THEN $7 ELSE explanation END,
                points = COALESCE($8, points),
                order_index = COALESCE($9, order_index)
            WHERE id = $1
            RETURNING {QUESTION_COLUMNS}
            "#
        );
        let row: Option<QuestionRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.question.as_deref())
            .bind(patch.question_type.map(|t| t.as_str()))
            .bind(patch.options.as_ref().map(Json))
            .bind(patch.correct_answer.as_deref())
            .bind(patch.explanation.is_some())
            .bind(patch.explanation.clone().flatten())
            .bind(patch.points)
            .bind(patch.order)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| question_not_found(id))?.try_into()
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM quiz_questions WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(question_not_found(id));
        }

        Ok(())
    }
}
