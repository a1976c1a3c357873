//! PostgreSQL implementation of content repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{CONTENT_COLUMNS, ContentRow, convert_all};
use crate::domain::entities::{Content, ContentPatch, NewContent};
use crate::domain::repositories::ContentRepository;
use crate::error::AppError;

pub struct PgContentRepository {
    pool: Arc<PgPool>,
}

impl PgContentRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn content_not_found(id: i64) -> AppError {
    AppError::not_found("Content not found", json!({ "content_id": id }))
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn list_by_section(&self, section_id: i64) -> Result<Vec<Content>, AppError> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM course_content WHERE section_id = $1 \
             ORDER BY order_index, id"
        );
        let rows: Vec<ContentRow> = sqlx::query_as(&sql)
            .bind(section_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        convert_all(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Content>, AppError> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM course_content WHERE id = $1");
        let row: Option<ContentRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Content::try_from).transpose()
    }

    async fn create(&self, new_content: NewContent) -> Result<Content, AppError> {
        let sql = format!(
            "INSERT INTO course_content \
                 (section_id, title, content, type, order_index, is_free, video_url, duration_minutes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {CONTENT_COLUMNS}"
        );
        let row: ContentRow = sqlx::query_as(&sql)
            .bind(new_content.section_id)
            .bind(&new_content.title)
            .bind(&new_content.body)
            .bind(new_content.content_type.as_str())
            .bind(new_content.order)
            .bind(new_content.is_free)
            .bind(new_content.video_url.as_deref())
            .bind(new_content.duration_minutes)
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn update(&self, id: i64, patch: ContentPatch) -> Result<Content, AppError> {
        let sql = format!(
            r#"
            UPDATE course_content
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                type = COALESCE($4, type),
                order_index = COALESCE($5, order_index),
                is_free = COALESCE($6, is_free),
                video_url = CASE WHEN $7 THEN $8 ELSE video_url END,
                duration_minutes = CASE WHEN $9 THEN $10 ELSE duration_minutes END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CONTENT_COLUMNS}
            "#
        );
        let row: Option<ContentRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.body.as_deref())
            .bind(patch.content_type.map(|t| t.as_str()))
            .bind(patch.order)
            .bind(patch.is_free)
            .bind(patch.video_url.is_some())
            .bind(patch.video_url.clone().flatten())
            .bind(patch.duration_minutes.is_some())
            .bind(patch.duration_minutes.flatten())
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| content_not_found(id))?.try_into()
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM course_content WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(content_not_found(id));
        }

        Ok(())
    }
}
