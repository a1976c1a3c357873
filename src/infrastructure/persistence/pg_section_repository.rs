//! PostgreSQL implementation of section repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{SECTION_COLUMNS, SectionRow};
use crate::domain::entities::{NewSection, Section, SectionPatch};
use crate::domain::repositories::SectionRepository;
use crate::error::AppError;

pub struct PgSectionRepository {
    pool: Arc<PgPool>,
}

impl PgSectionRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn section_not_found(id: i64) -> AppError {
    AppError::not_found("Section not found", json!({ "section_id": id }))
}

#[async_trait]
impl SectionRepository for PgSectionRepository {
    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Section>, AppError> {
        let sql = format!(
            "SELECT {SECTION_COLUMNS} FROM course_sections WHERE course_id = $1 \
             ORDER BY order_index, id"
        );
        let rows: Vec<SectionRow> = sqlx::query_as(&sql)
            .bind(course_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Section>, AppError> {
        let sql = format!("SELECT {SECTION_COLUMNS} FROM course_sections WHERE id = $1");
        let row: Option<SectionRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, new_section: NewSection) -> Result<Section, AppError> {
        let sql = format!(
            "INSERT INTO course_sections (course_id, title, description, order_index) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SECTION_COLUMNS}"
        );
        let row: SectionRow = sqlx::query_as(&sql)
            .bind(new_section.course_id)
            .bind(&new_section.title)
            .bind(new_section.description.as_deref())
            .bind(new_section.order)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, patch: SectionPatch) -> Result<Section, AppError> {
        let sql = format!(
            r#"
            UPDATE course_sections
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                order_index = COALESCE($5, order_index),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SECTION_COLUMNS}
            "#
        );
        let row: Option<SectionRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.description.is_some())
            .bind(patch.description.flatten())
            .bind(patch.order)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Into::into).ok_or_else(|| section_not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM course_sections WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(section_not_found(id));
        }

        Ok(())
    }
}
