//! PostgreSQL implementation of course repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;

use super::rows::{
    COURSE_COLUMNS, CONTENT_COLUMNS, ContentRow, CourseRow, CourseSummaryRow, SECTION_COLUMNS,
    SectionRow, convert_all,
};
use crate::domain::draft::CourseFields;
use crate::domain::entities::{Course, CoursePatch, CourseTree, NewCourse};
use crate::domain::reconcile::{
    CourseWrite, LessonRow, LessonWrite, SaveOutcome, SavePlan, SectionWrite,
};
use crate::domain::repositories::{CourseCounts, CourseFilter, CourseRepository, CourseSummary};
use crate::error::AppError;

/// PostgreSQL repository for courses and course trees.
///
/// Tree saves run inside a single transaction; any failed statement rolls
/// back every write of the save.
pub struct PgCourseRepository {
    pool: Arc<PgPool>,
}

impl PgCourseRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for PgCourseRepository {
    async fn list(&self, filter: CourseFilter) -> Result<Vec<CourseSummary>, AppError> {
        let sql = r#"
            SELECT c.id, c.name, COALESCE(c.description, '') AS description,
                   c.instructor_id, c.status, c.enrollment_fee, c.created_at, c.updated_at,
                   (SELECT COUNT(*) FROM course_sections s WHERE s.course_id = c.id) AS section_count
            FROM courses c
            WHERE ($1::text IS NULL OR c.status = $1)
              AND ($2::bigint IS NULL OR c.instructor_id = $2)
            ORDER BY c.created_at DESC, c.id DESC
            "#;

        let rows: Vec<CourseSummaryRow> = sqlx::query_as(sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.instructor_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CourseSummary {
                    section_count: row.section_count,
                    course: Course::try_from(row.course)?,
                })
            })
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, AppError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        let row: Option<CourseRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Course::try_from).transpose()
    }

    async fn find_tree(&self, id: i64) -> Result<Option<CourseTree>, AppError> {
        let Some(course) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let sections_sql = format!(
            "SELECT {SECTION_COLUMNS} FROM course_sections WHERE course_id = $1 \
             ORDER BY order_index, id"
        );
        let sections: Vec<SectionRow> = sqlx::query_as(&sections_sql)
            .bind(id)
            .fetch_all(self.pool.as_ref())
            .await?;

        let content_sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM course_content \
             WHERE section_id IN (SELECT id FROM course_sections WHERE course_id = $1) \
             ORDER BY order_index, id"
        );
        let content: Vec<ContentRow> = sqlx::query_as(&content_sql)
            .bind(id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(Some(CourseTree::assemble(
            course,
            sections.into_iter().map(Into::into).collect(),
            convert_all(content)?,
        )))
    }

    async fn create(&self, new_course: NewCourse) -> Result<Course, AppError> {
        let sql = format!(
            "INSERT INTO courses (name, description, instructor_id, status, enrollment_fee) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COURSE_COLUMNS}"
        );
        let row: CourseRow = sqlx::query_as(&sql)
            .bind(&new_course.title)
            .bind(&new_course.description)
            .bind(new_course.instructor_id)
            .bind(new_course.status.as_str())
            .bind(new_course.enrollment_fee)
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn update(&self, id: i64, patch: CoursePatch) -> Result<Course, AppError> {
        let sql = format!(
            r#"
            UPDATE courses
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                instructor_id = CASE WHEN $4 THEN $5 ELSE instructor_id END,
                status = COALESCE($6, status),
                enrollment_fee = COALESCE($7, enrollment_fee),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        );
        let row: Option<CourseRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.description.as_deref())
            .bind(patch.instructor_id.is_some())
            .bind(patch.instructor_id.flatten())
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.enrollment_fee)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.ok_or_else(|| course_not_found(id))?.try_into()
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(course_not_found(id));
        }

        Ok(())
    }

    async fn save_tree(&self, plan: &SavePlan) -> Result<SaveOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let course_id = match &plan.course {
            CourseWrite::Insert(fields) => insert_course(&mut tx, fields).await?,
            CourseWrite::Update { id, fields } => update_course(&mut tx, *id, fields).await?,
        };

        for lesson_id in &plan.deleted_lessons {
            sqlx::query(
                r#"
                DELETE FROM course_content
                WHERE id = $1
                  AND section_id IN (SELECT id FROM course_sections WHERE course_id = $2)
                "#,
            )
            .bind(lesson_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;
        }

        for section_id in &plan.deleted_sections {
            sqlx::query("DELETE FROM course_sections WHERE id = $1 AND course_id = $2")
                .bind(section_id)
                .bind(course_id)
                .execute(&mut *tx)
                .await?;
        }

        let mut outcome = SaveOutcome {
            course_id,
            ..Default::default()
        };

        for step in &plan.steps {
            let row = step.section.row();
            let section_id = match &step.section {
                SectionWrite::Insert { local_id, .. } => {
                    let id: i64 = sqlx::query_scalar(
                        r#"
                        INSERT INTO course_sections (course_id, title, description, order_index)
                        VALUES ($1, $2, $3, $4)
                        RETURNING id
                        "#,
                    )
                    .bind(course_id)
                    .bind(&row.title)
                    .bind(row.description.as_deref())
                    .bind(row.order)
                    .fetch_one(&mut *tx)
                    .await?;
                    outcome.sections.insert(*local_id, id);
                    id
                }
                SectionWrite::Update { id, .. } => {
                    let updated: Option<i64> = sqlx::query_scalar(
                        r#"
                        UPDATE course_sections
                        SET title = $3, description = $4, order_index = $5, updated_at = NOW()
                        WHERE id = $1 AND course_id = $2
                        RETURNING id
                        "#,
                    )
                    .bind(id)
                    .bind(course_id)
                    .bind(&row.title)
                    .bind(row.description.as_deref())
                    .bind(row.order)
                    .fetch_optional(&mut *tx)
                    .await?;
                    updated.ok_or_else(|| {
                        AppError::not_found("Section not found", json!({ "section_id": id }))
                    })?
                }
            };

            for lesson in &step.lessons {
                match lesson {
                    LessonWrite::Insert { local_id, row } => {
                        let id = insert_lesson(&mut tx, section_id, row).await?;
                        outcome.lessons.insert(*local_id, id);
                    }
                    LessonWrite::Update { id, row } => {
                        update_lesson(&mut tx, section_id, *id, row).await?;
                    }
                }
            }
        }

        tx.commit().await?;

        tracing::debug!(
            course_id,
            sections_created = outcome.sections.len(),
            lessons_created = outcome.lessons.len(),
            "Course tree committed"
        );

        Ok(outcome)
    }

    async fn counts(&self) -> Result<CourseCounts, AppError> {
        let (total, published, draft): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'published'),
                   COUNT(*) FILTER (WHERE status = 'draft')
            FROM courses
            "#,
        )
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(CourseCounts {
            total,
            published,
            draft,
        })
    }
}

fn course_not_found(id: i64) -> AppError {
    AppError::not_found("Course not found", json!({ "course_id": id }))
}

async fn insert_course(
    tx: &mut Transaction<'_, Postgres>,
    fields: &CourseFields,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO courses (name, description, instructor_id, status, enrollment_fee)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.instructor_id)
    .bind(fields.status.as_str())
    .bind(fields.enrollment_fee)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

async fn update_course(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
    fields: &CourseFields,
) -> Result<i64, AppError> {
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE courses
        SET name = $2, description = $3, instructor_id = $4, status = $5,
            enrollment_fee = $6, updated_at = NOW()
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(fields.instructor_id)
    .bind(fields.status.as_str())
    .bind(fields.enrollment_fee)
    .fetch_optional(&mut **tx)
    .await?;

    updated.ok_or_else(|| course_not_found(id))
}

async fn insert_lesson(
    tx: &mut Transaction<'_, Postgres>,
    section_id: i64,
    row: &LessonRow,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO course_content
            (section_id, title, content, type, order_index, is_free, video_url, duration_minutes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(section_id)
    .bind(&row.title)
    .bind(&row.body)
    .bind(row.content_type.as_str())
    .bind(row.order)
    .bind(row.is_free)
    .bind(row.video_url.as_deref())
    .bind(row.duration_minutes)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

async fn update_lesson(
    tx: &mut Transaction<'_, Postgres>,
    section_id: i64,
    id: i64,
    row: &LessonRow,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE course_content
        SET title = $3, content = $4, type = $5, order_index = $6, is_free = $7,
            video_url = $8, duration_minutes = $9, updated_at = NOW()
        WHERE id = $1 AND section_id = $2
        "#,
    )
    .bind(id)
    .bind(section_id)
    .bind(&row.title)
    .bind(&row.body)
    .bind(row.content_type.as_str())
    .bind(row.order)
    .bind(row.is_free)
    .bind(row.video_url.as_deref())
    .bind(row.duration_minutes)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(
            "Lesson not found",
            json!({ "content_id": id, "section_id": section_id }),
        ));
    }

    Ok(())
}
