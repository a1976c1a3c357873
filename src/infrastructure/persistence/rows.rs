//! Row types decoded from PostgreSQL and their conversions into entities.
//!
//! Enum columns are stored as `TEXT`; an unrecognised value surfaces as an
//! internal error instead of a panic.

use chrono::{DateTime, Utc};
use sqlx::types::Json;

use crate::domain::entities::{Content, Course, Profile, QuizQuestion, Section};
use crate::domain::repositories::ApiToken;
use crate::error::AppError;

/// Column list shared by every course query.
pub(crate) const COURSE_COLUMNS: &str = "id, name, COALESCE(description, '') AS description, \
     instructor_id, status, enrollment_fee, created_at, updated_at";

pub(crate) const SECTION_COLUMNS: &str =
    "id, course_id, title, description, order_index, created_at, updated_at";

pub(crate) const CONTENT_COLUMNS: &str = "id, section_id, title, content, type, order_index, \
     is_free, video_url, duration_minutes, created_at, updated_at";

pub(crate) const QUESTION_COLUMNS: &str = "id, content_id, question, question_type, options, \
     correct_answer, explanation, points, order_index, created_at";

pub(crate) const PROFILE_COLUMNS: &str = "id, email, name, role, created_at";

pub(crate) const TOKEN_COLUMNS: &str =
    "id, profile_id, name, token_hash, created_at, last_used_at, revoked_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CourseRow {
    id: i64,
    name: String,
    description: String,
    instructor_id: Option<i64>,
    status: String,
    enrollment_fee: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = AppError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            id: row.id,
            title: row.name,
            description: row.description,
            instructor_id: row.instructor_id,
            status: row.status.parse()?,
            enrollment_fee: row.enrollment_fee,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A course row joined with its section count.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CourseSummaryRow {
    #[sqlx(flatten)]
    pub course: CourseRow,
    pub section_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SectionRow {
    id: i64,
    course_id: i64,
    title: String,
    description: Option<String>,
    order_index: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SectionRow> for Section {
    fn from(row: SectionRow) -> Self {
        Section {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            description: row.description,
            order: row.order_index,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ContentRow {
    id: i64,
    section_id: i64,
    title: String,
    content: String,
    #[sqlx(rename = "type")]
    content_type: String,
    order_index: i32,
    is_free: bool,
    video_url: Option<String>,
    duration_minutes: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for Content {
    type Error = AppError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        Ok(Content {
            id: row.id,
            section_id: row.section_id,
            title: row.title,
            body: row.content,
            content_type: row.content_type.parse()?,
            order: row.order_index,
            is_free: row.is_free,
            video_url: row.video_url,
            duration_minutes: row.duration_minutes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionRow {
    id: i64,
    content_id: i64,
    question: String,
    question_type: String,
    options: Json<Vec<String>>,
    correct_answer: String,
    explanation: Option<String>,
    points: i32,
    order_index: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for QuizQuestion {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(QuizQuestion {
            id: row.id,
            content_id: row.content_id,
            question: row.question,
            question_type: row.question_type.parse()?,
            options: row.options.0,
            correct_answer: row.correct_answer,
            explanation: row.explanation,
            points: row.points,
            order: row.order_index,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProfileRow {
    id: i64,
    email: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            email: row.email,
            name: row.name,
            role: row.role.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TokenRow {
    id: i64,
    profile_id: i64,
    name: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<TokenRow> for ApiToken {
    fn from(row: TokenRow) -> Self {
        ApiToken {
            id: row.id,
            profile_id: row.profile_id,
            name: row.name,
            token_hash: row.token_hash,
            created_at: row.created_at,
            last_used_at: row.last_used_at,
            revoked_at: row.revoked_at,
        }
    }
}

/// Converts a batch of rows, failing on the first bad one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}
