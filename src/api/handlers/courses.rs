//! Handlers for course endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::course::{
    CourseListQuery, CreateCourseRequest, ListResponse, UpdateCourseRequest,
};
use crate::domain::entities::{Course, CourseTree, Profile};
use crate::domain::repositories::{CourseFilter, CourseSummary};
use crate::error::AppError;
use crate::state::AppState;

/// Lists courses with their section counts, newest first.
///
/// # Endpoint
///
/// `GET /api/courses?status=published&instructor_id=3`
///
/// Students only ever receive published courses.
pub async fn course_list_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Query(query): Query<CourseListQuery>,
) -> Result<Json<ListResponse<CourseSummary>>, AppError> {
    let filter = CourseFilter {
        status: query.status,
        instructor_id: query.instructor_id,
    };

    let courses = state.course_service.list(&actor, filter).await?;

    Ok(Json(courses.into()))
}

/// Creates a course.
///
/// # Endpoint
///
/// `POST /api/courses`
///
/// ```json
/// { "title": "Rust 101", "description": "", "status": "draft", "enrollment_fee": 0 }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
/// Returns 403 Forbidden for students.
pub async fn create_course_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    payload.validate()?;

    let course = state.course_service.create(&actor, payload.into()).await?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Returns a course with its sections and content, in display order.
///
/// # Endpoint
///
/// `GET /api/courses/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the course does not exist or is a draft the
/// caller may not see.
pub async fn course_detail_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<CourseTree>, AppError> {
    let tree = state.course_service.get_tree(&actor, id).await?;

    Ok(Json(tree))
}

/// Partially updates a course.
///
/// # Endpoint
///
/// `PATCH /api/courses/{id}`
pub async fn update_course_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    payload.validate()?;

    let course = state
        .course_service
        .update(&actor, id, payload.into())
        .await?;

    Ok(Json(course))
}

/// Deletes a course with all of its sections, content and questions.
///
/// # Endpoint
///
/// `DELETE /api/courses/{id}`
pub async fn delete_course_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<StatusCode, AppError> {
    state.course_service.delete(&actor, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
