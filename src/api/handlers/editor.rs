//! Handlers for editor session endpoints.
//!
//! A session holds an unsaved course tree. Structural edits only change the
//! session; `POST /api/editor/sessions/{sid}/save` persists the whole tree.
//! Draft nodes are addressed as `{kind}/{id}` where `kind` is `pending`
//! (local id) or `persisted` (stored row id).

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::course::UpdateCourseRequest;
use crate::api::dto::editor::{
    LessonPath, LessonRequest, NodeCreatedResponse, OpenSessionRequest, SectionPath,
    UpdateDraftSectionRequest,
};
use crate::application::services::{SaveReport, SessionSnapshot};
use crate::domain::entities::Profile;
use crate::error::AppError;
use crate::state::AppState;

/// Opens an editor session.
///
/// # Endpoint
///
/// `POST /api/editor/sessions`
///
/// ```json
/// { "course_id": 12 }
/// { "title": "New course", "enrollment_fee": 0 }
/// ```
///
/// # Errors
///
/// Returns 403 Forbidden if the caller may not edit the course.
/// Returns 404 Not Found if `course_id` does not exist.
/// Returns 409 Conflict when the session limit is reached.
pub async fn open_session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    payload.validate()?;

    let snapshot = state
        .editor_service
        .open(&actor, payload.course_id, payload.course.into())
        .await?;

    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// `GET /api/editor/sessions/{sid}`
pub async fn session_detail_handler(
    Path(sid): Path<String>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state.editor_service.get(&actor, &sid).await?;

    Ok(Json(snapshot))
}

/// Edits the course fields of the draft.
///
/// # Endpoint
///
/// `PATCH /api/editor/sessions/{sid}`
pub async fn update_session_course_handler(
    Path(sid): Path<String>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    payload.validate()?;

    let snapshot = state
        .editor_service
        .update_course(&actor, &sid, payload.into())
        .await?;

    Ok(Json(snapshot))
}

/// Discards a session and its unsaved edits.
///
/// # Endpoint
///
/// `DELETE /api/editor/sessions/{sid}`
pub async fn close_session_handler(
    Path(sid): Path<String>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<StatusCode, AppError> {
    state.editor_service.close(&actor, &sid).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Appends a "New Section" to the draft.
///
/// # Endpoint
///
/// `POST /api/editor/sessions/{sid}/sections`
pub async fn add_draft_section_handler(
    Path(sid): Path<String>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<(StatusCode, Json<NodeCreatedResponse>), AppError> {
    let (identity, session) = state.editor_service.add_section(&actor, &sid).await?;

    Ok((
        StatusCode::CREATED,
        Json(NodeCreatedResponse { identity, session }),
    ))
}

/// Renames a draft section or changes its description.
///
/// # Endpoint
///
/// `PATCH /api/editor/sessions/{sid}/sections/{kind}/{id}`
pub async fn update_draft_section_handler(
    Path(path): Path<SectionPath>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<UpdateDraftSectionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    payload.validate()?;

    let snapshot = state
        .editor_service
        .update_section(&actor, &path.sid, path.section()?, payload.into())
        .await?;

    Ok(Json(snapshot))
}

/// Removes a section from the draft. A persisted section is deleted on the
/// next save.
///
/// # Endpoint
///
/// `DELETE /api/editor/sessions/{sid}/sections/{kind}/{id}`
pub async fn delete_draft_section_handler(
    Path(path): Path<SectionPath>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .editor_service
        .delete_section(&actor, &path.sid, path.section()?)
        .await?;

    Ok(Json(snapshot))
}

/// Appends a lesson to a draft section.
///
/// # Endpoint
///
/// `POST /api/editor/sessions/{sid}/sections/{kind}/{id}/lessons`
pub async fn add_draft_lesson_handler(
    Path(path): Path<SectionPath>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<LessonRequest>,
) -> Result<(StatusCode, Json<NodeCreatedResponse>), AppError> {
    payload.validate()?;

    let (identity, session) = state
        .editor_service
        .edit_lesson(&actor, &path.sid, path.section()?, None, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(NodeCreatedResponse { identity, session }),
    ))
}

/// Replaces a lesson in a draft section with lesson editor output.
///
/// # Endpoint
///
/// `PUT /api/editor/sessions/{sid}/sections/{kind}/{id}/lessons/{lkind}/{lid}`
pub async fn replace_draft_lesson_handler(
    Path(path): Path<LessonPath>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<LessonRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    payload.validate()?;

    let (_, snapshot) = state
        .editor_service
        .edit_lesson(
            &actor,
            &path.sid,
            path.section()?,
            Some(path.lesson()?),
            payload.into(),
        )
        .await?;

    Ok(Json(snapshot))
}

/// `DELETE /api/editor/sessions/{sid}/sections/{kind}/{id}/lessons/{lkind}/{lid}`
pub async fn delete_draft_lesson_handler(
    Path(path): Path<LessonPath>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .editor_service
        .delete_lesson(&actor, &path.sid, path.section()?, path.lesson()?)
        .await?;

    Ok(Json(snapshot))
}

/// Persists the draft in one atomic write.
///
/// # Endpoint
///
/// `POST /api/editor/sessions/{sid}/save`
///
/// # Response
///
/// ```json
/// {
///   "course_id": 12,
///   "summary": { "course_created": false, "sections_created": 1, "sections_updated": 2, ... },
///   "session": { ... }
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the draft is invalid; nothing is written.
/// On storage errors the draft keeps its unsaved state.
pub async fn save_session_handler(
    Path(sid): Path<String>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<SaveReport>, AppError> {
    let report = state.editor_service.save(&actor, &sid).await?;

    Ok(Json(report))
}
