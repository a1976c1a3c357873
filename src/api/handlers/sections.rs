//! Handlers for direct section, content and quiz question writes.
//!
//! These bypass editor sessions: each request is one row operation.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::course::ListResponse;
use crate::api::dto::question::{CreateQuestionRequest, UpdateQuestionRequest};
use crate::api::dto::section::{
    CreateContentRequest, CreateSectionRequest, UpdateContentRequest, UpdateSectionRequest,
};
use crate::domain::entities::{
    Content, NewContent, NewQuizQuestion, NewSection, Profile, QuizQuestion, Section,
};
use crate::error::AppError;
use crate::state::AppState;

fn next_order(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// `GET /api/courses/{id}/sections`
pub async fn section_list_handler(
    Path(course_id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<ListResponse<Section>>, AppError> {
    let sections = state
        .content_service
        .list_sections(&actor, course_id)
        .await?;

    Ok(Json(sections.into()))
}

/// Creates a section. Without `order` it is appended after the existing
/// sections.
///
/// # Endpoint
///
/// `POST /api/courses/{id}/sections`
pub async fn create_section_handler(
    Path(course_id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<CreateSectionRequest>,
) -> Result<(StatusCode, Json<Section>), AppError> {
    payload.validate()?;

    let order = match payload.order {
        Some(order) => order,
        None => next_order(
            state
                .content_service
                .list_sections(&actor, course_id)
                .await?
                .len(),
        ),
    };

    let section = state
        .content_service
        .create_section(
            &actor,
            NewSection {
                course_id,
                title: payload.title,
                description: payload.description,
                order,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(section)))
}

/// `PATCH /api/sections/{id}`
pub async fn update_section_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<UpdateSectionRequest>,
) -> Result<Json<Section>, AppError> {
    payload.validate()?;

    let section = state
        .content_service
        .update_section(&actor, id, payload.into())
        .await?;

    Ok(Json(section))
}

/// Deletes a section and its content.
///
/// # Endpoint
///
/// `DELETE /api/sections/{id}`
pub async fn delete_section_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<StatusCode, AppError> {
    state.content_service.delete_section(&actor, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sections/{id}/content`
pub async fn content_list_handler(
    Path(section_id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<ListResponse<Content>>, AppError> {
    let content = state
        .content_service
        .list_content(&actor, section_id)
        .await?;

    Ok(Json(content.into()))
}

/// Creates a lesson, quiz or assignment.
///
/// # Endpoint
///
/// `POST /api/sections/{id}/content`
///
/// ```json
/// { "title": "Ownership", "content": "…", "type": "lesson", "is_free": true }
/// ```
pub async fn create_content_handler(
    Path(section_id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<Content>), AppError> {
    payload.validate()?;

    let order = match payload.order {
        Some(order) => order,
        None => next_order(
            state
                .content_service
                .list_content(&actor, section_id)
                .await?
                .len(),
        ),
    };

    let content = state
        .content_service
        .create_content(
            &actor,
            NewContent {
                section_id,
                title: payload.title,
                body: payload.body,
                content_type: payload.content_type,
                order,
                is_free: payload.is_free,
                video_url: payload.video_url,
                duration_minutes: payload.duration_minutes,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(content)))
}

/// `PATCH /api/content/{id}`
pub async fn update_content_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<UpdateContentRequest>,
) -> Result<Json<Content>, AppError> {
    payload.validate()?;

    let content = state
        .content_service
        .update_content(&actor, id, payload.into())
        .await?;

    Ok(Json(content))
}

/// `DELETE /api/content/{id}`
pub async fn delete_content_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<StatusCode, AppError> {
    state.content_service.delete_content(&actor, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the questions of a quiz. Answers are included, so only course
/// managers may call it.
///
/// # Endpoint
///
/// `GET /api/content/{id}/questions`
pub async fn question_list_handler(
    Path(content_id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<ListResponse<QuizQuestion>>, AppError> {
    let questions = state
        .content_service
        .list_questions(&actor, content_id)
        .await?;

    Ok(Json(questions.into()))
}

/// Adds a question to a quiz.
///
/// # Endpoint
///
/// `POST /api/content/{id}/questions`
///
/// ```json
/// { "question": "2 + 2?", "type": "multiple_choice", "options": ["3", "4"], "correct_answer": "1" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the content is not a quiz or the answer does
/// not fit the question type.
pub async fn create_question_handler(
    Path(content_id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuizQuestion>), AppError> {
    payload.validate()?;

    let order = match payload.order {
        Some(order) => order,
        None => next_order(
            state
                .content_service
                .list_questions(&actor, content_id)
                .await?
                .len(),
        ),
    };

    let question = state
        .content_service
        .create_question(
            &actor,
            NewQuizQuestion {
                content_id,
                question: payload.question,
                question_type: payload.question_type,
                options: payload.options,
                correct_answer: payload.correct_answer,
                explanation: payload.explanation,
                points: payload.points,
                order,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// `PATCH /api/questions/{id}`
pub async fn update_question_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<Json<QuizQuestion>, AppError> {
    payload.validate()?;

    let question = state
        .content_service
        .update_question(&actor, id, payload.into())
        .await?;

    Ok(Json(question))
}

/// `DELETE /api/questions/{id}`
pub async fn delete_question_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<StatusCode, AppError> {
    state.content_service.delete_question(&actor, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
