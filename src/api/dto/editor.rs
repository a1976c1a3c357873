//! DTOs for editor session endpoints.

use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::api::dto::course::UpdateCourseRequest;
use crate::application::services::{SectionEdit, SessionSnapshot};
use crate::domain::draft::{Identity, IdentityKind, LessonInput};
use crate::domain::entities::ContentType;
use crate::error::AppError;

/// Request body for `POST /api/editor/sessions`.
///
/// Without `course_id` the session starts a new course.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct OpenSessionRequest {
    pub course_id: Option<i64>,

    #[serde(flatten)]
    #[validate(nested)]
    pub course: UpdateCourseRequest,
}

/// Request body for `PATCH /api/editor/sessions/{sid}/sections/{kind}/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDraftSectionRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
}

impl From<UpdateDraftSectionRequest> for SectionEdit {
    fn from(req: UpdateDraftSectionRequest) -> Self {
        SectionEdit {
            title: req.title,
            description: req.description,
        }
    }
}

/// Lesson editor output, for both adding and replacing a lesson.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LessonRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    #[serde(default, alias = "content")]
    pub body: String,

    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,

    pub is_free: Option<bool>,

    pub video_url: Option<String>,

    pub duration_minutes: Option<i32>,
}

impl From<LessonRequest> for LessonInput {
    fn from(req: LessonRequest) -> Self {
        LessonInput {
            title: req.title,
            body: req.body,
            content_type: req.content_type,
            is_free: req.is_free,
            video_url: req.video_url,
            duration_minutes: req.duration_minutes,
        }
    }
}

/// `{sid}/sections/{kind}/{id}` path segment.
#[derive(Debug, Deserialize)]
pub struct SectionPath {
    pub sid: String,
    pub kind: IdentityKind,
    pub id: i64,
}

impl SectionPath {
    pub fn section(&self) -> Result<Identity, AppError> {
        node_identity(self.kind, self.id)
    }
}

/// `{sid}/sections/{kind}/{id}/lessons/{lkind}/{lid}` path segment.
#[derive(Debug, Deserialize)]
pub struct LessonPath {
    pub sid: String,
    pub kind: IdentityKind,
    pub id: i64,
    pub lkind: IdentityKind,
    pub lid: i64,
}

impl LessonPath {
    pub fn section(&self) -> Result<Identity, AppError> {
        node_identity(self.kind, self.id)
    }

    pub fn lesson(&self) -> Result<Identity, AppError> {
        node_identity(self.lkind, self.lid)
    }
}

fn node_identity(kind: IdentityKind, id: i64) -> Result<Identity, AppError> {
    Identity::from_parts(kind, id)
        .ok_or_else(|| AppError::bad_request("Invalid node id", json!({ "id": id })))
}

/// Response for operations that create a draft node.
#[derive(Debug, Serialize)]
pub struct NodeCreatedResponse {
    pub identity: Identity,
    pub session: SessionSnapshot,
}
