//! DTOs for direct section and content endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::{ContentPatch, ContentType, SectionPatch};

/// Request body for `POST /api/courses/{id}/sections`.
///
/// `order` defaults to the current number of sections.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSectionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub order: Option<i32>,
}

/// Request body for `PATCH /api/sections/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSectionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,

    #[validate(range(min = 0))]
    pub order: Option<i32>,
}

impl From<UpdateSectionRequest> for SectionPatch {
    fn from(req: UpdateSectionRequest) -> Self {
        SectionPatch {
            title: req.title,
            description: req.description,
            order: req.order,
        }
    }
}

/// Request body for `POST /api/sections/{id}/content`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContentRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default, alias = "content")]
    pub body: String,

    #[serde(default, rename = "type")]
    pub content_type: ContentType,

    #[validate(range(min = 0))]
    pub order: Option<i32>,

    #[serde(default)]
    pub is_free: bool,

    #[validate(url(message = "Invalid video URL"))]
    pub video_url: Option<String>,

    #[validate(range(min = 0))]
    pub duration_minutes: Option<i32>,
}

/// Request body for `PATCH /api/content/{id}`.
///
/// `video_url` and `duration_minutes`: absent = unchanged, `null` = clear.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateContentRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(alias = "content")]
    pub body: Option<String>,

    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,

    #[validate(range(min = 0))]
    pub order: Option<i32>,

    pub is_free: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub video_url: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub duration_minutes: Option<Option<i32>>,
}

impl From<UpdateContentRequest> for ContentPatch {
    fn from(req: UpdateContentRequest) -> Self {
        ContentPatch {
            title: req.title,
            body: req.body,
            content_type: req.content_type,
            order: req.order,
            is_free: req.is_free,
            video_url: req.video_url,
            duration_minutes: req.duration_minutes,
        }
    }
}
