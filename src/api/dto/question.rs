//! DTOs for quiz question endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::{QuestionType, QuizQuestionPatch};

/// Request body for `POST /api/content/{id}/questions`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Question must be 1-2000 characters"))]
    pub question: String,

    #[serde(rename = "type")]
    pub question_type: QuestionType,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 options"))]
    pub options: Vec<String>,

    pub correct_answer: String,

    pub explanation: Option<String>,

    #[serde(default = "default_points")]
    #[validate(range(min = 0, max = 1000))]
    pub points: i32,

    #[validate(range(min = 0))]
    pub order: Option<i32>,
}

fn default_points() -> i32 {
    1
}

/// Request body for `PATCH /api/questions/{id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Question must be 1-2000 characters"))]
    pub question: Option<String>,

    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,

    #[validate(length(max = 20, message = "At most 20 options"))]
    pub options: Option<Vec<String>>,

    pub correct_answer: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub explanation: Option<Option<String>>,

    #[validate(range(min = 0, max = 1000))]
    pub points: Option<i32>,

    #[validate(range(min = 0))]
    pub order: Option<i32>,
}

impl From<UpdateQuestionRequest> for QuizQuestionPatch {
    fn from(req: UpdateQuestionRequest) -> Self {
        QuizQuestionPatch {
            question: req.question,
            question_type: req.question_type,
            options: req.options,
            correct_answer: req.correct_answer,
            explanation: req.explanation,
            points: req.points,
            order: req.order,
        }
    }
}
