//! Core domain entities representing the LMS data model.
//!
//! Entities are plain data structures mirroring the persisted rows. Field
//! names follow the domain vocabulary (`title`, `order`); the persistence
//! layer translates them to column names (`name`, `order_index`).
//!
//! # Entity Types
//!
//! - [`Course`] - Top-level learning unit
//! - [`Section`] - Ordered grouping of content within a course
//! - [`Content`] - A lesson, quiz or assignment within a section
//! - [`QuizQuestion`] - A question attached to a quiz content item
//! - [`Profile`] - A user of the system with a role
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation
//! (`NewCourse`, `NewSection`, ...) and partial updates (`CoursePatch`,
//! `SectionPatch`, ...).

pub mod content;
pub mod course;
pub mod profile;
pub mod quiz_question;
pub mod section;

pub use content::{Content, ContentPatch, ContentType, NewContent, is_video_url};
pub use course::{Course, CoursePatch, CourseStatus, CourseTree, NewCourse, SectionNode};
pub use profile::{NewProfile, Profile, Role};
pub use quiz_question::{NewQuizQuestion, QuestionType, QuizQuestion, QuizQuestionPatch};
pub use section::{NewSection, Section, SectionPatch};

/// Returned when a stored or submitted string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl From<UnknownVariant> for crate::error::AppError {
    fn from(e: UnknownVariant) -> Self {
        crate::error::AppError::internal(
            "Stored value is not recognised",
            serde_json::json!({ "kind": e.kind, "value": e.value }),
        )
    }
}
