//! Course tree editing drafts.
//!
//! A [`CourseDraft`] holds one course and its section/content tree while a
//! user edits it. Nothing here touches storage: a draft is turned into a
//! [`crate::domain::reconcile::SavePlan`] and persisted in one step.
//!
//! Nodes carry an [`Identity`] that is either `Pending` (created locally,
//! no row yet) or `Persisted` (backed by a stored row).

pub mod course_draft;
pub mod identity;
pub mod ordering;

pub use course_draft::{
    ContentDraft, CourseDraft, CourseFields, DraftError, LessonInput, NEW_SECTION_TITLE,
    SectionDraft,
};
pub use identity::{Identity, IdentityKind, LocalId};
pub use ordering::OrderingPolicy;
