//! In-memory course tree edited by a single editing session.

use serde::Serialize;
use serde_json::json;

use super::{Identity, LocalId, OrderingPolicy};
use crate::domain::entities::{
    Content, ContentType, CoursePatch, CourseStatus, CourseTree, SectionNode, is_video_url,
};
use crate::domain::reconcile::SaveOutcome;
use crate::error::AppError;

/// Title given to sections created by [`CourseDraft::add_section`].
pub const NEW_SECTION_TITLE: &str = "New Section";

/// Errors raised by local draft mutations and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("section {0} is not part of this draft")]
    SectionNotFound(Identity),

    #[error("lesson {lesson} is not part of section {section}")]
    LessonNotFound { section: Identity, lesson: Identity },

    #[error("{field}: {reason}")]
    Invalid { field: String, reason: &'static str },
}

impl From<DraftError> for AppError {
    fn from(e: DraftError) -> Self {
        match e {
            DraftError::SectionNotFound(section) => {
                AppError::not_found("Section not found in draft", json!({ "section": section }))
            }
            DraftError::LessonNotFound { section, lesson } => AppError::not_found(
                "Lesson not found in draft",
                json!({ "section": section, "lesson": lesson }),
            ),
            DraftError::Invalid { field, reason } => {
                AppError::bad_request("Draft validation failed", json!({ "field": field, "reason": reason }))
            }
        }
    }
}

/// Editable course-level fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    pub instructor_id: Option<i64>,
    pub status: CourseStatus,
    pub enrollment_fee: i64,
}

impl CourseFields {
    fn apply(&mut self, patch: CoursePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(instructor_id) = patch.instructor_id {
            self.instructor_id = instructor_id;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(fee) = patch.enrollment_fee {
            self.enrollment_fee = fee;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionDraft {
    pub identity: Identity,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    pub lessons: Vec<ContentDraft>,
}

impl SectionDraft {
    fn lesson_mut(&mut self, lesson: Identity) -> Option<&mut ContentDraft> {
        self.lessons.iter_mut().find(|l| l.identity == lesson)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDraft {
    pub identity: Identity,
    pub title: String,
    pub body: String,
    pub content_type: ContentType,
    pub order: i32,
    pub is_free: bool,
    pub video_url: Option<String>,
    pub duration_minutes: Option<i32>,
}

impl From<&Content> for ContentDraft {
    fn from(c: &Content) -> Self {
        Self {
            identity: Identity::persisted(c.id),
            title: c.title.clone(),
            body: c.body.clone(),
            content_type: c.content_type,
            order: c.order,
            is_free: c.is_free,
            video_url: c.video_url.clone(),
            duration_minutes: c.duration_minutes,
        }
    }
}

impl From<&SectionNode> for SectionDraft {
    fn from(node: &SectionNode) -> Self {
        Self {
            identity: Identity::persisted(node.section.id),
            title: node.section.title.clone(),
            description: node.section.description.clone(),
            order: node.section.order,
            lessons: node.lessons.iter().map(ContentDraft::from).collect(),
        }
    }
}

/// Data returned by the lesson editor.
///
/// `title` and `body` always overwrite; the optional fields overwrite only
/// when present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LessonInput {
    pub title: String,
    pub body: String,
    pub content_type: Option<ContentType>,
    pub is_free: Option<bool>,
    pub video_url: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// A course being edited: course fields plus the section/content tree.
///
/// All mutations are local. Persisted nodes removed from the tree are
/// remembered so the next save can delete their rows.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    identity: Identity,
    fields: CourseFields,
    sections: Vec<SectionDraft>,
    removed_sections: Vec<i64>,
    removed_lessons: Vec<i64>,
    next_local_id: LocalId,
    policy: OrderingPolicy,
}

impl CourseDraft {
    /// Starts a draft for a course that does not exist yet.
    pub fn new(fields: CourseFields, policy: OrderingPolicy) -> Self {
        Self {
            identity: Identity::pending(0),
            fields,
            sections: Vec::new(),
            removed_sections: Vec::new(),
            removed_lessons: Vec::new(),
            next_local_id: 1,
            policy,
        }
    }

    /// Starts a draft from a stored course tree. Under
    /// [`OrderingPolicy::Renumber`] stored orders are compacted right away.
    pub fn from_tree(tree: &CourseTree, policy: OrderingPolicy) -> Self {
        let course = &tree.course;
        let mut draft = Self {
            identity: Identity::persisted(course.id),
            fields: CourseFields {
                title: course.title.clone(),
                description: course.description.clone(),
                instructor_id: course.instructor_id,
                status: course.status,
                enrollment_fee: course.enrollment_fee,
            },
            sections: tree.sections.iter().map(SectionDraft::from).collect(),
            removed_sections: Vec::new(),
            removed_lessons: Vec::new(),
            next_local_id: 1,
            policy,
        };
        draft.apply_ordering();
        draft
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn fields(&self) -> &CourseFields {
        &self.fields
    }

    pub fn sections(&self) -> &[SectionDraft] {
        &self.sections
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    /// Remote ids of persisted sections removed since the last save.
    pub fn removed_sections(&self) -> &[i64] {
        &self.removed_sections
    }

    /// Remote ids of persisted lessons removed since the last save.
    pub fn removed_lessons(&self) -> &[i64] {
        &self.removed_lessons
    }

    /// Counts nodes that would be inserted or deleted by a save.
    pub fn pending_changes(&self) -> usize {
        let pending_nodes: usize = self
            .sections
            .iter()
            .map(|s| {
                usize::from(s.identity.is_pending())
                    + s.lessons.iter().filter(|l| l.identity.is_pending()).count()
            })
            .sum();

        pending_nodes
            + usize::from(self.identity.is_pending())
            + self.removed_sections.len()
            + self.removed_lessons.len()
    }

    pub fn section(&self, id: Identity) -> Option<&SectionDraft> {
        self.sections.iter().find(|s| s.identity == id)
    }

    fn section_mut(&mut self, id: Identity) -> Result<&mut SectionDraft, DraftError> {
        self.sections
            .iter_mut()
            .find(|s| s.identity == id)
            .ok_or(DraftError::SectionNotFound(id))
    }

    fn allocate(&mut self) -> Identity {
        let id = Identity::pending(self.next_local_id);
        self.next_local_id += 1;
        id
    }

    pub fn update_course(&mut self, patch: CoursePatch) {
        self.fields.apply(patch);
    }

    /// Appends a section titled "New Section" with `order` equal to the
    /// current section count.
    pub fn add_section(&mut self) -> Identity {
        let identity = self.allocate();
        let order = order_for(self.sections.len());

        self.sections.push(SectionDraft {
            identity,
            title: NEW_SECTION_TITLE.to_string(),
            description: None,
            order,
            lessons: Vec::new(),
        });
        self.apply_ordering();

        identity
    }

    pub fn update_section_title(
        &mut self,
        id: Identity,
        title: impl Into<String>,
    ) -> Result<(), DraftError> {
        self.section_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn set_section_description(
        &mut self,
        id: Identity,
        description: Option<String>,
    ) -> Result<(), DraftError> {
        self.section_mut(id)?.description = description;
        Ok(())
    }

    /// Removes a section and its lessons from the tree.
    pub fn delete_section(&mut self, id: Identity) -> Result<SectionDraft, DraftError> {
        let index = self
            .sections
            .iter()
            .position(|s| s.identity == id)
            .ok_or(DraftError::SectionNotFound(id))?;

        let removed = self.sections.remove(index);
        if let Some(remote_id) = removed.identity.remote_id() {
            // Stored lessons go with the section row.
            self.removed_sections.push(remote_id);
        }
        self.apply_ordering();

        Ok(removed)
    }

    /// Merges lesson editor output into the tree.
    ///
    /// With `lesson = Some(id)` the existing lesson is updated in place.
    /// Otherwise a new lesson is appended with `order` equal to the section's
    /// lesson count, type `lesson` and `is_free = false` unless `input` says
    /// otherwise.
    pub fn edit_lesson(
        &mut self,
        section: Identity,
        lesson: Option<Identity>,
        input: LessonInput,
    ) -> Result<Identity, DraftError> {
        if let Some(lesson_id) = lesson {
            let target = self
                .section_mut(section)?
                .lesson_mut(lesson_id)
                .ok_or(DraftError::LessonNotFound {
                    section,
                    lesson: lesson_id,
                })?;

            target.title = input.title;
            target.body = input.body;
            if let Some(content_type) = input.content_type {
                target.content_type = content_type;
            }
            if let Some(is_free) = input.is_free {
                target.is_free = is_free;
            }
            if input.video_url.is_some() {
                target.video_url = input.video_url;
            }
            if input.duration_minutes.is_some() {
                target.duration_minutes = input.duration_minutes;
            }

            return Ok(lesson_id);
        }

        // Resolve the section before allocating so a failed lookup does not
        // consume a local id.
        self.section_mut(section)?;
        let identity = self.allocate();
        let target = self.section_mut(section)?;
        let order = order_for(target.lessons.len());

        target.lessons.push(ContentDraft {
            identity,
            title: input.title,
            body: input.body,
            content_type: input.content_type.unwrap_or_default(),
            order,
            is_free: input.is_free.unwrap_or(false),
            video_url: input.video_url,
            duration_minutes: input.duration_minutes,
        });
        self.apply_ordering();

        Ok(identity)
    }

    pub fn delete_lesson(&mut self, section: Identity, lesson: Identity) -> Result<(), DraftError> {
        let target = self.section_mut(section)?;
        let index = target
            .lessons
            .iter()
            .position(|l| l.identity == lesson)
            .ok_or(DraftError::LessonNotFound { section, lesson })?;

        let removed = target.lessons.remove(index);
        if let Some(remote_id) = removed.identity.remote_id() {
            self.removed_lessons.push(remote_id);
        }
        self.apply_ordering();

        Ok(())
    }

    /// Checks required fields before anything is sent to storage.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.fields.title.trim().is_empty() {
            return Err(invalid("title", "must not be empty"));
        }
        if self.fields.enrollment_fee < 0 {
            return Err(invalid("enrollment_fee", "must not be negative"));
        }

        for (i, section) in self.sections.iter().enumerate() {
            if section.title.trim().is_empty() {
                return Err(invalid(format!("sections[{i}].title"), "must not be empty"));
            }

            for (j, lesson) in section.lessons.iter().enumerate() {
                let field = |name: &str| format!("sections[{i}].lessons[{j}].{name}");

                if lesson.title.trim().is_empty() {
                    return Err(invalid(field("title"), "must not be empty"));
                }
                if lesson.duration_minutes.is_some_and(|d| d < 0) {
                    return Err(invalid(field("duration_minutes"), "must not be negative"));
                }
                if let Some(video_url) = &lesson.video_url
                    && !is_video_url(video_url)
                {
                    return Err(invalid(field("video_url"), "must be an http(s) URL"));
                }
            }
        }

        Ok(())
    }

    /// Promotes pending nodes to the ids assigned by a successful save and
    /// forgets the removals that save applied.
    pub fn mark_saved(&mut self, outcome: &SaveOutcome) {
        self.identity = Identity::persisted(outcome.course_id);

        for section in &mut self.sections {
            if let Some(remote_id) = section
                .identity
                .local_id()
                .and_then(|local| outcome.sections.get(&local))
            {
                section.identity = Identity::persisted(*remote_id);
            }

            for lesson in &mut section.lessons {
                if let Some(remote_id) = lesson
                    .identity
                    .local_id()
                    .and_then(|local| outcome.lessons.get(&local))
                {
                    lesson.identity = Identity::persisted(*remote_id);
                }
            }
        }

        self.removed_sections.clear();
        self.removed_lessons.clear();
    }

    fn apply_ordering(&mut self) {
        if self.policy != OrderingPolicy::Renumber {
            return;
        }

        for (i, section) in self.sections.iter_mut().enumerate() {
            section.order = order_for(i);
            for (j, lesson) in section.lessons.iter_mut().enumerate() {
                lesson.order = order_for(j);
            }
        }
    }
}

fn order_for(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

fn invalid(field: impl Into<String>, reason: &'static str) -> DraftError {
    DraftError::Invalid {
        field: field.into(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Course, Section};
    use chrono::Utc;
    use std::collections::HashMap;

    fn fields(title: &str) -> CourseFields {
        CourseFields {
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn stored_tree(section_ids: &[i64]) -> CourseTree {
        let now = Utc::now();
        let course = Course {
            id: 1,
            title: "Stored".to_string(),
            description: "desc".to_string(),
            instructor_id: Some(5),
            status: CourseStatus::Published,
            enrollment_fee: 1500,
            created_at: now,
            updated_at: now,
        };
        let sections = section_ids
            .iter()
            .enumerate()
            .map(|(i, id)| Section {
                id: *id,
                course_id: 1,
                title: format!("Section {id}"),
                description: None,
                order: i as i32,
                created_at: now,
                updated_at: now,
            })
            .collect();
        let content = vec![Content {
            id: 100,
            section_id: section_ids[0],
            title: "Stored lesson".to_string(),
            body: "body".to_string(),
            content_type: ContentType::Lesson,
            order: 0,
            is_free: true,
            video_url: None,
            duration_minutes: Some(10),
            created_at: now,
            updated_at: now,
        }];

        CourseTree::assemble(course, sections, content)
    }

    fn lesson(title: &str) -> LessonInput {
        LessonInput {
            title: title.to_string(),
            body: "text".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_section_uses_current_count() {
        let mut draft = CourseDraft::new(fields("T1"), OrderingPolicy::Preserve);

        let first = draft.add_section();
        let second = draft.add_section();

        assert!(first.is_pending());
        assert_ne!(first, second);
        assert_eq!(draft.sections()[0].title, NEW_SECTION_TITLE);
        assert_eq!(draft.sections()[0].order, 0);
        assert_eq!(draft.sections()[1].order, 1);
    }

    #[test]
    fn test_update_section_title() {
        let mut draft = CourseDraft::new(fields("T1"), OrderingPolicy::Preserve);
        let id = draft.add_section();

        draft.update_section_title(id, "Intro").unwrap();
        assert_eq!(draft.section(id).unwrap().title, "Intro");

        let missing = Identity::pending(999);
        assert_eq!(
            draft.update_section_title(missing, "x"),
            Err(DraftError::SectionNotFound(missing))
        );
    }

    #[test]
    fn test_delete_pending_section_is_not_remembered() {
        let mut draft = CourseDraft::new(fields("T1"), OrderingPolicy::Preserve);
        let id = draft.add_section();

        draft.delete_section(id).unwrap();

        assert!(draft.sections().is_empty());
        assert!(draft.removed_sections().is_empty());
    }

    #[test]
    fn test_delete_persisted_section_is_remembered() {
        let mut draft = CourseDraft::from_tree(&stored_tree(&[10, 20]), OrderingPolicy::Preserve);

        draft.delete_section(Identity::persisted(10)).unwrap();

        assert_eq!(draft.removed_sections(), &[10]);
        // Preserve policy: the remaining section keeps order 1.
        assert_eq!(draft.sections()[0].order, 1);
    }

    #[test]
    fn test_delete_with_renumber_policy_compacts_orders() {
        let mut draft = CourseDraft::from_tree(&stored_tree(&[10, 20, 30]), OrderingPolicy::Renumber);

        draft.delete_section(Identity::persisted(10)).unwrap();

        let orders: Vec<i32> = draft.sections().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_preserve_policy_can_duplicate_orders_after_delete() {
        let mut draft = CourseDraft::from_tree(&stored_tree(&[10, 20]), OrderingPolicy::Preserve);

        draft.delete_section(Identity::persisted(10)).unwrap();
        draft.add_section();

        let orders: Vec<i32> = draft.sections().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 1]);
    }

    #[test]
    fn test_edit_lesson_appends_new_lesson() {
        let mut draft = CourseDraft::new(fields("T1"), OrderingPolicy::Preserve);
        let section = draft.add_section();

        let first = draft.edit_lesson(section, None, lesson("One")).unwrap();
        draft.edit_lesson(section, None, lesson("Two")).unwrap();

        let lessons = &draft.section(section).unwrap().lessons;
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[0].identity, first);
        assert_eq!(lessons[0].content_type, ContentType::Lesson);
        assert!(!lessons[0].is_free);
        assert_eq!(lessons[1].order, 1);
    }

    #[test]
    fn test_edit_lesson_merges_existing() {
        let mut draft = CourseDraft::from_tree(&stored_tree(&[10]), OrderingPolicy::Preserve);
        let section = Identity::persisted(10);
        let target = Identity::persisted(100);

        let input = LessonInput {
            title: "Renamed".to_string(),
            body: "new body".to_string(),
            content_type: Some(ContentType::Quiz),
            ..Default::default()
        };
        let returned = draft.edit_lesson(section, Some(target), input).unwrap();

        assert_eq!(returned, target);
        let stored = &draft.section(section).unwrap().lessons[0];
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.body, "new body");
        assert_eq!(stored.content_type, ContentType::Quiz);
        // Untouched optional fields survive the merge.
        assert!(stored.is_free);
        assert_eq!(stored.duration_minutes, Some(10));
    }

    #[test]
    fn test_edit_lesson_unknown_section_does_not_allocate() {
        let mut draft = CourseDraft::new(fields("T1"), OrderingPolicy::Preserve);
        let missing = Identity::pending(42);

        assert!(draft.edit_lesson(missing, None, lesson("x")).is_err());

        let next = draft.add_section();
        assert_eq!(next, Identity::pending(1));
    }

    #[test]
    fn test_delete_lesson_tracks_persisted() {
        let mut draft = CourseDraft::from_tree(&stored_tree(&[10]), OrderingPolicy::Preserve);

        draft
            .delete_lesson(Identity::persisted(10), Identity::persisted(100))
            .unwrap();

        assert_eq!(draft.removed_lessons(), &[100]);
        assert!(draft.sections()[0].lessons.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_titles() {
        let mut draft = CourseDraft::new(fields("  "), OrderingPolicy::Preserve);
        assert!(matches!(draft.validate(), Err(DraftError::Invalid { .. })));

        draft.update_course(CoursePatch {
            title: Some("T1".to_string()),
            ..Default::default()
        });
        let section = draft.add_section();
        draft.update_section_title(section, "").unwrap();

        let err = draft.validate().unwrap_err();
        assert_eq!(
            err,
            DraftError::Invalid {
                field: "sections[0].title".to_string(),
                reason: "must not be empty"
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_video_url() {
        let mut draft = CourseDraft::new(fields("T1"), OrderingPolicy::Preserve);
        let section = draft.add_section();
        let input = LessonInput {
            video_url: Some("ftp://example.com/video".to_string()),
            ..lesson("Clip")
        };
        draft.edit_lesson(section, None, input).unwrap();

        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_mark_saved_promotes_pending_nodes() {
        let mut draft = CourseDraft::new(fields("T1"), OrderingPolicy::Preserve);
        let section = draft.add_section();
        let lesson_id = draft.edit_lesson(section, None, lesson("One")).unwrap();

        let outcome = SaveOutcome {
            course_id: 7,
            sections: HashMap::from([(section.local_id().unwrap(), 70)]),
            lessons: HashMap::from([(lesson_id.local_id().unwrap(), 700)]),
        };
        draft.mark_saved(&outcome);

        assert_eq!(draft.identity(), Identity::persisted(7));
        assert_eq!(draft.sections()[0].identity, Identity::persisted(70));
        assert_eq!(draft.sections()[0].lessons[0].identity, Identity::persisted(700));
        assert_eq!(draft.pending_changes(), 0);
    }

    #[test]
    fn test_pending_changes_counts_inserts_and_removals() {
        let mut draft = CourseDraft::from_tree(&stored_tree(&[10, 20]), OrderingPolicy::Preserve);
        assert_eq!(draft.pending_changes(), 0);

        draft.add_section();
        draft.delete_section(Identity::persisted(20)).unwrap();

        assert_eq!(draft.pending_changes(), 2);
    }
}
