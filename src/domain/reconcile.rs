//! Turning an edited draft into storage writes.
//!
//! [`plan_save`] is pure: it inspects a [`CourseDraft`] and produces a
//! [`SavePlan`] listing what a repository must insert, update and delete.
//! Repositories execute a plan atomically and report the ids they assigned
//! in a [`SaveOutcome`], which the draft uses to promote its pending nodes.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::draft::{
    ContentDraft, CourseDraft, CourseFields, DraftError, Identity, LocalId, SectionDraft,
};
use crate::domain::entities::ContentType;

/// Column values written for a section row.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRow {
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
}

/// Column values written for a content row.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonRow {
    pub title: String,
    pub body: String,
    pub content_type: ContentType,
    pub order: i32,
    pub is_free: bool,
    pub video_url: Option<String>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CourseWrite {
    Insert(CourseFields),
    Update { id: i64, fields: CourseFields },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionWrite {
    Insert { local_id: LocalId, row: SectionRow },
    Update { id: i64, row: SectionRow },
}

impl SectionWrite {
    pub fn row(&self) -> &SectionRow {
        match self {
            SectionWrite::Insert { row, .. } | SectionWrite::Update { row, .. } => row,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LessonWrite {
    Insert { local_id: LocalId, row: LessonRow },
    Update { id: i64, row: LessonRow },
}

/// One section write followed by the writes of its lessons.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionStep {
    pub section: SectionWrite,
    pub lessons: Vec<LessonWrite>,
}

/// Everything one course save writes, in execution order:
/// the course row, lesson deletes, section deletes, then sections in
/// display order each followed by its lessons.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    pub course: CourseWrite,
    pub deleted_lessons: Vec<i64>,
    pub deleted_sections: Vec<i64>,
    pub steps: Vec<SectionStep>,
}

/// Ids assigned by a successful save, keyed by the local ids of pending nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaveOutcome {
    pub course_id: i64,
    pub sections: HashMap<LocalId, i64>,
    pub lessons: HashMap<LocalId, i64>,
}

/// Operation counts of a plan, returned to callers after a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SaveSummary {
    pub course_created: bool,
    pub sections_created: usize,
    pub sections_updated: usize,
    pub sections_deleted: usize,
    pub lessons_created: usize,
    pub lessons_updated: usize,
    pub lessons_deleted: usize,
}

impl SavePlan {
    pub fn summary(&self) -> SaveSummary {
        let mut summary = SaveSummary {
            course_created: matches!(self.course, CourseWrite::Insert(_)),
            sections_deleted: self.deleted_sections.len(),
            lessons_deleted: self.deleted_lessons.len(),
            ..Default::default()
        };

        for step in &self.steps {
            match step.section {
                SectionWrite::Insert { .. } => summary.sections_created += 1,
                SectionWrite::Update { .. } => summary.sections_updated += 1,
            }
            for lesson in &step.lessons {
                match lesson {
                    LessonWrite::Insert { .. } => summary.lessons_created += 1,
                    LessonWrite::Update { .. } => summary.lessons_updated += 1,
                }
            }
        }

        summary
    }

    /// Whether the plan touches any section or lesson row.
    pub fn has_section_writes(&self) -> bool {
        !self.steps.is_empty() || !self.deleted_sections.is_empty()
    }
}

/// Validates a draft and computes its save plan.
///
/// # Errors
///
/// Returns [`DraftError::Invalid`] when a required field is missing; no plan
/// is produced and nothing may be written.
pub fn plan_save(draft: &CourseDraft) -> Result<SavePlan, DraftError> {
    draft.validate()?;

    let fields = draft.fields().clone();
    let course = match draft.identity() {
        Identity::Persisted { remote_id } => CourseWrite::Update {
            id: remote_id,
            fields,
        },
        Identity::Pending { .. } => CourseWrite::Insert(fields),
    };

    let steps = draft.sections().iter().map(section_step).collect();

    Ok(SavePlan {
        course,
        deleted_lessons: draft.removed_lessons().to_vec(),
        deleted_sections: draft.removed_sections().to_vec(),
        steps,
    })
}

fn section_step(section: &SectionDraft) -> SectionStep {
    let row = SectionRow {
        title: section.title.clone(),
        description: section.description.clone(),
        order: section.order,
    };

    let section_write = match section.identity {
        Identity::Pending { local_id } => SectionWrite::Insert { local_id, row },
        Identity::Persisted { remote_id } => SectionWrite::Update { id: remote_id, row },
    };

    SectionStep {
        section: section_write,
        lessons: section.lessons.iter().map(lesson_write).collect(),
    }
}

fn lesson_write(lesson: &ContentDraft) -> LessonWrite {
    let row = LessonRow {
        title: lesson.title.clone(),
        body: lesson.body.clone(),
        content_type: lesson.content_type,
        order: lesson.order,
        is_free: lesson.is_free,
        video_url: lesson.video_url.clone(),
        duration_minutes: lesson.duration_minutes,
    };

    match lesson.identity {
        Identity::Pending { local_id } => LessonWrite::Insert { local_id, row },
        Identity::Persisted { remote_id } => LessonWrite::Update { id: remote_id, row },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::{LessonInput, OrderingPolicy};
    use crate::domain::entities::{Course, CourseStatus, CourseTree, Section};
    use chrono::Utc;

    fn new_draft(title: &str) -> CourseDraft {
        CourseDraft::new(
            CourseFields {
                title: title.to_string(),
                ..Default::default()
            },
            OrderingPolicy::Preserve,
        )
    }

    fn loaded_draft(section_ids: &[i64], policy: OrderingPolicy) -> CourseDraft {
        let sections: Vec<(i64, i32)> = section_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i as i32))
            .collect();
        loaded_draft_with_orders(&sections, policy)
    }

    fn loaded_draft_with_orders(sections: &[(i64, i32)], policy: OrderingPolicy) -> CourseDraft {
        let now = Utc::now();
        let course = Course {
            id: 1,
            title: "Loaded".to_string(),
            description: String::new(),
            instructor_id: None,
            status: CourseStatus::Draft,
            enrollment_fee: 0,
            created_at: now,
            updated_at: now,
        };
        let sections = sections
            .iter()
            .map(|(id, order)| Section {
                id: *id,
                course_id: 1,
                title: format!("Section {id}"),
                description: None,
                order: *order,
                created_at: now,
                updated_at: now,
            })
            .collect();

        CourseDraft::from_tree(&CourseTree::assemble(course, sections, vec![]), policy)
    }

    #[test]
    fn test_n_new_sections_plan_n_inserts_in_order() {
        let mut draft = new_draft("T1");
        for _ in 0..4 {
            draft.add_section();
        }

        let plan = plan_save(&draft).unwrap();

        assert_eq!(plan.summary().sections_created, 4);
        let orders: Vec<i32> = plan.steps.iter().map(|s| s.section.row().order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_deleted_pending_section_is_never_written() {
        let mut draft = new_draft("T1");
        let keep = draft.add_section();
        let dropped = draft.add_section();
        draft.delete_section(dropped).unwrap();

        let plan = plan_save(&draft).unwrap();

        assert_eq!(plan.steps.len(), 1);
        assert!(plan.deleted_sections.is_empty());
        assert!(matches!(
            plan.steps[0].section,
            SectionWrite::Insert { local_id, .. } if Some(local_id) == keep.local_id()
        ));
    }

    #[test]
    fn test_zero_sections_plans_course_only() {
        let plan = plan_save(&new_draft("Empty")).unwrap();

        assert!(matches!(plan.course, CourseWrite::Insert(_)));
        assert!(!plan.has_section_writes());
        assert!(plan.deleted_lessons.is_empty());
    }

    #[test]
    fn test_renamed_persisted_section_is_updated() {
        let mut draft = loaded_draft(&[10], OrderingPolicy::Preserve);
        draft
            .update_section_title(Identity::persisted(10), "Renamed")
            .unwrap();

        let plan = plan_save(&draft).unwrap();

        assert!(matches!(plan.course, CourseWrite::Update { id: 1, .. }));
        match &plan.steps[0].section {
            SectionWrite::Update { id, row } => {
                assert_eq!(*id, 10);
                assert_eq!(row.title, "Renamed");
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert_eq!(plan.summary().sections_created, 0);
    }

    #[test]
    fn test_create_rename_save_scenario() {
        let mut draft = new_draft("T1");
        let section = draft.add_section();
        assert_eq!(draft.section(section).unwrap().title, "New Section");
        draft.update_section_title(section, "Intro").unwrap();

        let plan = plan_save(&draft).unwrap();
        let summary = plan.summary();

        assert!(summary.course_created);
        assert_eq!(summary.sections_created, 1);
        assert_eq!(plan.steps[0].section.row().title, "Intro");
        assert_eq!(plan.steps[0].section.row().order, 0);
    }

    #[test]
    fn test_delete_first_of_two_keeps_order_under_preserve() {
        let mut draft = loaded_draft(&[10, 20], OrderingPolicy::Preserve);
        draft.delete_section(Identity::persisted(10)).unwrap();

        let plan = plan_save(&draft).unwrap();

        assert_eq!(plan.deleted_sections, vec![10]);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].section.row().order, 1);
    }

    #[test]
    fn test_delete_first_of_two_renumbers_under_renumber() {
        let mut draft = loaded_draft(&[10, 20], OrderingPolicy::Renumber);
        draft.delete_section(Identity::persisted(10)).unwrap();

        let plan = plan_save(&draft).unwrap();

        assert_eq!(plan.steps[0].section.row().order, 0);
    }

    #[test]
    fn test_loaded_gaps_are_compacted_under_renumber() {
        let mut draft = loaded_draft_with_orders(&[(10, 0), (20, 5)], OrderingPolicy::Renumber);
        draft
            .update_section_title(Identity::persisted(20), "Renamed")
            .unwrap();

        let plan = plan_save(&draft).unwrap();

        let orders: Vec<i32> = plan.steps.iter().map(|s| s.section.row().order).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_loaded_gaps_are_kept_under_preserve() {
        let draft = loaded_draft_with_orders(&[(10, 0), (20, 5)], OrderingPolicy::Preserve);

        let plan = plan_save(&draft).unwrap();

        let orders: Vec<i32> = plan.steps.iter().map(|s| s.section.row().order).collect();
        assert_eq!(orders, vec![0, 5]);
    }

    #[test]
    fn test_lessons_follow_their_section() {
        let mut draft = new_draft("T1");
        let section = draft.add_section();
        draft
            .edit_lesson(
                section,
                None,
                LessonInput {
                    title: "L1".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        let plan = plan_save(&draft).unwrap();

        assert_eq!(plan.steps[0].lessons.len(), 1);
        assert_eq!(plan.summary().lessons_created, 1);
    }

    #[test]
    fn test_invalid_draft_produces_no_plan() {
        let mut draft = new_draft("T1");
        let section = draft.add_section();
        draft.update_section_title(section, " ").unwrap();

        assert!(plan_save(&draft).is_err());
    }
}
