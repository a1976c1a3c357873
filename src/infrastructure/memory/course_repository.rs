//! In-memory implementation of course repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::store::{MemoryStore, Tables};
use crate::domain::draft::CourseFields;
use crate::domain::entities::{
    Content, Course, CoursePatch, CourseStatus, CourseTree, NewCourse, Section,
};
use crate::domain::reconcile::{
    CourseWrite, LessonRow, LessonWrite, SaveOutcome, SavePlan, SectionWrite,
};
use crate::domain::repositories::{CourseCounts, CourseFilter, CourseRepository, CourseSummary};
use crate::error::AppError;

pub struct MemoryCourseRepository {
    store: MemoryStore,
}

impl MemoryCourseRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn course_not_found(id: i64) -> AppError {
    AppError::not_found("Course not found", json!({ "course_id": id }))
}

fn check_fields(tables: &Tables, fields: &CourseFields) -> Result<(), AppError> {
    if fields.enrollment_fee < 0 {
        return Err(AppError::bad_request(
            "Check constraint violation",
            json!({ "constraint": "courses_enrollment_fee_check" }),
        ));
    }
    if let Some(instructor_id) = fields.instructor_id {
        tables.require_profile(instructor_id)?;
    }
    Ok(())
}

fn write_course(tables: &mut Tables, write: &CourseWrite) -> Result<i64, AppError> {
    let now = Utc::now();
    match write {
        CourseWrite::Insert(fields) => {
            check_fields(tables, fields)?;
            let id = tables.next_id();
            tables.courses.insert(
                id,
                Course {
                    id,
                    title: fields.title.clone(),
                    description: fields.description.clone(),
                    instructor_id: fields.instructor_id,
                    status: fields.status,
                    enrollment_fee: fields.enrollment_fee,
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(id)
        }
        CourseWrite::Update { id, fields } => {
            check_fields(tables, fields)?;
            let course = tables
                .courses
                .get_mut(id)
                .ok_or_else(|| course_not_found(*id))?;
            course.title = fields.title.clone();
            course.description = fields.description.clone();
            course.instructor_id = fields.instructor_id;
            course.status = fields.status;
            course.enrollment_fee = fields.enrollment_fee;
            course.updated_at = now;
            Ok(*id)
        }
    }
}

fn write_section(
    tables: &mut Tables,
    course_id: i64,
    write: &SectionWrite,
) -> Result<i64, AppError> {
    let now = Utc::now();
    let row = write.row();
    match write {
        SectionWrite::Insert { .. } => {
            let id = tables.next_id();
            tables.sections.insert(
                id,
                Section {
                    id,
                    course_id,
                    title: row.title.clone(),
                    description: row.description.clone(),
                    order: row.order,
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(id)
        }
        SectionWrite::Update { id, .. } => {
            let section = tables
                .sections
                .get_mut(id)
                .filter(|s| s.course_id == course_id)
                .ok_or_else(|| {
                    AppError::not_found("Section not found", json!({ "section_id": id }))
                })?;
            section.title = row.title.clone();
            section.description = row.description.clone();
            section.order = row.order;
            section.updated_at = now;
            Ok(*id)
        }
    }
}

fn write_lesson(
    tables: &mut Tables,
    section_id: i64,
    write: &LessonWrite,
) -> Result<i64, AppError> {
    let now = Utc::now();
    let apply = |content: &mut Content, row: &LessonRow| {
        content.title = row.title.clone();
        content.body = row.body.clone();
        content.content_type = row.content_type;
        content.order = row.order;
        content.is_free = row.is_free;
        content.video_url = row.video_url.clone();
        content.duration_minutes = row.duration_minutes;
        content.updated_at = now;
    };

    match write {
        LessonWrite::Insert { row, .. } => {
            let id = tables.next_id();
            let mut content = Content {
                id,
                section_id,
                title: String::new(),
                body: String::new(),
                content_type: row.content_type,
                order: 0,
                is_free: false,
                video_url: None,
                duration_minutes: None,
                created_at: now,
                updated_at: now,
            };
            apply(&mut content, row);
            tables.content.insert(id, content);
            Ok(id)
        }
        LessonWrite::Update { id, row } => {
            let content = tables
                .content
                .get_mut(id)
                .filter(|c| c.section_id == section_id)
                .ok_or_else(|| {
                    AppError::not_found(
                        "Lesson not found",
                        json!({ "content_id": id, "section_id": section_id }),
                    )
                })?;
            apply(content, row);
            Ok(*id)
        }
    }
}

fn apply_plan(tables: &mut Tables, plan: &SavePlan) -> Result<SaveOutcome, AppError> {
    let course_id = write_course(tables, &plan.course)?;

    for lesson_id in &plan.deleted_lessons {
        let in_course = tables
            .content
            .get(lesson_id)
            .and_then(|c| tables.sections.get(&c.section_id))
            .is_some_and(|s| s.course_id == course_id);
        if in_course {
            tables.remove_content(*lesson_id);
        }
    }

    for section_id in &plan.deleted_sections {
        if tables
            .sections
            .get(section_id)
            .is_some_and(|s| s.course_id == course_id)
        {
            tables.remove_section(*section_id);
        }
    }

    let mut outcome = SaveOutcome {
        course_id,
        ..Default::default()
    };

    for step in &plan.steps {
        let section_id = write_section(tables, course_id, &step.section)?;
        if let SectionWrite::Insert { local_id, .. } = &step.section {
            outcome.sections.insert(*local_id, section_id);
        }

        for lesson in &step.lessons {
            let id = write_lesson(tables, section_id, lesson)?;
            if let LessonWrite::Insert { local_id, .. } = lesson {
                outcome.lessons.insert(*local_id, id);
            }
        }
    }

    Ok(outcome)
}

#[async_trait]
impl CourseRepository for MemoryCourseRepository {
    async fn list(&self, filter: CourseFilter) -> Result<Vec<CourseSummary>, AppError> {
        Ok(self
            .store
            .read(|tables| {
                let mut courses: Vec<CourseSummary> = tables
                    .courses
                    .values()
                    .filter(|c| filter.matches(c))
                    .map(|course| CourseSummary {
                        section_count: tables.section_count(course.id),
                        course: course.clone(),
                    })
                    .collect();
                courses.sort_by(|a, b| {
                    (b.course.created_at, b.course.id).cmp(&(a.course.created_at, a.course.id))
                });
                courses
            })
            .await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, AppError> {
        Ok(self.store.read(|t| t.courses.get(&id).cloned()).await)
    }

    async fn find_tree(&self, id: i64) -> Result<Option<CourseTree>, AppError> {
        Ok(self
            .store
            .read(|tables| {
                let course = tables.courses.get(&id)?.clone();
                let sections: Vec<Section> = tables
                    .sections
                    .values()
                    .filter(|s| s.course_id == id)
                    .cloned()
                    .collect();
                let content = tables
                    .content
                    .values()
                    .filter(|c| sections.iter().any(|s| s.id == c.section_id))
                    .cloned()
                    .collect();
                Some(CourseTree::assemble(course, sections, content))
            })
            .await)
    }

    async fn create(&self, new_course: NewCourse) -> Result<Course, AppError> {
        let fields = CourseFields {
            title: new_course.title,
            description: new_course.description,
            instructor_id: new_course.instructor_id,
            status: new_course.status,
            enrollment_fee: new_course.enrollment_fee,
        };

        self.store
            .transaction(|tables| {
                let id = write_course(tables, &CourseWrite::Insert(fields))?;
                tables
                    .courses
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| course_not_found(id))
            })
            .await
    }

    async fn update(&self, id: i64, patch: CoursePatch) -> Result<Course, AppError> {
        self.store
            .transaction(|tables| {
                let current = tables.courses.get(&id).ok_or_else(|| course_not_found(id))?;
                let fields = CourseFields {
                    title: patch.title.unwrap_or_else(|| current.title.clone()),
                    description: patch
                        .description
                        .unwrap_or_else(|| current.description.clone()),
                    instructor_id: patch.instructor_id.unwrap_or(current.instructor_id),
                    status: patch.status.unwrap_or(current.status),
                    enrollment_fee: patch.enrollment_fee.unwrap_or(current.enrollment_fee),
                };
                write_course(tables, &CourseWrite::Update { id, fields })?;
                tables
                    .courses
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| course_not_found(id))
            })
            .await
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.store
            .write(|tables| tables.remove_course(id))
            .await
            .map(|_| ())
            .ok_or_else(|| course_not_found(id))
    }

    async fn save_tree(&self, plan: &SavePlan) -> Result<SaveOutcome, AppError> {
        self.store.transaction(|tables| apply_plan(tables, plan)).await
    }

    async fn counts(&self) -> Result<CourseCounts, AppError> {
        Ok(self
            .store
            .read(|tables| {
                let mut counts = CourseCounts::default();
                for course in tables.courses.values() {
                    counts.total += 1;
                    match course.status {
                        CourseStatus::Published => counts.published += 1,
                        CourseStatus::Draft => counts.draft += 1,
                    }
                }
                counts
            })
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::draft::{CourseDraft, Identity, LessonInput, OrderingPolicy};
    use crate::domain::reconcile::plan_save;

    fn draft(title: &str) -> CourseDraft {
        CourseDraft::new(
            CourseFields {
                title: title.to_string(),
                ..Default::default()
            },
            OrderingPolicy::Preserve,
        )
    }

    #[tokio::test]
    async fn test_save_tree_inserts_and_second_save_updates() {
        let repo = MemoryCourseRepository::new(MemoryStore::new());
        let mut draft = draft("T1");
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

        let outcome = repo.save_tree(&plan_save(&draft).unwrap()).await.unwrap();
        draft.mark_saved(&outcome);

        let tree = repo.find_tree(outcome.course_id).await.unwrap().unwrap();
        assert_eq!(tree.sections.len(), 1);
        assert_eq!(tree.lesson_count(), 1);

        let second = plan_save(&draft).unwrap();
        let summary = second.summary();
        assert!(!summary.course_created);
        assert_eq!(summary.sections_created, 0);
        assert_eq!(summary.lessons_created, 0);

        repo.save_tree(&second).await.unwrap();
        let tree = repo.find_tree(outcome.course_id).await.unwrap().unwrap();
        assert_eq!(tree.sections.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_writes_nothing() {
        let repo = MemoryCourseRepository::new(MemoryStore::new());
        let mut draft = draft("T1");
        draft.add_section();
        let outcome = repo.save_tree(&plan_save(&draft).unwrap()).await.unwrap();
        draft.mark_saved(&outcome);

        let persisted = draft.sections()[0].identity;
        let section_id = persisted.remote_id().unwrap();
        repo.store.write(|t| t.remove_section(section_id)).await;

        draft.add_section();
        draft.update_section_title(persisted, "Renamed").unwrap();
        let result = repo.save_tree(&plan_save(&draft).unwrap()).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        let tree = repo.find_tree(outcome.course_id).await.unwrap().unwrap();
        assert!(tree.sections.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_sections_are_removed() {
        let repo = MemoryCourseRepository::new(MemoryStore::new());
        let mut draft = draft("T1");
        draft.add_section();
        draft.add_section();
        let outcome = repo.save_tree(&plan_save(&draft).unwrap()).await.unwrap();
        draft.mark_saved(&outcome);

        let first = draft.sections()[0].identity;
        draft.delete_section(first).unwrap();
        repo.save_tree(&plan_save(&draft).unwrap()).await.unwrap();

        let tree = repo.find_tree(outcome.course_id).await.unwrap().unwrap();
        assert_eq!(tree.sections.len(), 1);
        assert_eq!(tree.sections[0].section.order, 1);
        assert_ne!(Identity::persisted(tree.sections[0].section.id), first);
    }

    #[tokio::test]
    async fn test_list_filters_and_counts() {
        let repo = MemoryCourseRepository::new(MemoryStore::new());
        repo.create(NewCourse {
            title: "Draft".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        repo.create(NewCourse {
            title: "Live".to_string(),
            status: CourseStatus::Published,
            ..Default::default()
        })
        .await
        .unwrap();

        let published = repo.list(CourseFilter::published()).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].course.title, "Live");

        let counts = repo.counts().await.unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.published, 1);
        assert_eq!(counts.draft, 1);
    }

    #[tokio::test]
    async fn test_create_with_unknown_instructor_is_rejected() {
        let repo = MemoryCourseRepository::new(MemoryStore::new());
        let result = repo
            .create(NewCourse {
                title: "C".to_string(),
                instructor_id: Some(99),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
