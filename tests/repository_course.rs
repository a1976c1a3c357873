use sqlx::PgPool;
use std::sync::Arc;

use course_studio::domain::draft::{CourseDraft, CourseFields, LessonInput, OrderingPolicy};
use course_studio::domain::entities::{CoursePatch, CourseStatus, NewCourse};
use course_studio::domain::reconcile::{SectionRow, SectionStep, SectionWrite, plan_save};
use course_studio::domain::repositories::{CourseFilter, CourseRepository};
use course_studio::error::AppError;
use course_studio::infrastructure::persistence::PgCourseRepository;

fn new_course(title: &str, status: CourseStatus) -> NewCourse {
    NewCourse {
        title: title.to_string(),
        description: String::new(),
        instructor_id: None,
        status,
        enrollment_fee: 0,
    }
}

fn draft_with_sections(titles: &[&str]) -> CourseDraft {
    let mut draft = CourseDraft::new(
        CourseFields {
            title: "Saved course".to_string(),
            ..Default::default()
        },
        OrderingPolicy::Preserve,
    );
    for title in titles {
        let section = draft.add_section();
        draft.update_section_title(section, *title).unwrap();
    }
    draft
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_update_course(pool: PgPool) {
    let repo = PgCourseRepository::new(Arc::new(pool));

    let course = repo
        .create(new_course("Rust 101", CourseStatus::Draft))
        .await
        .unwrap();
    assert_eq!(course.title, "Rust 101");

    let updated = repo
        .update(
            course.id,
            CoursePatch {
                status: Some(CourseStatus::Published),
                enrollment_fee: Some(1500),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, CourseStatus::Published);
    assert_eq!(updated.enrollment_fee, 1500);
    assert_eq!(updated.title, "Rust 101");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_filters_and_counts(pool: PgPool) {
    let repo = PgCourseRepository::new(Arc::new(pool));

    repo.create(new_course("Draft", CourseStatus::Draft))
        .await
        .unwrap();
    repo.create(new_course("Live", CourseStatus::Published))
        .await
        .unwrap();

    let published = repo.list(CourseFilter::published()).await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].course.title, "Live");
    assert_eq!(published[0].section_count, 0);

    let counts = repo.counts().await.unwrap();
    assert_eq!((counts.total, counts.published, counts.draft), (2, 1, 1));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_save_tree_inserts_whole_draft(pool: PgPool) {
    let repo = PgCourseRepository::new(Arc::new(pool));

    let mut draft = draft_with_sections(&["Intro", "Deep dive"]);
    let intro = draft.sections()[0].identity;
    draft
        .edit_lesson(
            intro,
            None,
            LessonInput {
                title: "Welcome".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

    let plan = plan_save(&draft).unwrap();
    let outcome = repo.save_tree(&plan).await.unwrap();
    assert_eq!(outcome.sections.len(), 2);
    assert_eq!(outcome.lessons.len(), 1);

    let tree = repo.find_tree(outcome.course_id).await.unwrap().unwrap();
    assert_eq!(tree.course.title, "Saved course");
    let titles: Vec<&str> = tree
        .sections
        .iter()
        .map(|n| n.section.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Intro", "Deep dive"]);
    assert_eq!(tree.sections[0].lessons[0].title, "Welcome");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_resaving_loaded_tree_only_updates(pool: PgPool) {
    let repo = PgCourseRepository::new(Arc::new(pool));

    let outcome = repo
        .save_tree(&plan_save(&draft_with_sections(&["A", "B"])).unwrap())
        .await
        .unwrap();
    let tree = repo.find_tree(outcome.course_id).await.unwrap().unwrap();

    let mut draft = CourseDraft::from_tree(&tree, OrderingPolicy::Preserve);
    let first = draft.sections()[0].identity;
    draft.update_section_title(first, "A (edited)").unwrap();

    let plan = plan_save(&draft).unwrap();
    let summary = plan.summary();
    assert_eq!(summary.sections_created, 0);
    assert_eq!(summary.sections_updated, 2);

    let second = repo.save_tree(&plan).await.unwrap();
    assert_eq!(second.course_id, outcome.course_id);
    assert!(second.sections.is_empty());

    let tree = repo.find_tree(outcome.course_id).await.unwrap().unwrap();
    assert_eq!(tree.sections.len(), 2);
    assert_eq!(tree.sections[0].section.title, "A (edited)");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_save_writes_nothing(pool: PgPool) {
    let repo = PgCourseRepository::new(Arc::new(pool));

    let mut plan = plan_save(&draft_with_sections(&["Will be rolled back"])).unwrap();
    plan.steps.push(SectionStep {
        section: SectionWrite::Update {
            id: 999_999,
            row: SectionRow {
                title: "Ghost".to_string(),
                description: None,
                order: 1,
            },
        },
        lessons: Vec::new(),
    });

    let result = repo.save_tree(&plan).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    let counts = repo.counts().await.unwrap();
    assert_eq!(counts.total, 0);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_course_cascades(pool: PgPool) {
    let pool = Arc::new(pool);
    let repo = PgCourseRepository::new(pool.clone());

    let outcome = repo
        .save_tree(&plan_save(&draft_with_sections(&["Only"])).unwrap())
        .await
        .unwrap();

    repo.delete(outcome.course_id).await.unwrap();

    let sections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_sections")
        .fetch_one(pool.as_ref())
        .await
        .unwrap();
    assert_eq!(sections, 0);
    assert!(repo.find_tree(outcome.course_id).await.unwrap().is_none());
}
