//! Direct section, content and quiz question operations.
//!
//! These are single-row adapters used outside an editing session. Each
//! write is authorized against the owning course and invalidates its cached
//! tree.

use serde_json::json;
use std::sync::Arc;

use crate::application::access::{can_view, ensure_can_manage};
use crate::domain::entities::{
    Content, ContentPatch, ContentType, Course, NewContent, NewQuizQuestion, NewSection, Profile,
    QuestionType, QuizQuestion, QuizQuestionPatch, Section, SectionPatch, is_video_url,
};
use crate::domain::repositories::{
    ContentRepository, CourseRepository, QuizQuestionRepository, SectionRepository,
};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

pub struct ContentService<
    C: CourseRepository + ?Sized = dyn CourseRepository,
    S: SectionRepository + ?Sized = dyn SectionRepository,
    T: ContentRepository + ?Sized = dyn ContentRepository,
    Q: QuizQuestionRepository + ?Sized = dyn QuizQuestionRepository,
> {
    courses: Arc<C>,
    sections: Arc<S>,
    content: Arc<T>,
    questions: Arc<Q>,
    cache: Arc<dyn CacheService>,
}

impl<C, S, T, Q> ContentService<C, S, T, Q>
where
    C: CourseRepository + ?Sized,
    S: SectionRepository + ?Sized,
    T: ContentRepository + ?Sized,
    Q: QuizQuestionRepository + ?Sized,
{
    pub fn new(
        courses: Arc<C>,
        sections: Arc<S>,
        content: Arc<T>,
        questions: Arc<Q>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            courses,
            sections,
            content,
            questions,
            cache,
        }
    }

    // --- sections ---

    pub async fn list_sections(
        &self,
        actor: &Profile,
        course_id: i64,
    ) -> Result<Vec<Section>, AppError> {
        self.visible_course(actor, course_id).await?;
        self.sections.list_by_course(course_id).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the course does not exist.
    /// Returns [`AppError::Forbidden`] if `actor` may not manage the course.
    pub async fn create_section(
        &self,
        actor: &Profile,
        new_section: NewSection,
    ) -> Result<Section, AppError> {
        let course = self.course(new_section.course_id).await?;
        ensure_can_manage(actor, &course)?;

        let section = self
            .sections
            .create(new_section)
            .await
            .inspect_err(|e| tracing::warn!(course_id = course.id, error = %e, "Section create failed"))?;
        self.invalidate(course.id).await;

        Ok(section)
    }

    pub async fn update_section(
        &self,
        actor: &Profile,
        id: i64,
        patch: SectionPatch,
    ) -> Result<Section, AppError> {
        let (_, course) = self.section_with_course(id).await?;
        ensure_can_manage(actor, &course)?;

        let section = self
            .sections
            .update(id, patch)
            .await
            .inspect_err(|e| tracing::warn!(section_id = id, error = %e, "Section update failed"))?;
        self.invalidate(course.id).await;

        Ok(section)
    }

    pub async fn delete_section(&self, actor: &Profile, id: i64) -> Result<(), AppError> {
        let (_, course) = self.section_with_course(id).await?;
        ensure_can_manage(actor, &course)?;

        self.sections
            .delete(id)
            .await
            .inspect_err(|e| tracing::warn!(section_id = id, error = %e, "Section delete failed"))?;
        self.invalidate(course.id).await;

        Ok(())
    }

    // --- content ---

    pub async fn list_content(
        &self,
        actor: &Profile,
        section_id: i64,
    ) -> Result<Vec<Content>, AppError> {
        let (_, course) = self.section_with_course(section_id).await?;
        if !can_view(actor, &course) {
            return Err(section_not_found(section_id));
        }
        self.content.list_by_section(section_id).await
    }

    pub async fn create_content(
        &self,
        actor: &Profile,
        new_content: NewContent,
    ) -> Result<Content, AppError> {
        check_video_url(new_content.video_url.as_deref())?;
        let (_, course) = self.section_with_course(new_content.section_id).await?;
        ensure_can_manage(actor, &course)?;

        let content = self
            .content
            .create(new_content)
            .await
            .inspect_err(|e| tracing::warn!(course_id = course.id, error = %e, "Content create failed"))?;
        self.invalidate(course.id).await;

        Ok(content)
    }

    pub async fn update_content(
        &self,
        actor: &Profile,
        id: i64,
        patch: ContentPatch,
    ) -> Result<Content, AppError> {
        check_video_url(patch.video_url.as_ref().and_then(Option::as_deref))?;
        let (_, course) = self.content_with_course(id).await?;
        ensure_can_manage(actor, &course)?;

        let content = self
            .content
            .update(id, patch)
            .await
            .inspect_err(|e| tracing::warn!(content_id = id, error = %e, "Content update failed"))?;
        self.invalidate(course.id).await;

        Ok(content)
    }

    pub async fn delete_content(&self, actor: &Profile, id: i64) -> Result<(), AppError> {
        let (_, course) = self.content_with_course(id).await?;
        ensure_can_manage(actor, &course)?;

        self.content
            .delete(id)
            .await
            .inspect_err(|e| tracing::warn!(content_id = id, error = %e, "Content delete failed"))?;
        self.invalidate(course.id).await;

        Ok(())
    }

    // --- quiz questions ---

    /// Lists the questions of a quiz. Questions include their answers, so
    /// only course managers may read them.
    pub async fn list_questions(
        &self,
        actor: &Profile,
        content_id: i64,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        let (_, course) = self.content_with_course(content_id).await?;
        ensure_can_manage(actor, &course)?;
        self.questions.list_by_content(content_id).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the content is not a quiz or the
    /// answer does not fit the question type.
    pub async fn create_question(
        &self,
        actor: &Profile,
        new_question: NewQuizQuestion,
    ) -> Result<QuizQuestion, AppError> {
        let (content, course) = self.content_with_course(new_question.content_id).await?;
        ensure_can_manage(actor, &course)?;

        if content.content_type != ContentType::Quiz {
            return Err(AppError::bad_request(
                "Questions can only be added to quiz content",
                json!({ "content_id": content.id, "type": content.content_type }),
            ));
        }
        validate_answer(
            new_question.question_type,
            &new_question.options,
            &new_question.correct_answer,
        )?;

        self.questions.create(new_question).await
    }

    pub async fn update_question(
        &self,
        actor: &Profile,
        id: i64,
        patch: QuizQuestionPatch,
    ) -> Result<QuizQuestion, AppError> {
        let current = self
            .questions
            .find_by_id(id)
            .await?
            .ok_or_else(|| question_not_found(id))?;
        let (_, course) = self.content_with_course(current.content_id).await?;
        ensure_can_manage(actor, &course)?;

        validate_answer(
            patch.question_type.unwrap_or(current.question_type),
            patch.options.as_ref().unwrap_or(&current.options),
            patch
                .correct_answer
                .as_deref()
                .unwrap_or(&current.correct_answer),
        )?;

        self.questions.update(id, patch).await
    }

    pub async fn delete_question(&self, actor: &Profile, id: i64) -> Result<(), AppError> {
        let current = self
            .questions
            .find_by_id(id)
            .await?
            .ok_or_else(|| question_not_found(id))?;
        let (_, course) = self.content_with_course(current.content_id).await?;
        ensure_can_manage(actor, &course)?;

        self.questions.delete(id).await
    }

    // --- lookups ---

    async fn course(&self, id: i64) -> Result<Course, AppError> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Course not found", json!({ "course_id": id })))
    }

    async fn visible_course(&self, actor: &Profile, id: i64) -> Result<Course, AppError> {
        let course = self.course(id).await?;
        if !can_view(actor, &course) {
            return Err(AppError::not_found(
                "Course not found",
                json!({ "course_id": id }),
            ));
        }
        Ok(course)
    }

    async fn section_with_course(&self, id: i64) -> Result<(Section, Course), AppError> {
        let section = self
            .sections
            .find_by_id(id)
            .await?
            .ok_or_else(|| section_not_found(id))?;
        let course = self.course(section.course_id).await?;
        Ok((section, course))
    }

    async fn content_with_course(&self, id: i64) -> Result<(Content, Course), AppError> {
        let content = self
            .content
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Content not found", json!({ "content_id": id })))?;
        let (_, course) = self.section_with_course(content.section_id).await?;
        Ok((content, course))
    }

    async fn invalidate(&self, course_id: i64) {
        if let Err(e) = self.cache.invalidate_course(course_id).await {
            tracing::warn!(course_id, error = %e, "Cache invalidation failed");
        }
    }
}

fn section_not_found(id: i64) -> AppError {
    AppError::not_found("Section not found", json!({ "section_id": id }))
}

/// Same rule as draft validation, so stored lessons stay saveable.
fn check_video_url(video_url: Option<&str>) -> Result<(), AppError> {
    match video_url {
        Some(url) if !is_video_url(url) => Err(AppError::bad_request(
            "Video URL must be an http(s) URL",
            json!({ "video_url": url }),
        )),
        _ => Ok(()),
    }
}

fn question_not_found(id: i64) -> AppError {
    AppError::not_found("Question not found", json!({ "question_id": id }))
}

/// Checks that `answer` is a legal answer for the question type.
///
/// Multiple choice answers are zero-based option indexes.
fn validate_answer(
    question_type: QuestionType,
    options: &[String],
    answer: &str,
) -> Result<(), AppError> {
    match question_type {
        QuestionType::MultipleChoice => {
            if options.len() < 2 {
                return Err(AppError::bad_request(
                    "Multiple choice questions need at least two options",
                    json!({ "options": options.len() }),
                ));
            }
            match answer.parse::<usize>() {
                Ok(index) if index < options.len() => Ok(()),
                _ => Err(AppError::bad_request(
                    "Correct answer must be the index of an option",
                    json!({ "correct_answer": answer, "options": options.len() }),
                )),
            }
        }
        QuestionType::TrueFalse if answer == "true" || answer == "false" => Ok(()),
        QuestionType::TrueFalse => Err(AppError::bad_request(
            "Correct answer must be \"true\" or \"false\"",
            json!({ "correct_answer": answer }),
        )),
        QuestionType::ShortAnswer if answer.trim().is_empty() => Err(AppError::bad_request(
            "Correct answer must not be empty",
            json!({}),
        )),
        QuestionType::ShortAnswer => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CourseStatus, Role};
    use crate::domain::repositories::{
        MockContentRepository, MockCourseRepository, MockQuizQuestionRepository,
        MockSectionRepository,
    };
    use crate::infrastructure::cache::{MockCacheService, NullCache};
    use chrono::Utc;

    fn profile(id: i64, role: Role) -> Profile {
        Profile {
            id,
            email: format!("{id}@example.com"),
            name: "P".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    fn course(id: i64, status: CourseStatus) -> Course {
        let now = Utc::now();
        Course {
            id,
            title: "C".to_string(),
            description: String::new(),
            instructor_id: Some(1),
            status,
            enrollment_fee: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn section(id: i64, course_id: i64) -> Section {
        let now = Utc::now();
        Section {
            id,
            course_id,
            title: "S".to_string(),
            description: None,
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn content(id: i64, section_id: i64, content_type: ContentType) -> Content {
        let now = Utc::now();
        Content {
            id,
            section_id,
            title: "L".to_string(),
            body: String::new(),
            content_type,
            order: 0,
            is_free: false,
            video_url: None,
            duration_minutes: None,
            created_at: now,
            updated_at: now,
        }
    }

    struct Mocks {
        courses: MockCourseRepository,
        sections: MockSectionRepository,
        content: MockContentRepository,
        questions: MockQuizQuestionRepository,
    }

    impl Mocks {
        /// Course 1 (draft, instructor 1) > section 2 > content 3 of `content_type`.
        fn tree(content_type: ContentType) -> Self {
            let mut courses = MockCourseRepository::new();
            courses
                .expect_find_by_id()
                .returning(|id| Ok(Some(course(id, CourseStatus::Draft))));
            let mut sections = MockSectionRepository::new();
            sections
                .expect_find_by_id()
                .returning(|id| Ok(Some(section(id, 1))));
            let mut content_repo = MockContentRepository::new();
            content_repo
                .expect_find_by_id()
                .returning(move |id| Ok(Some(content(id, 2, content_type))));
            Self {
                courses,
                sections,
                content: content_repo,
                questions: MockQuizQuestionRepository::new(),
            }
        }

        fn service(
            self,
            cache: Arc<dyn CacheService>,
        ) -> ContentService<
            MockCourseRepository,
            MockSectionRepository,
            MockContentRepository,
            MockQuizQuestionRepository,
        > {
            ContentService::new(
                Arc::new(self.courses),
                Arc::new(self.sections),
                Arc::new(self.content),
                Arc::new(self.questions),
                cache,
            )
        }
    }

    fn question(content_id: i64, question_type: QuestionType, answer: &str) -> NewQuizQuestion {
        NewQuizQuestion {
            content_id,
            question: "?".to_string(),
            question_type,
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer: answer.to_string(),
            explanation: None,
            points: 1,
            order: 0,
        }
    }

    #[tokio::test]
    async fn test_update_section_invalidates_owning_course() {
        let mut mocks = Mocks::tree(ContentType::Lesson);
        mocks
            .sections
            .expect_update()
            .times(1)
            .returning(|id, _| Ok(section(id, 1)));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate_course()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(()));

        let service = mocks.service(Arc::new(cache));

        service
            .update_section(
                &profile(1, Role::Staff),
                2,
                SectionPatch {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remote_error_propagates_unmodified() {
        let mut mocks = Mocks::tree(ContentType::Lesson);
        mocks.content.expect_delete().returning(|_| {
            Err(AppError::internal(
                "Database error",
                json!({ "message": "connection reset" }),
            ))
        });

        let service = mocks.service(Arc::new(NullCache::new()));

        let error = service
            .delete_content(&profile(1, Role::Admin), 3)
            .await
            .unwrap_err();
        assert_eq!(error.to_error_info().details["message"], "connection reset");
    }

    #[tokio::test]
    async fn test_students_cannot_list_draft_content() {
        let mut mocks = Mocks::tree(ContentType::Lesson);
        mocks.content.expect_list_by_section().never();

        let service = mocks.service(Arc::new(NullCache::new()));

        let result = service.list_content(&profile(9, Role::Student), 2).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_questions_require_quiz_content() {
        let mut mocks = Mocks::tree(ContentType::Lesson);
        mocks.questions.expect_create().never();

        let service = mocks.service(Arc::new(NullCache::new()));

        let result = service
            .create_question(
                &profile(1, Role::Admin),
                question(3, QuestionType::MultipleChoice, "0"),
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_question_on_quiz() {
        let mut mocks = Mocks::tree(ContentType::Quiz);
        mocks
            .questions
            .expect_create()
            .times(1)
            .returning(|q| {
                Ok(QuizQuestion {
                    id: 50,
                    content_id: q.content_id,
                    question: q.question,
                    question_type: q.question_type,
                    options: q.options,
                    correct_answer: q.correct_answer,
                    explanation: q.explanation,
                    points: q.points,
                    order: q.order,
                    created_at: Utc::now(),
                })
            });

        let service = mocks.service(Arc::new(NullCache::new()));

        let created = service
            .create_question(
                &profile(1, Role::Admin),
                question(3, QuestionType::MultipleChoice, "1"),
            )
            .await
            .unwrap();
        assert_eq!(created.id, 50);
    }

    #[tokio::test]
    async fn test_update_content_rejects_non_http_video_url() {
        let mut mocks = Mocks::tree(ContentType::Lesson);
        mocks.content.expect_update().never();

        let service = mocks.service(Arc::new(NullCache::new()));

        let result = service
            .update_content(
                &profile(1, Role::Admin),
                3,
                ContentPatch {
                    video_url: Some(Some("ftp://example.com/v.mp4".to_string())),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_validate_answer() {
        let options = vec!["a".to_string(), "b".to_string()];

        assert!(validate_answer(QuestionType::MultipleChoice, &options, "1").is_ok());
        assert!(validate_answer(QuestionType::MultipleChoice, &options, "2").is_err());
        assert!(validate_answer(QuestionType::MultipleChoice, &options[..1], "0").is_err());
        assert!(validate_answer(QuestionType::TrueFalse, &[], "false").is_ok());
        assert!(validate_answer(QuestionType::TrueFalse, &[], "yes").is_err());
        assert!(validate_answer(QuestionType::ShortAnswer, &[], "  ").is_err());
        assert!(validate_answer(QuestionType::ShortAnswer, &[], "ownership").is_ok());
    }
}
