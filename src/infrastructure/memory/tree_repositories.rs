//! In-memory section, content and quiz question repositories.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::store::MemoryStore;
use crate::domain::entities::{
    Content, ContentPatch, NewContent, NewQuizQuestion, NewSection, QuizQuestion,
    QuizQuestionPatch, Section, SectionPatch,
};
use crate::domain::repositories::{ContentRepository, QuizQuestionRepository, SectionRepository};
use crate::error::AppError;

pub struct MemorySectionRepository {
    store: MemoryStore,
}

impl MemorySectionRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SectionRepository for MemorySectionRepository {
    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Section>, AppError> {
        Ok(self
            .store
            .read(|tables| {
                let mut sections: Vec<Section> = tables
                    .sections
                    .values()
                    .filter(|s| s.course_id == course_id)
                    .cloned()
                    .collect();
                sections.sort_by_key(|s| (s.order, s.id));
                sections
            })
            .await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Section>, AppError> {
        Ok(self.store.read(|t| t.sections.get(&id).cloned()).await)
    }

    async fn create(&self, new_section: NewSection) -> Result<Section, AppError> {
        self.store
            .try_write(|tables| {
                tables.require_course(new_section.course_id)?;
                let now = Utc::now();
                let section = Section {
                    id: tables.next_id(),
                    course_id: new_section.course_id,
                    title: new_section.title,
                    description: new_section.description,
                    order: new_section.order,
                    created_at: now,
                    updated_at: now,
                };
                tables.sections.insert(section.id, section.clone());
                Ok(section)
            })
            .await
    }

    async fn update(&self, id: i64, patch: SectionPatch) -> Result<Section, AppError> {
        self.store
            .try_write(|tables| {
                let section = tables
                    .sections
                    .get_mut(&id)
                    .ok_or_else(|| AppError::not_found("Section not found", json!({ "section_id": id })))?;
                if let Some(title) = patch.title {
                    section.title = title;
                }
                if let Some(description) = patch.description {
                    section.description = description;
                }
                if let Some(order) = patch.order {
                    section.order = order;
                }
                section.updated_at = Utc::now();
                Ok(section.clone())
            })
            .await
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.store
            .write(|tables| tables.remove_section(id))
            .await
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Section not found", json!({ "section_id": id })))
    }
}

pub struct MemoryContentRepository {
    store: MemoryStore,
}

impl MemoryContentRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ContentRepository for MemoryContentRepository {
    async fn list_by_section(&self, section_id: i64) -> Result<Vec<Content>, AppError> {
        Ok(self
            .store
            .read(|tables| {
                let mut content: Vec<Content> = tables
                    .content
                    .values()
                    .filter(|c| c.section_id == section_id)
                    .cloned()
                    .collect();
                content.sort_by_key(|c| (c.order, c.id));
                content
            })
            .await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Content>, AppError> {
        Ok(self.store.read(|t| t.content.get(&id).cloned()).await)
    }

    async fn create(&self, new_content: NewContent) -> Result<Content, AppError> {
        self.store
            .try_write(|tables| {
                tables.require_section(new_content.section_id)?;
                let now = Utc::now();
                let content = Content {
                    id: tables.next_id(),
                    section_id: new_content.section_id,
                    title: new_content.title,
                    body: new_content.body,
                    content_type: new_content.content_type,
                    order: new_content.order,
                    is_free: new_content.is_free,
                    video_url: new_content.video_url,
                    duration_minutes: new_content.duration_minutes,
                    created_at: now,
                    updated_at: now,
                };
                tables.content.insert(content.id, content.clone());
                Ok(content)
            })
            .await
    }

    async fn update(&self, id: i64, patch: ContentPatch) -> Result<Content, AppError> {
        self.store
            .try_write(|tables| {
                let content = tables
                    .content
                    .get_mut(&id)
                    .ok_or_else(|| AppError::not_found("Content not found", json!({ "content_id": id })))?;
                if let Some(title) = patch.title {
                    content.title = title;
                }
                if let Some(body) = patch.body {
                    content.body = body;
                }
                if let Some(content_type) = patch.content_type {
                    content.content_type = content_type;
                }
                if let Some(order) = patch.order {
                    content.order = order;
                }
                if let Some(is_free) = patch.is_free {
                    content.is_free = is_free;
                }
                if let Some(video_url) = patch.video_url {
                    content.video_url = video_url;
                }
                if let Some(duration) = patch.duration_minutes {
                    content.duration_minutes = duration;
                }
                content.updated_at = Utc::now();
                Ok(content.clone())
            })
            .await
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.store
            .write(|tables| tables.remove_content(id))
            .await
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Content not found", json!({ "content_id": id })))
    }
}

pub struct MemoryQuizQuestionRepository {
    store: MemoryStore,
}

impl MemoryQuizQuestionRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

fn question_not_found(id: i64) -> AppError {
    AppError::not_found("Question not found", json!({ "question_id": id }))
}

#[async_trait]
impl QuizQuestionRepository for MemoryQuizQuestionRepository {
    async fn list_by_content(&self, content_id: i64) -> Result<Vec<QuizQuestion>, AppError> {
        Ok(self
            .store
            .read(|tables| {
                let mut questions: Vec<QuizQuestion> = tables
                    .questions
                    .values()
                    .filter(|q| q.content_id == content_id)
                    .cloned()
                    .collect();
                questions.sort_by_key(|q| (q.order, q.id));
                questions
            })
            .await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<QuizQuestion>, AppError> {
        Ok(self.store.read(|t| t.questions.get(&id).cloned()).await)
    }

    async fn create(&self, new_question: NewQuizQuestion) -> Result<QuizQuestion, AppError> {
        self.store
            .try_write(|tables| {
                tables.require_content(new_question.content_id)?;
                let question = QuizQuestion {
                    id: tables.next_id(),
                    content_id: new_question.content_id,
                    question: new_question.question,
                    question_type: new_question.question_type,
                    options: new_question.options,
                    correct_answer: new_question.correct_answer,
                    explanation: new_question.explanation,
                    points: new_question.points,
                    order: new_question.order,
                    created_at: Utc::now(),
                };
                tables.questions.insert(question.id, question.clone());
                Ok(question)
            })
            .await
    }

    async fn update(&self, id: i64, patch: QuizQuestionPatch) -> Result<QuizQuestion, AppError> {
        self.store
            .try_write(|tables| {
                let question = tables
                    .questions
                    .get_mut(&id)
                    .ok_or_else(|| question_not_found(id))?;
                if let Some(text) = patch.question {
                    question.question = text;
                }
                if let Some(question_type) = patch.question_type {
                    question.question_type = question_type;
                }
                if let Some(options) = patch.options {
                    question.options = options;
                }
                if let Some(answer) = patch.correct_answer {
                    question.correct_answer = answer;
                }
                if let Some(explanation) = patch.explanation {
                    question.explanation = explanation;
                }
                if let Some(points) = patch.points {
                    question.points = points;
                }
                if let Some(order) = patch.order {
                    question.order = order;
                }
                Ok(question.clone())
            })
            .await
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.store
            .write(|tables| tables.questions.remove(&id))
            .await
            .map(|_| ())
            .ok_or_else(|| question_not_found(id))
    }
}
