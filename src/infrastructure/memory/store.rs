//! Shared in-process table storage.

use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{Content, Course, Profile, QuizQuestion, Section};
use crate::domain::repositories::ApiToken;
use crate::error::AppError;

/// All tables of the in-memory backend.
///
/// Ids come from one sequence shared by every table and start at 1.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    last_id: i64,
    pub profiles: BTreeMap<i64, Profile>,
    pub tokens: BTreeMap<i64, ApiToken>,
    pub courses: BTreeMap<i64, Course>,
    pub sections: BTreeMap<i64, Section>,
    pub content: BTreeMap<i64, Content>,
    pub questions: BTreeMap<i64, QuizQuestion>,
}

impl Tables {
    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn require_profile(&self, id: i64) -> Result<(), AppError> {
        if self.profiles.contains_key(&id) {
            return Ok(());
        }
        Err(missing_reference("profiles", id))
    }

    pub fn require_course(&self, id: i64) -> Result<(), AppError> {
        if self.courses.contains_key(&id) {
            return Ok(());
        }
        Err(missing_reference("courses", id))
    }

    pub fn require_section(&self, id: i64) -> Result<(), AppError> {
        if self.sections.contains_key(&id) {
            return Ok(());
        }
        Err(missing_reference("course_sections", id))
    }

    pub fn require_content(&self, id: i64) -> Result<(), AppError> {
        if self.content.contains_key(&id) {
            return Ok(());
        }
        Err(missing_reference("course_content", id))
    }

    pub fn section_count(&self, course_id: i64) -> i64 {
        self.sections
            .values()
            .filter(|s| s.course_id == course_id)
            .count() as i64
    }

    pub fn remove_content(&mut self, id: i64) -> Option<Content> {
        let removed = self.content.remove(&id)?;
        self.questions.retain(|_, q| q.content_id != id);
        Some(removed)
    }

    pub fn remove_section(&mut self, id: i64) -> Option<Section> {
        let removed = self.sections.remove(&id)?;
        let orphaned: Vec<i64> = self
            .content
            .values()
            .filter(|c| c.section_id == id)
            .map(|c| c.id)
            .collect();
        for content_id in orphaned {
            self.remove_content(content_id);
        }
        Some(removed)
    }

    pub fn remove_course(&mut self, id: i64) -> Option<Course> {
        let removed = self.courses.remove(&id)?;
        let orphaned: Vec<i64> = self
            .sections
            .values()
            .filter(|s| s.course_id == id)
            .map(|s| s.id)
            .collect();
        for section_id in orphaned {
            self.remove_section(section_id);
        }
        Some(removed)
    }
}

fn missing_reference(table: &'static str, id: i64) -> AppError {
    AppError::bad_request(
        "Referenced record does not exist",
        json!({ "table": table, "id": id }),
    )
}

/// Handle to the shared tables. Cloning shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().await;
        f(&tables)
    }

    pub(crate) async fn write<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.write().await;
        f(&mut tables)
    }

    pub(crate) async fn try_write<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut tables = self.tables.write().await;
        f(&mut tables)
    }

    /// Runs `f` against a copy of the tables and keeps the copy only if
    /// `f` succeeds.
    pub(crate) async fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut tables = self.tables.write().await;
        let mut working = tables.clone();
        let value = f(&mut working)?;
        *tables = working;
        Ok(value)
    }
}
