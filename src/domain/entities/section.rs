//! Section entity: an ordered grouping of content within a course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted course section.
///
/// `order` defines display sequence among siblings. Uniqueness and
/// contiguity are not enforced by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a new section.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSection {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
}

/// Partial update for a section. `description: Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub order: Option<i32>,
}
