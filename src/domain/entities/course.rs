//! Course entity and the assembled course tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Content, Section, UnknownVariant};

/// Publication state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Published => "published",
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            other => Err(UnknownVariant::new("course status", other)),
        }
    }
}

/// A course owned by an instructor.
///
/// `enrollment_fee` is stored in minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor_id: Option<i64>,
    pub status: CourseStatus,
    pub enrollment_fee: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }
}

/// Input data for creating a new course.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub instructor_id: Option<i64>,
    pub status: CourseStatus,
    pub enrollment_fee: i64,
}

/// Partial update for an existing course.
///
/// `None` fields are left unchanged. `instructor_id: Some(None)` clears the instructor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor_id: Option<Option<i64>>,
    pub status: Option<CourseStatus>,
    pub enrollment_fee: Option<i64>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.instructor_id.is_none()
            && self.status.is_none()
            && self.enrollment_fee.is_none()
    }
}

/// A section together with its content items, ordered by `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionNode {
    pub section: Section,
    pub lessons: Vec<Content>,
}

/// A course with all of its sections and content, as loaded from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseTree {
    pub course: Course,
    pub sections: Vec<SectionNode>,
}

impl CourseTree {
    /// Assembles a tree from flat section and content lists.
    ///
    /// Sections and their lessons are sorted by `order`, ties broken by id.
    /// Content whose section is not in `sections` is dropped.
    pub fn assemble(course: Course, mut sections: Vec<Section>, mut content: Vec<Content>) -> Self {
        sections.sort_by_key(|s| (s.order, s.id));
        content.sort_by_key(|c| (c.order, c.id));

        let sections = sections
            .into_iter()
            .map(|section| {
                let lessons = content
                    .iter()
                    .filter(|c| c.section_id == section.id)
                    .cloned()
                    .collect();
                SectionNode { section, lessons }
            })
            .collect();

        Self { course, sections }
    }

    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ContentType;

    fn course(id: i64) -> Course {
        let now = Utc::now();
        Course {
            id,
            title: "Rust 101".to_string(),
            description: String::new(),
            instructor_id: None,
            status: CourseStatus::Draft,
            enrollment_fee: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn section(id: i64, order: i32) -> Section {
        let now = Utc::now();
        Section {
            id,
            course_id: 1,
            title: format!("Section {id}"),
            description: None,
            order,
            created_at: now,
            updated_at: now,
        }
    }

    fn content(id: i64, section_id: i64, order: i32) -> Content {
        let now = Utc::now();
        Content {
            id,
            section_id,
            title: format!("Lesson {id}"),
            body: String::new(),
            content_type: ContentType::Lesson,
            order,
            is_free: false,
            video_url: None,
            duration_minutes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("draft".parse::<CourseStatus>().unwrap(), CourseStatus::Draft);
        assert_eq!(CourseStatus::Published.as_str(), "published");
        assert!("archived".parse::<CourseStatus>().is_err());
    }

    #[test]
    fn test_assemble_sorts_sections_and_lessons() {
        let tree = CourseTree::assemble(
            course(1),
            vec![section(20, 1), section(10, 0)],
            vec![content(3, 20, 1), content(2, 20, 0), content(1, 10, 0)],
        );

        let ids: Vec<i64> = tree.sections.iter().map(|s| s.section.id).collect();
        assert_eq!(ids, vec![10, 20]);

        let lesson_ids: Vec<i64> = tree.sections[1].lessons.iter().map(|c| c.id).collect();
        assert_eq!(lesson_ids, vec![2, 3]);
        assert_eq!(tree.lesson_count(), 3);
    }

    #[test]
    fn test_assemble_keeps_duplicate_orders_stable_by_id() {
        let tree = CourseTree::assemble(course(1), vec![section(5, 0), section(4, 0)], vec![]);

        let ids: Vec<i64> = tree.sections.iter().map(|s| s.section.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(CoursePatch::default().is_empty());

        let patch = CoursePatch {
            status: Some(CourseStatus::Published),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
