//! DTOs for course endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::domain::entities::{CoursePatch, CourseStatus, NewCourse};

/// Query parameters for `GET /api/courses`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct CourseListQuery {
    #[serde(default)]
    pub status: Option<CourseStatus>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub instructor_id: Option<i64>,
}

/// Request body for `POST /api/courses`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 10000))]
    pub description: String,

    pub instructor_id: Option<i64>,

    #[serde(default)]
    pub status: CourseStatus,

    /// Minor currency units.
    #[serde(default)]
    #[validate(range(min = 0, message = "Enrollment fee must not be negative"))]
    pub enrollment_fee: i64,
}

impl From<CreateCourseRequest> for NewCourse {
    fn from(req: CreateCourseRequest) -> Self {
        NewCourse {
            title: req.title,
            description: req.description,
            instructor_id: req.instructor_id,
            status: req.status,
            enrollment_fee: req.enrollment_fee,
        }
    }
}

/// Request body for `PATCH /api/courses/{id}` and for course edits inside
/// an editor session.
///
/// `instructor_id`: absent = unchanged, `null` = unassign.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000))]
    pub description: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub instructor_id: Option<Option<i64>>,

    pub status: Option<CourseStatus>,

    #[validate(range(min = 0, message = "Enrollment fee must not be negative"))]
    pub enrollment_fee: Option<i64>,
}

impl From<UpdateCourseRequest> for CoursePatch {
    fn from(req: UpdateCourseRequest) -> Self {
        CoursePatch {
            title: req.title,
            description: req.description,
            instructor_id: req.instructor_id,
            status: req.status,
            enrollment_fee: req.enrollment_fee,
        }
    }
}

/// Generic list wrapper.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: UpdateCourseRequest = serde_json::from_value(json!({ "title": "T" })).unwrap();
        assert_eq!(absent.instructor_id, None);

        let cleared: UpdateCourseRequest =
            serde_json::from_value(json!({ "instructor_id": null })).unwrap();
        assert_eq!(cleared.instructor_id, Some(None));
    }

    #[test]
    fn test_create_rejects_empty_title_and_negative_fee() {
        let req: CreateCourseRequest =
            serde_json::from_value(json!({ "title": "", "enrollment_fee": -1 })).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("enrollment_fee"));
    }
}
