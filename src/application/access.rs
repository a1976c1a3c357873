//! Role and ownership rules shared by the services.
//!
//! - admins manage everything
//! - staff manage the courses they instruct and unassigned courses
//! - students read published courses only

use serde_json::json;

use crate::domain::entities::{Course, Profile};
use crate::error::AppError;

pub fn ensure_author(actor: &Profile) -> Result<(), AppError> {
    if actor.role.can_author() {
        return Ok(());
    }
    Err(AppError::forbidden(
        "Authoring requires the admin or staff role",
        json!({ "role": actor.role }),
    ))
}

pub fn ensure_admin(actor: &Profile) -> Result<(), AppError> {
    if actor.role.is_admin() {
        return Ok(());
    }
    Err(AppError::forbidden(
        "Administrator role required",
        json!({ "role": actor.role }),
    ))
}

pub fn can_manage(actor: &Profile, course: &Course) -> bool {
    match actor.role {
        role if role.is_admin() => true,
        role if role.can_author() => course.instructor_id.is_none_or(|id| id == actor.id),
        _ => false,
    }
}

pub fn ensure_can_manage(actor: &Profile, course: &Course) -> Result<(), AppError> {
    ensure_author(actor)?;
    if can_manage(actor, course) {
        return Ok(());
    }
    Err(AppError::forbidden(
        "Course is owned by another instructor",
        json!({ "course_id": course.id }),
    ))
}

/// Drafts are visible to authors only.
pub fn can_view(actor: &Profile, course: &Course) -> bool {
    actor.role.can_author() || course.is_published()
}
