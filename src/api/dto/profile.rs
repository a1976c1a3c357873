//! DTOs for profile endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::{NewProfile, Role};

/// Query parameters for `GET /api/profiles`.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileListQuery {
    pub role: Option<Role>,
}

/// Request body for `POST /api/profiles`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Student
}

impl From<CreateProfileRequest> for NewProfile {
    fn from(req: CreateProfileRequest) -> Self {
        NewProfile {
            email: req.email,
            name: req.name,
            role: req.role,
        }
    }
}

/// Request body for `PATCH /api/profiles/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}
