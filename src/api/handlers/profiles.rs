//! Handlers for the current user, dashboards and profile administration.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::course::ListResponse;
use crate::api::dto::profile::{CreateProfileRequest, ProfileListQuery, UpdateRoleRequest};
use crate::application::services::Dashboard;
use crate::domain::entities::Profile;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the authenticated profile.
///
/// # Endpoint
///
/// `GET /api/me`
pub async fn me_handler(Extension(actor): Extension<Profile>) -> Json<Profile> {
    Json(actor)
}

/// Returns the dashboard for the caller's role.
///
/// # Endpoint
///
/// `GET /api/dashboard`
///
/// ```json
/// { "role": "admin", "courses": { "total": 3, "published": 1, "draft": 2 }, "profiles": { ... } }
/// { "role": "staff", "courses": [ ... ] }
/// ```
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
) -> Result<Json<Dashboard>, AppError> {
    let dashboard = state.dashboard_service.for_profile(&actor).await?;

    Ok(Json(dashboard))
}

/// `GET /api/profiles?role=staff` (admin only)
pub async fn profile_list_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Query(query): Query<ProfileListQuery>,
) -> Result<Json<ListResponse<Profile>>, AppError> {
    let profiles = state.profile_service.list(&actor, query.role).await?;

    Ok(Json(profiles.into()))
}

/// Registers a profile (admin only).
///
/// # Endpoint
///
/// `POST /api/profiles`
///
/// # Errors
///
/// Returns 409 Conflict if the email is already registered.
pub async fn create_profile_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    payload.validate()?;

    let profile = state.profile_service.create(&actor, payload.into()).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Changes a profile's role (admin only).
///
/// # Endpoint
///
/// `PATCH /api/profiles/{id}/role`
pub async fn update_role_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(actor): Extension<Profile>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = state
        .profile_service
        .update_role(&actor, id, payload.role)
        .await?;

    Ok(Json(profile))
}
