use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use super::dto::{ProfileResponse, UpdateProfileRequest};
use crate::error::{ApiError, ErrorResponse};
use crate::extractor::{CurrentUser, JsonBody, LocalGoals, student_id_param};
use crate::services::ProfileService;
use crate::services::profiles::ProfileChanges;
use crate::state::AppState;

pub fn create_route() -> Router<AppState> {
    Router::new().route(
        "/api/profile/{student_id}",
        get(get_profile).put(update_profile),
    )
}

/// Profile with today's completion flags merged in. An `x-local-goals`
/// header carrying the browser's copy of today's completions takes
/// precedence over server-side state.
#[utoipa::path(
    get,
    path = "/api/profile/{student_id}",
    params(
        ("student_id" = String, Path, description = "Student id"),
        ("x-local-goals" = Option<String>, Header, description = "Browser copy of today's completions")
    ),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Another student's profile", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    local_goals: LocalGoals,
    Path(student_id): Path<String>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;

    let header = local_goals.flags(student_id, &state.today());
    let resolved = ProfileService::new(&state)
        .merged(student_id, header.as_ref())
        .await;
    let (profile, notice) = resolved
        .into_parts()
        .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            success: true,
            profile,
            notice,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/profile/{student_id}",
    params(("student_id" = String, Path, description = "Student id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 403, description = "Another student's profile", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;

    let changes = ProfileChanges::from(payload);
    if changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    let profile = ProfileService::new(&state).update(student_id, changes).await?;

    Ok((
        StatusCode::OK,
        Json(ProfileResponse {
            success: true,
            profile,
            notice: None,
        }),
    ))
}
