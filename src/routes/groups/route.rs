use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use super::dto::{
    AssignStudentsRequest, AssignStudentsResponse, CreateGroupRequest, DeleteGroupRequest,
    DeleteGroupResponse, GroupListResponse, GroupResponse, UpdateGroupRequest,
};
use crate::error::{ApiError, ErrorResponse};
use crate::extractor::{CurrentUser, JsonBody};
use crate::services::students::AssignAction;
use crate::services::{GroupService, StudentService};
use crate::state::AppState;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/groups",
            get(list_groups)
                .post(create_group)
                .put(update_group)
                .delete(delete_group),
        )
        .route("/api/admin/groups/assign-students", post(assign_students))
}

#[utoipa::path(
    get,
    path = "/api/admin/groups",
    responses(
        (status = 200, description = "All groups", body = GroupListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn list_groups(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<(StatusCode, Json<GroupListResponse>), ApiError> {
    user.require_admin()?;
    let resolved = GroupService::new(&state).list().await;
    let notice = resolved.notice();

    Ok((
        StatusCode::OK,
        Json(GroupListResponse {
            success: true,
            groups: resolved.into_option().unwrap_or_default(),
            notice,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Invalid name or color", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn create_group(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    user.require_admin()?;
    let group = GroupService::new(&state)
        .create(
            &payload.name,
            payload.color.as_deref(),
            payload.description.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GroupResponse {
            success: true,
            group,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/groups",
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = GroupResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn update_group(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<UpdateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    user.require_admin()?;
    let group = GroupService::new(&state)
        .update(&payload.id, payload.changes())
        .await?;

    Ok((
        StatusCode::OK,
        Json(GroupResponse {
            success: true,
            group,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/groups",
    request_body = DeleteGroupRequest,
    responses(
        (status = 200, description = "Group deleted", body = DeleteGroupResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn delete_group(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<DeleteGroupRequest>,
) -> Result<(StatusCode, Json<DeleteGroupResponse>), ApiError> {
    user.require_admin()?;
    let (id, unassigned_count) = GroupService::new(&state).delete(&payload.id).await?;

    Ok((
        StatusCode::OK,
        Json(DeleteGroupResponse {
            success: true,
            message: format!("Group {} deleted", id),
            id,
            unassigned_count,
        }),
    ))
}

/// Per-student failures are collected in `errors`; the rest still apply
#[utoipa::path(
    post,
    path = "/api/admin/groups/assign-students",
    request_body = AssignStudentsRequest,
    responses(
        (status = 200, description = "Assignment applied", body = AssignStudentsResponse),
        (status = 400, description = "Invalid action or empty student list", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn assign_students(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<AssignStudentsRequest>,
) -> Result<(StatusCode, Json<AssignStudentsResponse>), ApiError> {
    user.require_admin()?;
    let action = AssignAction::parse(&payload.action).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid action {}, expected assign or unassign",
            payload.action
        ))
    })?;
    if payload.student_ids.is_empty() {
        return Err(ApiError::BadRequest("studentIds must not be empty".to_string()));
    }

    let outcome = StudentService::new(&state)
        .assign(&payload.group_id, &payload.student_ids, action)
        .await?;

    Ok((
        StatusCode::OK,
        Json(AssignStudentsResponse {
            success: true,
            updated_count: outcome.updated_count,
            errors: outcome.errors,
        }),
    ))
}
