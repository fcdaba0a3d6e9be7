use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use super::dto::{
    AddStudentRequest, ResetSessionResponse, StudentDetailResponse, StudentListResponse,
    StudentResponse, SyncResponse, UpdateAssignmentRequest, UpdateStudentRequest,
};
use crate::error::{ApiError, ErrorResponse};
use crate::extractor::{CurrentUser, JsonBody, student_id_param};
use crate::services::students::StudentChanges;
use crate::services::{GoalService, ProfileService, StudentService};
use crate::state::AppState;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/students", get(list_students))
        .route("/api/admin/add-student", post(add_student))
        .route(
            "/api/admin/student/{id}",
            get(get_student).post(update_student).delete(delete_student),
        )
        .route("/api/admin/update-student", post(update_assignment))
        .route("/api/admin/reset-session", post(reset_session))
        .route("/api/admin/sync", post(sync_now))
}

/// Active students, from demo data when the record store is unavailable
#[utoipa::path(
    get,
    path = "/api/students",
    responses((status = 200, description = "Active students", body = StudentListResponse)),
    tag = "Students"
)]
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<StudentListResponse>), ApiError> {
    let resolved = StudentService::new(&state).list_active().await;
    let notice = resolved.notice();
    let students = resolved.into_option().unwrap_or_default();

    Ok((
        StatusCode::OK,
        Json(StudentListResponse {
            success: true,
            count: students.len(),
            students,
            notice,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/add-student",
    request_body = AddStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn add_student(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<AddStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    user.require_admin()?;
    let student = StudentService::new(&state).add(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse {
            success: true,
            message: Some(format!("Student {} created", student.id)),
            student,
        }),
    ))
}

async fn student_detail(state: &AppState, student_id: i64) -> Result<StudentDetailResponse, ApiError> {
    let student = StudentService::new(state).get(student_id).await;
    let Some((student, student_notice)) = student.into_parts() else {
        return Err(ApiError::NotFound(format!("Student {} not found", student_id)));
    };
    let profile = ProfileService::new(state).merged(student_id, None).await;
    let profile_notice = profile.notice();
    let profile = profile
        .into_option()
        .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;

    Ok(StudentDetailResponse {
        success: true,
        student,
        profile,
        notice: student_notice.or(profile_notice),
    })
}

#[utoipa::path(
    get,
    path = "/api/admin/student/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student with profile", body = StudentDetailResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<StudentDetailResponse>), ApiError> {
    user.require_admin()?;
    let student_id = student_id_param(&id)?;
    Ok((StatusCode::OK, Json(student_detail(&state, student_id).await?)))
}

#[utoipa::path(
    post,
    path = "/api/admin/student/{id}",
    params(("id" = String, Path, description = "Student id")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentDetailResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn update_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateStudentRequest>,
) -> Result<(StatusCode, Json<StudentDetailResponse>), ApiError> {
    user.require_admin()?;
    let student_id = student_id_param(&id)?;
    let (student_changes, profile_changes) = payload.split();
    if student_changes.is_empty() && profile_changes.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    // Identity first, so an unknown student never gets a profile row
    StudentService::new(&state)
        .update(student_id, student_changes)
        .await?;
    if !profile_changes.is_empty() {
        ProfileService::new(&state)
            .update(student_id, profile_changes)
            .await?;
    }

    Ok((StatusCode::OK, Json(student_detail(&state, student_id).await?)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/student/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student marked deleted", body = StudentResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn delete_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    user.require_admin()?;
    let student_id = student_id_param(&id)?;
    let student = StudentService::new(&state).delete(student_id).await?;

    Ok((
        StatusCode::OK,
        Json(StudentResponse {
            success: true,
            message: Some(format!("Student {} deleted", student_id)),
            student,
        }),
    ))
}

/// Moves a student between houses or flips their honors tier
#[utoipa::path(
    post,
    path = "/api/admin/update-student",
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<UpdateAssignmentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    user.require_admin()?;
    let student_id = student_id_param(&payload.student_id)?;
    let changes = StudentChanges {
        group_id: payload.group_id,
        honors: payload.honors,
        ..Default::default()
    };
    if changes.is_empty() {
        return Err(ApiError::BadRequest(
            "groupId or honors is required".to_string(),
        ));
    }

    let student = StudentService::new(&state).update(student_id, changes).await?;
    Ok((
        StatusCode::OK,
        Json(StudentResponse {
            success: true,
            message: None,
            student,
        }),
    ))
}

/// Clears every student's session goal
#[utoipa::path(
    post,
    path = "/api/admin/reset-session",
    responses(
        (status = 200, description = "Session goals cleared", body = ResetSessionResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn reset_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<(StatusCode, Json<ResetSessionResponse>), ApiError> {
    user.require_admin()?;
    let cleared = ProfileService::new(&state).reset_session_goals().await?;

    Ok((
        StatusCode::OK,
        Json(ResetSessionResponse {
            success: true,
            cleared,
            message: format!("Cleared {} session goals", cleared),
        }),
    ))
}

/// Replays goal completions whose remote write failed
#[utoipa::path(
    post,
    path = "/api/admin/sync",
    responses((status = 200, description = "Queue drained", body = SyncResponse)),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn sync_now(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<(StatusCode, Json<SyncResponse>), ApiError> {
    user.require_admin()?;
    let report = GoalService::new(&state).drain_sync_queue().await;

    Ok((
        StatusCode::OK,
        Json(SyncResponse {
            success: true,
            report,
            remaining: state.sync_queue.len(),
        }),
    ))
}

