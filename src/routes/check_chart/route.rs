use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use super::dto::{
    ChartProgressResponse, ChartTypeQuery, CheckChartResponse, ProgressChangeResponse,
    ProgressQuery, RemoveProgressRequest, ReplaceChartRequest, ReplaceChartResponse,
    SetProgressRequest, StudentProgressResponse, StudentSummaryResponse,
};
use crate::entities::{ChartType, CheckChart};
use crate::error::{ApiError, ErrorResponse};
use crate::extractor::{CurrentUser, JsonBody, QueryParams, student_id_param};
use crate::services::CheckChartService;
use crate::state::AppState;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/checkchart",
            get(get_chart).put(replace_chart),
        )
        .route(
            "/api/admin/checkprogress",
            get(get_progress).post(set_progress).delete(remove_progress),
        )
        .route("/api/student/checkchart", get(student_summary))
}

fn parse_chart_type(value: Option<&str>) -> Result<Option<ChartType>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => ChartType::parse(raw).map(Some).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid chart type {}, expected honors or nonhonors",
                raw
            ))
        }),
        None => Ok(None),
    }
}

/// The Stage → Topic → Task tree for one tier
#[utoipa::path(
    get,
    path = "/api/admin/checkchart",
    params(ChartTypeQuery),
    responses(
        (status = 200, description = "Check chart", body = CheckChartResponse),
        (status = 400, description = "Invalid chart type", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Check Chart"
)]
pub async fn get_chart(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<ChartTypeQuery>,
) -> Result<(StatusCode, Json<CheckChartResponse>), ApiError> {
    user.require_authenticated()?;
    let chart_type = parse_chart_type(query.chart_type.as_deref())?.unwrap_or(ChartType::Honors);

    let resolved = CheckChartService::new(&state).chart(chart_type).await;
    let notice = resolved.notice();
    let chart = resolved
        .into_option()
        .ok_or_else(|| ApiError::NotFound(format!("No {} chart", chart_type.as_str())))?;

    Ok((
        StatusCode::OK,
        Json(CheckChartResponse {
            success: true,
            total_tasks: chart.active_tasks().count(),
            chart,
            notice,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/checkchart",
    params(ChartTypeQuery),
    request_body = ReplaceChartRequest,
    responses(
        (status = 200, description = "Chart replaced", body = ReplaceChartResponse),
        (status = 400, description = "Invalid tasks", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Check Chart"
)]
pub async fn replace_chart(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<ChartTypeQuery>,
    JsonBody(payload): JsonBody<ReplaceChartRequest>,
) -> Result<(StatusCode, Json<ReplaceChartResponse>), ApiError> {
    user.require_admin()?;
    let chart_type = parse_chart_type(query.chart_type.as_deref())?
        .ok_or_else(|| ApiError::BadRequest("type is required".to_string()))?;

    let tasks_written = CheckChartService::new(&state)
        .replace_chart(CheckChart {
            chart_type,
            stages: payload.stages,
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(ReplaceChartResponse {
            success: true,
            chart_type,
            tasks_written,
        }),
    ))
}

/// With `studentId`, one student's progress; with only `chartType`, every
/// completed task of that tier (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/checkprogress",
    params(ProgressQuery),
    responses(
        (status = 200, description = "Student progress, or ChartProgressResponse for a tier", body = StudentProgressResponse),
        (status = 400, description = "studentId or chartType required", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Check Chart"
)]
pub async fn get_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<ProgressQuery>,
) -> Result<Response, ApiError> {
    let chart_type = parse_chart_type(query.chart_type.as_deref())?;
    let service = CheckChartService::new(&state);

    match (query.student_id.as_deref(), chart_type) {
        (Some(raw), chart_type) => {
            let student_id = student_id_param(raw)?;
            user.require_self_or_admin(student_id)?;
            let (progress, notice) = service
                .student_progress(student_id, chart_type)
                .await?
                .into_parts()
                .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;
            Ok((
                StatusCode::OK,
                Json(StudentProgressResponse {
                    success: true,
                    progress,
                    notice,
                }),
            )
                .into_response())
        }
        (None, Some(chart_type)) => {
            user.require_admin()?;
            let resolved = service.chart_progress(chart_type).await;
            let notice = resolved.notice();
            Ok((
                StatusCode::OK,
                Json(ChartProgressResponse {
                    success: true,
                    chart_type,
                    progress: resolved.into_option().unwrap_or_default(),
                    notice,
                }),
            )
                .into_response())
        }
        (None, None) => Err(ApiError::BadRequest(
            "studentId or chartType is required".to_string(),
        )),
    }
}

/// Completing a task awards its points once; reopening it keeps them
#[utoipa::path(
    post,
    path = "/api/admin/checkprogress",
    request_body = SetProgressRequest,
    responses(
        (status = 200, description = "Progress updated", body = ProgressChangeResponse),
        (status = 400, description = "Unknown task", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Check Chart"
)]
pub async fn set_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<SetProgressRequest>,
) -> Result<(StatusCode, Json<ProgressChangeResponse>), ApiError> {
    user.require_admin()?;
    let student_id = student_id_param(&payload.student_id)?;
    let chart_type = parse_chart_type(payload.chart_type.as_deref())?;
    let completed_by = payload
        .admin_email
        .as_deref()
        .or_else(|| user.0.email());

    let change = CheckChartService::new(&state)
        .set_progress(
            student_id,
            chart_type,
            &payload.task_id,
            payload.completed,
            completed_by,
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(ProgressChangeResponse {
            success: true,
            student_id,
            task_id: payload.task_id.trim().to_string(),
            completed: change.completed,
            points_awarded: change.points_awarded,
            total_points: change.total_points,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/checkprogress",
    request_body = RemoveProgressRequest,
    responses(
        (status = 200, description = "Task reopened", body = ProgressChangeResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Check Chart"
)]
pub async fn remove_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<RemoveProgressRequest>,
) -> Result<(StatusCode, Json<ProgressChangeResponse>), ApiError> {
    user.require_admin()?;
    let student_id = student_id_param(&payload.student_id)?;
    let chart_type = parse_chart_type(payload.chart_type.as_deref())?;

    let change = CheckChartService::new(&state)
        .set_progress(student_id, chart_type, &payload.task_id, false, None)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ProgressChangeResponse {
            success: true,
            student_id,
            task_id: payload.task_id.trim().to_string(),
            completed: change.completed,
            points_awarded: change.points_awarded,
            total_points: change.total_points,
        }),
    ))
}

/// Every active student's points and chart progress, most points first
#[utoipa::path(
    get,
    path = "/api/student/checkchart",
    responses(
        (status = 200, description = "Student summaries", body = StudentSummaryResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Check Chart"
)]
pub async fn student_summary(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<(StatusCode, Json<StudentSummaryResponse>), ApiError> {
    user.require_authenticated()?;
    let resolved = CheckChartService::new(&state).student_summary().await;
    let notice = resolved.notice();

    Ok((
        StatusCode::OK,
        Json(StudentSummaryResponse {
            success: true,
            students: resolved.into_option().unwrap_or_default(),
            notice,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_type_accepts_both_spellings() {
        assert_eq!(parse_chart_type(None).unwrap(), None);
        assert_eq!(
            parse_chart_type(Some("non-honors")).unwrap(),
            Some(ChartType::Nonhonors)
        );
        assert!(parse_chart_type(Some("gold")).is_err());
    }
}
