use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use super::dto::{
    AudienceResponse, CompleteGoalRequest, CompleteGoalResponse, DailyGoalBody, DailyGoalQuery,
    DailyGoalRequest, DailyGoalResponse, DailyGoalView, DeleteDailyGoalResponse,
    GoalCheckResponse, GoalHistoryResponse, HistoryQuery, RecordAudienceRequest,
};
use crate::entities::{GoalHistoryEntry, GoalKind, GoalStatus, Platform};
use crate::error::{ApiError, ErrorResponse};
use crate::extractor::{CurrentUser, JsonBody, LocalGoals, QueryParams, student_id_param};
use crate::services::GoalService;
use crate::services::goals::{DEFAULT_HISTORY_DAYS, MAX_HISTORY_DAYS};
use crate::state::AppState;
use crate::utils::clock::normalize_date;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/goals/check/{student_id}", get(check_goals))
        .route(
            "/api/goals/complete",
            post(complete_goal).get(complete_goal_query),
        )
        .route(
            "/api/goals/daily/{student_id}",
            get(get_daily_goal)
                .post(set_daily_goal)
                .put(update_daily_goal)
                .delete(delete_daily_goal),
        )
        .route("/api/goals/history/{student_id}", get(goal_history))
        .route("/api/goals/audience", post(record_audience))
        .route("/api/goals/audience/{student_id}", get(live_audience))
}

fn parse_status(status: Option<&str>) -> Result<Option<GoalStatus>, ApiError> {
    match status.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => GoalStatus::parse(raw).map(Some).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid status {}, expected set, completed, not met or not set",
                raw
            ))
        }),
        None => Ok(None),
    }
}

#[utoipa::path(
    get,
    path = "/api/goals/check/{student_id}",
    params(("student_id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Today's goal state", body = GoalCheckResponse),
        (status = 403, description = "Another student's goals", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn check_goals(
    State(state): State<AppState>,
    user: CurrentUser,
    local_goals: LocalGoals,
    Path(student_id): Path<String>,
) -> Result<(StatusCode, Json<GoalCheckResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;

    let header = local_goals.flags(student_id, &state.today());
    let (snapshot, notice) = GoalService::new(&state)
        .snapshot(student_id, header.as_ref())
        .await
        .into_parts()
        .ok_or_else(|| ApiError::NotFound(format!("Student {} not found", student_id)))?;

    Ok((StatusCode::OK, Json(GoalCheckResponse::new(snapshot, notice))))
}

async fn complete(
    state: &AppState,
    user: &CurrentUser,
    local_goals: &LocalGoals,
    request: CompleteGoalRequest,
) -> Result<CompleteGoalResponse, ApiError> {
    let student_id = student_id_param(&request.student_id)?;
    user.require_self_or_admin(student_id)?;
    let kind = GoalKind::parse(&request.goal_type).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid goal type {}, expected brainlift or dailyGoal",
            request.goal_type
        ))
    })?;

    let header = local_goals.flags(student_id, &state.today());
    let outcome = GoalService::new(state)
        .complete(student_id, kind, header.as_ref())
        .await?;
    Ok(outcome.into())
}

/// Awards 10 points for a brainlift and 5 for a daily goal, once per day each
#[utoipa::path(
    post,
    path = "/api/goals/complete",
    request_body = CompleteGoalRequest,
    responses(
        (status = 200, description = "Goal completed", body = CompleteGoalResponse),
        (status = 400, description = "Invalid goal type", body = ErrorResponse),
        (status = 403, description = "Another student's goals", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn complete_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    local_goals: LocalGoals,
    JsonBody(payload): JsonBody<CompleteGoalRequest>,
) -> Result<(StatusCode, Json<CompleteGoalResponse>), ApiError> {
    let response = complete(&state, &user, &local_goals, payload).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/goals/complete",
    params(CompleteGoalRequest),
    responses(
        (status = 200, description = "Goal completed", body = CompleteGoalResponse),
        (status = 400, description = "Invalid goal type", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn complete_goal_query(
    State(state): State<AppState>,
    user: CurrentUser,
    local_goals: LocalGoals,
    QueryParams(query): QueryParams<CompleteGoalRequest>,
) -> Result<(StatusCode, Json<CompleteGoalResponse>), ApiError> {
    let response = complete(&state, &user, &local_goals, query).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// One day (`?date=`), the last N days (`?range=N`) or everything
/// (`?history=true`)
#[utoipa::path(
    get,
    path = "/api/goals/daily/{student_id}",
    params(("student_id" = String, Path, description = "Student id"), DailyGoalQuery),
    responses(
        (status = 200, description = "Daily goals", body = DailyGoalResponse),
        (status = 400, description = "Invalid date", body = ErrorResponse),
        (status = 403, description = "Another student's goals", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn get_daily_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    QueryParams(query): QueryParams<DailyGoalQuery>,
) -> Result<(StatusCode, Json<DailyGoalResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;
    let service = GoalService::new(&state);

    let many = |entries: Vec<GoalHistoryEntry>| {
        let goals: Vec<DailyGoalView> = entries.into_iter().map(DailyGoalView::from).collect();
        DailyGoalBody::Many {
            count: goals.len(),
            goals,
        }
    };

    let (body, notice) = if query.history.unwrap_or(false) {
        let resolved = service.daily_history(student_id).await;
        let notice = resolved.notice();
        (many(resolved.into_option().unwrap_or_default()), notice)
    } else if let Some(range) = query.range {
        let resolved = service
            .daily_range(student_id, range.clamp(1, MAX_HISTORY_DAYS))
            .await;
        let notice = resolved.notice();
        (many(resolved.into_option().unwrap_or_default()), notice)
    } else {
        let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => normalize_date(raw).ok_or_else(|| {
                ApiError::BadRequest(format!("Invalid date {}, expected YYYY-MM-DD", raw))
            })?,
            None => state.today(),
        };
        let resolved = service.daily_on(student_id, &date).await;
        let notice = resolved.notice();
        let goal = resolved.into_option().flatten().map(DailyGoalView::from);
        (DailyGoalBody::One { goal }, notice)
    };

    Ok((
        StatusCode::OK,
        Json(DailyGoalResponse {
            success: true,
            student_id,
            body,
            notice,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/goals/daily/{student_id}",
    params(("student_id" = String, Path, description = "Student id")),
    request_body = DailyGoalRequest,
    responses(
        (status = 200, description = "Goal saved", body = DailyGoalResponse),
        (status = 400, description = "Missing goal text or invalid status", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn set_daily_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    JsonBody(payload): JsonBody<DailyGoalRequest>,
) -> Result<(StatusCode, Json<DailyGoalResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;
    let status = parse_status(payload.status.as_deref())?;

    let written = GoalService::new(&state)
        .set_daily(
            student_id,
            payload.date.as_deref(),
            payload.goal_text.as_deref().unwrap_or_default(),
            status,
        )
        .await?;
    let notice = written.notice();

    Ok((
        StatusCode::OK,
        Json(DailyGoalResponse {
            success: true,
            student_id,
            body: DailyGoalBody::One {
                goal: Some(written.value.into()),
            },
            notice,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/goals/daily/{student_id}",
    params(("student_id" = String, Path, description = "Student id")),
    request_body = DailyGoalRequest,
    responses(
        (status = 200, description = "Goal updated", body = DailyGoalResponse),
        (status = 400, description = "Nothing to update or invalid status", body = ErrorResponse),
        (status = 404, description = "No goal on that date", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn update_daily_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    JsonBody(payload): JsonBody<DailyGoalRequest>,
) -> Result<(StatusCode, Json<DailyGoalResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;
    let status = parse_status(payload.status.as_deref())?;

    let written = GoalService::new(&state)
        .update_daily(
            student_id,
            payload.date.as_deref(),
            payload.goal_text.as_deref(),
            status,
        )
        .await?;
    let notice = written.notice();

    Ok((
        StatusCode::OK,
        Json(DailyGoalResponse {
            success: true,
            student_id,
            body: DailyGoalBody::One {
                goal: Some(written.value.into()),
            },
            notice,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/goals/daily/{student_id}",
    params(("student_id" = String, Path, description = "Student id"), DailyGoalQuery),
    responses(
        (status = 200, description = "Goal deleted", body = DeleteDailyGoalResponse),
        (status = 404, description = "No goal on that date", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn delete_daily_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    QueryParams(query): QueryParams<DailyGoalQuery>,
) -> Result<(StatusCode, Json<DeleteDailyGoalResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;

    let deleted = GoalService::new(&state)
        .delete_daily(student_id, query.date.as_deref())
        .await?;
    let notice = deleted.notice();

    Ok((
        StatusCode::OK,
        Json(DeleteDailyGoalResponse {
            success: true,
            student_id,
            date: deleted.value,
            notice,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/goals/history/{student_id}",
    params(("student_id" = String, Path, description = "Student id"), HistoryQuery),
    responses(
        (status = 200, description = "History summary with streaks", body = GoalHistoryResponse),
        (status = 403, description = "Another student's goals", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn goal_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(student_id): Path<String>,
    QueryParams(query): QueryParams<HistoryQuery>,
) -> Result<(StatusCode, Json<GoalHistoryResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;

    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    let (summary, notice) = GoalService::new(&state)
        .history_summary(student_id, days)
        .await
        .into_parts()
        .ok_or_else(|| ApiError::NotFound(format!("No history for student {}", student_id)))?;

    Ok((StatusCode::OK, Json(GoalHistoryResponse::new(summary, notice))))
}

/// Raises today's audience count for one platform; lower counts are ignored
#[utoipa::path(
    post,
    path = "/api/goals/audience",
    request_body = RecordAudienceRequest,
    responses(
        (status = 200, description = "Audience recorded", body = AudienceResponse),
        (status = 400, description = "Invalid platform or count", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn record_audience(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<RecordAudienceRequest>,
) -> Result<(StatusCode, Json<AudienceResponse>), ApiError> {
    let student_id = student_id_param(&payload.student_id)?;
    user.require_self_or_admin(student_id)?;
    let platform = Platform::parse(&payload.platform).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid platform {}, expected x, youtube, tiktok or instagram",
            payload.platform
        ))
    })?;

    let written = GoalService::new(&state)
        .record_audience(student_id, platform, payload.count)
        .await?;
    let notice = written.notice();

    Ok((
        StatusCode::OK,
        Json(AudienceResponse {
            success: true,
            student_id,
            date: written.value.date,
            audience: written.value.audience,
            errors: Vec::new(),
            live: None,
            notice,
        }),
    ))
}

/// Looks up follower counts for the student's platform handles
#[utoipa::path(
    get,
    path = "/api/goals/audience/{student_id}",
    params(("student_id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Today's audience", body = AudienceResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Goals"
)]
pub async fn live_audience(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(student_id): Path<String>,
) -> Result<(StatusCode, Json<AudienceResponse>), ApiError> {
    let student_id = student_id_param(&student_id)?;
    user.require_self_or_admin(student_id)?;

    let written = GoalService::new(&state).live_audience(student_id).await?;
    let notice = written.notice();

    Ok((
        StatusCode::OK,
        Json(AudienceResponse::live(student_id, written.value, notice)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_optional_but_must_be_known() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("  ")).unwrap(), None);
        assert_eq!(parse_status(Some("completed")).unwrap(), Some(GoalStatus::Completed));
        assert!(matches!(parse_status(Some("done")), Err(ApiError::BadRequest(_))));
    }
}
