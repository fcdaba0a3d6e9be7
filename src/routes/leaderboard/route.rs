use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use super::dto::{LeaderboardQuery, LeaderboardResponse};
use crate::config::DEMO_DATA_NOTICE;
use crate::error::{ApiError, ErrorResponse};
use crate::extractor::{CurrentUser, QueryParams};
use crate::services::LeaderboardService;
use crate::services::leaderboard::{LeaderboardType, Period};
use crate::state::AppState;

pub fn create_route() -> Router<AppState> {
    Router::new().route("/api/leaderboard", get(get_leaderboard))
}

fn parse_board(value: Option<&str>) -> Result<LeaderboardType, ApiError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("daily") | Some("dailygoal") => Ok(LeaderboardType::Daily),
        Some("brainlift") => Ok(LeaderboardType::Brainlift),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Invalid type {}, expected daily or brainlift",
            other
        ))),
    }
}

fn parse_period(value: Option<&str>) -> Result<Period, ApiError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("week") => Ok(Period::Week),
        Some("today") => Ok(Period::Today),
        Some("month") => Ok(Period::Month),
        Some("all") => Ok(Period::All),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Invalid period {}, expected today, week, month or all",
            other
        ))),
    }
}

/// House standings for a window: +10 per student with a credited day, -10
/// per student without one
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "House and student standings", body = LeaderboardResponse),
        (status = 400, description = "Invalid type or period", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leaderboard"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<LeaderboardQuery>,
) -> Result<(StatusCode, Json<LeaderboardResponse>), ApiError> {
    user.require_authenticated()?;
    let board = parse_board(query.board.as_deref())?;
    let period = parse_period(query.period.as_deref())?;

    let (leaderboard, used_fallback) = LeaderboardService::new(&state)
        .compute(board, period, query.group_id.as_deref())
        .await;

    Ok((
        StatusCode::OK,
        Json(LeaderboardResponse {
            success: true,
            board,
            period,
            from: leaderboard.from,
            to: leaderboard.to,
            houses: leaderboard.houses,
            students: leaderboard.students,
            notice: used_fallback.then(|| DEMO_DATA_NOTICE.to_string()),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_and_period_default_and_validate() {
        assert_eq!(parse_board(None).unwrap(), LeaderboardType::Daily);
        assert_eq!(parse_board(Some("Brainlift")).unwrap(), LeaderboardType::Brainlift);
        assert!(parse_board(Some("weekly")).is_err());

        assert_eq!(parse_period(None).unwrap(), Period::Week);
        assert_eq!(parse_period(Some("ALL")).unwrap(), Period::All);
        assert!(parse_period(Some("year")).is_err());
    }
}
