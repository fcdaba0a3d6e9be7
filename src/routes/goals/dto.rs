use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{GoalHistoryEntry, GoalKind, GoalStatus, PlatformCounts, PlatformHandles};
use crate::services::goals::{CompletionOutcome, GoalSnapshot, HistorySummary, LiveAudience};
use crate::utils::ids::de_loose_id;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalCheckResponse {
    pub success: bool,
    pub student_id: i64,
    pub date: String,
    pub brainlift_completed: bool,
    pub daily_goal_completed: bool,
    pub daily_goal: String,
    pub goal_status: GoalStatus,
    pub goals: PlatformCounts,
    pub platforms: PlatformHandles,
    pub audience: PlatformCounts,
    pub points_today: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl GoalCheckResponse {
    pub fn new(snapshot: GoalSnapshot, notice: Option<String>) -> Self {
        GoalCheckResponse {
            success: true,
            student_id: snapshot.student_id,
            date: snapshot.date,
            brainlift_completed: snapshot.brainlift_completed,
            daily_goal_completed: snapshot.daily_goal_completed,
            daily_goal: snapshot.daily_goal,
            goal_status: snapshot.goal_status,
            goals: snapshot.goals,
            platforms: snapshot.platforms,
            audience: snapshot.audience,
            points_today: snapshot.points_today,
            notice,
        }
    }
}

/// Accepted both as a JSON body and as query parameters.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CompleteGoalRequest {
    #[serde(deserialize_with = "de_loose_id")]
    #[schema(value_type = String, example = "7")]
    pub student_id: String,

    #[serde(rename = "type")]
    #[schema(example = "brainlift")]
    pub goal_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteGoalResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub goal_type: GoalKind,
    pub date: String,
    pub points_awarded: i64,
    pub already_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_points: Option<i64>,
    pub queued_for_sync: bool,
    pub message: String,
}

impl From<CompletionOutcome> for CompleteGoalResponse {
    fn from(outcome: CompletionOutcome) -> Self {
        let message = if outcome.already_completed {
            format!("{} already completed today", outcome.kind.as_str())
        } else {
            format!("{} completed, +{} points", outcome.kind.as_str(), outcome.points_awarded)
        };
        CompleteGoalResponse {
            success: true,
            goal_type: outcome.kind,
            date: outcome.date,
            points_awarded: outcome.points_awarded,
            already_completed: outcome.already_completed,
            total_points: outcome.total_points,
            queued_for_sync: outcome.queued_for_sync,
            message,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalQuery {
    /// Day to read or delete, `YYYY-MM-DD`; defaults to today
    pub date: Option<String>,
    /// Number of days ending today
    pub range: Option<u32>,
    /// Every entry the student has
    pub history: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalRequest {
    #[schema(example = "Ship the tokenizer")]
    pub goal_text: Option<String>,

    #[schema(example = "set")]
    pub status: Option<String>,

    #[schema(example = "2026-10-16")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalView {
    pub date: String,
    pub goal_text: String,
    pub status: GoalStatus,
    pub completed: bool,
    pub brainlift_completed: bool,
    pub audience: PlatformCounts,
    pub timestamp: String,
}

impl From<GoalHistoryEntry> for DailyGoalView {
    fn from(entry: GoalHistoryEntry) -> Self {
        DailyGoalView {
            completed: entry.goal_was_completed(),
            date: entry.date,
            goal_text: entry.daily_goal,
            status: entry.goal_status,
            brainlift_completed: entry.brainlift_completed,
            audience: entry.audience,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum DailyGoalBody {
    One { goal: Option<DailyGoalView> },
    Many { goals: Vec<DailyGoalView>, count: usize },
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoalResponse {
    pub success: bool,
    pub student_id: i64,
    #[serde(flatten)]
    pub body: DailyGoalBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDailyGoalResponse {
    pub success: bool,
    pub student_id: i64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Window length in days, 30 by default
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalHistoryResponse {
    pub success: bool,
    pub student_id: i64,
    pub days: u32,
    pub from: String,
    pub to: String,
    pub days_tracked: usize,
    pub goals_set: usize,
    pub goals_completed: usize,
    pub brainlifts_completed: usize,
    pub completion_rate: i64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub brainlift_streak: u32,
    pub history: Vec<DailyGoalView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl GoalHistoryResponse {
    pub fn new(summary: HistorySummary, notice: Option<String>) -> Self {
        GoalHistoryResponse {
            success: true,
            student_id: summary.student_id,
            days: summary.days,
            from: summary.from,
            to: summary.to,
            days_tracked: summary.days_tracked,
            goals_set: summary.goals_set,
            goals_completed: summary.goals_completed,
            brainlifts_completed: summary.brainlifts_completed,
            completion_rate: summary.completion_rate,
            current_streak: summary.current_streak,
            longest_streak: summary.longest_streak,
            brainlift_streak: summary.brainlift_streak,
            history: summary.entries.into_iter().map(DailyGoalView::from).collect(),
            notice,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordAudienceRequest {
    #[serde(deserialize_with = "de_loose_id")]
    #[schema(value_type = String, example = "7")]
    pub student_id: String,

    #[schema(example = "youtube")]
    pub platform: String,

    #[schema(example = 1200)]
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudienceResponse {
    pub success: bool,
    pub student_id: i64,
    pub date: String,
    pub audience: PlatformCounts,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl AudienceResponse {
    pub fn live(student_id: i64, live: LiveAudience, notice: Option<String>) -> Self {
        AudienceResponse {
            success: true,
            student_id,
            date: live.date,
            audience: live.audience,
            errors: live.errors,
            live: Some(live.live),
            notice,
        }
    }
}
