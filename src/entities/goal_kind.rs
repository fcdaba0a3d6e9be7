use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{BRAINLIFT_POINTS, DAILY_GOAL_POINTS};

/// The two habits whose completion is tracked per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum GoalKind {
    #[serde(rename = "brainlift")]
    Brainlift,
    #[serde(rename = "dailyGoal", alias = "daily", alias = "daily_goal")]
    DailyGoal,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::Brainlift => "brainlift",
            GoalKind::DailyGoal => "dailyGoal",
        }
    }

    pub fn parse(value: &str) -> Option<GoalKind> {
        match value.trim() {
            "brainlift" => Some(GoalKind::Brainlift),
            "dailyGoal" | "daily" | "daily_goal" => Some(GoalKind::DailyGoal),
            _ => None,
        }
    }

    pub fn points(&self) -> i64 {
        match self {
            GoalKind::Brainlift => BRAINLIFT_POINTS,
            GoalKind::DailyGoal => DAILY_GOAL_POINTS,
        }
    }
}
