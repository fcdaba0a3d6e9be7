use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SheetRecord;
use super::platform::{Platform, PlatformCounts};
use crate::record_store::Sheet;
use crate::record_store::client::compose_key;
use crate::utils::cells::{cell, format_bool, parse_bool, parse_int};
use crate::utils::clock::normalize_date;
use crate::utils::ids::parse_student_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum GoalStatus {
    #[serde(rename = "set")]
    Set,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "not met")]
    NotMet,
    #[serde(rename = "not set")]
    NotSet,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Set => "set",
            GoalStatus::Completed => "completed",
            GoalStatus::NotMet => "not met",
            GoalStatus::NotSet => "not set",
        }
    }

    pub fn parse(value: &str) -> Option<GoalStatus> {
        match value.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "set" => Some(GoalStatus::Set),
            "completed" => Some(GoalStatus::Completed),
            "not met" => Some(GoalStatus::NotMet),
            "not set" => Some(GoalStatus::NotSet),
            _ => None,
        }
    }
}

/// One student's goal record for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalHistoryEntry {
    pub student_id: i64,
    pub date: String,
    pub daily_goal: String,
    pub goal_status: GoalStatus,
    pub brainlift_completed: bool,
    pub daily_goal_completed: bool,
    pub audience: PlatformCounts,
    pub timestamp: String,
}

impl GoalHistoryEntry {
    pub fn new(student_id: i64, date: &str, timestamp: &str) -> Self {
        GoalHistoryEntry {
            student_id,
            date: date.to_string(),
            daily_goal: String::new(),
            goal_status: GoalStatus::NotSet,
            brainlift_completed: false,
            daily_goal_completed: false,
            audience: PlatformCounts::default(),
            timestamp: timestamp.to_string(),
        }
    }

    pub fn goal_was_set(&self) -> bool {
        !self.daily_goal.trim().is_empty() || self.goal_status != GoalStatus::NotSet
    }

    pub fn goal_was_completed(&self) -> bool {
        self.daily_goal_completed || self.goal_status == GoalStatus::Completed
    }
}

mod col {
    pub const STUDENT_ID: usize = 0;
    pub const DATE: usize = 1;
    pub const DAILY_GOAL: usize = 2;
    pub const GOAL_STATUS: usize = 3;
    pub const BRAINLIFT_COMPLETED: usize = 4;
    pub const DAILY_GOAL_COMPLETED: usize = 5;
    pub const AUDIENCE: usize = 6;
    pub const TIMESTAMP: usize = 10;
}

impl SheetRecord for GoalHistoryEntry {
    const SHEET: Sheet = Sheet::GoalHistory;
    const KEY_COLUMNS: &'static [usize] = &[col::STUDENT_ID, col::DATE];

    fn key(&self) -> String {
        compose_key(&[&self.student_id.to_string(), &self.date])
    }

    fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            self.student_id.to_string(),
            self.date.clone(),
            self.daily_goal.clone(),
            self.goal_status.as_str().to_string(),
            format_bool(self.brainlift_completed),
            format_bool(self.daily_goal_completed),
        ];
        row.extend(Platform::ALL.iter().map(|p| self.audience.get(*p).to_string()));
        row.push(self.timestamp.clone());
        row
    }

    fn from_row(row: &[String]) -> Option<Self> {
        let student_id = parse_student_id(cell(row, col::STUDENT_ID))?;
        let date = normalize_date(cell(row, col::DATE))?;
        let daily_goal = cell(row, col::DAILY_GOAL).to_string();
        let daily_goal_completed = parse_bool(cell(row, col::DAILY_GOAL_COMPLETED));
        let goal_status = GoalStatus::parse(cell(row, col::GOAL_STATUS)).unwrap_or(
            match (daily_goal_completed, daily_goal.trim().is_empty()) {
                (true, _) => GoalStatus::Completed,
                (false, false) => GoalStatus::Set,
                (false, true) => GoalStatus::NotSet,
            },
        );

        let mut audience = PlatformCounts::default();
        for (offset, platform) in Platform::ALL.iter().enumerate() {
            audience.set(*platform, parse_int(cell(row, col::AUDIENCE + offset)));
        }

        Some(GoalHistoryEntry {
            student_id,
            date,
            daily_goal,
            goal_status,
            brainlift_completed: parse_bool(cell(row, col::BRAINLIFT_COMPLETED)),
            daily_goal_completed,
            audience,
            timestamp: cell(row, col::TIMESTAMP).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_loose_spellings() {
        assert_eq!(GoalStatus::parse("Not_Met"), Some(GoalStatus::NotMet));
        assert_eq!(GoalStatus::parse("not-set"), Some(GoalStatus::NotSet));
        assert_eq!(GoalStatus::parse("done"), None);
        assert_eq!(
            serde_json::to_string(&GoalStatus::NotMet).unwrap(),
            "\"not met\""
        );
    }

    #[test]
    fn missing_status_is_inferred() {
        let row: Vec<String> = ["9", "2026-10-16", "Ship v1", "", "FALSE", "TRUE"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let entry = GoalHistoryEntry::from_row(&row).unwrap();
        assert_eq!(entry.goal_status, GoalStatus::Completed);
        assert!(entry.goal_was_set());
        assert!(entry.goal_was_completed());
    }

    #[test]
    fn rows_without_a_date_are_skipped() {
        let row: Vec<String> = vec!["9".to_string(), String::new()];
        assert!(GoalHistoryEntry::from_row(&row).is_none());
    }
}
