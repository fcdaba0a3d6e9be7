use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SheetRecord;
use super::platform::{Platform, PlatformCounts, PlatformHandles};
use crate::record_store::Sheet;
use crate::utils::cells::{cell, format_bool, non_empty, parse_int};
use crate::utils::clock::normalize_date;
use crate::utils::ids::parse_student_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub student_id: i64,
    pub daily_goal: String,
    pub session_goal: String,
    pub project_oneliner: String,
    pub brainlift_completed: bool,
    pub last_brainlift_date: Option<String>,
    pub daily_goal_completed: bool,
    pub last_daily_goal_date: Option<String>,
    pub goals: PlatformCounts,
    pub platforms: PlatformHandles,
}

impl Profile {
    /// The profile of a student with no stored record.
    pub fn empty(student_id: i64) -> Self {
        Profile {
            student_id,
            daily_goal: String::new(),
            session_goal: String::new(),
            project_oneliner: String::new(),
            brainlift_completed: false,
            last_brainlift_date: None,
            daily_goal_completed: false,
            last_daily_goal_date: None,
            goals: PlatformCounts::default(),
            platforms: PlatformHandles::default(),
        }
    }

    /// Recomputes the completion flags from the stored dates. A stored `true`
    /// means nothing unless its date is today.
    pub fn derive_completion(&mut self, today: &str) {
        self.brainlift_completed = self.last_brainlift_date.as_deref() == Some(today);
        self.daily_goal_completed = self.last_daily_goal_date.as_deref() == Some(today);
    }
}

mod col {
    pub const STUDENT_ID: usize = 0;
    pub const DAILY_GOAL: usize = 1;
    pub const SESSION_GOAL: usize = 2;
    pub const PROJECT_ONELINER: usize = 3;
    pub const BRAINLIFT_COMPLETED: usize = 4;
    pub const LAST_BRAINLIFT_DATE: usize = 5;
    pub const DAILY_GOAL_COMPLETED: usize = 6;
    pub const LAST_DAILY_GOAL_DATE: usize = 7;
    pub const GOALS: usize = 8;
    pub const PLATFORMS: usize = 12;
}

pub const SESSION_GOAL_COLUMN: usize = col::SESSION_GOAL;

impl SheetRecord for Profile {
    const SHEET: Sheet = Sheet::Profiles;
    const KEY_COLUMNS: &'static [usize] = &[col::STUDENT_ID];

    fn key(&self) -> String {
        self.student_id.to_string()
    }

    fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            self.student_id.to_string(),
            self.daily_goal.clone(),
            self.session_goal.clone(),
            self.project_oneliner.clone(),
            format_bool(self.brainlift_completed),
            self.last_brainlift_date.clone().unwrap_or_default(),
            format_bool(self.daily_goal_completed),
            self.last_daily_goal_date.clone().unwrap_or_default(),
        ];
        row.extend(Platform::ALL.iter().map(|p| self.goals.get(*p).to_string()));
        row.extend(Platform::ALL.iter().map(|p| self.platforms.get(*p).to_string()));
        row
    }

    fn from_row(row: &[String]) -> Option<Self> {
        let student_id = parse_student_id(cell(row, col::STUDENT_ID))?;
        let mut goals = PlatformCounts::default();
        let mut handles = PlatformHandles::default();
        for (offset, platform) in Platform::ALL.iter().enumerate() {
            goals.set(*platform, parse_int(cell(row, col::GOALS + offset)));
            let handle = cell(row, col::PLATFORMS + offset).trim().to_string();
            match platform {
                Platform::X => handles.x = handle,
                Platform::Youtube => handles.youtube = handle,
                Platform::Tiktok => handles.tiktok = handle,
                Platform::Instagram => handles.instagram = handle,
            }
        }

        Some(Profile {
            student_id,
            daily_goal: cell(row, col::DAILY_GOAL).to_string(),
            session_goal: cell(row, col::SESSION_GOAL).to_string(),
            project_oneliner: cell(row, col::PROJECT_ONELINER).to_string(),
            // Completion flags are derived from the dates at read time
            brainlift_completed: false,
            last_brainlift_date: non_empty(cell(row, col::LAST_BRAINLIFT_DATE))
                .and_then(|d| normalize_date(&d)),
            daily_goal_completed: false,
            last_daily_goal_date: non_empty(cell(row, col::LAST_DAILY_GOAL_DATE))
                .and_then(|d| normalize_date(&d)),
            goals,
            platforms: handles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn stale_true_flags_are_ignored() {
        let mut profile = Profile::from_row(&row(&[
            "5",
            "Write chapter 2",
            "",
            "",
            "TRUE",
            "2026-10-15",
            "TRUE",
            "2026-10-15T08:00:00.000Z",
        ]))
        .unwrap();

        profile.derive_completion("2026-10-16");
        assert!(!profile.brainlift_completed);
        assert!(!profile.daily_goal_completed);

        profile.derive_completion("2026-10-15");
        assert!(profile.brainlift_completed);
        assert!(profile.daily_goal_completed);
    }

    #[test]
    fn goals_and_handles_map_by_platform() {
        let profile = Profile::from_row(&row(&[
            "5", "", "", "", "", "", "", "", "100", "50", "", "20", "@ada", "", "ada.tt", "",
        ]))
        .unwrap();

        assert_eq!(profile.goals.get(Platform::X), 100);
        assert_eq!(profile.goals.get(Platform::Tiktok), 0);
        assert_eq!(profile.platforms.get(Platform::X), "@ada");
        assert_eq!(profile.platforms.get(Platform::Tiktok), "ada.tt");
        assert_eq!(profile.to_row().len(), Sheet::Profiles.headers().len());
    }
}
