use serde::{Deserialize, Serialize};

use crate::entities::{GoalKind, Profile};

/// Completion state kept outside the record store. Every field is optional;
/// a missing field leaves the lower tier's value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brainlift_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_brainlift_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_goal_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_daily_goal_date: Option<String>,
}

impl CompletionFlags {
    pub fn mark(&mut self, kind: GoalKind, date: &str) {
        match kind {
            GoalKind::Brainlift => {
                self.brainlift_completed = Some(true);
                self.last_brainlift_date = Some(date.to_string());
            }
            GoalKind::DailyGoal => {
                self.daily_goal_completed = Some(true);
                self.last_daily_goal_date = Some(date.to_string());
            }
        }
    }

    pub fn is_completed(&self, kind: GoalKind) -> bool {
        let flag = match kind {
            GoalKind::Brainlift => self.brainlift_completed,
            GoalKind::DailyGoal => self.daily_goal_completed,
        };
        flag.unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        *self == CompletionFlags::default()
    }
}

fn overlay(completed: &mut bool, date: &mut Option<String>, flag: Option<bool>, new_date: &Option<String>, today: &str) {
    if let Some(new_date) = new_date {
        *date = Some(new_date.clone());
    }
    // A flag only speaks for the day its own date names
    match flag {
        Some(flag) => *completed = flag && new_date.as_deref().is_none_or(|d| d == today),
        None if new_date.is_some() => *completed = date.as_deref() == Some(today),
        None => {}
    }
}

/// Derives today's completion from the profile's own dates, then applies
/// each layer in order so later layers win. Only the completion flags and
/// their dates are touched.
pub fn merge_completion(profile: &mut Profile, today: &str, layers: &[&CompletionFlags]) {
    profile.derive_completion(today);

    for layer in layers {
        overlay(
            &mut profile.brainlift_completed,
            &mut profile.last_brainlift_date,
            layer.brainlift_completed,
            &layer.last_brainlift_date,
            today,
        );
        overlay(
            &mut profile.daily_goal_completed,
            &mut profile.last_daily_goal_date,
            layer.daily_goal_completed,
            &layer.last_daily_goal_date,
            today,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "2026-10-16";

    fn remote_profile() -> Profile {
        let mut profile = Profile::empty(4);
        profile.daily_goal = "Read two papers".to_string();
        profile.last_brainlift_date = Some("2026-10-15".to_string());
        profile
    }

    #[test]
    fn local_override_beats_remote() {
        let mut profile = remote_profile();
        let mut mirror = CompletionFlags::default();
        mirror.mark(GoalKind::Brainlift, TODAY);

        merge_completion(&mut profile, TODAY, &[&mirror]);

        assert!(profile.brainlift_completed);
        assert_eq!(profile.last_brainlift_date.as_deref(), Some(TODAY));
        assert_eq!(profile.daily_goal, "Read two papers");
    }

    #[test]
    fn without_overrides_remote_is_unchanged() {
        let mut profile = remote_profile();
        merge_completion(&mut profile, TODAY, &[]);

        assert!(!profile.brainlift_completed);
        assert_eq!(profile.last_brainlift_date.as_deref(), Some("2026-10-15"));
    }

    #[test]
    fn later_layers_win() {
        let mut profile = remote_profile();
        let in_process = CompletionFlags {
            daily_goal_completed: Some(true),
            last_daily_goal_date: Some(TODAY.to_string()),
            ..Default::default()
        };
        let header = CompletionFlags {
            daily_goal_completed: Some(false),
            ..Default::default()
        };

        merge_completion(&mut profile, TODAY, &[&in_process, &header]);

        assert!(!profile.daily_goal_completed);
        assert_eq!(profile.last_daily_goal_date.as_deref(), Some(TODAY));
    }

    #[test]
    fn date_only_layer_derives_the_flag() {
        let mut profile = remote_profile();
        let layer = CompletionFlags {
            last_brainlift_date: Some(TODAY.to_string()),
            ..Default::default()
        };

        merge_completion(&mut profile, TODAY, &[&layer]);
        assert!(profile.brainlift_completed);
    }

    #[test]
    fn flag_from_another_day_does_not_count() {
        let mut profile = remote_profile();
        let layer = CompletionFlags {
            brainlift_completed: Some(true),
            last_brainlift_date: Some("2026-10-01".to_string()),
            ..Default::default()
        };

        merge_completion(&mut profile, TODAY, &[&layer]);
        assert!(!profile.brainlift_completed);
    }
}
