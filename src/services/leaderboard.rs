use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{HOUSE_POINTS_COMPLETED, HOUSE_POINTS_MISSED};
use crate::entities::{GoalHistoryEntry, Group, Student};
use crate::fallback::defaults::demo_groups;
use crate::state::AppState;
use crate::utils::clock::format_date;
use crate::utils::ids::ids_match;

use super::goals::{daily_goal_met, window_start};
use super::resolution::{resolve_list, resolve_rows};
use super::students::StudentService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardType {
    Daily,
    Brainlift,
}

impl LeaderboardType {
    /// Whether the board's completion flag is set on an entry.
    pub fn counts(&self, entry: &GoalHistoryEntry) -> bool {
        match self {
            LeaderboardType::Daily => entry.daily_goal_completed,
            LeaderboardType::Brainlift => entry.brainlift_completed,
        }
    }

    /// Whether an entry earns house credit for this board.
    pub fn credits(&self, entry: &GoalHistoryEntry) -> bool {
        match self {
            LeaderboardType::Daily => daily_goal_met(entry),
            // Brainlift has no set step
            LeaderboardType::Brainlift => entry.brainlift_completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    All,
}

impl Period {
    /// Inclusive `(from, to)` date strings; `None` bounds mean unbounded.
    pub fn window(&self, today: NaiveDate) -> (Option<String>, String) {
        let days = match self {
            Period::Today => 1,
            Period::Week => 7,
            Period::Month => 30,
            Period::All => return (None, format_date(today)),
        };
        (Some(format_date(window_start(today, days))), format_date(today))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HouseStanding {
    pub group_id: String,
    pub name: String,
    pub color: String,
    pub points: i64,
    pub students_completed: usize,
    pub student_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentStanding {
    pub student_id: i64,
    pub name: String,
    pub group_id: Option<String>,
    /// Entries in the window with the board's completion flag set
    pub score: usize,
    /// Set and completed the goal at least once in the window
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    pub from: Option<String>,
    pub to: String,
    pub houses: Vec<HouseStanding>,
    pub students: Vec<StudentStanding>,
}

/// Scores every active student and aggregates house points: `+10` for a
/// student with at least one credited entry in the window, `-10` otherwise.
/// The score counts completions alone; house credit also needs a set goal.
pub fn compute_leaderboard(
    board: LeaderboardType,
    students: &[Student],
    groups: &[Group],
    entries: &[GoalHistoryEntry],
    from: Option<&str>,
    to: &str,
) -> (Vec<HouseStanding>, Vec<StudentStanding>) {
    let mut scores: HashMap<i64, usize> = HashMap::new();
    let mut credited: HashSet<i64> = HashSet::new();
    for entry in entries {
        let in_window = from.is_none_or(|from| entry.date.as_str() >= from) && entry.date.as_str() <= to;
        if !in_window {
            continue;
        }
        if board.counts(entry) {
            *scores.entry(entry.student_id).or_default() += 1;
        }
        if board.credits(entry) {
            credited.insert(entry.student_id);
        }
    }

    let mut standings: Vec<StudentStanding> = students
        .iter()
        .filter(|s| s.is_active())
        .map(|s| {
            StudentStanding {
                student_id: s.id,
                name: s.full_name(),
                group_id: s.group_id.clone(),
                score: scores.get(&s.id).copied().unwrap_or(0),
                completed: credited.contains(&s.id),
            }
        })
        .collect();
    standings.sort_by(|a, b| b.score.cmp(&a.score).then(a.student_id.cmp(&b.student_id)));

    let mut houses: Vec<HouseStanding> = groups
        .iter()
        .map(|group| {
            let members: Vec<&StudentStanding> = standings
                .iter()
                .filter(|s| s.group_id.as_deref().is_some_and(|g| ids_match(g, &group.id)))
                .collect();
            let completed = members.iter().filter(|s| s.completed).count();
            let missed = members.len() - completed;
            HouseStanding {
                group_id: group.id.clone(),
                name: group.name.clone(),
                color: group.color.clone(),
                points: completed as i64 * HOUSE_POINTS_COMPLETED + missed as i64 * HOUSE_POINTS_MISSED,
                students_completed: completed,
                student_count: members.len(),
            }
        })
        .collect();
    houses.sort_by(|a, b| b.points.cmp(&a.points).then(a.group_id.cmp(&b.group_id)));

    (houses, standings)
}

pub struct LeaderboardService<'a> {
    state: &'a AppState,
}

impl<'a> LeaderboardService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Reads students, groups and history one after another and scores them.
    /// The flag is `true` when any of the three came from the demo tier.
    pub async fn compute(
        &self,
        board: LeaderboardType,
        period: Period,
        group_id: Option<&str>,
    ) -> (Leaderboard, bool) {
        let students = StudentService::new(self.state).list_active().await;
        let groups = resolve_list("groups", self.state.groups().find_all().await, demo_groups);
        let history = resolve_rows("goal history", self.state.goal_history().find_all().await, Vec::new)
            .map(|rows| self.state.pending_history.apply(None, rows));
        let used_fallback = students.used_fallback() || groups.used_fallback() || history.used_fallback();

        let students = students.into_option().unwrap_or_default();
        let mut groups = groups.into_option().unwrap_or_default();
        if let Some(group_id) = group_id {
            groups.retain(|g| ids_match(&g.id, group_id));
        }
        let entries = history.into_option().unwrap_or_default();

        let (from, to) = period.window(self.state.clock.today());
        let (houses, mut standings) =
            compute_leaderboard(board, &students, &groups, &entries, from.as_deref(), &to);
        if let Some(group_id) = group_id {
            standings.retain(|s| s.group_id.as_deref().is_some_and(|g| ids_match(g, group_id)));
        }

        (
            Leaderboard {
                from,
                to,
                houses,
                students: standings,
            },
            used_fallback,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{GoalStatus, StudentStatus};

    fn student(id: i64, group: &str) -> Student {
        Student {
            id,
            first_name: format!("S{}", id),
            last_name: "Test".to_string(),
            email: format!("s{}@alpha.school", id),
            honors: false,
            group_id: Some(group.to_string()),
            status: StudentStatus::Active,
            points: 0,
            created_at: None,
            password: String::new(),
        }
    }

    fn group(id: &str) -> Group {
        Group {
            id: id.to_string(),
            name: format!("House {}", id),
            color: "#FF0000".to_string(),
            description: String::new(),
            created_at: None,
        }
    }

    fn entry(student_id: i64, goal: &str, completed: bool) -> GoalHistoryEntry {
        let mut entry = GoalHistoryEntry::new(student_id, "2026-10-16", "");
        entry.daily_goal = goal.to_string();
        entry.goal_status = match (goal.is_empty(), completed) {
            (true, _) => GoalStatus::NotSet,
            (false, true) => GoalStatus::Completed,
            (false, false) => GoalStatus::Set,
        };
        entry.daily_goal_completed = completed;
        entry
    }

    #[test]
    fn house_of_three_with_one_completion_scores_minus_ten() {
        let students = vec![student(1, "1"), student(2, "1"), student(3, "1")];
        let entries = vec![entry(1, "Ship v1", true), entry(2, "Write tests", false)];

        let (houses, _) = compute_leaderboard(
            LeaderboardType::Daily,
            &students,
            &[group("1")],
            &entries,
            Some("2026-10-16"),
            "2026-10-16",
        );

        assert_eq!(houses[0].points, -10);
        assert_eq!(houses[0].students_completed, 1);
        assert_eq!(houses[0].student_count, 3);
    }

    #[test]
    fn completion_without_a_goal_earns_no_daily_credit() {
        let students = vec![student(1, "1")];
        let entries = vec![entry(1, "", true)];

        let (houses, standings) = compute_leaderboard(
            LeaderboardType::Daily,
            &students,
            &[group("1")],
            &entries,
            None,
            "2026-10-16",
        );
        assert_eq!(houses[0].points, -10);
        assert_eq!(standings[0].score, 1);
        assert!(!standings[0].completed);
    }

    #[test]
    fn brainlift_has_no_set_step() {
        let students = vec![student(1, "2"), student(2, "2")];
        let mut done = GoalHistoryEntry::new(1, "2026-10-16", "");
        done.brainlift_completed = true;

        let (houses, _) = compute_leaderboard(
            LeaderboardType::Brainlift,
            &students,
            &[group("2")],
            &[done],
            Some("2026-10-16"),
            "2026-10-16",
        );
        assert_eq!(houses[0].points, 0);
        assert_eq!(houses[0].students_completed, 1);
    }

    #[test]
    fn entries_outside_the_window_are_ignored() {
        let students = vec![student(1, "1")];
        let mut old = entry(1, "Ship v1", true);
        old.date = "2026-10-01".to_string();

        let (houses, _) = compute_leaderboard(
            LeaderboardType::Daily,
            &students,
            &[group("1")],
            &[old],
            Some("2026-10-10"),
            "2026-10-16",
        );
        assert_eq!(houses[0].points, -10);
    }

    #[test]
    fn periods_cover_the_expected_days() {
        let today = crate::utils::clock::parse_date("2026-10-16").unwrap();
        assert_eq!(Period::Today.window(today).0.as_deref(), Some("2026-10-16"));
        assert_eq!(Period::Week.window(today).0.as_deref(), Some("2026-10-10"));
        assert_eq!(Period::Month.window(today).0.as_deref(), Some("2026-09-17"));
        assert_eq!(Period::All.window(today).0, None);
    }
}
