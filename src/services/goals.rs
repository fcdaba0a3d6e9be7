use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use crate::config::DEMO_DATA_NOTICE;
use crate::entities::{
    GoalHistoryEntry, GoalKind, GoalStatus, Platform, PlatformCounts, PlatformHandles, Profile,
};
use crate::error::ApiError;
use crate::fallback::CompletionFlags;
use crate::record_store::StoreError;
use crate::state::AppState;
use crate::utils::clock::{format_date, normalize_date, parse_date};

use super::profiles::ProfileService;
use super::resolution::{Resolved, resolve_rows};
use super::sync_queue::{SyncJob, SyncReport};

pub const DEFAULT_HISTORY_DAYS: u32 = 30;
pub const MAX_HISTORY_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub kind: GoalKind,
    pub date: String,
    pub points_awarded: i64,
    pub already_completed: bool,
    pub total_points: Option<i64>,
    pub queued_for_sync: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalSnapshot {
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
}

/// Result of a write that is allowed to succeed without the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftWrite<T> {
    pub value: T,
    pub persisted: bool,
}

impl<T> SoftWrite<T> {
    pub fn notice(&self) -> Option<String> {
        (!self.persisted).then(|| DEMO_DATA_NOTICE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
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
    pub entries: Vec<GoalHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveAudience {
    pub date: String,
    pub audience: PlatformCounts,
    pub errors: Vec<String>,
    pub live: bool,
}

/// Consecutive days ending today, or yesterday when today is not done yet.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut day = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        day = match day.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }
    streak
}

pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }
    longest
}

fn days_where(entries: &[GoalHistoryEntry], predicate: impl Fn(&GoalHistoryEntry) -> bool) -> BTreeSet<NaiveDate> {
    entries
        .iter()
        .filter(|e| predicate(*e))
        .filter_map(|e| parse_date(&e.date))
        .collect()
}

/// Daily-goal credit needs both a goal and its completion.
pub fn daily_goal_met(entry: &GoalHistoryEntry) -> bool {
    entry.goal_was_set() && entry.goal_was_completed()
}

fn mark_completed(entry: &mut GoalHistoryEntry, kind: GoalKind) {
    match kind {
        GoalKind::Brainlift => entry.brainlift_completed = true,
        GoalKind::DailyGoal => {
            entry.daily_goal_completed = true;
            if entry.goal_was_set() {
                entry.goal_status = GoalStatus::Completed;
            }
        }
    }
}

/// First day of an N-day window ending on `today`.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(today)
}

pub struct GoalService<'a> {
    state: &'a AppState,
}

impl<'a> GoalService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    async fn require_student(&self, student_id: i64) -> Result<(), ApiError> {
        match self.state.students().find_by_id(student_id).await {
            Ok(Some(student)) if student.is_active() => Ok(()),
            Ok(_) => Err(ApiError::NotFound(format!("Student {} not found", student_id))),
            // Nothing to check against; the local tiers still take the write
            Err(_) => Ok(()),
        }
    }

    /// Marks a goal done for today. A second completion of the same kind on
    /// the same day awards nothing.
    pub async fn complete(
        &self,
        student_id: i64,
        kind: GoalKind,
        header: Option<&CompletionFlags>,
    ) -> Result<CompletionOutcome, ApiError> {
        self.drain_sync_queue().await;
        self.require_student(student_id).await?;

        let today = self.state.today();
        let profile = ProfileService::new(self.state)
            .merged(student_id, header)
            .await
            .into_option()
            .unwrap_or_else(|| Profile::empty(student_id));
        let done = match kind {
            GoalKind::Brainlift => profile.brainlift_completed,
            GoalKind::DailyGoal => profile.daily_goal_completed,
        };

        let points = kind.points();
        if done || !self.state.completions.record(student_id, &today, kind, points) {
            tracing::info!("Student {} already completed {} today", student_id, kind.as_str());
            return Ok(CompletionOutcome {
                kind,
                date: today,
                points_awarded: 0,
                already_completed: true,
                total_points: None,
                queued_for_sync: false,
            });
        }
        self.state.mirror.record(student_id, &today, kind).await;

        let (total_points, queued_for_sync) =
            match self.write_completion(student_id, kind, &today, points).await {
                Ok(total) => (total, false),
                Err(e) => {
                    tracing::warn!(
                        "Remote write of {} for student {} failed ({}), queued for sync",
                        kind.as_str(),
                        student_id,
                        e
                    );
                    self.state.sync_queue.push(SyncJob::Completion {
                        student_id,
                        kind,
                        date: today.clone(),
                        points,
                    });
                    if let Some(mut held) = self.state.pending_history.get(student_id, &today) {
                        mark_completed(&mut held, kind);
                        self.state.pending_history.settle(&held, false);
                    }
                    (None, true)
                }
            };

        tracing::info!("Student {} completed {} (+{})", student_id, kind.as_str(), points);
        Ok(CompletionOutcome {
            kind,
            date: today,
            points_awarded: points,
            already_completed: false,
            total_points,
            queued_for_sync,
        })
    }

    /// Profile date, history row, then points, so a replay after a partial
    /// failure never adds the points twice.
    async fn write_completion(
        &self,
        student_id: i64,
        kind: GoalKind,
        date: &str,
        points: i64,
    ) -> Result<Option<i64>, StoreError> {
        let profiles = self.state.profiles();
        let mut profile = profiles
            .find_by_student(student_id)
            .await?
            .unwrap_or_else(|| Profile::empty(student_id));
        match kind {
            GoalKind::Brainlift => {
                profile.brainlift_completed = true;
                profile.last_brainlift_date = Some(date.to_string());
            }
            GoalKind::DailyGoal => {
                profile.daily_goal_completed = true;
                profile.last_daily_goal_date = Some(date.to_string());
            }
        }
        profiles.upsert(&profile).await?;

        let history = self.state.goal_history();
        let timestamp = self.state.timestamp();
        let stored = history.find_on(student_id, date).await?;
        let mut entry = self
            .state
            .pending_history
            .get(student_id, date)
            .or(stored)
            .unwrap_or_else(|| GoalHistoryEntry::new(student_id, date, &timestamp));
        mark_completed(&mut entry, kind);
        entry.timestamp = timestamp;
        history.upsert(&entry).await?;
        self.state.pending_history.remove(student_id, date);

        self.state.students().add_points(student_id, points).await
    }

    /// Replays queued writes one at a time with a fixed pause between them.
    pub async fn drain_sync_queue(&self) -> SyncReport {
        let queue = &self.state.sync_queue;
        let mut items = queue.take_all().into_iter();
        let mut report = SyncReport::default();

        while let Some(item) = items.next() {
            if report.processed > 0 {
                tokio::time::sleep(queue.delay()).await;
            }

            let result = match &item.job {
                SyncJob::Completion {
                    student_id,
                    kind,
                    date,
                    points,
                } => self
                    .write_completion(*student_id, *kind, date, *points)
                    .await
                    .map(|_| ()),
                SyncJob::History { student_id, date } => self.replay_history(*student_id, date).await,
            };
            if let Err(e) = &result {
                if e.is_unavailable() {
                    // Every later item would fail the same way
                    let mut rest = vec![item];
                    rest.extend(items.by_ref());
                    report.deferred = rest.len();
                    queue.restore(rest);
                    break;
                }
            }

            report.processed += 1;
            match result {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::debug!("Sync of {:?} failed: {}", item.job, e);
                    if queue.retry(item) {
                        report.requeued += 1;
                    } else {
                        report.dropped += 1;
                    }
                }
            }
        }

        if report.processed > 0 || report.deferred > 0 {
            tracing::info!(
                "Sync queue drained: {} ok, {} requeued, {} dropped, {} deferred",
                report.succeeded,
                report.requeued,
                report.dropped,
                report.deferred
            );
        }
        report
    }

    async fn replay_history(&self, student_id: i64, date: &str) -> Result<(), StoreError> {
        let Some(entry) = self.state.pending_history.get(student_id, date) else {
            return Ok(());
        };
        self.state.goal_history().upsert(&entry).await?;
        self.state.pending_history.remove(student_id, date);
        Ok(())
    }

    async fn history_rows(&self, student_id: i64) -> Resolved<Vec<GoalHistoryEntry>> {
        resolve_rows(
            "goal history",
            self.state.goal_history().find_for_student(student_id).await,
            Vec::new,
        )
        .map(|rows| self.state.pending_history.apply(Some(student_id), rows))
    }

    /// The day's entry, an unsaved local copy first. The flag tells whether
    /// the store answered.
    async fn entry_on(&self, student_id: i64, date: &str) -> (Option<GoalHistoryEntry>, bool) {
        let stored = self.state.goal_history().find_on(student_id, date).await;
        let reachable = stored.is_ok();
        let held = self.state.pending_history.get(student_id, date);
        (held.or_else(|| stored.ok().flatten()), reachable)
    }

    fn hold_unsaved(&self, entry: &GoalHistoryEntry, persisted: bool) {
        if self.state.pending_history.settle(entry, persisted) {
            self.state.sync_queue.push(SyncJob::History {
                student_id: entry.student_id,
                date: entry.date.clone(),
            });
        }
    }

    pub async fn snapshot(
        &self,
        student_id: i64,
        header: Option<&CompletionFlags>,
    ) -> Resolved<GoalSnapshot> {
        let today = self.state.today();
        let profile = ProfileService::new(self.state).merged(student_id, header).await;
        let Some((profile, profile_notice)) = profile.into_parts() else {
            return Resolved::NotFound;
        };
        let history = self.history_rows(student_id).await;
        let used_fallback = profile_notice.is_some() || history.used_fallback();
        let entry = history
            .into_option()
            .unwrap_or_default()
            .into_iter()
            .find(|e| e.date == today);

        let points_today = self
            .state
            .completions
            .get(student_id, &today)
            .map(|c| c.points)
            .unwrap_or(0);
        let snapshot = GoalSnapshot {
            student_id,
            date: today,
            brainlift_completed: profile.brainlift_completed,
            daily_goal_completed: profile.daily_goal_completed,
            daily_goal: entry
                .as_ref()
                .map(|e| e.daily_goal.clone())
                .filter(|g| !g.is_empty())
                .unwrap_or(profile.daily_goal),
            goal_status: entry
                .as_ref()
                .map(|e| e.goal_status)
                .unwrap_or(GoalStatus::NotSet),
            goals: profile.goals,
            platforms: profile.platforms,
            audience: entry.map(|e| e.audience).unwrap_or_default(),
            points_today,
        };

        if used_fallback {
            Resolved::UsedFallback(snapshot)
        } else {
            Resolved::Found(snapshot)
        }
    }

    pub async fn daily_on(&self, student_id: i64, date: &str) -> Resolved<Option<GoalHistoryEntry>> {
        self.history_rows(student_id)
            .await
            .map(|entries| entries.into_iter().find(|e| e.date == date))
    }

    /// Entries of the last `days` days, today included, oldest first.
    pub async fn daily_range(&self, student_id: i64, days: u32) -> Resolved<Vec<GoalHistoryEntry>> {
        let today = self.state.clock.today();
        let from = format_date(window_start(today, days));
        let to = format_date(today);
        self.history_rows(student_id).await.map(|entries| {
            entries
                .into_iter()
                .filter(|e| e.date >= from && e.date <= to)
                .collect()
        })
    }

    pub async fn daily_history(&self, student_id: i64) -> Resolved<Vec<GoalHistoryEntry>> {
        self.history_rows(student_id).await
    }

    /// Upserts the goal text and status for a date. Today's goal is also
    /// copied onto the profile.
    pub async fn set_daily(
        &self,
        student_id: i64,
        date: Option<&str>,
        goal_text: &str,
        status: Option<GoalStatus>,
    ) -> Result<SoftWrite<GoalHistoryEntry>, ApiError> {
        let date = self.resolve_date(date)?;
        let goal_text = goal_text.trim();
        if goal_text.is_empty() && status.is_none() {
            return Err(ApiError::BadRequest("goalText is required".to_string()));
        }
        self.require_student(student_id).await?;

        let timestamp = self.state.timestamp();
        let (existing, reachable) = self.entry_on(student_id, &date).await;
        let mut entry =
            existing.unwrap_or_else(|| GoalHistoryEntry::new(student_id, &date, &timestamp));

        let status = match status {
            Some(status) => status,
            // Rewording a goal keeps the completion already earned
            None if entry.daily_goal_completed => GoalStatus::Completed,
            None => GoalStatus::Set,
        };
        entry.daily_goal = goal_text.to_string();
        entry.goal_status = status;
        entry.daily_goal_completed = status == GoalStatus::Completed;
        entry.timestamp = timestamp;

        let persisted = reachable && self.persist_daily(&entry, &date).await;
        self.hold_unsaved(&entry, persisted);
        Ok(SoftWrite {
            value: entry,
            persisted,
        })
    }

    async fn persist_daily(&self, entry: &GoalHistoryEntry, date: &str) -> bool {
        if let Err(e) = self.state.goal_history().upsert(entry).await {
            tracing::warn!("Daily goal for student {} not saved: {}", entry.student_id, e);
            return false;
        }
        if date == self.state.today() {
            let profiles = self.state.profiles();
            let result = async {
                let mut profile = profiles
                    .find_by_student(entry.student_id)
                    .await?
                    .unwrap_or_else(|| Profile::empty(entry.student_id));
                profile.daily_goal = entry.daily_goal.clone();
                profiles.upsert(&profile).await
            }
            .await;
            if let Err(e) = result {
                tracing::warn!("Profile goal for student {} not updated: {}", entry.student_id, e);
            }
        }
        true
    }

    pub async fn update_daily(
        &self,
        student_id: i64,
        date: Option<&str>,
        goal_text: Option<&str>,
        status: Option<GoalStatus>,
    ) -> Result<SoftWrite<GoalHistoryEntry>, ApiError> {
        let date = self.resolve_date(date)?;
        if goal_text.is_none() && status.is_none() {
            return Err(ApiError::BadRequest(
                "goalText or status is required".to_string(),
            ));
        }

        let (existing, reachable) = self.entry_on(student_id, &date).await;
        let mut entry = match existing {
            Some(entry) => entry,
            None if reachable => {
                return Err(ApiError::NotFound(format!(
                    "No goal for student {} on {}",
                    student_id, date
                )));
            }
            None => {
                tracing::warn!("Store unreachable, daily goal for student {} kept locally", student_id);
                let mut entry = GoalHistoryEntry::new(student_id, &date, &self.state.timestamp());
                entry.goal_status = GoalStatus::Set;
                entry
            }
        };

        if let Some(goal_text) = goal_text {
            entry.daily_goal = goal_text.trim().to_string();
        }
        if let Some(status) = status {
            entry.goal_status = status;
            entry.daily_goal_completed = status == GoalStatus::Completed;
        }
        entry.timestamp = self.state.timestamp();

        let persisted = reachable && self.persist_daily(&entry, &date).await;
        self.hold_unsaved(&entry, persisted);
        Ok(SoftWrite {
            value: entry,
            persisted,
        })
    }

    pub async fn delete_daily(&self, student_id: i64, date: Option<&str>) -> Result<SoftWrite<String>, ApiError> {
        let date = self.resolve_date(date)?;
        let held = self.state.pending_history.remove(student_id, &date).is_some();
        match self.state.goal_history().delete(student_id, &date).await {
            Ok(deleted) if deleted || held => Ok(SoftWrite {
                value: date,
                persisted: true,
            }),
            Ok(_) => Err(ApiError::NotFound(format!(
                "No goal for student {} on {}",
                student_id, date
            ))),
            Err(e) => {
                tracing::warn!("Daily goal for student {} not deleted: {}", student_id, e);
                Ok(SoftWrite {
                    value: date,
                    persisted: false,
                })
            }
        }
    }

    fn resolve_date(&self, date: Option<&str>) -> Result<String, ApiError> {
        match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => normalize_date(date).ok_or_else(|| {
                ApiError::BadRequest(format!("Invalid date {}, expected YYYY-MM-DD", date))
            }),
            None => Ok(self.state.today()),
        }
    }

    pub async fn history_summary(&self, student_id: i64, days: u32) -> Resolved<HistorySummary> {
        let days = days.clamp(1, MAX_HISTORY_DAYS);
        let today = self.state.clock.today();
        let from = format_date(window_start(today, days));
        let to = format_date(today);

        self.history_rows(student_id).await.map(|all| {
            let goal_days = days_where(&all, daily_goal_met);
            let brainlift_days = days_where(&all, |e| e.brainlift_completed);
            let entries: Vec<GoalHistoryEntry> = all
                .into_iter()
                .filter(|e| e.date >= from && e.date <= to)
                .collect();

            let goals_set = entries.iter().filter(|e| e.goal_was_set()).count();
            let goals_completed = entries.iter().filter(|e| daily_goal_met(e)).count();
            let brainlifts_completed = entries.iter().filter(|e| e.brainlift_completed).count();
            let completion_rate =
                (goals_completed as f64 / goals_set.max(1) as f64 * 100.0).round() as i64;

            HistorySummary {
                student_id,
                days,
                from,
                to,
                days_tracked: entries.len(),
                goals_set,
                goals_completed,
                brainlifts_completed,
                completion_rate,
                current_streak: current_streak(&goal_days, today),
                longest_streak: longest_streak(&goal_days),
                brainlift_streak: current_streak(&brainlift_days, today),
                entries,
            }
        })
    }

    /// Raises today's count for a platform, never lowering it.
    pub async fn record_audience(
        &self,
        student_id: i64,
        platform: Platform,
        count: i64,
    ) -> Result<SoftWrite<GoalHistoryEntry>, ApiError> {
        if count < 0 {
            return Err(ApiError::BadRequest("count must not be negative".to_string()));
        }
        self.require_student(student_id).await?;
        let mut counts = PlatformCounts::default();
        counts.set(platform, count);
        Ok(self.fold_audience(student_id, &counts).await)
    }

    async fn fold_audience(&self, student_id: i64, counts: &PlatformCounts) -> SoftWrite<GoalHistoryEntry> {
        let today = self.state.today();
        let timestamp = self.state.timestamp();
        let (existing, mut persisted) = self.entry_on(student_id, &today).await;
        let mut entry =
            existing.unwrap_or_else(|| GoalHistoryEntry::new(student_id, &today, &timestamp));
        for platform in Platform::ALL {
            let seen = entry.audience.get(platform).max(counts.get(platform));
            entry.audience.set(platform, seen);
        }
        entry.timestamp = timestamp;

        if persisted {
            if let Err(e) = self.state.goal_history().upsert(&entry).await {
                tracing::warn!("Audience for student {} not saved: {}", student_id, e);
                persisted = false;
            }
        }
        self.hold_unsaved(&entry, persisted);
        SoftWrite {
            value: entry,
            persisted,
        }
    }

    /// Looks up follower counts for the student's handles and folds them into
    /// today's history entry.
    pub async fn live_audience(&self, student_id: i64) -> Result<SoftWrite<LiveAudience>, ApiError> {
        let profile = ProfileService::new(self.state).merged(student_id, None).await;
        let Some((profile, _)) = profile.into_parts() else {
            return Err(ApiError::NotFound(format!("Student {} not found", student_id)));
        };

        let mut counts = PlatformCounts::default();
        let mut errors = Vec::new();
        if self.state.social.is_enabled() {
            for platform in Platform::ALL {
                let handle = profile.platforms.get(platform);
                if handle.trim().is_empty() {
                    continue;
                }
                match self.state.social.followers(platform, handle).await {
                    Ok(count) => counts.set(platform, count),
                    Err(e) => errors.push(format!("{}: {}", platform.as_str(), e)),
                }
            }
        }

        let folded = self.fold_audience(student_id, &counts).await;
        Ok(SoftWrite {
            value: LiveAudience {
                date: folded.value.date,
                audience: folded.value.audience,
                errors,
                live: self.state.social.is_enabled(),
            },
            persisted: folded.persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(dates: &[&str]) -> BTreeSet<NaiveDate> {
        dates.iter().filter_map(|d| parse_date(d)).collect()
    }

    fn today() -> NaiveDate {
        parse_date("2026-10-16").unwrap()
    }

    #[test]
    fn current_streak_counts_back_from_today() {
        let done = days(&["2026-10-14", "2026-10-15", "2026-10-16"]);
        assert_eq!(current_streak(&done, today()), 3);
    }

    #[test]
    fn unfinished_today_does_not_break_the_streak() {
        let done = days(&["2026-10-14", "2026-10-15"]);
        assert_eq!(current_streak(&done, today()), 2);

        let stale = days(&["2026-10-13", "2026-10-14"]);
        assert_eq!(current_streak(&stale, today()), 0);
    }

    #[test]
    fn longest_streak_finds_the_best_run() {
        let done = days(&[
            "2026-10-01", "2026-10-02", "2026-10-03", "2026-10-04", "2026-10-10", "2026-10-11",
        ]);
        assert_eq!(longest_streak(&done), 4);
        assert_eq!(longest_streak(&BTreeSet::new()), 0);
    }

    #[test]
    fn daily_credit_needs_a_goal() {
        let mut entry = GoalHistoryEntry::new(1, "2026-10-16", "");
        entry.daily_goal_completed = true;
        assert!(!daily_goal_met(&entry));

        entry.daily_goal = "Ship v1".to_string();
        assert!(daily_goal_met(&entry));
    }

    #[test]
    fn window_includes_today() {
        assert_eq!(format_date(window_start(today(), 7)), "2026-10-10");
        assert_eq!(format_date(window_start(today(), 1)), "2026-10-16");
    }
}
