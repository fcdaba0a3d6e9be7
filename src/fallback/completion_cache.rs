use std::collections::HashMap;
use std::sync::Mutex;

use super::merge::CompletionFlags;
use crate::entities::GoalKind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionEntry {
    pub flags: CompletionFlags,
    pub points: i64,
}

/// Goal completions seen by this process, keyed `{studentId}_{date}`.
///
/// A new day is a new key, so nothing ever needs resetting. Recording a
/// completion drops keys of other days. Lost on restart.
#[derive(Default)]
pub struct CompletionCache {
    entries: Mutex<HashMap<String, CompletionEntry>>,
}

fn cache_key(student_id: i64, date: &str) -> String {
    format!("{}_{}", student_id, date)
}

impl CompletionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, student_id: i64, date: &str) -> Option<CompletionEntry> {
        let entries = self.entries.lock().ok()?;
        entries.get(&cache_key(student_id, date)).cloned()
    }

    /// Records a completion and the points it earned.
    /// Returns `false` if the kind was already completed for that day.
    pub fn record(&self, student_id: i64, date: &str, kind: GoalKind, points: i64) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            return false;
        };
        let suffix = format!("_{}", date);
        entries.retain(|key, _| key.ends_with(&suffix));
        let entry = entries.entry(cache_key(student_id, date)).or_default();
        if entry.flags.is_completed(kind) {
            return false;
        }
        entry.flags.mark(kind, date);
        entry.points += points;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_created_lazily_per_day() {
        let cache = CompletionCache::new();
        assert!(cache.get(3, "2026-10-16").is_none());

        assert!(cache.record(3, "2026-10-16", GoalKind::Brainlift, 10));
        assert!(cache.record(4, "2026-10-16", GoalKind::DailyGoal, 5));

        let entry = cache.get(3, "2026-10-16").unwrap();
        assert!(entry.flags.is_completed(GoalKind::Brainlift));
        assert!(!entry.flags.is_completed(GoalKind::DailyGoal));
        assert_eq!(entry.points, 10);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn a_new_day_drops_the_previous_days_keys() {
        let cache = CompletionCache::new();
        cache.record(3, "2026-10-15", GoalKind::Brainlift, 10);
        cache.record(4, "2026-10-15", GoalKind::Brainlift, 10);

        assert!(cache.record(3, "2026-10-16", GoalKind::Brainlift, 10));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(4, "2026-10-15").is_none());
    }

    #[test]
    fn second_completion_the_same_day_is_ignored() {
        let cache = CompletionCache::new();
        assert!(cache.record(3, "2026-10-16", GoalKind::DailyGoal, 5));
        assert!(!cache.record(3, "2026-10-16", GoalKind::DailyGoal, 5));
        assert_eq!(cache.get(3, "2026-10-16").unwrap().points, 5);
    }
}
