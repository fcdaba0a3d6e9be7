use std::collections::HashMap;
use std::sync::Mutex;

use crate::entities::GoalHistoryEntry;

/// History entries written while the record store could not take them,
/// keyed `{studentId}_{date}`. Reads lay these over the stored rows until a
/// later write for the same day reaches the store.
#[derive(Default)]
pub struct HistoryOverlay {
    entries: Mutex<HashMap<String, GoalHistoryEntry>>,
}

fn overlay_key(student_id: i64, date: &str) -> String {
    format!("{}_{}", student_id, date)
}

impl HistoryOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, student_id: i64, date: &str) -> Option<GoalHistoryEntry> {
        let entries = self.entries.lock().ok()?;
        entries.get(&overlay_key(student_id, date)).cloned()
    }

    /// Keeps an unsaved entry, or forgets the day once the store has it.
    /// Returns `true` when the entry was not held before.
    pub fn settle(&self, entry: &GoalHistoryEntry, persisted: bool) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            return false;
        };
        let key = overlay_key(entry.student_id, &entry.date);
        if persisted {
            entries.remove(&key);
            false
        } else {
            entries.insert(key, entry.clone()).is_none()
        }
    }

    pub fn remove(&self, student_id: i64, date: &str) -> Option<GoalHistoryEntry> {
        let mut entries = self.entries.lock().ok()?;
        entries.remove(&overlay_key(student_id, date))
    }

    /// Replaces stored rows with held entries of the same day and appends the
    /// rest, oldest first.
    pub fn apply(&self, student_id: Option<i64>, mut rows: Vec<GoalHistoryEntry>) -> Vec<GoalHistoryEntry> {
        let held: Vec<GoalHistoryEntry> = match self.entries.lock() {
            Ok(entries) => entries
                .values()
                .filter(|e| student_id.is_none_or(|id| e.student_id == id))
                .cloned()
                .collect(),
            Err(_) => return rows,
        };
        if held.is_empty() {
            return rows;
        }

        rows.retain(|row| {
            !held
                .iter()
                .any(|e| e.student_id == row.student_id && e.date == row.date)
        });
        rows.extend(held);
        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.student_id.cmp(&b.student_id)));
        rows
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

    fn entry(student_id: i64, date: &str, goal: &str) -> GoalHistoryEntry {
        let mut entry = GoalHistoryEntry::new(student_id, date, "");
        entry.daily_goal = goal.to_string();
        entry
    }

    #[test]
    fn held_entries_replace_stored_rows_of_the_same_day() {
        let overlay = HistoryOverlay::new();
        assert!(overlay.settle(&entry(1, "2026-10-16", "Edited offline"), false));
        assert!(!overlay.settle(&entry(1, "2026-10-16", "Edited twice"), false));
        overlay.settle(&entry(2, "2026-10-16", "Someone else"), false);

        let stored = vec![entry(1, "2026-10-15", "Yesterday"), entry(1, "2026-10-16", "Stored")];
        let rows = overlay.apply(Some(1), stored);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].daily_goal, "Yesterday");
        assert_eq!(rows[1].daily_goal, "Edited twice");
    }

    #[test]
    fn a_saved_write_releases_the_day() {
        let overlay = HistoryOverlay::new();
        let held = entry(1, "2026-10-16", "Ship v1");
        overlay.settle(&held, false);
        assert_eq!(overlay.len(), 1);

        overlay.settle(&held, true);
        assert!(overlay.is_empty());
        assert!(overlay.get(1, "2026-10-16").is_none());
    }
}
