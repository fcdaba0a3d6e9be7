use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::merge::CompletionFlags;
use crate::entities::GoalKind;

const KEY_PREFIX: &str = "ns_goals_";

pub fn mirror_key(student_id: i64, date: &str) -> String {
    format!("{}{}_{}", KEY_PREFIX, student_id, date)
}

/// Day-scoped copy of completion events, `ns_goals_<studentId>_<date>` →
/// flags. Written through to a JSON file when a path is configured so a
/// restart keeps today's toggles. Only the day of the latest record is kept.
pub struct LocalMirror {
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, CompletionFlags>>,
}

impl LocalMirror {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Loads the mirror file, keeping only entries for `today`. A missing or
    /// unreadable file starts an empty mirror.
    pub fn load(path: impl Into<PathBuf>, today: &str) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<HashMap<String, CompletionFlags>>(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable local mirror {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        let suffix = format!("_{}", today);
        let kept: HashMap<String, CompletionFlags> = entries
            .into_iter()
            .filter(|(key, _)| key.starts_with(KEY_PREFIX) && key.ends_with(&suffix))
            .collect();
        tracing::info!("Loaded {} local mirror entries for {}", kept.len(), today);

        Self {
            path: Some(path),
            entries: Mutex::new(kept),
        }
    }

    pub fn get(&self, student_id: i64, date: &str) -> Option<CompletionFlags> {
        let entries = self.entries.lock().ok()?;
        entries.get(&mirror_key(student_id, date)).cloned()
    }

    pub async fn record(&self, student_id: i64, date: &str, kind: GoalKind) {
        let snapshot = {
            let Ok(mut entries) = self.entries.lock() else {
                return;
            };
            let suffix = format!("_{}", date);
            entries.retain(|key, _| key.ends_with(&suffix));
            entries
                .entry(mirror_key(student_id, date))
                .or_default()
                .mark(kind, date);
            entries.clone()
        };
        self.persist(snapshot).await;
    }

    async fn persist(&self, snapshot: HashMap<String, CompletionFlags>) {
        let Some(path) = &self.path else {
            return;
        };
        let body = match serde_json::to_vec_pretty(&snapshot) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to serialize local mirror: {}", e);
                return;
            }
        };
        if let Err(e) = tokio::fs::write(path, body).await {
            tracing::error!("Failed to write local mirror {}: {}", path.display(), e);
        }
    }
}

/// Reads the browser's copy sent in `x-local-goals`: either the raw
/// storage map or a single flags object for the requested student.
pub fn parse_local_goals_header(value: &str, student_id: i64, today: &str) -> Option<CompletionFlags> {
    if let Ok(map) = serde_json::from_str::<HashMap<String, CompletionFlags>>(value) {
        if let Some(flags) = map.get(&mirror_key(student_id, today)) {
            return Some(flags.clone());
        }
    }
    serde_json::from_str::<CompletionFlags>(value)
        .ok()
        .filter(|flags| !flags.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_follows_storage_naming() {
        assert_eq!(mirror_key(12, "2026-10-16"), "ns_goals_12_2026-10-16");
    }

    #[tokio::test]
    async fn file_mirror_survives_reload_for_the_same_day_only() {
        let path = std::env::temp_dir().join(format!("mirror-{}.json", std::process::id()));
        let mirror = LocalMirror::load(&path, "2026-10-15");
        mirror.record(2, "2026-10-15", GoalKind::Brainlift).await;

        let same_day = LocalMirror::load(&path, "2026-10-15");
        assert!(same_day
            .get(2, "2026-10-15")
            .unwrap()
            .is_completed(GoalKind::Brainlift));

        let next_day = LocalMirror::load(&path, "2026-10-16");
        assert!(next_day.get(2, "2026-10-15").is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn recording_a_new_day_rewrites_the_file_with_that_day_only() {
        let path = std::env::temp_dir().join(format!("mirror-rollover-{}.json", std::process::id()));
        let mirror = LocalMirror::load(&path, "2026-10-15");
        mirror.record(2, "2026-10-15", GoalKind::Brainlift).await;
        mirror.record(3, "2026-10-16", GoalKind::DailyGoal).await;

        assert!(mirror.get(2, "2026-10-15").is_none());
        let text = std::fs::read_to_string(&path).unwrap();
        let stored: HashMap<String, CompletionFlags> = serde_json::from_str(&text).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored.contains_key(&mirror_key(3, "2026-10-16")));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn header_accepts_map_or_bare_flags() {
        let map = r#"{"ns_goals_5_2026-10-16":{"dailyGoalCompleted":true,"lastDailyGoalDate":"2026-10-16"}}"#;
        let flags = parse_local_goals_header(map, 5, "2026-10-16").unwrap();
        assert!(flags.is_completed(GoalKind::DailyGoal));

        assert!(parse_local_goals_header(map, 6, "2026-10-16").is_none());

        let bare = r#"{"brainliftCompleted":true}"#;
        assert!(parse_local_goals_header(bare, 6, "2026-10-16")
            .unwrap()
            .is_completed(GoalKind::Brainlift));
        assert!(parse_local_goals_header("not json", 5, "2026-10-16").is_none());
    }
}
