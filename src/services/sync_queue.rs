use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::SYNC_MAX_ATTEMPTS;
use crate::entities::GoalKind;

/// A remote write that failed and is waiting to be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncJob {
    Completion {
        student_id: i64,
        kind: GoalKind,
        date: String,
        points: i64,
    },
    /// A history entry held in the overlay because the store missed it.
    History { student_id: i64, date: String },
}

#[derive(Debug, Clone)]
pub struct SyncItem {
    pub job: SyncJob,
    pub attempts: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub processed: usize,
    pub succeeded: usize,
    pub requeued: usize,
    pub dropped: usize,
    /// Left untouched because the store could not be reached.
    pub deferred: usize,
}

/// FIFO of pending writes. Draining is done by the caller one item at a
/// time with `delay` between items.
pub struct SyncQueue {
    items: Mutex<VecDeque<SyncItem>>,
    delay: Duration,
}

impl SyncQueue {
    pub fn new(delay: Duration) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn push(&self, job: SyncJob) {
        if let Ok(mut items) = self.items.lock() {
            tracing::info!("Queued {:?} for sync", job);
            items.push_back(SyncItem { job, attempts: 0 });
        }
    }

    /// Everything queued so far, leaving the queue empty.
    pub fn take_all(&self) -> Vec<SyncItem> {
        self.items
            .lock()
            .map(|mut items| items.drain(..).collect())
            .unwrap_or_default()
    }

    /// Returns items to the front of the queue in their original order,
    /// without counting an attempt.
    pub fn restore(&self, restored: Vec<SyncItem>) {
        if let Ok(mut items) = self.items.lock() {
            for item in restored.into_iter().rev() {
                items.push_front(item);
            }
        }
    }

    /// Puts a failed item back unless it has used up its attempts.
    /// Returns `false` when the item was dropped.
    pub fn retry(&self, mut item: SyncItem) -> bool {
        item.attempts += 1;
        if item.attempts >= SYNC_MAX_ATTEMPTS {
            tracing::warn!(
                "Dropping {:?} after {} failed sync attempts",
                item.job,
                item.attempts
            );
            return false;
        }
        if let Ok(mut items) = self.items.lock() {
            items.push_back(item);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> SyncJob {
        SyncJob::Completion {
            student_id: 1,
            kind: GoalKind::Brainlift,
            date: "2026-10-16".to_string(),
            points: 10,
        }
    }

    #[test]
    fn items_are_dropped_after_three_failures() {
        let queue = SyncQueue::new(Duration::ZERO);
        queue.push(job());

        for attempt in 1..=3 {
            let mut items = queue.take_all();
            assert_eq!(items.len(), 1);
            let kept = queue.retry(items.remove(0));
            assert_eq!(kept, attempt < 3);
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn take_all_preserves_order() {
        let queue = SyncQueue::new(Duration::ZERO);
        queue.push(job());
        queue.push(SyncJob::Completion {
            student_id: 2,
            kind: GoalKind::DailyGoal,
            date: "2026-10-16".to_string(),
            points: 5,
        });

        let items = queue.take_all();
        assert!(matches!(items[1].job, SyncJob::Completion { student_id: 2, .. }));
        assert!(queue.is_empty());
    }

    #[test]
    fn restored_items_go_back_in_front() {
        let queue = SyncQueue::new(Duration::ZERO);
        queue.push(job());
        queue.push(SyncJob::History {
            student_id: 2,
            date: "2026-10-16".to_string(),
        });
        let taken = queue.take_all();
        queue.push(SyncJob::History {
            student_id: 3,
            date: "2026-10-16".to_string(),
        });

        queue.restore(taken);
        let items = queue.take_all();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].job, job());
        assert_eq!(items[0].attempts, 0);
        assert!(matches!(items[2].job, SyncJob::History { student_id: 3, .. }));
    }
}
