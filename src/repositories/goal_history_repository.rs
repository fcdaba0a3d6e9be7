use std::sync::Arc;

use crate::entities::GoalHistoryEntry;
use crate::record_store::client::compose_key;
use crate::record_store::{RecordStoreClient, StoreError};

use super::SheetRepository;

#[derive(Clone)]
pub struct GoalHistoryRepository {
    sheet: SheetRepository<GoalHistoryEntry>,
}

impl GoalHistoryRepository {
    pub fn new(client: Arc<RecordStoreClient>) -> Self {
        Self {
            sheet: SheetRepository::new(client),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<GoalHistoryEntry>, StoreError> {
        self.sheet.find_all().await
    }

    /// Entries for one student, oldest first.
    pub async fn find_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<GoalHistoryEntry>, StoreError> {
        let mut entries: Vec<GoalHistoryEntry> = self
            .find_all()
            .await?
            .into_iter()
            .filter(|e| e.student_id == student_id)
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(entries)
    }

    pub async fn find_on(
        &self,
        student_id: i64,
        date: &str,
    ) -> Result<Option<GoalHistoryEntry>, StoreError> {
        self.sheet
            .find_by_key(&compose_key(&[&student_id.to_string(), date]))
            .await
    }

    /// Inclusive `YYYY-MM-DD` bounds.
    pub async fn find_between(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<GoalHistoryEntry>, StoreError> {
        let entries = self.find_all().await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.date.as_str() >= from && e.date.as_str() <= to)
            .collect())
    }

    pub async fn upsert(&self, entry: &GoalHistoryEntry) -> Result<(), StoreError> {
        self.sheet.upsert(entry).await
    }

    pub async fn delete(&self, student_id: i64, date: &str) -> Result<bool, StoreError> {
        self.sheet
            .clear(&compose_key(&[&student_id.to_string(), date]))
            .await
    }
}
