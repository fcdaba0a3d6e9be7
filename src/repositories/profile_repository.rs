use std::sync::Arc;

use crate::entities::Profile;
use crate::entities::profile::SESSION_GOAL_COLUMN;
use crate::record_store::{RecordStoreClient, Sheet, StoreError};
use crate::utils::cells::cell;

use super::SheetRepository;

#[derive(Clone)]
pub struct ProfileRepository {
    sheet: SheetRepository<Profile>,
}

impl ProfileRepository {
    pub fn new(client: Arc<RecordStoreClient>) -> Self {
        Self {
            sheet: SheetRepository::new(client),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<Profile>, StoreError> {
        self.sheet.find_all().await
    }

    pub async fn find_by_student(&self, student_id: i64) -> Result<Option<Profile>, StoreError> {
        self.sheet.find_by_key(&student_id.to_string()).await
    }

    pub async fn upsert(&self, profile: &Profile) -> Result<(), StoreError> {
        self.sheet.upsert(profile).await
    }

    /// Blanks the session goal of every row with a single column write.
    /// Returns how many goals were non-empty.
    pub async fn reset_session_goals(&self) -> Result<usize, StoreError> {
        let client = self.sheet.client();
        let rows = client.read_rows(Sheet::Profiles).await?;
        let cleared = rows
            .iter()
            .filter(|row| !cell(row, SESSION_GOAL_COLUMN).trim().is_empty())
            .count();
        if cleared == 0 {
            return Ok(0);
        }

        client
            .write_column(Sheet::Profiles, SESSION_GOAL_COLUMN, vec![String::new(); rows.len()])
            .await?;
        Ok(cleared)
    }
}
