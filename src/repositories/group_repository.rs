use std::sync::Arc;

use crate::entities::Group;
use crate::record_store::{RecordStoreClient, StoreError};

use super::SheetRepository;

#[derive(Clone)]
pub struct GroupRepository {
    sheet: SheetRepository<Group>,
}

impl GroupRepository {
    pub fn new(client: Arc<RecordStoreClient>) -> Self {
        Self {
            sheet: SheetRepository::new(client),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<Group>, StoreError> {
        self.sheet.find_all().await
    }

    pub async fn find_by_id(&self, group_id: &str) -> Result<Option<Group>, StoreError> {
        self.sheet.find_by_key(group_id).await
    }

    /// Next sequential id as a string. Cleared rows are gone from the scan,
    /// so an id can come back if the highest group was deleted; deleting a
    /// group releases its members first.
    pub async fn next_id(&self) -> Result<String, StoreError> {
        let groups = self.find_all().await?;
        let max = groups
            .iter()
            .filter_map(|g| g.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Ok((max + 1).to_string())
    }

    pub async fn create(&self, group: &Group) -> Result<(), StoreError> {
        self.sheet.insert(group).await
    }

    pub async fn update(&self, group: &Group) -> Result<bool, StoreError> {
        self.sheet.update(group).await
    }

    /// Clears the row's cells, leaving an empty row behind.
    pub async fn delete(&self, group_id: &str) -> Result<bool, StoreError> {
        self.sheet.clear(group_id).await
    }
}
