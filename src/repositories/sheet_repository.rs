use std::marker::PhantomData;
use std::sync::Arc;

use crate::entities::SheetRecord;
use crate::record_store::client::normalize_key;
use crate::record_store::{RecordStoreClient, StoreError};

/// get / list / upsert / clear for any record kept one-per-row.
///
/// Row numbers never leave this type; the client does the scan and the
/// `index + 2` arithmetic.
pub struct SheetRepository<R> {
    client: Arc<RecordStoreClient>,
    _record: PhantomData<R>,
}

impl<R> Clone for SheetRepository<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: SheetRecord> SheetRepository<R> {
    pub fn new(client: Arc<RecordStoreClient>) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    pub fn client(&self) -> &RecordStoreClient {
        &self.client
    }

    pub async fn find_all(&self) -> Result<Vec<R>, StoreError> {
        let rows = self.client.read_rows(R::SHEET).await?;
        Ok(rows.iter().filter_map(|row| R::from_row(row)).collect())
    }

    pub async fn find_by_key(&self, key: &str) -> Result<Option<R>, StoreError> {
        let key = normalize_key(key);
        let records = self.find_all().await?;
        Ok(records
            .into_iter()
            .find(|record| normalize_key(&record.key()) == key))
    }

    pub async fn insert(&self, record: &R) -> Result<(), StoreError> {
        self.client.append_row(R::SHEET, record.to_row()).await
    }

    /// `false` when the record has no row yet.
    pub async fn update(&self, record: &R) -> Result<bool, StoreError> {
        self.client
            .update_row_by_key(R::SHEET, R::KEY_COLUMNS, &record.key(), record.to_row())
            .await
    }

    pub async fn upsert(&self, record: &R) -> Result<(), StoreError> {
        if !self.update(record).await? {
            self.insert(record).await?;
        }
        Ok(())
    }

    pub async fn clear(&self, key: &str) -> Result<bool, StoreError> {
        self.client
            .clear_row_by_key(R::SHEET, R::KEY_COLUMNS, key)
            .await
    }
}
