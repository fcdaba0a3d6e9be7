use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use super::cache::ReadCache;
use super::error::StoreError;
use super::range::A1Range;
use super::rate_limiter::RateLimiter;
use super::schema::Sheet;
use super::transport::{Connector, SheetTransport, StaticConnector};
use super::Rows;
use crate::utils::cells::cell;
use crate::utils::ids::normalize_id;

/// Sheet rows start below the header, so data index 0 lives on row 2.
pub fn row_number_for_index(index: usize) -> usize {
    index + 2
}

pub fn compose_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| normalize_id(part))
        .collect::<Vec<_>>()
        .join("|")
}

pub fn row_key(row: &[String], key_columns: &[usize]) -> String {
    let parts: Vec<&str> = key_columns.iter().map(|c| cell(row, *c)).collect();
    compose_key(&parts)
}

fn pad_row(mut row: Vec<String>, sheet: Sheet) -> Vec<String> {
    let width = sheet.headers().len();
    if row.len() < width {
        row.resize(width, String::new());
    }
    row
}

fn log_failure(operation: &str, sheet: Sheet, error: &StoreError) {
    if error.is_unavailable() {
        tracing::debug!("Record store {} on {} skipped: {}", operation, sheet.title(), error);
    } else {
        tracing::error!("Record store {} on {} failed: {}", operation, sheet.title(), error);
    }
}

/// Row-oriented access to the remote record store.
///
/// The transport is created lazily and re-attempted on every call until it
/// succeeds; the first success also bootstraps the sheet schema. Reads of a
/// whole sheet are cached for a fixed TTL and every write invalidates the
/// cache entries of the sheet it touched. All remote calls go through a rate
/// limiter.
pub struct RecordStoreClient {
    connector: Box<dyn Connector>,
    transport: OnceCell<Arc<dyn SheetTransport>>,
    cache: ReadCache<Rows>,
    limiter: RateLimiter,
}

impl RecordStoreClient {
    pub fn new(connector: impl Connector + 'static, cache_ttl: Duration, min_delay: Duration) -> Self {
        Self {
            connector: Box::new(connector),
            transport: OnceCell::new(),
            cache: ReadCache::new(cache_ttl),
            limiter: RateLimiter::new(min_delay),
        }
    }

    pub fn with_transport(
        transport: Arc<dyn SheetTransport>,
        cache_ttl: Duration,
        min_delay: Duration,
    ) -> Self {
        Self::new(StaticConnector(transport), cache_ttl, min_delay)
    }

    async fn transport(&self) -> Result<Arc<dyn SheetTransport>, StoreError> {
        self.transport
            .get_or_try_init(|| async {
                let transport = self.connector.connect().await?;
                let created = self.bootstrap_schema(transport.as_ref()).await?;
                tracing::info!(created = ?created, "Record store initialized");
                Ok::<_, StoreError>(transport)
            })
            .await
            .cloned()
    }

    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.transport().await.map(|_| ())
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.initialized()
    }

    /// Checks every required sheet and creates missing ones with their header
    /// row. Safe to repeat; returns the titles it had to create.
    pub async fn ensure_schema(&self) -> Result<Vec<&'static str>, StoreError> {
        let transport = self.transport().await?;
        self.bootstrap_schema(transport.as_ref()).await
    }

    async fn bootstrap_schema(
        &self,
        transport: &dyn SheetTransport,
    ) -> Result<Vec<&'static str>, StoreError> {
        self.limiter.acquire().await;
        let titles = transport.sheet_titles().await?;
        let mut created = Vec::new();

        for sheet in Sheet::ALL {
            let title = sheet.title();
            let header_range = A1Range::single_row(title, 1);

            if !titles.iter().any(|t| t == title) {
                self.limiter.acquire().await;
                transport.add_sheet(title).await?;
                self.limiter.acquire().await;
                transport
                    .write_range(&header_range, vec![sheet.header_row()])
                    .await?;
                created.push(title);
                continue;
            }

            self.limiter.acquire().await;
            let header = transport.read_range(&header_range).await?;
            if header.first().is_none_or(|row| row.is_empty()) {
                tracing::warn!("Sheet {} has no header row, writing one", title);
                self.limiter.acquire().await;
                transport
                    .write_range(&header_range, vec![sheet.header_row()])
                    .await?;
            }
        }

        Ok(created)
    }

    async fn fetch_rows(&self, sheet: Sheet) -> Result<Rows, StoreError> {
        let transport = self.transport().await?;
        self.limiter.acquire().await;
        transport
            .read_range(&A1Range::rows(sheet.title(), 2))
            .await
    }

    /// All data rows of a sheet, served from the cache while fresh.
    pub async fn read_rows(&self, sheet: Sheet) -> Result<Rows, StoreError> {
        let key = format!("{}all", sheet.cache_prefix());
        if let Some(rows) = self.cache.get(&key) {
            return Ok(rows);
        }

        let rows = self
            .fetch_rows(sheet)
            .await
            .inspect_err(|e| log_failure("read", sheet, e))?;
        self.cache.put(key, rows.clone());
        Ok(rows)
    }

    pub fn invalidate(&self, sheet: Sheet) {
        self.cache.invalidate_prefix(sheet.cache_prefix());
    }

    pub async fn append_row(&self, sheet: Sheet, row: Vec<String>) -> Result<(), StoreError> {
        let result = async {
            let transport = self.transport().await?;
            self.limiter.acquire().await;
            transport
                .append_rows(&A1Range::rows(sheet.title(), 1), vec![pad_row(row, sheet)])
                .await
        }
        .await;
        self.invalidate(sheet);
        result.inspect_err(|e| log_failure("append", sheet, e))
    }

    /// Linear scan for the row whose key columns match `key`. Always reads
    /// fresh rows so the returned row number is current.
    pub async fn find_row(
        &self,
        sheet: Sheet,
        key_columns: &[usize],
        key: &str,
    ) -> Result<Option<(usize, Vec<String>)>, StoreError> {
        let rows = self
            .fetch_rows(sheet)
            .await
            .inspect_err(|e| log_failure("scan", sheet, e))?;
        let key = normalize_key(key);

        Ok(rows
            .into_iter()
            .enumerate()
            .find(|(_, row)| !row.is_empty() && row_key(row, key_columns) == key)
            .map(|(index, row)| (row_number_for_index(index), row)))
    }

    pub async fn update_row(
        &self,
        sheet: Sheet,
        row_number: usize,
        row: Vec<String>,
    ) -> Result<(), StoreError> {
        let result = async {
            let transport = self.transport().await?;
            self.limiter.acquire().await;
            transport
                .write_range(
                    &A1Range::single_row(sheet.title(), row_number),
                    vec![pad_row(row, sheet)],
                )
                .await
        }
        .await;
        self.invalidate(sheet);
        result.inspect_err(|e| log_failure("update", sheet, e))
    }

    /// Returns `false` when no row carries the key.
    pub async fn update_row_by_key(
        &self,
        sheet: Sheet,
        key_columns: &[usize],
        key: &str,
        row: Vec<String>,
    ) -> Result<bool, StoreError> {
        match self.find_row(sheet, key_columns, key).await? {
            Some((row_number, _)) => {
                self.update_row(sheet, row_number, row).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Empties the row's cells. The row itself stays behind as a gap.
    pub async fn clear_row_by_key(
        &self,
        sheet: Sheet,
        key_columns: &[usize],
        key: &str,
    ) -> Result<bool, StoreError> {
        let Some((row_number, _)) = self.find_row(sheet, key_columns, key).await? else {
            return Ok(false);
        };

        let result = async {
            let transport = self.transport().await?;
            self.limiter.acquire().await;
            transport
                .clear_range(&A1Range::single_row(sheet.title(), row_number))
                .await
        }
        .await;
        self.invalidate(sheet);
        result.inspect_err(|e| log_failure("clear", sheet, e))?;
        Ok(true)
    }

    /// Overwrites one column for the first `values.len()` data rows.
    pub async fn write_column(
        &self,
        sheet: Sheet,
        column: usize,
        values: Vec<String>,
    ) -> Result<(), StoreError> {
        if values.is_empty() {
            return Ok(());
        }

        let range = A1Range::column(sheet.title(), column, 2, values.len() + 1);
        let result = async {
            let transport = self.transport().await?;
            self.limiter.acquire().await;
            transport
                .write_range(&range, values.into_iter().map(|v| vec![v]).collect())
                .await
        }
        .await;
        self.invalidate(sheet);
        result.inspect_err(|e| log_failure("column write", sheet, e))
    }
}

/// Keys handed in by callers go through the same normalization as row keys.
pub fn normalize_key(key: &str) -> String {
    let parts: Vec<&str> = key.split('|').collect();
    compose_key(&parts)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::record_store::memory::MemorySheetTransport;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn client(transport: Arc<MemorySheetTransport>) -> RecordStoreClient {
        RecordStoreClient::with_transport(transport, Duration::from_secs(30), Duration::ZERO)
    }

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let transport = Arc::new(MemorySheetTransport::new());
        let client = client(transport.clone());

        client.initialize().await.unwrap();
        let created_again = client.ensure_schema().await.unwrap();

        assert!(created_again.is_empty());
        assert_eq!(transport.sheet_count(), Sheet::ALL.len());
        for sheet in Sheet::ALL {
            let rows = transport.sheet_rows(sheet.title()).unwrap();
            assert_eq!(rows.len(), 1, "{} should hold only its header", sheet.title());
            assert_eq!(rows[0], sheet.header_row());
        }
    }

    #[tokio::test]
    async fn bootstrap_repairs_missing_header() {
        let transport = Arc::new(MemorySheetTransport::new());
        transport.add_sheet("Groups").await.unwrap();
        let client = client(transport.clone());

        let created = client.ensure_schema().await.unwrap();

        assert!(!created.contains(&"Groups"));
        assert_eq!(
            transport.sheet_rows("Groups").unwrap()[0],
            Sheet::Groups.header_row()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reads_within_ttl_hit_the_remote_once() {
        let transport = Arc::new(MemorySheetTransport::new());
        let client = client(transport.clone());
        client.initialize().await.unwrap();
        let baseline = transport.read_calls();

        client.read_rows(Sheet::Students).await.unwrap();
        client.read_rows(Sheet::Students).await.unwrap();
        assert_eq!(transport.read_calls() - baseline, 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        client.read_rows(Sheet::Students).await.unwrap();
        assert_eq!(transport.read_calls() - baseline, 2);
    }

    #[tokio::test]
    async fn writes_invalidate_the_cache_immediately() {
        let transport = Arc::new(MemorySheetTransport::new());
        let client = client(transport.clone());

        assert!(client.read_rows(Sheet::Groups).await.unwrap().is_empty());
        client
            .append_row(Sheet::Groups, row(&["1", "Red House", "#FF0000"]))
            .await
            .unwrap();

        let rows = client.read_rows(Sheet::Groups).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "Red House");
    }

    #[tokio::test]
    async fn updates_address_the_matching_row() {
        let transport = Arc::new(MemorySheetTransport::new());
        let client = client(transport.clone());
        for (id, name) in [("1", "Red"), ("2", "Blue"), ("3", "Green")] {
            client
                .append_row(Sheet::Groups, row(&[id, name]))
                .await
                .unwrap();
        }

        let (row_number, _) = client
            .find_row(Sheet::Groups, &[0], "2.0")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row_number, 3);

        let updated = client
            .update_row_by_key(Sheet::Groups, &[0], "2", row(&["2", "Navy"]))
            .await
            .unwrap();
        assert!(updated);

        let raw = transport.sheet_rows("Groups").unwrap();
        assert_eq!(raw[2][1], "Navy");
        assert_eq!(raw[1][1], "Red");
        assert_eq!(raw[3][1], "Green");
    }

    #[tokio::test]
    async fn clearing_leaves_a_gap_and_keeps_alignment() {
        let transport = Arc::new(MemorySheetTransport::new());
        let client = client(transport.clone());
        for id in ["1", "2", "3"] {
            client.append_row(Sheet::Groups, row(&[id, "x"])).await.unwrap();
        }

        assert!(client.clear_row_by_key(Sheet::Groups, &[0], "1").await.unwrap());
        assert!(!client.clear_row_by_key(Sheet::Groups, &[0], "9").await.unwrap());

        let (row_number, _) = client
            .find_row(Sheet::Groups, &[0], "3")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row_number, 4);
    }

    #[tokio::test]
    async fn composite_keys_match_on_every_column() {
        let transport = Arc::new(MemorySheetTransport::new());
        let client = client(transport.clone());
        client
            .append_row(Sheet::GoalHistory, row(&["7", "2026-10-15"]))
            .await
            .unwrap();
        client
            .append_row(Sheet::GoalHistory, row(&["7", "2026-10-16"]))
            .await
            .unwrap();

        let found = client
            .find_row(Sheet::GoalHistory, &[0, 1], &compose_key(&["7", "2026-10-16"]))
            .await
            .unwrap();
        assert_eq!(found.map(|(n, _)| n), Some(3));
    }

    struct FlakyConnector {
        attempts: AtomicUsize,
        transport: Arc<MemorySheetTransport>,
    }

    #[async_trait]
    impl Connector for FlakyConnector {
        async fn connect(&self) -> Result<Arc<dyn SheetTransport>, StoreError> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(StoreError::NotInitialized("no credentials".to_string()));
            }
            Ok(self.transport.clone())
        }
    }

    #[tokio::test]
    async fn initialization_is_retried_lazily() {
        let client = RecordStoreClient::new(
            FlakyConnector {
                attempts: AtomicUsize::new(0),
                transport: Arc::new(MemorySheetTransport::new()),
            },
            Duration::from_secs(30),
            Duration::ZERO,
        );

        let first = client.read_rows(Sheet::Students).await;
        assert!(matches!(first, Err(StoreError::NotInitialized(_))));
        assert!(!client.is_initialized());

        assert!(client.read_rows(Sheet::Students).await.is_ok());
        assert!(client.is_initialized());
    }
}
