use std::sync::Arc;

use async_trait::async_trait;

use super::Rows;
use super::error::StoreError;

/// Raw access to a remote spreadsheet addressed by `Sheet!A1:Z1` ranges.
#[async_trait]
pub trait SheetTransport: Send + Sync {
    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError>;

    async fn add_sheet(&self, title: &str) -> Result<(), StoreError>;

    /// Values in the range. Trailing empty rows are omitted, but empty rows
    /// between populated ones are kept so indices stay aligned.
    async fn read_range(&self, range: &str) -> Result<Rows, StoreError>;

    /// Appends after the last populated row of the range's sheet.
    async fn append_rows(&self, range: &str, rows: Rows) -> Result<(), StoreError>;

    async fn write_range(&self, range: &str, rows: Rows) -> Result<(), StoreError>;

    async fn clear_range(&self, range: &str) -> Result<(), StoreError>;
}

/// Produces a transport on demand. Called again on every use until it succeeds.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn SheetTransport>, StoreError>;
}

/// Hands out an already built transport.
pub struct StaticConnector(pub Arc<dyn SheetTransport>);

#[async_trait]
impl Connector for StaticConnector {
    async fn connect(&self) -> Result<Arc<dyn SheetTransport>, StoreError> {
        Ok(self.0.clone())
    }
}

/// A store that can never be reached; the service runs entirely on fallbacks.
pub struct UnavailableConnector {
    pub reason: String,
}

impl UnavailableConnector {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Connector for UnavailableConnector {
    async fn connect(&self) -> Result<Arc<dyn SheetTransport>, StoreError> {
        Err(StoreError::NotInitialized(self.reason.clone()))
    }
}
