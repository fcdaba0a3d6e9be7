pub mod cache;
pub mod client;
pub mod credentials;
pub mod error;
pub mod http;
pub mod memory;
pub mod range;
pub mod rate_limiter;
pub mod schema;
pub mod transport;

pub use cache::ReadCache;
pub use client::RecordStoreClient;
pub use error::StoreError;
pub use memory::MemorySheetTransport;
pub use schema::Sheet;
pub use transport::{Connector, SheetTransport, StaticConnector, UnavailableConnector};

pub type Rows = Vec<Vec<String>>;
