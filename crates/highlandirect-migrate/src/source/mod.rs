//! Legacy database readers.
//!
//! The migration only ever asks for "all rows of entity E", so the
//! [`SourceReader`] seam is one method per legacy table returning typed
//! records.

mod memory;
mod sqlite;
mod types;

pub use memory::MemorySource;
pub use sqlite::SqliteSource;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Read rows from the legacy database.
///
/// Implementations must not mutate the source.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Customers whose delete flag is NULL or false, in legacy key order.
    async fn customers(&self) -> Result<Vec<CustomerRecord>>;

    /// All products.
    async fn products(&self) -> Result<Vec<ProductRecord>>;

    /// All stores.
    async fn stores(&self) -> Result<Vec<StoreRecord>>;

    /// All current orders.
    async fn orders(&self) -> Result<Vec<OrderRecord>>;

    /// All archived orders.
    async fn order_histories(&self) -> Result<Vec<OrderHistoryRecord>>;

    /// All report memos.
    async fn report_memos(&self) -> Result<Vec<ReportMemoRecord>>;

    /// Row count of a legacy table (active customers only for `Customer`).
    async fn count(&self, entity: SourceEntity) -> Result<i64>;

    /// Get the source type identifier (e.g., "sqlite", "memory").
    fn db_type(&self) -> &str;

    /// Release the connection.
    async fn close(&self);
}
