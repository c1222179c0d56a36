//! Destination database writers.

mod sqlite;
mod types;

pub use sqlite::SqliteTarget;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Write the normalized schema and its rows.
///
/// A single writer handle is shared by every phase. Writes between
/// [`begin`](TargetWriter::begin) and [`commit`](TargetWriter::commit)
/// land together or not at all.
#[async_trait]
pub trait TargetWriter: Send {
    // ===== Transaction Control =====

    /// Open the phase transaction.
    async fn begin(&mut self) -> Result<()>;

    /// Commit the phase transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the phase transaction. No-op when none is open.
    async fn rollback(&mut self) -> Result<()>;

    // ===== Schema Operations =====

    /// Execute one DDL statement.
    async fn execute_ddl(&mut self, statement: &str) -> Result<()>;

    // ===== Inserts (return the generated id) =====

    async fn insert_address(&mut self, address: &NewAddress) -> Result<i64>;

    async fn insert_shipper(&mut self, shipper: &NewShipper) -> Result<i64>;

    async fn insert_consignee(&mut self, consignee: &NewConsignee) -> Result<i64>;

    async fn insert_product(&mut self, product: &NewProduct) -> Result<i64>;

    async fn insert_store(&mut self, store: &NewStore) -> Result<i64>;

    async fn insert_order(&mut self, order: &NewOrder) -> Result<i64>;

    async fn insert_order_history(&mut self, history: &NewOrderHistory) -> Result<i64>;

    async fn insert_report_memo(&mut self, memo: &NewReportMemo) -> Result<i64>;

    // ===== Lookups =====

    /// Shipper id attached to an address, if any.
    async fn find_shipper_by_address(&mut self, address_id: i64) -> Result<Option<i64>>;

    /// Consignee id attached to an address, if any.
    async fn find_consignee_by_address(&mut self, address_id: i64) -> Result<Option<i64>>;

    /// Lowest-id store flagged default, if any.
    async fn find_default_store(&mut self) -> Result<Option<i64>>;

    /// Row count of a destination table.
    async fn count_rows(&mut self, table: TargetTable) -> Result<i64>;

    /// Rows that break a declared foreign key.
    async fn foreign_key_violations(&mut self) -> Result<Vec<ForeignKeyViolation>>;

    /// Get the database type identifier (e.g., "sqlite").
    fn db_type(&self) -> &str;

    /// Release the connection. Later calls fail.
    async fn close(&mut self) -> Result<()>;
}
