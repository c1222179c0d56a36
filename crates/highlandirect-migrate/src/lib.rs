//! # highlandirect-migrate
//!
//! One-shot migration of the HighLandirect legacy database into the
//! normalized SQLite schema.
//!
//! The legacy store keeps customers, products, stores, orders and report
//! memos in denormalized tables. This library:
//!
//! - **Splits customers** into an address plus optional shipper and
//!   consignee roles
//! - **Remaps keys** so orders reference the new shipper/consignee ids
//! - **Commits per phase**, so a failing entity family does not undo the others
//! - **Generates deterministic codes** (`SHIP0007`, `PROD0003`, `ORD00000042`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use highlandirect_migrate::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> highlandirect_migrate::Result<()> {
//!     let config = Config::new("legacy.db", "out/highlandirect.db");
//!     let orchestrator = Orchestrator::connect(config).await?;
//!     let result = orchestrator.run().await?;
//!     println!("Migrated {} orders", result.counts.orders);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mapping;
pub mod orchestrator;
pub mod schema;
pub mod source;
pub mod target;
pub mod transform;
pub mod verify;

// Re-exports for convenient access
pub use config::{Config, MigrationConfig, SourceConfig, TargetConfig};
pub use error::{MigrateError, Result};
pub use mapping::KeyMapping;
pub use orchestrator::{MigrationPhase, MigrationResult, Orchestrator};
pub use schema::{apply_schema, SchemaReport, SchemaScript};
pub use source::{MemorySource, SourceReader, SqliteSource};
pub use target::{SqliteTarget, TargetWriter};
pub use verify::{validate, ValidationReport};
