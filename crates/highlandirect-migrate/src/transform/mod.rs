//! Per-entity transformers.
//!
//! Each transformer reads one legacy entity family, writes the normalized
//! rows and returns an explicit outcome. Transformers do not manage
//! transactions; the orchestrator wraps each call in one.

pub mod codes;
mod customer;
mod memo;
mod order;
mod product;
mod store;

pub use customer::{migrate_customers, CustomerOutcome};
pub use memo::{migrate_report_memos, MemoOutcome};
pub use order::{
    migrate_orders, resolve_order, OrderOutcome, OrderResolution, SkipReason, SkippedOrder,
};
pub use product::{migrate_products, ProductOutcome};
pub use store::{migrate_stores, StoreOutcome};

/// Legacy flags are nullable; NULL reads as false for every entity.
pub fn flag_or_false(flag: Option<bool>) -> bool {
    flag.unwrap_or(false)
}

/// `Some` only for strings with visible content.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
