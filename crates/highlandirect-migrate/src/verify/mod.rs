//! Post-migration validation.
//!
//! Compares legacy row counts with destination row counts per entity
//! family and asks the destination for foreign key violations. Skipped
//! orders are expected to be missing, so they are subtracted before the
//! order counts are compared.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::source::{SourceEntity, SourceReader};
use crate::target::{ForeignKeyViolation, TargetTable, TargetWriter};

/// One source/destination count comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountCheck {
    /// Destination table name.
    pub table: String,
    /// Rows the destination should hold.
    pub expected: i64,
    /// Rows it actually holds.
    pub actual: i64,
}

impl CountCheck {
    pub fn matches(&self) -> bool {
        self.expected == self.actual
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<CountCheck>,
    pub foreign_key_violations: Vec<ForeignKeyViolation>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(CountCheck::matches) && self.foreign_key_violations.is_empty()
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &CountCheck> {
        self.checks.iter().filter(|c| !c.matches())
    }
}

/// Validate the destination against the source.
///
/// `skipped_orders` is the number of orders the order phase left out.
pub async fn validate<S, T>(
    source: &S,
    target: &mut T,
    skipped_orders: usize,
) -> Result<ValidationReport>
where
    S: SourceReader + ?Sized,
    T: TargetWriter + ?Sized,
{
    let customers = source.customers().await?;
    let senders = customers.iter().filter(|c| c.is_sender()).count() as i64;
    let receivers = customers.iter().filter(|c| c.is_receiver()).count() as i64;
    let orders = source.count(SourceEntity::Order).await? - skipped_orders as i64;

    let expectations = [
        (TargetTable::Address, customers.len() as i64),
        (TargetTable::Shipper, senders),
        (TargetTable::Consignee, receivers),
        (TargetTable::ProductMaster, source.count(SourceEntity::Product).await?),
        (TargetTable::Store, source.count(SourceEntity::Store).await?),
        (TargetTable::Order, orders),
        (
            TargetTable::OrderHistory,
            source.count(SourceEntity::OrderHistory).await?,
        ),
        (
            TargetTable::ReportMemo,
            source.count(SourceEntity::ReportMemo).await?,
        ),
    ];

    let mut report = ValidationReport::default();
    for (table, expected) in expectations {
        let actual = target.count_rows(table).await?;
        report.checks.push(CountCheck {
            table: table.table_name().to_string(),
            expected,
            actual,
        });
    }
    report.foreign_key_violations = target.foreign_key_violations().await?;

    for check in report.mismatches() {
        warn!(
            "Validation: {} expected {} rows, found {}",
            check.table, check.expected, check.actual
        );
    }
    for violation in &report.foreign_key_violations {
        warn!(
            "Validation: {} row {:?} references missing {}",
            violation.table, violation.rowid, violation.parent
        );
    }
    info!(
        "Validation {}: {} tables checked, {} foreign key violations",
        if report.passed() { "passed" } else { "failed" },
        report.checks.len(),
        report.foreign_key_violations.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MigrationConfig;
    use crate::source::{MemorySource, OrderRecord};
    use crate::transform::test_support::{customer, target};
    use crate::transform::{migrate_customers, migrate_orders};

    fn order(order_id: i64, send: i64, receive: i64) -> OrderRecord {
        OrderRecord {
            order_id,
            send_cust_id: Some(send),
            receive_cust_id: Some(receive),
            product_id: Some(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_databases_pass() {
        let source = MemorySource::new();
        let mut target = target().await;
        let report = validate(&source, &mut target, 0).await.unwrap();
        assert!(report.passed());
        assert_eq!(report.checks.len(), 8);
    }

    #[tokio::test]
    async fn test_missing_rows_are_reported() {
        let source = MemorySource::new().with_customers(vec![customer(1, true, true)]);
        let mut target = target().await;

        let report = validate(&source, &mut target, 0).await.unwrap();
        assert!(!report.passed());
        let tables: Vec<&str> = report.mismatches().map(|c| c.table.as_str()).collect();
        assert_eq!(tables, vec!["Address", "Shipper", "Consignee"]);
    }

    #[tokio::test]
    async fn test_skipped_orders_are_accounted_for() {
        let config = MigrationConfig::default();
        let source = MemorySource::new()
            .with_customers(vec![customer(1, true, true)])
            .with_orders(vec![order(1, 1, 1), order(2, 1, 77)]);
        let mut target = target().await;
        target
            .insert_store(&crate::target::NewStore {
                store_code: "S".into(),
                store_name: "S".into(),
                carrier_code: "YAMATO".into(),
                carrier_name: "ヤマト運輸".into(),
                is_default: true,
            })
            .await
            .unwrap();

        let customers = migrate_customers(&source, &mut target, &config).await.unwrap();
        let orders = migrate_orders(&source, &mut target, &customers.mapping, &config)
            .await
            .unwrap();
        assert_eq!(orders.skipped.len(), 1);

        let report = validate(&source, &mut target, orders.skipped.len())
            .await
            .unwrap();
        let order_check = report.checks.iter().find(|c| c.table == "Order").unwrap();
        assert!(order_check.matches());
        // The hand-inserted store has no legacy counterpart
        assert_eq!(
            report.mismatches().map(|c| c.table.as_str()).collect::<Vec<_>>(),
            vec!["Store"]
        );
    }
}
