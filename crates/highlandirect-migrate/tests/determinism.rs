//! Reruns against fresh destinations produce the same data.

mod common;

use std::path::Path;

use common::{count, legacy_db, open_destination};
use highlandirect_migrate::{Config, MigrationResult, Orchestrator};

const TABLES: [&str; 8] = [
    "Address",
    "Shipper",
    "Consignee",
    "ProductMaster",
    "Store",
    "Order",
    "OrderHistory",
    "ReportMemo",
];

async fn migrate(source: &Path, destination: &Path) -> MigrationResult {
    Orchestrator::connect(Config::new(source, destination))
        .await
        .unwrap()
        .run()
        .await
        .unwrap()
}

async fn codes(destination: &Path) -> Vec<String> {
    let mut conn = open_destination(destination).await;
    sqlx::query_scalar::<_, String>(
        r#"SELECT ShipperCode FROM Shipper
           UNION ALL SELECT ConsigneeCode FROM Consignee
           UNION ALL SELECT ProductCode FROM ProductMaster
           UNION ALL SELECT OrderNumber FROM "Order"
           ORDER BY 1"#,
    )
    .fetch_all(&mut conn)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_rerun_produces_identical_counts_and_codes() {
    let dir = tempfile::tempdir().unwrap();
    let source = legacy_db(dir.path()).await;
    let first = dir.path().join("first.db");
    let second = dir.path().join("second.db");

    let a = migrate(&source, &first).await;
    let b = migrate(&source, &second).await;

    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.counts, b.counts);
    assert_eq!(a.skipped_orders, b.skipped_orders);

    let mut first_conn = open_destination(&first).await;
    let mut second_conn = open_destination(&second).await;
    for table in TABLES {
        assert_eq!(
            count(&mut first_conn, table).await,
            count(&mut second_conn, table).await,
            "{}",
            table
        );
    }

    assert_eq!(codes(&first).await, codes(&second).await);
}

#[tokio::test]
async fn test_source_is_not_modified() {
    let dir = tempfile::tempdir().unwrap();
    let source = legacy_db(dir.path()).await;
    let before = std::fs::read(&source).unwrap();

    migrate(&source, &dir.path().join("out.db")).await;

    assert_eq!(std::fs::read(&source).unwrap(), before);
}
