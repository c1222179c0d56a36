//! Legacy database fixture shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Executor};

/// Legacy tables, typed loosely the way the export tool writes them.
const LEGACY_SCHEMA: &str = r#"
CREATE TABLE CustomerMaster (
    CustNo INTEGER PRIMARY KEY, Furigana TEXT, CustName TEXT, Keisho TEXT,
    CityName TEXT, PostalCD TEXT, PrefectureCD TEXT, PrefectureName TEXT,
    RegionCD TEXT, RegionName TEXT, Address1 TEXT, Address2 TEXT,
    Address3 TEXT, Address4 TEXT, Phone TEXT, Fax TEXT, Phone2 TEXT,
    MailAddress TEXT, Memo TEXT, Label TEXT, LatestSend TEXT,
    LatestResceive TEXT, "Delete" INTEGER
);
CREATE TABLE ProductMaster (
    ProductID INTEGER PRIMARY KEY, ProductName TEXT, Tanka REAL, IsDefault INTEGER
);
CREATE TABLE Store (
    id INTEGER PRIMARY KEY, StoreId1 TEXT, StoreId2 TEXT, CustomerCD TEXT,
    StoreName TEXT, IsDefault INTEGER
);
CREATE TABLE "Order" (
    OrderID INTEGER PRIMARY KEY, OrderDate TEXT, ReceiveCustID INTEGER,
    SendCustID INTEGER, ProductID INTEGER
);
CREATE TABLE OrderHistory (
    OrderID INTEGER PRIMARY KEY, OrderDate TEXT, ReceiveCustID INTEGER,
    SendCustID INTEGER, ProductID INTEGER
);
CREATE TABLE ReportMemo (
    ReportMemoId INTEGER PRIMARY KEY, ReportMemo TEXT, MemoName TEXT, IsDefault INTEGER
);
"#;

/// Five customers:
/// 1 sends and receives, 2 receives only, 7 sends only,
/// 8 never shipped anything, 9 is soft-deleted.
const LEGACY_ROWS: &str = r#"
INSERT INTO CustomerMaster (CustNo, Furigana, CustName, Keisho, PostalCD, Address1, Phone, LatestSend, LatestResceive, "Delete")
VALUES
    (1, 'ヤマダ', '山田 太郎', '様', '100-0001', '東京都千代田区1-1', '03-0000-0001', '2023-01-10', '2023-02-01', NULL),
    (2, 'サトウ', '佐藤 花子', '様', '530-0001', '大阪府大阪市北区2-2', NULL, NULL, '2023-03-05', 0),
    (7, 'スズキ', '鈴木 一郎', '様', '460-0001', '愛知県名古屋市3-3', NULL, '2023-01-01', NULL, NULL),
    (8, 'タナカ', '田中 次郎', '殿', NULL, NULL, NULL, NULL, NULL, NULL),
    (9, 'ワタナベ', '渡辺 三郎', '様', NULL, NULL, NULL, '2022-12-01', '2022-12-01', 1);

INSERT INTO ProductMaster (ProductID, ProductName, Tanka, IsDefault)
VALUES (1, 'りんご 10kg', 3500, 1), (3, 'Widget', 12.5, NULL), (4, '送料のみ', NULL, 0);

INSERT INTO Store (id, StoreId1, StoreId2, CustomerCD, StoreName, IsDefault)
VALUES (1, '012345', '01', 'C001', '本町センター', 1), (2, NULL, NULL, NULL, NULL, NULL);

INSERT INTO "Order" (OrderID, OrderDate, ReceiveCustID, SendCustID, ProductID)
VALUES
    (100, '2023-04-01', 2, 1, 1),
    (101, '2023-04-02', 1, 7, 3),
    (102, '2023-04-03', 2, 9, 1),
    (103, '2023-04-04', 7, 1, 1),
    (104, '2023-04-05', 1, 2, 1);

INSERT INTO OrderHistory (OrderID, OrderDate, ReceiveCustID, SendCustID, ProductID)
VALUES (50, '2022-01-01', 2, 1, 1), (51, '2022-01-02', 1, 7, 3);

INSERT INTO ReportMemo (ReportMemoId, ReportMemo, MemoName, IsDefault)
VALUES (1, '冷蔵でお願いします', 'クール便', NULL), (2, 'われもの注意', '割れ物', 1);
"#;

/// Migrated orders: 100 and 101. Skipped: 102 (deleted sender),
/// 103 (receiver 7 has no consignee role), 104 (sender 2 has no shipper role).
pub const EXPECTED_ORDERS: i64 = 2;
pub const EXPECTED_SKIPPED: usize = 3;

/// Create a legacy database at `path` with the given extra statements.
pub async fn create_legacy_db(path: &Path, extra: &str) -> PathBuf {
    let mut conn: SqliteConnection = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    conn.execute(LEGACY_SCHEMA).await.unwrap();
    if !extra.is_empty() {
        conn.execute(extra).await.unwrap();
    }
    conn.close().await.unwrap();
    path.to_path_buf()
}

/// The standard fixture.
pub async fn legacy_db(dir: &Path) -> PathBuf {
    create_legacy_db(&dir.join("legacy.db"), LEGACY_ROWS).await
}

/// Open a finished destination for assertions.
pub async fn open_destination(path: &Path) -> SqliteConnection {
    SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .connect()
        .await
        .unwrap()
}

pub async fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM \"{}\"", table))
        .fetch_one(conn)
        .await
        .unwrap()
}
