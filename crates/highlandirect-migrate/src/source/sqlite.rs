//! SQLite reader for the legacy database.
//!
//! SQL Server Compact files cannot be opened from Rust, so the legacy
//! store is consumed as an SQLite export carrying the same table and
//! column names. Fields are read positionally in SELECT-list order and
//! turned into records immediately.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Decode, Row};
use tracing::{debug, info};

use super::types::*;
use super::SourceReader;
use crate::error::{MigrateError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

const CUSTOMER_COLUMNS: &[&str] = &[
    "CustNo",
    "Furigana",
    "CustName",
    "Keisho",
    "CityName",
    "PostalCD",
    "PrefectureCD",
    "PrefectureName",
    "RegionCD",
    "RegionName",
    "Address1",
    "Address2",
    "Address3",
    "Address4",
    "Phone",
    "Fax",
    "Phone2",
    "MailAddress",
    "Memo",
    "Label",
    "LatestSend",
    "LatestResceive",
    "Delete",
];

const ACTIVE_CUSTOMER_FILTER: &str = "\"Delete\" IS NULL OR \"Delete\" = 0";

const PRODUCT_COLUMNS: &[&str] = &["ProductID", "ProductName", "Tanka", "IsDefault"];

const STORE_COLUMNS: &[&str] = &[
    "id",
    "StoreId1",
    "StoreId2",
    "CustomerCD",
    "StoreName",
    "IsDefault",
];

const ORDER_COLUMNS: &[&str] = &[
    "OrderID",
    "OrderDate",
    "ReceiveCustID",
    "SendCustID",
    "ProductID",
];

const MEMO_COLUMNS: &[&str] = &["ReportMemoId", "ReportMemo", "MemoName", "IsDefault"];

/// Build a SELECT over quoted column names, ordered by the first column.
fn select_sql(table: &str, columns: &[&str], filter: Option<&str>) -> String {
    let list = columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("SELECT {} FROM \"{}\"", list, table);
    if let Some(filter) = filter {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    sql.push_str(&format!(" ORDER BY \"{}\"", columns[0]));
    sql
}

/// Positional access to one fetched row, naming the column on failure.
struct Fields<'r> {
    row: &'r SqliteRow,
    table: &'static str,
    columns: &'static [&'static str],
}

impl<'r> Fields<'r> {
    fn new(row: &'r SqliteRow, table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            row,
            table,
            columns,
        }
    }

    /// Decode field `idx`. Legacy exports are loosely typed (numbers stored
    /// as text and the reverse), so SQLite's own value coercion is used
    /// instead of sqlx's declared-type check. That coercion reads NULL and
    /// non-numeric text as 0 for a plain integer, so key columns go through
    /// [`Fields::id`] or [`Fields::optional_id`] instead.
    fn get<T>(&self, idx: usize) -> Result<T>
    where
        T: Decode<'r, Sqlite>,
    {
        self.row
            .try_get_unchecked::<T, _>(idx)
            .map_err(|e| MigrateError::source(e, self.column(idx)))
    }

    /// Integer key that may be absent. Blank text counts as NULL; any other
    /// non-integer value is an error.
    fn optional_id(&self, idx: usize) -> Result<Option<i64>> {
        let text: Option<String> = self.get(idx)?;
        let Some(text) = text else {
            return Ok(None);
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse::<i64>().map(Some).map_err(|_| {
            MigrateError::source(format!("not an integer id: {:?}", text), self.column(idx))
        })
    }

    /// Integer key that must be present.
    fn id(&self, idx: usize) -> Result<i64> {
        self.optional_id(idx)?
            .ok_or_else(|| MigrateError::source("required id is NULL", self.column(idx)))
    }

    fn column(&self, idx: usize) -> String {
        let column = self.columns.get(idx).copied().unwrap_or("?");
        format!("{}.{}", self.table, column)
    }
}

fn customer_from_row(row: &SqliteRow) -> Result<CustomerRecord> {
    let f = Fields::new(row, "CustomerMaster", CUSTOMER_COLUMNS);
    Ok(CustomerRecord {
        cust_no: f.id(0)?,
        furigana: f.get(1)?,
        name: f.get(2)?,
        keisho: f.get(3)?,
        city_name: f.get(4)?,
        postal_cd: f.get(5)?,
        prefecture_cd: f.get(6)?,
        prefecture_name: f.get(7)?,
        region_cd: f.get(8)?,
        region_name: f.get(9)?,
        address1: f.get(10)?,
        address2: f.get(11)?,
        address3: f.get(12)?,
        address4: f.get(13)?,
        phone: f.get(14)?,
        fax: f.get(15)?,
        phone2: f.get(16)?,
        mail_address: f.get(17)?,
        memo: f.get(18)?,
        label: f.get(19)?,
        latest_send: f.get(20)?,
        latest_receive: f.get(21)?,
        deleted: f.get(22)?,
    })
}

fn product_from_row(row: &SqliteRow) -> Result<ProductRecord> {
    let f = Fields::new(row, "ProductMaster", PRODUCT_COLUMNS);
    Ok(ProductRecord {
        product_id: f.id(0)?,
        name: f.get(1)?,
        unit_price: f.get(2)?,
        is_default: f.get(3)?,
    })
}

fn store_from_row(row: &SqliteRow) -> Result<StoreRecord> {
    let f = Fields::new(row, "Store", STORE_COLUMNS);
    Ok(StoreRecord {
        id: f.id(0)?,
        store_id1: f.get(1)?,
        store_id2: f.get(2)?,
        customer_cd: f.get(3)?,
        name: f.get(4)?,
        is_default: f.get(5)?,
    })
}

fn order_from_row(row: &SqliteRow) -> Result<OrderRecord> {
    let f = Fields::new(row, "Order", ORDER_COLUMNS);
    Ok(OrderRecord {
        order_id: f.id(0)?,
        order_date: f.get(1)?,
        receive_cust_id: f.optional_id(2)?,
        send_cust_id: f.optional_id(3)?,
        product_id: f.optional_id(4)?,
    })
}

fn history_from_row(row: &SqliteRow) -> Result<OrderHistoryRecord> {
    let f = Fields::new(row, "OrderHistory", ORDER_COLUMNS);
    Ok(OrderHistoryRecord {
        order_id: f.id(0)?,
        order_date: f.get(1)?,
        receive_cust_id: f.optional_id(2)?,
        send_cust_id: f.optional_id(3)?,
        product_id: f.optional_id(4)?,
    })
}

fn memo_from_row(row: &SqliteRow) -> Result<ReportMemoRecord> {
    let f = Fields::new(row, "ReportMemo", MEMO_COLUMNS);
    Ok(ReportMemoRecord {
        report_memo_id: f.id(0)?,
        content: f.get(1)?,
        name: f.get(2)?,
        is_default: f.get(3)?,
    })
}

/// Read-only reader over an SQLite export of the legacy database.
pub struct SqliteSource {
    pool: SqlitePool,
}

impl SqliteSource {
    /// Open the legacy file read-only.
    ///
    /// A missing file is [`MigrateError::SourceNotFound`]; a file that is
    /// not a readable database is a connection error.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MigrateError::SourceNotFound(path.to_path_buf()));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| MigrateError::connection(e, "opening legacy source database"))?;

        // Forces SQLite to read the header so a non-database file fails here
        sqlx::query("SELECT count(*) FROM sqlite_master")
            .fetch_one(&pool)
            .await
            .map_err(|e| MigrateError::connection(e, "reading legacy source database"))?;

        info!("Connected to legacy source: {}", path.display());

        Ok(Self { pool })
    }

    async fn fetch(&self, sql: &str, table: &str) -> Result<Vec<SqliteRow>> {
        debug!("Source query: {}", sql);
        sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MigrateError::source(e, format!("reading {}", table)))
    }
}

#[async_trait]
impl SourceReader for SqliteSource {
    async fn customers(&self) -> Result<Vec<CustomerRecord>> {
        let sql = select_sql(
            "CustomerMaster",
            CUSTOMER_COLUMNS,
            Some(ACTIVE_CUSTOMER_FILTER),
        );
        let rows = self.fetch(&sql, "CustomerMaster").await?;
        rows.iter().map(customer_from_row).collect()
    }

    async fn products(&self) -> Result<Vec<ProductRecord>> {
        let sql = select_sql("ProductMaster", PRODUCT_COLUMNS, None);
        let rows = self.fetch(&sql, "ProductMaster").await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn stores(&self) -> Result<Vec<StoreRecord>> {
        let sql = select_sql("Store", STORE_COLUMNS, None);
        let rows = self.fetch(&sql, "Store").await?;
        rows.iter().map(store_from_row).collect()
    }

    async fn orders(&self) -> Result<Vec<OrderRecord>> {
        let sql = select_sql("Order", ORDER_COLUMNS, None);
        let rows = self.fetch(&sql, "Order").await?;
        rows.iter().map(order_from_row).collect()
    }

    async fn order_histories(&self) -> Result<Vec<OrderHistoryRecord>> {
        let sql = select_sql("OrderHistory", ORDER_COLUMNS, None);
        let rows = self.fetch(&sql, "OrderHistory").await?;
        rows.iter().map(history_from_row).collect()
    }

    async fn report_memos(&self) -> Result<Vec<ReportMemoRecord>> {
        let sql = select_sql("ReportMemo", MEMO_COLUMNS, None);
        let rows = self.fetch(&sql, "ReportMemo").await?;
        rows.iter().map(memo_from_row).collect()
    }

    async fn count(&self, entity: SourceEntity) -> Result<i64> {
        let table = entity.table_name();
        let mut sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
        if entity == SourceEntity::Customer {
            sql.push_str(" WHERE ");
            sql.push_str(ACTIVE_CUSTOMER_FILTER);
        }
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MigrateError::source(e, format!("counting {}", table)))?;
        row.try_get::<i64, _>(0)
            .map_err(|e| MigrateError::source(e, format!("counting {}", table)))
    }

    fn db_type(&self) -> &str {
        "sqlite"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
