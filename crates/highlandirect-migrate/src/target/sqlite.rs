//! SQLite destination writer.
//!
//! One connection carries every phase. Phase transactions are issued as
//! plain `BEGIN` / `COMMIT` / `ROLLBACK` so the writer can own the
//! connection across calls.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Executor, Row};
use tracing::{debug, info};

use super::types::*;
use super::TargetWriter;
use crate::config::TargetConfig;
use crate::error::{MigrateError, Result};

const INSERT_ADDRESS: &str = r#"
    INSERT INTO Address (
        Furigana, Name, Keisho, CityName, PostalCD,
        PrefectureCD, PrefectureName, RegionCD, RegionName,
        Address1, Address2, Address3, Address4,
        Phone, Fax, Phone2, MailAddress, Memo
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const INSERT_SHIPPER: &str =
    "INSERT INTO Shipper (AddressId, ShipperCode, ShipperType) VALUES (?, ?, ?)";

const INSERT_CONSIGNEE: &str = "INSERT INTO Consignee (AddressId, ConsigneeCode) VALUES (?, ?)";

const INSERT_PRODUCT: &str = r#"
    INSERT INTO ProductMaster (ProductCode, ProductName, UnitPrice, IsDefault)
    VALUES (?, ?, ?, ?)
"#;

const INSERT_STORE: &str = r#"
    INSERT INTO Store (StoreCode, StoreName, CarrierCode, CarrierName, IsDefault)
    VALUES (?, ?, ?, ?, ?)
"#;

const INSERT_ORDER: &str = r#"
    INSERT INTO "Order" (
        OrderNumber, OrderDate, ShipperId, ConsigneeId,
        ProductId, StoreId, OrderStatus
    ) VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

const INSERT_ORDER_HISTORY: &str = r#"
    INSERT INTO OrderHistory (OrderId, StatusChange, NewStatus, ChangedBy)
    VALUES (?, ?, ?, ?)
"#;

const INSERT_REPORT_MEMO: &str =
    "INSERT INTO ReportMemo (MemoName, MemoContent, IsDefault) VALUES (?, ?, ?)";

/// SQLite implementation of [`TargetWriter`].
pub struct SqliteTarget {
    conn: Option<SqliteConnection>,
    in_transaction: bool,
}

impl SqliteTarget {
    /// Open (creating if needed) the destination file.
    ///
    /// The parent directory is created when missing.
    pub async fn open(config: &TargetConfig) -> Result<Self> {
        let path = &config.path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                debug!("Created destination directory: {}", parent.display());
            }
        }

        let conn = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(config.foreign_keys)
            .connect()
            .await
            .map_err(|e| MigrateError::connection(e, "opening destination database"))?;

        info!(
            "Connected to destination: {} (foreign keys {})",
            path.display(),
            if config.foreign_keys { "on" } else { "off" }
        );

        Ok(Self::from_connection(conn))
    }

    /// Private in-memory destination with foreign keys enforced.
    pub async fn in_memory() -> Result<Self> {
        let conn = SqliteConnectOptions::from_str("sqlite::memory:")?
            .foreign_keys(true)
            .connect()
            .await
            .map_err(|e| MigrateError::connection(e, "opening in-memory destination"))?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: SqliteConnection) -> Self {
        Self {
            conn: Some(conn),
            in_transaction: false,
        }
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| MigrateError::connection("connection already closed", "destination"))
    }

    async fn find_id(&mut self, sql: &str, key: i64) -> Result<Option<i64>> {
        let row = sqlx::query(sql)
            .bind(key)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(match row {
            Some(row) => Some(row.try_get::<i64, _>(0)?),
            None => None,
        })
    }

    /// Raw query access for assertions in unit tests.
    #[cfg(test)]
    pub(crate) async fn fetch_rows(&mut self, sql: &str) -> Vec<sqlx::sqlite::SqliteRow> {
        sqlx::query(sql)
            .fetch_all(self.conn().unwrap())
            .await
            .unwrap()
    }
}

#[async_trait]
impl TargetWriter for SqliteTarget {
    async fn begin(&mut self) -> Result<()> {
        self.conn()?.execute("BEGIN").await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.conn()?.execute("COMMIT").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.conn()?.execute("ROLLBACK").await?;
        Ok(())
    }

    async fn execute_ddl(&mut self, statement: &str) -> Result<()> {
        self.conn()?.execute(statement).await?;
        Ok(())
    }

    async fn insert_address(&mut self, a: &NewAddress) -> Result<i64> {
        let result = sqlx::query(INSERT_ADDRESS)
            .bind(a.furigana.as_deref())
            .bind(a.name.as_deref())
            .bind(a.keisho.as_deref())
            .bind(a.city_name.as_deref())
            .bind(a.postal_cd.as_deref())
            .bind(a.prefecture_cd.as_deref())
            .bind(a.prefecture_name.as_deref())
            .bind(a.region_cd.as_deref())
            .bind(a.region_name.as_deref())
            .bind(a.address1.as_deref())
            .bind(a.address2.as_deref())
            .bind(a.address3.as_deref())
            .bind(a.address4.as_deref())
            .bind(a.phone.as_deref())
            .bind(a.fax.as_deref())
            .bind(a.phone2.as_deref())
            .bind(a.mail_address.as_deref())
            .bind(a.memo.as_deref())
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn insert_shipper(&mut self, s: &NewShipper) -> Result<i64> {
        let result = sqlx::query(INSERT_SHIPPER)
            .bind(s.address_id)
            .bind(s.shipper_code.as_str())
            .bind(s.shipper_type.as_str())
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn insert_consignee(&mut self, c: &NewConsignee) -> Result<i64> {
        let result = sqlx::query(INSERT_CONSIGNEE)
            .bind(c.address_id)
            .bind(c.consignee_code.as_str())
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn insert_product(&mut self, p: &NewProduct) -> Result<i64> {
        let result = sqlx::query(INSERT_PRODUCT)
            .bind(p.product_code.as_str())
            .bind(p.product_name.as_deref())
            .bind(p.unit_price)
            .bind(p.is_default)
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn insert_store(&mut self, s: &NewStore) -> Result<i64> {
        let result = sqlx::query(INSERT_STORE)
            .bind(s.store_code.as_str())
            .bind(s.store_name.as_str())
            .bind(s.carrier_code.as_str())
            .bind(s.carrier_name.as_str())
            .bind(s.is_default)
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn insert_order(&mut self, o: &NewOrder) -> Result<i64> {
        let result = sqlx::query(INSERT_ORDER)
            .bind(o.order_number.as_str())
            .bind(o.order_date.as_deref())
            .bind(o.shipper_id)
            .bind(o.consignee_id)
            .bind(o.product_id)
            .bind(o.store_id)
            .bind(o.order_status.as_str())
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn insert_order_history(&mut self, h: &NewOrderHistory) -> Result<i64> {
        let result = sqlx::query(INSERT_ORDER_HISTORY)
            .bind(h.order_id)
            .bind(h.status_change.as_str())
            .bind(h.new_status.as_str())
            .bind(h.changed_by.as_str())
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn insert_report_memo(&mut self, m: &NewReportMemo) -> Result<i64> {
        let result = sqlx::query(INSERT_REPORT_MEMO)
            .bind(m.memo_name.as_deref())
            .bind(m.memo_content.as_deref())
            .bind(m.is_default)
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn find_shipper_by_address(&mut self, address_id: i64) -> Result<Option<i64>> {
        self.find_id(
            "SELECT ShipperId FROM Shipper WHERE AddressId = ? LIMIT 1",
            address_id,
        )
        .await
    }

    async fn find_consignee_by_address(&mut self, address_id: i64) -> Result<Option<i64>> {
        self.find_id(
            "SELECT ConsigneeId FROM Consignee WHERE AddressId = ? LIMIT 1",
            address_id,
        )
        .await
    }

    async fn find_default_store(&mut self) -> Result<Option<i64>> {
        self.find_id(
            "SELECT StoreId FROM Store WHERE IsDefault = ? ORDER BY StoreId LIMIT 1",
            1,
        )
        .await
    }

    async fn count_rows(&mut self, table: TargetTable) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.table_name());
        let row = sqlx::query(&sql).fetch_one(self.conn()?).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn foreign_key_violations(&mut self) -> Result<Vec<ForeignKeyViolation>> {
        let rows = sqlx::query("PRAGMA foreign_key_check")
            .fetch_all(self.conn()?)
            .await?;

        let mut violations = Vec::with_capacity(rows.len());
        for row in rows {
            violations.push(ForeignKeyViolation {
                table: row.try_get_unchecked::<String, _>(0)?,
                rowid: row.try_get_unchecked::<Option<i64>, _>(1)?,
                parent: row.try_get_unchecked::<String, _>(2)?,
            });
        }
        Ok(violations)
    }

    fn db_type(&self) -> &str {
        "sqlite"
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{apply_schema, SchemaScript};

    async fn target() -> SqliteTarget {
        let mut target = SqliteTarget::in_memory().await.unwrap();
        let report = apply_schema(&mut target, &SchemaScript::embedded()).await;
        assert_eq!(report.failed, 0, "embedded schema must apply cleanly");
        target
    }

    fn address(name: &str) -> NewAddress {
        NewAddress {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_returns_generated_ids() {
        let mut target = target().await;
        let first = target.insert_address(&address("山田")).await.unwrap();
        let second = target.insert_address(&address("佐藤")).await.unwrap();
        assert_eq!(second, first + 1);
        assert_eq!(target.count_rows(TargetTable::Address).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_shipper_and_consignee_by_address() {
        let mut target = target().await;
        let a = target.insert_address(&address("a")).await.unwrap();
        let b = target.insert_address(&address("b")).await.unwrap();

        let shipper = target
            .insert_shipper(&NewShipper {
                address_id: a,
                shipper_code: "SHIP0001".into(),
                shipper_type: "既存荷主".into(),
            })
            .await
            .unwrap();
        let consignee = target
            .insert_consignee(&NewConsignee {
                address_id: b,
                consignee_code: "CONS0002".into(),
            })
            .await
            .unwrap();

        assert_eq!(target.find_shipper_by_address(a).await.unwrap(), Some(shipper));
        assert_eq!(target.find_shipper_by_address(b).await.unwrap(), None);
        assert_eq!(
            target.find_consignee_by_address(b).await.unwrap(),
            Some(consignee)
        );
        assert_eq!(target.find_consignee_by_address(a).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_shipper_requires_existing_address() {
        let mut target = target().await;
        let err = target
            .insert_shipper(&NewShipper {
                address_id: 42,
                shipper_code: "SHIP0042".into(),
                shipper_type: "既存荷主".into(),
            })
            .await;
        assert!(err.is_err(), "foreign keys must be enforced");
    }

    #[tokio::test]
    async fn test_rollback_discards_phase_writes() {
        let mut target = target().await;
        target.begin().await.unwrap();
        target.insert_address(&address("kept?")).await.unwrap();
        target.rollback().await.unwrap();
        assert_eq!(target.count_rows(TargetTable::Address).await.unwrap(), 0);

        target.begin().await.unwrap();
        target.insert_address(&address("kept")).await.unwrap();
        target.commit().await.unwrap();
        assert_eq!(target.count_rows(TargetTable::Address).await.unwrap(), 1);

        // Nothing open: rollback is a no-op
        target.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_default_store_lookup() {
        let mut target = target().await;
        assert_eq!(target.find_default_store().await.unwrap(), None);

        let store = |code: &str, is_default| NewStore {
            store_code: code.into(),
            store_name: "集配所".into(),
            carrier_code: "YAMATO".into(),
            carrier_name: "ヤマト運輸".into(),
            is_default,
        };
        target.insert_store(&store("S1", false)).await.unwrap();
        let second = target.insert_store(&store("S2", true)).await.unwrap();
        target.insert_store(&store("S3", true)).await.unwrap();

        assert_eq!(target.find_default_store().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_closed_target_rejects_calls() {
        let mut target = target().await;
        target.close().await.unwrap();
        assert!(target.count_rows(TargetTable::Store).await.is_err());
        // Closing twice is harmless
        target.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = TargetConfig {
            path: dir.path().join("nested").join("out").join("new.sqlite"),
            ..TargetConfig::default()
        };
        let mut target = SqliteTarget::open(&config).await.unwrap();
        assert!(config.path.exists());
        target.close().await.unwrap();
    }
}
