//! Typed records for the legacy tables.
//!
//! Each record is built once at the read boundary from the positional
//! fields of its SELECT list, so transformation code never indexes rows.

use serde::{Deserialize, Serialize};

/// Legacy `CustomerMaster` row.
///
/// `latest_send` / `latest_receive` are only inspected for presence: a
/// customer that has ever sent becomes a shipper, one that has ever
/// received becomes a consignee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub cust_no: i64,
    pub furigana: Option<String>,
    pub name: Option<String>,
    pub keisho: Option<String>,
    pub city_name: Option<String>,
    pub postal_cd: Option<String>,
    pub prefecture_cd: Option<String>,
    pub prefecture_name: Option<String>,
    pub region_cd: Option<String>,
    pub region_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub address4: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub phone2: Option<String>,
    pub mail_address: Option<String>,
    pub memo: Option<String>,
    pub label: Option<String>,
    pub latest_send: Option<String>,
    pub latest_receive: Option<String>,
    /// Soft-delete flag. NULL means active.
    pub deleted: Option<bool>,
}

impl CustomerRecord {
    /// Soft-deleted customers are excluded from migration.
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }

    pub fn is_sender(&self) -> bool {
        self.latest_send.is_some()
    }

    pub fn is_receiver(&self) -> bool {
        self.latest_receive.is_some()
    }
}

/// Legacy `ProductMaster` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: i64,
    pub name: Option<String>,
    /// Unit price (`Tanka`).
    pub unit_price: Option<f64>,
    pub is_default: Option<bool>,
}

/// Legacy `Store` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: i64,
    pub store_id1: Option<String>,
    pub store_id2: Option<String>,
    pub customer_cd: Option<String>,
    pub name: Option<String>,
    pub is_default: Option<bool>,
}

/// Legacy `Order` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: i64,
    pub order_date: Option<String>,
    pub receive_cust_id: Option<i64>,
    pub send_cust_id: Option<i64>,
    pub product_id: Option<i64>,
}

/// Legacy `OrderHistory` row. Same shape as an order; only the id survives
/// the migration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderHistoryRecord {
    pub order_id: i64,
    pub order_date: Option<String>,
    pub receive_cust_id: Option<i64>,
    pub send_cust_id: Option<i64>,
    pub product_id: Option<i64>,
}

/// Legacy `ReportMemo` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMemoRecord {
    pub report_memo_id: i64,
    pub content: Option<String>,
    pub name: Option<String>,
    pub is_default: Option<bool>,
}

/// Legacy tables, for row counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEntity {
    /// Active (non-deleted) customers only.
    Customer,
    Product,
    Store,
    Order,
    OrderHistory,
    ReportMemo,
}

impl SourceEntity {
    /// Legacy table name.
    pub fn table_name(self) -> &'static str {
        match self {
            SourceEntity::Customer => "CustomerMaster",
            SourceEntity::Product => "ProductMaster",
            SourceEntity::Store => "Store",
            SourceEntity::Order => "Order",
            SourceEntity::OrderHistory => "OrderHistory",
            SourceEntity::ReportMemo => "ReportMemo",
        }
    }
}
