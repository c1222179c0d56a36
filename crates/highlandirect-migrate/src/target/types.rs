//! Rows written to the normalized schema.

use serde::{Deserialize, Serialize};

/// Contact block shared by shippers and consignees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAddress {
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
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewShipper {
    pub address_id: i64,
    pub shipper_code: String,
    pub shipper_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewConsignee {
    pub address_id: i64,
    pub consignee_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub product_code: String,
    pub product_name: Option<String>,
    pub unit_price: f64,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStore {
    pub store_code: String,
    pub store_name: String,
    pub carrier_code: String,
    pub carrier_name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: String,
    pub order_date: Option<String>,
    pub shipper_id: i64,
    pub consignee_id: i64,
    pub product_id: i64,
    pub store_id: i64,
    pub order_status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderHistory {
    pub order_id: i64,
    pub status_change: String,
    pub new_status: String,
    pub changed_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReportMemo {
    pub memo_name: Option<String>,
    pub memo_content: Option<String>,
    pub is_default: bool,
}

/// Destination tables, for row counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTable {
    Address,
    Shipper,
    Consignee,
    ProductMaster,
    Store,
    Order,
    OrderHistory,
    ReportMemo,
}

impl TargetTable {
    pub const ALL: [TargetTable; 8] = [
        TargetTable::Address,
        TargetTable::Shipper,
        TargetTable::Consignee,
        TargetTable::ProductMaster,
        TargetTable::Store,
        TargetTable::Order,
        TargetTable::OrderHistory,
        TargetTable::ReportMemo,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            TargetTable::Address => "Address",
            TargetTable::Shipper => "Shipper",
            TargetTable::Consignee => "Consignee",
            TargetTable::ProductMaster => "ProductMaster",
            TargetTable::Store => "Store",
            TargetTable::Order => "Order",
            TargetTable::OrderHistory => "OrderHistory",
            TargetTable::ReportMemo => "ReportMemo",
        }
    }
}

/// One row reported by `PRAGMA foreign_key_check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyViolation {
    pub table: String,
    pub rowid: Option<i64>,
    pub parent: String,
}
