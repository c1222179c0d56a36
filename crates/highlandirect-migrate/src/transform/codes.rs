//! Deterministic business codes.
//!
//! Every code is a pure function of the legacy id so reruns produce the
//! same destination rows.

pub fn shipper_code(cust_no: i64) -> String {
    format!("SHIP{:04}", cust_no)
}

pub fn consignee_code(cust_no: i64) -> String {
    format!("CONS{:04}", cust_no)
}

pub fn product_code(product_id: i64) -> String {
    format!("PROD{:04}", product_id)
}

/// `ORD` followed by the order id padded to eight digits.
pub fn order_number(order_id: i64) -> String {
    format!("ORD{:08}", order_id)
}

/// The legacy first store id when it has content, else `STORE{id}`.
pub fn store_code(id: i64, store_id1: Option<&str>) -> String {
    match super::non_blank(store_id1) {
        Some(code) => code.to_string(),
        None => format!("STORE{}", id),
    }
}
