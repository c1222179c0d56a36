//! Order and order history migration.
//!
//! An order references its sender and receiver by legacy customer number.
//! Each is resolved through the key mapping to an address, then to the
//! shipper or consignee role on that address. Orders that cannot be
//! resolved are skipped and reported, never fatal.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::codes;
use crate::config::MigrationConfig;
use crate::error::Result;
use crate::mapping::KeyMapping;
use crate::source::{OrderRecord, SourceReader};
use crate::target::{NewOrder, NewOrderHistory, TargetWriter};

/// Why an order was not migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Sending customer has no address (missing or soft-deleted).
    UnmappedSender,
    /// Receiving customer has no address (missing or soft-deleted).
    UnmappedReceiver,
    /// Sender's address carries no shipper role.
    NoShipper,
    /// Receiver's address carries no consignee role.
    NoConsignee,
    /// Legacy order has no product id.
    NoProduct,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::UnmappedSender => "sending customer not migrated",
            SkipReason::UnmappedReceiver => "receiving customer not migrated",
            SkipReason::NoShipper => "sender has no shipper record",
            SkipReason::NoConsignee => "receiver has no consignee record",
            SkipReason::NoProduct => "order has no product",
        };
        f.write_str(text)
    }
}

/// An order left out of the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedOrder {
    pub order_id: i64,
    pub send_cust_id: Option<i64>,
    pub receive_cust_id: Option<i64>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderResolution {
    Resolved {
        shipper_id: i64,
        consignee_id: i64,
        product_id: i64,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Default)]
pub struct OrderOutcome {
    pub orders: usize,
    pub skipped: Vec<SkippedOrder>,
    pub histories: usize,
    /// Store assigned to every migrated order.
    pub store_id: Option<i64>,
}

/// Resolve the shipper and consignee of a legacy order.
///
/// Sender is checked before receiver, mapping before role lookup. A NULL
/// customer id is unmapped. The product is checked last.
pub async fn resolve_order<T>(
    order: &OrderRecord,
    mapping: &KeyMapping,
    target: &mut T,
) -> Result<OrderResolution>
where
    T: TargetWriter + ?Sized,
{
    let Some(send_address) = order.send_cust_id.and_then(|id| mapping.address_for(id)) else {
        return Ok(OrderResolution::Skipped(SkipReason::UnmappedSender));
    };
    let Some(receive_address) = order
        .receive_cust_id
        .and_then(|id| mapping.address_for(id))
    else {
        return Ok(OrderResolution::Skipped(SkipReason::UnmappedReceiver));
    };

    let Some(shipper_id) = target.find_shipper_by_address(send_address).await? else {
        return Ok(OrderResolution::Skipped(SkipReason::NoShipper));
    };
    let Some(consignee_id) = target.find_consignee_by_address(receive_address).await? else {
        return Ok(OrderResolution::Skipped(SkipReason::NoConsignee));
    };
    let Some(product_id) = order.product_id else {
        return Ok(OrderResolution::Skipped(SkipReason::NoProduct));
    };

    Ok(OrderResolution::Resolved {
        shipper_id,
        consignee_id,
        product_id,
    })
}

/// Migrate orders, then flatten the order history.
pub async fn migrate_orders<S, T>(
    source: &S,
    target: &mut T,
    mapping: &KeyMapping,
    config: &MigrationConfig,
) -> Result<OrderOutcome>
where
    S: SourceReader + ?Sized,
    T: TargetWriter + ?Sized,
{
    let orders = source.orders().await?;
    info!(
        "Migrating {} orders against {} mapped customers",
        orders.len(),
        mapping.len()
    );
    if mapping.is_empty() && !orders.is_empty() {
        warn!("Customer mapping is empty; every order will be skipped");
    }

    let store_id = match target.find_default_store().await? {
        Some(id) => id,
        None => {
            warn!(
                "No default store found, using store id {}",
                config.fallback_store_id
            );
            config.fallback_store_id
        }
    };

    let mut outcome = OrderOutcome {
        store_id: Some(store_id),
        ..Default::default()
    };

    for order in &orders {
        match resolve_order(order, mapping, target).await? {
            OrderResolution::Resolved {
                shipper_id,
                consignee_id,
                product_id,
            } => {
                target
                    .insert_order(&NewOrder {
                        order_number: codes::order_number(order.order_id),
                        order_date: order.order_date.clone(),
                        shipper_id,
                        consignee_id,
                        product_id,
                        store_id,
                        order_status: config.order_status.clone(),
                    })
                    .await?;
                outcome.orders += 1;
                debug!(
                    "Order {} -> shipper {}, consignee {}",
                    order.order_id, shipper_id, consignee_id
                );
            }
            OrderResolution::Skipped(reason) => {
                warn!(
                    "Skipping order {} (sender {:?}, receiver {:?}): {}",
                    order.order_id, order.send_cust_id, order.receive_cust_id, reason
                );
                outcome.skipped.push(SkippedOrder {
                    order_id: order.order_id,
                    send_cust_id: order.send_cust_id,
                    receive_cust_id: order.receive_cust_id,
                    reason,
                });
            }
        }
    }

    let histories = source.order_histories().await?;
    for history in &histories {
        target
            .insert_order_history(&NewOrderHistory {
                order_id: history.order_id,
                status_change: config.history_status_change.clone(),
                new_status: config.history_new_status.clone(),
                changed_by: config.history_actor.clone(),
            })
            .await?;
        outcome.histories += 1;
    }

    info!(
        "Orders: {} migrated, {} skipped, {} history rows",
        outcome.orders,
        outcome.skipped.len(),
        outcome.histories
    );
    Ok(outcome)
}
