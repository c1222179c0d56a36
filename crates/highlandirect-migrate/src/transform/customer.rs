//! Customer fan-out: one address per customer, plus shipper and consignee
//! roles depending on the customer's send/receive history.

use tracing::{debug, info};

use super::codes;
use crate::config::MigrationConfig;
use crate::error::Result;
use crate::mapping::KeyMapping;
use crate::source::{CustomerRecord, SourceReader};
use crate::target::{NewAddress, NewConsignee, NewShipper, TargetWriter};

/// Result of the customer phase.
#[derive(Debug, Clone, Default)]
pub struct CustomerOutcome {
    /// Legacy customer number → new address id, one entry per address.
    pub mapping: KeyMapping,
    pub addresses: usize,
    pub shippers: usize,
    pub consignees: usize,
}

impl From<&CustomerRecord> for NewAddress {
    fn from(c: &CustomerRecord) -> Self {
        NewAddress {
            furigana: c.furigana.clone(),
            name: c.name.clone(),
            keisho: c.keisho.clone(),
            city_name: c.city_name.clone(),
            postal_cd: c.postal_cd.clone(),
            prefecture_cd: c.prefecture_cd.clone(),
            prefecture_name: c.prefecture_name.clone(),
            region_cd: c.region_cd.clone(),
            region_name: c.region_name.clone(),
            address1: c.address1.clone(),
            address2: c.address2.clone(),
            address3: c.address3.clone(),
            address4: c.address4.clone(),
            phone: c.phone.clone(),
            fax: c.fax.clone(),
            phone2: c.phone2.clone(),
            mail_address: c.mail_address.clone(),
            memo: c.memo.clone(),
        }
    }
}

/// Migrate active customers into Address, Shipper and Consignee rows.
///
/// The returned mapping is only meaningful if the caller commits the
/// writes; on error the caller rolls back and must discard it.
pub async fn migrate_customers<S, T>(
    source: &S,
    target: &mut T,
    config: &MigrationConfig,
) -> Result<CustomerOutcome>
where
    S: SourceReader + ?Sized,
    T: TargetWriter + ?Sized,
{
    let customers = source.customers().await?;
    info!("Migrating {} active customers", customers.len());

    let mut outcome = CustomerOutcome::default();
    for customer in &customers {
        let address_id = target.insert_address(&NewAddress::from(customer)).await?;
        outcome.mapping.record(customer.cust_no, address_id);
        outcome.addresses += 1;

        if customer.is_sender() {
            target
                .insert_shipper(&NewShipper {
                    address_id,
                    shipper_code: codes::shipper_code(customer.cust_no),
                    shipper_type: config.shipper_type.clone(),
                })
                .await?;
            outcome.shippers += 1;
        }

        if customer.is_receiver() {
            target
                .insert_consignee(&NewConsignee {
                    address_id,
                    consignee_code: codes::consignee_code(customer.cust_no),
                })
                .await?;
            outcome.consignees += 1;
        }

        debug!(
            "Customer {} -> address {} (shipper: {}, consignee: {})",
            customer.cust_no,
            address_id,
            customer.is_sender(),
            customer.is_receiver()
        );
    }

    info!(
        "Customers: {} addresses, {} shippers, {} consignees",
        outcome.addresses, outcome.shippers, outcome.consignees
    );
    Ok(outcome)
}
