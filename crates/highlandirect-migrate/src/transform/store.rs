//! Store (pickup point) migration. Every store is assigned the configured
//! carrier.

use tracing::info;

use super::{codes, flag_or_false, non_blank};
use crate::config::MigrationConfig;
use crate::error::Result;
use crate::source::{SourceReader, StoreRecord};
use crate::target::{NewStore, TargetWriter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOutcome {
    pub stores: usize,
    /// Stores flagged default in the legacy data.
    pub defaults: usize,
}

fn new_store(record: &StoreRecord, config: &MigrationConfig) -> NewStore {
    NewStore {
        store_code: codes::store_code(record.id, record.store_id1.as_deref()),
        store_name: non_blank(record.name.as_deref())
            .unwrap_or(config.default_store_name.as_str())
            .to_string(),
        carrier_code: config.carrier_code.clone(),
        carrier_name: config.carrier_name.clone(),
        is_default: flag_or_false(record.is_default),
    }
}

pub async fn migrate_stores<S, T>(
    source: &S,
    target: &mut T,
    config: &MigrationConfig,
) -> Result<StoreOutcome>
where
    S: SourceReader + ?Sized,
    T: TargetWriter + ?Sized,
{
    let stores = source.stores().await?;
    let mut outcome = StoreOutcome::default();
    for record in &stores {
        let store = new_store(record, config);
        if store.is_default {
            outcome.defaults += 1;
        }
        target.insert_store(&store).await?;
        outcome.stores += 1;
    }

    info!(
        "Stores: {} migrated ({} flagged default)",
        outcome.stores, outcome.defaults
    );
    Ok(outcome)
}
