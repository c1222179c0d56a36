//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.source.path.as_os_str().is_empty() {
        return Err(MigrateError::Config("source.path is required".into()));
    }
    if config.target.path.as_os_str().is_empty() {
        return Err(MigrateError::Config("target.path is required".into()));
    }

    // Writing into the legacy file would destroy the only copy of the data
    if config.source.path == config.target.path {
        return Err(MigrateError::Config(
            "source and target cannot be the same file".into(),
        ));
    }

    let migration = &config.migration;
    if migration.fallback_store_id < 1 {
        return Err(MigrateError::Config(format!(
            "migration.fallback_store_id must be at least 1, got {}",
            migration.fallback_store_id
        )));
    }
    if migration.carrier_code.trim().is_empty() {
        return Err(MigrateError::Config(
            "migration.carrier_code must not be empty".into(),
        ));
    }
    if migration.carrier_name.trim().is_empty() {
        return Err(MigrateError::Config(
            "migration.carrier_name must not be empty".into(),
        ));
    }
    if migration.order_status.trim().is_empty() {
        return Err(MigrateError::Config(
            "migration.order_status must not be empty".into(),
        ));
    }

    Ok(())
}
