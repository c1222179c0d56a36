//! Configuration type definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Legacy database (read-only).
    #[serde(default)]
    pub source: SourceConfig,

    /// Destination SQLite database.
    #[serde(default)]
    pub target: TargetConfig,

    /// Business constants applied while transforming rows.
    #[serde(default)]
    pub migration: MigrationConfig,
}

impl Config {
    /// Build a configuration for a source/destination pair with default constants.
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: SourceConfig {
                path: source.into(),
            },
            target: TargetConfig {
                path: target.into(),
                ..TargetConfig::default()
            },
            migration: MigrationConfig::default(),
        }
    }
}

/// Legacy database configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the legacy database file (SQLite export of the legacy store).
    #[serde(default)]
    pub path: PathBuf,
}

/// Destination database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Path of the SQLite file to create.
    #[serde(default)]
    pub path: PathBuf,

    /// DDL script to apply. The embedded schema is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_file: Option<PathBuf>,

    /// Enforce foreign keys on the destination connection (default: true).
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            schema_file: None,
            foreign_keys: true,
        }
    }
}

/// Fixed values written by the transformers.
///
/// Defaults reproduce the legacy system's own labels so the migrated data
/// reads the same in the new front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Carrier code stamped on every store (default: "YAMATO").
    #[serde(default = "default_carrier_code")]
    pub carrier_code: String,

    /// Carrier display name stamped on every store.
    #[serde(default = "default_carrier_name")]
    pub carrier_name: String,

    /// Store name used when the legacy row has none.
    #[serde(default = "default_store_name")]
    pub default_store_name: String,

    /// Store id given to orders when no store is flagged default (default: 1).
    #[serde(default = "default_fallback_store_id")]
    pub fallback_store_id: i64,

    /// Role label of shippers created from legacy customers.
    #[serde(default = "default_shipper_type")]
    pub shipper_type: String,

    /// Status of every migrated order (default: "completed").
    #[serde(default = "default_completed")]
    pub order_status: String,

    /// Status-change description of flattened history rows.
    #[serde(default = "default_history_status_change")]
    pub history_status_change: String,

    /// New status of flattened history rows (default: "completed").
    #[serde(default = "default_completed")]
    pub history_new_status: String,

    /// Actor recorded on flattened history rows (default: "migration").
    #[serde(default = "default_history_actor")]
    pub history_actor: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            carrier_code: default_carrier_code(),
            carrier_name: default_carrier_name(),
            default_store_name: default_store_name(),
            fallback_store_id: default_fallback_store_id(),
            shipper_type: default_shipper_type(),
            order_status: default_completed(),
            history_status_change: default_history_status_change(),
            history_new_status: default_completed(),
            history_actor: default_history_actor(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_carrier_code() -> String {
    "YAMATO".to_string()
}

fn default_carrier_name() -> String {
    "ヤマト運輸".to_string()
}

fn default_store_name() -> String {
    "集配所".to_string()
}

fn default_fallback_store_id() -> i64 {
    1
}

fn default_shipper_type() -> String {
    "既存荷主".to_string()
}

fn default_completed() -> String {
    "completed".to_string()
}

fn default_history_status_change() -> String {
    "履歴データ移行".to_string()
}

fn default_history_actor() -> String {
    "migration".to_string()
}
