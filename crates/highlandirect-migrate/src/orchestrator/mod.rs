//! Migration orchestrator - main workflow coordinator.

mod phase;

pub use phase::MigrationPhase;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{MigrateError, Result};
use crate::mapping::KeyMapping;
use crate::schema::{apply_schema, SchemaReport, SchemaScript};
use crate::source::{SourceReader, SqliteSource};
use crate::target::{SqliteTarget, TargetTable, TargetWriter};
use crate::transform::{
    migrate_customers, migrate_orders, migrate_products, migrate_report_memos, migrate_stores,
    SkippedOrder,
};
use crate::verify::{validate, ValidationReport};

/// Migration orchestrator.
///
/// Runs the phases strictly in sequence on one reader and one writer.
/// Each entity phase is one destination transaction.
pub struct Orchestrator<S, T> {
    config: Config,
    source: S,
    target: T,
    phase: MigrationPhase,
    transitions: Vec<MigrationPhase>,
    validate: bool,
}

/// How an entity phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Committed,
    RolledBack,
}

/// Outcome of one entity phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    /// Entity family, e.g. "customers".
    pub name: String,
    pub status: PhaseStatus,
    /// Primary rows written (addresses for customers, orders for orders).
    pub rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Destination rows written by committed phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub addresses: usize,
    pub shippers: usize,
    pub consignees: usize,
    pub products: usize,
    pub stores: usize,
    pub orders: usize,
    pub order_histories: usize,
    pub report_memos: usize,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// SHA-256 of the effective configuration.
    pub config_hash: String,

    /// "completed", or "completed_with_errors" when a phase rolled back.
    pub status: String,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    pub schema: SchemaReport,

    /// Entity phases in execution order.
    pub phases: Vec<PhaseReport>,

    pub counts: EntityCounts,

    /// Orders left out because their customers could not be resolved.
    pub skipped_orders: Vec<SkippedOrder>,

    /// Customers present in the key mapping.
    pub mapped_customers: usize,

    /// State machine path taken by the run.
    pub transitions: Vec<MigrationPhase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

impl MigrationResult {
    /// Names of phases that were rolled back.
    pub fn failed_phases(&self) -> Vec<&str> {
        self.phases
            .iter()
            .filter(|p| p.status == PhaseStatus::RolledBack)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Everything the phases produce, gathered while the run progresses.
#[derive(Default)]
struct RunReport {
    schema: SchemaReport,
    phases: Vec<PhaseReport>,
    counts: EntityCounts,
    skipped_orders: Vec<SkippedOrder>,
    mapped_customers: usize,
    validation: Option<ValidationReport>,
}

impl Orchestrator<SqliteSource, SqliteTarget> {
    /// Validate the configuration and open both databases.
    ///
    /// A missing source file fails before the destination is touched.
    pub async fn connect(config: Config) -> Result<Self> {
        config.validate()?;

        let source = SqliteSource::open(&config.source.path).await?;
        let target = match SqliteTarget::open(&config.target).await {
            Ok(target) => target,
            Err(e) => {
                source.close().await;
                return Err(e);
            }
        };

        Ok(Self::new(source, target, config))
    }
}

impl<S, T> Orchestrator<S, T>
where
    S: SourceReader,
    T: TargetWriter,
{
    /// Wrap already-open connections.
    pub fn new(source: S, target: T, config: Config) -> Self {
        Self {
            config,
            source,
            target,
            phase: MigrationPhase::Connected,
            transitions: vec![MigrationPhase::NotStarted, MigrationPhase::Connected],
            validate: false,
        }
    }

    /// Run post-migration validation before closing the connections.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Current state.
    pub fn phase(&self) -> MigrationPhase {
        self.phase
    }

    fn advance(&mut self, to: MigrationPhase) {
        debug_assert!(
            self.phase.can_transition(to),
            "invalid transition {} -> {}",
            self.phase,
            to
        );
        info!("Migration state: {} -> {}", self.phase, to);
        self.phase = to;
        self.transitions.push(to);
    }

    /// Run the migration. Both connections are released whatever the outcome.
    pub async fn run(mut self) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let config_hash = self.config.hash();

        info!("Starting migration run: {}", run_id);

        let mut report = RunReport::default();
        let outcome = self.execute(&mut report).await;
        if outcome.is_err() {
            self.advance(MigrationPhase::Failed);
        }
        self.close().await;

        if let Err(e) = outcome {
            error!("Migration failed: {}", e);
            return Err(e);
        }

        let completed_at = Utc::now();
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let any_rolled_back = report
            .phases
            .iter()
            .any(|p| p.status == PhaseStatus::RolledBack);

        let result = MigrationResult {
            run_id,
            config_hash,
            status: if any_rolled_back {
                "completed_with_errors"
            } else {
                "completed"
            }
            .to_string(),
            started_at,
            completed_at,
            duration_seconds,
            schema: report.schema,
            phases: report.phases,
            counts: report.counts,
            skipped_orders: report.skipped_orders,
            mapped_customers: report.mapped_customers,
            transitions: self.transitions,
            validation: report.validation,
        };

        info!(
            "Migration {}: {} addresses, {} orders ({} skipped) in {:.1}s",
            result.status,
            result.counts.addresses,
            result.counts.orders,
            result.skipped_orders.len(),
            result.duration_seconds
        );

        Ok(result)
    }

    /// Schema, then every entity phase. Only fatal errors are returned.
    async fn execute(&mut self, report: &mut RunReport) -> Result<()> {
        let script = SchemaScript::load(self.config.target.schema_file.as_deref())?;
        report.schema = apply_schema(&mut self.target, &script).await;
        self.warn_if_not_empty().await?;
        self.advance(MigrationPhase::SchemaReady);

        let migration = self.config.migration.clone();

        // Customers: a failure leaves the mapping empty
        let result = match self.target.begin().await {
            Ok(()) => migrate_customers(&self.source, &mut self.target, &migration).await,
            Err(e) => Err(e),
        };
        let mapping = match self.finish_phase(result, report, |o| o.addresses).await? {
            Some(outcome) => {
                report.counts.addresses = outcome.addresses;
                report.counts.shippers = outcome.shippers;
                report.counts.consignees = outcome.consignees;
                outcome.mapping
            }
            None => KeyMapping::new(),
        };
        report.mapped_customers = mapping.len();
        self.advance(MigrationPhase::CustomersDone);

        let result = match self.target.begin().await {
            Ok(()) => migrate_products(&self.source, &mut self.target).await,
            Err(e) => Err(e),
        };
        if let Some(outcome) = self.finish_phase(result, report, |o| o.products).await? {
            report.counts.products = outcome.products;
        }
        self.advance(MigrationPhase::ProductsDone);

        let result = match self.target.begin().await {
            Ok(()) => migrate_stores(&self.source, &mut self.target, &migration).await,
            Err(e) => Err(e),
        };
        if let Some(outcome) = self.finish_phase(result, report, |o| o.stores).await? {
            report.counts.stores = outcome.stores;
        }
        self.advance(MigrationPhase::StoresDone);

        let result = match self.target.begin().await {
            Ok(()) => migrate_orders(&self.source, &mut self.target, &mapping, &migration).await,
            Err(e) => Err(e),
        };
        if let Some(outcome) = self.finish_phase(result, report, |o| o.orders).await? {
            report.counts.orders = outcome.orders;
            report.counts.order_histories = outcome.histories;
            report.skipped_orders = outcome.skipped;
        }
        self.advance(MigrationPhase::OrdersDone);

        let result = match self.target.begin().await {
            Ok(()) => migrate_report_memos(&self.source, &mut self.target).await,
            Err(e) => Err(e),
        };
        if let Some(outcome) = self.finish_phase(result, report, |o| o.memos).await? {
            report.counts.report_memos = outcome.memos;
        }
        self.advance(MigrationPhase::MemosDone);

        if self.validate {
            match validate(&self.source, &mut self.target, report.skipped_orders.len()).await {
                Ok(validation) => report.validation = Some(validation),
                Err(e) => warn!("Validation could not run: {}", e),
            }
        }

        self.advance(MigrationPhase::Complete);
        Ok(())
    }

    /// Commit a successful phase, or roll back and record a failed one.
    ///
    /// Returns `Ok(None)` for an absorbed phase failure. Fatal errors
    /// (such as a lost connection) are propagated.
    async fn finish_phase<O>(
        &mut self,
        result: Result<O>,
        report: &mut RunReport,
        rows: impl Fn(&O) -> usize,
    ) -> Result<Option<O>> {
        let name = self
            .phase
            .next()
            .and_then(MigrationPhase::entity)
            .unwrap_or("unknown")
            .to_string();

        let failure = match result {
            Ok(outcome) => match self.target.commit().await {
                Ok(()) => {
                    report.phases.push(PhaseReport {
                        name,
                        status: PhaseStatus::Committed,
                        rows: rows(&outcome),
                        error: None,
                    });
                    return Ok(Some(outcome));
                }
                Err(e) => e,
            },
            Err(e) => e,
        };

        if failure.is_fatal() {
            return Err(failure);
        }

        let failure = MigrateError::phase(&name, failure);
        error!("{}", failure);
        if let Err(e) = self.target.rollback().await {
            error!("Rollback of {} failed: {}", name, e);
        }
        report.phases.push(PhaseReport {
            name,
            status: PhaseStatus::RolledBack,
            rows: 0,
            error: Some(failure.to_string()),
        });
        Ok(None)
    }

    /// Reruns are meant to start from a fresh destination file.
    async fn warn_if_not_empty(&mut self) -> Result<()> {
        for table in [TargetTable::Address, TargetTable::Order] {
            let rows = match self.target.count_rows(table).await {
                Ok(rows) => rows,
                Err(e) if e.is_fatal() => return Err(e),
                // The table may be missing when a custom schema omits it
                Err(_) => continue,
            };
            if rows > 0 {
                warn!(
                    "Destination table {} already holds {} rows; migrated rows will be appended",
                    table.table_name(),
                    rows
                );
            }
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.source.close().await;
        if let Err(e) = self.target.close().await {
            warn!("Closing destination failed: {}", e);
        }
        info!("Connections closed");
    }
}
