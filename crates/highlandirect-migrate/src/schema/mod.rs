//! Destination schema initialization.
//!
//! The schema script is applied one statement at a time on a best-effort
//! basis: a statement that fails (typically because the object already
//! exists) is logged and skipped. Only an unreadable script is fatal.

mod split;

pub use split::split_statements;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{MigrateError, Result};
use crate::target::TargetWriter;

/// Schema shipped with the library.
const EMBEDDED_SCHEMA: &str = include_str!("../../sql/schema.sql");

/// A DDL script and where it came from.
#[derive(Debug, Clone)]
pub struct SchemaScript {
    /// File the script was read from; `None` for the embedded schema.
    pub path: Option<PathBuf>,
    pub sql: String,
}

impl SchemaScript {
    /// The built-in destination schema.
    pub fn embedded() -> Self {
        Self {
            path: None,
            sql: EMBEDDED_SCHEMA.to_string(),
        }
    }

    /// Read the script at `path`, or fall back to the embedded schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::embedded());
        };

        let sql = std::fs::read_to_string(path).map_err(|e| MigrateError::SchemaUnavailable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            sql,
        })
    }

    /// Display name for logs.
    pub fn origin(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "embedded schema".to_string(),
        }
    }

    /// Individual statements, terminators removed.
    pub fn statements(&self) -> Vec<String> {
        split_statements(&self.sql)
    }
}

/// Outcome of applying a schema script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    /// Statements that executed.
    pub applied: usize,
    /// Statements that failed and were skipped.
    pub failed: usize,
    /// One message per failed statement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// First non-comment line of a statement, for log output.
fn summarize(statement: &str) -> &str {
    statement
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("--"))
        .unwrap_or(statement)
}

/// Apply every statement of `script`, continuing past failures.
pub async fn apply_schema<T>(target: &mut T, script: &SchemaScript) -> SchemaReport
where
    T: TargetWriter + ?Sized,
{
    let statements = script.statements();
    info!(
        "Applying {} schema statements from {}",
        statements.len(),
        script.origin()
    );

    let mut report = SchemaReport::default();
    for statement in &statements {
        match target.execute_ddl(statement).await {
            Ok(()) => {
                debug!("Schema: {}", summarize(statement));
                report.applied += 1;
            }
            Err(e) => {
                warn!("Schema statement failed: {}\n  SQL: {}", e, summarize(statement));
                report.failed += 1;
                report
                    .errors
                    .push(format!("{}: {}", summarize(statement), e));
            }
        }
    }

    info!(
        "Schema ready: {} applied, {} failed",
        report.applied, report.failed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{SqliteTarget, TargetTable};

    #[test]
    fn test_embedded_schema_statements() {
        let statements = SchemaScript::embedded().statements();
        // 9 tables, 5 indexes, 2 triggers
        assert_eq!(statements.len(), 16);
        assert!(statements
            .iter()
            .any(|s| s.starts_with("CREATE TRIGGER IF NOT EXISTS trg_address_updated")
                && s.ends_with("END")));
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.sql");
        let err = SchemaScript::load(Some(&path)).unwrap_err();
        assert!(matches!(err, MigrateError::SchemaUnavailable { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_none_is_embedded() {
        let script = SchemaScript::load(None).unwrap();
        assert!(script.path.is_none());
        assert_eq!(script.origin(), "embedded schema");
    }

    #[tokio::test]
    async fn test_apply_twice_is_idempotent() {
        let mut target = SqliteTarget::in_memory().await.unwrap();
        let script = SchemaScript::embedded();

        let first = apply_schema(&mut target, &script).await;
        assert_eq!(first.failed, 0);
        let second = apply_schema(&mut target, &script).await;
        assert_eq!(second.failed, 0);
        assert_eq!(second.applied, first.applied);

        for table in TargetTable::ALL {
            assert_eq!(target.count_rows(table).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_failing_statement_does_not_stop_the_rest() {
        let mut target = SqliteTarget::in_memory().await.unwrap();
        let script = SchemaScript {
            path: None,
            sql: "CREATE TABLE a (id INTEGER);\n\
                  CREATE TABLE a (id INTEGER);\n\
                  CREATE TABLE b (note TEXT DEFAULT 'x;y');"
                .to_string(),
        };

        let report = apply_schema(&mut target, &script).await;
        assert_eq!(report.applied, 2);
        assert_eq!(report.failed, 1);
        assert!(report.errors[0].contains("CREATE TABLE a"));
    }
}
