//! Error types for the migration library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing paths, bad constants)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Legacy database file does not exist
    #[error("Source database not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Source or destination could not be opened
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Schema definition could not be read
    #[error("Schema file unavailable: {}: {message}", .path.display())]
    SchemaUnavailable { path: PathBuf, message: String },

    /// Reading or parsing a source row failed
    #[error("Source read failed ({context}): {message}")]
    Source { context: String, message: String },

    /// Destination statement failed
    #[error("Target database error: {0}")]
    Target(#[from] sqlx::Error),

    /// An entity phase failed as a whole
    #[error("Phase {phase} failed: {message}")]
    Phase { phase: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Connection error with context about which side failed
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Source error
    pub fn source(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Source {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a Phase error
    pub fn phase(phase: impl Into<String>, message: impl ToString) -> Self {
        MigrateError::Phase {
            phase: phase.into(),
            message: message.to_string(),
        }
    }

    /// Whether the orchestrator must stop the run on this error.
    ///
    /// Everything else is absorbed by the phase that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MigrateError::Config(_)
                | MigrateError::SourceNotFound(_)
                | MigrateError::Connection { .. }
                | MigrateError::SchemaUnavailable { .. }
        )
    }

    /// Process exit code for this error. The exit code is the only
    /// automatable signal, so every failure maps to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(MigrateError::SourceNotFound(PathBuf::from("x.sdf")).is_fatal());
        assert!(MigrateError::connection("refused", "opening destination").is_fatal());
        assert!(!MigrateError::phase("customers", "boom").is_fatal());
        assert!(!MigrateError::source("bad column", "reading Store").is_fatal());
    }

    #[test]
    fn test_format_detailed_includes_message() {
        let err = MigrateError::phase("orders", "FOREIGN KEY constraint failed");
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: Phase orders failed"));
        assert!(detailed.contains("FOREIGN KEY"));
        assert_eq!(err.exit_code(), 1);
    }
}
