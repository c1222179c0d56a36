//! highlandirect-migrate CLI - legacy HighLandirect database to normalized SQLite.

use clap::Parser;
use highlandirect_migrate::{Config, MigrateError, MigrationResult, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "highlandirect-migrate")]
#[command(about = "Migrate the HighLandirect legacy database into the normalized SQLite schema")]
#[command(version)]
struct Cli {
    /// Legacy database file (SQLite export)
    source: PathBuf,

    /// Destination SQLite file; created along with its directory if missing
    destination: PathBuf,

    /// Path to YAML configuration file with migration overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// DDL script to apply instead of the built-in schema
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Compare source and destination row counts after migrating
    #[arg(long)]
    validate: bool,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    // Positional paths always win over the file
    config.source.path = cli.source;
    config.target.path = cli.destination;
    if let Some(schema) = cli.schema {
        config.target.schema_file = Some(schema);
    }

    let result = Orchestrator::connect(config)
        .await?
        .with_validation(cli.validate)
        .run()
        .await?;

    if cli.output_json {
        println!("{}", result.to_json()?);
    } else {
        print_summary(&result);
    }

    if let Some(validation) = &result.validation {
        if !validation.passed() {
            return Err(MigrateError::phase(
                "validation",
                format!(
                    "{} row count mismatches, {} foreign key violations",
                    validation.mismatches().count(),
                    validation.foreign_key_violations.len()
                ),
            ));
        }
    }

    Ok(())
}

fn print_summary(result: &MigrationResult) {
    let counts = &result.counts;
    println!("\nMigration {}!", result.status.replace('_', " "));
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    println!(
        "  Schema: {} statements applied, {} failed",
        result.schema.applied, result.schema.failed
    );
    println!(
        "  Addresses: {} (shippers {}, consignees {})",
        counts.addresses, counts.shippers, counts.consignees
    );
    println!("  Products: {}", counts.products);
    println!("  Stores: {}", counts.stores);
    println!(
        "  Orders: {} ({} skipped), history rows: {}",
        counts.orders,
        result.skipped_orders.len(),
        counts.order_histories
    );
    println!("  Report memos: {}", counts.report_memos);

    let failed = result.failed_phases();
    if !failed.is_empty() {
        println!("  Failed phases: {:?}", failed);
    }

    if let Some(validation) = &result.validation {
        println!(
            "  Validation: {}",
            if validation.passed() { "passed" } else { "FAILED" }
        );
        for check in validation.mismatches() {
            println!(
                "    {}: expected {}, found {}",
                check.table, check.expected, check.actual
            );
        }
    }
}

/// Logs go to stderr so `--output-json` keeps stdout clean.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
