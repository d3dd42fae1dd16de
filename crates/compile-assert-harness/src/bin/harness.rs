//! CLI entrypoint for the compile-assert fixture harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use compile_assert_core::config;
use compile_assert_core::LoggingMode;
use compile_assert_harness::{FixtureReport, FixtureRunner, FixtureSet};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Fixture tooling for compile-assert.
#[derive(Debug, Parser)]
#[command(name = "compile-assert-harness")]
#[command(about = "Verify recorded compilations against their expectations")]
struct Cli {
    /// Log filter directive (e.g. `info`, `compile_assert::filemanagers=debug`).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every fixture in a fixture file and report the outcomes.
    Verify {
        /// Fixture set JSON file.
        #[arg(long)]
        fixture: PathBuf,
        /// File-manager logging mode (`enabled`, `stacktraces`, `disabled`).
        /// Defaults to the `COMPILE_ASSERT_FILE_MANAGER_LOGGING` environment variable.
        #[arg(long)]
        logging: Option<String>,
        /// Output report path (JSON). Printed to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Verify {
            fixture,
            logging,
            output,
        } => {
            let mode = logging
                .as_deref()
                .map_or_else(config::logging_mode, LoggingMode::from_str_loose);
            tracing::info!(fixture = %fixture.display(), %mode, "verifying fixtures");

            let set = FixtureSet::from_file(&fixture)?;
            let outcomes = FixtureRunner::new(mode).run(&set)?;
            let report = FixtureReport::from_outcomes(mode.as_str(), outcomes);
            tracing::info!(
                total = report.total,
                passed = report.passed,
                failed = report.failed,
                "verification complete"
            );

            let json = report.to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    tracing::info!(report = %path.display(), "wrote report");
                }
                None => println!("{json}"),
            }

            if !report.all_passed() {
                return Err("fixture verification failed".into());
            }
        }
    }
    Ok(())
}
