//! CLI utility functions
//!
//! Shared by every command:
//! - loading and validating the config
//! - building the HTTP-backed service
//! - reading input files and reporting skipped rows
//! - wiring Ctrl-C and `--timeout` to operation cancellation

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::debug;

use super::GlobalArgs;
use crate::config::{Config, CONFIG_DIR, CONFIG_FILE};
use crate::core::monitor::CancelSignal;
use crate::core::record::{self, AnswerRecord};
use crate::core::service::{MutationReport, QnaService};
use crate::remote::HttpBackend;

/// Loaded config plus where it came from
pub struct Session {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub service: QnaService<HttpBackend>,
}

impl Session {
    /// Load config and build the service
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let config_path = Config::locate(global.config.as_deref());
        let config = Config::load(global.config.as_deref()).context("Failed to load config")?;
        config
            .validate()
            .context("Configuration incomplete; set the [service] section in .qna/config.toml")?;
        debug!(path = ?config_path, "config loaded");

        let backend = HttpBackend::from_config(&config.service)?;
        let service = QnaService::new(backend, config.service.runtime_endpoint())
            .with_kb_id(config.kb_id())
            .with_query_key(config.query_key())
            .with_monitor(config.operations.monitor())
            .reject_duplicate_answers(config.operations.reject_duplicate_answers)
            .with_cancel(cancel_signal(global.timeout));

        Ok(Self {
            config,
            config_path,
            service,
        })
    }

    /// Where `create --save` writes the new identity
    pub fn save_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| Path::new(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Parse an input file with the configured delimiter
    pub fn load_records(&self, file: &Path) -> Result<Vec<AnswerRecord>> {
        let delimiter = self.config.input.delimiter_byte()?;
        let outcome = record::load(file, delimiter)
            .with_context(|| format!("Failed to read {}", file.display()))?;

        for warning in &outcome.warnings {
            eprintln!("{} skipped {}", "!".yellow(), warning);
        }

        Ok(outcome.records)
    }
}

/// Cancellation fired by Ctrl-C or the `--timeout` deadline
fn cancel_signal(timeout: Option<u64>) -> CancelSignal {
    let (handle, signal) = CancelSignal::channel();

    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = deadline => {}
        }
        handle.cancel();
    });

    signal
}

/// Print the summary line of an add/update/delete
pub fn print_mutation(verb: &str, report: &MutationReport) {
    println!(
        "{} {}: {} added, {} updated, {} deleted",
        "✓".green(),
        verb,
        report.additions,
        report.updates,
        report.deletions
    );
    println!("  Operation: {}", report.operation.operation_id.dimmed());
}
