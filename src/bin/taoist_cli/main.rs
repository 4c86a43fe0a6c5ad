// ABOUTME: Taoist CLI - command-line front end for the cultivation health tracker
// ABOUTME: Records metrics, prints analytics as JSON, imports and exports data, prunes history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors
//!
//! Usage:
//! ```bash
//! # Record a heart-rate reading and see whether it is anomalous
//! taoist-cli record --metric heartRate --value 72
//!
//! # Statistics and trend over the last 14 days
//! taoist-cli stats --metric hrv --days 14
//! taoist-cli trend --metric hrv --days 14
//!
//! # Store today's snapshot and print its five-elements balance
//! taoist-cli snapshot --metrics '{"calories":1600, ...}'
//! taoist-cli elements
//!
//! # Re-evaluate achievements
//! taoist-cli achievements --refresh
//!
//! # Backup and restore
//! taoist-cli export --format json --output backup.json
//! taoist-cli import backup.json
//! ```

mod commands;
mod helpers;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use taoist_fit::{
    config::{AppConfig, DatabaseUrl},
    database_plugins::{MetricStore, SqliteMetricStore},
    errors::AppResult,
    logging::LoggingConfig,
    models::{MetricKey, SampleSource},
    services::AnalyticsService,
};
use tracing::debug;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "taoist-cli",
    about = "Taoist cultivation health tracker",
    long_about = "Record health metrics and inspect statistics, trends, anomalies, five-elements balance and achievements."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override (sqlite:<path> or sqlite::memory:)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

/// Export file format
#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Record one metric reading
    Record {
        /// Metric key (e.g. heartRate, hrv, stress)
        #[arg(long)]
        metric: MetricKey,

        /// Reading value
        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        /// Origin of the reading
        #[arg(long, default_value = "manual")]
        source: SampleSource,
    },

    /// Store or show the daily snapshot
    Snapshot {
        /// Day (YYYY-MM-DD, default today UTC)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Full metric vector as JSON; omit to print the stored snapshot
        #[arg(long)]
        metrics: Option<String>,
    },

    /// Descriptive statistics over a window
    Stats {
        /// Metric key
        #[arg(long)]
        metric: MetricKey,

        /// Window in days (default from configuration)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Linear trend over a window
    Trend {
        /// Metric key
        #[arg(long)]
        metric: MetricKey,

        /// Window in days (default from configuration)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Classify a value without recording it
    Anomaly {
        /// Metric key
        #[arg(long)]
        metric: MetricKey,

        /// Value to classify
        #[arg(long, allow_negative_numbers = true)]
        value: f64,
    },

    /// Five-elements balance of a stored snapshot
    Elements {
        /// Day (YYYY-MM-DD, default today UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Achievement progress
    Achievements {
        /// Re-evaluate against stored history before printing
        #[arg(long)]
        refresh: bool,
    },

    /// Import a JSON file
    Import {
        /// Path to the JSON payload
        path: String,
    },

    /// Export stored data
    Export {
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Limit CSV rows to the last N days
        #[arg(long)]
        days: Option<u32>,

        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<String>,
    },

    /// Delete samples older than the retention window
    Prune {
        /// Retention in days (default from configuration)
        #[arg(long)]
        days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::for_cli(cli.verbose).init()?;

    let mut config = AppConfig::from_env()?;
    if let Some(url) = &cli.database_url {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }
    debug!(config = %config.summary(), "Loaded configuration");

    let store = SqliteMetricStore::new(config.database.url.to_connection_string());
    store.initialize().await?;
    let store: Arc<dyn MetricStore> = Arc::new(store);
    let service = AnalyticsService::new(Arc::clone(&store), config.analytics);

    match cli.command {
        Command::Record {
            metric,
            value,
            source,
        } => commands::metrics::record(&service, metric, value, source).await?,
        Command::Snapshot { date, metrics } => {
            commands::metrics::snapshot(&service, date, metrics.as_deref()).await?;
        }
        Command::Stats { metric, days } => commands::metrics::stats(&service, metric, days).await?,
        Command::Trend { metric, days } => commands::metrics::trend(&service, metric, days).await?,
        Command::Anomaly { metric, value } => {
            commands::metrics::anomaly(&service, metric, value).await?;
        }
        Command::Elements { date } => commands::progress::elements(&service, date).await?,
        Command::Achievements { refresh } => {
            commands::progress::achievements(&service, refresh).await?;
        }
        Command::Import { path } => commands::transfer::import(store.as_ref(), &path).await?,
        Command::Export {
            format,
            days,
            output,
        } => {
            let csv = matches!(format, ExportFormat::Csv);
            commands::transfer::export(store.as_ref(), csv, days, output.as_deref()).await?;
        }
        Command::Prune { days } => commands::transfer::prune(&service, days).await?,
    }

    Ok(())
}
