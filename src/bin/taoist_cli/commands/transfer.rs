// ABOUTME: Data transfer commands for taoist-cli
// ABOUTME: JSON import, JSON or CSV export to stdout or a file, and the retention sweep
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use serde_json::json;
use taoist_fit::{
    data_transfer::{export_csv, export_json, import_payload},
    database_plugins::MetricStore,
    errors::{AppError, AppResult},
    services::AnalyticsService,
};
use tokio::fs;
use tracing::info;

use crate::helpers::output::print_json;

/// Import the JSON file at `path` and print the report
pub async fn import(store: &dyn MetricStore, path: &str) -> AppResult<()> {
    let payload = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::validation(format!("cannot read {path}: {e}")))?;
    let report = import_payload(store, &payload).await?;
    print_json(&report)
}

/// Render an export and write it to `output` or stdout
pub async fn export(
    store: &dyn MetricStore,
    csv: bool,
    days: Option<u32>,
    output: Option<&str>,
) -> AppResult<()> {
    let rendered = if csv {
        export_csv(store, days).await?
    } else {
        export_json(store).await?
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .await
                .map_err(|e| AppError::storage(format!("cannot write {path}: {e}")))?;
            info!(path, bytes = rendered.len(), "Export written");
            print_json(&json!({ "path": path, "bytes": rendered.len() }))
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Delete samples older than `days` (default from configuration)
pub async fn prune(service: &AnalyticsService, days: Option<u32>) -> AppResult<()> {
    let removed = match days {
        Some(days) => service.store().prune_older_than(days).await?,
        None => service.prune().await?,
    };
    print_json(&json!({
        "removed": removed,
        "retentionDays": days.unwrap_or(service.settings().retention_days),
    }))
}
