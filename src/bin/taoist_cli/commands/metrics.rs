// ABOUTME: Metric commands for taoist-cli
// ABOUTME: Record readings, store or show snapshots, and print statistics, trend, and anomaly verdicts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use chrono::NaiveDate;
use serde_json::json;
use taoist_fit::{
    errors::{AppError, AppResult},
    intelligence::AnomalyDetector,
    models::{ExtendedHealthMetrics, MetricKey, SampleSource},
    services::AnalyticsService,
};
use tracing::info;

use crate::helpers::output::{day_or_today, print_json};

/// Record one reading and print the stored sample with its anomaly verdict
pub async fn record(
    service: &AnalyticsService,
    metric: MetricKey,
    value: f64,
    source: SampleSource,
) -> AppResult<()> {
    let recorded = service.record_metric(metric, value, source).await?;
    info!(metric = %metric, value, "Recorded reading");
    print_json(&recorded)
}

/// Store the snapshot when `metrics` is given, otherwise print the stored one
pub async fn snapshot(
    service: &AnalyticsService,
    date: Option<NaiveDate>,
    metrics: Option<&str>,
) -> AppResult<()> {
    let date = day_or_today(date);

    if let Some(raw) = metrics {
        let metrics: ExtendedHealthMetrics = serde_json::from_str(raw)
            .map_err(|e| AppError::validation(format!("invalid metrics JSON: {e}")))?;
        let stored = service.record_snapshot(date, metrics).await?;
        return print_json(&stored);
    }

    let stored = service
        .store()
        .get_daily_snapshot(date)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Snapshot for {date}")))?;
    print_json(&stored)
}

/// Print window statistics; `null` when the window is empty
pub async fn stats(service: &AnalyticsService, metric: MetricKey, days: Option<u32>) -> AppResult<()> {
    let report = service.metric_report(metric, days).await?;
    print_json(&report.statistics)
}

/// Print the fitted trend; `null` with too little history
pub async fn trend(service: &AnalyticsService, metric: MetricKey, days: Option<u32>) -> AppResult<()> {
    let report = service.metric_report(metric, days).await?;
    print_json(&json!({
        "metricKey": metric,
        "windowDays": report.window_days,
        "trend": report.trend,
    }))
}

/// Classify `value` against the configured window without storing it
pub async fn anomaly(service: &AnalyticsService, metric: MetricKey, value: f64) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation("value must be a finite number"));
    }
    let stats = service
        .store()
        .statistics_for(metric, service.settings().stats_window_days)
        .await?;
    print_json(&AnomalyDetector::detect_anomaly(metric, value, stats.as_ref()))
}
