// ABOUTME: Metric history operations: append-only samples keyed by (timestamp, metric key)
// ABOUTME: Window queries, date-range history, and the retention sweep
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::time::Instant;
use taoist_core::constants::time_constants::MS_PER_DAY;
use taoist_core::models::{MetricKey, MetricSample, SampleSource};
use tracing::debug;

const SAMPLE_COLUMNS: &str = "timestamp, metric_key, value, date, source";

fn sample_from_row(row: &SqliteRow) -> AppResult<MetricSample> {
    let metric_key: String = row
        .try_get("metric_key")
        .map_err(|e| AppError::storage(format!("Failed to read metric_key: {e}")))?;
    let source: String = row
        .try_get("source")
        .map_err(|e| AppError::storage(format!("Failed to read source: {e}")))?;

    Ok(MetricSample {
        metric_key: metric_key.parse::<MetricKey>()?,
        value: row
            .try_get("value")
            .map_err(|e| AppError::storage(format!("Failed to read value: {e}")))?,
        timestamp: row
            .try_get("timestamp")
            .map_err(|e| AppError::storage(format!("Failed to read timestamp: {e}")))?,
        date: row
            .try_get("date")
            .map_err(|e| AppError::storage(format!("Failed to read date: {e}")))?,
        source: source.parse::<SampleSource>()?,
    })
}

/// Millisecond cutoff `days` before `now_ms`
pub(crate) fn window_start(now_ms: i64, days: u32) -> i64 {
    now_ms - i64::from(days) * MS_PER_DAY
}

impl Database {
    /// Append a sample stamped with a fresh, strictly increasing timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not finite or the insert fails
    pub async fn put_sample_impl(
        &self,
        metric_key: MetricKey,
        value: f64,
        source: SampleSource,
    ) -> AppResult<MetricSample> {
        let pool = self.pool()?;
        let timestamp = self.next_sample_timestamp(Utc::now().timestamp_millis());
        let sample = MetricSample::new(metric_key, value, timestamp, source)?;

        sqlx::query(
            r"
            INSERT INTO metric_history (timestamp, metric_key, value, date, source)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(sample.timestamp)
        .bind(sample.metric_key.as_str())
        .bind(sample.value)
        .bind(sample.date)
        .bind(sample.source.as_str())
        .execute(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to store {metric_key} sample: {e}")))?;

        debug!(
            metric = %metric_key,
            value,
            timestamp,
            source = sample.source.as_str(),
            "Stored metric sample"
        );
        Ok(sample)
    }

    /// Insert a sample with an explicit timestamp; an existing
    /// `(timestamp, metric_key)` row is kept untouched
    ///
    /// Returns whether a row was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample is inconsistent or the insert fails
    pub async fn put_sample_at_impl(&self, sample: &MetricSample) -> AppResult<bool> {
        let pool = self.pool()?;
        // Re-derive the day so stored rows never disagree with their timestamp
        let checked = MetricSample::new(
            sample.metric_key,
            sample.value,
            sample.timestamp,
            sample.source,
        )?;
        if checked.date != sample.date {
            return Err(AppError::validation(format!(
                "sample date {} does not match timestamp {}",
                sample.date, sample.timestamp
            )));
        }

        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO metric_history (timestamp, metric_key, value, date, source)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(checked.timestamp)
        .bind(checked.metric_key.as_str())
        .bind(checked.value)
        .bind(checked.date)
        .bind(checked.source.as_str())
        .execute(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to store imported sample: {e}")))?;

        self.observe_sample_timestamp(checked.timestamp);
        Ok(result.rows_affected() == 1)
    }

    /// Samples of one metric with `timestamp >= now - days`, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn recent_samples_impl(
        &self,
        metric_key: MetricKey,
        days: u32,
    ) -> AppResult<Vec<MetricSample>> {
        let pool = self.pool()?;
        let cutoff = window_start(Utc::now().timestamp_millis(), days);

        let rows = sqlx::query(&format!(
            "SELECT {SAMPLE_COLUMNS} FROM metric_history
             WHERE metric_key = $1 AND timestamp >= $2
             ORDER BY timestamp ASC"
        ))
        .bind(metric_key.as_str())
        .bind(cutoff)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to load recent {metric_key} samples: {e}")))?;

        rows.iter().map(sample_from_row).collect()
    }

    /// Full history of one metric filtered by inclusive day bounds, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn metric_history_impl(
        &self,
        metric_key: MetricKey,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<Vec<MetricSample>> {
        let pool = self.pool()?;

        let rows = sqlx::query(&format!(
            "SELECT {SAMPLE_COLUMNS} FROM metric_history
             WHERE metric_key = $1
               AND ($2 IS NULL OR date >= $2)
               AND ($3 IS NULL OR date <= $3)
             ORDER BY timestamp DESC"
        ))
        .bind(metric_key.as_str())
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to load {metric_key} history: {e}")))?;

        rows.iter().map(sample_from_row).collect()
    }

    /// Every stored sample ordered by `(timestamp, metric_key)`
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn all_samples_impl(&self) -> AppResult<Vec<MetricSample>> {
        let pool = self.pool()?;

        let rows = sqlx::query(&format!(
            "SELECT {SAMPLE_COLUMNS} FROM metric_history ORDER BY timestamp ASC, metric_key ASC"
        ))
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to load metric history: {e}")))?;

        rows.iter().map(sample_from_row).collect()
    }

    /// Delete samples strictly older than `now - days`; returns the number removed
    ///
    /// A single `DELETE` bounded by the cutoff; samples written concurrently are
    /// newer than the cutoff and never match.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the delete fails
    pub async fn prune_older_than_impl(&self, days: u32) -> AppResult<u64> {
        let pool = self.pool()?;
        let started = Instant::now();
        let cutoff = window_start(Utc::now().timestamp_millis(), days);

        let removed = sqlx::query("DELETE FROM metric_history WHERE timestamp < $1")
            .bind(cutoff)
            .execute(pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to prune metric history: {e}")))?
            .rows_affected();

        AppLogger::log_database_operation(
            "prune",
            "metric_history",
            removed,
            started.elapsed().as_millis() as u64,
        );
        Ok(removed)
    }
}
