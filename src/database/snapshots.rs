// ABOUTME: Daily snapshot operations: one metric vector per calendar day, upserted by date
// ABOUTME: Same-date writes are serialized through a per-date async lock so the last writer wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use super::samples::window_start;
use super::Database;
use crate::errors::{AppError, AppResult};
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use taoist_core::models::{day_of, DailySnapshot, ExtendedHealthMetrics};
use tracing::debug;

fn snapshot_from_row(row: &SqliteRow) -> AppResult<DailySnapshot> {
    let metrics: String = row
        .try_get("metrics")
        .map_err(|e| AppError::storage(format!("Failed to read snapshot metrics: {e}")))?;

    Ok(DailySnapshot {
        date: row
            .try_get("date")
            .map_err(|e| AppError::storage(format!("Failed to read snapshot date: {e}")))?,
        timestamp: row
            .try_get("timestamp")
            .map_err(|e| AppError::storage(format!("Failed to read snapshot timestamp: {e}")))?,
        metrics: serde_json::from_str::<ExtendedHealthMetrics>(&metrics)?,
    })
}

impl Database {
    /// Upsert a snapshot with an explicit write time
    ///
    /// # Errors
    ///
    /// Returns an error if a metric is not finite or the write fails
    pub async fn upsert_daily_snapshot_impl(&self, snapshot: &DailySnapshot) -> AppResult<()> {
        let pool = self.pool()?;
        snapshot.metrics.validate()?;
        let metrics = serde_json::to_string(&snapshot.metrics)?;

        let lock = self.snapshot_lock(snapshot.date);
        let guard = lock.lock().await;

        let written = sqlx::query(
            r"
            INSERT INTO health_metrics (date, timestamp, metrics)
            VALUES ($1, $2, $3)
            ON CONFLICT(date) DO UPDATE SET
                timestamp = excluded.timestamp,
                metrics = excluded.metrics
            ",
        )
        .bind(snapshot.date)
        .bind(snapshot.timestamp)
        .bind(&metrics)
        .execute(pool)
        .await;

        drop(guard);
        self.release_snapshot_lock(snapshot.date, lock);
        written.map_err(|e| {
            AppError::storage(format!("Failed to store snapshot for {}: {e}", snapshot.date))
        })?;

        debug!(date = %snapshot.date, "Stored daily snapshot");
        Ok(())
    }

    /// Upsert the snapshot for `date`, stamped now
    ///
    /// # Errors
    ///
    /// Returns an error if a metric is not finite or the write fails
    pub async fn put_daily_snapshot_impl(
        &self,
        date: NaiveDate,
        metrics: ExtendedHealthMetrics,
    ) -> AppResult<DailySnapshot> {
        let snapshot = DailySnapshot {
            date,
            timestamp: Utc::now().timestamp_millis(),
            metrics,
        };
        self.upsert_daily_snapshot_impl(&snapshot).await?;
        Ok(snapshot)
    }

    /// Snapshot stored for `date`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn get_daily_snapshot_impl(&self, date: NaiveDate) -> AppResult<Option<DailySnapshot>> {
        let pool = self.pool()?;

        let row = sqlx::query("SELECT date, timestamp, metrics FROM health_metrics WHERE date = $1")
            .bind(date)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to load snapshot for {date}: {e}")))?;

        row.as_ref().map(snapshot_from_row).transpose()
    }

    /// Snapshots whose date is on or after the day `days` ago, ascending by date
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn recent_daily_snapshots_impl(&self, days: u32) -> AppResult<Vec<DailySnapshot>> {
        let pool = self.pool()?;
        let cutoff = day_of(window_start(Utc::now().timestamp_millis(), days))
            .ok_or_else(|| AppError::validation(format!("window of {days} days is out of range")))?;

        let rows = sqlx::query(
            "SELECT date, timestamp, metrics FROM health_metrics WHERE date >= $1 ORDER BY date ASC",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to load recent snapshots: {e}")))?;

        rows.iter().map(snapshot_from_row).collect()
    }

    /// Every stored snapshot, ascending by date
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn all_daily_snapshots_impl(&self) -> AppResult<Vec<DailySnapshot>> {
        let pool = self.pool()?;

        let rows = sqlx::query("SELECT date, timestamp, metrics FROM health_metrics ORDER BY date ASC")
            .fetch_all(pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to load snapshots: {e}")))?;

        rows.iter().map(snapshot_from_row).collect()
    }
}
