// ABOUTME: Metric store abstraction consumed by the analytics service, import/export, and CLI
// ABOUTME: Async trait over samples, snapshots, configs, achievements, and level, with SQLite backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! # Metric Store Abstraction
//!
//! The store is the only component that performs I/O. Every method fails
//! with `NotInitialized` until [`MetricStore::initialize`] has completed;
//! re-initializing is a no-op.

use crate::data_transfer::ExportDump;
use crate::errors::AppResult;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use taoist_core::constants::storage;
use taoist_core::models::{
    Achievement, CultivationLevel, DailySnapshot, ExtendedHealthMetrics, MetricConfig, MetricKey,
    MetricSample, SampleSource,
};
use taoist_intelligence::{compute_statistics, MetricStatistics};

/// `SQLite` implementation
pub mod sqlite;

pub use sqlite::SqliteMetricStore;

/// Persistence contract for metric samples and derived state
///
/// Implementations serialize writes to the same snapshot date; writes to
/// different keys may proceed concurrently.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Connect and migrate exactly once; concurrent callers share the result
    async fn initialize(&self) -> AppResult<()>;

    // ================================
    // Metric History
    // ================================

    /// Append a sample stamped now; never overwrites an existing sample
    async fn put_sample(
        &self,
        metric_key: MetricKey,
        value: f64,
        source: SampleSource,
    ) -> AppResult<MetricSample>;

    /// Insert a sample with its own timestamp; returns `false` for a duplicate
    async fn put_sample_at(&self, sample: &MetricSample) -> AppResult<bool>;

    /// Samples with `timestamp >= now - days`
    async fn recent_samples(&self, metric_key: MetricKey, days: u32) -> AppResult<Vec<MetricSample>>;

    /// History filtered by inclusive day bounds, newest first
    async fn metric_history(
        &self,
        metric_key: MetricKey,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<Vec<MetricSample>>;

    /// Every stored sample, oldest first
    async fn all_samples(&self) -> AppResult<Vec<MetricSample>>;

    /// Retention sweep; never removes samples newer than `now - days`
    async fn prune_older_than(&self, days: u32) -> AppResult<u64>;

    // ================================
    // Daily Snapshots
    // ================================

    /// Upsert the snapshot for `date`, stamped now
    async fn put_daily_snapshot(
        &self,
        date: NaiveDate,
        metrics: ExtendedHealthMetrics,
    ) -> AppResult<DailySnapshot>;

    /// Upsert a snapshot with an explicit write time
    async fn upsert_daily_snapshot(&self, snapshot: &DailySnapshot) -> AppResult<()>;

    /// Snapshot for `date`
    async fn get_daily_snapshot(&self, date: NaiveDate) -> AppResult<Option<DailySnapshot>>;

    /// Snapshots with `date >= day(now - days)`, ascending
    async fn recent_daily_snapshots(&self, days: u32) -> AppResult<Vec<DailySnapshot>>;

    /// Every stored snapshot, ascending
    async fn all_daily_snapshots(&self) -> AppResult<Vec<DailySnapshot>>;

    // ================================
    // Configuration and Progress
    // ================================

    /// Replace the stored metric configuration
    async fn save_metric_configs(&self, configs: &[MetricConfig]) -> AppResult<()>;

    /// Stored metric configuration, or the factory defaults
    async fn metric_configs(&self) -> AppResult<Vec<MetricConfig>>;

    /// Persist achievement progress by id
    async fn save_achievements(&self, achievements: &[Achievement]) -> AppResult<()>;

    /// Catalog merged with stored progress
    async fn achievements(&self) -> AppResult<Vec<Achievement>>;

    /// Persist the cultivation level
    async fn save_cultivation_level(&self, level: &CultivationLevel) -> AppResult<()>;

    /// Stored level, if one was ever saved
    async fn stored_cultivation_level(&self) -> AppResult<Option<CultivationLevel>>;

    /// Stored level, or the starting level
    async fn cultivation_level(&self) -> AppResult<CultivationLevel> {
        Ok(self.stored_cultivation_level().await?.unwrap_or_default())
    }

    // ================================
    // Derived Views
    // ================================

    /// Statistics over the window; `None` when the window holds no samples
    async fn statistics_for(
        &self,
        metric_key: MetricKey,
        days: u32,
    ) -> AppResult<Option<MetricStatistics>> {
        let samples = self.recent_samples(metric_key, days).await?;
        Ok(compute_statistics(metric_key, &samples, days))
    }

    /// Structured dump of every table
    async fn export_dump(&self) -> AppResult<ExportDump> {
        Ok(ExportDump {
            schema_version: storage::SCHEMA_VERSION,
            exported_at: Utc::now(),
            health_metrics: self.all_daily_snapshots().await?,
            metric_history: self.all_samples().await?,
            metric_configs: self.metric_configs().await?,
            achievements: self.achievements().await?,
            cultivation_level: self.stored_cultivation_level().await?,
        })
    }
}
