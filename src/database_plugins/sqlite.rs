// ABOUTME: SQLite metric store implementation delegating to the Database operations
// ABOUTME: Thin trait surface over the table-level operations of the Database type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! `SQLite` metric store
//!
//! Wraps [`Database`] so the table-level `_impl` methods stay inherent and
//! the trait surface stays thin.

use super::MetricStore;
use crate::database::Database;
use crate::errors::AppResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use taoist_core::models::{
    Achievement, CultivationLevel, DailySnapshot, ExtendedHealthMetrics, MetricConfig, MetricKey,
    MetricSample, SampleSource,
};

/// `SQLite` metric store
#[derive(Clone)]
pub struct SqliteMetricStore {
    /// The underlying database instance
    inner: Database,
}

impl SqliteMetricStore {
    /// Store handle for `database_url`; call `initialize()` before use
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            inner: Database::new(database_url),
        }
    }

    /// Get a reference to the inner database for table-level operations
    #[must_use]
    pub const fn inner(&self) -> &Database {
        &self.inner
    }
}

#[async_trait]
impl MetricStore for SqliteMetricStore {
    async fn initialize(&self) -> AppResult<()> {
        self.inner.initialize().await
    }

    async fn put_sample(
        &self,
        metric_key: MetricKey,
        value: f64,
        source: SampleSource,
    ) -> AppResult<MetricSample> {
        self.inner.put_sample_impl(metric_key, value, source).await
    }

    async fn put_sample_at(&self, sample: &MetricSample) -> AppResult<bool> {
        self.inner.put_sample_at_impl(sample).await
    }

    async fn recent_samples(&self, metric_key: MetricKey, days: u32) -> AppResult<Vec<MetricSample>> {
        self.inner.recent_samples_impl(metric_key, days).await
    }

    async fn metric_history(
        &self,
        metric_key: MetricKey,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<Vec<MetricSample>> {
        self.inner
            .metric_history_impl(metric_key, start_date, end_date)
            .await
    }

    async fn all_samples(&self) -> AppResult<Vec<MetricSample>> {
        self.inner.all_samples_impl().await
    }

    async fn prune_older_than(&self, days: u32) -> AppResult<u64> {
        self.inner.prune_older_than_impl(days).await
    }

    async fn put_daily_snapshot(
        &self,
        date: NaiveDate,
        metrics: ExtendedHealthMetrics,
    ) -> AppResult<DailySnapshot> {
        self.inner.put_daily_snapshot_impl(date, metrics).await
    }

    async fn upsert_daily_snapshot(&self, snapshot: &DailySnapshot) -> AppResult<()> {
        self.inner.upsert_daily_snapshot_impl(snapshot).await
    }

    async fn get_daily_snapshot(&self, date: NaiveDate) -> AppResult<Option<DailySnapshot>> {
        self.inner.get_daily_snapshot_impl(date).await
    }

    async fn recent_daily_snapshots(&self, days: u32) -> AppResult<Vec<DailySnapshot>> {
        self.inner.recent_daily_snapshots_impl(days).await
    }

    async fn all_daily_snapshots(&self) -> AppResult<Vec<DailySnapshot>> {
        self.inner.all_daily_snapshots_impl().await
    }

    async fn save_metric_configs(&self, configs: &[MetricConfig]) -> AppResult<()> {
        self.inner.save_metric_configs_impl(configs).await
    }

    async fn metric_configs(&self) -> AppResult<Vec<MetricConfig>> {
        self.inner.metric_configs_impl().await
    }

    async fn save_achievements(&self, achievements: &[Achievement]) -> AppResult<()> {
        self.inner.save_achievements_impl(achievements).await
    }

    async fn achievements(&self) -> AppResult<Vec<Achievement>> {
        self.inner.achievements_impl().await
    }

    async fn save_cultivation_level(&self, level: &CultivationLevel) -> AppResult<()> {
        self.inner.save_cultivation_level_impl(level).await
    }

    async fn stored_cultivation_level(&self) -> AppResult<Option<CultivationLevel>> {
        self.inner.stored_cultivation_level_impl().await
    }

    async fn cultivation_level(&self) -> AppResult<CultivationLevel> {
        self.inner.cultivation_level_impl().await
    }
}
