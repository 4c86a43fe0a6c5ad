// ABOUTME: Analytics service composing the metric store with the pure cultivation analytics
// ABOUTME: Recording with anomaly checks, metric reports, five-elements, achievements, and retention
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use crate::config::AnalyticsConfig;
use crate::database_plugins::MetricStore;
use crate::errors::AppResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use taoist_core::models::{
    CultivationLevel, DailySnapshot, ExtendedHealthMetrics, MetricKey, MetricSample, SampleSource,
};
use taoist_intelligence::achievements::streaks::count_recorded_days;
use taoist_intelligence::{
    achievement_stats, check_all_achievements, compute_insight, compute_statistics, AchievementCheck,
    AchievementInputs, AchievementStats, AnomalyAlert, AnomalyDetector, BreakthroughPredictor,
    FiveElementsInsight, MetricStatistics, TrendAnalysis, TrendAnalyzer, TrendPoint,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A stored sample with the anomaly verdict for its value
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMetric {
    /// The stored sample
    pub sample: MetricSample,
    /// Verdict against the window as it stood before this sample
    pub anomaly: AnomalyAlert,
}

/// Derived views of one metric over a window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReport {
    /// Metric
    pub metric_key: MetricKey,
    /// Window length in days
    pub window_days: u32,
    /// `None` when the window holds no samples
    pub statistics: Option<MetricStatistics>,
    /// `None` with fewer than five samples
    pub trend: Option<TrendAnalysis>,
    /// Verdict for the latest sample, if any
    pub anomaly: Option<AnomalyAlert>,
}

/// Store-backed analytics for one user
pub struct AnalyticsService {
    store: Arc<dyn MetricStore>,
    settings: AnalyticsConfig,
    predictor: Mutex<BreakthroughPredictor>,
}

impl AnalyticsService {
    /// Service over an initialized store
    #[must_use]
    pub fn new(store: Arc<dyn MetricStore>, settings: AnalyticsConfig) -> Self {
        Self {
            store,
            settings,
            predictor: Mutex::new(BreakthroughPredictor::new()),
        }
    }

    /// The underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn MetricStore> {
        &self.store
    }

    /// Window settings
    #[must_use]
    pub const fn settings(&self) -> &AnalyticsConfig {
        &self.settings
    }

    /// Store a reading and classify it against the recent window
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-finite value or a storage error
    pub async fn record_metric(
        &self,
        metric_key: MetricKey,
        value: f64,
        source: SampleSource,
    ) -> AppResult<RecordedMetric> {
        let stats = self
            .store
            .statistics_for(metric_key, self.settings.stats_window_days)
            .await?;
        let sample = self.store.put_sample(metric_key, value, source).await?;
        let anomaly = AnomalyDetector::detect_anomaly(metric_key, value, stats.as_ref());

        if anomaly.detected {
            info!(
                metric = %metric_key,
                value,
                severity = ?anomaly.severity,
                method = ?anomaly.method,
                "Anomalous reading recorded"
            );
        }
        Ok(RecordedMetric { sample, anomaly })
    }

    /// Upsert the snapshot for `date`
    ///
    /// # Errors
    ///
    /// Returns a validation error for non-finite metrics or a storage error
    pub async fn record_snapshot(
        &self,
        date: NaiveDate,
        metrics: ExtendedHealthMetrics,
    ) -> AppResult<DailySnapshot> {
        self.store.put_daily_snapshot(date, metrics).await
    }

    /// Statistics, trend, and latest-value anomaly for one metric
    ///
    /// `window_days` defaults to the configured statistics window.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the store fails
    pub async fn metric_report(
        &self,
        metric_key: MetricKey,
        window_days: Option<u32>,
    ) -> AppResult<MetricReport> {
        let window_days = window_days.unwrap_or(self.settings.stats_window_days);
        let samples = self.store.recent_samples(metric_key, window_days).await?;

        let statistics = compute_statistics(metric_key, &samples, window_days);
        let points: Vec<TrendPoint> = samples.iter().map(TrendPoint::from).collect();
        let trend = TrendAnalyzer::analyze_trend(&points);
        let anomaly = samples.last().map(|latest| {
            AnomalyDetector::detect_anomaly(metric_key, latest.value, statistics.as_ref())
        });

        debug!(
            metric = %metric_key,
            window_days,
            samples = samples.len(),
            "Built metric report"
        );
        Ok(MetricReport {
            metric_key,
            window_days,
            statistics,
            trend,
            anomaly,
        })
    }

    /// Balance of `metrics` under the stored metric configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read
    pub async fn five_elements(
        &self,
        metrics: &ExtendedHealthMetrics,
    ) -> AppResult<FiveElementsInsight> {
        let configs = self.store.metric_configs().await?;
        Ok(compute_insight(metrics, &configs))
    }

    /// Re-evaluate every achievement and persist the result
    ///
    /// Histories span the configured achievement window. The login streak is
    /// the trailing run of days that have any heart-rate sample.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the store fails
    pub async fn refresh_achievements(
        &self,
        level: &CultivationLevel,
        five_elements_score: f64,
        now_ms: i64,
    ) -> AppResult<AchievementCheck> {
        let days = self.settings.achievement_window_days;
        let heart_history = self.store.recent_samples(MetricKey::HeartRate, days).await?;
        let stress_history = self.store.recent_samples(MetricKey::Stress, days).await?;
        let energy_history = self.store.recent_samples(MetricKey::BodyBattery, days).await?;
        let current = self.store.achievements().await?;

        let inputs = AchievementInputs {
            consecutive_days: count_recorded_days(&heart_history),
            heart_history: &heart_history,
            stress_history: &stress_history,
            energy_history: &energy_history,
            five_elements_score,
            level,
        };
        let check = check_all_achievements(&current, &inputs, now_ms);
        self.store.save_achievements(&check.achievements).await?;

        debug!(
            new_unlocks = check.new_unlocks.len(),
            consecutive_days = inputs.consecutive_days,
            "Refreshed achievements"
        );
        Ok(check)
    }

    /// Unlock summary over the stored achievements
    ///
    /// # Errors
    ///
    /// Returns an error if reading the store fails
    pub async fn achievement_summary(&self) -> AppResult<AchievementStats> {
        Ok(achievement_stats(&self.store.achievements().await?))
    }

    /// Retention sweep over the configured window; returns rows removed
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn prune(&self) -> AppResult<u64> {
        self.store
            .prune_older_than(self.settings.retention_days)
            .await
    }

    /// Record cumulative Qi for breakthrough prediction
    pub async fn track_qi(&self, time_ms: i64, cumulative: f64) {
        self.predictor.lock().await.track(time_ms, cumulative);
    }

    /// Predicted minutes until `level` breaks through; `None` without a positive rate
    pub async fn minutes_to_breakthrough(&self, level: &CultivationLevel) -> Option<u64> {
        self.predictor.lock().await.predict_minutes(level)
    }
}
