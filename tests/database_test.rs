// ABOUTME: Integration tests for the SQLite metric store
// ABOUTME: Initialization, samples, snapshots, configs, achievements, level, and retention
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use common::{create_test_store, init_test_logging, now_ms, sample_days_ago};
use std::sync::Arc;
use taoist_fit::constants::storage::SCHEMA_VERSION;
use taoist_fit::database_plugins::{MetricStore, SqliteMetricStore};
use taoist_fit::errors::ErrorCode;
use taoist_fit::intelligence::initialize_achievements;
use taoist_fit::models::{
    default_metric_configs, CultivationLevel, CultivationStage, DailySnapshot, Element,
    ExtendedHealthMetrics, MetricKey, MetricSample, SampleSource,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ================================
// Initialization
// ================================

#[tokio::test]
async fn test_operations_fail_before_initialize() {
    init_test_logging();
    let store = SqliteMetricStore::new("sqlite::memory:");

    let err = store
        .put_sample(MetricKey::HeartRate, 72.0, SampleSource::Manual)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotInitialized);

    let err = store.all_daily_snapshots().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotInitialized);
}

#[tokio::test]
async fn test_initialize_is_idempotent() -> Result<()> {
    let store = create_test_store().await?;
    store.initialize().await?;
    store.initialize().await?;

    assert!(store.inner().is_initialized());
    assert_eq!(store.inner().schema_version().await?, SCHEMA_VERSION);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_initialize_shares_one_pool() -> Result<()> {
    init_test_logging();
    let store = Arc::new(SqliteMetricStore::new("sqlite::memory:"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.initialize().await })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    // A single in-memory database: a write through one handle is visible to all
    store
        .put_sample(MetricKey::Steps, 100.0, SampleSource::Manual)
        .await?;
    assert_eq!(store.all_samples().await?.len(), 1);
    Ok(())
}

// ================================
// Metric History
// ================================

#[tokio::test]
async fn test_put_sample_timestamps_strictly_increase() -> Result<()> {
    let store = create_test_store().await?;

    let mut previous = i64::MIN;
    for i in 0..20 {
        let sample = store
            .put_sample(MetricKey::HeartRate, 70.0 + f64::from(i), SampleSource::Simulated)
            .await?;
        assert!(sample.timestamp > previous);
        previous = sample.timestamp;
    }

    let stored = store.recent_samples(MetricKey::HeartRate, 1).await?;
    assert_eq!(stored.len(), 20);
    Ok(())
}

#[tokio::test]
async fn test_put_sample_rejects_non_finite_values() -> Result<()> {
    let store = create_test_store().await?;

    let err = store
        .put_sample(MetricKey::Hrv, f64::NAN, SampleSource::Manual)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(store.all_samples().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_put_sample_at_never_overwrites() -> Result<()> {
    let store = create_test_store().await?;
    let original = sample_days_ago(MetricKey::Stress, 30.0, 1, 0);

    assert!(store.put_sample_at(&original).await?);

    let replacement = MetricSample {
        value: 99.0,
        ..original.clone()
    };
    assert!(!store.put_sample_at(&replacement).await?);

    let stored = store.all_samples().await?;
    assert_eq!(stored, vec![original]);
    Ok(())
}

#[tokio::test]
async fn test_put_sample_at_rejects_mismatched_date() -> Result<()> {
    let store = create_test_store().await?;
    let mut sample = sample_days_ago(MetricKey::Stress, 30.0, 1, 0);
    sample.date = sample.date - Duration::days(3);

    let err = store.put_sample_at(&sample).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
    Ok(())
}

#[tokio::test]
async fn test_put_sample_after_import_stays_monotonic() -> Result<()> {
    let store = create_test_store().await?;
    // An imported sample slightly in the future
    let future = MetricSample::new(
        MetricKey::Calories,
        500.0,
        now_ms() + 60_000,
        SampleSource::Imported,
    )?;
    store.put_sample_at(&future).await?;

    let fresh = store
        .put_sample(MetricKey::Calories, 510.0, SampleSource::Manual)
        .await?;
    assert!(fresh.timestamp > future.timestamp);
    Ok(())
}

#[tokio::test]
async fn test_recent_samples_window_and_order() -> Result<()> {
    let store = create_test_store().await?;
    for days_ago in [0, 2, 5, 9] {
        let sample = sample_days_ago(MetricKey::Hrv, 40.0 + days_ago as f64, days_ago, -1_000);
        store.put_sample_at(&sample).await?;
    }
    // Another metric never leaks into the window
    store
        .put_sample_at(&sample_days_ago(MetricKey::Stress, 20.0, 1, 0))
        .await?;

    let week = store.recent_samples(MetricKey::Hrv, 7).await?;
    let values: Vec<f64> = week.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![45.0, 42.0, 40.0]);
    assert!(week.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    Ok(())
}

#[tokio::test]
async fn test_metric_history_date_bounds_newest_first() -> Result<()> {
    let store = create_test_store().await?;
    // 2024-03-08 .. 2024-03-12 at noon UTC
    let noon_mar_8 = 1_709_899_200_000_i64;
    for i in 0..5_i64 {
        let sample = MetricSample::new(
            MetricKey::SleepHours,
            6.0 + i as f64 / 2.0,
            noon_mar_8 + i * 86_400_000,
            SampleSource::Manual,
        )?;
        store.put_sample_at(&sample).await?;
    }

    let bounded = store
        .metric_history(
            MetricKey::SleepHours,
            Some(day(2024, 3, 9)),
            Some(day(2024, 3, 11)),
        )
        .await?;
    let dates: Vec<NaiveDate> = bounded.iter().map(|s| s.date).collect();
    assert_eq!(
        dates,
        vec![day(2024, 3, 11), day(2024, 3, 10), day(2024, 3, 9)]
    );

    let open_start = store
        .metric_history(MetricKey::SleepHours, None, Some(day(2024, 3, 8)))
        .await?;
    assert_eq!(open_start.len(), 1);

    let unbounded = store.metric_history(MetricKey::SleepHours, None, None).await?;
    assert_eq!(unbounded.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_prune_keeps_samples_inside_window() -> Result<()> {
    let store = create_test_store().await?;
    for days_ago in [1, 10, 100, 200] {
        store
            .put_sample_at(&sample_days_ago(MetricKey::Steps, 5_000.0, days_ago, 0))
            .await?;
    }

    let removed = store.prune_older_than(90).await?;
    assert_eq!(removed, 2);

    let remaining = store.all_samples().await?;
    assert_eq!(remaining.len(), 2);
    let cutoff = now_ms() - 90 * 86_400_000;
    assert!(remaining.iter().all(|s| s.timestamp >= cutoff));

    // Second sweep has nothing left to do
    assert_eq!(store.prune_older_than(90).await?, 0);
    Ok(())
}

// ================================
// Daily Snapshots
// ================================

#[tokio::test]
async fn test_snapshot_upsert_last_writer_wins() -> Result<()> {
    let store = create_test_store().await?;
    let date = day(2024, 3, 10);

    let mut first = ExtendedHealthMetrics::default();
    first.set(MetricKey::Steps, 1_000.0);
    store.put_daily_snapshot(date, first).await?;

    let mut second = ExtendedHealthMetrics::default();
    second.set(MetricKey::Steps, 12_000.0);
    let written = store.put_daily_snapshot(date, second).await?;

    let stored = store.get_daily_snapshot(date).await?.unwrap();
    assert_eq!(stored, written);
    assert_eq!(stored.metrics, second);
    assert_eq!(store.all_daily_snapshots().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_same_date_upserts_leave_one_row() -> Result<()> {
    let store = create_test_store().await?;
    let date = day(2024, 3, 10);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut metrics = ExtendedHealthMetrics::default();
                metrics.set(MetricKey::Calories, 100.0 * f64::from(i));
                store
                    .upsert_daily_snapshot(&DailySnapshot {
                        date,
                        timestamp: i64::from(i),
                        metrics,
                    })
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    let all = store.all_daily_snapshots().await?;
    assert_eq!(all.len(), 1);
    // Whichever write landed last, its timestamp and metrics belong together
    let stored = &all[0];
    assert!((stored.metrics.calories - 100.0 * stored.timestamp as f64).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_rejects_non_finite_metrics() -> Result<()> {
    let store = create_test_store().await?;
    let mut metrics = ExtendedHealthMetrics::default();
    metrics.set(MetricKey::Temp, f64::INFINITY);

    let err = store
        .put_daily_snapshot(day(2024, 3, 10), metrics)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
    Ok(())
}

#[tokio::test]
async fn test_recent_daily_snapshots_ascending() -> Result<()> {
    let store = create_test_store().await?;
    let today = Utc::now().date_naive();
    for days_ago in [0_i64, 3, 6, 20] {
        store
            .put_daily_snapshot(
                today - Duration::days(days_ago),
                ExtendedHealthMetrics::default(),
            )
            .await?;
    }

    let recent = store.recent_daily_snapshots(7).await?;
    let dates: Vec<NaiveDate> = recent.iter().map(|s| s.date).collect();
    assert_eq!(
        dates,
        vec![
            today - Duration::days(6),
            today - Duration::days(3),
            today
        ]
    );
    Ok(())
}

// ================================
// Configuration and Progress
// ================================

#[tokio::test]
async fn test_metric_configs_default_then_saved() -> Result<()> {
    let store = create_test_store().await?;
    assert_eq!(store.metric_configs().await?, default_metric_configs());

    let mut configs = default_metric_configs();
    configs.reverse();
    configs[0].enabled = !configs[0].enabled;
    configs.truncate(6);
    store.save_metric_configs(&configs).await?;

    assert_eq!(store.metric_configs().await?, configs);
    Ok(())
}

#[tokio::test]
async fn test_metric_configs_validation() -> Result<()> {
    let store = create_test_store().await?;

    let mut wrong_element = default_metric_configs();
    wrong_element[0].element = Element::Water;
    let err = store.save_metric_configs(&wrong_element).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);

    let mut duplicated = default_metric_configs();
    duplicated.push(duplicated[0].clone());
    let err = store.save_metric_configs(&duplicated).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);

    // Rejected saves leave the defaults in place
    assert_eq!(store.metric_configs().await?, default_metric_configs());
    Ok(())
}

#[tokio::test]
async fn test_achievements_merge_and_never_relock() -> Result<()> {
    let store = create_test_store().await?;
    assert_eq!(store.achievements().await?, initialize_achievements());

    let mut achievements = initialize_achievements();
    achievements[0].unlocked = true;
    achievements[0].unlocked_at = Some(1_000);
    achievements[0].progress = 100.0;
    achievements[0].current_value = 3.0;
    achievements[1].progress = 42.0;
    store.save_achievements(&achievements).await?;

    // A stale write must not re-lock or move the unlock time
    let mut stale = initialize_achievements();
    stale[0].unlocked_at = Some(9_999);
    stale[0].progress = 33.0;
    store.save_achievements(&stale).await?;

    let stored = store.achievements().await?;
    assert!(stored[0].unlocked);
    assert_eq!(stored[0].unlocked_at, Some(1_000));
    assert!((stored[0].progress - 33.0).abs() < f64::EPSILON);
    assert!(!stored[1].unlocked);
    assert_eq!(stored.len(), initialize_achievements().len());
    Ok(())
}

#[tokio::test]
async fn test_cultivation_level_roundtrip() -> Result<()> {
    let store = create_test_store().await?;
    assert!(store.stored_cultivation_level().await?.is_none());
    assert_eq!(store.cultivation_level().await?, CultivationLevel::default());

    let level = CultivationLevel::new(CultivationStage::GoldenCore, 4, 120.5, 900.0, "Core Elder")?;
    store.save_cultivation_level(&level).await?;
    assert_eq!(store.cultivation_level().await?, level);

    let broken = CultivationLevel {
        current_exp: 1_000.0,
        ..level.clone()
    };
    let err = store.save_cultivation_level(&broken).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(store.cultivation_level().await?, level);
    Ok(())
}

#[tokio::test]
async fn test_statistics_for_window() -> Result<()> {
    let store = create_test_store().await?;
    assert!(store.statistics_for(MetricKey::HeartRate, 7).await?.is_none());

    for (i, value) in [60.0, 70.0, 80.0].into_iter().enumerate() {
        store
            .put_sample_at(&sample_days_ago(MetricKey::HeartRate, value, 1, i as i64))
            .await?;
    }
    let stats = store.statistics_for(MetricKey::HeartRate, 7).await?.unwrap();
    assert_eq!(stats.count, 3);
    assert!((stats.mean - 70.0).abs() < 1e-9);
    assert!((stats.latest - 80.0).abs() < f64::EPSILON);
    Ok(())
}
