// ABOUTME: Integration tests for debounced persistence against the SQLite store
// ABOUTME: Snapshot bursts collapse to one write; shutdown and drop flush pending values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::create_test_store;
use std::sync::Arc;
use std::time::Duration;
use taoist_fit::config::PersistenceConfig;
use taoist_fit::database_plugins::MetricStore;
use taoist_fit::models::{
    default_metric_configs, CultivationLevel, CultivationStage, DailySnapshot,
    ExtendedHealthMetrics, MetricConfig, MetricKey,
};
use taoist_fit::persistence::DebouncedSaver;
use tokio::time::sleep;

fn snapshot(date: NaiveDate, timestamp: i64, calories: f64) -> DailySnapshot {
    let mut metrics = ExtendedHealthMetrics::default();
    metrics.set(MetricKey::Calories, calories);
    DailySnapshot {
        date,
        timestamp,
        metrics,
    }
}

#[tokio::test]
async fn test_snapshot_burst_persists_last_value() -> Result<()> {
    let store = create_test_store().await?;
    let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let saver: DebouncedSaver<DailySnapshot> =
        DebouncedSaver::spawn(Arc::clone(&store), Duration::from_millis(50), 3);

    for i in 1..=10 {
        saver.schedule(snapshot(date, i, 100.0 * i as f64))?;
    }
    // Quiet period has not elapsed yet
    assert!(store.get_daily_snapshot(date).await?.is_none());

    sleep(Duration::from_millis(300)).await;
    let stored = store.get_daily_snapshot(date).await?.unwrap();
    assert_eq!(stored, snapshot(date, 10, 1_000.0));

    saver.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_shutdown_flushes_level() -> Result<()> {
    let store = create_test_store().await?;
    let config = PersistenceConfig {
        debounce_ms: 60_000,
        max_retries: 1,
    };
    let saver: DebouncedSaver<CultivationLevel> =
        DebouncedSaver::from_config(Arc::clone(&store), &config);

    let level = CultivationLevel::new(CultivationStage::QiRefining, 3, 75.0, 300.0, "Disciple")?;
    saver.schedule(level.clone())?;
    saver.shutdown().await?;

    assert_eq!(store.cultivation_level().await?, level);
    Ok(())
}

#[tokio::test]
async fn test_flush_reports_validation_failure() -> Result<()> {
    let store = create_test_store().await?;
    let saver: DebouncedSaver<Vec<MetricConfig>> =
        DebouncedSaver::spawn(Arc::clone(&store), Duration::from_secs(60), 0);

    let mut configs = default_metric_configs();
    configs.push(configs[0].clone());
    saver.schedule(configs)?;
    assert!(saver.flush().await.is_err());

    let mut valid = default_metric_configs();
    valid[0].enabled = false;
    saver.schedule(valid.clone())?;
    saver.flush().await?;
    assert_eq!(store.metric_configs().await?, valid);

    saver.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_dropping_handle_writes_pending_value() -> Result<()> {
    let store = create_test_store().await?;
    let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();

    {
        let saver: DebouncedSaver<DailySnapshot> =
            DebouncedSaver::spawn(Arc::clone(&store), Duration::from_secs(60), 3);
        saver.schedule(snapshot(date, 5, 420.0))?;
    }

    // The worker notices the closed channel and writes on its own
    let mut stored = None;
    for _ in 0..50 {
        stored = store.get_daily_snapshot(date).await?;
        if stored.is_some() {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(stored, Some(snapshot(date, 5, 420.0)));
    Ok(())
}

#[tokio::test]
async fn test_saver_accepts_trait_object_store() -> Result<()> {
    let store: Arc<dyn MetricStore> = create_test_store().await?;
    let saver: DebouncedSaver<CultivationLevel> =
        DebouncedSaver::spawn(Arc::clone(&store), Duration::from_millis(10), 3);

    saver.schedule(CultivationLevel::default())?;
    saver.flush().await?;
    assert!(store.stored_cultivation_level().await?.is_some());
    saver.shutdown().await?;
    Ok(())
}
