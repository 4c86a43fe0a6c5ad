// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, in-memory stores, and timestamped sample builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `taoist_fit`

use anyhow::Result;
use chrono::Utc;
use std::env;
use std::sync::{Arc, Once};
use taoist_fit::constants::time_constants::MS_PER_DAY;
use taoist_fit::database_plugins::{MetricStore, SqliteMetricStore};
use taoist_fit::models::{MetricKey, MetricSample, SampleSource};
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; default WARN keeps output quiet
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            Ok("WARN" | "ERROR") | _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Fresh initialized in-memory store
pub async fn create_test_store() -> Result<Arc<SqliteMetricStore>> {
    init_test_logging();
    let store = SqliteMetricStore::new("sqlite::memory:");
    store.initialize().await?;
    Ok(Arc::new(store))
}

/// Current time in epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Sample `days_ago` days before now, offset by `offset_ms` to keep keys unique
pub fn sample_days_ago(key: MetricKey, value: f64, days_ago: i64, offset_ms: i64) -> MetricSample {
    MetricSample::new(
        key,
        value,
        now_ms() - days_ago * MS_PER_DAY + offset_ms,
        SampleSource::Sensor,
    )
    .unwrap()
}

/// Store one sample per day, `values[0]` today and `values[i]` `i` days ago
pub async fn seed_daily<S: MetricStore + ?Sized>(
    store: &S,
    key: MetricKey,
    values: &[f64],
) -> Result<()> {
    for (days_ago, value) in values.iter().enumerate() {
        let sample = sample_days_ago(key, *value, days_ago as i64, -1_000);
        assert!(store.put_sample_at(&sample).await?);
    }
    Ok(())
}
