// ABOUTME: Main library entry point for the Taoist cultivation health tracker
// ABOUTME: Metric store, import/export, debounced persistence, and the analytics service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

#![deny(unsafe_code)]

//! # Taoist Fit
//!
//! Health metrics recorded as a cultivation journey: calories become Qi,
//! metric histories feed statistics, trends, anomaly checks and a
//! five-elements balance, and streaks unlock achievements.
//!
//! ## Architecture
//!
//! - **`taoist-core`**: error taxonomy, domain models, constants
//! - **`taoist-intelligence`**: pure analytics (no I/O, no shared state)
//! - **Database**: `SQLite` metric store behind the [`database_plugins::MetricStore`] trait
//! - **Data transfer**: JSON import, JSON and CSV export
//! - **Persistence**: debounced background writes for rapidly changing state
//! - **Services**: the analytics service composing store and analytics
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taoist_fit::config::AppConfig;
//! use taoist_fit::database_plugins::{MetricStore, SqliteMetricStore};
//! use taoist_fit::errors::AppResult;
//! use taoist_fit::models::{MetricKey, SampleSource};
//! use taoist_fit::services::AnalyticsService;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AppConfig::from_env()?;
//!     let store = SqliteMetricStore::new(config.database.url.to_connection_string());
//!     store.initialize().await?;
//!
//!     let service = AnalyticsService::new(Arc::new(store), config.analytics);
//!     let recorded = service
//!         .record_metric(MetricKey::HeartRate, 72.0, SampleSource::Manual)
//!         .await?;
//!     println!("anomaly: {}", recorded.anomaly.detected);
//!     Ok(())
//! }
//! ```

/// Environment configuration
pub mod config;

/// JSON import and JSON/CSV export
pub mod data_transfer;

/// `SQLite` schema, migrations, and table operations
pub mod database;

/// Metric store trait and its `SQLite` implementation
pub mod database_plugins;

/// Error types shared with the core crate
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Debounced background persistence
pub mod persistence;

/// Analytics service
pub mod services;

pub use taoist_core::{constants, models};
pub use taoist_intelligence as intelligence;
