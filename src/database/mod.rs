// ABOUTME: SQLite-backed metric store: connection lifecycle, schema migrations, write serialization
// ABOUTME: Table-specific operations live in the samples, snapshots, configs, achievements, level modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! # Database Management
//!
//! The metric store is the single durable owner of samples, daily snapshots,
//! metric configs, achievement progress, and the cultivation level. Analytics
//! only ever see clones handed out by these methods.
//!
//! Construction performs no I/O; [`Database::initialize`] connects and
//! migrates exactly once, and every other operation fails with
//! `NotInitialized` until it has completed.

mod achievements;
mod configs;
mod level;
mod samples;
mod snapshots;

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use dashmap::DashMap;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use taoist_core::constants::storage;
use tokio::fs;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

/// One schema step: target version and the additive statements that reach it
type Migration = (i64, &'static [&'static str]);

/// Ordered schema history. Steps only ever create tables and indexes.
const MIGRATIONS: &[Migration] = &[
    (
        1,
        &[
            r"
            CREATE TABLE IF NOT EXISTS health_metrics (
                date TEXT PRIMARY KEY,
                timestamp INTEGER NOT NULL,
                metrics TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_health_metrics_timestamp ON health_metrics(timestamp)",
            r"
            CREATE TABLE IF NOT EXISTS metric_configs (
                key TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                label TEXT NOT NULL,
                unit TEXT NOT NULL,
                display_name TEXT NOT NULL,
                enabled INTEGER NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS cultivation_level (
                slot TEXT PRIMARY KEY,
                stage TEXT NOT NULL,
                layer INTEGER NOT NULL,
                current_exp REAL NOT NULL,
                max_exp REAL NOT NULL,
                title TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            ",
        ],
    ),
    (
        2,
        &[
            r"
            CREATE TABLE IF NOT EXISTS metric_history (
                timestamp INTEGER NOT NULL,
                metric_key TEXT NOT NULL,
                value REAL NOT NULL,
                date TEXT NOT NULL,
                source TEXT NOT NULL,
                PRIMARY KEY (timestamp, metric_key)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_metric_history_key_ts ON metric_history(metric_key, timestamp)",
            "CREATE INDEX IF NOT EXISTS idx_metric_history_date ON metric_history(date)",
        ],
    ),
    (
        3,
        &[r"
            CREATE TABLE IF NOT EXISTS achievements (
                id TEXT PRIMARY KEY,
                unlocked INTEGER NOT NULL,
                unlocked_at INTEGER,
                progress REAL NOT NULL,
                current_value REAL NOT NULL
            )
            "],
    ),
];

/// Metric store backed by `SQLite`
#[derive(Clone)]
pub struct Database {
    url: String,
    pool: Arc<OnceCell<SqlitePool>>,
    snapshot_locks: Arc<DashMap<NaiveDate, Arc<Mutex<()>>>>,
    last_sample_ts: Arc<AtomicI64>,
}

impl Database {
    /// Create a store handle for `database_url`; nothing is opened yet
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            url: database_url.into(),
            pool: Arc::new(OnceCell::new()),
            snapshot_locks: Arc::new(DashMap::new()),
            last_sample_ts: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Connect and migrate. Concurrent and repeated calls share one initialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be created, or a migration fails
    pub async fn initialize(&self) -> AppResult<()> {
        self.pool
            .get_or_try_init(|| self.connect_and_migrate())
            .await?;
        Ok(())
    }

    /// Whether `initialize()` has completed
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Connection string this store was created with
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get a reference to the database pool for advanced operations
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before `initialize()` has completed
    pub fn pool(&self) -> AppResult<&SqlitePool> {
        self.pool.get().ok_or_else(AppError::not_initialized)
    }

    /// Stored schema version
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn schema_version(&self) -> AppResult<i64> {
        read_schema_version(self.pool()?).await
    }

    async fn connect_and_migrate(&self) -> AppResult<SqlitePool> {
        let started = Instant::now();
        DatabaseUrl::ensure_sqlite_scheme(self.url.trim())?;
        let in_memory = self.url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(&self.url)
            .map_err(|e| AppError::config(format!("Invalid database URL '{}': {e}", self.url)))?
            .create_if_missing(true);

        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).await.map_err(|e| {
                        AppError::storage(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        // Every connection to sqlite::memory: is a separate database
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::storage(format!("Failed to open database: {e}")))?;

        migrate(&pool).await?;

        let latest: Option<i64> = sqlx::query_scalar("SELECT MAX(timestamp) FROM metric_history")
            .fetch_one(&pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to read latest sample time: {e}")))?;
        self.last_sample_ts
            .fetch_max(latest.unwrap_or(0), Ordering::SeqCst);

        info!(
            url = %self.url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Metric store initialized"
        );
        Ok(pool)
    }

    /// Next sample timestamp: `max(now, previous + 1)`, never repeating within this store
    fn next_sample_timestamp(&self, now_ms: i64) -> i64 {
        let previous = match self.last_sample_ts.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |prev| Some(now_ms.max(prev + 1)),
        ) {
            Ok(prev) | Err(prev) => prev,
        };
        now_ms.max(previous + 1)
    }

    /// Keep the generated-timestamp floor above explicitly inserted samples
    fn observe_sample_timestamp(&self, timestamp: i64) {
        self.last_sample_ts.fetch_max(timestamp, Ordering::SeqCst);
    }

    /// Per-date lock serializing snapshot upserts
    fn snapshot_lock(&self, date: NaiveDate) -> Arc<Mutex<()>> {
        Arc::clone(self.snapshot_locks.entry(date).or_default().value())
    }

    /// Drop the map entry for `date` once no other writer holds or awaits it.
    /// `held` is the caller's handle, so an idle entry has exactly two owners.
    fn release_snapshot_lock(&self, date: NaiveDate, held: Arc<Mutex<()>>) {
        self.snapshot_locks
            .remove_if(&date, |_, lock| Arc::strong_count(lock) == 2);
        drop(held);
    }
}

async fn read_schema_version(pool: &SqlitePool) -> AppResult<i64> {
    let version: Option<i64> =
        sqlx::query_scalar("SELECT version FROM schema_version WHERE id = 1")
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to read schema version: {e}")))?;
    Ok(version.unwrap_or(0))
}

/// Apply every migration newer than the stored version, each in its own transaction
async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::storage(format!("Failed to create schema_version table: {e}")))?;

    let current = read_schema_version(pool).await?;
    if current > storage::SCHEMA_VERSION {
        return Err(AppError::storage(format!(
            "database schema version {current} is newer than supported version {}",
            storage::SCHEMA_VERSION
        )));
    }

    for (version, statements) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::storage(format!("Failed to begin migration {version}: {e}")))?;

        for statement in *statements {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::storage(format!("Migration {version} failed: {e}")))?;
        }

        sqlx::query(
            r"
            INSERT INTO schema_version (id, version) VALUES (1, $1)
            ON CONFLICT(id) DO UPDATE SET version = excluded.version
            ",
        )
        .bind(version)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::storage(format!("Failed to record schema version {version}: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::storage(format!("Failed to commit migration {version}: {e}")))?;

        info!(from = current, to = version, "Applied schema migration");
    }

    debug!(version = storage::SCHEMA_VERSION, "Schema up to date");
    Ok(())
}
