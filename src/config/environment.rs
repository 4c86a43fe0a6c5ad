// ABOUTME: Environment-based configuration for database location, analytics windows, and auto-save
// ABOUTME: Parses and validates environment variables into typed settings with safe defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! Environment-based configuration management

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use taoist_core::constants::{defaults, env_config, storage};
use tracing::info;

const RETENTION_DAYS_RANGE: RangeInclusive<u32> = 1..=3650;
const WINDOW_DAYS_RANGE: RangeInclusive<u32> = 1..=365;
const DEBOUNCE_MS_RANGE: RangeInclusive<u64> = 100..=60_000;

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a testing environment
    #[must_use]
    pub const fn is_testing(&self) -> bool {
        matches!(self, Self::Testing)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Database file path
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns a config error for non-SQLite URLs or an empty path
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let trimmed = s.trim();
        Self::ensure_sqlite_scheme(trimmed)?;

        let path_str = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);

        match path_str {
            "" => Err(AppError::config("database URL has an empty path")),
            ":memory:" => Ok(Self::Memory),
            path => Ok(Self::SQLite {
                path: PathBuf::from(path),
            }),
        }
    }

    /// Reject URLs that carry a scheme other than `sqlite:`
    ///
    /// sqlx treats anything without the `sqlite:` prefix as a file name, so
    /// `mysql://host/db` would otherwise become a relative path.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the unsupported URL
    pub fn ensure_sqlite_scheme(url: &str) -> AppResult<()> {
        if url.contains("://") && !url.starts_with("sqlite:") {
            return Err(AppError::config(format!(
                "unsupported database URL '{url}': only sqlite is available"
            )));
        }
        Ok(())
    }

    /// Convert to a connection string understood by sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::SQLite {
            path: base
                .join(defaults::DATA_DIR_NAME)
                .join(defaults::DATABASE_FILE),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Where the metric store lives
    pub url: DatabaseUrl,
}

/// Windows used by the analytics service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Statistics and anomaly window (days)
    pub stats_window_days: u32,
    /// History window for achievement streaks (days)
    pub achievement_window_days: u32,
    /// Retention sweep cutoff (days)
    pub retention_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            stats_window_days: defaults::STATS_WINDOW_DAYS,
            achievement_window_days: defaults::ACHIEVEMENT_WINDOW_DAYS,
            retention_days: storage::DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Debounced auto-save policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Quiet period before a scheduled value is written (ms)
    pub debounce_ms: u64,
    /// How many times a failed write is re-armed
    pub max_retries: u32,
}

impl PersistenceConfig {
    /// Quiet period as a `Duration`
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: defaults::PERSIST_DEBOUNCE_MS,
            max_retries: defaults::PERSIST_MAX_RETRIES,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Metric store location
    pub database: DatabaseConfig,
    /// Analytics windows
    pub analytics: AnalyticsConfig,
    /// Auto-save policy
    pub persistence: PersistenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            database: DatabaseConfig {
                url: DatabaseUrl::default(),
            },
            analytics: AnalyticsConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error for unparseable or out-of-range values
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build configuration from any key/value source
    ///
    /// # Errors
    ///
    /// Returns a config error for unparseable or out-of-range values
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let database_url = match lookup(env_config::DATABASE_URL) {
            Some(raw) => DatabaseUrl::parse_url(&raw)?,
            None => DatabaseUrl::default(),
        };

        let config = Self {
            environment: lookup(env_config::ENVIRONMENT)
                .map(|raw| Environment::from_str_or_default(&raw))
                .unwrap_or_default(),
            database: DatabaseConfig { url: database_url },
            analytics: AnalyticsConfig {
                stats_window_days: parse_var(
                    &lookup,
                    env_config::STATS_WINDOW_DAYS,
                    defaults::STATS_WINDOW_DAYS,
                )?,
                achievement_window_days: parse_var(
                    &lookup,
                    env_config::ACHIEVEMENT_WINDOW_DAYS,
                    defaults::ACHIEVEMENT_WINDOW_DAYS,
                )?,
                retention_days: parse_var(
                    &lookup,
                    env_config::RETENTION_DAYS,
                    storage::DEFAULT_RETENTION_DAYS,
                )?,
            },
            persistence: PersistenceConfig {
                debounce_ms: parse_var(
                    &lookup,
                    env_config::PERSIST_DEBOUNCE_MS,
                    defaults::PERSIST_DEBOUNCE_MS,
                )?,
                max_retries: parse_var(
                    &lookup,
                    env_config::PERSIST_MAX_RETRIES,
                    defaults::PERSIST_MAX_RETRIES,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a config error naming the first out-of-range setting
    pub fn validate(&self) -> AppResult<()> {
        check_range(
            env_config::RETENTION_DAYS,
            self.analytics.retention_days,
            &RETENTION_DAYS_RANGE,
        )?;
        check_range(
            env_config::STATS_WINDOW_DAYS,
            self.analytics.stats_window_days,
            &WINDOW_DAYS_RANGE,
        )?;
        check_range(
            env_config::ACHIEVEMENT_WINDOW_DAYS,
            self.analytics.achievement_window_days,
            &WINDOW_DAYS_RANGE,
        )?;
        check_range(
            env_config::PERSIST_DEBOUNCE_MS,
            self.persistence.debounce_ms,
            &DEBOUNCE_MS_RANGE,
        )?;
        Ok(())
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Taoist Fit Configuration:\n\
             - Environment: {}\n\
             - Database: {}\n\
             - Stats Window: {} days\n\
             - Achievement Window: {} days\n\
             - Retention: {} days\n\
             - Auto-save: {} ms debounce, {} retries",
            self.environment,
            self.database.url,
            self.analytics.stats_window_days,
            self.analytics.achievement_window_days,
            self.analytics.retention_days,
            self.persistence.debounce_ms,
            self.persistence.max_retries,
        )
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|_| AppError::config(format!("Invalid {key} value '{raw}'")))
    })
}

fn check_range<T>(key: &str, value: T, range: &RangeInclusive<T>) -> AppResult<()>
where
    T: PartialOrd + fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(AppError::config(format!(
            "{key}={value} is outside {}..={}",
            range.start(),
            range.end()
        )))
    }
}
