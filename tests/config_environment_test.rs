// ABOUTME: Integration tests for environment-driven configuration
// ABOUTME: Defaults, overrides, database URL parsing, and rejection of invalid values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use taoist_fit::config::{AnalyticsConfig, AppConfig, DatabaseUrl, Environment, PersistenceConfig};
use taoist_fit::constants::env_config;
use taoist_fit::errors::ErrorCode;

const ALL_VARS: [&str; 7] = [
    env_config::DATABASE_URL,
    env_config::RETENTION_DAYS,
    env_config::STATS_WINDOW_DAYS,
    env_config::ACHIEVEMENT_WINDOW_DAYS,
    env_config::PERSIST_DEBOUNCE_MS,
    env_config::PERSIST_MAX_RETRIES,
    env_config::ENVIRONMENT,
];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.analytics, AnalyticsConfig::default());
    assert_eq!(config.persistence, PersistenceConfig::default());
    assert!(!config.database.url.is_memory());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    env::set_var(env_config::DATABASE_URL, "sqlite::memory:");
    env::set_var(env_config::RETENTION_DAYS, "30");
    env::set_var(env_config::STATS_WINDOW_DAYS, "14");
    env::set_var(env_config::ACHIEVEMENT_WINDOW_DAYS, " 60 ");
    env::set_var(env_config::PERSIST_DEBOUNCE_MS, "250");
    env::set_var(env_config::PERSIST_MAX_RETRIES, "5");
    env::set_var(env_config::ENVIRONMENT, "testing");

    let config = AppConfig::from_env().unwrap();
    clear_env();

    assert!(config.database.url.is_memory());
    assert!(config.environment.is_testing());
    assert_eq!(
        config.analytics,
        AnalyticsConfig {
            stats_window_days: 14,
            achievement_window_days: 60,
            retention_days: 30,
        }
    );
    assert_eq!(config.persistence.debounce_ms, 250);
    assert_eq!(config.persistence.max_retries, 5);

    let summary = config.summary();
    assert!(summary.contains("Retention: 30 days"));
    assert!(summary.contains("sqlite::memory:"));
}

#[test]
#[serial]
fn test_from_env_rejects_invalid_values() {
    clear_env();
    env::set_var(env_config::RETENTION_DAYS, "-1");
    let err = AppConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    assert!(err.message.contains(env_config::RETENTION_DAYS));

    clear_env();
    env::set_var(env_config::STATS_WINDOW_DAYS, "0");
    let err = AppConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    clear_env();
    env::set_var(env_config::DATABASE_URL, "postgresql://localhost/fit");
    let err = AppConfig::from_env().unwrap_err();
    assert!(err.message.contains("only sqlite"));

    clear_env();
}

#[test]
fn test_database_url_parsing() {
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:/var/lib/fit.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("/var/lib/fit.db")
        }
    );
    // A bare path is treated as a SQLite file
    let bare = DatabaseUrl::parse_url("  ./fit.db ").unwrap();
    assert_eq!(bare.to_connection_string(), "sqlite:./fit.db");
    assert_eq!(bare.to_string(), "sqlite:./fit.db");

    assert!(DatabaseUrl::parse_url(":memory:").unwrap().is_memory());
    assert!(DatabaseUrl::parse_url("").is_err());
}

#[test]
fn test_validate_checks_every_window() {
    let mut config = AppConfig::default();
    assert!(config.validate().is_ok());

    config.analytics.achievement_window_days = 400;
    assert!(config.validate().is_err());

    config.analytics.achievement_window_days = 30;
    config.persistence.debounce_ms = 120_000;
    let err = config.validate().unwrap_err();
    assert!(err.message.contains(env_config::PERSIST_DEBOUNCE_MS));
}

#[test]
fn test_environment_display_round_trip() {
    for env in [
        Environment::Development,
        Environment::Production,
        Environment::Testing,
    ] {
        assert_eq!(Environment::from_str_or_default(&env.to_string()), env);
    }
    assert!(Environment::Production.is_production());
    assert!(!Environment::Development.is_production());
}
