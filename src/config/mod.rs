// ABOUTME: Configuration management module for the metric store, analytics windows, and auto-save
// ABOUTME: Environment-only configuration, validated eagerly at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors
//! Configuration module for Taoist Fit
//!
//! All settings come from environment variables; there is no config file.
//!
//! - **Environment**: database location, analytics windows, retention, auto-save policy

/// Environment-driven application configuration
pub mod environment;

pub use environment::{
    AnalyticsConfig, AppConfig, DatabaseConfig, DatabaseUrl, Environment, PersistenceConfig,
};
