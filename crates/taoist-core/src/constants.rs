// ABOUTME: Application constants for analytics thresholds, retention, and configuration
// ABOUTME: Groups fixed numeric policy values by the component that consumes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! Application-wide constants organized by domain.
//!
//! The sample-count minimums of the trend analyzer (5) and the anomaly
//! detector (10) are independent fixed constants; they are not derived from
//! a shared policy.

/// Time conversion constants
pub mod time_constants {
    /// Milliseconds in one day
    pub const MS_PER_DAY: i64 = 86_400_000;
    /// Milliseconds in one hour
    pub const MS_PER_HOUR: i64 = 3_600_000;
    /// Milliseconds in one day as `f64`
    pub const MS_PER_DAY_F64: f64 = 86_400_000.0;
    /// Milliseconds in one minute as `f64`
    pub const MS_PER_MINUTE_F64: f64 = 60_000.0;
}

/// Trend analyzer policy
pub mod trend {
    /// Fewer points than this yields no trend
    pub const MIN_POINTS: usize = 5;
    /// Absolute slope (units/day) below which a trend is stable
    pub const STABLE_SLOPE_THRESHOLD: f64 = 0.1;
    /// Slope magnitude for the "steep" description band
    pub const STEEP_SLOPE: f64 = 5.0;
    /// Slope magnitude for the "moderate" description band
    pub const MODERATE_SLOPE: f64 = 2.0;
    /// Default EMA smoothing factor
    pub const EMA_ALPHA: f64 = 0.3;
    /// Minimum points for short-term change detection
    pub const SHORT_TERM_MIN_POINTS: usize = 3;
    /// Relative band around the latest EMA treated as unchanged
    pub const SHORT_TERM_BAND: f64 = 0.05;
}

/// Anomaly detector policy
pub mod anomaly {
    /// Minimum history count before statistical checks run
    pub const MIN_STATISTICAL_SAMPLES: usize = 10;
    /// Absolute z-score that flags an anomaly
    pub const Z_SCORE_THRESHOLD: f64 = 2.5;
    /// Width of the reported expected range in standard deviations
    pub const EXPECTED_RANGE_SIGMAS: f64 = 2.0;
    /// IQR approximation factor for normally distributed samples
    pub const IQR_STDDEV_FACTOR: f64 = 1.35;
    /// Tukey fence multiplier
    pub const IQR_FENCE: f64 = 1.5;
    /// Relative deviation above which severity is severe
    pub const SEVERE_DEVIATION: f64 = 0.30;
    /// Relative deviation above which severity is moderate
    pub const MODERATE_DEVIATION: f64 = 0.15;
}

/// Five-elements balance model policy
pub mod five_elements {
    /// Score assigned to a category with no contributing metric
    pub const NEUTRAL_SCORE: f64 = 50.0;
    /// Weak-category score below which the deficiency advice applies
    pub const DEFICIENT_BELOW: f64 = 40.0;
    /// Dominant-category score above which the excess advice applies
    pub const EXCESS_ABOVE: f64 = 80.0;
}

/// Achievement engine policy
pub mod achievements {
    /// Heart rate daily-average lower bound (bpm)
    pub const HEART_RATE_MIN: f64 = 60.0;
    /// Heart rate daily-average upper bound (bpm)
    pub const HEART_RATE_MAX: f64 = 100.0;
    /// Number of recent unlocks reported in stats
    pub const RECENT_UNLOCKS: usize = 3;
}

/// Breakthrough predictor policy
pub mod prediction {
    /// Ring buffer capacity
    pub const BUFFER_CAPACITY: usize = 20;
    /// Minimum buffered samples for a prediction
    pub const MIN_SAMPLES: usize = 2;
}

/// Storage schema and defaults
pub mod storage {
    /// Current schema version; bumps only ever add tables
    pub const SCHEMA_VERSION: i64 = 3;
    /// Key of the single cultivation level row
    pub const CURRENT_LEVEL_SLOT: &str = "current";
    /// Default retention sweep window (days)
    pub const DEFAULT_RETENTION_DAYS: u32 = 90;
}

/// Configuration defaults and bounds
pub mod defaults {
    /// Default statistics window (days)
    pub const STATS_WINDOW_DAYS: u32 = 7;
    /// Default achievement history window (days)
    pub const ACHIEVEMENT_WINDOW_DAYS: u32 = 30;
    /// Default debounce quiet period (ms)
    pub const PERSIST_DEBOUNCE_MS: u64 = 1_000;
    /// Default number of re-armed auto-save attempts
    pub const PERSIST_MAX_RETRIES: u32 = 3;
    /// Data directory name under the platform data dir
    pub const DATA_DIR_NAME: &str = "taoist-fit";
    /// Database file name
    pub const DATABASE_FILE: &str = "taoist-fit.db";
}

/// Environment variable names
pub mod env_config {
    /// Database connection URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Retention window
    pub const RETENTION_DAYS: &str = "TAOIST_RETENTION_DAYS";
    /// Statistics window
    pub const STATS_WINDOW_DAYS: &str = "TAOIST_STATS_WINDOW_DAYS";
    /// Achievement history window
    pub const ACHIEVEMENT_WINDOW_DAYS: &str = "TAOIST_ACHIEVEMENT_WINDOW_DAYS";
    /// Debounce quiet period
    pub const PERSIST_DEBOUNCE_MS: &str = "TAOIST_PERSIST_DEBOUNCE_MS";
    /// Auto-save retries
    pub const PERSIST_MAX_RETRIES: &str = "TAOIST_PERSIST_MAX_RETRIES";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Service identity used in structured logs
pub mod service_names {
    /// Service name
    pub const TAOIST_FIT: &str = "taoist-fit";
}
