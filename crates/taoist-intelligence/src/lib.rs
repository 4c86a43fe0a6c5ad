// ABOUTME: Cultivation analytics engine over health metric histories
// ABOUTME: Statistics, trends, anomalies, five-elements balance, achievements, breakthrough prediction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

#![deny(unsafe_code)]

//! # Taoist Intelligence
//!
//! Every function in this crate is synchronous and pure: inputs are borrowed,
//! results are freshly allocated value objects, and nothing is cached between
//! calls. The only stateful type is [`prediction::BreakthroughPredictor`],
//! a fixed-capacity ring buffer owned by its caller.
//!
//! "Not enough data yet" is an expected steady state, so it is reported as
//! `None` rather than as an error.

/// Descriptive statistics over a metric window
pub mod statistics;

/// Linear-regression trend analysis and EMA smoothing
pub mod trend;

/// Reference-range and statistical anomaly classification
pub mod anomaly;

/// Five-elements balance model over enabled metrics
pub mod five_elements;

/// Achievement catalog and evaluation reducer
pub mod achievements;

/// Time-to-breakthrough extrapolation
pub mod prediction;

pub use achievements::{
    achievement_stats, check_all_achievements, initialize_achievements, AchievementCheck,
    AchievementInputs, AchievementStats,
};
pub use anomaly::{AnomalyAlert, AnomalyDetector, AnomalySeverity, DetectionMethod};
pub use five_elements::{compute_insight, FiveElementsInsight};
pub use prediction::BreakthroughPredictor;
pub use statistics::{compute_statistics, MetricStatistics};
pub use trend::{ShortTermChange, TrendAnalysis, TrendAnalyzer, TrendDirection, TrendPoint};
