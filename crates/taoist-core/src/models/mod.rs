// ABOUTME: Core data models shared by the analytics engine and the metric store
// ABOUTME: Re-exports metric, cultivation, and achievement types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! Domain models.
//!
//! Samples and snapshots are value objects: the store owns the durable copy
//! and hands out clones, analytics borrow slices of them.

mod achievement;
mod cultivation;
mod metrics;

pub use achievement::{Achievement, AchievementCategory, AchievementTier};
pub use cultivation::{CultivationLevel, CultivationStage};
pub use metrics::{
    day_of, default_metric_configs, DailySnapshot, Element, ExtendedHealthMetrics, MetricConfig,
    MetricKey, MetricSample, SampleSource,
};
