// ABOUTME: Descriptive statistics (count, extremes, mean, median, population spread) for a metric window
// ABOUTME: Pure computation over samples already fetched from the metric store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors
#![allow(clippy::cast_precision_loss)] // Safe: sample counts are far below 2^52

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use taoist_core::models::{MetricKey, MetricSample};

/// Summary of one metric over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricStatistics {
    /// Metric summarized
    pub metric_key: MetricKey,
    /// Number of samples
    pub count: usize,
    /// Largest value
    pub max: f64,
    /// Smallest value
    pub min: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Middle value (mean of the two middle values for even counts)
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Population variance
    pub variance: f64,
    /// Value of the most recently timestamped sample
    pub latest: f64,
    /// Window label, e.g. "7 days"
    pub period: String,
}

/// Window label used in [`MetricStatistics::period`]
#[must_use]
pub fn period_label(window_days: u32) -> String {
    if window_days == 1 {
        "24 hours".to_owned()
    } else {
        format!("{window_days} days")
    }
}

/// Compute statistics for a window of samples.
///
/// Returns `None` for an empty window; callers report "no data" instead.
/// No rounding is applied.
#[must_use]
pub fn compute_statistics(
    metric_key: MetricKey,
    samples: &[MetricSample],
    window_days: u32,
) -> Option<MetricStatistics> {
    let latest = samples.iter().max_by_key(|s| s.timestamp)?.value;
    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();

    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(MetricStatistics {
        metric_key,
        count,
        max,
        min,
        mean,
        median: median(&values),
        std_dev: variance.sqrt(),
        variance,
        latest,
        period: period_label(window_days),
    })
}

/// Median of a non-empty slice; 0.0 for an empty one
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let len = sorted.len();
    if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
    } else {
        sorted[len / 2]
    }
}
