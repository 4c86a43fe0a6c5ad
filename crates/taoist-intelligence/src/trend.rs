// ABOUTME: Least-squares trend analysis over a metric history with day-based slope units
// ABOUTME: Also provides EMA smoothing and a short-term change detector on top of it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors
#![allow(clippy::cast_precision_loss)] // Safe: point counts and day offsets fit in f64 mantissa

use serde::{Deserialize, Serialize};
use taoist_core::constants::{time_constants, trend};
use taoist_core::models::MetricSample;

/// One point of a metric history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Observed value
    pub value: f64,
}

impl From<&MetricSample> for TrendPoint {
    fn from(sample: &MetricSample) -> Self {
        Self {
            timestamp: sample.timestamp,
            value: sample.value,
        }
    }
}

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Slope at or above the stable threshold
    Rising,
    /// Slope at or below minus the stable threshold
    Falling,
    /// Slope magnitude under 0.1 units/day
    Stable,
}

/// Result of a linear fit over a history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    /// Classified direction
    pub direction: TrendDirection,
    /// Units per day
    pub slope: f64,
    /// Value at day 0 (the earliest sample)
    pub intercept: f64,
    /// Coefficient of determination, clamped to `[0, 1]`
    pub confidence: f64,
    /// Extrapolated value one day after the last sample
    pub prediction: f64,
    /// Cultivation-themed summary of the trend
    pub description: String,
    /// Signed slope with one decimal, e.g. "+2.3/day"
    pub change_rate: String,
}

/// Outcome of comparing a fresh reading to the smoothed history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortTermChange {
    /// More than 5% above the latest EMA
    Increasing,
    /// More than 5% below the latest EMA
    Decreasing,
    /// Within the band, or too little history
    Stable,
}

/// Trend analyzer over metric histories
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    /// Fit an ordinary least-squares line to `history`.
    ///
    /// The x axis is days since the earliest point. Input order does not
    /// matter. Returns `None` for fewer than 5 points.
    #[must_use]
    pub fn analyze_trend(history: &[TrendPoint]) -> Option<TrendAnalysis> {
        if history.len() < trend::MIN_POINTS {
            return None;
        }

        let mut points = history.to_vec();
        points.sort_by_key(|p| p.timestamp);

        let origin = points[0].timestamp;
        let xs: Vec<f64> = points
            .iter()
            .map(|p| (p.timestamp - origin) as f64 / time_constants::MS_PER_DAY_F64)
            .collect();
        let ys: Vec<f64> = points.iter().map(|p| p.value).collect();

        let n = points.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let (sxx, sxy) = xs
            .iter()
            .zip(&ys)
            .fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
                let dx = x - mean_x;
                (dx.mul_add(dx, sxx), dx.mul_add(y - mean_y, sxy))
            });

        // All points on one instant: no usable time axis
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = slope.mul_add(-mean_x, mean_y);

        let ss_total: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
        let ss_residual: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (y - slope.mul_add(*x, intercept)).powi(2))
            .sum();

        let confidence = if ss_total <= f64::EPSILON * mean_y.abs().max(1.0) {
            1.0
        } else {
            (1.0 - ss_residual / ss_total).clamp(0.0, 1.0)
        };

        let last_day = xs.last().copied().unwrap_or(0.0);
        let prediction = slope.mul_add(last_day + 1.0, intercept);
        let direction = Self::classify(slope);

        Some(TrendAnalysis {
            direction,
            slope,
            intercept,
            confidence,
            prediction,
            description: Self::describe(direction, slope).to_owned(),
            change_rate: Self::format_change_rate(slope),
        })
    }

    /// Map a slope to its direction
    #[must_use]
    pub fn classify(slope: f64) -> TrendDirection {
        if slope.abs() < trend::STABLE_SLOPE_THRESHOLD {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Rising
        } else {
            TrendDirection::Falling
        }
    }

    fn describe(direction: TrendDirection, slope: f64) -> &'static str {
        let magnitude = slope.abs();
        match direction {
            TrendDirection::Stable => "Cultivation is steady; the foundation holds firm",
            TrendDirection::Rising if magnitude > trend::STEEP_SLOPE => {
                "Cultivation surges forward; a breakthrough draws near"
            }
            TrendDirection::Rising if magnitude > trend::MODERATE_SLOPE => {
                "Cultivation advances steadily; keep up the practice"
            }
            TrendDirection::Rising => "Cultivation creeps upward; small gains accumulate",
            TrendDirection::Falling if magnitude > trend::STEEP_SLOPE => {
                "Cultivation falls sharply; rest and restore your roots"
            }
            TrendDirection::Falling if magnitude > trend::MODERATE_SLOPE => {
                "Cultivation is slipping; adjust your practice"
            }
            TrendDirection::Falling => "Cultivation wavers slightly; stay watchful",
        }
    }

    /// Render a slope as "+x.x/day" or "-x.x/day"
    #[must_use]
    pub fn format_change_rate(slope: f64) -> String {
        let sign = if slope >= 0.0 { "+" } else { "-" };
        format!("{sign}{:.1}/day", slope.abs())
    }

    /// Exponential moving average over values in time order.
    ///
    /// The first output equals the first input; each following output is
    /// `alpha * value + (1 - alpha) * previous`.
    #[must_use]
    pub fn exponential_moving_average(values: &[f64], alpha: f64) -> Vec<f64> {
        let mut smoothed = Vec::with_capacity(values.len());
        let mut previous: Option<f64> = None;
        for value in values {
            let next = previous.map_or(*value, |prev| alpha.mul_add(*value, (1.0 - alpha) * prev));
            smoothed.push(next);
            previous = Some(next);
        }
        smoothed
    }

    /// Compare `current` with the EMA of `history` (time order, alpha 0.3).
    ///
    /// Needs at least 3 history points; anything within 5% of the latest
    /// smoothed value counts as stable.
    #[must_use]
    pub fn detect_short_term_change(current: f64, history: &[f64]) -> ShortTermChange {
        if history.len() < trend::SHORT_TERM_MIN_POINTS {
            return ShortTermChange::Stable;
        }

        let ema = Self::exponential_moving_average(history, trend::EMA_ALPHA);
        let Some(baseline) = ema.last().copied() else {
            return ShortTermChange::Stable;
        };

        let band = baseline.abs() * trend::SHORT_TERM_BAND;
        if current > baseline + band {
            ShortTermChange::Increasing
        } else if current < baseline - band {
            ShortTermChange::Decreasing
        } else {
            ShortTermChange::Stable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn daily(values: &[f64]) -> Vec<TrendPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TrendPoint {
                timestamp: T0 + i as i64 * time_constants::MS_PER_DAY,
                value: *v,
            })
            .collect()
    }

    #[test]
    fn test_too_few_points() {
        assert!(TrendAnalyzer::analyze_trend(&daily(&[1.0, 2.0, 3.0, 4.0])).is_none());
    }

    #[test]
    fn test_perfect_line() {
        let analysis = TrendAnalyzer::analyze_trend(&daily(&[1.0, 3.0, 5.0, 7.0, 9.0])).unwrap();
        assert!((analysis.slope - 2.0).abs() < 1e-9);
        assert!((analysis.intercept - 1.0).abs() < 1e-9);
        assert!((analysis.confidence - 1.0).abs() < 1e-9);
        assert!((analysis.prediction - 11.0).abs() < 1e-9);
        assert_eq!(analysis.direction, TrendDirection::Rising);
        assert_eq!(analysis.change_rate, "+2.0/day");
    }

    #[test]
    fn test_constant_series_is_stable_with_full_confidence() {
        let analysis = TrendAnalyzer::analyze_trend(&daily(&[50.0; 6])).unwrap();
        assert_eq!(analysis.direction, TrendDirection::Stable);
        assert!(analysis.slope.abs() < 1e-12);
        assert!((analysis.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unsorted_input_gives_same_fit() {
        let ordered = daily(&[10.0, 8.0, 7.5, 5.0, 2.0, 1.0]);
        let mut shuffled = ordered.clone();
        shuffled.swap(0, 4);
        shuffled.swap(1, 5);
        let a = TrendAnalyzer::analyze_trend(&ordered).unwrap();
        let b = TrendAnalyzer::analyze_trend(&shuffled).unwrap();
        assert!((a.slope - b.slope).abs() < 1e-12);
        assert_eq!(a.direction, TrendDirection::Falling);
        assert!(a.change_rate.starts_with('-'));
    }

    #[test]
    fn test_shared_timestamp_has_zero_slope() {
        let points: Vec<TrendPoint> = [1.0, 5.0, 3.0, 9.0, 2.0]
            .iter()
            .map(|v| TrendPoint { timestamp: T0, value: *v })
            .collect();
        let analysis = TrendAnalyzer::analyze_trend(&points).unwrap();
        assert!(analysis.slope.abs() < f64::EPSILON);
        assert!((analysis.intercept - 4.0).abs() < 1e-12);
        assert_eq!(analysis.direction, TrendDirection::Stable);
        assert!((0.0..=1.0).contains(&analysis.confidence));
    }

    #[test]
    fn test_confidence_bounds_on_noise() {
        let analysis =
            TrendAnalyzer::analyze_trend(&daily(&[5.0, -3.0, 8.0, 0.0, 6.0, -2.0, 7.0])).unwrap();
        assert!((0.0..=1.0).contains(&analysis.confidence));
    }

    #[test]
    fn test_ema_and_short_term_change() {
        let ema = TrendAnalyzer::exponential_moving_average(&[10.0, 20.0], 0.3);
        assert!((ema[0] - 10.0).abs() < f64::EPSILON);
        assert!((ema[1] - 13.0).abs() < 1e-12);

        let history = [100.0, 100.0, 100.0];
        assert_eq!(TrendAnalyzer::detect_short_term_change(110.0, &history), ShortTermChange::Increasing);
        assert_eq!(TrendAnalyzer::detect_short_term_change(90.0, &history), ShortTermChange::Decreasing);
        assert_eq!(TrendAnalyzer::detect_short_term_change(103.0, &history), ShortTermChange::Stable);
        assert_eq!(TrendAnalyzer::detect_short_term_change(500.0, &[1.0, 2.0]), ShortTermChange::Stable);
    }
}
