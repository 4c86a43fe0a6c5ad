// ABOUTME: Trailing calendar-day streak counting over metric histories
// ABOUTME: Same-day samples are averaged; a missing day ends the streak like a failing day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors
#![allow(clippy::cast_precision_loss)] // Safe: per-day sample counts are small

use chrono::NaiveDate;
use std::collections::BTreeMap;
use taoist_core::models::MetricSample;

/// Average of one metric over one calendar day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyAverage {
    /// UTC day
    pub date: NaiveDate,
    /// Mean of that day's samples
    pub average: f64,
}

/// Group samples by day and average them, most recent day first
#[must_use]
pub fn aggregate_by_day(history: &[MetricSample]) -> Vec<DailyAverage> {
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for sample in history {
        let entry = days.entry(sample.date).or_insert((0.0, 0));
        entry.0 += sample.value;
        entry.1 += 1;
    }

    days.into_iter()
        .rev()
        .map(|(date, (sum, count))| DailyAverage {
            date,
            average: sum / count as f64,
        })
        .collect()
}

/// Count days backward from the most recent recorded day while `predicate`
/// holds for the day average and no calendar day is skipped
pub fn count_consecutive_days(history: &[MetricSample], predicate: impl Fn(f64) -> bool) -> u32 {
    let mut count = 0;
    let mut expected: Option<NaiveDate> = None;

    for day in aggregate_by_day(history) {
        if expected.is_some_and(|date| date != day.date) || !predicate(day.average) {
            break;
        }
        count += 1;
        expected = day.date.pred_opt();
        if expected.is_none() {
            break;
        }
    }
    count
}

/// Trailing days with average strictly below `threshold`
#[must_use]
pub fn count_consecutive_low_days(history: &[MetricSample], threshold: f64) -> u32 {
    count_consecutive_days(history, |avg| avg < threshold)
}

/// Trailing days with average strictly above `threshold`
#[must_use]
pub fn count_consecutive_high_days(history: &[MetricSample], threshold: f64) -> u32 {
    count_consecutive_days(history, |avg| avg > threshold)
}

/// Trailing days with average inside `[min, max]`
#[must_use]
pub fn count_consecutive_in_range_days(history: &[MetricSample], min: f64, max: f64) -> u32 {
    count_consecutive_days(history, |avg| (min..=max).contains(&avg))
}

/// Trailing days that have at least one sample
#[must_use]
pub fn count_recorded_days(history: &[MetricSample]) -> u32 {
    count_consecutive_days(history, |_| true)
}
