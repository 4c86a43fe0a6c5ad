// ABOUTME: Breakthrough time predictor over a fixed-capacity ring buffer of cumulative progress
// ABOUTME: Two-point linear extrapolation between the oldest and newest buffered samples
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors
#![allow(clippy::cast_precision_loss)] // Safe: millisecond spans are far below 2^52
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safe: ceil of a positive finite ratio

use taoist_core::constants::{prediction, time_constants};
use taoist_core::models::CultivationLevel;

/// One tick of cumulative progress
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressSample {
    /// Epoch milliseconds
    pub time_ms: i64,
    /// Cumulative value (calories / Qi) at that time
    pub cumulative: f64,
}

/// Fixed-capacity history of progress samples; the oldest entry is overwritten
/// once the buffer is full
#[derive(Debug, Clone)]
pub struct BreakthroughPredictor {
    slots: [ProgressSample; prediction::BUFFER_CAPACITY],
    head: usize,
    len: usize,
}

impl Default for BreakthroughPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakthroughPredictor {
    /// Empty predictor
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [ProgressSample {
                time_ms: 0,
                cumulative: 0.0,
            }; prediction::BUFFER_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn track(&mut self, time_ms: i64, cumulative: f64) {
        self.slots[self.head] = ProgressSample { time_ms, cumulative };
        self.head = (self.head + 1) % prediction::BUFFER_CAPACITY;
        if self.len < prediction::BUFFER_CAPACITY {
            self.len += 1;
        }
    }

    /// Buffered sample count
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is buffered
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &ProgressSample> {
        let start = if self.len < prediction::BUFFER_CAPACITY {
            0
        } else {
            self.head
        };
        (0..self.len).map(move |i| &self.slots[(start + i) % prediction::BUFFER_CAPACITY])
    }

    fn oldest(&self) -> Option<ProgressSample> {
        self.iter().next().copied()
    }

    fn newest(&self) -> Option<ProgressSample> {
        self.iter().last().copied()
    }

    /// Minutes until `level.current_exp` reaches `level.max_exp`.
    ///
    /// `None` when fewer than two samples are buffered, or when the buffered
    /// span or gain is not positive. `Some(0)` once the level is full,
    /// whatever the rate.
    #[must_use]
    pub fn predict_minutes(&self, level: &CultivationLevel) -> Option<u64> {
        if self.len < prediction::MIN_SAMPLES {
            return None;
        }

        let remaining = level.max_exp - level.current_exp;
        if remaining <= 0.0 {
            return Some(0);
        }

        let (first, last) = (self.oldest()?, self.newest()?);
        let span_minutes = (last.time_ms - first.time_ms) as f64 / time_constants::MS_PER_MINUTE_F64;
        let gain = last.cumulative - first.cumulative;
        if span_minutes <= 0.0 || gain <= 0.0 {
            return None;
        }

        let minutes = (remaining / (gain / span_minutes)).ceil();
        minutes.is_finite().then_some(minutes as u64)
    }
}
