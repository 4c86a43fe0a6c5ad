// ABOUTME: Domain service layer composing the store with the cultivation analytics
// ABOUTME: Reused by the CLI and by embedding applications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! Domain service layer

/// Recording, reports, five-elements, achievements, and retention
pub mod analytics;

pub use analytics::{AnalyticsService, MetricReport, RecordedMetric};
