// ABOUTME: Re-exports command modules for taoist-cli
// ABOUTME: Metric recording and analytics, progress views, and data transfer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

pub mod metrics;
pub mod progress;
pub mod transfer;
