// ABOUTME: Error handling for the metric store, import/export, persistence, and configuration
// ABOUTME: Re-exports the shared AppError taxonomy from taoist-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! # Unified Error Handling System
//!
//! The taxonomy lives in `taoist-core` so the analytics crate and the store
//! agree on error codes. `sqlx::Error` converts into a `StorageIo` error
//! through the core crate's `database-errors` feature.

pub use taoist_core::errors::{AppError, AppResult, ErrorCode};
