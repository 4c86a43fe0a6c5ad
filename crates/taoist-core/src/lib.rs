// ABOUTME: Core types and constants for the Taoist Fit cultivation analytics platform
// ABOUTME: Foundation crate with error handling, domain models, and reference tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

#![deny(unsafe_code)]

//! # Taoist Core
//!
//! Foundation crate providing shared types and constants for the Taoist Fit
//! health cultivation platform. Both the analytics engine and the storage
//! layer depend on it, so it is kept free of I/O.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **constants**: Thresholds, reference ranges, and configuration names
//! - **models**: Metric samples, snapshots, configs, cultivation levels, achievement enums

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (metric samples, snapshots, cultivation level, achievements)
pub mod models;
