// ABOUTME: Unified error types shared by the store, import/export, and configuration layers
// ABOUTME: Defines ErrorCode taxonomy, AppError with context, and conversions from library errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! # Unified Error Handling System
//!
//! Only the I/O boundary (the metric store, import/export, configuration)
//! produces hard errors. Analytic functions encode "not enough data yet" as
//! `None` and never construct an `AppError`.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Store used before `initialize()` completed
    #[serde(rename = "NOT_INITIALIZED")]
    NotInitialized,
    /// Underlying persistence failure
    #[serde(rename = "STORAGE_IO_ERROR")]
    StorageIo,
    /// Malformed payload or out-of-range value
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// JSON encoding or decoding failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    Serialization,
    /// Invalid environment configuration
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid,
    /// Requested record does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    NotFound,
    /// Anything else
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotInitialized => "Metric store used before initialization",
            Self::StorageIo => "Storage operation failed",
            Self::Validation => "The provided data is invalid",
            Self::Serialization => "Data serialization/deserialization failed",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::NotFound => "The requested resource was not found",
            Self::Internal => "An internal error occurred",
        }
    }

    /// Whether retrying the same call may succeed
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::StorageIo)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details (counts, offending fields)
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Store used before initialization
    #[must_use]
    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "call initialize() before using the metric store",
        )
    }

    /// Underlying storage failure
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageIo, message)
    }

    /// Invalid input with a human-readable reason
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Serialization failure
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Serialization, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Whether retrying may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}
