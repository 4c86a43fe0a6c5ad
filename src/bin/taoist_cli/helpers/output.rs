// ABOUTME: Output helpers for taoist-cli
// ABOUTME: Every command prints one pretty JSON document on stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use taoist_fit::errors::AppResult;

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The given day, or today in UTC
pub fn day_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}
