// ABOUTME: Progress commands for taoist-cli
// ABOUTME: Five-elements balance of a snapshot and achievement evaluation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use chrono::{NaiveDate, Utc};
use serde_json::json;
use taoist_fit::{
    errors::{AppError, AppResult},
    services::AnalyticsService,
};
use tracing::info;

use crate::helpers::output::{day_or_today, print_json};

/// Print the five-elements insight for the snapshot of `date`
pub async fn elements(service: &AnalyticsService, date: Option<NaiveDate>) -> AppResult<()> {
    let date = day_or_today(date);
    let snapshot = service
        .store()
        .get_daily_snapshot(date)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Snapshot for {date}")))?;
    let insight = service.five_elements(&snapshot.metrics).await?;
    print_json(&json!({ "date": date, "insight": insight }))
}

/// Print achievements and their summary, optionally re-evaluating first
pub async fn achievements(service: &AnalyticsService, refresh: bool) -> AppResult<()> {
    if refresh {
        let store = service.store();
        let level = store.cultivation_level().await?;
        let latest = store
            .recent_daily_snapshots(service.settings().stats_window_days)
            .await?
            .pop();
        let score = match latest {
            Some(snapshot) => service.five_elements(&snapshot.metrics).await?.score,
            None => 0.0,
        };

        let check = service
            .refresh_achievements(&level, score, Utc::now().timestamp_millis())
            .await?;
        for unlocked in &check.new_unlocks {
            info!(id = %unlocked.id, name = %unlocked.name, "Unlocked achievement");
        }
    }

    let summary = service.achievement_summary().await?;
    let achievements = service.store().achievements().await?;
    print_json(&json!({ "summary": summary, "achievements": achievements }))
}
