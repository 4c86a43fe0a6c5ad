// ABOUTME: Achievement progress persistence keyed by catalog id
// ABOUTME: Only mutable fields are stored; loads merge them over the static catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use sqlx::Row;
use std::collections::HashMap;
use taoist_core::models::Achievement;
use taoist_intelligence::initialize_achievements;
use tracing::debug;

/// Mutable per-user fields of one achievement
struct StoredProgress {
    unlocked: bool,
    unlocked_at: Option<i64>,
    progress: f64,
    current_value: f64,
}

impl Database {
    /// Store achievement progress.
    ///
    /// The write never re-locks an unlocked achievement and never moves an
    /// existing `unlocked_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the transaction fails
    pub async fn save_achievements_impl(&self, achievements: &[Achievement]) -> AppResult<()> {
        let pool = self.pool()?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::storage(format!("Failed to begin achievement transaction: {e}")))?;

        for achievement in achievements {
            sqlx::query(
                r"
                INSERT INTO achievements (id, unlocked, unlocked_at, progress, current_value)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT(id) DO UPDATE SET
                    unlocked = MAX(achievements.unlocked, excluded.unlocked),
                    unlocked_at = COALESCE(achievements.unlocked_at, excluded.unlocked_at),
                    progress = excluded.progress,
                    current_value = excluded.current_value
                ",
            )
            .bind(&achievement.id)
            .bind(achievement.unlocked)
            .bind(achievement.unlocked_at)
            .bind(achievement.progress)
            .bind(achievement.current_value)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::storage(format!(
                    "Failed to store achievement '{}': {e}",
                    achievement.id
                ))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::storage(format!("Failed to commit achievements: {e}")))?;

        debug!(count = achievements.len(), "Stored achievement progress");
        Ok(())
    }

    /// Full catalog with stored progress applied; rows for retired ids are ignored
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn achievements_impl(&self) -> AppResult<Vec<Achievement>> {
        let pool = self.pool()?;

        let rows = sqlx::query(
            "SELECT id, unlocked, unlocked_at, progress, current_value FROM achievements",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to load achievements: {e}")))?;

        let mut stored = HashMap::with_capacity(rows.len());
        for row in &rows {
            let id: String = row
                .try_get("id")
                .map_err(|e| AppError::storage(format!("Failed to read achievement id: {e}")))?;
            let progress = StoredProgress {
                unlocked: row
                    .try_get("unlocked")
                    .map_err(|e| AppError::storage(format!("Failed to read unlocked: {e}")))?,
                unlocked_at: row
                    .try_get("unlocked_at")
                    .map_err(|e| AppError::storage(format!("Failed to read unlocked_at: {e}")))?,
                progress: row
                    .try_get("progress")
                    .map_err(|e| AppError::storage(format!("Failed to read progress: {e}")))?,
                current_value: row
                    .try_get("current_value")
                    .map_err(|e| AppError::storage(format!("Failed to read current_value: {e}")))?,
            };
            stored.insert(id, progress);
        }

        Ok(initialize_achievements()
            .into_iter()
            .map(|mut achievement| {
                if let Some(saved) = stored.remove(&achievement.id) {
                    achievement.unlocked = saved.unlocked;
                    achievement.unlocked_at = saved.unlocked_at;
                    achievement.progress = saved.progress;
                    achievement.current_value = saved.current_value;
                }
                achievement
            })
            .collect())
    }
}
