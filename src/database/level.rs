// ABOUTME: Cultivation level persistence in a single-row table
// ABOUTME: Levels are validated on the way in and on the way out
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use sqlx::Row;
use taoist_core::constants::storage::CURRENT_LEVEL_SLOT;
use taoist_core::models::{CultivationLevel, CultivationStage};

impl Database {
    /// Store the current cultivation level
    ///
    /// # Errors
    ///
    /// Returns a validation error for an inconsistent level or a storage error if the write fails
    pub async fn save_cultivation_level_impl(&self, level: &CultivationLevel) -> AppResult<()> {
        let pool = self.pool()?;
        level.validate()?;

        sqlx::query(
            r"
            INSERT INTO cultivation_level (slot, stage, layer, current_exp, max_exp, title, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(slot) DO UPDATE SET
                stage = excluded.stage,
                layer = excluded.layer,
                current_exp = excluded.current_exp,
                max_exp = excluded.max_exp,
                title = excluded.title,
                updated_at = excluded.updated_at
            ",
        )
        .bind(CURRENT_LEVEL_SLOT)
        .bind(level.stage.as_str())
        .bind(i64::from(level.layer))
        .bind(level.current_exp)
        .bind(level.max_exp)
        .bind(&level.title)
        .bind(Utc::now().timestamp_millis())
        .execute(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to store cultivation level: {e}")))?;

        Ok(())
    }

    /// Stored cultivation level, if one was ever saved
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is inconsistent
    pub async fn stored_cultivation_level_impl(&self) -> AppResult<Option<CultivationLevel>> {
        let pool = self.pool()?;

        let row = sqlx::query(
            "SELECT stage, layer, current_exp, max_exp, title FROM cultivation_level WHERE slot = $1",
        )
        .bind(CURRENT_LEVEL_SLOT)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to load cultivation level: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stage: String = row
            .try_get("stage")
            .map_err(|e| AppError::storage(format!("Failed to read stage: {e}")))?;
        let layer: i64 = row
            .try_get("layer")
            .map_err(|e| AppError::storage(format!("Failed to read layer: {e}")))?;

        let level = CultivationLevel {
            stage: stage.parse::<CultivationStage>()?,
            layer: u32::try_from(layer)
                .map_err(|_| AppError::storage(format!("Stored layer {layer} out of range")))?,
            current_exp: row
                .try_get("current_exp")
                .map_err(|e| AppError::storage(format!("Failed to read current_exp: {e}")))?,
            max_exp: row
                .try_get("max_exp")
                .map_err(|e| AppError::storage(format!("Failed to read max_exp: {e}")))?,
            title: row
                .try_get("title")
                .map_err(|e| AppError::storage(format!("Failed to read title: {e}")))?,
        };
        level.validate()?;
        Ok(Some(level))
    }

    /// Stored cultivation level, or the starting level when none was saved
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is inconsistent
    pub async fn cultivation_level_impl(&self) -> AppResult<CultivationLevel> {
        Ok(self
            .stored_cultivation_level_impl()
            .await?
            .unwrap_or_default())
    }
}
