// ABOUTME: Metric configuration persistence; the stored set is replaced as a whole
// ABOUTME: Falls back to the factory catalog when nothing has been saved yet
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use sqlx::Row;
use std::collections::HashSet;
use taoist_core::models::{default_metric_configs, MetricConfig, MetricKey};
use tracing::debug;

impl Database {
    /// Replace the stored metric configuration
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid config or a repeated key, or a
    /// storage error if the transaction fails
    pub async fn save_metric_configs_impl(&self, configs: &[MetricConfig]) -> AppResult<()> {
        let pool = self.pool()?;

        let mut seen = HashSet::new();
        for config in configs {
            config.validate()?;
            if !seen.insert(config.key) {
                return Err(AppError::validation(format!(
                    "metric config '{}' appears more than once",
                    config.key
                )));
            }
        }

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::storage(format!("Failed to begin config transaction: {e}")))?;

        sqlx::query("DELETE FROM metric_configs")
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::storage(format!("Failed to clear metric configs: {e}")))?;

        for (position, config) in configs.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO metric_configs (key, position, label, unit, display_name, enabled)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(config.key.as_str())
            .bind(position as i64)
            .bind(&config.label)
            .bind(&config.unit)
            .bind(&config.display_name)
            .bind(config.enabled)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::storage(format!("Failed to store metric config '{}': {e}", config.key))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::storage(format!("Failed to commit metric configs: {e}")))?;

        debug!(count = configs.len(), "Stored metric configs");
        Ok(())
    }

    /// Stored metric configuration in saved order, or the factory defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not initialized or the query fails
    pub async fn metric_configs_impl(&self) -> AppResult<Vec<MetricConfig>> {
        let pool = self.pool()?;

        let rows = sqlx::query(
            "SELECT key, label, unit, display_name, enabled FROM metric_configs ORDER BY position ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to load metric configs: {e}")))?;

        if rows.is_empty() {
            return Ok(default_metric_configs());
        }

        rows.iter()
            .map(|row| {
                let key: String = row
                    .try_get("key")
                    .map_err(|e| AppError::storage(format!("Failed to read config key: {e}")))?;
                let key = key.parse::<MetricKey>()?;
                Ok(MetricConfig {
                    key,
                    label: row
                        .try_get("label")
                        .map_err(|e| AppError::storage(format!("Failed to read label: {e}")))?,
                    unit: row
                        .try_get("unit")
                        .map_err(|e| AppError::storage(format!("Failed to read unit: {e}")))?,
                    display_name: row.try_get("display_name").map_err(|e| {
                        AppError::storage(format!("Failed to read display_name: {e}"))
                    })?,
                    enabled: row
                        .try_get("enabled")
                        .map_err(|e| AppError::storage(format!("Failed to read enabled: {e}")))?,
                    element: key.element(),
                })
            })
            .collect()
    }
}
