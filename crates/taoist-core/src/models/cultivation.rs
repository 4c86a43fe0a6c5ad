// ABOUTME: Cultivation stage ordering and level state read by the predictor and achievements
// ABOUTME: Enforces the 0 <= current_exp <= max_exp and layer >= 1 invariants on construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cultivation stage, totally ordered by declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CultivationStage {
    /// 炼气期
    QiRefining,
    /// 筑基期
    Foundation,
    /// 金丹期
    GoldenCore,
    /// 元婴期
    NascentSoul,
}

impl CultivationStage {
    /// All stages in progression order
    pub const ALL: [Self; 4] = [
        Self::QiRefining,
        Self::Foundation,
        Self::GoldenCore,
        Self::NascentSoul,
    ];

    /// 1-indexed position in the progression
    #[must_use]
    pub const fn ordinal(self) -> u32 {
        match self {
            Self::QiRefining => 1,
            Self::Foundation => 2,
            Self::GoldenCore => 3,
            Self::NascentSoul => 4,
        }
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QiRefining => "qi-refining",
            Self::Foundation => "foundation",
            Self::GoldenCore => "golden-core",
            Self::NascentSoul => "nascent-soul",
        }
    }
}

impl fmt::Display for CultivationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CultivationStage {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("unknown cultivation stage '{s}'")))
    }
}

/// Progression state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CultivationLevel {
    /// Current stage
    pub stage: CultivationStage,
    /// Layer within the stage, starting at 1
    pub layer: u32,
    /// Experience accumulated in this layer
    pub current_exp: f64,
    /// Experience needed to break through
    pub max_exp: f64,
    /// Display title
    pub title: String,
}

impl CultivationLevel {
    /// Build a level, validating its invariants
    ///
    /// # Errors
    ///
    /// Returns a validation error if `layer` is 0 or experience is outside `0..=max_exp`
    pub fn new(
        stage: CultivationStage,
        layer: u32,
        current_exp: f64,
        max_exp: f64,
        title: impl Into<String>,
    ) -> AppResult<Self> {
        let level = Self {
            stage,
            layer,
            current_exp,
            max_exp,
            title: title.into(),
        };
        level.validate()?;
        Ok(level)
    }

    /// Check invariants on a level that came from outside (storage, import)
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the broken invariant
    pub fn validate(&self) -> AppResult<()> {
        if self.layer == 0 {
            return Err(AppError::validation("cultivation layer must be at least 1"));
        }
        if !self.max_exp.is_finite() || self.max_exp < 0.0 {
            return Err(AppError::validation(format!(
                "max_exp must be a non-negative number, got {}",
                self.max_exp
            )));
        }
        if !(0.0..=self.max_exp).contains(&self.current_exp) {
            return Err(AppError::validation(format!(
                "current_exp {} outside 0..={}",
                self.current_exp, self.max_exp
            )));
        }
        Ok(())
    }

    /// Experience still needed for the next breakthrough
    #[must_use]
    pub fn remaining_exp(&self) -> f64 {
        (self.max_exp - self.current_exp).max(0.0)
    }
}

impl Default for CultivationLevel {
    fn default() -> Self {
        Self {
            stage: CultivationStage::QiRefining,
            layer: 1,
            current_exp: 0.0,
            max_exp: 200.0,
            title: "Outer Disciple".to_owned(),
        }
    }
}
