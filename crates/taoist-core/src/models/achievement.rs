// ABOUTME: Achievement state records and their category and tier enums
// ABOUTME: Mutable fields (unlocked, unlocked_at, progress, current_value) only ever move forward
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Achievement category; selects the evaluation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    /// Consecutive recording days
    Diligence,
    /// Heart rate kept in the normal band
    Heart,
    /// Low stress streak
    Stress,
    /// High body battery streak
    Energy,
    /// Five-elements balance score
    Balance,
    /// Cultivation stage reached
    Breakthrough,
}

impl AchievementCategory {
    /// All categories in display order
    pub const ALL: [Self; 6] = [
        Self::Diligence,
        Self::Heart,
        Self::Stress,
        Self::Energy,
        Self::Balance,
        Self::Breakthrough,
    ];
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Diligence => "diligence",
            Self::Heart => "heart",
            Self::Stress => "stress",
            Self::Energy => "energy",
            Self::Balance => "balance",
            Self::Breakthrough => "breakthrough",
        };
        f.write_str(name)
    }
}

/// Reward tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementTier {
    /// Entry tier
    Bronze,
    /// Middle tier
    Silver,
    /// Top tier
    Gold,
    /// Stage breakthroughs
    Special,
}

/// Catalog fields plus per-user progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    /// Stable catalog key
    pub id: String,
    /// Display name
    pub name: String,
    /// How to earn it
    pub description: String,
    /// Evaluation rule selector
    pub category: AchievementCategory,
    /// Reward tier
    pub tier: AchievementTier,
    /// Emoji icon
    pub icon: String,
    /// Target value (days, score, or stage ordinal)
    pub requirement: f64,
    /// Set once, never cleared
    pub unlocked: bool,
    /// Epoch ms of the first unlock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<i64>,
    /// `0..=100`
    pub progress: f64,
    /// Last evaluated value
    pub current_value: f64,
}
