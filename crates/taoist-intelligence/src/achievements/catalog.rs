// ABOUTME: Static catalog of the 18 cultivation achievements
// ABOUTME: Declarative rows only; evaluation lives in the category evaluator table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use taoist_core::models::{Achievement, AchievementCategory, AchievementTier};
use AchievementCategory::{Balance, Breakthrough, Diligence, Energy, Heart, Stress};
use AchievementTier::{Bronze, Gold, Silver, Special};

/// Static fields of one achievement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchievementDefinition {
    /// Stable key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// How to earn it
    pub description: &'static str,
    /// Evaluation rule selector
    pub category: AchievementCategory,
    /// Reward tier
    pub tier: AchievementTier,
    /// Emoji icon
    pub icon: &'static str,
    /// Target streak length, score, or stage ordinal
    pub requirement: f64,
    /// Day-average threshold for stress and energy streaks
    pub threshold: Option<f64>,
}

impl AchievementDefinition {
    /// Fresh, locked achievement state for this row
    #[must_use]
    pub fn instantiate(&self) -> Achievement {
        Achievement {
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            category: self.category,
            tier: self.tier,
            icon: self.icon.to_owned(),
            requirement: self.requirement,
            unlocked: false,
            unlocked_at: None,
            progress: 0.0,
            current_value: 0.0,
        }
    }
}

#[allow(clippy::too_many_arguments)]
const fn row(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: AchievementCategory,
    tier: AchievementTier,
    icon: &'static str,
    requirement: f64,
    threshold: Option<f64>,
) -> AchievementDefinition {
    AchievementDefinition {
        id,
        name,
        description,
        category,
        tier,
        icon,
        requirement,
        threshold,
    }
}

/// Every achievement, grouped by category in display order
#[rustfmt::skip]
pub static CATALOG: [AchievementDefinition; 18] = [
    row("diligence_1", "First Steps on the Path", "Record data 3 days in a row", Diligence, Bronze, "📝", 3.0, None),
    row("diligence_2", "Steady Practice", "Record data 7 days in a row", Diligence, Silver, "📆", 7.0, None),
    row("diligence_3", "Unshakable Dao Heart", "Record data 30 days in a row", Diligence, Gold, "🏅", 30.0, None),
    row("heart_1", "Harmonious Heart Qi", "Keep heart rate within 60-100 bpm for 3 days", Heart, Bronze, "❤️", 3.0, None),
    row("heart_2", "Master of the Heart Meridian", "Keep heart rate in the normal range for 14 days", Heart, Silver, "💓", 14.0, None),
    row("heart_3", "Heart Like Still Water", "Keep heart rate in the normal range for 30 days", Heart, Gold, "💖", 30.0, None),
    row("stress_1", "First Victory over Heart Demons", "Stress below 50 for 1 day", Stress, Bronze, "🧘", 1.0, Some(50.0)),
    row("stress_2", "Settled Dao Heart", "Stress below 50 for 7 days", Stress, Silver, "🧘‍♂️", 7.0, Some(50.0)),
    row("stress_3", "Heart Demons Subdued", "Stress below 40 for 14 days", Stress, Gold, "👑", 14.0, Some(40.0)),
    row("energy_1", "Gathering Spirit Qi", "Body battery above 70 for 1 day", Energy, Bronze, "⚡", 1.0, Some(70.0)),
    row("energy_2", "Flourishing Spirit Qi", "Body battery above 80 for 7 days", Energy, Silver, "🔋", 7.0, Some(80.0)),
    row("energy_3", "Overflowing Spirit Qi", "Body battery above 90 for 14 days", Energy, Gold, "✨", 14.0, Some(90.0)),
    row("balance_1", "First Attunement", "Five-elements balance score of 60 or more", Balance, Bronze, "☯️", 60.0, None),
    row("balance_2", "Five Elements in Harmony", "Five-elements balance score of 80 or more", Balance, Silver, "🌟", 80.0, None),
    row("balance_3", "Yin and Yang United", "Five-elements balance score of 90 or more", Balance, Gold, "💫", 90.0, None),
    row("breakthrough_1", "Foundation Established", "Reach the Foundation Establishment stage", Breakthrough, Special, "🏛️", 2.0, None),
    row("breakthrough_2", "Golden Core Formed", "Reach the Golden Core stage", Breakthrough, Special, "🟡", 3.0, None),
    row("breakthrough_3", "Nascent Soul Emerges", "Reach the Nascent Soul stage", Breakthrough, Special, "👶", 4.0, None),
];

/// Look up a catalog row by id
#[must_use]
pub fn definition(id: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|d| d.id == id)
}

/// Threshold for a streak category when the id is not in the catalog
#[must_use]
pub const fn default_threshold(category: AchievementCategory) -> Option<f64> {
    match category {
        Stress => Some(50.0),
        Energy => Some(70.0),
        Diligence | Heart | Balance | Breakthrough => None,
    }
}

/// All achievements in their initial locked state
#[must_use]
pub fn initialize_achievements() -> Vec<Achievement> {
    CATALOG.iter().map(AchievementDefinition::instantiate).collect()
}
