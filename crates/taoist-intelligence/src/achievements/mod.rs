// ABOUTME: Pure achievement reducer dispatching on category through a table of evaluator functions
// ABOUTME: Unlocks are append-only and stamped once; also summarizes unlock statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

/// Static achievement catalog
pub mod catalog;

/// Trailing-day streak helpers
pub mod streaks;

pub use catalog::{definition, initialize_achievements, AchievementDefinition, CATALOG};
pub use streaks::{
    aggregate_by_day, count_consecutive_days, count_consecutive_high_days,
    count_consecutive_in_range_days, count_consecutive_low_days, count_recorded_days,
    DailyAverage,
};

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use taoist_core::constants::achievements;
use taoist_core::models::{Achievement, AchievementCategory, CultivationLevel, MetricSample};

/// Everything the evaluators read; borrowed for the duration of one check
#[derive(Debug, Clone, Copy)]
pub struct AchievementInputs<'a> {
    /// Trailing streak of days with any recorded data
    pub consecutive_days: u32,
    /// Heart rate samples
    pub heart_history: &'a [MetricSample],
    /// Stress samples
    pub stress_history: &'a [MetricSample],
    /// Body battery samples
    pub energy_history: &'a [MetricSample],
    /// Current five-elements balance score
    pub five_elements_score: f64,
    /// Current cultivation level
    pub level: &'a CultivationLevel,
}

/// Result of evaluating one achievement against the inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Value compared with the requirement
    pub current_value: f64,
    /// Whether the requirement is met right now
    pub met: bool,
}

/// Per-row parameters the evaluators need
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    /// Target value
    pub requirement: f64,
    /// Day-average threshold for stress and energy
    pub threshold: Option<f64>,
}

/// Category evaluation strategy
pub type Evaluator = fn(&Rule, &AchievementInputs<'_>) -> Evaluation;

/// Evaluator for a category
#[must_use]
pub const fn evaluator_for(category: AchievementCategory) -> Evaluator {
    match category {
        AchievementCategory::Diligence => evaluate_diligence,
        AchievementCategory::Heart => evaluate_heart,
        AchievementCategory::Stress => evaluate_stress,
        AchievementCategory::Energy => evaluate_energy,
        AchievementCategory::Balance => evaluate_balance,
        AchievementCategory::Breakthrough => evaluate_breakthrough,
    }
}

fn streak(value: u32, rule: &Rule) -> Evaluation {
    let current_value = f64::from(value);
    Evaluation {
        current_value,
        met: current_value >= rule.requirement,
    }
}

fn evaluate_diligence(rule: &Rule, inputs: &AchievementInputs<'_>) -> Evaluation {
    streak(inputs.consecutive_days, rule)
}

fn evaluate_heart(rule: &Rule, inputs: &AchievementInputs<'_>) -> Evaluation {
    let days = count_consecutive_in_range_days(
        inputs.heart_history,
        achievements::HEART_RATE_MIN,
        achievements::HEART_RATE_MAX,
    );
    streak(days, rule)
}

fn evaluate_stress(rule: &Rule, inputs: &AchievementInputs<'_>) -> Evaluation {
    let threshold = rule
        .threshold
        .or_else(|| catalog::default_threshold(AchievementCategory::Stress))
        .unwrap_or_default();
    streak(count_consecutive_low_days(inputs.stress_history, threshold), rule)
}

fn evaluate_energy(rule: &Rule, inputs: &AchievementInputs<'_>) -> Evaluation {
    let threshold = rule
        .threshold
        .or_else(|| catalog::default_threshold(AchievementCategory::Energy))
        .unwrap_or_default();
    streak(count_consecutive_high_days(inputs.energy_history, threshold), rule)
}

fn evaluate_balance(rule: &Rule, inputs: &AchievementInputs<'_>) -> Evaluation {
    Evaluation {
        current_value: inputs.five_elements_score,
        met: inputs.five_elements_score >= rule.requirement,
    }
}

fn evaluate_breakthrough(rule: &Rule, inputs: &AchievementInputs<'_>) -> Evaluation {
    streak(inputs.level.stage.ordinal(), rule)
}

/// Output of one reducer pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementCheck {
    /// Updated state of every input achievement, same order
    pub achievements: Vec<Achievement>,
    /// Achievements that flipped from locked to unlocked in this pass
    pub new_unlocks: Vec<Achievement>,
}

/// Re-evaluate every achievement.
///
/// `progress` and `current_value` are recomputed on each pass. `unlocked` is
/// only ever set, and `unlocked_at` is stamped with `now_ms` on the pass that
/// sets it. Running the same inputs twice yields no new unlocks the second time.
#[must_use]
pub fn check_all_achievements(
    current: &[Achievement],
    inputs: &AchievementInputs<'_>,
    now_ms: i64,
) -> AchievementCheck {
    let mut new_unlocks = Vec::new();

    let achievements = current
        .iter()
        .map(|achievement| {
            let rule = Rule {
                requirement: achievement.requirement,
                threshold: definition(&achievement.id).and_then(|d| d.threshold),
            };
            let evaluation = evaluator_for(achievement.category)(&rule, inputs);

            let newly_unlocked = !achievement.unlocked && evaluation.met;
            let updated = Achievement {
                unlocked: achievement.unlocked || evaluation.met,
                unlocked_at: if newly_unlocked {
                    Some(now_ms)
                } else {
                    achievement.unlocked_at
                },
                progress: progress(evaluation.current_value, achievement.requirement),
                current_value: evaluation.current_value,
                ..achievement.clone()
            };

            if newly_unlocked {
                tracing::info!(
                    achievement_id = %updated.id,
                    category = %updated.category,
                    "Achievement unlocked"
                );
                new_unlocks.push(updated.clone());
            }
            updated
        })
        .collect();

    AchievementCheck {
        achievements,
        new_unlocks,
    }
}

/// `min(100, 100 * current / requirement)`; a non-positive requirement counts as met
#[must_use]
pub fn progress(current_value: f64, requirement: f64) -> f64 {
    if requirement <= 0.0 {
        return 100.0;
    }
    (100.0 * current_value / requirement).clamp(0.0, 100.0)
}

/// Totals for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    /// Achievements in the category
    pub total: usize,
    /// Of which unlocked
    pub unlocked: usize,
}

/// Unlock summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStats {
    /// Number of achievements
    pub total: usize,
    /// Number unlocked
    pub unlocked: usize,
    /// Totals per category
    pub by_category: BTreeMap<AchievementCategory, CategoryProgress>,
    /// Up to three most recent unlocks, newest first
    pub recent_unlocks: Vec<Achievement>,
}

/// Summarize unlock counts and the most recent unlocks
#[must_use]
pub fn achievement_stats(all: &[Achievement]) -> AchievementStats {
    let mut by_category: BTreeMap<AchievementCategory, CategoryProgress> = AchievementCategory::ALL
        .into_iter()
        .map(|c| (c, CategoryProgress::default()))
        .collect();

    for achievement in all {
        let entry = by_category.entry(achievement.category).or_default();
        entry.total += 1;
        if achievement.unlocked {
            entry.unlocked += 1;
        }
    }

    let mut recent: Vec<&Achievement> = all
        .iter()
        .filter(|a| a.unlocked && a.unlocked_at.is_some())
        .collect();
    recent.sort_by_key(|a| Reverse(a.unlocked_at));

    AchievementStats {
        total: all.len(),
        unlocked: all.iter().filter(|a| a.unlocked).count(),
        by_category,
        recent_unlocks: recent
            .into_iter()
            .take(achievements::RECENT_UNLOCKS)
            .cloned()
            .collect(),
    }
}
