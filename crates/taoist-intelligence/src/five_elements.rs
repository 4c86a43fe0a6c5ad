// ABOUTME: Five-elements balance model computed from the enabled metric configs only
// ABOUTME: Normalizes each enabled metric to 0-100, averages per element, scores the spread
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors
#![allow(clippy::cast_precision_loss)] // Safe: at most 12 contributors per element

use serde::{Deserialize, Serialize};
use std::array;
use std::collections::{BTreeMap, HashSet};
use taoist_core::constants::five_elements;
use taoist_core::models::{Element, ExtendedHealthMetrics, MetricConfig, MetricKey};

/// Linear normalization bounds for one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationRange {
    /// Value mapped to 0
    pub min: f64,
    /// Value mapped to 100
    pub max: f64,
    /// Lower is better; the scale is flipped
    pub inverse: bool,
}

/// Fixed normalization table
#[must_use]
pub const fn normalization_range(key: MetricKey) -> NormalizationRange {
    let (min, max, inverse) = match key {
        MetricKey::Calories => (0.0, 2_500.0, false),
        MetricKey::Hrv => (10.0, 60.0, false),
        MetricKey::Stress => (0.0, 100.0, true),
        MetricKey::SleepHours => (4.0, 9.0, false),
        MetricKey::HeartRate => (50.0, 120.0, true),
        MetricKey::Oxygen => (90.0, 100.0, false),
        MetricKey::Temp => (35.0, 38.0, false),
        MetricKey::Steps => (0.0, 12_000.0, false),
        MetricKey::Vo2Max => (20.0, 60.0, false),
        MetricKey::RestingHeartRate => (50.0, 80.0, true),
        MetricKey::RespiratoryRate => (12.0, 20.0, true),
        MetricKey::BodyBattery => (0.0, 100.0, false),
    };
    NormalizationRange { min, max, inverse }
}

/// Map a raw value onto `[0, 100]`, flipping the scale for inverse metrics
#[must_use]
pub fn normalize(value: f64, range: NormalizationRange) -> f64 {
    let scaled = ((value - range.min) / (range.max - range.min) * 100.0).clamp(0.0, 100.0);
    if range.inverse {
        100.0 - scaled
    } else {
        scaled
    }
}

/// Per-element average and how many enabled metrics fed it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementScore {
    /// Average normalized score, or 50 with no contributors
    pub score: f64,
    /// Number of enabled metrics mapped to this element
    pub contributors: usize,
}

/// Balance model output; recomputed on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveElementsInsight {
    /// `100 - population stddev` of the contributing element scores
    pub score: f64,
    /// Highest-scoring contributing element
    pub dominant: Element,
    /// Lowest-scoring contributing element
    pub weak: Element,
    /// Score of every element
    pub balance: BTreeMap<Element, f64>,
    /// Advice selected from the weak or dominant element
    pub advice: String,
}

/// Score every element from the enabled configs.
///
/// Configs are deduplicated by key; element membership comes from the fixed
/// metric table, never from the config itself.
#[must_use]
pub fn element_scores(
    metrics: &ExtendedHealthMetrics,
    configs: &[MetricConfig],
) -> [ElementScore; 5] {
    let mut totals = [0.0_f64; 5];
    let mut counts = [0_usize; 5];
    let mut seen = HashSet::new();

    for config in configs.iter().filter(|c| c.enabled) {
        if !seen.insert(config.key) {
            continue;
        }
        let slot = config.key.element().index();
        totals[slot] += normalize(metrics.get(config.key), normalization_range(config.key));
        counts[slot] += 1;
    }

    array::from_fn(|i| ElementScore {
        score: if counts[i] > 0 {
            totals[i] / counts[i] as f64
        } else {
            five_elements::NEUTRAL_SCORE
        },
        contributors: counts[i],
    })
}

/// Compute the five-elements insight from the current metrics and configs.
///
/// Elements without an enabled metric report the neutral score 50 and are left
/// out of dominant/weak selection and of the spread. Ties resolve to the
/// earliest element in [`Element::ALL`].
#[must_use]
pub fn compute_insight(metrics: &ExtendedHealthMetrics, configs: &[MetricConfig]) -> FiveElementsInsight {
    let scores = element_scores(metrics, configs);

    let active: Vec<Element> = Element::ALL
        .into_iter()
        .filter(|e| scores[e.index()].contributors > 0)
        .collect();
    let score_of = |e: Element| scores[e.index()].score;

    let mut dominant = active.first().copied().unwrap_or(Element::Metal);
    let mut weak = dominant;
    for element in active.iter().copied() {
        if score_of(element) > score_of(dominant) {
            dominant = element;
        }
        if score_of(element) < score_of(weak) {
            weak = element;
        }
    }

    let balance_score = if active.is_empty() {
        100.0
    } else {
        let n = active.len() as f64;
        let mean = active.iter().map(|e| score_of(*e)).sum::<f64>() / n;
        let variance = active
            .iter()
            .map(|e| (score_of(*e) - mean).powi(2))
            .sum::<f64>()
            / n;
        (100.0 - variance.sqrt()).clamp(0.0, 100.0)
    };

    let advice = if score_of(weak) < five_elements::DEFICIENT_BELOW {
        deficient_advice(weak)
    } else if score_of(dominant) > five_elements::EXCESS_ABOVE {
        excess_advice(dominant)
    } else {
        "The five elements are in relative balance; keep your current practice"
    };

    FiveElementsInsight {
        score: balance_score,
        dominant,
        weak,
        balance: Element::ALL.into_iter().map(|e| (e, score_of(e))).collect(),
        advice: advice.to_owned(),
    }
}

const fn excess_advice(element: Element) -> &'static str {
    match element {
        Element::Fire => {
            "Heart fire burns too hot; calm the mind. Meditate longer and ease off intense training."
        }
        Element::Water => "Kidney water is abundant and rest is ample. Keep your good sleep habits.",
        Element::Wood => "Liver wood is harmonious and emotions are steady. Keep this state of mind.",
        Element::Metal => "Lung metal is full and breathing runs deep. Qi and blood flow freely.",
        Element::Earth => "Spleen earth is solid and the foundation firm. Daily activity is plentiful.",
    }
}

const fn deficient_advice(element: Element) -> &'static str {
    match element {
        Element::Fire => {
            "Heart fire is weak and energy runs low. Add aerobic exercise to wake the body."
        }
        Element::Water => {
            "Kidney water is lacking and the spirit drifts. Deepen sleep and rest before midnight."
        }
        Element::Wood => {
            "Liver wood is out of balance under stress. Try gentle stretching to settle emotions."
        }
        Element::Metal => {
            "Lung metal is depleted and breathing shallow. Practice belly breathing outdoors."
        }
        Element::Earth => {
            "Spleen earth is weak from too little movement. Walk more and build an exercise habit."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taoist_core::models::default_metric_configs;

    fn all_enabled() -> Vec<MetricConfig> {
        default_metric_configs()
            .into_iter()
            .map(|mut c| {
                c.enabled = true;
                c
            })
            .collect()
    }

    #[test]
    fn test_normalize_clamps_and_inverts() {
        let stress = normalization_range(MetricKey::Stress);
        assert!((normalize(30.0, stress) - 70.0).abs() < 1e-12);
        let steps = normalization_range(MetricKey::Steps);
        assert!((normalize(50_000.0, steps) - 100.0).abs() < f64::EPSILON);
        assert!(normalize(-10.0, steps).abs() < f64::EPSILON);
    }

    #[test]
    fn test_disabled_element_is_neutral_and_excluded() {
        let metrics = ExtendedHealthMetrics {
            sleep_hours: 4.0,
            ..ExtendedHealthMetrics::default()
        };
        let mut configs = all_enabled();
        let with_water = compute_insight(&metrics, &configs);
        assert_eq!(with_water.weak, Element::Water);

        for config in &mut configs {
            if config.key.element() == Element::Water {
                config.enabled = false;
            }
        }
        let without_water = compute_insight(&metrics, &configs);
        assert!((without_water.balance[&Element::Water] - 50.0).abs() < f64::EPSILON);
        assert_ne!(without_water.weak, Element::Water);
        assert_ne!(without_water.dominant, Element::Water);

        // Re-enabling reproduces the first result exactly
        let again = compute_insight(&metrics, &all_enabled());
        assert_eq!(again, with_water);
    }

    #[test]
    fn test_no_enabled_metrics() {
        let insight = compute_insight(&ExtendedHealthMetrics::default(), &[]);
        assert!((insight.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(insight.dominant, Element::Metal);
        assert_eq!(insight.weak, Element::Metal);
        assert!(insight.balance.values().all(|s| (s - 50.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_duplicate_configs_count_once() {
        let steps = default_metric_configs()
            .into_iter()
            .find(|c| c.key == MetricKey::Steps)
            .unwrap();
        let scores = element_scores(
            &ExtendedHealthMetrics::default(),
            &[steps.clone(), steps],
        );
        assert_eq!(scores[Element::Earth.index()].contributors, 1);
    }

    #[test]
    fn test_ties_resolve_in_declaration_order() {
        // Oxygen 95 -> 50, sleep 6.5 -> 50: Metal and Water tie
        let metrics = ExtendedHealthMetrics {
            oxygen: 95.0,
            sleep_hours: 6.5,
            ..ExtendedHealthMetrics::default()
        };
        let configs: Vec<MetricConfig> = all_enabled()
            .into_iter()
            .filter(|c| matches!(c.key, MetricKey::Oxygen | MetricKey::SleepHours))
            .collect();
        let insight = compute_insight(&metrics, &configs);
        assert_eq!(insight.dominant, Element::Metal);
        assert_eq!(insight.weak, Element::Metal);
        assert!((insight.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_advice_rules() {
        let low_sleep = ExtendedHealthMetrics {
            sleep_hours: 4.0,
            ..ExtendedHealthMetrics::default()
        };
        let insight = compute_insight(&low_sleep, &all_enabled());
        assert_eq!(insight.advice, deficient_advice(Element::Water));

        let only_battery: Vec<MetricConfig> = all_enabled()
            .into_iter()
            .filter(|c| c.key == MetricKey::BodyBattery)
            .collect();
        let full = ExtendedHealthMetrics {
            body_battery: 95.0,
            ..ExtendedHealthMetrics::default()
        };
        let insight = compute_insight(&full, &only_battery);
        assert_eq!(insight.dominant, Element::Earth);
        assert_eq!(insight.advice, excess_advice(Element::Earth));
    }
}
