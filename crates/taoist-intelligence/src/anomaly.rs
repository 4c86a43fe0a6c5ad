// ABOUTME: Two-stage anomaly classification: physiological reference range, then z-score and IQR
// ABOUTME: Each metric and direction maps to a fixed cultivation-themed description and recommendation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use crate::statistics::MetricStatistics;
use serde::{Deserialize, Serialize};
use taoist_core::constants::anomaly;
use taoist_core::models::MetricKey;

/// How far outside its expected range a value sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    /// Relative deviation up to 15%
    Mild,
    /// Relative deviation above 15%
    Moderate,
    /// Relative deviation above 30%
    Severe,
}

/// Which stage flagged the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Fixed physiological range
    Range,
    /// Z-score against the window statistics
    Statistical,
    /// Median-centred interquartile fence
    Iqr,
}

/// Classification of one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAlert {
    /// Whether any stage flagged the value
    pub detected: bool,
    /// Present only when `detected`
    pub severity: Option<AnomalySeverity>,
    /// Metric classified
    pub metric: MetricKey,
    /// Value classified
    pub current_value: f64,
    /// `[low, high]` bounds the value was compared against
    pub expected_range: [f64; 2],
    /// Cultivation-themed summary
    pub description: String,
    /// Suggested action
    pub recommendation: String,
    /// Z-score, when the statistical stage computed a finite one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    /// Stage that flagged the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<DetectionMethod>,
}

/// Physiological normal range for a metric
#[must_use]
pub const fn reference_range(key: MetricKey) -> [f64; 2] {
    match key {
        MetricKey::HeartRate => [60.0, 100.0],
        MetricKey::Steps => [5_000.0, 15_000.0],
        MetricKey::Calories => [1_200.0, 3_000.0],
        MetricKey::SleepHours => [6.0, 9.0],
        MetricKey::Stress => [20.0, 60.0],
        MetricKey::Hrv => [20.0, 80.0],
        MetricKey::RespiratoryRate => [12.0, 20.0],
        MetricKey::BodyBattery => [30.0, 100.0],
        MetricKey::Oxygen => [95.0, 100.0],
        MetricKey::Temp => [36.0, 37.5],
        MetricKey::Vo2Max => [30.0, 60.0],
        MetricKey::RestingHeartRate => [50.0, 80.0],
    }
}

struct AnomalyMessages {
    high: &'static str,
    low: &'static str,
    advice_high: &'static str,
    advice_low: &'static str,
}

const fn messages(key: MetricKey) -> AnomalyMessages {
    let (high, low, advice_high, advice_low) = match key {
        MetricKey::HeartRate => (
            "Heart meridian racing; signs of qi deviation",
            "Heart meridian sluggish; spirit qi flows poorly",
            "Stop training at once and sit in breathing meditation",
            "Add light movement to get qi and blood flowing",
        ),
        MetricKey::Stress => (
            "Heart demons intrude; stress overload",
            "Dao heart is calm and untroubled",
            "Pause cultivation and meditate for an hour",
            "Keep this peaceful state of mind",
        ),
        MetricKey::Hrv => (
            "Dao heart fluctuates too strongly",
            "Dao heart unsteady; adjustment needed",
            "Rest properly and avoid over-training",
            "Practice deep breathing to settle the spirit",
        ),
        MetricKey::BodyBattery => (
            "Spirit qi overflowing; excellent condition",
            "Spirit qi depleted; rest urgently",
            "A good moment to challenge a bottleneck",
            "Sleep more and take nourishing food",
        ),
        MetricKey::SleepHours => (
            "Too much sleep; qi may stagnate",
            "Too little sleep; vital essence drained",
            "Add more daytime activity",
            "Adjust your schedule to sleep 7-8 hours",
        ),
        MetricKey::Steps => (
            "Over-exertion is burning spirit qi",
            "Too little movement; qi and blood stagnate",
            "Rest properly and avoid exhaustion",
            "Walk more each day to loosen sinews and bones",
        ),
        MetricKey::RespiratoryRate => (
            "Breathing hurried; inner breath unsteady",
            "Breathing slow; qi may be deficient",
            "Slow the breathing rhythm with deep breaths",
            "Strengthen heart and lung training",
        ),
        MetricKey::Calories => (
            "Energy intake excessive",
            "Energy too low to sustain cultivation",
            "Control diet and add exercise",
            "Increase nutritional intake",
        ),
        MetricKey::Oxygen => (
            "Blood oxygen abundant",
            "Blood oxygen low; seek fresh air",
            "Condition is good",
            "Breathe deeply and move outdoors",
        ),
        MetricKey::Temp => (
            "Body temperature elevated",
            "Body temperature low",
            "Cool down and rest",
            "Keep warm",
        ),
        MetricKey::Vo2Max => (
            "Aerobic capacity excellent",
            "Aerobic capacity needs work",
            "Maintain training intensity",
            "Add aerobic training",
        ),
        MetricKey::RestingHeartRate => (
            "Resting heart rate elevated",
            "Resting heart rate low",
            "Rest more and reduce stress",
            "Condition is good",
        ),
    };
    AnomalyMessages {
        high,
        low,
        advice_high,
        advice_low,
    }
}

const NORMAL_DESCRIPTION: &str = "Metric is normal; cultivation proceeds smoothly";
const NORMAL_RECOMMENDATION: &str = "Keep the current cultivation rhythm";

/// Stateless anomaly detector
pub struct AnomalyDetector;

impl AnomalyDetector {
    /// Classify `current_value` for `metric_key`.
    ///
    /// The reference range is checked first. Only a value inside it goes on to
    /// the statistical stage, which runs when `stats` holds at least 10 samples:
    /// a z-score above 2.5 reports the `mean ± 2σ` range, otherwise values
    /// outside `median ± 1.5 · (1.35σ)` are flagged. The first match wins.
    #[must_use]
    pub fn detect_anomaly(
        metric_key: MetricKey,
        current_value: f64,
        stats: Option<&MetricStatistics>,
    ) -> AnomalyAlert {
        let range = reference_range(metric_key);
        if current_value < range[0] || current_value > range[1] {
            return Self::alert(metric_key, current_value, range, DetectionMethod::Range, None);
        }

        if let Some(stats) = stats.filter(|s| s.count >= anomaly::MIN_STATISTICAL_SAMPLES) {
            let z_score = (current_value - stats.mean) / stats.std_dev;
            if z_score.abs() > anomaly::Z_SCORE_THRESHOLD {
                let spread = anomaly::EXPECTED_RANGE_SIGMAS * stats.std_dev;
                return Self::alert(
                    metric_key,
                    current_value,
                    [stats.mean - spread, stats.mean + spread],
                    DetectionMethod::Statistical,
                    Some(z_score).filter(|z| z.is_finite()),
                );
            }

            let fence = anomaly::IQR_FENCE * anomaly::IQR_STDDEV_FACTOR * stats.std_dev;
            let bounds = [stats.median - fence, stats.median + fence];
            if current_value < bounds[0] || current_value > bounds[1] {
                return Self::alert(metric_key, current_value, bounds, DetectionMethod::Iqr, None);
            }
        }

        AnomalyAlert {
            detected: false,
            severity: None,
            metric: metric_key,
            current_value,
            expected_range: range,
            description: NORMAL_DESCRIPTION.to_owned(),
            recommendation: NORMAL_RECOMMENDATION.to_owned(),
            z_score: None,
            method: None,
        }
    }

    /// Severity from the relative deviation past the violated bound
    #[must_use]
    pub fn severity(current_value: f64, expected_range: [f64; 2]) -> AnomalySeverity {
        let [low, high] = expected_range;
        let (excess, bound) = if current_value > high {
            (current_value - high, high)
        } else {
            (low - current_value, low)
        };

        if bound.abs() < f64::EPSILON {
            return AnomalySeverity::Severe;
        }

        let deviation = excess / bound.abs();
        if deviation > anomaly::SEVERE_DEVIATION {
            AnomalySeverity::Severe
        } else if deviation > anomaly::MODERATE_DEVIATION {
            AnomalySeverity::Moderate
        } else {
            AnomalySeverity::Mild
        }
    }

    fn alert(
        metric_key: MetricKey,
        current_value: f64,
        expected_range: [f64; 2],
        method: DetectionMethod,
        z_score: Option<f64>,
    ) -> AnomalyAlert {
        let is_high = current_value > expected_range[1];
        let text = messages(metric_key);
        let (description, recommendation) = if is_high {
            (text.high, text.advice_high)
        } else {
            (text.low, text.advice_low)
        };

        AnomalyAlert {
            detected: true,
            severity: Some(Self::severity(current_value, expected_range)),
            metric: metric_key,
            current_value,
            expected_range,
            description: description.to_owned(),
            recommendation: recommendation.to_owned(),
            z_score,
            method: Some(method),
        }
    }
}
