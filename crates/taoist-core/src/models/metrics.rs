// ABOUTME: Health metric keys, samples, daily snapshots, and metric display configuration
// ABOUTME: Includes the fixed metric-to-element table used by the five-elements model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tracked health metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    /// Active calories burned (kcal), the source of Qi
    Calories,
    /// Heart rate variability (ms)
    Hrv,
    /// Stress index (0-100)
    Stress,
    /// Sleep duration (hours)
    SleepHours,
    /// Current heart rate (bpm)
    HeartRate,
    /// Blood oxygen saturation (%)
    Oxygen,
    /// Body temperature (°C)
    Temp,
    /// Daily steps
    Steps,
    /// VO2 max (ml/kg/min)
    Vo2Max,
    /// Resting heart rate (bpm)
    RestingHeartRate,
    /// Breaths per minute
    RespiratoryRate,
    /// Body battery (0-100)
    BodyBattery,
}

impl MetricKey {
    /// Every metric in declaration order
    pub const ALL: [Self; 12] = [
        Self::Calories,
        Self::Hrv,
        Self::Stress,
        Self::SleepHours,
        Self::HeartRate,
        Self::Oxygen,
        Self::Temp,
        Self::Steps,
        Self::Vo2Max,
        Self::RestingHeartRate,
        Self::RespiratoryRate,
        Self::BodyBattery,
    ];

    /// Wire name (matches the serde representation)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Hrv => "hrv",
            Self::Stress => "stress",
            Self::SleepHours => "sleepHours",
            Self::HeartRate => "heartRate",
            Self::Oxygen => "oxygen",
            Self::Temp => "temp",
            Self::Steps => "steps",
            Self::Vo2Max => "vo2Max",
            Self::RestingHeartRate => "restingHeartRate",
            Self::RespiratoryRate => "respiratoryRate",
            Self::BodyBattery => "bodyBattery",
        }
    }

    /// Fixed five-elements category of this metric
    #[must_use]
    pub const fn element(self) -> Element {
        match self {
            Self::Oxygen | Self::Vo2Max | Self::RespiratoryRate => Element::Metal,
            Self::Hrv | Self::RestingHeartRate => Element::Wood,
            Self::SleepHours => Element::Water,
            Self::Calories | Self::Stress | Self::HeartRate | Self::Temp => Element::Fire,
            Self::Steps | Self::BodyBattery => Element::Earth,
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("unknown metric key '{s}'")))
    }
}

/// The five categories of the balance model, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// 金, lung function
    Metal,
    /// 木, liver and emotional regulation
    Wood,
    /// 水, kidney and recovery
    Water,
    /// 火, heart and energy
    Fire,
    /// 土, spleen and stability
    Earth,
}

impl Element {
    /// Declaration order; ties in dominant/weak selection resolve to the earliest
    pub const ALL: [Self; 5] = [
        Self::Metal,
        Self::Wood,
        Self::Water,
        Self::Fire,
        Self::Earth,
    ];

    /// Position in [`Element::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Metal => "metal",
            Self::Wood => "wood",
            Self::Water => "water",
            Self::Fire => "fire",
            Self::Earth => "earth",
        };
        f.write_str(name)
    }
}

/// Full metric vector for one moment or one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedHealthMetrics {
    /// Active calories (kcal)
    pub calories: f64,
    /// Heart rate variability (ms)
    pub hrv: f64,
    /// Stress index (0-100)
    pub stress: f64,
    /// Sleep duration (hours)
    pub sleep_hours: f64,
    /// Heart rate (bpm)
    pub heart_rate: f64,
    /// Blood oxygen (%)
    pub oxygen: f64,
    /// Body temperature (°C)
    pub temp: f64,
    /// Steps
    pub steps: f64,
    /// VO2 max (ml/kg/min)
    pub vo2_max: f64,
    /// Resting heart rate (bpm)
    pub resting_heart_rate: f64,
    /// Respiratory rate (breaths/min)
    pub respiratory_rate: f64,
    /// Body battery (0-100)
    pub body_battery: f64,
}

impl Default for ExtendedHealthMetrics {
    fn default() -> Self {
        Self {
            calories: 1600.0,
            hrv: 24.0,
            stress: 71.0,
            sleep_hours: 7.6,
            heart_rate: 87.0,
            oxygen: 96.0,
            temp: 36.7,
            steps: 8500.0,
            vo2_max: 42.0,
            resting_heart_rate: 62.0,
            respiratory_rate: 16.0,
            body_battery: 75.0,
        }
    }
}

impl ExtendedHealthMetrics {
    /// Read one metric
    #[must_use]
    pub const fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Calories => self.calories,
            MetricKey::Hrv => self.hrv,
            MetricKey::Stress => self.stress,
            MetricKey::SleepHours => self.sleep_hours,
            MetricKey::HeartRate => self.heart_rate,
            MetricKey::Oxygen => self.oxygen,
            MetricKey::Temp => self.temp,
            MetricKey::Steps => self.steps,
            MetricKey::Vo2Max => self.vo2_max,
            MetricKey::RestingHeartRate => self.resting_heart_rate,
            MetricKey::RespiratoryRate => self.respiratory_rate,
            MetricKey::BodyBattery => self.body_battery,
        }
    }

    /// Overwrite one metric
    pub fn set(&mut self, key: MetricKey, value: f64) {
        let slot = match key {
            MetricKey::Calories => &mut self.calories,
            MetricKey::Hrv => &mut self.hrv,
            MetricKey::Stress => &mut self.stress,
            MetricKey::SleepHours => &mut self.sleep_hours,
            MetricKey::HeartRate => &mut self.heart_rate,
            MetricKey::Oxygen => &mut self.oxygen,
            MetricKey::Temp => &mut self.temp,
            MetricKey::Steps => &mut self.steps,
            MetricKey::Vo2Max => &mut self.vo2_max,
            MetricKey::RestingHeartRate => &mut self.resting_heart_rate,
            MetricKey::RespiratoryRate => &mut self.respiratory_rate,
            MetricKey::BodyBattery => &mut self.body_battery,
        };
        *slot = value;
    }

    /// Reject NaN and infinite values
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first non-finite metric
    pub fn validate(&self) -> AppResult<()> {
        match MetricKey::ALL.into_iter().find(|key| !self.get(*key).is_finite()) {
            Some(key) => Err(AppError::validation(format!(
                "metric '{key}' must be a finite number"
            ))),
            None => Ok(()),
        }
    }
}

/// Where a sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SampleSource {
    /// Entered by the user
    Manual,
    /// Read from a wearable
    Sensor,
    /// Produced by the simulation feeder
    #[default]
    Simulated,
    /// Loaded from an import file without an explicit source
    Imported,
}

impl SampleSource {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Sensor => "sensor",
            Self::Simulated => "simulated",
            Self::Imported => "imported",
        }
    }
}

impl FromStr for SampleSource {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "manual" => Ok(Self::Manual),
            "sensor" => Ok(Self::Sensor),
            "simulated" => Ok(Self::Simulated),
            "imported" => Ok(Self::Imported),
            other => Err(AppError::validation(format!(
                "unknown sample source '{other}'"
            ))),
        }
    }
}

/// UTC calendar day of an epoch-millisecond timestamp
#[must_use]
pub fn day_of(timestamp_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| dt.date_naive())
}

/// One immutable reading, identified by `(timestamp, metric_key)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    /// Which metric
    pub metric_key: MetricKey,
    /// Reading value
    pub value: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// UTC day of `timestamp`
    pub date: NaiveDate,
    /// Origin of the reading
    pub source: SampleSource,
}

impl MetricSample {
    /// Build a sample, deriving its calendar day from the timestamp
    ///
    /// # Errors
    ///
    /// Returns a validation error for non-finite values or unrepresentable timestamps
    pub fn new(
        metric_key: MetricKey,
        value: f64,
        timestamp: i64,
        source: SampleSource,
    ) -> AppResult<Self> {
        if !value.is_finite() {
            return Err(AppError::validation(format!(
                "sample value for '{metric_key}' must be a finite number"
            )));
        }
        let date = day_of(timestamp)
            .ok_or_else(|| AppError::validation(format!("timestamp {timestamp} out of range")))?;
        Ok(Self {
            metric_key,
            value,
            timestamp,
            date,
            source,
        })
    }
}

/// Metric vector valid as of one calendar day; latest write wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySnapshot {
    /// Calendar day (upsert key)
    pub date: NaiveDate,
    /// Epoch milliseconds of the last write
    pub timestamp: i64,
    /// Metric values
    pub metrics: ExtendedHealthMetrics,
}

/// User-facing metric configuration; `enabled` selects five-elements participation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricConfig {
    /// Metric
    pub key: MetricKey,
    /// Short label
    pub label: String,
    /// Display unit
    pub unit: String,
    /// Cultivation-themed name
    pub display_name: String,
    /// Whether the metric participates in the balance model
    pub enabled: bool,
    /// Element shown for this metric
    pub element: Element,
}

impl MetricConfig {
    /// Check that the config is internally consistent
    ///
    /// # Errors
    ///
    /// Returns a validation error if the label is empty or the element does not
    /// match the fixed metric-to-element table
    pub fn validate(&self) -> AppResult<()> {
        if self.label.trim().is_empty() {
            return Err(AppError::validation(format!(
                "metric config '{}' has an empty label",
                self.key
            )));
        }
        if self.element != self.key.element() {
            return Err(AppError::validation(format!(
                "metric config '{}' maps to {} but the metric belongs to {}",
                self.key,
                self.element,
                self.key.element()
            )));
        }
        Ok(())
    }
}

fn config(
    key: MetricKey,
    label: &str,
    unit: &str,
    display_name: &str,
    enabled: bool,
) -> MetricConfig {
    MetricConfig {
        key,
        label: label.to_owned(),
        unit: unit.to_owned(),
        display_name: display_name.to_owned(),
        enabled,
        element: key.element(),
    }
}

/// Factory default metric configuration
#[must_use]
pub fn default_metric_configs() -> Vec<MetricConfig> {
    vec![
        config(MetricKey::Calories, "Calories burned", "kcal", "Spirit Qi", true),
        config(MetricKey::Hrv, "Heart rate variability", "ms", "Dao Heart", true),
        config(MetricKey::Stress, "Stress index", "", "Heart Demon", true),
        config(MetricKey::SleepHours, "Sleep duration", "h", "Divine Sense", true),
        config(MetricKey::HeartRate, "Heart rate", "bpm", "Heart Meridian", true),
        config(MetricKey::Oxygen, "Blood oxygen", "%", "Qi and Blood", true),
        config(MetricKey::Temp, "Body temperature", "°C", "Life Fire", false),
        config(MetricKey::Steps, "Steps", "steps", "Walking Practice", true),
        config(MetricKey::Vo2Max, "VO2 max", "ml/kg/min", "Qi Intake", true),
        config(MetricKey::RestingHeartRate, "Resting heart rate", "bpm", "Still Heart", false),
        config(MetricKey::RespiratoryRate, "Respiratory rate", "br/min", "Breath Cycle", true),
        config(MetricKey::BodyBattery, "Body battery", "%", "Essence", true),
    ]
}
