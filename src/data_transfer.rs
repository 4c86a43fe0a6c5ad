// ABOUTME: JSON import of day records, metric history, and full dumps; JSON and CSV export
// ABOUTME: Invalid records are skipped and counted; an import with nothing valid is a validation error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! # Import and Export
//!
//! Accepted import shapes:
//!
//! - an array of day records `[{date, metrics, timestamp?}]`
//! - a single day record `{date, metrics}`
//! - `{metricHistory: [{metricKey, value, source?, timestamp?, date?}]}`
//! - a full [`ExportDump`] (`healthMetrics` and/or `metricHistory`, plus the
//!   optional `metricConfigs`, `achievements`, and `cultivationLevel`)
//!
//! Records carrying their own timestamp keep it, so exporting and importing
//! into an empty store reproduces `healthMetrics` and `metricHistory`
//! exactly. Samples that already exist are counted as duplicates and left
//! untouched.

use crate::database_plugins::MetricStore;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Write;
use taoist_core::models::{
    Achievement, CultivationLevel, DailySnapshot, ExtendedHealthMetrics, MetricConfig, MetricKey,
    MetricSample, SampleSource,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Fixed CSV column order
pub const CSV_HEADER: &str =
    "date,heartRate,hrv,stress,sleepHours,calories,steps,oxygen,temp,bodyBattery";

const CSV_COLUMNS: [MetricKey; 9] = [
    MetricKey::HeartRate,
    MetricKey::Hrv,
    MetricKey::Stress,
    MetricKey::SleepHours,
    MetricKey::Calories,
    MetricKey::Steps,
    MetricKey::Oxygen,
    MetricKey::Temp,
    MetricKey::BodyBattery,
];

/// Structured dump of every persisted table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDump {
    /// Schema version of the exporting store
    pub schema_version: i64,
    /// When the dump was produced
    pub exported_at: DateTime<Utc>,
    /// Daily snapshots, ascending by date
    pub health_metrics: Vec<DailySnapshot>,
    /// Samples, ascending by timestamp
    pub metric_history: Vec<MetricSample>,
    /// Metric configuration
    #[serde(default)]
    pub metric_configs: Vec<MetricConfig>,
    /// Achievement progress
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    /// Cultivation level, if one was saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivation_level: Option<CultivationLevel>,
}

/// Outcome of an import run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Records written
    pub imported: usize,
    /// Records rejected as malformed
    pub skipped: usize,
    /// Samples already present
    pub duplicates: usize,
    /// Human-readable summary
    pub message: String,
}

/// Recognized payload shapes
#[derive(Debug)]
enum ImportPayload<'a> {
    DayRecords(&'a [Value]),
    SingleDay(&'a Value),
    Dump(&'a Map<String, Value>),
}

/// Identify the payload shape without validating individual records
fn classify(payload: &Value) -> AppResult<ImportPayload<'_>> {
    match payload {
        Value::Array(items) => Ok(ImportPayload::DayRecords(items)),
        Value::Object(map) => {
            let has_array = |key: &str| map.get(key).is_some_and(Value::is_array);
            if has_array("metricHistory") || has_array("healthMetrics") {
                Ok(ImportPayload::Dump(map))
            } else if map.contains_key("date") && map.contains_key("metrics") {
                Ok(ImportPayload::SingleDay(payload))
            } else {
                Err(unrecognized_format())
            }
        }
        _ => Err(unrecognized_format()),
    }
}

fn unrecognized_format() -> AppError {
    AppError::validation(
        "unrecognized import format: expected an array of {date, metrics} records, \
         a single {date, metrics} record, or {metricHistory: [...]}",
    )
}

/// Day record as found in import files and dumps
///
/// `metrics` may name any subset of the metrics; unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct DayRecord {
    date: NaiveDate,
    metrics: Map<String, Value>,
    #[serde(default)]
    timestamp: Option<i64>,
}

impl DayRecord {
    /// Known metrics carried by the record
    ///
    /// `None` when no known metric is present or a known metric is not a
    /// finite number.
    fn metric_values(&self) -> Option<Vec<(MetricKey, f64)>> {
        let mut values = Vec::with_capacity(self.metrics.len());
        for (name, raw) in &self.metrics {
            let Ok(key) = name.parse::<MetricKey>() else {
                continue;
            };
            let value = raw.as_f64().filter(|v| v.is_finite())?;
            values.push((key, value));
        }
        (!values.is_empty()).then_some(values)
    }
}

/// Sample record as found in import files and dumps
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SampleRecord {
    metric_key: MetricKey,
    value: f64,
    #[serde(default)]
    source: Option<SampleSource>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

impl SampleRecord {
    /// Build the sample for a timestamped record; `None` when inconsistent
    fn to_sample(&self, timestamp: i64) -> Option<MetricSample> {
        let source = self.source.unwrap_or(SampleSource::Imported);
        let sample = MetricSample::new(self.metric_key, self.value, timestamp, source).ok()?;
        match self.date {
            Some(date) if date != sample.date => None,
            _ => Some(sample),
        }
    }
}

/// Running counters for one import
#[derive(Debug, Default)]
struct Tally {
    imported: usize,
    skipped: usize,
    duplicates: usize,
    restored: Vec<&'static str>,
}

async fn import_day<S>(store: &S, item: &Value, tally: &mut Tally) -> AppResult<()>
where
    S: MetricStore + ?Sized,
{
    let Some((record, values)) = DayRecord::deserialize(item)
        .ok()
        .and_then(|record| record.metric_values().map(|values| (record, values)))
    else {
        tally.skipped += 1;
        return Ok(());
    };

    // Partial records fill in over the stored day, else the defaults
    let mut metrics = store
        .get_daily_snapshot(record.date)
        .await?
        .map_or_else(ExtendedHealthMetrics::default, |snapshot| snapshot.metrics);
    for (key, value) in values {
        metrics.set(key, value);
    }

    match record.timestamp {
        Some(timestamp) => {
            store
                .upsert_daily_snapshot(&DailySnapshot {
                    date: record.date,
                    timestamp,
                    metrics,
                })
                .await?;
        }
        None => {
            store.put_daily_snapshot(record.date, metrics).await?;
        }
    }
    tally.imported += 1;
    Ok(())
}

async fn import_sample<S>(store: &S, item: &Value, tally: &mut Tally) -> AppResult<()>
where
    S: MetricStore + ?Sized,
{
    let Ok(record) = SampleRecord::deserialize(item) else {
        tally.skipped += 1;
        return Ok(());
    };
    if !record.value.is_finite() {
        tally.skipped += 1;
        return Ok(());
    }

    if let Some(timestamp) = record.timestamp {
        let Some(sample) = record.to_sample(timestamp) else {
            tally.skipped += 1;
            return Ok(());
        };
        if store.put_sample_at(&sample).await? {
            tally.imported += 1;
        } else {
            tally.duplicates += 1;
        }
    } else {
        store
            .put_sample(
                record.metric_key,
                record.value,
                record.source.unwrap_or(SampleSource::Imported),
            )
            .await?;
        tally.imported += 1;
    }
    Ok(())
}

/// Restore the non-record sections of a full dump when they are well formed
async fn restore_dump_sections<S>(
    store: &S,
    map: &Map<String, Value>,
    tally: &mut Tally,
) -> AppResult<()>
where
    S: MetricStore + ?Sized,
{
    if let Some(configs) = map
        .get("metricConfigs")
        .and_then(|v| Vec::<MetricConfig>::deserialize(v).ok())
        .filter(|configs| !configs.is_empty())
    {
        if configs.iter().all(|c| c.validate().is_ok()) {
            store.save_metric_configs(&configs).await?;
            tally.restored.push("metricConfigs");
        }
    }

    if let Some(achievements) = map
        .get("achievements")
        .and_then(|v| Vec::<Achievement>::deserialize(v).ok())
        .filter(|achievements| !achievements.is_empty())
    {
        store.save_achievements(&achievements).await?;
        tally.restored.push("achievements");
    }

    if let Some(level) = map
        .get("cultivationLevel")
        .and_then(|v| CultivationLevel::deserialize(v).ok())
    {
        if level.validate().is_ok() {
            store.save_cultivation_level(&level).await?;
            tally.restored.push("cultivationLevel");
        }
    }
    Ok(())
}

/// Import a JSON payload into `store`
///
/// # Errors
///
/// Returns a validation error for malformed JSON, an unrecognized shape, or a
/// payload with no valid record; storage errors abort the run
pub async fn import_payload<S>(store: &S, json: &str) -> AppResult<ImportReport>
where
    S: MetricStore + ?Sized,
{
    let run_id = Uuid::new_v4().to_string();
    let payload: Value = serde_json::from_str(json)
        .map_err(|e| AppError::validation(format!("import file is not valid JSON: {e}")))?;

    let mut tally = Tally::default();
    match classify(&payload)? {
        ImportPayload::DayRecords(items) => {
            for item in items {
                import_day(store, item, &mut tally).await?;
            }
        }
        ImportPayload::SingleDay(item) => import_day(store, item, &mut tally).await?,
        ImportPayload::Dump(map) => {
            let empty = Vec::new();
            let days = map.get("healthMetrics").and_then(Value::as_array).unwrap_or(&empty);
            let samples = map.get("metricHistory").and_then(Value::as_array).unwrap_or(&empty);
            for item in days {
                import_day(store, item, &mut tally).await?;
            }
            for item in samples {
                import_sample(store, item, &mut tally).await?;
            }
            restore_dump_sections(store, map, &mut tally).await?;
        }
    }

    AppLogger::log_data_transfer(&run_id, "import", tally.imported, tally.skipped);

    if tally.imported + tally.duplicates == 0 {
        return Err(AppError::validation(format!(
            "imported 0 valid records ({} skipped); check the data format",
            tally.skipped
        ))
        .with_details(json!({ "skipped": tally.skipped })));
    }

    let mut message = format!("imported {} records", tally.imported);
    if tally.duplicates > 0 {
        let _ = write!(message, ", {} duplicates ignored", tally.duplicates);
    }
    if tally.skipped > 0 {
        let _ = write!(message, ", {} invalid records skipped", tally.skipped);
    }
    if !tally.restored.is_empty() {
        let _ = write!(message, "; restored {}", tally.restored.join(", "));
    }
    info!(run_id = %run_id, %message, "Import finished");

    Ok(ImportReport {
        imported: tally.imported,
        skipped: tally.skipped,
        duplicates: tally.duplicates,
        message,
    })
}

/// Pretty-printed JSON dump of every table
///
/// # Errors
///
/// Returns an error if reading the store or serializing fails
pub async fn export_json<S>(store: &S) -> AppResult<String>
where
    S: MetricStore + ?Sized,
{
    let run_id = Uuid::new_v4().to_string();
    let dump = store.export_dump().await?;
    let records = dump.health_metrics.len() + dump.metric_history.len();
    let rendered = serde_json::to_string_pretty(&dump)?;
    AppLogger::log_data_transfer(&run_id, "export-json", records, 0);
    Ok(rendered)
}

/// Render snapshots as CSV rows under [`CSV_HEADER`]
#[must_use]
pub fn snapshots_to_csv(snapshots: &[DailySnapshot]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for snapshot in snapshots {
        out.push_str(&snapshot.date.to_string());
        for key in CSV_COLUMNS {
            let _ = write!(out, ",{}", snapshot.metrics.get(key));
        }
        out.push('\n');
    }
    out
}

/// CSV of daily snapshots, ascending by date; `days` limits to the recent window
///
/// # Errors
///
/// Returns an error if reading the store fails
pub async fn export_csv<S>(store: &S, days: Option<u32>) -> AppResult<String>
where
    S: MetricStore + ?Sized,
{
    let run_id = Uuid::new_v4().to_string();
    let snapshots = match days {
        Some(days) => store.recent_daily_snapshots(days).await?,
        None => store.all_daily_snapshots().await?,
    };
    debug!(rows = snapshots.len(), "Rendering CSV export");
    AppLogger::log_data_transfer(&run_id, "export-csv", snapshots.len(), 0);
    Ok(snapshots_to_csv(&snapshots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_shapes() {
        let days = json!([{ "date": "2024-03-10", "metrics": {} }]);
        assert!(matches!(classify(&days), Ok(ImportPayload::DayRecords(_))));

        let single = json!({ "date": "2024-03-10", "metrics": {} });
        assert!(matches!(classify(&single), Ok(ImportPayload::SingleDay(_))));

        let history = json!({ "metricHistory": [] });
        assert!(matches!(classify(&history), Ok(ImportPayload::Dump(_))));

        let unknown = json!({ "rows": [] });
        assert!(classify(&unknown).is_err());
        assert!(classify(&json!(42)).is_err());
        // metricHistory must be an array to count as history
        assert!(classify(&json!({ "metricHistory": "x" })).is_err());
    }

    #[test]
    fn test_sample_record_date_must_match_timestamp() {
        // 2024-03-10T12:00:00Z
        let record: SampleRecord = serde_json::from_value(json!({
            "metricKey": "heartRate",
            "value": 72.0,
            "date": "2024-03-09"
        }))
        .unwrap();
        assert!(record.to_sample(1_710_072_000_000).is_none());

        let record: SampleRecord = serde_json::from_value(json!({
            "metricKey": "heartRate",
            "value": 72.0
        }))
        .unwrap();
        let sample = record.to_sample(1_710_072_000_000).unwrap();
        assert_eq!(sample.source, SampleSource::Imported);
    }

    #[test]
    fn test_csv_layout() {
        let snapshot = DailySnapshot {
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            timestamp: 0,
            metrics: ExtendedHealthMetrics::default(),
        };
        let csv = snapshots_to_csv(&[snapshot]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some("2024-03-10,87,24,71,7.6,1600,8500,96,36.7,75")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_day_record_metric_values() {
        let partial: DayRecord = serde_json::from_value(json!({
            "date": "2024-03-10",
            "metrics": { "heartRate": 72, "steps": 8000.0, "mood": "calm" }
        }))
        .unwrap();
        let mut values = partial.metric_values().unwrap();
        values.sort_by_key(|(key, _)| *key);
        assert_eq!(
            values,
            vec![(MetricKey::HeartRate, 72.0), (MetricKey::Steps, 8000.0)]
        );

        let unknown_only: DayRecord = serde_json::from_value(json!({
            "date": "2024-03-10",
            "metrics": { "mood": 3 }
        }))
        .unwrap();
        assert!(unknown_only.metric_values().is_none());

        let not_a_number: DayRecord = serde_json::from_value(json!({
            "date": "2024-03-10",
            "metrics": { "heartRate": 72, "stress": "high" }
        }))
        .unwrap();
        assert!(not_a_number.metric_values().is_none());
    }
}
