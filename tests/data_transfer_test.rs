// ABOUTME: Integration tests for JSON import and JSON/CSV export
// ABOUTME: Payload shapes, skip counting, duplicate handling, and the export-import round trip
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use common::{create_test_store, sample_days_ago};
use serde_json::json;
use taoist_fit::data_transfer::{
    export_csv, export_json, import_payload, ExportDump, CSV_HEADER,
};
use taoist_fit::database_plugins::MetricStore;
use taoist_fit::errors::ErrorCode;
use taoist_fit::models::{
    default_metric_configs, CultivationLevel, CultivationStage, ExtendedHealthMetrics, MetricKey,
    SampleSource,
};

fn metrics_json(steps: f64) -> serde_json::Value {
    let mut metrics = ExtendedHealthMetrics::default();
    metrics.set(MetricKey::Steps, steps);
    serde_json::to_value(metrics).unwrap()
}

#[tokio::test]
async fn test_import_array_of_day_records() -> Result<()> {
    let store = create_test_store().await?;
    let payload = json!([
        { "date": "2024-03-09", "metrics": metrics_json(4_000.0) },
        { "date": "2024-03-10", "metrics": metrics_json(9_000.0), "timestamp": 1_710_072_000_000_i64 },
        { "date": "not-a-date", "metrics": metrics_json(1.0) },
        { "date": "2024-03-11" }
    ]);

    let report = import_payload(store.as_ref(), &payload.to_string()).await?;
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.duplicates, 0);
    assert!(report.message.contains("imported 2 records"));

    let snapshots = store.all_daily_snapshots().await?;
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[1].timestamp, 1_710_072_000_000);
    assert!((snapshots[1].metrics.steps - 9_000.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_import_single_day_record() -> Result<()> {
    let store = create_test_store().await?;
    let payload = json!({ "date": "2024-03-10", "metrics": metrics_json(7_777.0) });

    let report = import_payload(store.as_ref(), &payload.to_string()).await?;
    assert_eq!(report.imported, 1);

    let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let stored = store.get_daily_snapshot(date).await?.unwrap();
    assert!((stored.metrics.steps - 7_777.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_import_partial_day_records() -> Result<()> {
    let store = create_test_store().await?;
    let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let payload = json!([{ "date": "2024-03-10", "metrics": { "heartRate": 72, "steps": 8000 } }]);

    let report = import_payload(store.as_ref(), &payload.to_string()).await?;
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 0);

    // Missing metrics take the defaults
    let mut expected = ExtendedHealthMetrics::default();
    expected.set(MetricKey::HeartRate, 72.0);
    expected.set(MetricKey::Steps, 8_000.0);
    assert_eq!(store.get_daily_snapshot(date).await?.unwrap().metrics, expected);

    // A later partial record fills in over the stored day
    let update = json!({ "date": "2024-03-10", "metrics": { "stress": 30 } });
    import_payload(store.as_ref(), &update.to_string()).await?;
    expected.set(MetricKey::Stress, 30.0);
    assert_eq!(store.get_daily_snapshot(date).await?.unwrap().metrics, expected);
    Ok(())
}

#[tokio::test]
async fn test_import_csv_columns_round_trip() -> Result<()> {
    let source = create_test_store().await?;
    let today = Utc::now().date_naive();
    let mut metrics = ExtendedHealthMetrics::default();
    metrics.set(MetricKey::HeartRate, 64.0);
    metrics.set(MetricKey::BodyBattery, 51.0);
    source.put_daily_snapshot(today, metrics).await?;

    // Rebuild day records from the CSV columns only
    let csv = export_csv(source.as_ref(), None).await?;
    let mut lines = csv.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    let records: Vec<serde_json::Value> = lines
        .map(|line| {
            let cells: Vec<&str> = line.split(',').collect();
            let metrics: serde_json::Map<String, serde_json::Value> = header[1..]
                .iter()
                .zip(&cells[1..])
                .map(|(name, cell)| ((*name).to_owned(), json!(cell.parse::<f64>().unwrap())))
                .collect();
            json!({ "date": cells[0], "metrics": metrics })
        })
        .collect();

    let target = create_test_store().await?;
    let report = import_payload(target.as_ref(), &serde_json::Value::from(records).to_string()).await?;
    assert_eq!(report.imported, 1);
    let restored = target.get_daily_snapshot(today).await?.unwrap().metrics;
    assert!((restored.heart_rate - 64.0).abs() < f64::EPSILON);
    assert!((restored.body_battery - 51.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_import_metric_history() -> Result<()> {
    let store = create_test_store().await?;
    let payload = json!({
        "metricHistory": [
            { "metricKey": "heartRate", "value": 72.0 },
            { "metricKey": "stress", "value": 35.0, "source": "sensor", "timestamp": 1_710_072_000_000_i64 },
            { "metricKey": "stress", "value": 36.0, "timestamp": 1_710_072_000_000_i64 },
            { "metricKey": "mana", "value": 1.0 },
            { "metricKey": "hrv", "value": "high" },
            { "metricKey": "hrv", "value": 50.0, "timestamp": 1_710_072_000_000_i64, "date": "2024-03-01" }
        ]
    });

    let report = import_payload(store.as_ref(), &payload.to_string()).await?;
    assert_eq!(report.imported, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.skipped, 3);

    let samples = store.all_samples().await?;
    assert_eq!(samples.len(), 2);
    let heart = samples
        .iter()
        .find(|s| s.metric_key == MetricKey::HeartRate)
        .unwrap();
    assert_eq!(heart.source, SampleSource::Imported);
    let stress = samples
        .iter()
        .find(|s| s.metric_key == MetricKey::Stress)
        .unwrap();
    assert_eq!(stress.source, SampleSource::Sensor);
    // The first record for a key wins
    assert!((stress.value - 35.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test_import_with_nothing_valid_is_an_error() -> Result<()> {
    let store = create_test_store().await?;
    let payload = json!([{ "date": "2024-03-10" }, { "metrics": {} }]);

    let err = import_payload(store.as_ref(), &payload.to_string())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.message.contains("imported 0 valid records"));
    assert!(store.all_daily_snapshots().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_import_rejects_unrecognized_shapes() -> Result<()> {
    let store = create_test_store().await?;

    for payload in ["{\"rows\": []}", "42", "\"text\"", "not json at all"] {
        let err = import_payload(store.as_ref(), payload).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation, "payload {payload}");
    }
    Ok(())
}

#[tokio::test]
async fn test_export_import_round_trip() -> Result<()> {
    let source = create_test_store().await?;
    let today = Utc::now().date_naive();

    for days_ago in 0..5_i64 {
        let mut metrics = ExtendedHealthMetrics::default();
        metrics.set(MetricKey::HeartRate, 60.0 + days_ago as f64 * 1.5);
        metrics.set(MetricKey::SleepHours, 7.25);
        source
            .put_daily_snapshot(today - Duration::days(days_ago), metrics)
            .await?;

        for (i, key) in [MetricKey::HeartRate, MetricKey::Stress, MetricKey::Temp]
            .into_iter()
            .enumerate()
        {
            let value = 36.6 + days_ago as f64 / 3.0;
            source
                .put_sample_at(&sample_days_ago(key, value, days_ago, i as i64))
                .await?;
        }
    }
    let mut configs = default_metric_configs();
    configs[2].enabled = false;
    source.save_metric_configs(&configs).await?;
    let level = CultivationLevel::new(CultivationStage::Foundation, 2, 50.0, 400.0, "Inner Disciple")?;
    source.save_cultivation_level(&level).await?;

    let exported = export_json(source.as_ref()).await?;
    let dump: ExportDump = serde_json::from_str(&exported)?;
    assert_eq!(dump.health_metrics.len(), 5);
    assert_eq!(dump.metric_history.len(), 15);

    let target = create_test_store().await?;
    let report = import_payload(target.as_ref(), &exported).await?;
    assert_eq!(report.imported, 20);
    assert_eq!(report.skipped, 0);

    assert_eq!(
        target.all_daily_snapshots().await?,
        source.all_daily_snapshots().await?
    );
    assert_eq!(target.all_samples().await?, source.all_samples().await?);
    assert_eq!(target.metric_configs().await?, configs);
    assert_eq!(target.cultivation_level().await?, level);

    // Importing the same dump again only finds duplicates
    let again = import_payload(target.as_ref(), &exported).await?;
    assert_eq!(again.duplicates, 15);
    assert_eq!(target.all_samples().await?.len(), 15);
    Ok(())
}

#[tokio::test]
async fn test_export_json_keys() -> Result<()> {
    let store = create_test_store().await?;
    store
        .put_sample(MetricKey::Hrv, 44.0, SampleSource::Manual)
        .await?;

    let exported: serde_json::Value = serde_json::from_str(&export_json(store.as_ref()).await?)?;
    for key in [
        "schemaVersion",
        "exportedAt",
        "healthMetrics",
        "metricHistory",
        "metricConfigs",
        "achievements",
    ] {
        assert!(exported.get(key).is_some(), "missing {key}");
    }
    assert_eq!(exported["metricHistory"][0]["metricKey"], "hrv");
    Ok(())
}

#[tokio::test]
async fn test_export_csv_rows() -> Result<()> {
    let store = create_test_store().await?;
    assert_eq!(export_csv(store.as_ref(), None).await?, format!("{CSV_HEADER}\n"));

    let today = Utc::now().date_naive();
    let old = today - Duration::days(40);
    store
        .put_daily_snapshot(today, ExtendedHealthMetrics::default())
        .await?;
    store
        .put_daily_snapshot(old, ExtendedHealthMetrics::default())
        .await?;

    let all = export_csv(store.as_ref(), None).await?;
    let lines: Vec<&str> = all.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert!(lines[1].starts_with(&old.to_string()));
    assert_eq!(
        lines[2],
        format!("{today},87,24,71,7.6,1600,8500,96,36.7,75")
    );

    let recent = export_csv(store.as_ref(), Some(30)).await?;
    assert_eq!(recent.lines().count(), 2);
    Ok(())
}
