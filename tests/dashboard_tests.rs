//! Dashboard view over seeded, empty and failing stores.

mod common;

use std::sync::atomic::Ordering;

use chrono_tz::Tz;
use common::{DAY, FlakyStore};
use gas_level::config::Settings;
use gas_level::dashboard::build_dashboard;
use gas_level::gas::{EmptyForecast, Measurement, Refill, RefillDetector};
use gas_level::store::{MemoryStore, TimeSeriesStore};
use pretty_assertions::assert_eq;

// 23-Jan-2024 00:00:00 UTC
const START: f64 = 1_705_968_000.0;

fn settings() -> Settings {
    Settings {
        timezone: Tz::UTC,
        ..Settings::default()
    }
}

async fn seed(store: &MemoryStore, samples: &[(f64, f64)]) {
    let settings = settings();
    let detector = RefillDetector::from(&settings);
    let mut previous: Option<Measurement> = None;

    for &(time, level) in samples {
        let m = Measurement::new(time, 20, level, 300, settings.timezone);
        if let Some(refill) = detector.detect(previous.as_ref(), &m) {
            store.insert_refill(&refill).await.unwrap();
        }
        store.insert_measurement(&m).await.unwrap();
        previous = Some(m);
    }
}

#[tokio::test]
async fn empty_store_renders_placeholders() {
    let store = MemoryStore::new();
    let view = build_dashboard(&store, &settings(), START).await;

    assert!(!view.has_data);
    assert_eq!(view.latest_measurement, Measurement::placeholder(START));
    assert_eq!(view.latest_refill, Refill::placeholder(START));
    assert_eq!(view.average_consumption_per_second, 0.0);
    assert_eq!(view.gas_empty_on, EmptyForecast::NotEnoughData);
    assert!(view.daily_series.is_empty());
}

#[tokio::test]
async fn failing_store_renders_placeholders() {
    let store = FlakyStore::failing_reads();
    let view = build_dashboard(&store, &settings(), START).await;

    assert!(!view.has_data);
    assert_eq!(view.latest_measurement.time_as_text, "No data");
    assert_eq!(view.gas_empty_on.to_string(), "Not enough data");
}

#[tokio::test]
async fn missing_measurement_reports_no_rate() {
    let store = FlakyStore::default();
    seed(&store.inner, &[(START, 80.0)]).await;
    store.fail_measurement_reads.store(true, Ordering::SeqCst);

    let view = build_dashboard(&store, &settings(), START + DAY).await;

    assert!(!view.has_data);
    assert_eq!(view.latest_refill.level, 80.0);
    assert_eq!(view.latest_measurement, Measurement::placeholder(START + DAY));
    assert_eq!(view.average_consumption_per_second, 0.0);
    assert_eq!(view.average_consumption_per_day, 0.0);
    assert_eq!(view.gas_empty_on, EmptyForecast::NotEnoughData);
    assert!(view.daily_series.is_empty());
}

#[tokio::test]
async fn single_refill_has_no_rate_yet() {
    let store = MemoryStore::new();
    seed(&store, &[(START, 80.0)]).await;

    let view = build_dashboard(&store, &settings(), START).await;
    assert!(view.has_data);
    assert_eq!(view.average_consumption_per_second, 0.0);
    assert_eq!(view.gas_empty_on, EmptyForecast::NotEnoughData);
    assert_eq!(view.daily_series.len(), 1);
}

#[tokio::test]
async fn estimates_from_latest_refill() {
    let store = MemoryStore::new();
    seed(
        &store,
        &[
            // An older cycle that the estimate must ignore.
            (START - 10.0 * DAY, 30.0),
            (START - 9.0 * DAY, 10.0),
            // Refill, then three readings on day one and one a day later.
            (START, 80.0),
            (START + 3_600.0, 79.0),
            (START + 7_200.0, 78.0),
            (START + DAY, 70.0),
        ],
    )
    .await;

    let now = START + DAY + 3_600.0;
    let view = build_dashboard(&store, &settings(), now).await;

    assert!(view.has_data);
    assert_eq!(view.latest_refill.time, START);
    assert_eq!(view.latest_refill.liters, 210);
    assert_eq!(view.latest_measurement.liters, 210);
    assert_eq!(view.average_consumption_per_day, 30.0);
    assert!((view.average_consumption_per_second * DAY - 30.0).abs() < 1e-9);

    // 210 liters left at 30 liters a day: seven days after 24-Jan-2024 01:00.
    assert_eq!(
        view.gas_empty_on,
        EmptyForecast::On("31-Jan-2024".to_string())
    );

    let labels: Vec<(&str, f64)> = view
        .daily_series
        .iter()
        .map(|p| (p.date_label.as_str(), p.level))
        .collect();
    assert_eq!(labels, vec![("23-Jan-2024", 80.0), ("24-Jan-2024", 70.0)]);
}

#[tokio::test]
async fn view_serializes_forecast_as_text() {
    let store = MemoryStore::new();
    let view = build_dashboard(&store, &settings(), START).await;

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["gas_empty_on"], "Not enough data");
    assert_eq!(json["has_data"], false);
    assert!(json["daily_series"].as_array().unwrap().is_empty());
}
