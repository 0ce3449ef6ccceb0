//! Read-only view over the store for the dashboard.
//!
//! Building the view never fails: a missing record or a store error degrades
//! to placeholders so the dashboard always has something to render.

use serde::Serialize;
use tracing::warn;

use crate::config::Settings;
use crate::gas::{
    DailyPoint, EmptyForecast, Measurement, Period, Refill, average_consumption, chart_points,
    forecast_empty_date,
};
use crate::store::{Order, TimeSeriesStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub latest_measurement: Measurement,
    pub latest_refill: Refill,
    /// False when either record above is a placeholder.
    pub has_data: bool,
    pub average_consumption_per_second: f64,
    pub average_consumption_per_day: f64,
    pub gas_empty_on: EmptyForecast,
    pub daily_series: Vec<DailyPoint>,
}

pub async fn build_dashboard<T: TimeSeriesStore + ?Sized>(
    store: &T,
    settings: &Settings,
    now: f64,
) -> DashboardView {
    let measurement = store.latest_measurement().await.unwrap_or_else(|err| {
        warn!(error = ?err, "failed to read latest measurement, using placeholder");
        None
    });
    let refill = store.latest_refill().await.unwrap_or_else(|err| {
        warn!(error = ?err, "failed to read latest refill, using placeholder");
        None
    });

    let has_data = measurement.is_some() && refill.is_some();
    let latest_measurement = measurement.unwrap_or_else(|| Measurement::placeholder(now));
    let latest_refill = refill.unwrap_or_else(|| Refill::placeholder(latest_measurement.time));

    // Rates need a real refill and a real measurement.
    let (per_second, per_day, gas_empty_on) = if has_data {
        let capacity = settings.tank_capacity_liters;
        let per_second =
            average_consumption(&latest_refill, &latest_measurement, Period::Second, capacity);
        let per_day =
            average_consumption(&latest_refill, &latest_measurement, Period::Day, capacity);
        let gas_empty_on =
            forecast_empty_date(now, latest_measurement.liters, per_second, settings.timezone);
        (per_second, per_day, gas_empty_on)
    } else {
        (0.0, 0.0, EmptyForecast::NotEnoughData)
    };

    let daily_series = if has_data {
        let series = store
            .measurements_between(latest_refill.time, latest_measurement.time, Order::Ascending)
            .await
            .unwrap_or_else(|err| {
                warn!(error = ?err, "failed to read measurement history");
                Vec::new()
            });
        chart_points(&series, settings.timezone)
    } else {
        Vec::new()
    };

    DashboardView {
        latest_measurement,
        latest_refill,
        has_data,
        average_consumption_per_second: per_second,
        average_consumption_per_day: per_day,
        gas_empty_on,
        daily_series,
    }
}
