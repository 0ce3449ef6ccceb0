use std::fmt;

use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::gas::units::{format_date, level_to_liters};
use crate::gas::{Measurement, Refill};

pub const NOT_ENOUGH_DATA: &str = "Not enough data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Second,
    Day,
    Week,
    Month,
}

impl Period {
    pub const fn seconds(self) -> u32 {
        match self {
            Period::Second => 1,
            Period::Day => 86_400,
            Period::Week => 86_400 * 7,
            Period::Month => 86_400 * 30,
        }
    }
}

/// Average liters consumed per `period` between the latest refill and the
/// latest measurement.
///
/// Returns `0.0` when no time has elapsed. A negative result means the inputs
/// are stale (the tank was refilled after `latest_refill`) and is passed
/// through unchanged.
pub fn average_consumption(
    latest_refill: &Refill,
    latest_measurement: &Measurement,
    period: Period,
    capacity_liters: u32,
) -> f64 {
    let liters_diff = level_to_liters(
        latest_refill.level - latest_measurement.level,
        capacity_liters,
    );
    let time_diff = latest_measurement.time - latest_refill.time;
    let periods = time_diff / f64::from(period.seconds());

    if periods == 0.0 {
        return 0.0;
    }

    liters_diff as f64 / periods
}

/// When the tank is projected to run dry, or why that can't be told yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyForecast {
    NotEnoughData,
    On(String),
}

impl fmt::Display for EmptyForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyForecast::NotEnoughData => f.write_str(NOT_ENOUGH_DATA),
            EmptyForecast::On(date) => f.write_str(date),
        }
    }
}

impl Serialize for EmptyForecast {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn forecast_empty_date(
    now: f64,
    liters_remaining: i64,
    consumption_per_second: f64,
    tz: Tz,
) -> EmptyForecast {
    if consumption_per_second == 0.0 {
        return EmptyForecast::NotEnoughData;
    }

    let seconds_left = liters_remaining as f64 / consumption_per_second;
    EmptyForecast::On(format_date(now + seconds_left, tz))
}
