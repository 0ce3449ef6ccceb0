use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::gas::units::{format_timestamp, level_to_liters};

pub const PLACEHOLDER_TIME_TEXT: &str = "No data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Measurement {
    pub time: f64,

    pub time_as_text: String,

    pub temperature: i32,

    pub level: f64,

    pub liters: i64,
}

impl Measurement {
    pub fn new(time: f64, temperature: i32, level: f64, capacity_liters: u32, tz: Tz) -> Self {
        Self {
            time,
            time_as_text: format_timestamp(time, tz),
            temperature,
            level,
            liters: level_to_liters(level, capacity_liters),
        }
    }

    /// Stand-in used by the dashboard when the store holds no measurement yet.
    pub fn placeholder(time: f64) -> Self {
        Self {
            time,
            time_as_text: PLACEHOLDER_TIME_TEXT.to_string(),
            temperature: 0,
            level: 0.0,
            liters: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Refill {
    pub time: f64,

    pub time_as_text: String,

    pub level: f64,

    /// Liters added by this refill.
    pub liters: i64,
}

impl Refill {
    /// Stand-in used by the dashboard when no refill has been recorded.
    ///
    /// Callers anchor it at the latest measurement's time, which makes the
    /// elapsed time zero and the consumption estimate zero.
    pub fn placeholder(time: f64) -> Self {
        Self {
            time,
            time_as_text: PLACEHOLDER_TIME_TEXT.to_string(),
            level: 0.0,
            liters: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liters_follow_level() {
        for level in [0.0, 12.5, 50.0, 86.0, 100.0] {
            let m = Measurement::new(0.0, 20, level, 300, Tz::UTC);
            assert_eq!(m.liters, level_to_liters(level, 300));
        }
    }

    #[test]
    fn time_text_is_derived() {
        let m = Measurement::new(86_400.0, 20, 50.0, 300, Tz::UTC);
        assert_eq!(m.time_as_text, "02-Jan-1970 00:00:00");
    }
}
