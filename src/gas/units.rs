//! Unit and time conversions for tank readings.
//!
//! Timestamps are Unix epoch seconds as `f64` throughout the crate. They enter
//! through [`now`] and the CSV importer; everything else only formats them.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub const TIMESTAMP_FORMAT: &str = "%d-%b-%Y %H:%M:%S";
pub const DATE_FORMAT: &str = "%d-%b-%Y";

/// Converts a fill percentage to whole liters, rounding down.
///
/// Levels outside `0..=100` are not clamped.
pub fn level_to_liters(level: f64, capacity_liters: u32) -> i64 {
    (level * f64::from(capacity_liters) / 100.0).floor() as i64
}

pub fn now() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

pub fn to_datetime(time: f64, tz: Tz) -> DateTime<Tz> {
    let secs = time.floor();
    let nanos = ((time - secs) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .unwrap_or_default()
        .with_timezone(&tz)
}

pub fn format_timestamp(time: f64, tz: Tz) -> String {
    to_datetime(time, tz).format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(time: f64, tz: Tz) -> String {
    to_datetime(time, tz).format(DATE_FORMAT).to_string()
}

pub fn local_date(time: f64, tz: Tz) -> NaiveDate {
    to_datetime(time, tz).date_naive()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 300, 0)]
    #[case(100.0, 300, 300)]
    #[case(10.0, 300, 30)]
    #[case(33.0, 300, 99)]
    #[case(33.5, 300, 100)]
    #[case(-5.0, 300, -15)]
    #[case(120.0, 300, 360)]
    fn converts_level_to_liters(#[case] level: f64, #[case] capacity: u32, #[case] expected: i64) {
        assert_eq!(level_to_liters(level, capacity), expected);
    }

    #[test]
    fn level_to_liters_is_monotonic() {
        let mut previous = i64::MIN;
        for tenth in 0..=1000 {
            let liters = level_to_liters(f64::from(tenth) / 10.0, 300);
            assert!(liters >= previous);
            previous = liters;
        }
    }

    #[test]
    fn formats_in_the_configured_timezone() {
        // 2024-01-23 20:00:00 UTC
        let time = 1_706_040_000.0;
        assert_eq!(format_timestamp(time, Tz::UTC), "23-Jan-2024 20:00:00");
        assert_eq!(
            format_timestamp(time, chrono_tz::Asia::Tokyo),
            "24-Jan-2024 05:00:00"
        );
        assert_eq!(format_date(time, chrono_tz::Asia::Tokyo), "24-Jan-2024");
    }

    #[test]
    fn keeps_sub_second_precision() {
        let dt = to_datetime(1.5, Tz::UTC);
        assert_eq!(dt.timestamp(), 1);
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }
}
