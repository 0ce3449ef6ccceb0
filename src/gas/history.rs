use std::collections::HashSet;

use chrono_tz::Tz;
use serde::Serialize;

use crate::gas::Measurement;
use crate::gas::units::{format_date, local_date};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date_label: String,
    pub level: f64,
}

/// Keeps the first measurement of each local calendar day.
///
/// `measurements` must be in ascending time order; the output keeps that
/// order. Days without measurements are simply absent.
pub fn daily_series(measurements: &[Measurement], tz: Tz) -> Vec<Measurement> {
    let mut seen = HashSet::new();
    measurements
        .iter()
        .filter(|m| seen.insert(local_date(m.time, tz)))
        .cloned()
        .collect()
}

pub fn chart_points(measurements: &[Measurement], tz: Tz) -> Vec<DailyPoint> {
    daily_series(measurements, tz)
        .into_iter()
        .map(|m| DailyPoint {
            date_label: format_date(m.time, tz),
            level: m.level,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DAY: f64 = 86_400.0;

    fn at(time: f64, level: f64) -> Measurement {
        Measurement::new(time, 20, level, 300, Tz::UTC)
    }

    #[test]
    fn keeps_first_of_each_day() {
        let series = vec![
            at(DAY + 60.0, 80.0),
            at(DAY + 3_600.0, 79.0),
            at(DAY + 7_200.0, 78.0),
            at(2.0 * DAY + 60.0, 75.0),
        ];

        let daily = daily_series(&series, Tz::UTC);
        assert_eq!(daily, vec![series[0].clone(), series[3].clone()]);
    }

    #[test]
    fn gaps_are_not_filled() {
        let series = vec![at(0.0, 80.0), at(5.0 * DAY, 60.0)];
        assert_eq!(daily_series(&series, Tz::UTC).len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(daily_series(&[], Tz::UTC).is_empty());
    }

    #[test]
    fn day_boundary_follows_timezone() {
        // 23:30 and 00:30 UTC are the same day in Tokyo (08:30 and 09:30).
        let series = vec![at(DAY - 1_800.0, 80.0), at(DAY + 1_800.0, 79.0)];
        assert_eq!(daily_series(&series, Tz::UTC).len(), 2);
        assert_eq!(daily_series(&series, chrono_tz::Asia::Tokyo).len(), 1);
    }

    #[test]
    fn chart_points_use_date_labels() {
        let series = vec![at(0.0, 80.0), at(60.0, 79.0), at(DAY, 77.0)];
        assert_eq!(
            chart_points(&series, Tz::UTC),
            vec![
                DailyPoint {
                    date_label: "01-Jan-1970".to_string(),
                    level: 80.0,
                },
                DailyPoint {
                    date_label: "02-Jan-1970".to_string(),
                    level: 77.0,
                },
            ]
        );
    }
}
