use crate::config::Settings;
use crate::gas::units::level_to_liters;
use crate::gas::{Measurement, Refill};

/// Whether `current` starts a new refill cycle.
///
/// Only the immediately preceding measurement is considered, so a downward
/// blip followed by a recovery above the threshold also counts. The very first
/// measurement is always a refill so consumption has a baseline.
pub fn is_refill(previous: Option<&Measurement>, current: &Measurement, threshold: f64) -> bool {
    match previous {
        None => true,
        Some(previous) => current.level > previous.level + threshold,
    }
}

pub fn refill_liters(
    previous: Option<&Measurement>,
    current: &Measurement,
    capacity_liters: u32,
) -> i64 {
    match previous {
        None => current.liters,
        Some(previous) => level_to_liters(current.level - previous.level, capacity_liters),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefillDetector {
    pub threshold: f64,
    pub capacity_liters: u32,
}

impl RefillDetector {
    pub fn new(threshold: f64, capacity_liters: u32) -> Self {
        Self {
            threshold,
            capacity_liters,
        }
    }

    pub fn detect(&self, previous: Option<&Measurement>, current: &Measurement) -> Option<Refill> {
        if !is_refill(previous, current, self.threshold) {
            return None;
        }

        Some(Refill {
            time: current.time,
            time_as_text: current.time_as_text.clone(),
            level: current.level,
            liters: refill_liters(previous, current, self.capacity_liters),
        })
    }
}

impl From<&Settings> for RefillDetector {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.refill_threshold, settings.tank_capacity_liters)
    }
}
