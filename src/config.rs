use std::time::Duration;

use chrono_tz::Tz;
use clap::Args;

pub const DEFAULT_TANK_CAPACITY_LITERS: u32 = 300;
pub const DEFAULT_REFILL_THRESHOLD: f64 = 10.0;
pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_secs(3600);

/// Tank and scheduling parameters shared by every binary.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tank_capacity_liters: u32,

    /// Minimum rise in level percentage points, exclusive, that counts as a refill.
    pub refill_threshold: f64,

    pub sampling_interval: Duration,

    pub timezone: Tz,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tank_capacity_liters: DEFAULT_TANK_CAPACITY_LITERS,
            refill_threshold: DEFAULT_REFILL_THRESHOLD,
            sampling_interval: DEFAULT_SAMPLING_INTERVAL,
            timezone: Tz::UTC,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    #[arg(long, env = "TANK_CAPACITY_LITERS", default_value_t = DEFAULT_TANK_CAPACITY_LITERS)]
    pub tank_capacity_liters: u32,

    #[arg(long, env = "REFILL_THRESHOLD", default_value_t = DEFAULT_REFILL_THRESHOLD)]
    pub refill_threshold: f64,

    #[arg(
        long,
        env = "SAMPLING_INTERVAL_SECS",
        default_value_t = DEFAULT_SAMPLING_INTERVAL.as_secs()
    )]
    pub sampling_interval_secs: u64,

    #[arg(long, env = "TZ", default_value_t = Tz::UTC)]
    pub timezone: Tz,
}

impl From<SettingsArgs> for Settings {
    fn from(args: SettingsArgs) -> Self {
        Self {
            tank_capacity_liters: args.tank_capacity_liters,
            refill_threshold: args.refill_threshold,
            sampling_interval: Duration::from_secs(args.sampling_interval_secs),
            timezone: args.timezone,
        }
    }
}
