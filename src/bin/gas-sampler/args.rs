use std::path::PathBuf;

use clap::Parser;
use gas_level::config::SettingsArgs;
use gas_level::sensor::tmag5273::DEFAULT_ADDRESS;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "I2C_DEVICE", default_value = "/dev/i2c-1")]
    pub i2c_device: PathBuf,

    #[arg(long, env = "SENSOR_ADDRESS", default_value_t = DEFAULT_ADDRESS)]
    pub sensor_address: u8,

    /// Take a single measurement and exit.
    #[arg(long)]
    pub once: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}
