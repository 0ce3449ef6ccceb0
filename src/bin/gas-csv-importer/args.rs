use std::path::PathBuf;

use clap::Parser;
use gas_level::config::SettingsArgs;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[command(flatten)]
    pub settings: SettingsArgs,
}
