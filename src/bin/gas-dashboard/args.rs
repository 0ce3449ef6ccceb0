use std::net::SocketAddr;

use clap::Parser;
use gas_level::config::SettingsArgs;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8000")]
    pub listen: SocketAddr,

    #[command(flatten)]
    pub settings: SettingsArgs,
}
