mod args;

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use gas_level::{
    config::Settings,
    db::PgStore,
    pipeline::MeasurementPipeline,
    sensor::{Sensor as _, Tmag5273},
};
use linux_embedded_hal::I2cdev;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::from(args.settings);

    let i2c = I2cdev::new(&args.i2c_device)
        .with_context(|| format!("failed to open I2C device: {:?}", args.i2c_device))?;

    let mut sensor = Tmag5273::with_address(i2c, args.sensor_address);
    if let Err(e) = sensor.configure() {
        let _ = sensor.standby();
        return Err(e).context("failed to configure TMAG5273");
    }

    let store = PgStore::connect(&args.database_url)
        .await
        .context("failed to connect to database")?;
    store
        .migrate()
        .await
        .context("failed to run database migrations")?;

    info!(
        device = ?args.i2c_device,
        tank_capacity_liters = settings.tank_capacity_liters,
        timezone = %settings.timezone,
        "sensor and store ready"
    );

    let mut pipeline = MeasurementPipeline::new(sensor, store, settings);

    if args.once {
        let outcome = pipeline
            .run_cycle()
            .await
            .context("failed to take measurement")?;
        println!(
            "{}: level {}% ({} L), {} C, refill: {}",
            outcome.measurement.time_as_text,
            outcome.measurement.level,
            outcome.measurement.liters,
            outcome.measurement.temperature,
            outcome.refill.is_some(),
        );
        return Ok(());
    }

    // Registered before the first cycle starts.
    let mut interrupt = signal(SignalKind::interrupt()).context("failed to listen for SIGINT")?;
    let mut terminate = signal(SignalKind::terminate()).context("failed to listen for SIGTERM")?;

    pipeline
        .run(async move {
            tokio::select! {
                _ = interrupt.recv() => {}
                _ = terminate.recv() => {}
            }
            info!("shutdown requested");
        })
        .await;

    Ok(())
}
