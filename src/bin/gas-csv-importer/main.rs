mod args;
mod csv;

use std::fs::File;

use anyhow::Context as _;
use args::Args;
use clap::Parser as _;
use gas_level::{
    config::Settings,
    db::PgStore,
    gas::{Measurement, Refill, RefillDetector},
    store::TimeSeriesStore as _,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::csv::CsvMeasurementIter;

const BULK_INSERT_SIZE: usize = 1000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let settings = Settings::from(args.settings);

    let file =
        File::open(&args.file).with_context(|| format!("failed to open file: {:?}", args.file))?;
    let iter = CsvMeasurementIter::new(file, settings.tank_capacity_liters, settings.timezone)
        .context("failed to create CSV measurement iterator")?;

    let store = PgStore::connect(&args.database_url)
        .await
        .context("failed to connect to database")?;
    store
        .migrate()
        .await
        .context("failed to run database migrations")?;

    let detector = RefillDetector::from(&settings);
    let mut previous = store
        .latest_measurement()
        .await
        .context("failed to get latest measurement")?;

    let mut measurements: Vec<Measurement> = Vec::with_capacity(BULK_INSERT_SIZE);
    let mut refills: Vec<Refill> = Vec::new();
    let mut total = 0;
    let mut total_refills = 0;
    let mut skipped = 0;

    for result in iter {
        let measurement = result.context("failed to parse CSV record")?;

        if let Some(p) = &previous
            && measurement.time <= p.time
        {
            warn!(
                time = %measurement.time_as_text,
                previous = %p.time_as_text,
                "skipping measurement not newer than the previous one"
            );
            skipped += 1;
            continue;
        }

        if let Some(refill) = detector.detect(previous.as_ref(), &measurement) {
            refills.push(refill);
        }
        measurements.push(measurement.clone());
        previous = Some(measurement);

        if measurements.len() >= BULK_INSERT_SIZE {
            store
                .bulk_insert_measurements(&measurements)
                .await
                .context("failed to bulk insert measurements")?;
            store
                .bulk_insert_refills(&refills)
                .await
                .context("failed to bulk insert refills")?;
            total += measurements.len();
            total_refills += refills.len();
            measurements.clear();
            refills.clear();
        }
    }

    if !measurements.is_empty() {
        store
            .bulk_insert_measurements(&measurements)
            .await
            .context("failed to bulk insert remaining measurements")?;
        store
            .bulk_insert_refills(&refills)
            .await
            .context("failed to bulk insert remaining refills")?;
        total += measurements.len();
        total_refills += refills.len();
    }

    info!(
        measurements = total,
        refills = total_refills,
        skipped,
        file = ?args.file,
        "import finished"
    );

    Ok(())
}
