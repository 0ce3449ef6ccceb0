//! The sampling cycle: read the sensor, build a measurement, decide whether it
//! starts a refill, and persist both.
//!
//! One cycle runs to completion before the next starts. A failed cycle is
//! logged and dropped; the next scheduled tick starts fresh from whatever the
//! store holds.

use std::fmt;
use std::future::Future;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::error::{Result, StoreError};
use crate::gas::units;
use crate::gas::{Measurement, Refill, RefillDetector};
use crate::sensor::{Reading, Sensor};
use crate::store::TimeSeriesStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Sampling,
    Converting,
    DetectingRefill,
    Persisting,
    Failed,
}

impl CycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleState::Idle => "idle",
            CycleState::Sampling => "sampling",
            CycleState::Converting => "converting",
            CycleState::DetectingRefill => "detecting refill",
            CycleState::Persisting => "persisting",
            CycleState::Failed => "failed",
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub measurement: Measurement,
    pub refill: Option<Refill>,
}

type Clock = Box<dyn Fn() -> f64 + Send + Sync>;

pub struct MeasurementPipeline<S, T> {
    sensor: S,
    store: T,
    settings: Settings,
    detector: RefillDetector,
    state: CycleState,
    clock: Clock,
}

impl<S: Sensor, T: TimeSeriesStore> MeasurementPipeline<S, T> {
    pub fn new(sensor: S, store: T, settings: Settings) -> Self {
        let detector = RefillDetector::from(&settings);
        Self {
            sensor,
            store,
            settings,
            detector,
            state: CycleState::Idle,
            clock: Box::new(units::now),
        }
    }

    /// Replaces the wall clock used to timestamp cycles started by
    /// [`run_cycle`](Self::run_cycle) and [`run`](Self::run).
    pub fn with_clock(mut self, clock: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn into_parts(self) -> (S, T) {
        (self.sensor, self.store)
    }

    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let time = (self.clock)();
        self.run_cycle_at(time).await
    }

    pub async fn run_cycle_at(&mut self, time: f64) -> Result<CycleOutcome> {
        self.state = CycleState::Sampling;
        let reading = match self.sensor.sample() {
            Ok(reading) => reading,
            Err(err) => {
                error!(state = %self.state, time, error = %err, "sampling cycle failed");
                if let Err(err) = self.sensor.standby() {
                    warn!(error = %err, "failed to put sensor in standby");
                }
                self.state = CycleState::Failed;
                return Err(err.into());
            }
        };

        match self.record(reading, time).await {
            Ok(outcome) => {
                self.state = CycleState::Idle;
                Ok(outcome)
            }
            Err(err) => {
                error!(state = %self.state, time, error = ?err, "sampling cycle failed");
                self.state = CycleState::Failed;
                Err(err.into())
            }
        }
    }

    async fn record(
        &mut self,
        reading: Reading,
        time: f64,
    ) -> Result<CycleOutcome, StoreError> {
        self.state = CycleState::Converting;
        let measurement = Measurement::new(
            time,
            reading.temperature,
            reading.level,
            self.settings.tank_capacity_liters,
            self.settings.timezone,
        );
        debug!(
            time = %measurement.time_as_text,
            level = measurement.level,
            liters = measurement.liters,
            temperature = measurement.temperature,
            "measurement taken"
        );

        self.state = CycleState::DetectingRefill;
        let previous = self.store.latest_measurement().await?;
        let refill = self.detector.detect(previous.as_ref(), &measurement);

        self.state = CycleState::Persisting;
        self.store.insert_measurement(&measurement).await?;
        if let Some(refill) = &refill {
            self.store.insert_refill(refill).await?;
            info!(
                time = %refill.time_as_text,
                level = refill.level,
                liters = refill.liters,
                "refill detected"
            );
        }

        Ok(CycleOutcome {
            measurement,
            refill,
        })
    }

    /// Runs a cycle every sampling interval until `shutdown` resolves, then
    /// puts the sensor in standby.
    ///
    /// `shutdown` is only observed between cycles; a cycle in progress always
    /// runs to completion.
    pub async fn run<F: Future<Output = ()>>(&mut self, shutdown: F) {
        tokio::pin!(shutdown);
        info!(
            interval_secs = self.settings.sampling_interval.as_secs(),
            "sampling started"
        );

        loop {
            if let Ok(outcome) = self.run_cycle().await {
                info!(
                    time = %outcome.measurement.time_as_text,
                    level = outcome.measurement.level,
                    liters = outcome.measurement.liters,
                    "measurement recorded"
                );
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = sleep(self.settings.sampling_interval) => {}
            }
        }

        if let Err(err) = self.sensor.standby() {
            warn!(error = %err, "failed to put sensor in standby");
        }
        info!("sampling stopped");
    }
}
