#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use gas_level::error::{SensorError, StoreError};
use gas_level::gas::{Measurement, Refill};
use gas_level::sensor::{Reading, Sensor};
use gas_level::store::{MemoryStore, Order, TimeSeriesStore};

pub const DAY: f64 = 86_400.0;

/// Sensor that replays a fixed script of levels and faults.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    script: VecDeque<Result<f64, u8>>,
    pub temperature: i32,
    pub standby_calls: usize,
}

impl ScriptedSensor {
    pub fn levels(levels: &[f64]) -> Self {
        Self {
            script: levels.iter().copied().map(Ok).collect(),
            temperature: 18,
            standby_calls: 0,
        }
    }

    /// Queues a status register fault for the next sample.
    pub fn then_fault(mut self, status: u8) -> Self {
        self.script.push_back(Err(status));
        self
    }

    pub fn then_level(mut self, level: f64) -> Self {
        self.script.push_back(Ok(level));
        self
    }
}

impl Sensor for ScriptedSensor {
    fn check_health(&mut self) -> Result<(), SensorError> {
        match self.script.front() {
            Some(Err(status)) => {
                let status = *status;
                self.script.pop_front();
                Err(SensorError::StatusFault { status })
            }
            Some(Ok(_)) => Ok(()),
            None => Err(SensorError::Bus {
                operation: "read device status",
                details: "script exhausted".to_string(),
            }),
        }
    }

    fn read_level(&mut self) -> Result<f64, SensorError> {
        match self.script.pop_front() {
            Some(Ok(level)) => Ok(level),
            _ => Err(SensorError::Bus {
                operation: "read angle result",
                details: "script exhausted".to_string(),
            }),
        }
    }

    fn read_temperature(&mut self) -> Result<i32, SensorError> {
        Ok(self.temperature)
    }

    fn standby(&mut self) -> Result<(), SensorError> {
        self.standby_calls += 1;
        Ok(())
    }
}

/// [`MemoryStore`] with switches to make reads or writes fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_measurement_reads: AtomicBool,
    pub fail_measurement_writes: AtomicBool,
    pub fail_refill_writes: AtomicBool,
}

impl FlakyStore {
    pub fn failing_reads() -> Self {
        let store = Self::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store
    }

    fn check(flag: &AtomicBool, operation: &'static str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                operation,
                details: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TimeSeriesStore for FlakyStore {
    async fn insert_measurement(&self, measurement: &Measurement) -> Result<(), StoreError> {
        Self::check(&self.fail_measurement_writes, "insert measurement")?;
        self.inner.insert_measurement(measurement).await
    }

    async fn insert_refill(&self, refill: &Refill) -> Result<(), StoreError> {
        Self::check(&self.fail_refill_writes, "insert refill")?;
        self.inner.insert_refill(refill).await
    }

    async fn latest_measurements(&self, n: usize) -> Result<Vec<Measurement>, StoreError> {
        Self::check(&self.fail_reads, "get latest measurements")?;
        Self::check(&self.fail_measurement_reads, "get latest measurements")?;
        self.inner.latest_measurements(n).await
    }

    async fn latest_refills(&self, n: usize) -> Result<Vec<Refill>, StoreError> {
        Self::check(&self.fail_reads, "get latest refills")?;
        self.inner.latest_refills(n).await
    }

    async fn measurements_between(
        &self,
        low: f64,
        high: f64,
        order: Order,
    ) -> Result<Vec<Measurement>, StoreError> {
        Self::check(&self.fail_reads, "get measurements in range")?;
        Self::check(&self.fail_measurement_reads, "get measurements in range")?;
        self.inner.measurements_between(low, high, order).await
    }

    async fn refills_between(
        &self,
        low: f64,
        high: f64,
        order: Order,
    ) -> Result<Vec<Refill>, StoreError> {
        Self::check(&self.fail_reads, "get refills in range")?;
        self.inner.refills_between(low, high, order).await
    }
}
