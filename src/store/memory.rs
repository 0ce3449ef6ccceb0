use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::gas::{Measurement, Refill};
use crate::store::{Order, TimeSeriesStore};

trait Timed: Clone {
    fn time(&self) -> f64;
}

impl Timed for Measurement {
    fn time(&self) -> f64 {
        self.time
    }
}

impl Timed for Refill {
    fn time(&self) -> f64 {
        self.time
    }
}

/// In-process store. Each series is a `Vec` kept sorted by time.
#[derive(Debug, Default)]
pub struct MemoryStore {
    measurements: Mutex<Vec<Measurement>>,
    refills: Mutex<Vec<Refill>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measurement_count(&self) -> usize {
        self.measurements.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn refill_count(&self) -> usize {
        self.refills.lock().map(|l| l.len()).unwrap_or(0)
    }
}

fn insert<T: Timed>(
    series: &Mutex<Vec<T>>,
    record: &T,
    operation: &'static str,
) -> Result<(), StoreError> {
    let mut l = series.lock().map_err(|_| poisoned(operation))?;

    let at = l.partition_point(|r| r.time() < record.time());
    if l.get(at).is_some_and(|r| r.time() == record.time()) {
        return Ok(());
    }

    l.insert(at, record.clone());
    Ok(())
}

fn latest<T: Timed>(
    series: &Mutex<Vec<T>>,
    n: usize,
    operation: &'static str,
) -> Result<Vec<T>, StoreError> {
    let l = series.lock().map_err(|_| poisoned(operation))?;
    Ok(l.iter().rev().take(n).cloned().collect())
}

fn between<T: Timed>(
    series: &Mutex<Vec<T>>,
    low: f64,
    high: f64,
    order: Order,
    operation: &'static str,
) -> Result<Vec<T>, StoreError> {
    let l = series.lock().map_err(|_| poisoned(operation))?;

    let mut records: Vec<T> = l
        .iter()
        .filter(|r| low <= r.time() && r.time() <= high)
        .cloned()
        .collect();
    if order == Order::Descending {
        records.reverse();
    }

    Ok(records)
}

fn poisoned(operation: &'static str) -> StoreError {
    StoreError::Unavailable {
        operation,
        details: "memory store lock poisoned".to_string(),
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryStore {
    async fn insert_measurement(&self, measurement: &Measurement) -> Result<(), StoreError> {
        insert(&self.measurements, measurement, "insert measurement")
    }

    async fn insert_refill(&self, refill: &Refill) -> Result<(), StoreError> {
        insert(&self.refills, refill, "insert refill")
    }

    async fn latest_measurements(&self, n: usize) -> Result<Vec<Measurement>, StoreError> {
        latest(&self.measurements, n, "get latest measurements")
    }

    async fn latest_refills(&self, n: usize) -> Result<Vec<Refill>, StoreError> {
        latest(&self.refills, n, "get latest refills")
    }

    async fn measurements_between(
        &self,
        low: f64,
        high: f64,
        order: Order,
    ) -> Result<Vec<Measurement>, StoreError> {
        between(&self.measurements, low, high, order, "get measurements in range")
    }

    async fn refills_between(
        &self,
        low: f64,
        high: f64,
        order: Order,
    ) -> Result<Vec<Refill>, StoreError> {
        between(&self.refills, low, high, order, "get refills in range")
    }
}
