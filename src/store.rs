mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::gas::{Measurement, Refill};

pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Two ordered series, measurements and refills, both keyed by `time`.
///
/// Writes are atomic per record only. Inserting a record whose `time` is
/// already present leaves the stored record untouched.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    async fn insert_measurement(&self, measurement: &Measurement) -> Result<(), StoreError>;

    async fn insert_refill(&self, refill: &Refill) -> Result<(), StoreError>;

    /// Up to `n` measurements, newest first.
    async fn latest_measurements(&self, n: usize) -> Result<Vec<Measurement>, StoreError>;

    /// Up to `n` refills, newest first.
    async fn latest_refills(&self, n: usize) -> Result<Vec<Refill>, StoreError>;

    /// Measurements with `low <= time <= high`.
    async fn measurements_between(
        &self,
        low: f64,
        high: f64,
        order: Order,
    ) -> Result<Vec<Measurement>, StoreError>;

    /// Refills with `low <= time <= high`.
    async fn refills_between(
        &self,
        low: f64,
        high: f64,
        order: Order,
    ) -> Result<Vec<Refill>, StoreError>;

    async fn latest_measurement(&self) -> Result<Option<Measurement>, StoreError> {
        Ok(self.latest_measurements(1).await?.into_iter().next())
    }

    async fn latest_refill(&self) -> Result<Option<Refill>, StoreError> {
        Ok(self.latest_refills(1).await?.into_iter().next())
    }
}
