pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod gas;
pub mod pipeline;
pub mod sensor;
pub mod store;

pub use error::{Error, SensorError, StoreError};
