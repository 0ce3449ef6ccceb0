//! Error types shared by the sampling pipeline, the sensor drivers and the
//! store adapters.

use thiserror::Error;

/// Faults reported by (or while talking to) the level sensor.
///
/// Any of these aborts the current sampling cycle before anything is written.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("i2c transfer failed while trying to {operation}: {details}")]
    Bus {
        operation: &'static str,
        details: String,
    },

    #[error("device status register reports a fault: 0x{status:02x}")]
    StatusFault { status: u8 },

    #[error(
        "register 0x{register:02x} does not hold the expected configuration: expected 0x{expected:02x}, got 0x{actual:02x}"
    )]
    ConfigMismatch { register: u8, expected: u8, actual: u8 },

    #[error("invalid {field}: 0x{value:02x}")]
    InvalidMode { field: &'static str, value: u8 },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to the time series store")]
    Connect {
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to {operation}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to run store migrations")]
    Migrate {
        #[source]
        source: sqlx::migrate::MigrateError,
    },

    #[error("failed to {operation}: {details}")]
    Unavailable {
        operation: &'static str,
        details: String,
    },
}

/// Why a sampling cycle was abandoned.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
