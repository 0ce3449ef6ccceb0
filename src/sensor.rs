pub mod calibration;
pub mod tmag5273;

use crate::error::SensorError;

pub use tmag5273::Tmag5273;

/// One calibrated sample from the level sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Fill level in percent.
    pub level: f64,
    /// Degrees Celsius.
    pub temperature: i32,
}

/// A device that reports the tank's fill level.
///
/// Implementations own any register access and power management. The
/// sampling pipeline only calls [`Sensor::sample`] and, after a fault or at
/// shutdown, [`Sensor::standby`].
pub trait Sensor {
    fn check_health(&mut self) -> Result<(), SensorError>;

    fn read_level(&mut self) -> Result<f64, SensorError>;

    fn read_temperature(&mut self) -> Result<i32, SensorError>;

    fn sample(&mut self) -> Result<Reading, SensorError> {
        self.check_health()?;
        let level = self.read_level()?;
        let temperature = self.read_temperature()?;
        Ok(Reading { level, temperature })
    }

    /// Puts the device in its low-power idle mode.
    fn standby(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
}
