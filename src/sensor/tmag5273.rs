//! TI TMAG5273 3D Hall-effect sensor, used to read the tank gauge's needle
//! angle over I2C.

use embedded_hal::i2c::I2c;
use tracing::debug;

use crate::error::SensorError;
use crate::sensor::calibration::{DIAL_TABLE, angle_to_level};
use crate::sensor::{Reading, Sensor};

pub const DEFAULT_ADDRESS: u8 = 0x22;

const REG_DEVICE_CONFIG_1: u8 = 0x00;
const REG_DEVICE_CONFIG_2: u8 = 0x01;
const REG_SENSOR_CONFIG_1: u8 = 0x02;
const REG_SENSOR_CONFIG_2: u8 = 0x03;
const REG_T_CONFIG: u8 = 0x07;
const REG_T_MSB_RESULT: u8 = 0x10;
const REG_ANGLE_RESULT_MSB: u8 = 0x19;
const REG_DEVICE_STATUS: u8 = 0x1C;

// (mask, lsb)
const CONV_AVG: (u8, u8) = (0x1C, 2);
const OPERATING_MODE: (u8, u8) = (0x03, 0);
const LOW_POWER: (u8, u8) = (0x10, 4);
const CHANNEL_MODE: (u8, u8) = (0xF0, 4);
const ANGLE_EN: (u8, u8) = (0x0C, 2);
const TEMPERATURE_EN: (u8, u8) = (0x01, 0);

const STATUS_VCC_UV_ERROR: u8 = 0x01;
const STATUS_OTP_CRC_ERROR: u8 = 0x02;
const STATUS_INT_ERROR: u8 = 0x04;
const STATUS_OSCILLATOR_ERROR: u8 = 0x08;
pub const STATUS_FAULT_BITS: u8 =
    STATUS_VCC_UV_ERROR | STATUS_OTP_CRC_ERROR | STATUS_INT_ERROR | STATUS_OSCILLATOR_ERROR;

const TSENSE_T0: f64 = 25.0;
const TADC_T0: f64 = 17508.0;
const TADC_RES: f64 = 60.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperatingMode {
    Standby = 0x0,
    Sleep = 0x1,
    ContinuousMeasure = 0x2,
    WakeUpAndSleep = 0x3,
}

impl From<u8> for OperatingMode {
    fn from(v: u8) -> Self {
        match v & 0x3 {
            0x0 => OperatingMode::Standby,
            0x1 => OperatingMode::Sleep,
            0x2 => OperatingMode::ContinuousMeasure,
            _ => OperatingMode::WakeUpAndSleep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MagneticChannel {
    Off = 0x0,
    X = 0x1,
    Y = 0x2,
    XY = 0x3,
    Z = 0x4,
    ZX = 0x5,
    YZ = 0x6,
    XYZ = 0x7,
    XYX = 0x8,
    YXY = 0x9,
    YZY = 0xA,
    XZX = 0xB,
}

impl TryFrom<u8> for MagneticChannel {
    type Error = SensorError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Ok(match v {
            0x0 => MagneticChannel::Off,
            0x1 => MagneticChannel::X,
            0x2 => MagneticChannel::Y,
            0x3 => MagneticChannel::XY,
            0x4 => MagneticChannel::Z,
            0x5 => MagneticChannel::ZX,
            0x6 => MagneticChannel::YZ,
            0x7 => MagneticChannel::XYZ,
            0x8 => MagneticChannel::XYX,
            0x9 => MagneticChannel::YXY,
            0xA => MagneticChannel::YZY,
            0xB => MagneticChannel::XZX,
            _ => {
                return Err(SensorError::InvalidMode {
                    field: "magnetic channel",
                    value: v,
                });
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AngleCalculation {
    Off = 0x0,
    XY = 0x1,
    YZ = 0x2,
    XZ = 0x3,
}

/// Additional samples averaged per conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConversionAverage {
    X1 = 0x0,
    X2 = 0x1,
    X4 = 0x2,
    X8 = 0x3,
    X16 = 0x4,
    X32 = 0x5,
}

pub struct Tmag5273<I> {
    i2c: I,
    address: u8,
    table: &'static [(f64, f64)],
}

impl<I: I2c> Tmag5273<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            table: &DIAL_TABLE,
        }
    }

    pub fn with_calibration(mut self, table: &'static [(f64, f64)]) -> Self {
        self.table = table;
        self
    }

    pub fn release(self) -> I {
        self.i2c
    }

    /// Sets up 32x averaged XY angle measurement with the temperature channel
    /// on, then verifies every field by reading it back.
    pub fn configure(&mut self) -> Result<(), SensorError> {
        let fields = [
            (REG_DEVICE_CONFIG_1, CONV_AVG, ConversionAverage::X32 as u8),
            (REG_DEVICE_CONFIG_2, LOW_POWER, 0x0),
            (REG_SENSOR_CONFIG_1, CHANNEL_MODE, MagneticChannel::XYX as u8),
            (REG_SENSOR_CONFIG_2, ANGLE_EN, AngleCalculation::XY as u8),
            (REG_T_CONFIG, TEMPERATURE_EN, 0x1),
        ];

        for (register, field, value) in fields {
            self.write_field(register, field, value, "configure")?;
        }

        self.check_health()?;

        for (register, (mask, lsb), value) in fields {
            let actual = (self.read_register(register, "verify configuration")? & mask) >> lsb;
            if actual != value {
                return Err(SensorError::ConfigMismatch {
                    register,
                    expected: value,
                    actual,
                });
            }
        }

        debug!(address = self.address, "TMAG5273 configured");
        Ok(())
    }

    pub fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), SensorError> {
        self.write_field(
            REG_DEVICE_CONFIG_2,
            OPERATING_MODE,
            mode as u8,
            "set operating mode",
        )?;
        debug!(?mode, "TMAG5273 operating mode set");
        Ok(())
    }

    pub fn operating_mode(&mut self) -> Result<OperatingMode, SensorError> {
        let v = self.read_field(REG_DEVICE_CONFIG_2, OPERATING_MODE, "read operating mode")?;
        Ok(OperatingMode::from(v))
    }

    pub fn magnetic_channel(&mut self) -> Result<MagneticChannel, SensorError> {
        let v = self.read_field(REG_SENSOR_CONFIG_1, CHANNEL_MODE, "read magnetic channel")?;
        MagneticChannel::try_from(v)
    }

    pub fn device_status(&mut self) -> Result<u8, SensorError> {
        self.read_register(REG_DEVICE_STATUS, "read device status")
    }

    /// Needle angle in degrees, 0 to 360 with 1/16° resolution.
    pub fn angle(&mut self) -> Result<f64, SensorError> {
        let raw = self.read_u16(REG_ANGLE_RESULT_MSB, "read angle result")?;
        let fraction = f64::from(raw & 0xF) / 16.0;
        let integer = f64::from((raw >> 4) & 0x1FF);
        Ok(integer + fraction)
    }

    /// Die temperature in degrees Celsius.
    pub fn temperature(&mut self) -> Result<f64, SensorError> {
        let raw = self.read_u16(REG_T_MSB_RESULT, "read temperature result")?;
        Ok(TSENSE_T0 + (f64::from(raw) - TADC_T0) / TADC_RES)
    }

    fn read_register(&mut self, register: u8, operation: &'static str) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| bus_error(operation, e))?;
        Ok(buf[0])
    }

    fn read_u16(&mut self, register: u8, operation: &'static str) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| bus_error(operation, e))?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_field(
        &mut self,
        register: u8,
        (mask, lsb): (u8, u8),
        operation: &'static str,
    ) -> Result<u8, SensorError> {
        Ok((self.read_register(register, operation)? & mask) >> lsb)
    }

    fn write_field(
        &mut self,
        register: u8,
        (mask, lsb): (u8, u8),
        value: u8,
        operation: &'static str,
    ) -> Result<(), SensorError> {
        let current = self.read_register(register, operation)?;
        let updated = (current & !mask) | ((value << lsb) & mask);
        self.i2c
            .write(self.address, &[register, updated])
            .map_err(|e| bus_error(operation, e))
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(operation: &'static str, e: E) -> SensorError {
    SensorError::Bus {
        operation,
        details: format!("{:?}", e.kind()),
    }
}

impl<I: I2c> Sensor for Tmag5273<I> {
    fn check_health(&mut self) -> Result<(), SensorError> {
        let status = self.device_status()?;
        if status & STATUS_FAULT_BITS != 0 {
            return Err(SensorError::StatusFault { status });
        }
        Ok(())
    }

    fn read_level(&mut self) -> Result<f64, SensorError> {
        let angle = self.angle()?;
        let level = angle_to_level(angle, self.table);
        debug!(angle, level, "gauge angle read");
        Ok(level)
    }

    fn read_temperature(&mut self) -> Result<i32, SensorError> {
        Ok(self.temperature()?.trunc() as i32)
    }

    fn sample(&mut self) -> Result<Reading, SensorError> {
        self.set_operating_mode(OperatingMode::ContinuousMeasure)?;
        self.check_health()?;
        let level = self.read_level()?;
        let temperature = self.read_temperature()?;
        self.set_operating_mode(OperatingMode::Standby)?;

        Ok(Reading { level, temperature })
    }

    fn standby(&mut self) -> Result<(), SensorError> {
        self.set_operating_mode(OperatingMode::Standby)
    }
}
