//! Constant-voltage sensor for simulation mode and tests.

use std::sync::Mutex;

use crate::application::read_battery::{SensorError, VoltageSensor};

/// Reports a voltage set by the caller, or fails on demand.
pub struct FixedVoltageSensor {
    reading: Mutex<Result<f64, String>>,
}

impl FixedVoltageSensor {
    /// A sensor that always reads `voltage`.
    pub fn new(voltage: f64) -> Self {
        Self {
            reading: Mutex::new(Ok(voltage)),
        }
    }

    /// A sensor whose reads fail with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            reading: Mutex::new(Err(message.to_string())),
        }
    }

    pub fn set_voltage(&self, voltage: f64) {
        if let Ok(mut reading) = self.reading.lock() {
            *reading = Ok(voltage);
        }
    }
}

impl VoltageSensor for FixedVoltageSensor {
    fn read_voltage(&self) -> Result<f64, SensorError> {
        match self.reading.lock() {
            Ok(reading) => reading.clone().map_err(SensorError::Read),
            Err(_) => Err(SensorError::Read("sensor state poisoned".into())),
        }
    }
}
