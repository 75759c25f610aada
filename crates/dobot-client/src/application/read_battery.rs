//! BatteryGauge: answers `STATUS_REQ` with a battery level.
//!
//! The level is computed on every request from a fresh sensor reading and is
//! never cached.  A `STATUS_RES` is always produced:
//!
//! | Sensor          | Reported level                                   |
//! |-----------------|--------------------------------------------------|
//! | present, ok     | voltage converted by [`level_from_voltage`]      |
//! | present, failed | [`FALLBACK_LEVEL`] (0.8)                         |
//! | absent          | uniform random in `[0.7, 1.0]` (simulation mode) |

use std::sync::Arc;

use dobot_core::domain::battery::{
    level_from_voltage, round_level, FALLBACK_LEVEL, SIMULATED_MAX_LEVEL, SIMULATED_MIN_LEVEL,
};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for sensor reads.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor error: {0}")]
    Read(String),
}

/// Reads the robot's supply voltage.
#[cfg_attr(test, mockall::automock)]
pub trait VoltageSensor: Send + Sync {
    /// Returns the current supply voltage in volts.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError`] if the robot does not answer.
    fn read_voltage(&self) -> Result<f64, SensorError>;
}

/// Turns sensor readings into battery levels.
#[derive(Clone)]
pub struct BatteryGauge {
    sensor: Option<Arc<dyn VoltageSensor>>,
}

impl BatteryGauge {
    /// Creates a gauge; `None` means no sensor is attached.
    pub fn new(sensor: Option<Arc<dyn VoltageSensor>>) -> Self {
        Self { sensor }
    }

    /// Returns the current battery level in `[0.0, 1.0]`.
    pub fn read_level(&self) -> f64 {
        let Some(sensor) = &self.sensor else {
            warn!("no voltage sensor attached; reporting simulated battery level");
            let simulated = rand::thread_rng().gen_range(SIMULATED_MIN_LEVEL..=SIMULATED_MAX_LEVEL);
            return round_level(simulated);
        };

        match sensor.read_voltage() {
            Ok(voltage) => {
                debug!(voltage, "battery voltage read");
                level_from_voltage(voltage)
            }
            Err(e) => {
                warn!("battery read failed, reporting {FALLBACK_LEVEL}: {e}");
                FALLBACK_LEVEL
            }
        }
    }
}
