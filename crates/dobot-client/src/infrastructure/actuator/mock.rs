//! Recording actuator for simulation mode and tests.
//!
//! Every call is stored as the [`MotionStep`] it corresponds to, in call
//! order, so tests can compare against a sequence's step list directly.
//! Failed calls are recorded too.
//!
//! ```ignore
//! let actuator = Arc::new(MockActuator::new());
//! actuator.fail_on_call(2);
//! // ... run a sequence ...
//! assert_eq!(actuator.call_names(), vec!["move_to", "rotate"]);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dobot_core::MotionStep;
use tracing::debug;

use crate::application::execute_sequence::{ActuationError, Actuator};

/// An actuator that records calls instead of moving a robot.
#[derive(Default)]
pub struct MockActuator {
    calls: Mutex<Vec<MotionStep>>,
    /// 1-based index of the call that fails; 0 disables injection.
    fail_on: AtomicUsize,
    step_delay: Duration,
}

impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call take `delay`, to mimic a real robot.
    pub fn with_step_delay(delay: Duration) -> Self {
        Self {
            step_delay: delay,
            ..Self::default()
        }
    }

    /// Makes the `n`-th call (1-based, counted from now on) fail.
    pub fn fail_on_call(&self, n: usize) {
        let already = self.calls().len();
        self.fail_on.store(already + n, Ordering::SeqCst);
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<MotionStep> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Trait method names of every call, e.g. `"move_to"`.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls()
            .iter()
            .map(|step| match step {
                MotionStep::ResetOdometry { .. } => "reset_odometry",
                MotionStep::Move { .. } => "move_to",
                MotionStep::Rotate { .. } => "rotate",
                MotionStep::AutoTrace { .. } => "set_auto_trace",
            })
            .collect()
    }

    async fn record(&self, step: MotionStep) -> Result<(), ActuationError> {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
        let index = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(step);
                calls.len()
            }
            Err(_) => return Err(ActuationError::Driver("call log poisoned".into())),
        };
        debug!(call = index, "simulated {step}");

        if self.fail_on.load(Ordering::SeqCst) == index {
            return Err(ActuationError::Driver(format!("simulated failure on call {index}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Actuator for MockActuator {
    async fn reset_odometry(&self, x: f64, y: f64, yaw: f64) -> Result<(), ActuationError> {
        self.record(MotionStep::ResetOdometry { x, y, yaw }).await
    }

    async fn move_to(&self, x: f64, y: f64, speed: f64) -> Result<(), ActuationError> {
        self.record(MotionStep::Move { x, y, speed }).await
    }

    async fn rotate(&self, angle: f64, angular_speed: f64) -> Result<(), ActuationError> {
        self.record(MotionStep::Rotate {
            angle,
            angular_speed,
        })
        .await
    }

    async fn set_auto_trace(&self, enabled: bool) -> Result<(), ActuationError> {
        self.record(MotionStep::AutoTrace { enabled }).await
    }
}
