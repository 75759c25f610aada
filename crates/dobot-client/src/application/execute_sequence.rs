//! ActuationExecutor: runs queued motion sequences against the robot.
//!
//! The executor is the only code that moves the robot.  It polls the
//! [`CommandReceiver`], and for each command runs the fixed
//! [`SequencePlan`](dobot_core::SequencePlan) for its kind:
//!
//! 1. If the actuator is absent, log, send the plan's failure report (park
//!    only) and stop.
//! 2. Send the plan's announcement, if any.
//! 3. Run every step in order.  The first failing step aborts the rest and
//!    sends the plan's failure report, if any.
//! 4. Send the plan's success report, if any.
//!
//! Sequences are never retried or resumed.  A failure affects only the
//! current command; the loop goes on polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dobot_core::{Command, ControlReport, Message, MotionStep, SequenceKind};
use thiserror::Error;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::application::command_queue::CommandReceiver;
use crate::application::outbound::MessageSink;

/// Error type for actuator calls.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActuationError {
    /// The robot driver rejected or failed the call.
    #[error("driver error: {0}")]
    Driver(String),
}

/// Robot motion capability.
///
/// Implementations talk to the physical robot; calls may take seconds.
/// Blocking drivers should move their work off the async runtime (e.g.
/// `tokio::task::spawn_blocking`).
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Redefines the current pose as `(x, y, yaw)`.
    async fn reset_odometry(&self, x: f64, y: f64, yaw: f64) -> Result<(), ActuationError>;

    /// Drives to `(x, y)` relative to the odometry origin.
    async fn move_to(&self, x: f64, y: f64, speed: f64) -> Result<(), ActuationError>;

    /// Turns in place by `angle` degrees.
    async fn rotate(&self, angle: f64, angular_speed: f64) -> Result<(), ActuationError>;

    /// Switches autonomous line tracing on or off.
    async fn set_auto_trace(&self, enabled: bool) -> Result<(), ActuationError>;
}

/// Executes one motion step on `actuator`.
pub async fn apply_step(actuator: &dyn Actuator, step: &MotionStep) -> Result<(), ActuationError> {
    match *step {
        MotionStep::ResetOdometry { x, y, yaw } => actuator.reset_odometry(x, y, yaw).await,
        MotionStep::Move { x, y, speed } => actuator.move_to(x, y, speed).await,
        MotionStep::Rotate {
            angle,
            angular_speed,
        } => actuator.rotate(angle, angular_speed).await,
        MotionStep::AutoTrace { enabled } => actuator.set_auto_trace(enabled).await,
    }
}

/// Executor tuning.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Sleep between queue polls while idle.
    pub poll_interval: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// How a sequence ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceOutcome {
    /// Every step succeeded.
    Completed,
    /// Step `step` (1-based) failed; later steps were skipped.
    Failed { step: usize, error: ActuationError },
    /// No actuator attached; nothing ran.
    ActuatorUnavailable,
}

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub kind: SequenceKind,
    pub steps_completed: usize,
    pub outcome: SequenceOutcome,
}

/// Single consumer of the command queue.
pub struct ActuationExecutor {
    actuator: Option<Arc<dyn Actuator>>,
    sink: Arc<dyn MessageSink>,
    config: ExecutorConfig,
}

impl ActuationExecutor {
    /// Creates an executor.  `actuator` is `None` when no robot is attached.
    pub fn new(
        actuator: Option<Arc<dyn Actuator>>,
        sink: Arc<dyn MessageSink>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            actuator,
            sink,
            config,
        }
    }

    /// Polls `queue` until `running` is cleared or the sink disconnects.
    ///
    /// Returns the number of commands executed.  Commands still queued when
    /// the loop stops are discarded with the receiver.
    pub async fn run(&self, queue: &mut CommandReceiver, running: &AtomicBool) -> usize {
        let mut executed = 0;
        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown requested; executor stopping");
                break;
            }
            if !self.sink.is_connected() {
                info!("session disconnected; executor stopping");
                break;
            }

            match queue.try_pop() {
                Some(command) => {
                    let report = self.execute(&command).await;
                    debug!(?report, "command finished");
                    executed += 1;
                }
                None => time::sleep(self.config.poll_interval).await,
            }
        }
        executed
    }

    /// Runs the sequence for `command` to completion or first failure.
    pub async fn execute(&self, command: &Command) -> ExecutionReport {
        let plan = command.kind.plan();

        let Some(actuator) = &self.actuator else {
            error!(sequence = %plan.kind, "actuator unavailable; sequence not run");
            if let Some(report) = plan.on_failure {
                self.report(report).await;
            }
            return ExecutionReport {
                kind: plan.kind,
                steps_completed: 0,
                outcome: SequenceOutcome::ActuatorUnavailable,
            };
        };

        info!(sequence = %plan.kind, "sequence started");
        if let Some(report) = plan.announce {
            self.report(report).await;
        }

        let total = plan.steps.len();
        for (index, step) in plan.steps.iter().enumerate() {
            let number = index + 1;
            if let Err(error) = apply_step(actuator.as_ref(), step).await {
                error!(
                    sequence = %plan.kind,
                    step_index = number,
                    total,
                    "[{number}/{total}] {step} failed: {error}"
                );
                if let Some(report) = plan.on_failure {
                    self.report(report).await;
                }
                return ExecutionReport {
                    kind: plan.kind,
                    steps_completed: index,
                    outcome: SequenceOutcome::Failed {
                        step: number,
                        error,
                    },
                };
            }
            info!(sequence = %plan.kind, "[{number}/{total}] {step}");
        }

        info!(sequence = %plan.kind, "sequence completed");
        if let Some(report) = plan.on_success {
            self.report(report).await;
        }
        ExecutionReport {
            kind: plan.kind,
            steps_completed: total,
            outcome: SequenceOutcome::Completed,
        }
    }

    async fn report(&self, report: ControlReport) {
        let msg = Message::control_response(report.reason, report.control_status);
        if self.sink.send(&msg).await {
            debug!(reason = report.reason, control_status = report.control_status, "CONTROL_RES sent");
        } else {
            warn!(
                reason = report.reason,
                control_status = report.control_status,
                "CONTROL_RES could not be sent"
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
