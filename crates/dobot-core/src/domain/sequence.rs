//! Fixed motion sequences.
//!
//! Each [`SequenceKind`] maps to a [`SequencePlan`]: the ordered motion steps
//! plus the `CONTROL_RES` reports that bracket them.  Plans are data so the
//! executor stays a single generic loop and tests can assert on exact step
//! lists.
//!
//! Units follow the robot driver: millimetres for positions, degrees for
//! angles, driver speed units for `speed` and `angular_speed`.

use std::fmt;

use crate::domain::command::SequenceKind;

/// One call into the actuator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStep {
    /// Redefine the current pose as `(x, y, yaw)`.
    ResetOdometry { x: f64, y: f64, yaw: f64 },
    /// Drive to `(x, y)` relative to the odometry origin.
    Move { x: f64, y: f64, speed: f64 },
    /// Turn in place by `angle` degrees.
    Rotate { angle: f64, angular_speed: f64 },
    /// Switch autonomous line tracing on or off.
    AutoTrace { enabled: bool },
}

impl fmt::Display for MotionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionStep::ResetOdometry { x, y, yaw } => {
                write!(f, "reset odometry (x={x}, y={y}, yaw={yaw})")
            }
            MotionStep::Move { x, y, speed } => write!(f, "move (x={x}, y={y}, s={speed})"),
            MotionStep::Rotate {
                angle,
                angular_speed,
            } => write!(f, "rotate (r={angle}, Vr={angular_speed})"),
            MotionStep::AutoTrace { enabled } => write!(f, "auto trace (enabled={enabled})"),
        }
    }
}

/// A `CONTROL_RES` report emitted around a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlReport {
    pub reason: Option<&'static str>,
    pub control_status: bool,
}

/// Everything the executor needs to run one sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencePlan {
    pub kind: SequenceKind,
    pub steps: &'static [MotionStep],
    /// Sent before the first step, only when the actuator is present.
    pub announce: Option<ControlReport>,
    /// Sent after the last step succeeds.
    pub on_success: Option<ControlReport>,
    /// Sent when a step fails or the actuator is absent.
    pub on_failure: Option<ControlReport>,
}

const ORIGIN: MotionStep = MotionStep::ResetOdometry {
    x: 0.0,
    y: 0.0,
    yaw: 0.0,
};

/// Leave the bay: forward along the line, quarter turn, forward again.
pub const START_STEPS: &[MotionStep] = &[
    ORIGIN,
    MotionStep::Move {
        x: 250.0,
        y: 10.0,
        speed: 50.0,
    },
    MotionStep::Rotate {
        angle: 90.0,
        angular_speed: 100.0,
    },
    ORIGIN,
    MotionStep::Move {
        x: 100.0,
        y: 0.0,
        speed: 50.0,
    },
];

/// Park: pull past the slot, turn, reverse in.
pub const PARK_STEPS: &[MotionStep] = &[
    MotionStep::Move {
        x: 50.0,
        y: 0.0,
        speed: 50.0,
    },
    MotionStep::Rotate {
        angle: -90.0,
        angular_speed: 100.0,
    },
    ORIGIN,
    MotionStep::Move {
        x: -50.0,
        y: 0.0,
        speed: 30.0,
    },
];

/// Drive out: leave the slot, turn onto the line, hand over to line tracing.
pub const DRIVE_STEPS: &[MotionStep] = &[
    MotionStep::Move {
        x: 0.0,
        y: 0.0,
        speed: 30.0,
    },
    MotionStep::Rotate {
        angle: 90.0,
        angular_speed: 100.0,
    },
    ORIGIN,
    MotionStep::AutoTrace { enabled: true },
];

/// Reason text sent when parking starts.
pub const PARKING_REASON: &str = "parking";

/// Reason text sent when driving out starts.
pub const DRIVING_OUT_REASON: &str = "driving out";

impl SequenceKind {
    /// Returns the fixed plan for this sequence.
    pub fn plan(self) -> SequencePlan {
        match self {
            // START_RES is acknowledged by the router; nothing is reported here.
            SequenceKind::Start => SequencePlan {
                kind: self,
                steps: START_STEPS,
                announce: None,
                on_success: None,
                on_failure: None,
            },
            SequenceKind::Park => SequencePlan {
                kind: self,
                steps: PARK_STEPS,
                announce: Some(ControlReport {
                    reason: Some(PARKING_REASON),
                    control_status: false,
                }),
                on_success: Some(ControlReport {
                    reason: None,
                    control_status: true,
                }),
                on_failure: Some(ControlReport {
                    reason: None,
                    control_status: false,
                }),
            },
            // The server treats drive-out as successful from the moment it is
            // announced; no failure report exists for this sequence.
            SequenceKind::Drive => SequencePlan {
                kind: self,
                steps: DRIVE_STEPS,
                announce: Some(ControlReport {
                    reason: Some(DRIVING_OUT_REASON),
                    control_status: true,
                }),
                on_success: None,
                on_failure: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_plan_reports_nothing() {
        let plan = SequenceKind::Start.plan();

        assert_eq!(plan.steps.len(), 5);
        assert_eq!(plan.announce, None);
        assert_eq!(plan.on_success, None);
        assert_eq!(plan.on_failure, None);
    }

    #[test]
    fn test_park_plan_step_order() {
        let plan = SequenceKind::Park.plan();

        assert!(matches!(plan.steps[0], MotionStep::Move { .. }));
        assert!(matches!(plan.steps[1], MotionStep::Rotate { .. }));
        assert!(matches!(plan.steps[2], MotionStep::ResetOdometry { .. }));
        assert!(matches!(plan.steps[3], MotionStep::Move { x, .. } if x < 0.0));
        assert_eq!(plan.steps.len(), 4);
    }

    #[test]
    fn test_park_plan_reports() {
        let plan = SequenceKind::Park.plan();

        assert_eq!(
            plan.announce,
            Some(ControlReport {
                reason: Some("parking"),
                control_status: false
            })
        );
        assert_eq!(plan.on_success.map(|r| r.control_status), Some(true));
        assert_eq!(plan.on_failure.map(|r| r.control_status), Some(false));
    }

    #[test]
    fn test_drive_plan_ends_with_auto_trace_and_has_no_failure_report() {
        let plan = SequenceKind::Drive.plan();

        assert_eq!(
            plan.steps.last(),
            Some(&MotionStep::AutoTrace { enabled: true })
        );
        assert_eq!(plan.announce.map(|r| r.control_status), Some(true));
        assert_eq!(plan.on_failure, None);
    }

    #[test]
    fn test_motion_step_display() {
        let step = MotionStep::Rotate {
            angle: -90.0,
            angular_speed: 100.0,
        };

        assert_eq!(step.to_string(), "rotate (r=-90, Vr=100)");
    }
}
