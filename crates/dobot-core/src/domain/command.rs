//! Queued units of deferred actuation work.

use std::fmt;

/// The three motion sequences the robot knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Leave the charging bay after a `START_REQ`.
    Start,
    /// Back into a parking slot after `CONTROL_REQ{control: true}`.
    Park,
    /// Pull out of the slot and resume line tracing after
    /// `CONTROL_REQ{control: false}`.
    Drive,
}

impl SequenceKind {
    /// Stable name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SequenceKind::Start => "start_sequence",
            SequenceKind::Park => "park_sequence",
            SequenceKind::Drive => "drive_sequence",
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work handed from the receive path to the executor.
///
/// Created once by the message router and consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: SequenceKind,
    /// Reserved for per-command parameters; always `None` today.
    pub argument: Option<String>,
}

impl Command {
    /// Creates a command with no argument.
    pub fn new(kind: SequenceKind) -> Self {
        Self {
            kind,
            argument: None,
        }
    }
}
