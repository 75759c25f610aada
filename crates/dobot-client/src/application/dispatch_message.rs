//! MessageRouter: reacts to each message received from the server.
//!
//! Runs on the receive task.  Anything quick (acknowledgements, battery
//! status) is answered immediately; anything that moves the robot is queued
//! for the actuation executor so the socket keeps being read while the robot
//! is busy.
//!
//! | msg           | Condition         | Immediate reply          | Queued           |
//! |---------------|-------------------|--------------------------|------------------|
//! | `START_REQ`   | `active` truthy   | `START_RES{true}`        | `start_sequence` |
//! | `START_REQ`   | `active` falsy    | –                        | –                |
//! | `CONTROL_REQ` | `control` truthy  | –                        | `park_sequence`  |
//! | `CONTROL_REQ` | `control` falsy   | –                        | `drive_sequence` |
//! | `STATUS_REQ`  | –                 | `STATUS_RES{battery}`    | –                |
//! | other         | –                 | – (logged)               | –                |
//!
//! `START_RES` is sent before the start command is queued: the server learns
//! the request was accepted without waiting for the motion to finish.

use std::sync::Arc;

use dobot_core::{Command, Message, Request, SequenceKind};
use tracing::{info, warn};

use crate::application::command_queue::CommandSender;
use crate::application::outbound::MessageSink;
use crate::application::read_battery::BatteryGauge;

/// What the router did with one message.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// `START_REQ` accepted: acknowledgement attempted, start sequence queued.
    StartAccepted { acknowledged: bool },
    /// `START_REQ` with a falsy `active` flag; nothing done.
    StartIgnored,
    /// `CONTROL_REQ` queued the given sequence.
    Queued(SequenceKind),
    /// `STATUS_REQ` answered with this level.
    StatusReported { battery: f64, sent: bool },
    /// Unknown message type, logged and dropped.
    Unrecognized(String),
}

/// Routes decoded messages to immediate replies and queued commands.
pub struct MessageRouter {
    sink: Arc<dyn MessageSink>,
    queue: CommandSender,
    battery: BatteryGauge,
}

impl MessageRouter {
    /// Creates a router replying through `sink` and queuing onto `queue`.
    pub fn new(sink: Arc<dyn MessageSink>, queue: CommandSender, battery: BatteryGauge) -> Self {
        Self {
            sink,
            queue,
            battery,
        }
    }

    /// Handles one message from the server.
    pub async fn handle(&self, msg: &Message) -> Dispatch {
        match Request::from(msg) {
            Request::Start { active, reason } => {
                info!(active, reason = reason.as_deref().unwrap_or(""), "START_REQ received");
                if !active {
                    return Dispatch::StartIgnored;
                }
                let acknowledged = self.sink.send(&Message::start_response(true)).await;
                if acknowledged {
                    info!("START_RES sent");
                } else {
                    warn!("START_RES could not be sent");
                }
                self.queue.push(Command::new(SequenceKind::Start));
                Dispatch::StartAccepted { acknowledged }
            }

            Request::Control { control } => {
                let kind = if control {
                    SequenceKind::Park
                } else {
                    SequenceKind::Drive
                };
                info!(control, sequence = %kind, "CONTROL_REQ received");
                self.queue.push(Command::new(kind));
                Dispatch::Queued(kind)
            }

            Request::Status => {
                let battery = self.battery.read_level();
                let sent = self.sink.send(&Message::status_response(battery)).await;
                info!(battery, sent, "STATUS_REQ answered ({:.1}%)", battery * 100.0);
                Dispatch::StatusReported { battery, sent }
            }

            Request::Unrecognized { msg_type, reason } => {
                match reason {
                    Some(reason) => info!(msg = %msg_type, %reason, "unhandled message type"),
                    None => info!(msg = %msg_type, "unhandled message type"),
                }
                Dispatch::Unrecognized(msg_type)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
