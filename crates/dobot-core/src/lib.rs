//! # dobot-core
//!
//! Shared library for Dobot Link containing the wire protocol codec and the
//! domain model of the robot client.
//!
//! It opens no sockets and talks to no robot; the `dobot-client` crate wires
//! these pieces to a TCP session and an actuator.
//!
//! - **`protocol`** – How messages travel over the network.  Each message is
//!   a JSON object preceded by a 4-byte little-endian length.
//!
//! - **`domain`** – Commands queued for the executor, the fixed motion
//!   sequences, and the battery level model.

pub mod domain;
pub mod protocol;

pub use domain::command::{Command, SequenceKind};
pub use domain::sequence::{ControlReport, MotionStep, SequencePlan};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::{Message, Request};
pub use protocol::reader::{read_message, ReadError};
