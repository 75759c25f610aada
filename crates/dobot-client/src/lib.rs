//! dobot-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does dobot-client do?
//!
//! The client runs next to a Dobot mobile robot and takes orders from the
//! parking control server over TCP:
//!
//! 1. Connects to the server and identifies itself (`CLIENT_IDENTIFY_REQ`).
//! 2. Reads length-prefixed JSON messages on a dedicated receive task.
//! 3. Answers `START_REQ` and `STATUS_REQ` immediately; turns `START_REQ`
//!    and `CONTROL_REQ` into queued motion commands.
//! 4. Executes queued commands one at a time against the robot and reports
//!    park / drive-out progress back with `CONTROL_RES`.
//! 5. Shuts down when the server disconnects or on Ctrl-C.

/// Application layer: use cases and capability traits.
pub mod application;

/// Infrastructure layer: network session, capability adapters, configuration.
pub mod infrastructure;

/// Session lifecycle: wires the layers together for one connection.
pub mod supervisor;
