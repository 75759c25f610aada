//! Application layer use cases for the client.
//!
//! # What use cases does the client have?
//!
//! - **`dispatch_message`** – `MessageRouter` reacts to each message read
//!   from the server: immediate replies for `START_REQ` and `STATUS_REQ`,
//!   queued motion commands for `START_REQ` and `CONTROL_REQ`.
//!
//! - **`execute_sequence`** – `ActuationExecutor` drains the command queue
//!   and runs one fixed motion sequence per command, reporting progress with
//!   `CONTROL_RES`.
//!
//! - **`read_battery`** – `BatteryGauge` turns a voltage reading into the
//!   level reported in `STATUS_RES`.
//!
//! - **`command_queue`** – the FIFO between the router (producer, receive
//!   task) and the executor (single consumer).
//!
//! - **`outbound`** – the `MessageSink` port both the router and the executor
//!   send through.
//!
//! Robot capabilities (`Actuator`, `VoltageSensor`) are traits defined here
//! and implemented in `infrastructure`, so every use case is testable
//! without a robot or a socket.

pub mod command_queue;
pub mod dispatch_message;
pub mod execute_sequence;
pub mod outbound;
pub mod read_battery;
