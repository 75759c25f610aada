//! Infrastructure layer for the client application.
//!
//! Contains the adapters behind the application layer's seams: the TCP
//! session, robot capability implementations and configuration loading.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `dobot_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`network`** – [`TransportSession`](network::TransportSession): connect,
//!   identify, framed send/receive, idempotent disconnect.  Implements the
//!   application's `MessageSink` port.
//!
//! - **`actuator`** – `MockActuator`, the simulated robot used when
//!   `[robot] simulate = true` and throughout the tests.
//!
//! - **`sensor`** – `FixedVoltageSensor`, the simulated voltage source.
//!
//! - **`storage`** – TOML configuration file loading.

pub mod actuator;
pub mod network;
pub mod sensor;
pub mod storage;
