//! Domain types for the robot client.
//!
//! Pure logic with no I/O: what a queued command is, which motion steps each
//! sequence performs, and how a supply voltage becomes a battery level.
//! Everything here can be tested without a robot or a server.

/// Queued actuation work.
pub mod command;

/// Fixed motion sequences and the reports that bracket them.
pub mod sequence;

/// Voltage to battery-level conversion.
pub mod battery;
