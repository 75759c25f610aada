//! Voltage sensor implementations.

pub mod fixed;
