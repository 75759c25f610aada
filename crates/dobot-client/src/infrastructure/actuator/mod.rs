//! Actuator implementations.
//!
//! Only the in-process simulation lives here; a driver for the physical
//! robot implements the same [`Actuator`](crate::application::execute_sequence::Actuator)
//! trait and is injected the same way.

pub mod mock;
