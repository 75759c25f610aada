//! Storage infrastructure: the client's TOML configuration file.
//!
//! The client only reads its configuration; it never writes it back.

pub mod config;
