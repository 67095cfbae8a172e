//! # Integration Tests
//!
//! Flows spanning more than one subsystem, wired with the in-memory
//! adapters each crate ships.

pub mod confirmation_flow;
pub mod dispute_flow;
pub mod telemetry;
