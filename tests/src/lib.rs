//! # Control-Component Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Simulated control components, election data
//! └── integration/      # Cross-subsystem flows
//!     ├── confirmation_flow.rs   # cc-01 over the fan-in bus
//!     ├── dispute_flow.rs        # cc-01 → cc-02 → cc-03
//!     └── telemetry.rs           # logging setup
//!
//! benches/
//! └── agreement_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cc-tests
//!
//! # By category
//! cargo test -p cc-tests integration::
//!
//! # Benchmarks
//! cargo bench -p cc-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
