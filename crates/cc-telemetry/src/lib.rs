//! # CC Telemetry
//!
//! Structured logging for control-component processes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::for_subsystem(1, "vote-confirmation");
//!     init_telemetry(config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `control-component` | Service name on every line |
//! | `CC_NODE_ID` | `0` | Control-component node (1-4) |
//! | `CC_LOG_LEVEL` | `info` | Log level filter |
//! | `CC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CC_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{build_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Tracing subscriber already installed: {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for this process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(&config)
}

/// Log an event tagged with the subsystem name.
#[macro_export]
macro_rules! log_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(subsystem = $subsystem, $($($field)*,)? $msg)
    };
}
