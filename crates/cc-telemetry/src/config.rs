//! Telemetry configuration from environment variables.

use std::env;

/// Logging configuration for one control-component process.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Control-component node identifier (1-4), "0" when not a node
    pub node_id: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "control-component".to_string(),
            node_id: "0".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: control-component)
    /// - `CC_NODE_ID`: Node identifier (default: 0)
    /// - `CC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CC_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "control-component".to_string()),

            node_id: env::var("CC_NODE_ID").unwrap_or_else(|_| "0".to_string()),

            log_level: env::var("CC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("CC_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("CC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    /// Configuration for a specific subsystem on a given node.
    pub fn for_subsystem(node_id: u8, subsystem_name: &str) -> Self {
        let mut config = Self::from_env();
        config.node_id = node_id.to_string();
        config.service_name = format!("cc-{}", subsystem_name);
        config
    }

    /// Service name including the node.
    pub fn full_service_name(&self) -> String {
        if self.node_id == "0" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.node_id)
        }
    }
}
