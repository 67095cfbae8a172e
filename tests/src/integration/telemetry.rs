//! # Telemetry Setup
//!
//! Logging configuration shared by every subsystem process.

#[cfg(test)]
mod tests {
    use cc_telemetry::{build_filter, init_telemetry, TelemetryConfig, TelemetryError};

    #[test]
    fn test_subsystem_config_and_filter() {
        let config = TelemetryConfig::for_subsystem(3, "dispute-resolver");
        assert_eq!(config.service_name, "cc-dispute-resolver");
        assert_eq!(config.node_id, "3");
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_second_initialization_is_rejected() {
        let config = TelemetryConfig::for_subsystem(1, "vote-confirmation");
        // Another test may already have installed a subscriber.
        let _ = init_telemetry(config.clone());
        assert!(matches!(
            init_telemetry(config),
            Err(TelemetryError::AlreadyInitialized(_))
        ));
    }
}
