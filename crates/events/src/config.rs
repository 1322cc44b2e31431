//! Event stream runtime configuration.

use std::time::Duration;

use crate::bus;

/// Default connect timeout for a delivery attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide delivery settings. Per-tenant settings live in the
/// settings store instead.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Bound on establishing the connection. There is no total request
    /// timeout: slow receivers are tolerated.
    pub connect_timeout: Duration,
    /// Report failed deliveries at `warn` level through the tracing observer.
    pub log_failures: bool,
    /// Host event bus buffer size.
    pub bus_capacity: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            log_failures: true,
            bus_capacity: bus::DEFAULT_CAPACITY,
        }
    }
}

impl DeliveryConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to the default.
    ///
    /// | Variable                            | Default |
    /// |-------------------------------------|---------|
    /// | `EVENT_STREAM_CONNECT_TIMEOUT_SECS` | `10`    |
    /// | `EVENT_STREAM_LOG_FAILURES`         | `true`  |
    /// | `EVENT_STREAM_BUS_CAPACITY`         | `1024`  |
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            connect_timeout: var("EVENT_STREAM_CONNECT_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            log_failures: var("EVENT_STREAM_LOG_FAILURES")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.log_failures),
            bus_capacity: var("EVENT_STREAM_BUS_CAPACITY")
                .and_then(|v| v.trim().parse().ok())
                .filter(|c| *c > 0)
                .unwrap_or(defaults.bus_capacity),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> DeliveryConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DeliveryConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.log_failures);
        assert_eq!(config.bus_capacity, 1024);
    }

    #[test]
    fn values_are_parsed() {
        let config = config_from(&[
            ("EVENT_STREAM_CONNECT_TIMEOUT_SECS", "3"),
            ("EVENT_STREAM_LOG_FAILURES", "off"),
            ("EVENT_STREAM_BUS_CAPACITY", "64"),
        ]);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.log_failures);
        assert_eq!(config.bus_capacity, 64);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = config_from(&[
            ("EVENT_STREAM_CONNECT_TIMEOUT_SECS", "soon"),
            ("EVENT_STREAM_LOG_FAILURES", "maybe"),
            ("EVENT_STREAM_BUS_CAPACITY", "0"),
        ]);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert!(config.log_failures);
        assert_eq!(config.bus_capacity, bus::DEFAULT_CAPACITY);
    }
}
