use eventstream_events::DeliveryConfig;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("{var} has an invalid value: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Outbound delivery settings.
    pub delivery: DeliveryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            request_timeout_secs: 30,
            delivery: DeliveryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    ///
    /// Delivery settings are read by [`DeliveryConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), DeliveryConfig::from_env())
    }

    fn from_lookup(
        var: impl Fn(&str) -> Option<String>,
        delivery: DeliveryConfig,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var(&var, "PORT")?.unwrap_or(defaults.port),
            request_timeout_secs: parse_var(&var, "REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            delivery,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match var(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError { var: name, value }),
    }
}
