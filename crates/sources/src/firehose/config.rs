//! Firehose source configuration

use std::time::Duration;

/// Default listen port.
const DEFAULT_PORT: u16 = 8200;

/// Default maximum payload size (16MB). Firehose caps delivery bodies well
/// below this.
const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Default endpoint path.
const DEFAULT_PATH: &str = "/firehose";

/// Default data stream namespace.
const DEFAULT_NAMESPACE: &str = "default";

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Firehose source configuration.
#[derive(Debug, Clone)]
pub struct FirehoseConfig {
    /// Source identifier used in logs.
    pub id: String,

    /// Bind address (e.g. "0.0.0.0").
    pub address: String,

    /// Listen port.
    pub port: u16,

    /// Endpoint path the delivery stream posts to.
    pub path: String,

    /// Data stream namespace events are routed to.
    pub namespace: String,

    /// Maximum request payload size in bytes.
    pub max_payload_size: usize,

    /// Upper bound on how long one delivery may wait for indexing
    /// capacity before it is answered with back-pressure.
    pub request_timeout: Duration,
}

impl Default for FirehoseConfig {
    fn default() -> Self {
        Self {
            id: "firehose".into(),
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.into(),
            namespace: DEFAULT_NAMESPACE.into(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl FirehoseConfig {
    /// Create config with custom port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FirehoseConfig::default();
        assert_eq!(config.path, "/firehose");
        assert_eq!(config.namespace, "default");
        assert_eq!(config.bind_address(), "0.0.0.0:8200");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_with_port() {
        assert_eq!(FirehoseConfig::with_port(9000).bind_address(), "0.0.0.0:9000");
    }
}
