use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Settings shared by every completion server in the pool.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
    /// Upper bound on one whole generation, stream included
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout: Duration::from_secs(600),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
