//! Client configuration

pub const DEFAULT_BASE_URL: &str = "https://api.okareo.com";

/// Evaluation runs block until the platform finishes scoring.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Platform client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    /// Platform API key
    pub api_key: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: std::env::var("OKAREO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("OKAREO_API_KEY").unwrap_or_default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific server
    pub fn new(base_url: &str, api_key: &str) -> Self {
        ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Absolute URL for an API path such as `/v0/projects`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_trims_slash() {
        let config = ClientConfig::new("https://api.example.com/", "key");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = ClientConfig::new("https://api.example.com", "key");
        assert_eq!(
            config.endpoint("/v0/projects"),
            "https://api.example.com/v0/projects"
        );
        assert_eq!(
            config.endpoint("v0/checks"),
            "https://api.example.com/v0/checks"
        );
    }

    #[test]
    fn test_with_timeout() {
        let config = ClientConfig::new("http://localhost", "k").with_timeout(5);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("http://localhost", "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
