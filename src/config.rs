//! Proxy configuration, resolved once at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Proxy configuration.
///
/// Loaded from an optional JSON file and/or CLI flags, then shared behind
/// `AppState` for the lifetime of the process. Handlers never look options up
/// anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Base URL of the analytics provider. Point this at a self-hosted
    /// instance to keep events off plausible.io.
    pub base_url: String,

    /// Default data-domain for server-side events. Falls back to the
    /// inbound request's own host when unset.
    pub default_domain: Option<String>,

    /// URL path prefix the tracking script is served under.
    pub script_prefix: String,

    /// Outbound request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_domain: None,
            script_prefix: default_script_prefix(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://plausible.io".to_string()
}

fn default_script_prefix() -> String {
    "js".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl ProxyConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        let config: ProxyConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the proxy cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base URL {}: {}", self.base_url, e))?;
        Ok(())
    }
}
