use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{PdfDancerError, PdfDancerResult};

/// Client configuration.
///
/// Loaded from an optional `pdfdancer.{toml,yaml,json}` file and `PDFDANCER_*`
/// environment variables. `PDFDANCER_TOKEN` and `PDFDANCER_BASE_URL` land in
/// `token` and `base_url`; nested keys use `__` (e.g. `PDFDANCER_RETRY__MAX_RETRIES`).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token. When absent an anonymous token is requested from the server.
    #[serde(default)]
    pub token: Option<String>,

    /// Read timeout per request in seconds (0 disables the timeout)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verify TLS certificates. Only disable against self-signed test servers.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Log server-side timing headers at debug level
    #[serde(default)]
    pub log_server_timing: bool,

    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry policy for rate-limited requests
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Extra attempts after the first 429 response
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff when the server sends no Retry-After
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

impl RetryConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            verify_tls: default_verify_tls(),
            log_server_timing: false,
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from file and env vars
    pub fn load() -> PdfDancerResult<Self> {
        Self::load_from(environment())
    }

    fn load_from(environment: Environment) -> PdfDancerResult<Self> {
        Config::builder()
            .add_source(File::with_name("pdfdancer").required(false))
            .add_source(environment)
            .build()
            .map_err(|e| PdfDancerError::Config {
                message: format!("Failed to build config: {}", e),
            })?
            .try_deserialize()
            .map_err(|e| PdfDancerError::Config {
                message: format!("Failed to deserialize client config: {}", e),
            })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Token with surrounding whitespace removed; blank tokens count as absent
    pub fn resolved_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Base URL without trailing slashes, falling back to the public API
    pub fn resolved_base_url(&self) -> String {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            default_base_url()
        } else {
            trimmed.to_string()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// `PDFDANCER_TOKEN` style top-level keys, `__` between nested keys
fn environment() -> Environment {
    Environment::with_prefix("PDFDANCER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn default_base_url() -> String {
    "https://api.pdfdancer.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_secs() -> u64 {
    30
}
