use serde::{Deserialize, Serialize};

use crate::{EchoError, Result};

pub const ENV_API_URL: &str = "ECHOPROMPT_API_URL";
pub const ENV_API_VERSION: &str = "ECHOPROMPT_API_VERSION";
pub const ENV_FRONTEND_HOST: &str = "ECHOPROMPT_FRONTEND_HOST";
pub const ENV_FRONTEND_PORT: &str = "ECHOPROMPT_FRONTEND_PORT";

/// Top-level client configuration, validated once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: String,
    pub api_version: String,
    pub frontend_host: String,
    pub frontend_port: u16,
    pub retry: RetryPolicy,
    pub polling: PollingConfig,
    /// Results requested per semantic search
    pub search_limit: usize,
    /// How long a newly arrived message stays highlighted
    pub highlight_ms: u64,
}

impl AppConfig {
    /// Build and validate the config from a key lookup (build-time env in the
    /// browser, a map in tests). Every required key must be present and non-blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    EchoError::Config(format!("missing required environment variable: {}", key))
                })
        };

        let api_url = require(ENV_API_URL)?.trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(EchoError::Config(format!(
                "{} must be an http(s) URL, got '{}'",
                ENV_API_URL, api_url
            )));
        }

        let api_version = require(ENV_API_VERSION)?.trim_matches('/').to_string();
        let frontend_host = require(ENV_FRONTEND_HOST)?;
        let port = require(ENV_FRONTEND_PORT)?;
        let frontend_port = port.parse::<u16>().map_err(|_| {
            EchoError::Config(format!("{} must be a port number, got '{}'", ENV_FRONTEND_PORT, port))
        })?;

        Ok(Self {
            api_url,
            api_version,
            frontend_host,
            frontend_port,
            retry: RetryPolicy::default(),
            polling: PollingConfig::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
        })
    }

    /// `{api_url}/api/{api_version}`
    pub fn api_base(&self) -> String {
        format!("{}/api/{}", self.api_url, self.api_version)
    }

    pub fn frontend_origin(&self) -> String {
        format!("http://{}:{}", self.frontend_host, self.frontend_port)
    }
}

pub const DEFAULT_SEARCH_LIMIT: usize = 5;
pub const DEFAULT_HIGHLIGHT_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub retry_delay_ms: u32,
    pub request_timeout_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    pub sessions_ms: u32,
    pub messages_ms: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            sessions_ms: 10_000,
            messages_ms: 3_000,
        }
    }
}
