use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::llm::CohereApiVersion;

pub const DEFAULT_COHERE_MODEL: &str = "command-a-03-2025";
pub const DEFAULT_COHERE_BASE_URL: &str = "https://api.cohere.com";
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Where configuration values are read from. Resolved once at startup.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Process environment, plus a `.env` in the working directory if present.
    Environment,
    /// A specific dotenv file that must exist, layered under the process environment.
    EnvFile(PathBuf),
}

#[derive(Clone)]
pub struct Config {
    pub cohere_api_key: String,
    pub tavily_api_key: String,
    pub cohere_model: String,
    pub cohere_api_version: CohereApiVersion,
    pub cohere_base_url: String,
    pub tavily_base_url: String,
    pub request_timeout: Option<Duration>,
    pub turn_log_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("cohere_api_key", &"[REDACTED]")
            .field("tavily_api_key", &"[REDACTED]")
            .field("cohere_model", &self.cohere_model)
            .field("cohere_api_version", &self.cohere_api_version)
            .field("cohere_base_url", &self.cohere_base_url)
            .field("tavily_base_url", &self.tavily_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("turn_log_dir", &self.turn_log_dir)
            .finish()
    }
}

impl Config {
    pub fn load(source: &ConfigSource) -> Result<Self> {
        match source {
            ConfigSource::Environment => {
                dotenvy::dotenv().ok();
            }
            ConfigSource::EnvFile(path) => {
                dotenvy::from_path(path)
                    .with_context(|| format!("Failed to load env file: {}", path.display()))?;
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let request_timeout = get("HTTP_TIMEOUT_SECS")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("HTTP_TIMEOUT_SECS must be a number of seconds")?
            .map(Duration::from_secs);

        let cohere_api_version = get("COHERE_API_VERSION")
            .map(|v| v.parse::<CohereApiVersion>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            cohere_api_key: get("COHERE_API_KEY").context("COHERE_API_KEY must be set")?,
            tavily_api_key: get("TAVILY_API_KEY").context("TAVILY_API_KEY must be set")?,
            cohere_model: get("COHERE_MODEL").unwrap_or_else(|| DEFAULT_COHERE_MODEL.into()),
            cohere_api_version,
            cohere_base_url: get("COHERE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COHERE_BASE_URL.into()),
            tavily_base_url: get("TAVILY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TAVILY_BASE_URL.into()),
            request_timeout,
            turn_log_dir: get("TURN_LOG_DIR").map(PathBuf::from),
        })
    }
}
