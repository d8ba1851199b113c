#![cfg(feature = "server")]
use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use std::env;
use std::time::Duration;

use crate::shared::types::{RESOURCE_CODEX, RESOURCE_COPILOT, RESOURCE_OPENROUTER};

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_REFRESH_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 2;
/// Longest accepted refresh interval: one day.
pub const MAX_REFRESH_SECS: u64 = 86_400;

/// Resource name and the path it is served under.
pub const ENDPOINTS: [(&str, &str); 3] = [
    (RESOURCE_OPENROUTER, "/api/openrouter/balance"),
    (RESOURCE_COPILOT, "/api/github/copilot/premium-usage"),
    (RESOURCE_CODEX, "/api/openai/codex/limits"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEndpoint {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_url: String,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let base_url = match lookup("USAGE_API_BASE_URL") {
            Some(v) if !v.trim().is_empty() => normalize_base_url(&v)?,
            _ => defaults.base_url,
        };
        let refresh_secs = secs(&lookup, "USAGE_REFRESH_SECS", DEFAULT_REFRESH_SECS)?.max(1);
        if refresh_secs > MAX_REFRESH_SECS {
            return Err(anyhow!(
                "USAGE_REFRESH_SECS must be at most {MAX_REFRESH_SECS}, got {refresh_secs}"
            ));
        }
        // zero would make every request time out at once
        let timeout_secs = secs(&lookup, "USAGE_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?.max(1);
        let connect_secs = secs(
            &lookup,
            "USAGE_HTTP_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?
        .max(1);
        Ok(Self {
            base_url,
            refresh_interval: Duration::from_secs(refresh_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_secs),
        })
    }

    pub fn endpoints(&self) -> Vec<ResourceEndpoint> {
        ENDPOINTS
            .iter()
            .map(|(name, path)| ResourceEndpoint {
                name: (*name).to_string(),
                url: format!("{}{}", self.base_url, path),
            })
            .collect()
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .context("building HTTP client")
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a whole number of seconds, got {v:?}")),
        _ => Ok(default),
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).with_context(|| format!("invalid USAGE_API_BASE_URL {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("USAGE_API_BASE_URL must be http(s), got {raw:?}"));
    }
    Ok(trimmed.to_string())
}
