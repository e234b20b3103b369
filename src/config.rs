//! Runtime settings read from the environment (and `.env` via dotenv)

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::api::yahoo::Endpoint;
use crate::models::ChartLayout;
use crate::utils::errors::ConfigError;

pub const DEFAULT_PREFIX: &str = "&stock";
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:90.0) Gecko/20100101 Firefox/90.0";
pub const DEFAULT_OUTPUT: &str = "stock.png";

/// Yahoo Finance client settings
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub endpoint: Endpoint,
    pub user_agent: String,
    /// `None` keeps reqwest's default (no timeout)
    pub timeout: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: Endpoint::Download,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub discord_token: Option<String>,
    pub command_prefix: String,
    pub provider: ProviderConfig,
    pub layout: ChartLayout,
    pub output_path: PathBuf,
}

impl Settings {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint = match non_empty("YAHOO_ENDPOINT") {
            Some(value) => value
                .parse::<Endpoint>()
                .map_err(|_| ConfigError::Invalid { key: "YAHOO_ENDPOINT", value })?,
            None => Endpoint::Download,
        };

        let base_url = match non_empty("YAHOO_BASE_URL") {
            Some(value) => parse_base_url(value)?,
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = non_empty("HTTP_TIMEOUT_SECS")
            .map(|value| parse_number::<u64>("HTTP_TIMEOUT_SECS", value))
            .transpose()?
            .map(Duration::from_secs);

        let width = non_empty("CHART_WIDTH")
            .map(|value| parse_number::<u32>("CHART_WIDTH", value))
            .transpose()?
            .unwrap_or(ChartLayout::DEFAULT_WIDTH);
        let height = non_empty("CHART_HEIGHT")
            .map(|value| parse_number::<u32>("CHART_HEIGHT", value))
            .transpose()?
            .unwrap_or(ChartLayout::DEFAULT_HEIGHT);

        Ok(Self {
            discord_token: non_empty("DISCORD_TOKEN"),
            command_prefix: non_empty("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            provider: ProviderConfig {
                base_url,
                endpoint,
                user_agent: non_empty("YAHOO_USER_AGENT")
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
                timeout,
            },
            layout: ChartLayout::new(width, height),
            output_path: non_empty("CHART_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        })
    }

    pub fn require_discord_token(&self) -> Result<&str, ConfigError> {
        self.discord_token
            .as_deref()
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    match value.trim().parse::<T>() {
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::Invalid { key, value }),
    }
}

/// Base URLs must be absolute http(s) URLs that can take a path
fn parse_base_url(value: String) -> Result<String, ConfigError> {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() => Ok(value),
        _ => Err(ConfigError::Invalid {
            key: "YAHOO_BASE_URL",
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.command_prefix, "&stock");
        assert_eq!(s.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.provider.endpoint, Endpoint::Download);
        assert_eq!(s.provider.timeout, None);
        assert_eq!(s.layout, ChartLayout::default());
        assert_eq!(s.output_path, PathBuf::from("stock.png"));
        assert_eq!(s.require_discord_token(), Err(ConfigError::Missing("DISCORD_TOKEN")));
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("DISCORD_TOKEN", "abc"),
            ("YAHOO_ENDPOINT", "chart"),
            ("HTTP_TIMEOUT_SECS", "15"),
            ("CHART_WIDTH", "800"),
            ("CHART_HEIGHT", "400"),
            ("CHART_OUTPUT", "out/spy.png"),
        ])
        .unwrap();
        assert_eq!(s.require_discord_token(), Ok("abc"));
        assert_eq!(s.provider.endpoint, Endpoint::Chart);
        assert_eq!(s.provider.timeout, Some(Duration::from_secs(15)));
        assert_eq!((s.layout.width, s.layout.height), (800, 400));
        assert_eq!(s.output_path, PathBuf::from("out/spy.png"));
    }

    #[test]
    fn test_invalid_number() {
        let err = settings(&[("CHART_WIDTH", "wide")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "CHART_WIDTH",
                value: "wide".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_base_url() {
        for bad in ["not a url", "ftp://example.com", "mailto:quotes@example.com"] {
            let err = settings(&[("YAHOO_BASE_URL", bad)]).unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    key: "YAHOO_BASE_URL",
                    value: bad.to_string()
                }
            );
        }

        let s = settings(&[("YAHOO_BASE_URL", "http://127.0.0.1:8080")]).unwrap();
        assert_eq!(s.provider.base_url, "http://127.0.0.1:8080");
    }
}
