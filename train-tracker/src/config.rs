//! Runtime configuration from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

use crate::feed::{BartConfig, DEFAULT_BASE_URL};
use crate::network::DurationPolicy;

/// Default refresh interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 20;

/// Default live-feed timeout in seconds.
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 5;

/// Default listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Error reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// BART API key
    pub api_key: String,
    /// Base URL for the BART API
    pub base_url: String,
    /// Timeout for each live-feed fetch
    pub feed_timeout: Duration,
    /// Time between refresh ticks
    pub refresh_interval: Duration,
    /// Duration to use for segments with no timetable samples
    pub segment_fallback: Option<Duration>,
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            feed_timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            segment_fallback: None,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl TrackerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through a variable lookup function.
    ///
    /// Recognised variables: `BART_API_KEY`, `BART_BASE_URL`,
    /// `FEED_TIMEOUT_SECS`, `REFRESH_INTERVAL_SECS`,
    /// `SEGMENT_FALLBACK_SECS` and `LISTEN_ADDR`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match lookup("BART_API_KEY") {
            Some(key) if !key.trim().is_empty() => config.api_key = key.trim().to_string(),
            _ => warn!("BART_API_KEY not set. API calls will fail."),
        }
        if let Some(url) = lookup("BART_BASE_URL") {
            config.base_url = url;
        }
        if let Some(secs) = lookup("FEED_TIMEOUT_SECS") {
            config.feed_timeout = Duration::from_secs(parse_positive("FEED_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = lookup("REFRESH_INTERVAL_SECS") {
            config.refresh_interval =
                Duration::from_secs(parse_positive("REFRESH_INTERVAL_SECS", &secs)?);
        }
        if let Some(secs) = lookup("SEGMENT_FALLBACK_SECS") {
            config.segment_fallback =
                Some(Duration::from_secs(parse_positive("SEGMENT_FALLBACK_SECS", &secs)?));
        }
        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr.trim().parse().map_err(|_| ConfigError {
                name: "LISTEN_ADDR",
                value: addr.clone(),
            })?;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_segment_fallback(mut self, fallback: Option<Duration>) -> Self {
        self.segment_fallback = fallback;
        self
    }

    /// How the topology build treats segments without timetable samples.
    pub fn duration_policy(&self) -> DurationPolicy {
        match self
            .segment_fallback
            .and_then(|d| chrono::Duration::from_std(d).ok())
        {
            Some(d) => DurationPolicy::Fallback(d),
            None => DurationPolicy::Strict,
        }
    }

    /// Client configuration for the BART API.
    pub fn bart_config(&self) -> BartConfig {
        BartConfig::new(&self.api_key)
            .with_base_url(&self.base_url)
            .with_timeout(self.feed_timeout.as_secs())
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> Result<TrackerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TrackerConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = from(&[]).unwrap();
        assert_eq!(config.api_key, "");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.refresh_interval, Duration::from_secs(20));
        assert_eq!(config.feed_timeout, Duration::from_secs(5));
        assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(config.duration_policy(), DurationPolicy::Strict);
    }

    #[test]
    fn overrides() {
        let config = from(&[
            ("BART_API_KEY", " MW9S-E7SL-26DU-VV8V "),
            ("BART_BASE_URL", "http://localhost:8080/api"),
            ("REFRESH_INTERVAL_SECS", "30"),
            ("FEED_TIMEOUT_SECS", "3"),
            ("SEGMENT_FALLBACK_SECS", "120"),
            ("LISTEN_ADDR", "0.0.0.0:8000"),
        ])
        .unwrap();

        assert_eq!(config.api_key, "MW9S-E7SL-26DU-VV8V");
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.listen_addr.port(), 8000);
        assert_eq!(
            config.duration_policy(),
            DurationPolicy::Fallback(chrono::Duration::seconds(120))
        );

        let bart = config.bart_config();
        assert_eq!(bart.base_url, "http://localhost:8080/api");
        assert_eq!(bart.timeout_secs, 3);
    }

    #[test]
    fn malformed_values_rejected() {
        let err = from(&[("REFRESH_INTERVAL_SECS", "soon")]).unwrap_err();
        assert_eq!(err.name, "REFRESH_INTERVAL_SECS");
        assert_eq!(err.to_string(), "invalid value for REFRESH_INTERVAL_SECS: \"soon\"");

        assert!(from(&[("REFRESH_INTERVAL_SECS", "0")]).is_err());
        assert!(from(&[("LISTEN_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn builders() {
        let config = TrackerConfig::default()
            .with_api_key("key")
            .with_refresh_interval(Duration::from_secs(5))
            .with_segment_fallback(Some(Duration::from_secs(90)));
        assert_eq!(config.api_key, "key");
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert!(matches!(config.duration_policy(), DurationPolicy::Fallback(_)));
    }
}
