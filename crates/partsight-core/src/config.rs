//! Environment-style configuration for the patent-screening service.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingKey(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Service configuration, normally read from `IPS_*` environment variables.
///
/// A missing data key is fatal at construction time; per-call code never
/// has to re-check credentials.
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    pub data_key: String,
    pub ux_key: Option<String>,
    pub data_api_url: String,
    pub pdf_api_url: String,
    pub stats_api_url: String,
    /// Account name sent as the `username` form field on every submission.
    pub username: String,
    pub cache_dir: PathBuf,
    pub cache_ttl_hours: u64,
    pub throttle_minutes: u64,
    pub default_rows: u32,
    pub max_rows: u32,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl ScreenerConfig {
    /// Build a configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// The seam `from_env` goes through; tests supply a map instead of
    /// mutating process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_key = lookup("IPS_DATA_KEY").ok_or(ConfigError::MissingKey("IPS_DATA_KEY"))?;

        Ok(Self {
            data_key,
            ux_key: lookup("IPS_UX_KEY"),
            data_api_url: lookup("IPS_DATA_API_URL")
                .unwrap_or_else(|| "https://my.ipscreener.com/api/data/case".to_string()),
            pdf_api_url: lookup("IPS_PDF_API_URL")
                .unwrap_or_else(|| "https://my.ipscreener.com/api/data/pdf".to_string()),
            stats_api_url: lookup("IPS_STATS_API_URL")
                .unwrap_or_else(|| "https://my.ipscreener.com/api/data/stats".to_string()),
            username: lookup("IPS_USERNAME")
                .unwrap_or_else(|| "tester@ipscreener.com".to_string()),
            cache_dir: lookup("IPS_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join("partsight-cache")),
            cache_ttl_hours: parse(&lookup, "IPS_CACHE_TTL_HOURS", 24)?,
            throttle_minutes: parse(&lookup, "IPS_QUERY_THROTTLE_MINUTES", 5)?,
            default_rows: parse(&lookup, "IPS_DEFAULT_ROWS", 25)?,
            max_rows: parse(&lookup, "IPS_MAX_ROWS", 100)?,
            timeout_seconds: parse(&lookup, "IPS_TIMEOUT_SECONDS", 45)?,
            max_retries: parse(&lookup, "IPS_MAX_RETRIES", 3)?,
        })
    }

    /// A configuration with the given key and defaults for everything else.
    pub fn with_key(data_key: impl Into<String>) -> Self {
        let data_key = data_key.into();
        Self::from_lookup(|name| (name == "IPS_DATA_KEY").then(|| data_key.clone()))
            .expect("defaults are always valid")
    }

    pub fn throttle_window_secs(&self) -> u64 {
        self.throttle_minutes * 60
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
