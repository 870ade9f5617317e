use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the marketplace backend, without trailing slash
    pub api_url: String,
    /// Where the access/refresh pair is kept between runs
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: default_session_file(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// `FARM_MARKET_API_URL`, `FARM_MARKET_SESSION_FILE`, `FARM_MARKET_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(url) = lookup("FARM_MARKET_API_URL").filter(|u| !u.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(path) = lookup("FARM_MARKET_SESSION_FILE").filter(|p| !p.trim().is_empty()) {
            config.session_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup("FARM_MARKET_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!("Ignoring invalid FARM_MARKET_TIMEOUT_SECS={:?}", raw),
            }
        }

        config.api_url = config.api_url.trim().trim_end_matches('/').to_string();
        config
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }
}

fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("farm-market")
        .join("session.json")
}
