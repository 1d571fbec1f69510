use crate::error::ConfigError;
use crate::scrapers::http::DEFAULT_USER_AGENT;
use crate::search::DEFAULT_COMPARABLES_CAP;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const PREFIX: &str = "HOUSING_COMPS_";

/// Which backend fetches documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherKind {
    Http,
    Browser,
    Replay,
}

impl FromStr for FetcherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "browser" | "chrome" => Ok(Self::Browser),
            "replay" => Ok(Self::Replay),
            other => Err(other.to_string()),
        }
    }
}

/// Runtime settings, read from `HOUSING_COMPS_*` environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub site_url: Url,
    pub request_delay: Duration,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub fetcher: FetcherKind,
    pub replay_dir: Option<PathBuf>,
    pub comparables_cap: usize,
    /// How long the browser backend lets a page run scripts
    pub browser_settle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: Url::parse("https://www.zillow.com").expect("static url"),
            request_delay: Duration::from_secs(2),
            http_timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetcher: FetcherKind::Http,
            replay_dir: None,
            comparables_cap: DEFAULT_COMPARABLES_CAP,
            browser_settle: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup of full variable names
    /// (e.g. `HOUSING_COMPS_SITE_URL`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = get("SITE_URL") {
            config.site_url = parse(&value, "HOUSING_COMPS_SITE_URL")?;
        }
        if let Some(value) = get("REQUEST_DELAY_MS") {
            config.request_delay =
                Duration::from_millis(parse(&value, "HOUSING_COMPS_REQUEST_DELAY_MS")?);
        }
        if let Some(value) = get("HTTP_TIMEOUT_SECS") {
            config.http_timeout =
                Duration::from_secs(parse(&value, "HOUSING_COMPS_HTTP_TIMEOUT_SECS")?);
        }
        if let Some(value) = get("BROWSER_SETTLE_MS") {
            config.browser_settle =
                Duration::from_millis(parse(&value, "HOUSING_COMPS_BROWSER_SETTLE_MS")?);
        }
        if let Some(value) = get("USER_AGENT") {
            config.user_agent = value;
        }
        if let Some(value) = get("FETCHER") {
            config.fetcher = parse(&value, "HOUSING_COMPS_FETCHER")?;
        }
        if let Some(value) = get("COMPARABLES_CAP") {
            config.comparables_cap = parse(&value, "HOUSING_COMPS_COMPARABLES_CAP")?;
        }
        config.replay_dir = get("REPLAY_DIR").map(PathBuf::from);

        if config.fetcher == FetcherKind::Replay && config.replay_dir.is_none() {
            return Err(ConfigError::Missing("HOUSING_COMPS_REPLAY_DIR"));
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(value: &str, key: &'static str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
