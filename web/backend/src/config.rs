use crate::charts::DEFAULT_APPLE_RSS_BASE_URL;
use crate::error::ConfigError;
use crate::itunes::DEFAULT_ITUNES_BASE_URL;
use crate::news::{DEFAULT_NEWS_API_BASE_URL, DEFAULT_NEWS_FEED_URL};
use crate::scheduler::{DEFAULT_BUDGET, DEFAULT_CONCURRENCY};
use crate::video::{DEFAULT_VIDEO_TIMEOUT, DEFAULT_YOUTUBE_API_BASE_URL};
use melograph_core::DEFAULT_ARTWORK_SIZE;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_INVIDIOUS_INSTANCES: &[&str] = &[
    "https://invidious.jing.rocks",
    "https://inv.nadeko.net",
    "https://yewtu.be",
];

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub itunes_base_url: String,
    pub apple_rss_base_url: String,
    pub youtube_api_key: Option<String>,
    pub youtube_api_base_url: String,
    pub invidious_instances: Vec<String>,
    pub news_feed_url: String,
    /// Switches `/api/news` from the RSS feed to NewsAPI.
    pub news_api_key: Option<String>,
    pub news_api_base_url: String,
    /// Roster JSON; the built-in roster is used when unset.
    pub roster_path: Option<PathBuf>,
    pub cache_ttl: Duration,
    /// Enables the on-disk snapshot of resolved artists.
    pub cache_file: Option<PathBuf>,
    pub concurrency: usize,
    pub budget: Duration,
    pub video_timeout: Duration,
    pub artwork_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            itunes_base_url: DEFAULT_ITUNES_BASE_URL.to_string(),
            apple_rss_base_url: DEFAULT_APPLE_RSS_BASE_URL.to_string(),
            youtube_api_key: None,
            youtube_api_base_url: DEFAULT_YOUTUBE_API_BASE_URL.to_string(),
            invidious_instances: DEFAULT_INVIDIOUS_INSTANCES
                .iter()
                .map(|url| url.to_string())
                .collect(),
            news_feed_url: DEFAULT_NEWS_FEED_URL.to_string(),
            news_api_key: None,
            news_api_base_url: DEFAULT_NEWS_API_BASE_URL.to_string(),
            roster_path: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_file: None,
            concurrency: DEFAULT_CONCURRENCY,
            budget: DEFAULT_BUDGET,
            video_timeout: DEFAULT_VIDEO_TIMEOUT,
            artwork_size: DEFAULT_ARTWORK_SIZE,
        }
    }
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let config = Self {
            bind_addr: parse_or(
                "BIND_ADDR",
                get("BIND_ADDR").as_deref().unwrap_or(DEFAULT_BIND_ADDR),
                "a socket address",
            )?,
            itunes_base_url: get("ITUNES_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ITUNES_BASE_URL.to_string()),
            apple_rss_base_url: get("APPLE_RSS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_APPLE_RSS_BASE_URL.to_string()),
            youtube_api_key: get("YOUTUBE_API_KEY"),
            youtube_api_base_url: get("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string()),
            invidious_instances: match get("INVIDIOUS_INSTANCES") {
                Some(list) => list
                    .split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect(),
                None => Self::default().invidious_instances,
            },
            news_feed_url: get("NEWS_FEED_URL")
                .unwrap_or_else(|| DEFAULT_NEWS_FEED_URL.to_string()),
            news_api_key: get("NEWS_API_KEY"),
            news_api_base_url: get("NEWS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_NEWS_API_BASE_URL.to_string()),
            roster_path: get("ROSTER_PATH").map(PathBuf::from),
            cache_ttl: Duration::from_secs(parse_or_default(
                "CACHE_TTL_SECS",
                get("CACHE_TTL_SECS"),
                DEFAULT_CACHE_TTL_SECS,
            )?),
            cache_file: get("CACHE_FILE").map(PathBuf::from),
            concurrency: parse_or_default(
                "SCHEDULER_CONCURRENCY",
                get("SCHEDULER_CONCURRENCY"),
                DEFAULT_CONCURRENCY,
            )?,
            budget: Duration::from_millis(parse_or_default(
                "SCHEDULER_BUDGET_MS",
                get("SCHEDULER_BUDGET_MS"),
                DEFAULT_BUDGET.as_millis() as u64,
            )?),
            video_timeout: Duration::from_millis(parse_or_default(
                "VIDEO_TIMEOUT_MS",
                get("VIDEO_TIMEOUT_MS"),
                DEFAULT_VIDEO_TIMEOUT.as_millis() as u64,
            )?),
            artwork_size: parse_or_default(
                "ARTWORK_SIZE",
                get("ARTWORK_SIZE"),
                DEFAULT_ARTWORK_SIZE,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Zero("SCHEDULER_CONCURRENCY"));
        }
        if self.budget.is_zero() {
            return Err(ConfigError::Zero("SCHEDULER_BUDGET_MS"));
        }
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::Zero("CACHE_TTL_SECS"));
        }
        if self.video_timeout.is_zero() {
            return Err(ConfigError::Zero("VIDEO_TIMEOUT_MS"));
        }
        if self.artwork_size == 0 {
            return Err(ConfigError::Zero("ARTWORK_SIZE"));
        }

        check_url("ITUNES_BASE_URL", &self.itunes_base_url)?;
        check_url("APPLE_RSS_BASE_URL", &self.apple_rss_base_url)?;
        check_url("YOUTUBE_API_BASE_URL", &self.youtube_api_base_url)?;
        check_url("NEWS_FEED_URL", &self.news_feed_url)?;
        check_url("NEWS_API_BASE_URL", &self.news_api_base_url)?;
        for instance in &self.invidious_instances {
            check_url("INVIDIOUS_INSTANCES", instance)?;
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        expected,
    })
}

fn parse_or_default<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse_or(key, &raw, "a non-negative integer"),
        None => Ok(default),
    }
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::BadUrl {
            key,
            value: value.to_string(),
        })
    }
}
