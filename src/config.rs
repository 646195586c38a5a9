use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::QueryOptions;

pub const DEFAULT_API_URL: &str = "https://www.omdbapi.com";

/// Environment variable holding the lookup API base URL
pub const API_URL_ENV: &str = "MOVIE_API_URL";

/// Environment variable holding the lookup API key
pub const API_KEY_ENV: &str = "MOVIE_API_KEY";

/// Caching policy for one family of queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CachePolicy {
    /// How long a fetched value is served without refetching
    pub stale_secs: u64,

    /// Extra attempts after the first failure
    pub max_retries: u32,

    /// How long a stale value stays in memory before it is dropped
    #[serde(default = "default_gc_secs")]
    pub gc_secs: u64,
}

impl CachePolicy {
    pub const fn new(stale_secs: u64, max_retries: u32) -> Self {
        Self {
            stale_secs,
            max_retries,
            gc_secs: DEFAULT_GC_SECS,
        }
    }

    pub fn to_options(self, retry_base_delay: Duration) -> QueryOptions {
        QueryOptions {
            stale_time: Duration::from_secs(self.stale_secs),
            max_retries: self.max_retries,
            retry_base_delay,
            gc_time: Duration::from_secs(self.gc_secs),
        }
    }
}

const FIVE_MINUTES: u64 = 5 * 60;
const DEFAULT_GC_SECS: u64 = FIVE_MINUTES;
const ONE_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the lookup API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay before the first retry; doubles per attempt
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_search_policy")]
    pub search_policy: CachePolicy,

    #[serde(default = "default_detail_policy")]
    pub detail_policy: CachePolicy,

    #[serde(default = "default_featured_policy")]
    pub featured_policy: CachePolicy,

    #[serde(default = "default_featured_policy")]
    pub related_policy: CachePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            search_policy: default_search_policy(),
            detail_policy: default_detail_policy(),
            featured_policy: default_featured_policy(),
            related_policy: default_featured_policy(),
        }
    }
}

impl Config {
    /// Default location of the optional config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("media-catalogue").join("config.json"))
    }

    /// Read a JSON config file; absent keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from an explicit file, else the default location if it exists, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Override file values with ones from flags or the environment; empty strings are ignored
    pub fn apply_overrides(&mut self, api_url: Option<String>, api_key: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn search_options(&self) -> QueryOptions {
        self.search_policy.to_options(self.retry_base_delay())
    }

    pub fn detail_options(&self) -> QueryOptions {
        self.detail_policy.to_options(self.retry_base_delay())
    }

    pub fn featured_options(&self) -> QueryOptions {
        self.featured_policy.to_options(self.retry_base_delay())
    }

    pub fn related_options(&self) -> QueryOptions {
        self.related_policy.to_options(self.retry_base_delay())
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_gc_secs() -> u64 {
    DEFAULT_GC_SECS
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_search_policy() -> CachePolicy {
    CachePolicy::new(FIVE_MINUTES, 2)
}

fn default_detail_policy() -> CachePolicy {
    CachePolicy::new(ONE_DAY, 2)
}

fn default_featured_policy() -> CachePolicy {
    CachePolicy::new(ONE_DAY, 3)
}
