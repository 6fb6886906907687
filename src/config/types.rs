use crate::config::parser::deserialize_duration;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default maximum crawl depth
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Default name of the index database inside the base directory
pub const DEFAULT_INDEX_FILE: &str = "sqlite.db";

/// Main configuration structure for Sumi-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed (the seed itself is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Minimum spacing between any two requests, across all workers
    #[serde(rename = "request-delay", deserialize_with = "deserialize_duration")]
    pub request_delay: Duration,

    /// Number of concurrent fetch workers
    pub workers: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            request_delay: Duration::from_secs(1),
            workers: 1,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total time allowed for a single request
    #[serde(rename = "request-timeout", deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,

    /// Time allowed to establish a connection
    #[serde(rename = "connect-timeout", deserialize_with = "deserialize_duration")]
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("sumi-mirror/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Where fetched content and the index live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the index file and every stored page
    #[serde(rename = "base-dir")]
    pub base_dir: PathBuf,

    /// Index database filename, relative to `base_dir`
    #[serde(rename = "index-file")]
    pub index_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::temp_dir().join("sumi-mirror"),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Full path of the index database
    pub fn index_path(&self) -> PathBuf {
        self.base_dir.join(&self.index_file)
    }
}
