//! Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::infrastructure::image::memory_cache::DEFAULT_CACHE_SIZE;
use crate::infrastructure::image::{CompressionTarget, DiskImageCache, ImageLoaderConfig};

pub(crate) const APP_NAME: &str = "qskipper-admin";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "qskipper";

const DEFAULT_API_BASE_URL: &str = "https://qskipperbackend.onrender.com";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Root URL of the admin API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Image cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upload compression limits.
    #[serde(default)]
    pub compression: CompressionTarget,

    /// Background loader configuration.
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Image cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum decoded images kept in memory.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Disk cache directory. Defaults to `<data dir>/ImageCache`.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: DEFAULT_CACHE_SIZE,
            directory: None,
        }
    }
}

/// Background loader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Maximum concurrent background downloads.
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: default_max_concurrent_downloads(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_memory_capacity() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_max_concurrent_downloads() -> usize {
    4
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(api_base_url) = &args.api_base_url {
            self.api_base_url.clone_from(api_base_url);
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache.directory = Some(cache_dir.clone());
        }
        if let Some(memory_capacity) = args.memory_capacity {
            self.cache.memory_capacity = memory_capacity;
        }
    }

    /// Returns the disk cache directory to use.
    #[must_use]
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache
            .directory
            .clone()
            .unwrap_or_else(|| DiskImageCache::default_location().dir().to_path_buf())
    }

    /// Returns the image loader settings.
    #[must_use]
    pub fn loader_config(&self) -> ImageLoaderConfig {
        ImageLoaderConfig {
            memory_cache_size: self.cache.memory_capacity,
            max_concurrent_downloads: self.loader.max_concurrent_downloads,
            ..ImageLoaderConfig::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            api_base_url: default_api_base_url(),
            cache: CacheConfig::default(),
            compression: CompressionTarget::default(),
            loader: LoaderConfig::default(),
        }
    }
}
