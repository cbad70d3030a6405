//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, CacheConfig, LoaderConfig, LogLevel};
pub use args::{CliArgs, Command, ProductArgs};
pub use storage::{ConfigError, StorageManager};
