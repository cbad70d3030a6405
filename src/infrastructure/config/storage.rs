//! Config file discovery and persistence.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no platform config directory available")]
    ConfigDirNotFound,
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Locates `config.toml` and reads or seeds it.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Uses the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigDirNotFound` if the platform has none.
    pub fn new() -> Result<Self, ConfigError> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| Self::with_dir(dirs.config_dir().to_path_buf()))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Uses an explicit directory.
    #[must_use]
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory path.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the path of the default config file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Reads the configuration from `path_override` or the default file.
    ///
    /// A missing file is seeded with defaults. A file that fails to parse is
    /// left as is and defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read, or the
    /// defaults cannot be written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let path = path_override.map_or_else(|| self.config_file(), Path::to_path_buf);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Self::seed_defaults(&path);
            }
            Err(e) => return Err(ConfigError::io(&path, e)),
        };

        toml::from_str::<AppConfig>(&content).or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring unparseable config file");
            Ok(AppConfig::default())
        })
    }

    fn seed_defaults(path: &Path) -> Result<AppConfig, ConfigError> {
        info!(path = %path.display(), "Writing default config");
        let config = AppConfig::default();
        Self::write_atomically(path, &toml::to_string_pretty(&config)?)?;
        Ok(config)
    }

    fn write_atomically(path: &Path, content: &str) -> Result<(), ConfigError> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;

        let mut staged =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| ConfigError::io(dir, e))?;
        staged
            .write_all(content.as_bytes())
            .map_err(|e| ConfigError::io(path, e))?;
        staged
            .persist(path)
            .map_err(|e| ConfigError::io(path, e.error))?;

        debug!(path = %path.display(), "Config written");
        Ok(())
    }
}
