// Configuration management module
// Handles TOML configuration and derived storage paths

pub mod settings;


pub use settings::{Config, ConfigError, EmbeddingConfig, SearchConfig};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
