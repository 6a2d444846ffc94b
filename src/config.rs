use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::compose::{Separator, SeparatorKind};
use crate::storage::{LIBRARY_FILE_NAME, default_data_dir};

/// Status of config file loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoadStatus {
    /// Config loaded successfully from existing file
    Loaded,
    /// Created default config file (first run)
    Created,
    /// Error occurred during loading, using defaults.
    Error(String),
}

/// Where the library lives
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the library file. Empty means `prompts.json` in the
    /// platform data directory.
    pub data_file: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Composition defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    pub separator: SeparatorKind,
    /// Text used when `separator = "custom"`.
    pub custom_separator: String,
    /// Characters shown in the preview before it is cut with an ellipsis.
    pub preview_chars: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            separator: SeparatorKind::Newline,
            custom_separator: " | ".to_string(),
            preview_chars: 300,
        }
    }
}

impl ComposeConfig {
    pub fn separator(&self) -> Separator {
        self.separator.with_custom(&self.custom_separator)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
}

impl Config {
    /// Expand `~` to home directory in a path string
    pub fn expand_tilde(path: &str) -> PathBuf {
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(path)
    }

    /// Resolved library file path.
    pub fn data_file_path(&self) -> PathBuf {
        let configured = self.storage.data_file.trim();
        if !configured.is_empty() {
            return Self::expand_tilde(configured);
        }
        default_data_dir()
            .map(|dir| dir.join(LIBRARY_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LIBRARY_FILE_NAME))
    }
}

/// Loaded configuration with metadata
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_path: PathBuf,
    pub status: ConfigLoadStatus,
}

/// Get the platform-appropriate config directory
fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "promptdeck", "promptdeck").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the full path to the config file
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load configuration from file, environment, and defaults
pub fn load_config() -> LoadedConfig {
    let config_path = match get_config_path() {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return LoadedConfig {
                config: apply_env_overrides(Config::default()),
                config_path: PathBuf::from("config.toml"),
                status: ConfigLoadStatus::Error("Could not determine config directory".to_string()),
            };
        }
    };

    debug!("Config path: {:?}", config_path);

    let (config, status) = load_or_create_config(&config_path);
    let config = apply_env_overrides(config);

    LoadedConfig {
        config,
        config_path,
        status,
    }
}

/// Save a config to the given file path.
/// Returns Ok(()) on success, or Err(String) with error message on failure.
pub fn save_config(config: &Config, config_path: &Path) -> Result<(), String> {
    let toml_content = toml::to_string_pretty(config).map_err(|e| {
        warn!(error = %e, "config_save_serialize_failed");
        format!("Failed to serialize config: {}", e)
    })?;

    fs::write(config_path, &toml_content).map_err(|e| {
        warn!(path = ?config_path, error = %e, "config_save_write_failed");
        format!("Failed to write config: {}", e)
    })?;

    info!(path = ?config_path, "config_saved");
    Ok(())
}

/// Load config from file, or create default if not exists
fn load_or_create_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    match fs::read_to_string(config_path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(config) => {
                info!("Loaded config from {:?}", config_path);
                (config, ConfigLoadStatus::Loaded)
            }
            Err(e) => {
                warn!(
                    "Config file malformed at {:?}: {}. Using defaults.",
                    config_path, e
                );
                (
                    Config::default(),
                    ConfigLoadStatus::Error(format!("Malformed TOML: {}", e)),
                )
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => create_default_config(config_path),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!(
                "Permission denied reading config at {:?}. Using defaults.",
                config_path
            );
            (
                Config::default(),
                ConfigLoadStatus::Error("Permission denied reading config".to_string()),
            )
        }
        Err(e) => {
            warn!(
                "Error reading config at {:?}: {}. Using defaults.",
                config_path, e
            );
            (
                Config::default(),
                ConfigLoadStatus::Error(format!("Read error: {}", e)),
            )
        }
    }
}

/// Create the default config file
fn create_default_config(config_path: &Path) -> (Config, ConfigLoadStatus) {
    let config = Config::default();

    if let Some(parent) = config_path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!(
            "Could not create config directory {:?}: {}. Continuing without file.",
            parent, e
        );
        return (
            config,
            ConfigLoadStatus::Error(format!("Could not create config directory: {}", e)),
        );
    }

    let toml_content = match toml::to_string_pretty(&config) {
        Ok(s) => s,
        Err(e) => {
            warn!("Could not serialize default config: {}", e);
            return (
                config,
                ConfigLoadStatus::Error(format!("Serialization error: {}", e)),
            );
        }
    };

    match fs::write(config_path, &toml_content) {
        Ok(()) => {
            info!("Created default config at {:?}", config_path);
            (config, ConfigLoadStatus::Created)
        }
        Err(e) => {
            warn!(
                "Could not write default config to {:?}: {}. Continuing without file.",
                config_path, e
            );
            (
                config,
                ConfigLoadStatus::Error(format!("Write error: {}", e)),
            )
        }
    }
}

/// Apply environment variable overrides to config
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |key| env::var(key).ok())
}

fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(path) = lookup("PROMPTDECK_DATA_FILE") {
        debug!("Overriding storage.data_file from PROMPTDECK_DATA_FILE");
        config.storage.data_file = path;
    }

    if let Some(level) = lookup("PROMPTDECK_LOG") {
        debug!("Overriding logging.level from PROMPTDECK_LOG");
        config.logging.level = level;
    }

    config
}
