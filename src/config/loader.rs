//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides without a legacy name
const ENV_PREFIX: &str = "GPS_BRIDGE";

/// Config file name looked up in the working and platform config directories
const CONFIG_FILE_NAME: &str = "gps-bridge.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "GPS_BRIDGE_CONFIG";

/// HTTP listen port.
pub const PORT_ENV: &str = "PORT";
/// Serial device path.
pub const SERIAL_PORT_ENV: &str = "SERIAL_PORT";
/// Serial baud rate.
pub const BAUD_RATE_ENV: &str = "BAUD_RATE";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `GPS_BRIDGE_CONFIG` environment variable (explicit path)
    /// 2. `./gps-bridge.toml` (current directory)
    /// 3. `gps-bridge.toml` in the platform config directory
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override any config file values.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        apply_env_overrides(&mut config)?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|p| p.exists())
}

/// Platform config file location, e.g. `~/.config/gps-bridge/gps-bridge.toml`.
pub fn get_default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gps-bridge").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Apply process environment overrides to the configuration.
pub fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides read through `lookup`.
///
/// Recognized keys:
/// - `PORT`, `SERIAL_PORT`, `BAUD_RATE`
/// - `GPS_BRIDGE_HOST`, `GPS_BRIDGE_SERIAL_TIMEOUT_MS`, `GPS_BRIDGE_BANNER_MARKER`
/// - `GPS_BRIDGE_LOG_LEVEL`, `GPS_BRIDGE_LOG_FORMAT`
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Server overrides
    if let Some(val) = lookup(PORT_ENV) {
        config.server.port = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::env_parse(PORT_ENV, "Invalid port number"))?;
    }
    let host_var = format!("{}_HOST", ENV_PREFIX);
    if let Some(val) = lookup(&host_var) {
        config.server.host = val;
    }

    // Serial overrides
    if let Some(val) = lookup(SERIAL_PORT_ENV) {
        config.serial.port = val;
    }
    if let Some(val) = lookup(BAUD_RATE_ENV) {
        config.serial.baud_rate = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::env_parse(BAUD_RATE_ENV, "Invalid baud rate"))?;
    }
    let timeout_var = format!("{}_SERIAL_TIMEOUT_MS", ENV_PREFIX);
    if let Some(val) = lookup(&timeout_var) {
        config.serial.timeout_ms = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::env_parse(&timeout_var, "Invalid timeout"))?;
    }
    let marker_var = format!("{}_BANNER_MARKER", ENV_PREFIX);
    if let Some(val) = lookup(&marker_var) {
        config.serial.banner_marker = val;
    }

    // Logging overrides
    let level_var = format!("{}_LOG_LEVEL", ENV_PREFIX);
    if let Some(val) = lookup(&level_var) {
        config.logging.level = val;
    }
    let format_var = format!("{}_LOG_FORMAT", ENV_PREFIX);
    if let Some(val) = lookup(&format_var) {
        config.logging.format = val
            .parse()
            .map_err(|msg: String| ConfigError::env_parse(&format_var, msg))?;
    }

    Ok(())
}
