//! Configuration module for the GPS serial bridge.
//!
//! Provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! 1. `GPS_BRIDGE_CONFIG` environment variable (explicit path)
//! 2. `./gps-bridge.toml` (current directory)
//! 3. `gps-bridge.toml` in the platform config directory
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! - `PORT` - HTTP listen port (default 3006)
//! - `SERIAL_PORT` - receiver device path (required)
//! - `BAUD_RATE` - receiver baud rate (default 9600)
//! - `GPS_BRIDGE_<KEY>` for the remaining settings, e.g. `GPS_BRIDGE_LOG_FORMAT=json`
//!
//! # Example
//!
//! ```rust,no_run
//! use gps_serial_bridge::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?.into_config();
//! config.validate()?;
//! println!("Serving on {}", config.server.bind_addr());
//! # Ok::<(), gps_serial_bridge::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    apply_env_overrides, apply_overrides, get_default_config_path, resolve_config_path,
    ConfigLoader, BAUD_RATE_ENV, PORT_ENV, SERIAL_PORT_ENV,
};
pub use schema::{
    Config, LogFormat, LoggingConfig, SerialConfig, ServerConfig, DEFAULT_HTTP_PORT,
};
