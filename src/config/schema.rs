//! Configuration schema definitions.
//!
//! Every section has defaults, so a TOML file only needs the keys it
//! changes. The serial device path has no default and must be supplied.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use super::error::{ConfigError, ConfigResult};
use crate::port::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS};
use crate::processor::DEFAULT_BANNER_MARKER;

/// Default HTTP listen port.
pub const DEFAULT_HTTP_PORT: u16 = 3006;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Serial receiver configuration
    pub serial: SerialConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Check the values that have no usable default.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.port.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "serial port path (SERIAL_PORT or [serial].port)".to_string(),
            ));
        }
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::validation("serial.baud_rate", "must be greater than zero"));
        }
        if self.serial.timeout_ms == 0 {
            return Err(ConfigError::validation("serial.timeout_ms", "must be greater than zero"));
        }
        Ok(())
    }
}

/// HTTP server configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number for HTTP server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding a listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Serial receiver configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`
    pub port: String,
    /// Baud rate of the receiver
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
    /// Substring identifying the firmware startup banner
    pub banner_marker: String,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            banner_marker: DEFAULT_BANNER_MARKER.to_string(),
        }
    }
}

impl SerialConfig {
    /// Get the read timeout as Duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. "info" or "gps_serial_bridge=debug"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!(
                "unknown log format '{other}' (expected json, pretty or compact)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3006);
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.banner_marker, "INICIANDO_GPS_JSON");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_defaults_require_serial_port() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }

    #[test]
    fn test_zero_baud_rejected() {
        let mut config = Config::default();
        config.serial.port = "/dev/ttyACM0".into();
        config.serial.baud_rate = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));

        config.serial.baud_rate = 9600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [server]
            port = 8080

            [serial]
            port = "/dev/ttyUSB0"
            baud_rate = 115200

            [logging]
            format = "json"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.timeout_ms, 1000);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" compact ".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 9000,
        };
        assert_eq!(server.bind_addr(), "127.0.0.1:9000");
    }
}
