//! Configuration loading from files and the process environment.
//!
//! These tests mutate process-wide environment variables, so they run
//! serially.

use gps_serial_bridge::config::{ConfigError, ConfigLoader, LogFormat};
use serial_test::serial;
use std::env;
use std::io::Write;

const VARS: &[&str] = &[
    "PORT",
    "SERIAL_PORT",
    "BAUD_RATE",
    "GPS_BRIDGE_HOST",
    "GPS_BRIDGE_SERIAL_TIMEOUT_MS",
    "GPS_BRIDGE_BANNER_MARKER",
    "GPS_BRIDGE_LOG_LEVEL",
    "GPS_BRIDGE_LOG_FORMAT",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
#[serial]
fn file_values_are_loaded() {
    clear_env();
    let file = write_config(
        r#"
        [server]
        host = "127.0.0.1"
        port = 8081

        [serial]
        port = "/dev/ttyACM0"
        baud_rate = 38400

        [logging]
        format = "compact"
        "#,
    );

    let loader = ConfigLoader::load_from(file.path()).unwrap();
    let config = loader.config();
    assert_eq!(loader.config_path.as_deref(), Some(file.path()));
    assert_eq!(config.server.bind_addr(), "127.0.0.1:8081");
    assert_eq!(config.serial.port, "/dev/ttyACM0");
    assert_eq!(config.serial.baud_rate, 38400);
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn environment_overrides_file() {
    clear_env();
    let file = write_config(
        r#"
        [server]
        port = 8081

        [serial]
        port = "/dev/ttyACM0"
        "#,
    );
    env::set_var("PORT", "9090");
    env::set_var("SERIAL_PORT", "COM4");
    env::set_var("BAUD_RATE", "4800");

    let config = ConfigLoader::load_from(file.path()).unwrap().into_config();
    clear_env();

    assert_eq!(config.server.port, 9090);
    assert_eq!(config.serial.port, "COM4");
    assert_eq!(config.serial.baud_rate, 4800);
}

#[test]
#[serial]
fn missing_serial_port_fails_validation() {
    clear_env();
    let file = write_config("[server]\nport = 3006\n");

    let config = ConfigLoader::load_from(file.path()).unwrap().into_config();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingRequired(_))
    ));
}

#[test]
#[serial]
fn malformed_baud_rate_is_reported() {
    clear_env();
    let file = write_config("[serial]\nport = \"COM3\"\n");
    env::set_var("BAUD_RATE", "nine-six-hundred");

    let result = ConfigLoader::load_from(file.path());
    clear_env();

    match result {
        Err(ConfigError::EnvParseError { var, .. }) => assert_eq!(var, "BAUD_RATE"),
        other => panic!("expected BAUD_RATE parse error, got {:?}", other),
    }
}

#[test]
#[serial]
fn malformed_toml_is_a_parse_error() {
    clear_env();
    let file = write_config("[serial\nport = ");

    assert!(matches!(
        ConfigLoader::load_from(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
#[serial]
fn unreadable_file_is_a_read_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(matches!(
        ConfigLoader::load_from(&missing),
        Err(ConfigError::ReadError { .. })
    ));
}
