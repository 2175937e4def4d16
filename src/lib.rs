//! GPS Serial Bridge Library
//!
//! Reads newline-delimited JSON fixes from a GPS receiver on a serial link,
//! keeps the most recent one and serves it over HTTP.
//!
//! # Modules
//!
//! - `config`: Configuration management with TOML and environment overrides
//! - `port`: Port abstraction layer for serial communication
//! - `reader`: Serial read loop and line framing
//! - `processor`: Line classification and validation
//! - `location`: The location record and its JSON validation
//! - `state`: Shared single-slot store for the latest fix
//! - `bridge`: Wiring of reader, processor and store
//! - `rest_api`: HTTP handlers
//! - `error`: Unified error handling

pub mod bridge;
pub mod config;
pub mod error;
pub mod location;
pub mod port;
pub mod processor;
pub mod reader;
pub mod rest_api;
pub mod state;

// Re-export commonly used types for convenience
pub use bridge::{open_pipeline, serve, spawn_pipeline, Pipeline};
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
pub use error::{AppError, AppResult};
pub use location::{FieldError, LocationRecord};
pub use port::{MockSerialPort, PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
pub use processor::{LineOutcome, LineProcessor, DEFAULT_BANNER_MARKER};
pub use reader::{spawn_serial_reader, LineDecoder};
pub use rest_api::{build_router, RestContext};
pub use state::LocationStore;
