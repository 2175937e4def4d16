//! Core traits for serial port abstraction.
//!
//! Defines the `SerialPortAdapter` trait so the read loop can run against a
//! real receiver or an in-memory mock interchangeably.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default baud rate used by the receiver firmware.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default read timeout. A timeout only means "no data yet" to the read loop.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Parameters used to open the receiver's serial link.
///
/// Framing is always 8 data bits, no parity, one stop bit, no flow control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Read timeout.
    pub timeout: Duration,
}

impl PortConfiguration {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
        }
    }
}

/// Trait for reading from a serial link.
///
/// The bridge never writes to the device, so only the receive side is
/// abstracted.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Timeouts and would-block
    /// conditions are reported as errors for which
    /// [`PortError::is_idle`] returns `true`.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;
}
