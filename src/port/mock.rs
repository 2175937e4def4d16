//! Mock serial port implementation for testing.
//!
//! `MockSerialPort` stands in for a GPS receiver: tests enqueue the bytes the
//! device would emit and the read loop consumes them. Clones share the same
//! queue, so bytes can be fed after the port was handed to a reader.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Upper bound on bytes returned by a single read, to simulate fragmentation.
    max_chunk: Option<usize>,
    /// Whether the next read should time out.
    should_timeout: bool,
    /// Error kind returned once the queue is drained, simulating a lost device.
    fail_when_drained: Option<std::io::ErrorKind>,
    timeout: Duration,
    reads: u64,
}

/// Mock serial port implementation for testing.
///
/// # Example
/// ```
/// use gps_serial_bridge::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_line("{\"latitude\":1.0,\"longitude\":2.0}");
///
/// let mut buffer = [0u8; 64];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert!(buffer[..n].ends_with(b"\n"));
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_secs(1),
                ..Default::default()
            })),
        }
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Enqueue one text line followed by the `\n` delimiter.
    pub fn enqueue_line(&mut self, line: &str) {
        let mut state = self.state.lock();
        state.read_queue.extend(line.as_bytes());
        state.read_queue.push_back(b'\n');
    }

    /// Limit how many bytes a single read may return.
    pub fn set_max_chunk(&mut self, max_chunk: usize) {
        self.state.lock().max_chunk = Some(max_chunk.max(1));
    }

    /// Set whether the next read operation should time out.
    pub fn set_should_timeout(&mut self, should_timeout: bool) {
        self.state.lock().should_timeout = should_timeout;
    }

    /// Fail every read with `kind` once the queued bytes are consumed.
    pub fn fail_when_drained(&mut self, kind: std::io::ErrorKind) {
        self.state.lock().fail_when_drained = Some(kind);
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    /// Number of read calls made so far.
    pub fn read_count(&self) -> u64 {
        self.state.lock().reads
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        state.reads += 1;

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.timeout));
        }

        let limit = state.max_chunk.unwrap_or(buffer.len()).min(buffer.len());
        let mut bytes_read = 0;
        for byte in buffer.iter_mut().take(limit) {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read > 0 {
            return Ok(bytes_read);
        }

        match state.fail_when_drained {
            Some(kind) => Err(PortError::Io(std::io::Error::new(kind, "mock device lost"))),
            None => Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "No data available",
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
