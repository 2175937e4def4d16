//! Serial read loop and line framing.
//!
//! The receiver is read on Tokio's blocking pool; complete lines are handed
//! to the processor over a bounded channel.

use memchr::memchr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::port::SerialPortAdapter;

/// Line delimiter used by the receiver firmware.
pub const LINE_DELIMITER: u8 = b'\n';

/// A partial line longer than this without a delimiter is discarded, along
/// with the rest of it up to the next delimiter.
pub const MAX_LINE_BYTES: usize = 4096;

/// Capacity of the channel between the read loop and the processor.
pub const LINE_CHANNEL_CAPACITY: usize = 64;

const READ_BUFFER_BYTES: usize = 512;

/// Pause after a would-block read so non-blocking ports don't spin.
const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Splits a byte stream into trimmed text lines.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
    discarded: u64,
    /// Dropping the remainder of an oversized line.
    skipping: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and collect every line they complete.
    ///
    /// Lines are decoded as UTF-8 (invalid sequences replaced) with trailing
    /// whitespace removed. Bytes after the last delimiter stay buffered.
    pub fn push(&mut self, mut bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        while let Some(pos) = memchr(LINE_DELIMITER, bytes) {
            let (head, rest) = bytes.split_at(pos);
            bytes = &rest[1..];

            if self.skipping {
                self.skipping = false;
                continue;
            }

            if self.pending.is_empty() {
                lines.push(decode(head));
            } else {
                self.pending.extend_from_slice(head);
                lines.push(decode(&self.pending));
                self.pending.clear();
            }
        }

        if self.skipping {
            return lines;
        }

        self.pending.extend_from_slice(bytes);
        if self.pending.len() > MAX_LINE_BYTES {
            warn!(
                bytes = self.pending.len(),
                "serial line exceeds {} bytes without a delimiter, discarding", MAX_LINE_BYTES
            );
            self.pending.clear();
            self.discarded += 1;
            self.skipping = true;
        }

        lines
    }

    /// Bytes waiting for a delimiter.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of oversized partial lines dropped so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

/// Read `port` until it fails or `lines` is closed, forwarding decoded lines.
///
/// Timeouts are idle polls. Any other read error ends the stream; there is no
/// reconnection.
pub fn spawn_serial_reader(
    port: Box<dyn SerialPortAdapter>,
    lines: mpsc::Sender<String>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || read_loop(port, lines))
}

fn read_loop(mut port: Box<dyn SerialPortAdapter>, lines: mpsc::Sender<String>) {
    let mut decoder = LineDecoder::new();
    let mut buffer = [0u8; READ_BUFFER_BYTES];
    info!(port = port.name(), "serial reader started");

    loop {
        if lines.is_closed() {
            debug!(port = port.name(), "line consumer gone, stopping reader");
            return;
        }

        match port.read_bytes(&mut buffer) {
            Ok(0) => std::thread::sleep(IDLE_BACKOFF),
            Ok(n) => {
                for line in decoder.push(&buffer[..n]) {
                    if lines.blocking_send(line).is_err() {
                        debug!(port = port.name(), "line consumer gone, stopping reader");
                        return;
                    }
                }
            }
            Err(e) if e.is_idle() => std::thread::sleep(IDLE_BACKOFF),
            Err(e) => {
                error!(
                    port = port.name(),
                    error = %e,
                    "serial read failed, no more lines will be produced"
                );
                return;
            }
        }
    }
}
