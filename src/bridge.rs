//! Wiring between the serial read loop, the line processor and HTTP.
//!
//! ```text
//! serial port -> read loop -mpsc-> LineProcessor -> LocationStore <- HTTP
//! ```

use std::future::Future;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use crate::config::{Config, SerialConfig};
use crate::error::AppResult;
use crate::port::{PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
use crate::processor::LineProcessor;
use crate::reader::{spawn_serial_reader, LINE_CHANNEL_CAPACITY};
use crate::rest_api::{build_router, RestContext};
use crate::state::LocationStore;

/// Handles to the two tasks of a running pipeline.
#[derive(Debug)]
pub struct Pipeline {
    pub reader: JoinHandle<()>,
    pub processor: JoinHandle<()>,
}

impl Pipeline {
    /// Wait until the serial stream ends and every line has been processed.
    ///
    /// Both tasks are awaited; the first failure (a panic or cancellation)
    /// is returned.
    pub async fn finished(self) -> Result<(), JoinError> {
        let reader = self.reader.await;
        if let Err(e) = &reader {
            error!(error = %e, "serial reader task failed");
        }
        let processor = self.processor.await;
        if let Err(e) = &processor {
            error!(error = %e, "line processor task failed");
        }
        reader.and(processor)
    }
}

/// Start reading `port` and feeding `processor`.
pub fn spawn_pipeline(port: Box<dyn SerialPortAdapter>, processor: LineProcessor) -> Pipeline {
    let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
    let reader = spawn_serial_reader(port, tx);
    let processor = tokio::spawn(processor.run(rx));
    Pipeline { reader, processor }
}

/// Open the configured device and start the pipeline.
///
/// An open failure is logged and returned; callers keep serving HTTP with an
/// empty store.
pub fn open_pipeline(
    config: &SerialConfig,
    processor: LineProcessor,
) -> Result<Pipeline, PortError> {
    let port_config = PortConfiguration::new(config.baud_rate).with_timeout(config.read_timeout());

    match SyncSerialPort::open(&config.port, port_config) {
        Ok(port) => {
            info!(port = %config.port, baud_rate = config.baud_rate, "serial port opened");
            Ok(spawn_pipeline(Box::new(port), processor))
        }
        Err(e) => {
            error!(port = %config.port, error = %e, "failed to open serial port");
            Err(e)
        }
    }
}

/// Run the bridge on `listener` until `shutdown` resolves.
///
/// The HTTP server is up even when the device cannot be opened; `/location`
/// then answers 204 until restart.
pub async fn serve<F>(config: Config, listener: TcpListener, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = LocationStore::new();
    let processor =
        LineProcessor::with_banner_marker(store.clone(), config.serial.banner_marker.clone());

    let pipeline = open_pipeline(&config.serial, processor).ok();
    if pipeline.is_none() {
        warn!("serving without a serial device; /location will answer 204 until restart");
    }

    let app = build_router(RestContext::new(store, config.serial.port.as_str()));
    let addr = listener.local_addr()?;
    info!(addr = %addr, "GPS bridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    if let Some(pipeline) = pipeline {
        pipeline.processor.abort();
    }
    info!("GPS bridge stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockSerialPort;

    #[derive(Debug)]
    struct FaultyPort;

    impl SerialPortAdapter for FaultyPort {
        fn read_bytes(&mut self, _buffer: &mut [u8]) -> Result<usize, PortError> {
            panic!("driver fault");
        }

        fn name(&self) -> &str {
            "FAULTY0"
        }
    }

    #[tokio::test]
    async fn pipeline_stores_last_valid_fix() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_line(r#"{"latitude":1.0,"longitude":1.0,"ts":1}"#);
        port.enqueue_line("$GPGSV,3,1,11*7A");
        port.enqueue_line(r#"{"latitude":2.0,"longitude":2.0,"ts":2}"#);
        port.fail_when_drained(std::io::ErrorKind::BrokenPipe);

        let store = LocationStore::new();
        spawn_pipeline(Box::new(port), LineProcessor::new(store.clone()))
            .finished()
            .await
            .unwrap();

        let latest = store.latest().unwrap();
        assert_eq!(latest.latitude, 2.0);
        assert_eq!(latest.observed_at_ms, 2);
    }

    #[tokio::test]
    async fn open_failure_is_reported() {
        let config = SerialConfig {
            port: "/dev/nonexistent_gps_bridge_0".to_string(),
            ..SerialConfig::default()
        };
        let store = LocationStore::new();
        let result = open_pipeline(&config, LineProcessor::new(store.clone()));
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn reader_panic_is_surfaced() {
        let store = LocationStore::new();
        let err = spawn_pipeline(Box::new(FaultyPort), LineProcessor::new(store.clone()))
            .finished()
            .await
            .unwrap_err();
        assert!(err.is_panic());
        assert!(store.is_empty());
    }
}
