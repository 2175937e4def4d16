//! Shared test utilities for the GPS bridge tests.
//!
//! - Test server startup on an ephemeral port
//! - Mock receiver construction
//! - JSON assertion helpers

#![allow(dead_code)]

use gps_serial_bridge::{build_router, LocationStore, MockSerialPort, RestContext};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpListener;

pub const TEST_SERIAL_PATH: &str = "/dev/ttyTEST0";

/// Start the HTTP surface over `store` and return its base URL.
pub async fn start_test_server(store: LocationStore, serial_path: &str) -> String {
    let app = build_router(RestContext::new(store, serial_path));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://{}", addr)
}

/// Create a mock receiver that emits `lines` and then reports a lost device,
/// so the pipeline ends once everything has been processed.
pub fn finite_receiver(lines: &[&str]) -> MockSerialPort {
    let mut mock = MockSerialPort::new("MOCK_GPS");
    for line in lines {
        mock.enqueue_line(line);
    }
    mock.fail_when_drained(std::io::ErrorKind::BrokenPipe);
    mock
}

/// GET `url` and return status plus raw body.
pub async fn get(url: &str) -> (u16, String) {
    let response = reqwest::get(url).await.expect("request failed");
    let status = response.status().as_u16();
    let body = response.text().await.expect("body not readable");
    (status, body)
}

/// GET `url` and parse the body as JSON.
pub async fn get_json(url: &str) -> (u16, Value) {
    let (status, body) = get(url).await;
    let value = serde_json::from_str(&body)
        .unwrap_or_else(|e| panic!("body is not JSON ({e}): {body:?}"));
    (status, value)
}

/// Poll `/location` until it answers 200 or the deadline passes.
pub async fn wait_for_fix(base: &str) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let (status, body) = get(&format!("{base}/location")).await;
        if status == 200 {
            return serde_json::from_str(&body).expect("fix is not JSON");
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "no fix served before the deadline"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
