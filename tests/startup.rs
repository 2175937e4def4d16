//! Whole-bridge startup through `serve`, as the binary runs it.

mod common;

use assert_json_diff::assert_json_eq;
use common::{get, get_json};
use gps_serial_bridge::config::{apply_overrides, Config, SERIAL_PORT_ENV};
use gps_serial_bridge::serve;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const MISSING_DEVICE: &str = "/dev/nonexistent_gps_bridge_startup";

fn config_for(serial_port: &str) -> Config {
    let mut config = Config::default();
    apply_overrides(&mut config, |key| {
        (key == SERIAL_PORT_ENV).then(|| serial_port.to_string())
    })
    .expect("overrides should apply");
    config.validate().expect("config should be valid");
    config
}

#[tokio::test]
async fn http_stays_up_when_device_cannot_be_opened() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let base = format!("http://{}", listener.local_addr().expect("Failed to get address"));

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(config_for(MISSING_DEVICE), listener, async move {
        let _ = stop_rx.await;
    }));

    let (status, body) = get_json(&format!("{base}/health")).await;
    assert_eq!(status, 200);
    assert_json_eq!(body, json!({"status": "ok", "serialPort": MISSING_DEVICE}));

    let (status, body) = get(&format!("{base}/location")).await;
    assert_eq!(status, 204);
    assert!(body.is_empty());

    stop_tx.send(()).expect("server already gone");
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not shut down")
        .expect("server task panicked");
    assert!(result.is_ok(), "serve failed: {result:?}");
}
