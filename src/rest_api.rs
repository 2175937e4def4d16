//! HTTP surface: the latest fix and a liveness probe.
//!
//! Both endpoints are read-only. `/health` reports on the HTTP layer only;
//! it does not reflect whether the serial device is still delivering data.

use axum::{
    extract::State as AxumState,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::state::LocationStore;

#[derive(Clone)]
pub struct RestContext {
    pub location: LocationStore,
    /// Configured device path, echoed by `/health`.
    pub serial_port: Arc<str>,
}

impl RestContext {
    pub fn new(location: LocationStore, serial_port: impl Into<Arc<str>>) -> Self {
        Self {
            location,
            serial_port: serial_port.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub serial_port: String,
}

// ---------- Router Builder ----------
pub fn build_router(ctx: RestContext) -> Router {
    Router::new()
        .route("/location", get(location))
        .route("/health", get(health))
        .with_state(ctx)
}

// ---------- Handlers ----------
async fn location(AxumState(ctx): AxumState<RestContext>) -> Response {
    match ctx.location.latest() {
        Some(record) => Json(record.as_ref().clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn health(AxumState(ctx): AxumState<RestContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        serial_port: ctx.serial_port.to_string(),
    })
}
