//! Classification of receiver lines and updates of the location store.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::location::{now_millis, LocationRecord};
use crate::state::LocationStore;

/// Marker printed by the receiver firmware when it boots.
pub const DEFAULT_BANNER_MARKER: &str = "INICIANDO_GPS_JSON";

/// What happened to a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Blank after trimming; dropped.
    Empty,
    /// Firmware startup banner; logged and dropped.
    Banner,
    /// Not a JSON document (typically a raw NMEA sentence).
    NotJson,
    /// JSON without numeric `latitude`/`longitude`.
    InvalidFields,
    /// Stored as the latest fix.
    Accepted(LocationRecord),
}

impl LineOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Turns receiver lines into store updates.
#[derive(Debug, Clone)]
pub struct LineProcessor {
    store: LocationStore,
    banner_marker: String,
}

impl LineProcessor {
    pub fn new(store: LocationStore) -> Self {
        Self::with_banner_marker(store, DEFAULT_BANNER_MARKER)
    }

    pub fn with_banner_marker(store: LocationStore, marker: impl Into<String>) -> Self {
        Self {
            store,
            banner_marker: marker.into(),
        }
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    /// Process one line using the wall clock for missing timestamps.
    pub fn process(&self, line: &str) -> LineOutcome {
        self.process_at(line, now_millis())
    }

    /// Process one line; `now_ms` stands in for a missing `ts`.
    pub fn process_at(&self, line: &str, now_ms: i64) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Empty;
        }

        if !self.banner_marker.is_empty() && line.contains(self.banner_marker.as_str()) {
            info!(target: "device", "{}", line);
            return LineOutcome::Banner;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => {
                warn!(line, "non-JSON serial line");
                return LineOutcome::NotJson;
            }
        };

        match LocationRecord::from_json(&value, now_ms) {
            Ok(record) => {
                info!(
                    latitude = record.latitude,
                    longitude = record.longitude,
                    fix_age_ms = ?record.fix_age_ms,
                    ts = record.observed_at_ms,
                    "new location"
                );
                self.store.replace(record.clone());
                LineOutcome::Accepted(record)
            }
            Err(e) => {
                warn!(line, reason = %e, "JSON received but latitude/longitude invalid");
                LineOutcome::InvalidFields
            }
        }
    }

    /// Drain `lines` until every sender is gone.
    pub async fn run(self, mut lines: mpsc::Receiver<String>) {
        let mut accepted: u64 = 0;
        while let Some(line) = lines.recv().await {
            match self.process(&line) {
                LineOutcome::Accepted(_) => accepted += 1,
                LineOutcome::Empty => debug!("empty serial line dropped"),
                _ => {}
            }
        }
        info!(accepted, "serial line stream ended");
    }
}
