//! Telemetry for the metadata gate
//!
//! - `metrics` - Prometheus metrics for gate runs, written as a text
//!   exposition file so CI can ship them to a pushgateway
//!
//! Structured logging uses `tracing`; the binary installs the subscriber.

pub mod metrics;

pub use metrics::{GateMetrics, GateMetricsRegistry};

use thiserror::Error;

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Failed to encode metrics: {0}")]
    EncodingFailed(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
