//! httpmeter core: transport-agnostic metric registry, request sizing, and label
//! derivation for HTTP request instrumentation.
//!
//! This crate owns the measurement state and the pure decision logic (what to
//! measure, how to label, when to suppress). It carries no HTTP framework or
//! runtime dependencies; the gateway crate adapts it to axum.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Instrumentation must never become a cause of request failure, so every
//! fallible path surfaces as `MeterError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod labels;
pub mod metrics;
pub mod size;

/// Shared result type.
pub use error::{MeterError, Result};
pub use labels::{
    EndpointMapper, Exchange, LabelConfig, LabelTuple, RawPath, RequestSummary, RouteTemplate,
};
pub use metrics::{HttpMetrics, MetricKind, MetricRegistry, SeriesHandle};
pub use size::{estimate_request_size, HeaderField, RequestShape, SizeOptions};
