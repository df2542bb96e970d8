//! Metric registry and the HTTP series set.
//!
//! The registry is an explicitly constructed object: declare every series at
//! startup through `&mut MetricRegistry`, then share it behind an `Arc` with the
//! request path and the uptime ticker. All updates go through `&self` and are
//! internally synchronized (atomics inside `DashMap` cells).

pub mod http;
pub mod registry;

pub use http::{HttpMetrics, DEFAULT_NAMESPACE, LABEL_NAMES};
pub use registry::{MetricKind, MetricRegistry, SeriesHandle, DEFAULT_BUCKETS};
