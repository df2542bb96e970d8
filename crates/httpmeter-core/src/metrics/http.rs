//! The fixed HTTP series set: uptime, request count, latency, request size and
//! response size.

use std::time::Duration;

use crate::error::Result;
use crate::labels::LabelTuple;

use super::registry::{MetricKind, MetricRegistry, SeriesHandle};

/// Label schema shared by every per-request series.
pub const LABEL_NAMES: [&str; 3] = ["status", "endpoint", "method"];

/// Namespace prefix used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "service";

/// Handles for the declared HTTP series.
#[derive(Debug, Clone, Copy)]
pub struct HttpMetrics {
    uptime: SeriesHandle,
    request_count: SeriesHandle,
    request_duration: SeriesHandle,
    request_size: SeriesHandle,
    response_size: SeriesHandle,
}

fn full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}

impl HttpMetrics {
    /// Declare the series set under `namespace` (empty means no prefix).
    pub fn declare(registry: &mut MetricRegistry, namespace: &str) -> Result<Self> {
        let uptime = registry.declare(
            &full_name(namespace, "uptime"),
            "HTTP service uptime",
            MetricKind::Counter,
            &[],
        )?;
        let request_count = registry.declare(
            &full_name(namespace, "http_request_count_total"),
            "Total number of http requests made.",
            MetricKind::Counter,
            &LABEL_NAMES,
        )?;
        let request_duration = registry.declare(
            &full_name(namespace, "http_request_duration_seconds"),
            "HTTP request latencies in seconds",
            MetricKind::Histogram,
            &LABEL_NAMES,
        )?;
        let request_size = registry.declare(
            &full_name(namespace, "http_request_size_bytes"),
            "HTTP request size in bytes",
            MetricKind::Summary,
            &LABEL_NAMES,
        )?;
        let response_size = registry.declare(
            &full_name(namespace, "http_response_size_bytes"),
            "HTTP response size in bytes",
            MetricKind::Summary,
            &LABEL_NAMES,
        )?;

        Ok(Self {
            uptime,
            request_count,
            request_duration,
            request_size,
            response_size,
        })
    }

    /// Record one completed exchange: count, duration, request and response size.
    ///
    /// Each update is independently atomic; there is no combined lock.
    pub fn record(
        &self,
        registry: &MetricRegistry,
        labels: &LabelTuple,
        elapsed: Duration,
        request_size: u64,
        response_size: u64,
    ) -> Result<()> {
        let lvs = labels.values();
        registry.increment(self.request_count, &lvs)?;
        registry.observe(self.request_duration, &lvs, elapsed.as_secs_f64())?;
        registry.observe(self.request_size, &lvs, request_size as f64)?;
        registry.observe(self.response_size, &lvs, response_size as f64)?;
        Ok(())
    }

    /// Advance the uptime counter by one interval.
    pub fn tick_uptime(&self, registry: &MetricRegistry) -> Result<()> {
        registry.increment(self.uptime, &[])
    }

    pub fn uptime(&self) -> SeriesHandle {
        self.uptime
    }
    pub fn request_count(&self) -> SeriesHandle {
        self.request_count
    }
    pub fn request_duration(&self) -> SeriesHandle {
        self.request_duration
    }
    pub fn request_size(&self) -> SeriesHandle {
        self.request_size
    }
    pub fn response_size(&self) -> SeriesHandle {
        self.response_size
    }
}
