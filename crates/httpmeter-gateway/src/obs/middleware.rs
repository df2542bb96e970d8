//! Per-request instrumentation middleware.
//!
//! Lifecycle per request:
//! 1. mark the start instant and capture method, endpoint label and estimated
//!    size from the request head (the request is moved downstream afterwards)
//! 2. run the rest of the pipeline (`Next` is consumed, so it runs at most once)
//! 3. read final status and body size from the response
//! 4. derive labels, apply exclusions, update the registry
//!
//! No lock is held across the downstream call; registry updates happen only
//! after it completes. If the downstream panics, nothing is recorded.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::HttpBody,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use httpmeter_core::{Exchange, HttpMetrics, LabelConfig, MetricRegistry};

use super::request::RequestHead;

/// Shared middleware state: registry, series handles, label config.
#[derive(Clone)]
pub struct Instrumentation {
    registry: Arc<MetricRegistry>,
    metrics: HttpMetrics,
    labels: Arc<LabelConfig>,
}

impl Instrumentation {
    pub fn new(registry: Arc<MetricRegistry>, metrics: HttpMetrics, labels: LabelConfig) -> Self {
        Self {
            registry,
            metrics,
            labels: Arc::new(labels),
        }
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> HttpMetrics {
        self.metrics
    }

    pub fn labels(&self) -> &LabelConfig {
        &self.labels
    }

    /// Record a completed exchange unless its labels are excluded.
    ///
    /// Returns whether anything was recorded. Registry errors are logged and
    /// swallowed; instrumentation never fails a request.
    pub fn record(&self, exchange: &Exchange) -> bool {
        let (labels, should_record) = self.labels.extract(exchange);
        if !should_record {
            tracing::trace!(?labels, "exchange excluded from metrics");
            return false;
        }

        if let Err(e) = self.metrics.record(
            &self.registry,
            &labels,
            exchange.elapsed,
            exchange.request.size,
            exchange.response_size(),
        ) {
            tracing::error!(error = %e, ?labels, "metrics update failed");
            return false;
        }

        tracing::trace!(?labels, elapsed = ?exchange.elapsed, "exchange recorded");
        true
    }
}

/// Bytes in the response body, if known.
fn response_size(res: &Response) -> Option<u64> {
    res.body().size_hint().exact().or_else(|| {
        res.headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
    })
}

/// axum middleware; attach with `middleware::from_fn_with_state`.
pub async fn instrument(State(inst): State<Instrumentation>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let summary = inst.labels().summarize(&RequestHead::new(&req));

    let response = next.run(req).await;

    let exchange = Exchange {
        request: summary,
        status: response.status().as_u16(),
        response_size: response_size(&response),
        elapsed: start.elapsed(),
    };
    inst.record(&exchange);

    response
}
