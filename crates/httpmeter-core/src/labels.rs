//! Label derivation and suppression.
//!
//! Every recorded exchange is labeled with `(status, endpoint, method)`. The
//! operator may suppress exchanges per label dimension with a regular
//! expression, and controls endpoint cardinality through an `EndpointMapper`.
//!
//! Suppression rules:
//! - an empty pattern never suppresses;
//! - a pattern that fails to compile never suppresses (fails open, logged once
//!   at setup);
//! - otherwise a match anywhere in the value suppresses the exchange.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use crate::size::{estimate_request_size, RequestShape, SizeOptions};

/// Concrete label values for one exchange, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelTuple {
    pub status: String,
    pub endpoint: String,
    pub method: String,
}

impl LabelTuple {
    pub fn values(&self) -> [&str; 3] {
        [&self.status, &self.endpoint, &self.method]
    }
}

/// Maps a request to its endpoint label value.
pub trait EndpointMapper: Send + Sync {
    fn map_endpoint(&self, req: &dyn RequestShape) -> String;
}

/// Default mapper: the raw request path, unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPath;

impl EndpointMapper for RawPath {
    fn map_endpoint(&self, req: &dyn RequestShape) -> String {
        req.path().to_string()
    }
}

/// Uses the matched route template (`/users/:id`), falling back to the raw
/// path for requests no route matched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTemplate;

impl EndpointMapper for RouteTemplate {
    fn map_endpoint(&self, req: &dyn RequestShape) -> String {
        req.route().unwrap_or_else(|| req.path()).to_string()
    }
}

impl<F> EndpointMapper for F
where
    F: Fn(&dyn RequestShape) -> String + Send + Sync,
{
    fn map_endpoint(&self, req: &dyn RequestShape) -> String {
        self(req)
    }
}

/// One compiled exclusion rule.
#[derive(Debug, Clone, Default)]
struct ExcludePattern {
    regex: Option<Regex>,
}

impl ExcludePattern {
    fn compile(dimension: &'static str, pattern: &str) -> Self {
        if pattern.is_empty() {
            return Self::default();
        }
        match Regex::new(pattern) {
            Ok(regex) => Self { regex: Some(regex) },
            Err(e) => {
                tracing::warn!(
                    label = dimension,
                    pattern = %pattern,
                    error = %e,
                    "exclusion pattern does not compile; it will never suppress"
                );
                Self::default()
            }
        }
    }

    /// True when the value may be recorded.
    fn passes(&self, value: &str) -> bool {
        match &self.regex {
            None => true,
            Some(re) => !re.is_match(value),
        }
    }
}

/// Request-side data captured before the downstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub method: String,
    pub endpoint: String,
    pub size: u64,
}

/// Outcome of one request/response exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub request: RequestSummary,
    pub status: u16,
    /// Bytes in the response body; `None` when unknown.
    pub response_size: Option<u64>,
    pub elapsed: Duration,
}

impl Exchange {
    /// Response size with "unknown" normalized to 0.
    pub fn response_size(&self) -> u64 {
        self.response_size.unwrap_or(0)
    }
}

/// Immutable label configuration, shared read-only across requests.
#[derive(Clone)]
pub struct LabelConfig {
    status: ExcludePattern,
    endpoint: ExcludePattern,
    method: ExcludePattern,
    mapper: Arc<dyn EndpointMapper>,
    size: SizeOptions,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            status: ExcludePattern::default(),
            endpoint: ExcludePattern::default(),
            method: ExcludePattern::default(),
            mapper: Arc::new(RawPath),
            size: SizeOptions::default(),
        }
    }
}

impl LabelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_status(mut self, pattern: &str) -> Self {
        self.status = ExcludePattern::compile("status", pattern);
        self
    }

    pub fn exclude_endpoint(mut self, pattern: &str) -> Self {
        self.endpoint = ExcludePattern::compile("endpoint", pattern);
        self
    }

    pub fn exclude_method(mut self, pattern: &str) -> Self {
        self.method = ExcludePattern::compile("method", pattern);
        self
    }

    pub fn with_mapper(mut self, mapper: impl EndpointMapper + 'static) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    pub fn with_size_options(mut self, size: SizeOptions) -> Self {
        self.size = size;
        self
    }

    pub fn size_options(&self) -> SizeOptions {
        self.size
    }

    /// Capture method, endpoint label and estimated size from the request head.
    pub fn summarize(&self, req: &dyn RequestShape) -> RequestSummary {
        RequestSummary {
            method: req.method().to_string(),
            endpoint: self.mapper.map_endpoint(req),
            size: estimate_request_size(req, self.size),
        }
    }

    /// True iff every label value passes its exclusion rule.
    pub fn should_record(&self, labels: &LabelTuple) -> bool {
        self.status.passes(&labels.status)
            && self.endpoint.passes(&labels.endpoint)
            && self.method.passes(&labels.method)
    }

    /// Derive the label tuple for a completed exchange and decide whether it
    /// is recorded.
    pub fn extract(&self, exchange: &Exchange) -> (LabelTuple, bool) {
        let labels = LabelTuple {
            status: exchange.status.to_string(),
            endpoint: exchange.request.endpoint.clone(),
            method: exchange.request.method.clone(),
        };
        let record = self.should_record(&labels);
        (labels, record)
    }
}
