//! Shared application state for the httpmeter gateway.
//!
//! Owns the explicitly constructed metric registry: series are declared here,
//! once, before the registry is frozen behind an `Arc` and handed to the
//! middleware, the exposition endpoint and the uptime ticker.

use std::sync::Arc;
use std::time::Duration;

use httpmeter_core::error::Result;
use httpmeter_core::{HttpMetrics, LabelConfig, MetricRegistry, RouteTemplate, SizeOptions};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{EndpointLabel, GatewayConfig, MetricsSection};
use crate::obs::{Instrumentation, UptimeTicker};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    instrumentation: Instrumentation,
}

/// Build the label config described by the `metrics` section.
pub fn label_config(m: &MetricsSection) -> LabelConfig {
    let cfg = LabelConfig::new()
        .exclude_status(&m.exclude_status)
        .exclude_endpoint(&m.exclude_endpoint)
        .exclude_method(&m.exclude_method)
        .with_size_options(SizeOptions {
            count_url: m.count_url_in_request_size,
        });

    match m.endpoint_label {
        EndpointLabel::RawPath => cfg,
        EndpointLabel::RouteTemplate => cfg.with_mapper(RouteTemplate),
    }
}

impl AppState {
    /// Build application state from config.
    /// Declaration errors surface here so the process fails before serving.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let labels = label_config(&cfg.metrics);
        Self::with_labels(cfg, labels)
    }

    /// Like `new`, with a caller-supplied label config (custom endpoint mapper).
    pub fn with_labels(cfg: GatewayConfig, labels: LabelConfig) -> Result<Self> {
        let mut registry = MetricRegistry::new();
        let metrics = HttpMetrics::declare(&mut registry, &cfg.metrics.namespace)?;
        tracing::debug!(series = ?registry.series_names(), "metric registry initialized");

        let instrumentation = Instrumentation::new(Arc::new(registry), metrics, labels);

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, instrumentation }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn instrumentation(&self) -> &Instrumentation {
        &self.inner.instrumentation
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(self.inner.instrumentation.registry())
    }

    pub fn metrics(&self) -> HttpMetrics {
        self.inner.instrumentation.metrics()
    }

    /// Start the uptime ticker at the configured interval.
    pub fn spawn_uptime(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        UptimeTicker::spawn(
            self.registry(),
            self.metrics(),
            Duration::from_millis(self.cfg().metrics.uptime_interval_ms),
            shutdown,
        )
    }
}
