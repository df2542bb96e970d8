use std::net::SocketAddr;

use serde::Deserialize;
use httpmeter_core::error::{MeterError, Result};
use httpmeter_core::metrics::DEFAULT_NAMESPACE;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub demo: DemoSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
            demo: DemoSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeterError::BadConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;
        self.demo.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    /// Whether scrapes of `metrics_path` are themselves counted.
    #[serde(default = "default_true")]
    pub instrument_metrics_endpoint: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
            instrument_metrics_endpoint: true,
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<SocketAddr>().is_err() {
            return Err(MeterError::BadConfig(format!(
                "server.listen must be a valid socket address: {}",
                self.listen
            )));
        }
        if !self.metrics_path.starts_with('/') || self.metrics_path == "/healthz" {
            return Err(MeterError::BadConfig(
                "server.metrics_path must start with '/' and not shadow /healthz".into(),
            ));
        }
        Ok(())
    }
}

/// How the endpoint label is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointLabel {
    /// Raw request path (unbounded cardinality for parameterized routes).
    #[default]
    RawPath,
    /// Matched route template, e.g. `/users/:id`.
    RouteTemplate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Regex; matching status codes are not recorded. Empty disables.
    #[serde(default)]
    pub exclude_status: String,

    #[serde(default)]
    pub exclude_endpoint: String,

    #[serde(default)]
    pub exclude_method: String,

    #[serde(default)]
    pub endpoint_label: EndpointLabel,

    #[serde(default)]
    pub count_url_in_request_size: bool,

    #[serde(default = "default_uptime_interval_ms")]
    pub uptime_interval_ms: u64,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            exclude_status: String::new(),
            exclude_endpoint: String::new(),
            exclude_method: String::new(),
            endpoint_label: EndpointLabel::default(),
            count_url_in_request_size: false,
            uptime_interval_ms: default_uptime_interval_ms(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        // Exclusion patterns are not checked here; a broken one fails open at runtime.
        let ns_ok = self.namespace.is_empty()
            || (self
                .namespace
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && self
                    .namespace
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':'));
        if !ns_ok {
            return Err(MeterError::BadConfig(format!(
                "metrics.namespace is not a valid metric name prefix: {}",
                self.namespace
            )));
        }
        if !(1..=3_600_000).contains(&self.uptime_interval_ms) {
            return Err(MeterError::BadConfig(
                "metrics.uptime_interval_ms must be between 1 and 3600000".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemoSection {
    /// Upper bound of the simulated handler latency. 0 disables the delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for DemoSection {
    fn default() -> Self {
        Self {
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl DemoSection {
    pub fn validate(&self) -> Result<()> {
        if self.max_delay_ms > 60_000 {
            return Err(MeterError::BadConfig(
                "demo.max_delay_ms must be at most 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_true() -> bool {
    true
}
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}
fn default_uptime_interval_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    1000
}
