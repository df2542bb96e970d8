#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use httpmeter_core::MeterError;
use httpmeter_gateway::config::{self, EndpointLabel};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8080"
metrics:
  exclude_statuz: "^4" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, MeterError::BadConfig(_)));
    assert!(err.is_fatal_at_startup());
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.server.metrics_path, "/metrics");
    assert!(cfg.server.instrument_metrics_endpoint);
    assert_eq!(cfg.metrics.namespace, "service");
    assert_eq!(cfg.metrics.exclude_status, "");
    assert_eq!(cfg.metrics.endpoint_label, EndpointLabel::RawPath);
    assert_eq!(cfg.metrics.uptime_interval_ms, 1000);
    assert_eq!(cfg.demo.max_delay_ms, 1000);
}

#[test]
fn full_config_parses() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
  metrics_path: "/internal/metrics"
  instrument_metrics_endpoint: false
metrics:
  namespace: "shop"
  exclude_status: "^4\\d\\d$"
  exclude_endpoint: "^/internal"
  exclude_method: "OPTIONS"
  endpoint_label: route_template
  count_url_in_request_size: true
  uptime_interval_ms: 500
demo:
  max_delay_ms: 0
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.metrics_path, "/internal/metrics");
    assert_eq!(cfg.metrics.exclude_status, r"^4\d\d$");
    assert_eq!(cfg.metrics.endpoint_label, EndpointLabel::RouteTemplate);
    assert!(cfg.metrics.count_url_in_request_size);
    assert_eq!(cfg.demo.max_delay_ms, 0);
}

#[test]
fn invalid_exclusion_regex_is_not_a_config_error() {
    let cfg = config::load_from_str("version: 1\nmetrics:\n  exclude_endpoint: \"([\"\n");
    assert!(cfg.is_ok());
}

#[test]
fn rejects_out_of_range_values() {
    for bad in [
        "version: 2\n",
        "version: 1\nserver:\n  listen: \"not-an-addr\"\n",
        "version: 1\nserver:\n  metrics_path: \"metrics\"\n",
        "version: 1\nmetrics:\n  namespace: \"9lives\"\n",
        "version: 1\nmetrics:\n  uptime_interval_ms: 0\n",
        "version: 1\ndemo:\n  max_delay_ms: 120000\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "{bad}");
    }
}
