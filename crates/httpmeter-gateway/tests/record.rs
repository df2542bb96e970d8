//! Direct tests of the record step, without an HTTP round trip.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use httpmeter_core::{Exchange, HttpMetrics, LabelConfig, MetricRegistry, RequestSummary};
use httpmeter_gateway::obs::Instrumentation;

fn instrumentation(labels: LabelConfig) -> Instrumentation {
    let mut reg = MetricRegistry::new();
    let m = HttpMetrics::declare(&mut reg, "service").unwrap();
    Instrumentation::new(Arc::new(reg), m, labels)
}

fn exchange(status: u16, response_size: Option<u64>) -> Exchange {
    Exchange {
        request: RequestSummary {
            method: "POST".into(),
            endpoint: "/upload".into(),
            size: 64,
        },
        status,
        response_size,
        elapsed: Duration::from_millis(120),
    }
}

#[test]
fn unknown_response_size_is_recorded_as_zero() {
    let inst = instrumentation(LabelConfig::default());
    assert!(inst.record(&exchange(201, None)));

    let lvs = ["201", "/upload", "POST"];
    let reg = inst.registry();
    let m = inst.metrics();
    assert_eq!(reg.sample_stats(m.response_size(), &lvs), Some((1, 0.0)));
    assert_eq!(reg.sample_stats(m.request_size(), &lvs), Some((1, 64.0)));
    let (n, secs) = reg.sample_stats(m.request_duration(), &lvs).unwrap();
    assert_eq!(n, 1);
    assert!((secs - 0.12).abs() < 1e-9);
}

#[test]
fn excluded_exchange_touches_nothing() {
    let inst = instrumentation(LabelConfig::new().exclude_method("^POST$"));
    assert!(!inst.record(&exchange(201, Some(10))));

    let out = inst.registry().snapshot();
    assert!(!out.contains("/upload"), "{out}");
}

#[test]
fn oversized_response_is_recorded_as_is() {
    let inst = instrumentation(LabelConfig::default());
    assert!(inst.record(&exchange(200, Some(u64::MAX))));

    let lvs = ["200", "/upload", "POST"];
    assert_eq!(
        inst.registry().sample_stats(inst.metrics().response_size(), &lvs),
        Some((1, u64::MAX as f64))
    );
}
