//! Axum router wiring.
//!
//! Demo routes (and, by default, the metrics endpoint) sit inside the
//! instrumentation layer; `/healthz` is always outside it.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, obs, ops, services};

pub fn build_router(state: AppState) -> Router {
    let metrics_path = state.cfg().server.metrics_path.clone();
    let instrument_metrics = state.cfg().server.instrument_metrics_endpoint;

    let mut app = services::demo::routes();
    if instrument_metrics {
        app = app.route(&metrics_path, get(ops::metrics));
    }

    // Only routes added before `layer` are wrapped.
    app = app.layer(middleware::from_fn_with_state(
        state.instrumentation().clone(),
        obs::instrument,
    ));

    if !instrument_metrics {
        app = app.route(&metrics_path, get(ops::metrics));
    }

    app.route("/healthz", get(ops::healthz)).with_state(state)
}
