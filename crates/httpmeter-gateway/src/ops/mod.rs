//! Operational HTTP endpoints.
//!
//! - `/healthz`  : liveness
//! - `/metrics`  : Prometheus text format (path is configurable)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Serialize the full registry. Read-only.
pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.registry().snapshot();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        body,
    )
        .into_response()
}
