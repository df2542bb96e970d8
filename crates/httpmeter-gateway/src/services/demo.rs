//! Demo routes that exercise the middleware.
//!
//! Each handler sleeps for a random delay below `demo.max_delay_ms` before
//! answering, so latency histograms have something to show.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use rand::Rng;
use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/index", get(index))
        .route("/forbidden", get(forbidden))
        .route("/badreq", get(badreq))
}

async fn zzz(state: &AppState) {
    let max = state.cfg().demo.max_delay_ms;
    if max == 0 {
        return;
    }
    let ms = rand::thread_rng().gen_range(0..max);
    sleep(Duration::from_millis(ms)).await;
}

fn message(msg: &str) -> Json<Value> {
    Json(json!({ "message": msg }))
}

async fn home(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    zzz(&state).await;
    (StatusCode::OK, message("home"))
}

async fn index(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    zzz(&state).await;
    (StatusCode::OK, message("index"))
}

async fn forbidden(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    zzz(&state).await;
    (StatusCode::FORBIDDEN, message("forbidden"))
}

async fn badreq(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    zzz(&state).await;
    (StatusCode::BAD_REQUEST, message("badreq"))
}
