//! httpmeter gateway library entry.
//!
//! Wires the core registry and label logic into an axum stack: the
//! instrumentation middleware, the uptime ticker, the exposition endpoint and
//! the demo application routes. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
