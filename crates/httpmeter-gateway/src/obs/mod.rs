//! Request instrumentation for the axum host.
//!
//! - `request`: `RequestShape` view over an axum request head
//! - `middleware`: per-request interception (count, latency, sizes)
//! - `uptime`: background ticker for the uptime counter

pub mod middleware;
pub mod request;
pub mod uptime;

pub use middleware::{instrument, Instrumentation};
pub use request::RequestHead;
pub use uptime::UptimeTicker;
