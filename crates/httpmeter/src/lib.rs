//! Top-level facade crate for httpmeter.
//!
//! Re-exports the core registry/labeling types and the axum gateway so users can
//! depend on a single crate.

pub mod core {
    pub use httpmeter_core::*;
}

pub mod gateway {
    pub use httpmeter_gateway::*;
}
