//! Application routes served behind the instrumentation layer.

pub mod demo;
