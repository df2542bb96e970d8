//! Shared error type across httpmeter crates.

use thiserror::Error;

use crate::metrics::MetricKind;

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type used by core and gateway.
///
/// Declaration and configuration errors are fatal at startup. Update errors
/// (`UnknownSeries`, `LabelArity`, `KindMismatch`) are programming errors; the
/// request path logs them and moves on.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("series {name} already declared with a different kind or label set")]
    ConflictingSeries { name: String },
    #[error("invalid {what} name: {name:?}")]
    InvalidName { what: &'static str, name: String },
    #[error("unknown series handle: {0}")]
    UnknownSeries(String),
    #[error("series {name} expects {expected} label values, got {got}")]
    LabelArity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("series {name} is a {kind}, operation not supported")]
    KindMismatch { name: String, kind: MetricKind },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MeterError {
    /// Whether this error must stop the process before it serves traffic.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            MeterError::ConflictingSeries { .. }
                | MeterError::InvalidName { .. }
                | MeterError::BadConfig(_)
        )
    }
}
