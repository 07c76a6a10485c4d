//! Trace context error types.

use thiserror::Error;

/// Errors raised while parsing, validating or mutating trace context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceContextError {
    /// The traceparent value matches neither the current nor a future version grammar.
    #[error("malformed traceparent: {0}")]
    MalformedTraceParent(String),

    /// The traceparent announces a future version but its known prefix is broken.
    #[error("malformed traceparent of future version {version:02x}: {reason}")]
    MalformedFutureVersion {
        /// Version announced by the header.
        version: u8,
        /// What was wrong with it.
        reason: String,
    },

    /// Version `ff` is reserved and never valid.
    #[error("traceparent version ff is reserved")]
    ReservedVersion,

    /// A trace id or parent id made only of zeros.
    #[error("all-zero {0} is not allowed")]
    AllZeroId(&'static str),

    /// An identifier that is not the expected number of lowercase hex characters.
    #[error("invalid {kind} format: {value:?}")]
    InvalidIdFormat {
        /// Which identifier was rejected.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A tracestate list with at least one malformed member.
    #[error("malformed tracestate member: {0:?}")]
    MalformedTraceState(String),

    /// A tracestate key rejected by the key grammar.
    #[error("invalid tracestate key: {0:?}")]
    InvalidKey(String),

    /// A tracestate value rejected by the value grammar.
    #[error("invalid tracestate value: {0:?}")]
    InvalidValue(String),

    /// The secure random source could not deliver bytes.
    #[error("random source unavailable: {0}")]
    RandomSource(String),

    /// Mutation was requested on a context that carries no traceparent.
    #[error("trace context without traceparent cannot be mutated")]
    NoTraceParent,
}

/// Result type for trace context operations
pub type TraceContextResult<T> = Result<T, TraceContextError>;
