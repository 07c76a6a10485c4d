//! # W3C Trace Context
//!
//! Codec and mutation engine for the `traceparent` and `tracestate`
//! propagation headers.
//!
//! ## Features
//!
//! - Strict parsing of version 00 `traceparent` values, with a
//!   forward-compatible path that downgrades unknown future versions
//! - `tracestate` list parsing, move-to-front mutation and 32 member cap
//! - Merge/generate decision for absent, valid and malformed inbound headers
//! - Pluggable header containers ([`http::HeaderMap`], plain maps) and
//!   random sources

pub mod context;
pub mod error;
pub mod handler;
pub mod headers;
pub mod id;
pub mod random;
pub mod traceparent;
pub mod tracestate;

pub use context::*;
pub use error::*;
pub use handler::*;
pub use headers::*;
pub use id::*;
pub use random::*;
pub use traceparent::*;
pub use tracestate::*;
