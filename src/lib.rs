//! # R0N Trace Context
//!
//! W3C Trace Context propagation for R0N Gateway: parses inbound
//! `traceparent`/`tracestate` headers, decides what the outbound trace
//! context must be, and writes it back.
//!
//! ## Features
//!
//! - Strict `traceparent` grammar with forward compatibility for future versions
//! - Ordered, bounded, deduplicated `tracestate` mutation
//! - Trace restart on malformed inbound headers, never a hard failure
//! - Sampling override (pass-through, always, never)
//! - TOML configuration for the vendor member and sampling behavior
//!
//! ## Usage
//!
//! ```
//! use r0n_tracecontext::config::TraceContextConfig;
//! use r0n_tracecontext::tracecontext::{HeaderContainer, SamplingBehavior, TraceContextHandler};
//! use std::collections::HashMap;
//!
//! let handler = TraceContextHandler::from_config(
//!     TraceContextConfig::default()
//!         .with_vendor("r0n", "")
//!         .with_sampling(SamplingBehavior::AlwaysSampled),
//! );
//!
//! let mut inbound: HashMap<String, String> = HashMap::new();
//! inbound.set_header(
//!     "traceparent",
//!     "00-0af7651916cd43dd8448eb211c80319c-00f067aa0ba902b7-00".to_string(),
//! );
//!
//! let (outbound, context) = handler.handle(&inbound).unwrap();
//! assert!(context.is_sampled());
//! assert!(outbound.get_header("tracestate").unwrap().starts_with("r0n="));
//! ```

pub mod config;
pub mod tracecontext;
