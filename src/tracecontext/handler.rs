//! Config-driven trace context handler

use super::context::{
    generate_trace_context, handle_trace_context, parse_trace_context, TraceContext,
};
use super::error::TraceContextResult;
use super::headers::HeaderContainer;
use super::random::{OsRandomSource, SecureRandomSource};
use crate::config::TraceContextConfig;
use std::fmt;
use std::sync::Arc;

/// Applies one service's propagation settings to every request.
///
/// Holds no per-request state, so a single handler can be shared across
/// threads.
#[derive(Clone)]
pub struct TraceContextHandler {
    config: TraceContextConfig,
    random: Arc<dyn SecureRandomSource>,
}

impl TraceContextHandler {
    /// Create a handler drawing identifiers from the OS random source
    pub fn from_config(config: TraceContextConfig) -> Self {
        Self {
            config,
            random: Arc::new(OsRandomSource::new()),
        }
    }

    /// Use a different random source
    #[must_use]
    pub fn with_random_source(mut self, random: Arc<dyn SecureRandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &TraceContextConfig {
        &self.config
    }

    /// Extract the inbound trace context without mutating anything
    pub fn extract<H: HeaderContainer>(&self, headers: &H) -> TraceContextResult<TraceContext> {
        parse_trace_context(headers)
    }

    /// Generate a fresh trace context with the configured settings
    pub fn generate(&self) -> TraceContextResult<TraceContext> {
        generate_trace_context(
            self.random.as_ref(),
            &self.config.parent_id,
            self.config.vendor_member(),
            self.config.sampling,
        )
    }

    /// Produce the outbound headers and trace context for a request
    pub fn handle<H: HeaderContainer>(&self, headers: &H) -> TraceContextResult<(H, TraceContext)> {
        handle_trace_context(
            headers,
            self.random.as_ref(),
            &self.config.parent_id,
            self.config.vendor_member(),
            self.config.sampling,
        )
    }
}

impl Default for TraceContextHandler {
    fn default() -> Self {
        Self::from_config(TraceContextConfig::default())
    }
}

impl fmt::Debug for TraceContextHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceContextHandler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
