//! Configuration type definitions.

use crate::tracecontext::{SamplingBehavior, TraceStateMember};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PropagationConfig {
    /// Trace context handling.
    pub tracecontext: TraceContextConfig,
}

/// Trace context handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TraceContextConfig {
    /// Key of the member this service writes into `tracestate`.
    ///
    /// No member is written when unset.
    pub vendor_key: Option<String>,

    /// Value of that member. Empty means "use the new parent id".
    pub vendor_value: String,

    /// Fixed parent id (16 lowercase hex chars). Empty means random per request.
    pub parent_id: String,

    /// How the outbound sampled flag is decided.
    pub sampling: SamplingBehavior,
}

impl TraceContextConfig {
    /// Set the vendor member.
    #[must_use]
    pub fn with_vendor(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vendor_key = Some(key.into());
        self.vendor_value = value.into();
        self
    }

    /// Set the sampling behavior.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingBehavior) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set a fixed parent id.
    #[must_use]
    pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = parent_id.into();
        self
    }

    /// The tracestate member to write, if a vendor key is configured.
    #[must_use]
    pub fn vendor_member(&self) -> Option<TraceStateMember> {
        self.vendor_key
            .as_ref()
            .map(|key| TraceStateMember::new(key.clone(), self.vendor_value.clone()))
    }
}
