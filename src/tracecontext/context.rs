//! Trace context: the pair of traceparent and tracestate, and the rules for
//! turning inbound headers into outbound ones.
//!
//! | inbound traceparent | outcome                                            |
//! |---------------------|----------------------------------------------------|
//! | absent              | stray tracestate dropped, fresh context generated  |
//! | valid               | trace id kept, parent id/sampling/member mutated   |
//! | invalid             | tracestate dropped, fresh context generated        |
//!
//! A tracestate that fails to parse next to a valid traceparent is treated
//! as empty and never affects the traceparent.

use super::error::{TraceContextError, TraceContextResult};
use super::headers::HeaderContainer;
use super::id::ParentId;
use super::random::SecureRandomSource;
use super::traceparent::{SamplingBehavior, TraceParent};
use super::tracestate::{TraceState, TraceStateMember};
use tracing::debug;

/// Combined `traceparent` and `tracestate` information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    /// Parsed or generated traceparent
    pub trace_parent: Option<TraceParent>,

    /// Vendor list, possibly empty
    pub trace_state: TraceState,
}

impl TraceContext {
    /// Create a context from identifiers the caller already holds.
    ///
    /// The traceparent starts unsampled and the tracestate empty.
    pub fn new(trace_id: &str, parent_id: &str) -> TraceContextResult<Self> {
        Ok(Self {
            trace_parent: Some(TraceParent::new(trace_id, parent_id)?),
            trace_state: TraceState::new(),
        })
    }

    /// Check if the traceparent is present and sampled
    pub fn is_sampled(&self) -> bool {
        self.trace_parent.is_some_and(|tp| tp.is_sampled())
    }

    /// Re-parent this context for the next hop.
    ///
    /// An empty `parent_id` draws a random one. `member`, if given, is moved
    /// to the front of the tracestate; an empty member value is replaced by
    /// the new parent id. Nothing is changed when any input is rejected.
    pub fn mutate(
        &mut self,
        random: &dyn SecureRandomSource,
        parent_id: &str,
        sampling: SamplingBehavior,
        member: Option<TraceStateMember>,
    ) -> TraceContextResult<()> {
        let trace_parent = self
            .trace_parent
            .as_mut()
            .ok_or(TraceContextError::NoTraceParent)?;

        let parent_id = resolve_parent_id(random, parent_id)?;
        let member = member
            .map(|m| default_member_value(m, parent_id))
            .map(|m| m.validate().map(|()| m))
            .transpose()?;

        trace_parent.set_parent(parent_id);
        trace_parent.apply_sampling(sampling);

        if let Some(member) = member {
            self.trace_state.mutate(member)?;
        }
        Ok(())
    }

    /// Write both headers, overwriting existing values.
    ///
    /// An empty tracestate is not written.
    pub fn write_headers<H: HeaderContainer>(&self, headers: &mut H) {
        if let Some(trace_parent) = &self.trace_parent {
            headers.set_header(TraceParent::HEADER, trace_parent.to_header());
        }

        if !self.trace_state.is_empty() {
            headers.set_header(TraceState::HEADER, self.trace_state.to_header());
        }
    }
}

/// Inbound traceparent, classified before any decision is taken
#[derive(Debug)]
enum InboundTraceParent {
    Absent,
    Valid(TraceParent),
    Invalid(TraceContextError),
}

impl InboundTraceParent {
    fn from_headers<H: HeaderContainer>(headers: &H) -> Self {
        match headers
            .get_header(TraceParent::HEADER)
            .filter(|v| !v.is_empty())
        {
            None => Self::Absent,
            Some(value) => match TraceParent::parse(value) {
                Ok(trace_parent) => Self::Valid(trace_parent),
                Err(e) => Self::Invalid(e),
            },
        }
    }
}

/// Extract a trace context from headers.
///
/// Fails when the traceparent is missing or malformed. A malformed
/// tracestate yields an empty list instead of an error.
pub fn parse_trace_context<H: HeaderContainer>(headers: &H) -> TraceContextResult<TraceContext> {
    let trace_parent = TraceParent::parse(headers.get_header(TraceParent::HEADER).unwrap_or(""))?;

    Ok(TraceContext {
        trace_parent: Some(trace_parent),
        trace_state: inbound_trace_state(headers),
    })
}

/// Generate a new trace context with a random trace id.
///
/// An empty `parent_id` is replaced by a random one. Without a member the
/// tracestate is empty; a member with an empty value gets the parent id.
pub fn generate_trace_context(
    random: &dyn SecureRandomSource,
    parent_id: &str,
    member: Option<TraceStateMember>,
    sampling: SamplingBehavior,
) -> TraceContextResult<TraceContext> {
    let parent_id = if parent_id.is_empty() {
        None
    } else {
        Some(ParentId::parse(parent_id)?)
    };

    let mut trace_parent = TraceParent::generate(random, parent_id)?;
    trace_parent.apply_sampling(sampling);

    let trace_state = match member {
        Some(member) => {
            TraceState::with_member(default_member_value(member, trace_parent.parent_id()))?
        },
        None => TraceState::new(),
    };

    Ok(TraceContext {
        trace_parent: Some(trace_parent),
        trace_state,
    })
}

/// Handle the trace context of a request passing through.
///
/// Returns a copy of `headers` in which only `traceparent` and `tracestate`
/// differ, together with the context they were written from. Malformed
/// inbound headers never fail this call; only bad caller input and random
/// source failures do.
pub fn handle_trace_context<H: HeaderContainer>(
    headers: &H,
    random: &dyn SecureRandomSource,
    parent_id: &str,
    member: Option<TraceStateMember>,
    sampling: SamplingBehavior,
) -> TraceContextResult<(H, TraceContext)> {
    let mut new_headers = headers.clone();

    let context = match InboundTraceParent::from_headers(headers) {
        InboundTraceParent::Absent => {
            if headers.get_header(TraceState::HEADER).is_some() {
                debug!("Discarding tracestate received without traceparent");
            }
            generate_trace_context(random, parent_id, member, sampling)?
        },
        InboundTraceParent::Invalid(e) => {
            debug!(error = %e, "Restarting trace after malformed traceparent");
            generate_trace_context(random, parent_id, member, sampling)?
        },
        InboundTraceParent::Valid(trace_parent) => {
            let mut context = TraceContext {
                trace_parent: Some(trace_parent),
                trace_state: inbound_trace_state(headers),
            };
            context.mutate(random, parent_id, sampling, member)?;
            context
        },
    };

    // The outbound tracestate is always ours, never the inbound leftover
    new_headers.delete_header(TraceState::HEADER);
    context.write_headers(&mut new_headers);

    Ok((new_headers, context))
}

fn inbound_trace_state<H: HeaderContainer>(headers: &H) -> TraceState {
    match headers.get_header(TraceState::HEADER) {
        None => TraceState::new(),
        Some(value) => TraceState::parse(value).unwrap_or_else(|e| {
            debug!(error = %e, "Ignoring malformed tracestate");
            TraceState::new()
        }),
    }
}

fn resolve_parent_id(
    random: &dyn SecureRandomSource,
    parent_id: &str,
) -> TraceContextResult<ParentId> {
    if parent_id.is_empty() {
        ParentId::random(random)
    } else {
        ParentId::parse(parent_id)
    }
}

fn default_member_value(mut member: TraceStateMember, parent_id: ParentId) -> TraceStateMember {
    if member.value.is_empty() {
        member.value = parent_id.to_hex();
    }
    member
}
