//! The `traceparent` header
//!
//! Format: `{version}-{trace-id}-{parent-id}-{trace-flags}`, e.g.
//! `00-0af7651916cd43dd8448eb211c80319c-00f067aa0ba902b7-01`.
//!
//! Parsing runs in two stages. The strict grammar of the current version is
//! tried first. If it fails and the header announces a higher version, the
//! looser future-version grammar is applied: only the known prefix is
//! checked and anything after the flags is dropped. Either way the stored
//! version never exceeds [`TraceParent::HIGHEST_SUPPORTED_VERSION`].

use super::error::{TraceContextError, TraceContextResult};
use super::id::{ParentId, TraceId};
use super::random::SecureRandomSource;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static TRACEPARENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-f]{2})-([0-9a-f]{32})-([0-9a-f]{16})-([0-9a-f]{2})$").unwrap()
});

/// Length of a version 00 traceparent
const TRACEPARENT_LEN: usize = 55;

/// Trace flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceFlags(u8);

impl TraceFlags {
    /// No flags set
    pub const NONE: Self = Self(0);

    /// Sampled flag
    pub const SAMPLED: Self = Self(0x01);

    /// Create new trace flags
    pub fn new(flags: u8) -> Self {
        Self(flags)
    }

    /// Check if sampled flag is set
    pub fn is_sampled(&self) -> bool {
        (self.0 & Self::SAMPLED.0) != 0
    }

    /// Set the sampled flag
    pub fn set_sampled(&mut self, sampled: bool) {
        if sampled {
            self.0 |= Self::SAMPLED.0;
        } else {
            self.0 &= !Self::SAMPLED.0;
        }
    }

    /// Get the raw flags value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Convert to hex string (2 chars)
    pub fn to_hex(&self) -> String {
        format!("{:02x}", self.0)
    }

    /// Parse from a 2-character lowercase hex string
    pub fn from_hex(hex: &str) -> Option<Self> {
        parse_hex_byte(hex).map(Self)
    }
}

/// How the outbound sampled flag is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingBehavior {
    /// Keep whatever the flags already say
    #[default]
    PassThrough,

    /// Force the sampled flag on
    AlwaysSampled,

    /// Force the sampled flag off
    NeverSampled,
}

impl SamplingBehavior {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pass_through" | "passthrough" | "parent" => Some(Self::PassThrough),
            "always_sampled" | "alwayssampled" | "always" => Some(Self::AlwaysSampled),
            "never_sampled" | "neversampled" | "never" => Some(Self::NeverSampled),
            _ => None,
        }
    }
}

/// Parsed `traceparent` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceParent {
    version: u8,
    trace_id: TraceId,
    parent_id: ParentId,
    flags: TraceFlags,
}

impl TraceParent {
    /// Highest version this crate understands
    pub const HIGHEST_SUPPORTED_VERSION: u8 = 0x00;

    /// Version that is never valid
    pub const RESERVED_VERSION: u8 = 0xff;

    /// Header name
    pub const HEADER: &'static str = "traceparent";

    /// Build an unsampled traceparent from identifiers held as hex strings
    pub fn new(trace_id: &str, parent_id: &str) -> TraceContextResult<Self> {
        Ok(Self::from_ids(
            TraceId::parse(trace_id)?,
            ParentId::parse(parent_id)?,
        ))
    }

    /// Build an unsampled traceparent from validated identifiers
    pub fn from_ids(trace_id: TraceId, parent_id: ParentId) -> Self {
        Self {
            version: Self::HIGHEST_SUPPORTED_VERSION,
            trace_id,
            parent_id,
            flags: TraceFlags::NONE,
        }
    }

    /// Generate a traceparent with a random trace id.
    ///
    /// The parent id is drawn as well unless one is supplied.
    pub fn generate(
        source: &dyn SecureRandomSource,
        parent_id: Option<ParentId>,
    ) -> TraceContextResult<Self> {
        let trace_id = TraceId::random(source)?;
        let parent_id = match parent_id {
            Some(id) => id,
            None => ParentId::random(source)?,
        };
        Ok(Self::from_ids(trace_id, parent_id))
    }

    /// Parse a header value
    pub fn parse(s: &str) -> TraceContextResult<Self> {
        if let Some(caps) = TRACEPARENT_PATTERN.captures(s) {
            let version = parse_hex_byte(&caps[1])
                .ok_or_else(|| TraceContextError::MalformedTraceParent(s.to_string()))?;
            return Self::from_fields(version, &caps[2], &caps[3], &caps[4]);
        }

        match s.get(0..2).and_then(parse_hex_byte) {
            Some(version) if version > Self::HIGHEST_SUPPORTED_VERSION => {
                Self::parse_future(version, s)
            },
            _ => Err(TraceContextError::MalformedTraceParent(s.to_string())),
        }
    }

    /// Future-version grammar: the version 00 prefix, then end of input or `-`.
    fn parse_future(version: u8, s: &str) -> TraceContextResult<Self> {
        if version == Self::RESERVED_VERSION {
            return Err(TraceContextError::ReservedVersion);
        }

        let malformed = |reason: &str| TraceContextError::MalformedFutureVersion {
            version,
            reason: reason.to_string(),
        };

        let bytes = s.as_bytes();
        if bytes.len() < TRACEPARENT_LEN {
            return Err(malformed("shorter than 55 characters"));
        }
        if bytes[2] != b'-' {
            return Err(malformed("version not followed by '-'"));
        }
        if !is_lower_hex(&bytes[3..35]) {
            return Err(malformed("trace id is not lowercase hex"));
        }
        if bytes[35] != b'-' {
            return Err(malformed("trace id not followed by '-'"));
        }
        if !is_lower_hex(&bytes[36..52]) {
            return Err(malformed("parent id is not lowercase hex"));
        }
        if bytes[52] != b'-' {
            return Err(malformed("parent id not followed by '-'"));
        }
        if !is_lower_hex(&bytes[53..55]) {
            return Err(malformed("flags are not lowercase hex"));
        }
        if bytes.len() > TRACEPARENT_LEN && bytes[TRACEPARENT_LEN] != b'-' {
            return Err(malformed("flags not followed by end of value or '-'"));
        }

        // Everything up to index 55 is ASCII, so these slices fall on char boundaries
        Self::from_fields(version, &s[3..35], &s[36..52], &s[53..55])
    }

    fn from_fields(
        version: u8,
        trace_id: &str,
        parent_id: &str,
        flags: &str,
    ) -> TraceContextResult<Self> {
        if version == Self::RESERVED_VERSION {
            return Err(TraceContextError::ReservedVersion);
        }

        let flags = TraceFlags::from_hex(flags)
            .ok_or_else(|| TraceContextError::MalformedTraceParent(format!("flags {flags:?}")))?;

        Ok(Self {
            version: version.min(Self::HIGHEST_SUPPORTED_VERSION),
            trace_id: TraceId::parse(trace_id)?,
            parent_id: ParentId::parse(parent_id)?,
            flags,
        })
    }

    /// Get the version
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Get the trace id
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Get the parent id
    pub fn parent_id(&self) -> ParentId {
        self.parent_id
    }

    /// Get the trace flags
    pub fn flags(&self) -> TraceFlags {
        self.flags
    }

    /// Check if the sampled flag is set
    pub fn is_sampled(&self) -> bool {
        self.flags.is_sampled()
    }

    /// Set or clear the sampled flag
    pub fn set_sampled(&mut self, sampled: bool) {
        self.flags.set_sampled(sampled);
    }

    /// Replace the parent id with a hex string, validating it first
    pub fn set_parent_id(&mut self, parent_id: &str) -> TraceContextResult<()> {
        self.parent_id = ParentId::parse(parent_id)?;
        Ok(())
    }

    /// Replace the parent id with an already validated one
    pub fn set_parent(&mut self, parent_id: ParentId) {
        self.parent_id = parent_id;
    }

    /// Apply a sampling behavior to the flags
    pub fn apply_sampling(&mut self, sampling: SamplingBehavior) {
        match sampling {
            SamplingBehavior::PassThrough => {},
            SamplingBehavior::AlwaysSampled => self.set_sampled(true),
            SamplingBehavior::NeverSampled => self.set_sampled(false),
        }
    }

    /// Convert to header value
    pub fn to_header(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TraceParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}-{}-{}-{}",
            self.version,
            self.trace_id,
            self.parent_id,
            self.flags.to_hex()
        )
    }
}

impl FromStr for TraceParent {
    type Err = TraceContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_lower_hex(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn parse_hex_byte(s: &str) -> Option<u8> {
    if s.len() != 2 || !is_lower_hex(s.as_bytes()) {
        return None;
    }
    u8::from_str_radix(s, 16).ok()
}
