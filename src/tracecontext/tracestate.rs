//! The `tracestate` header (W3C tracestate list)

use super::error::{TraceContextError, TraceContextResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const KEY_FORMAT: &str = r"[a-z0-9][a-z0-9_\-*/@]{0,255}";
const VALUE_FORMAT: &str =
    r"[\x20-\x2b\x2d-\x3c\x3e-\x7e]{0,255}[\x21-\x2b\x2d-\x3c\x3e-\x7e]";

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{KEY_FORMAT}$")).unwrap());

static VALUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{VALUE_FORMAT}$")).unwrap());

/// Single `key=value` entry of a tracestate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStateMember {
    /// Vendor key
    pub key: String,

    /// Opaque vendor value
    pub value: String,
}

impl TraceStateMember {
    /// Create a member without validating it
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Check key and value against the tracestate grammar
    pub fn validate(&self) -> TraceContextResult<()> {
        validate_key(&self.key)?;
        validate_value(&self.value)
    }
}

impl fmt::Display for TraceStateMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Check a key against the tracestate key grammar
pub fn validate_key(key: &str) -> TraceContextResult<()> {
    if KEY_PATTERN.is_match(key) {
        Ok(())
    } else {
        Err(TraceContextError::InvalidKey(key.to_string()))
    }
}

/// Check a value against the tracestate value grammar
pub fn validate_value(value: &str) -> TraceContextResult<()> {
    if VALUE_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(TraceContextError::InvalidValue(value.to_string()))
    }
}

/// Ordered vendor list carried by the `tracestate` header.
///
/// The leftmost member is the most recently updated one. Parsing keeps the
/// list as received, duplicates included; [`TraceState::mutate`] is what
/// enforces unique keys and the 32 member cap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TraceState {
    members: Vec<TraceStateMember>,
}

impl TraceState {
    /// Maximum members kept after a mutation
    pub const MAX_MEMBERS: usize = 32;

    /// Header name
    pub const HEADER: &'static str = "tracestate";

    /// Create a new empty trace state
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Create a trace state holding a single member
    pub fn with_member(member: TraceStateMember) -> TraceContextResult<Self> {
        let mut state = Self::new();
        state.mutate(member)?;
        Ok(state)
    }

    /// Parse a header value.
    ///
    /// Spaces and tabs around members, keys and values are stripped. Empty
    /// and blank list entries are skipped. One malformed member fails the
    /// whole list.
    pub fn parse(header: &str) -> TraceContextResult<Self> {
        let mut members = Vec::new();

        for candidate in header.split(',') {
            let candidate = trim_ows(candidate);
            if candidate.is_empty() {
                continue;
            }

            let member = candidate
                .split_once('=')
                .map(|(key, value)| TraceStateMember::new(trim_ows(key), trim_ows(value)))
                .filter(|member| member.validate().is_ok())
                .ok_or_else(|| TraceContextError::MalformedTraceState(candidate.to_string()))?;
            members.push(member);
        }

        Ok(Self { members })
    }

    /// Insert or update a member, moving it to the front.
    ///
    /// Fails without touching the list when the member is invalid. Any
    /// existing entries with the same key are removed first, and the list is
    /// cut back to [`Self::MAX_MEMBERS`] from the right.
    pub fn mutate(&mut self, member: TraceStateMember) -> TraceContextResult<()> {
        member.validate()?;

        self.members.retain(|m| m.key != member.key);
        self.members.insert(0, member);
        self.members.truncate(Self::MAX_MEMBERS);

        Ok(())
    }

    /// Get the value of the first member with this key
    pub fn member_value(&self, key: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.value.as_str())
    }

    /// Members in list order
    pub fn members(&self) -> &[TraceStateMember] {
        &self.members
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Get number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Iterate over `(key, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.members
            .iter()
            .map(|m| (m.key.as_str(), m.value.as_str()))
    }

    /// Convert to header value
    pub fn to_header(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TraceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{member}")?;
        }
        Ok(())
    }
}

impl FromStr for TraceState {
    type Err = TraceContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TraceState {
    type Error = TraceContextError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TraceState> for String {
    fn from(state: TraceState) -> Self {
        state.to_header()
    }
}

/// Strip optional whitespace (space and tab only)
fn trim_ows(s: &str) -> &str {
    s.trim_matches([' ', '\t'])
}
