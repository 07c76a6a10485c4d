//! Trace and parent identifiers
//!
//! Both identifiers travel as fixed-width lowercase hex and are never all
//! zero. Parsing is strict: uppercase digits, signs and wrong lengths are
//! rejected before any numeric conversion happens.

use super::error::{TraceContextError, TraceContextResult};
use super::random::SecureRandomSource;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static TRACE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{32}$").unwrap());

static PARENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{16}$").unwrap());

/// 128-bit trace identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Length of the hex representation
    pub const HEX_LEN: usize = 32;

    /// Validate a 32-character lowercase hex trace id
    pub fn parse(hex: &str) -> TraceContextResult<Self> {
        if !TRACE_ID_PATTERN.is_match(hex) {
            return Err(TraceContextError::InvalidIdFormat {
                kind: "trace id",
                value: hex.to_string(),
            });
        }

        let id = u128::from_str_radix(hex, 16).map_err(|_| TraceContextError::InvalidIdFormat {
            kind: "trace id",
            value: hex.to_string(),
        })?;

        Self::from_u128(id)
    }

    /// Build from a raw value, rejecting zero
    pub fn from_u128(id: u128) -> TraceContextResult<Self> {
        if id == 0 {
            return Err(TraceContextError::AllZeroId("trace id"));
        }
        Ok(Self(id))
    }

    /// Build from big-endian bytes, rejecting all zeros
    pub fn from_bytes(bytes: [u8; 16]) -> TraceContextResult<Self> {
        Self::from_u128(u128::from_be_bytes(bytes))
    }

    /// Draw a fresh trace id from the random source
    pub fn random(source: &dyn SecureRandomSource) -> TraceContextResult<Self> {
        let mut bytes = [0u8; 16];
        source.fill_bytes(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Get the raw value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Convert to bytes (big-endian)
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Convert to hex string (32 characters)
    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }
}

impl FromStr for TraceId {
    type Err = TraceContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self.to_hex())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// 64-bit parent (span) identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentId(u64);

impl ParentId {
    /// Length of the hex representation
    pub const HEX_LEN: usize = 16;

    /// Validate a 16-character lowercase hex parent id
    pub fn parse(hex: &str) -> TraceContextResult<Self> {
        if !PARENT_ID_PATTERN.is_match(hex) {
            return Err(TraceContextError::InvalidIdFormat {
                kind: "parent id",
                value: hex.to_string(),
            });
        }

        let id = u64::from_str_radix(hex, 16).map_err(|_| TraceContextError::InvalidIdFormat {
            kind: "parent id",
            value: hex.to_string(),
        })?;

        Self::from_u64(id)
    }

    /// Build from a raw value, rejecting zero
    pub fn from_u64(id: u64) -> TraceContextResult<Self> {
        if id == 0 {
            return Err(TraceContextError::AllZeroId("parent id"));
        }
        Ok(Self(id))
    }

    /// Build from big-endian bytes, rejecting all zeros
    pub fn from_bytes(bytes: [u8; 8]) -> TraceContextResult<Self> {
        Self::from_u64(u64::from_be_bytes(bytes))
    }

    /// Draw a fresh parent id from the random source
    pub fn random(source: &dyn SecureRandomSource) -> TraceContextResult<Self> {
        let mut bytes = [0u8; 8];
        source.fill_bytes(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Convert to bytes (big-endian)
    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Convert to hex string (16 characters)
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl FromStr for ParentId {
    type Err = TraceContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParentId({})", self.to_hex())
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
