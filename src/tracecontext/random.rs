//! Secure random byte sources used to mint identifiers

use super::error::{TraceContextError, TraceContextResult};

/// Source of cryptographically unpredictable bytes.
///
/// Implementations must be safe to share between requests. Failures are
/// reported as [`TraceContextError::RandomSource`] and never retried here.
pub trait SecureRandomSource: Send + Sync {
    /// Fill `dest` completely with random bytes
    fn fill_bytes(&self, dest: &mut [u8]) -> TraceContextResult<()>;
}

/// Random source backed by the operating system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomSource;

impl OsRandomSource {
    /// Create a new OS random source
    pub fn new() -> Self {
        Self
    }
}

impl SecureRandomSource for OsRandomSource {
    fn fill_bytes(&self, dest: &mut [u8]) -> TraceContextResult<()> {
        getrandom::getrandom(dest).map_err(|e| TraceContextError::RandomSource(e.to_string()))
    }
}
