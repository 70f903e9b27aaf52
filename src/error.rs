//! Error types for `blockcache`.
//!
//! This module provides a unified error type for all cache operations,
//! plus a `CacheStatus` conversion for callers that want the spec-level
//! two-valued `CACHE_OK`/`CACHE_KO` contract.

use thiserror::Error;

/// Result type alias for `blockcache` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `blockcache` operations.
///
/// Each variant carries a stable code of the form `BC-XXX` for easy
/// debugging and log correlation.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from open/seek/read/write/close (BC-001).
    #[error("[BC-001] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One of `nblocks`, `nrecords`, `recordsz` was zero (BC-002).
    #[error("[BC-002] Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A replacement strategy returned no victim while `nblocks >= 1` (BC-003).
    ///
    /// This is a programming error per the strategy contract, which must
    /// always return a header. It is asserted against in debug builds and
    /// surfaced here in release builds instead of panicking the host
    /// process.
    #[error("[BC-003] Strategy invariant violated: {0}")]
    StrategyInvariant(String),

    /// Configuration loading/parsing error (BC-004).
    #[error("[BC-004] Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the stable error code (e.g. "BC-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "BC-001",
            Self::InvalidConfig(_) => "BC-002",
            Self::StrategyInvariant(_) => "BC-003",
            Self::Config(_) => "BC-004",
        }
    }
}

/// The spec-level two-valued operation outcome (§6, §7 of the design doc).
///
/// All public cache operations besides `Cache::create` return one of these;
/// `Create` itself returns `Result<Cache>` (handle or error) as the richer
/// Rust equivalent of "handle or null".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// `CACHE_OK` (0).
    Ok,
    /// `CACHE_KO` (non-zero).
    Ko,
}

impl<T> From<&Result<T>> for CacheStatus {
    fn from(result: &Result<T>) -> Self {
        if result.is_ok() {
            Self::Ok
        } else {
            Self::Ko
        }
    }
}

impl From<Error> for CacheStatus {
    fn from(_: Error) -> Self {
        Self::Ko
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_stable() {
        let err = Error::InvalidConfig("nblocks must be >= 1".to_string());
        assert_eq!(err.code(), "BC-002");
    }

    #[test]
    fn status_from_result() {
        let ok: Result<()> = Ok(());
        let ko: Result<()> = Err(Error::InvalidConfig("x".to_string()));
        assert_eq!(CacheStatus::from(&ok), CacheStatus::Ok);
        assert_eq!(CacheStatus::from(&ko), CacheStatus::Ko);
    }
}
