//! `blockcache` configuration module.
//!
//! Provides configuration via an explicit `CacheConfig` builder (the five
//! `Create` parameters plus the periodic-sync period and the replacement
//! policy), or, for host applications that want file/env-driven
//! configuration, via a `blockcache.toml` file and `BLOCKCACHE_*`
//! environment variables.
//!
//! # Priority (highest to lowest)
//!
//! 1. Explicit values passed to [`CacheConfig`] setters.
//! 2. Environment variables (`BLOCKCACHE_*`).
//! 3. Configuration file (`blockcache.toml`).
//! 4. Default values.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::strategy::ReplacementPolicy;

/// Configuration for a single cache instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Path to the backing record file.
    pub path: PathBuf,
    /// Number of cache slots (block headers).
    pub nblocks: usize,
    /// Records per block.
    pub nrecords: usize,
    /// Bytes per record.
    pub recordsz: usize,
    /// NUR sweep period; `0` disables the sweep (ignored by FIFO/LRU).
    pub nderef: usize,
    /// Periodic-sync period: a `Sync` runs every `nsync` reads+writes.
    /// Must be `>= 1`; `1` means "sync after every operation".
    pub nsync: usize,
    /// Replacement strategy to use.
    pub policy: ReplacementPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./blockcache.dat"),
            nblocks: 16,
            nrecords: 8,
            recordsz: 64,
            nderef: 0,
            nsync: 1,
            policy: ReplacementPolicy::Lru,
        }
    }
}

impl CacheConfig {
    /// Creates a config with the mandatory `Create` parameters and the
    /// remaining fields at their defaults (`nderef = 0`, `nsync = 1`,
    /// `policy = Lru`).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, nblocks: usize, nrecords: usize, recordsz: usize) -> Self {
        Self {
            path: path.into(),
            nblocks,
            nrecords,
            recordsz,
            ..Self::default()
        }
    }

    /// Sets the NUR sweep period.
    #[must_use]
    pub fn with_nderef(mut self, nderef: usize) -> Self {
        self.nderef = nderef;
        self
    }

    /// Sets the periodic-sync period.
    #[must_use]
    pub fn with_nsync(mut self, nsync: usize) -> Self {
        self.nsync = nsync;
        self
    }

    /// Sets the replacement policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Loads configuration layering a `blockcache.toml` file (if present)
    /// and `BLOCKCACHE_*` environment variables over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but fails to parse, or if the
    /// merged configuration fails [`CacheConfig::validate`].
    pub fn load(toml_path: impl AsRef<Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        let toml_path = toml_path.as_ref();
        if toml_path.exists() {
            figment = figment.merge(Toml::file(toml_path));
        }
        let config: Self = figment
            .merge(Env::prefixed("BLOCKCACHE_"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates that every dimension is non-zero and `nsync >= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first violated field.
    pub fn validate(&self) -> Result<()> {
        if self.nblocks == 0 {
            return Err(Error::InvalidConfig("nblocks must be >= 1".to_string()));
        }
        if self.nrecords == 0 {
            return Err(Error::InvalidConfig("nrecords must be >= 1".to_string()));
        }
        if self.recordsz == 0 {
            return Err(Error::InvalidConfig("recordsz must be >= 1".to_string()));
        }
        if self.nsync == 0 {
            return Err(Error::InvalidConfig("nsync must be >= 1".to_string()));
        }
        Ok(())
    }

    /// The derived block size in bytes (`nrecords * recordsz`).
    #[must_use]
    pub fn blocksz(&self) -> usize {
        self.nrecords * self.recordsz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(CacheConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_dimensions() {
        let cfg = CacheConfig::new("/tmp/x", 0, 1, 1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn blocksz_is_derived() {
        let cfg = CacheConfig::new("/tmp/x", 4, 8, 16);
        assert_eq!(cfg.blocksz(), 128);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let cfg = CacheConfig::load("/nonexistent/blockcache.toml").unwrap();
        assert_eq!(cfg.nblocks, CacheConfig::default().nblocks);
    }
}
