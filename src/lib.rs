//! # `blockcache`
//!
//! A fixed-size, write-back block cache layered over a single
//! record-oriented backing file.
//!
//! Clients read and write fixed-size records by ordinal index; the cache
//! transparently buffers groups of contiguous records ("blocks") in
//! memory, satisfies repeated accesses without I/O, and defers writes to
//! the file until eviction, periodic synchronization, or an explicit
//! [`Cache::sync`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use blockcache::{Cache, ReplacementPolicy};
//!
//! # fn main() -> blockcache::Result<()> {
//! let mut cache = Cache::create("/tmp/records.dat", 64, 8, 128)?;
//! cache.write(0, &[0xAB; 128])?;
//!
//! let mut record = vec![0u8; 128];
//! cache.read(0, &mut record)?;
//! assert_eq!(record[0], 0xAB);
//!
//! cache.sync()?;
//! cache.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! To select a non-default replacement policy or tune the NUR sweep
//! period, build a [`CacheConfig`] instead of calling [`Cache::create`]
//! directly:
//!
//! ```rust,no_run
//! use blockcache::{Cache, CacheConfig, ReplacementPolicy};
//!
//! # fn main() -> blockcache::Result<()> {
//! let config = CacheConfig::new("/tmp/records.dat", 64, 8, 128)
//!     .with_policy(ReplacementPolicy::Nur)
//!     .with_nderef(150);
//! let cache = Cache::create_with_config(config)?;
//! # let _ = cache;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod block;
pub mod config;
pub mod error;
mod engine;
mod instrumentation;
mod list;
pub mod strategy;

pub use config::CacheConfig;
pub use engine::Cache;
pub use error::{CacheStatus, Error, Result};
pub use instrumentation::Instrument;
pub use strategy::ReplacementPolicy;
