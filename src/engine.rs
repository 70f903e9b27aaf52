//! The cache engine (§4.3): create/close/invalidate/read/write/sync,
//! `Get_Block`, physical I/O, the periodic-sync gate, and instrumentation.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::block::BlockHeader;
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::instrumentation::Instrument;
use crate::strategy::{self, ReplacementPolicy, Strategy};

/// A fixed-size, write-back block cache over a single record-oriented file.
///
/// Not re-entrant: the caller must serialize all operations on a given
/// handle (§5). Multiple `Cache` instances over disjoint files are
/// independent (there is no process-wide shared state).
pub struct Cache {
    path: PathBuf,
    file: File,
    nblocks: usize,
    nrecords: usize,
    recordsz: usize,
    blocksz: usize,
    headers: Vec<BlockHeader>,
    strategy: Box<dyn Strategy>,
    instrument: Instrument,
    nsync: usize,
    sync_countdown: usize,
}

impl Cache {
    /// Opens (creating if absent) `path` as the backing file and allocates
    /// `nblocks` cache slots of `nrecords * recordsz` bytes each, using the
    /// default replacement policy (LRU) and no NUR sweeping.
    ///
    /// # Errors
    ///
    /// Returns an error if any dimension is zero or if the file cannot be
    /// opened.
    pub fn create(path: impl AsRef<Path>, nblocks: usize, nrecords: usize, recordsz: usize) -> Result<Self> {
        Self::create_with_config(CacheConfig::new(path.as_ref(), nblocks, nrecords, recordsz))
    }

    /// Opens a cache from a fully specified [`CacheConfig`] (policy, NUR
    /// sweep period, periodic-sync period included).
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation or the file cannot
    /// be opened.
    pub fn create_with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&config.path)?;

        let blocksz = config.blocksz();
        let headers = (0..config.nblocks)
            .map(|ibcache| BlockHeader::new(ibcache, blocksz))
            .collect();
        let strategy = strategy::build(config.policy, config.nblocks, config.nderef);

        debug!(
            path = %config.path.display(),
            nblocks = config.nblocks,
            nrecords = config.nrecords,
            recordsz = config.recordsz,
            policy = strategy.name(),
            "cache created"
        );

        Ok(Self {
            path: config.path,
            file,
            nblocks: config.nblocks,
            nrecords: config.nrecords,
            recordsz: config.recordsz,
            blocksz,
            headers,
            strategy,
            instrument: Instrument::default(),
            nsync: config.nsync,
            sync_countdown: config.nsync,
        })
    }

    /// The path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The name of the active replacement policy.
    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Closes the cache: syncs, then releases all resources.
    ///
    /// The file handle, header table, and block buffers are dropped
    /// regardless of whether `sync` succeeds, matching the spec's "all
    /// resources are released on Close regardless of prior errors" (§5).
    ///
    /// # Errors
    ///
    /// Returns an error if the final sync fails. All resources are still
    /// released.
    pub fn close(mut self) -> Result<()> {
        debug!(path = %self.path.display(), "closing cache");
        self.sync()
    }

    /// Invalidates the cache: syncs, clears `VALID` on every header, and
    /// resets strategy bookkeeping (§4.3 "Invalidate").
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    pub fn invalidate(&mut self) -> Result<()> {
        self.sync()?;
        self.headers.iter_mut().for_each(BlockHeader::reset);
        self.strategy.invalidate(&mut self.headers, &mut self.instrument);
        debug!(path = %self.path.display(), "cache invalidated");
        Ok(())
    }

    /// Reads record `i` into `out`. `out` must be at least `recordsz` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing block cannot be loaded, or if the
    /// periodic sync triggered by this operation fails.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() < recordsz`.
    pub fn read(&mut self, i: usize, out: &mut [u8]) -> Result<()> {
        assert!(out.len() >= self.recordsz, "out buffer shorter than recordsz");
        self.instrument.reads();

        let ibcache = self.get_block(i)?;
        let offset = (i % self.nrecords) * self.recordsz;
        out[..self.recordsz].copy_from_slice(&self.headers[ibcache].data[offset..offset + self.recordsz]);

        self.strategy.on_read(&mut self.headers, ibcache, &mut self.instrument);
        self.periodic_sync_gate()
    }

    /// Writes `in_buf` into record `i`. `in_buf` must be at least
    /// `recordsz` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing block cannot be loaded, or if the
    /// periodic sync triggered by this operation fails.
    ///
    /// # Panics
    ///
    /// Panics if `in_buf.len() < recordsz`.
    pub fn write(&mut self, i: usize, in_buf: &[u8]) -> Result<()> {
        assert!(in_buf.len() >= self.recordsz, "in_buf shorter than recordsz");
        self.instrument.writes();

        let ibcache = self.get_block(i)?;
        let offset = (i % self.nrecords) * self.recordsz;
        self.headers[ibcache].data[offset..offset + self.recordsz].copy_from_slice(&in_buf[..self.recordsz]);
        self.headers[ibcache].set_dirty();

        self.strategy.on_write(&mut self.headers, ibcache, &mut self.instrument);
        self.periodic_sync_gate()
    }

    /// Writes back every valid+dirty header to the backing file.
    ///
    /// Failures are not rolled back: a failing sync leaves remaining dirty
    /// blocks dirty, to be retried on the next sync (§4.3 "Sync").
    ///
    /// # Errors
    ///
    /// Returns an error on the first I/O failure encountered.
    pub fn sync(&mut self) -> Result<()> {
        for ibcache in 0..self.headers.len() {
            let needs_writeback = self.headers[ibcache].is_valid() && self.headers[ibcache].is_dirty();
            if needs_writeback {
                self.write_block(ibcache)?;
            }
        }
        self.instrument.syncs();
        trace!(path = %self.path.display(), "sync complete");
        Ok(())
    }

    /// Returns a snapshot of the five instrumentation counters, zeroing
    /// them atomically with respect to other engine operations (§4.3
    /// "Instrumentation accessor").
    pub fn get_instrument(&mut self) -> Instrument {
        let snapshot = self.instrument.snapshot_and_reset();
        info!(
            n_reads = snapshot.n_reads,
            n_writes = snapshot.n_writes,
            n_hits = snapshot.n_hits,
            n_syncs = snapshot.n_syncs,
            n_deref = snapshot.n_deref,
            "instrumentation snapshot"
        );
        snapshot
    }

    /// Resolves the slot index holding file-block `i / nrecords`, loading
    /// it on a miss (§4.3 "Get_Block").
    fn get_block(&mut self, i: usize) -> Result<usize> {
        let ibfile = i / self.nrecords;

        if let Some(ibcache) = self.find_block(ibfile) {
            trace!(ibfile, ibcache, "block resolved on hit");
            return Ok(ibcache);
        }

        let victim = self.strategy.replace_block(&self.headers);
        debug_assert!(victim.is_some(), "strategy returned no victim for a non-empty header table");
        let victim = victim.ok_or_else(|| {
            Error::StrategyInvariant("replacement strategy returned no victim".to_string())
        })?;

        if self.headers[victim].is_valid() && self.headers[victim].is_dirty() {
            self.write_block(victim)?;
        }

        self.headers[victim].reset();
        self.headers[victim].ibfile = ibfile;
        self.read_block(victim)?;

        trace!(ibfile, ibcache = victim, "block loaded on miss");
        Ok(victim)
    }

    /// Linear scan for the unique valid header mirroring file-block
    /// `ibfile`; increments `n_hits` on hit (§4.3 "Get_Block" step 1).
    fn find_block(&mut self, ibfile: usize) -> Option<usize> {
        let found = self
            .headers
            .iter()
            .position(|h| h.is_valid() && h.ibfile == ibfile);
        if found.is_some() {
            self.instrument.hits();
        }
        found
    }

    /// Writes `headers[ibcache]`'s buffer to its file-block offset and
    /// clears `MODIF` on success (§4.3 "Sync", "Write_Block").
    fn write_block(&mut self, ibcache: usize) -> Result<()> {
        let offset = (self.headers[ibcache].ibfile * self.blocksz) as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        let result = self.file.write_all(&self.headers[ibcache].data);
        if let Err(err) = &result {
            warn!(ibcache, %err, "block write-back failed");
        }
        result?;
        self.headers[ibcache].flags &= !crate::block::MODIF;
        Ok(())
    }

    /// Loads `headers[ibcache].ibfile` from disk, or zero-fills it when
    /// the block's start offset is at or past EOF (§4.3 "Read_Block", §6).
    fn read_block(&mut self, ibcache: usize) -> Result<()> {
        let eof = self.file.seek(SeekFrom::End(0))?;
        let offset = (self.headers[ibcache].ibfile * self.blocksz) as u64;

        if offset >= eof {
            self.headers[ibcache].data.iter_mut().for_each(|b| *b = 0);
        } else {
            self.file.seek(SeekFrom::Start(offset))?;
            let result = self.file.read_exact(&mut self.headers[ibcache].data);
            if let Err(err) = &result {
                warn!(ibcache, %err, "block read failed");
            }
            result?;
        }

        self.headers[ibcache].set_valid();
        Ok(())
    }

    /// Decrements the periodic-sync counter; runs `sync` and resets the
    /// counter to `nsync` when it reaches zero (§4.3 "Periodic-sync gate").
    fn periodic_sync_gate(&mut self) -> Result<()> {
        self.sync_countdown -= 1;
        if self.sync_countdown == 0 {
            self.sync_countdown = self.nsync;
            return self.sync();
        }
        Ok(())
    }
}
