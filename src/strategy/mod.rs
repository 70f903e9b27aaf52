//! The pluggable replacement-strategy contract (§4.2) plus three concrete
//! strategies: FIFO, LRU, NUR.
//!
//! The C reference models a strategy as a `void *pstrategy` blob mutated by
//! free functions. Per the design notes (§9, "void-pointer strategy
//! state"), this is reworked as a small trait with one implementation per
//! strategy; the engine owns the trait object opaquely and never inspects
//! its state.

mod fifo;
mod lru;
mod nur;

use crate::block::BlockHeader;
use crate::instrumentation::Instrument;

use fifo::Fifo;
use lru::Lru;
use nur::Nur;

/// Selects which concrete [`Strategy`] a [`crate::Cache`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// First-in, first-out: victim is the oldest placement.
    Fifo,
    /// Least-recently-used: victim is the least recently read/written block.
    #[default]
    Lru,
    /// Not-Used-Recently: victim minimizes `2*R + M` with periodic R sweeps.
    Nur,
}

/// The replacement-strategy contract (§4.2).
///
/// A strategy never owns block headers or their buffers (only opaque
/// bookkeeping over `ibcache` slot indices). `replace_block` must return an
/// index into `headers` whenever `headers` is non-empty; `None` signals the
/// invariant violation case (an empty header table), which the engine turns
/// into [`crate::Error::StrategyInvariant`].
pub(crate) trait Strategy: std::fmt::Debug {
    /// Human-readable identifier.
    fn name(&self) -> &'static str;

    /// Resets strategy bookkeeping; called after the engine drops validity
    /// from every header. Takes `&mut` headers because NUR clears every
    /// `R` bit as part of its reset.
    fn invalidate(&mut self, headers: &mut [BlockHeader], instrument: &mut Instrument);

    /// Returns the slot index of the header into which a fresh file block
    /// will be loaded, or `None` if `headers` is empty.
    fn replace_block(&mut self, headers: &[BlockHeader]) -> Option<usize>;

    /// Called by the engine after a successful read of `headers[ibcache]`.
    fn on_read(&mut self, headers: &mut [BlockHeader], ibcache: usize, instrument: &mut Instrument);

    /// Called by the engine after a successful write to `headers[ibcache]`.
    fn on_write(&mut self, headers: &mut [BlockHeader], ibcache: usize, instrument: &mut Instrument);
}

/// Returns the first non-valid header's slot index, preferring cold
/// capacity over eviction (§4.2 "required behaviour").
pub(crate) fn first_free(headers: &[BlockHeader]) -> Option<usize> {
    headers.iter().position(|h| !h.is_valid())
}

/// Builds the concrete strategy for `policy`, sized for `nblocks` slots and
/// (for NUR) the configured sweep period.
pub(crate) fn build(policy: ReplacementPolicy, nblocks: usize, nderef: usize) -> Box<dyn Strategy> {
    match policy {
        ReplacementPolicy::Fifo => Box::new(Fifo::new(nblocks)),
        ReplacementPolicy::Lru => Box::new(Lru::new(nblocks)),
        ReplacementPolicy::Nur => Box::new(Nur::new(nderef)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_free_finds_non_valid_slot() {
        let mut headers = vec![BlockHeader::new(0, 1), BlockHeader::new(1, 1)];
        headers[0].set_valid();
        assert_eq!(first_free(&headers), Some(1));
    }

    #[test]
    fn first_free_none_when_all_valid() {
        let mut headers = vec![BlockHeader::new(0, 1)];
        headers[0].set_valid();
        assert_eq!(first_free(&headers), None);
    }
}
