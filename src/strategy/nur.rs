//! NUR (Not Used Recently) replacement strategy (§4.2.3).

use super::{first_free, Strategy};
use crate::block::BlockHeader;
use crate::instrumentation::Instrument;

/// Not-Used-Recently: no block list. State is just the sweep period and a
/// countdown to the next sweep.
///
/// Victim selection minimizes `2*R + M` over all headers, ties broken by
/// lowest `ibcache` (§4.2.3). The sweep gate runs *before* the accessed
/// header's `R` bit is set, so a block just accessed cannot be swept on
/// the same operation (§9, "NUR's precise point to call the sweep gate").
#[derive(Debug)]
pub(crate) struct Nur {
    nderef: usize,
    countdown: usize,
}

impl Nur {
    pub(crate) fn new(nderef: usize) -> Self {
        Self {
            nderef,
            countdown: nderef,
        }
    }

    /// Decrements the countdown; if it reaches zero and sweeping is
    /// enabled, clears `R` on every header, resets the countdown, and
    /// increments `n_deref`. A `nderef == 0` disables the sweep entirely.
    fn sweep_gate(&mut self, headers: &mut [BlockHeader], instrument: &mut Instrument) {
        if self.nderef == 0 {
            return;
        }
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            headers.iter_mut().for_each(BlockHeader::clear_referenced);
            self.countdown = self.nderef;
            instrument.derefs();
        }
    }
}

impl Strategy for Nur {
    fn name(&self) -> &'static str {
        "NUR"
    }

    fn invalidate(&mut self, headers: &mut [BlockHeader], instrument: &mut Instrument) {
        // Schedule an immediate sweep so a post-invalidation cache starts
        // with all R bits clear (§4.2.3 "invalidate").
        self.countdown = 1;
        self.sweep_gate(headers, instrument);
    }

    fn replace_block(&mut self, headers: &[BlockHeader]) -> Option<usize> {
        if let Some(ibcache) = first_free(headers) {
            return Some(ibcache);
        }

        let mut best: Option<(usize, u8)> = None;
        for (ibcache, header) in headers.iter().enumerate() {
            let k = header.nur_equation();
            if k == 0 {
                return Some(ibcache);
            }
            match best {
                Some((_, best_k)) if k >= best_k => {}
                _ => best = Some((ibcache, k)),
            }
        }
        best.map(|(ibcache, _)| ibcache)
    }

    fn on_read(&mut self, headers: &mut [BlockHeader], ibcache: usize, instrument: &mut Instrument) {
        self.sweep_gate(headers, instrument);
        headers[ibcache].set_referenced();
    }

    fn on_write(&mut self, headers: &mut [BlockHeader], ibcache: usize, instrument: &mut Instrument) {
        self.sweep_gate(headers, instrument);
        headers[ibcache].set_referenced();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(n: usize) -> Vec<BlockHeader> {
        (0..n).map(|i| BlockHeader::new(i, 1)).collect()
    }

    #[test]
    fn disabled_sweep_never_increments_n_deref_p7() {
        let mut strat = Nur::new(0);
        let mut h = headers(2);
        let mut inst = Instrument::default();
        for _ in 0..10 {
            strat.on_read(&mut h, 0, &mut inst);
        }
        assert_eq!(inst.n_deref, 0);
    }

    #[test]
    fn sweeps_every_k_ops_p7() {
        let mut strat = Nur::new(4);
        let mut h = headers(2);
        let mut inst = Instrument::default();
        for _ in 0..4 {
            strat.on_read(&mut h, 0, &mut inst);
        }
        assert_eq!(inst.n_deref, 1);
        for _ in 0..4 {
            strat.on_write(&mut h, 0, &mut inst);
        }
        assert_eq!(inst.n_deref, 2);
    }

    #[test]
    fn sweep_clears_r_then_sets_it_on_the_accessed_block() {
        // A block just accessed cannot be swept on the same op (§9).
        let mut strat = Nur::new(1);
        let mut h = headers(2);
        h[1].set_referenced();
        let mut inst = Instrument::default();
        strat.on_read(&mut h, 0, &mut inst);
        assert_eq!(inst.n_deref, 1);
        assert!(h[0].is_referenced(), "accessed block keeps R set");
        assert!(!h[1].is_referenced(), "sweep clears other blocks' R");
    }

    #[test]
    fn victim_minimizes_2r_plus_m_tie_break_lowest_ibcache() {
        let mut strat = Nur::new(0);
        let mut h = headers(3);
        h.iter_mut().for_each(BlockHeader::set_valid);
        // slot0: R=1,M=0 -> k=2 ; slot1: R=1,M=1 -> k=3 ; slot2: R=0,M=0 -> k=0
        h[0].set_referenced();
        h[1].set_referenced();
        h[1].set_dirty();
        assert_eq!(strat.replace_block(&h), Some(2));
    }

    #[test]
    fn victim_ties_broken_by_lowest_ibcache_when_no_zero() {
        let mut strat = Nur::new(0);
        let mut h = headers(3);
        h.iter_mut().for_each(BlockHeader::set_valid);
        // All have k = 1 (dirty only); lowest ibcache wins.
        h.iter_mut().for_each(BlockHeader::set_dirty);
        assert_eq!(strat.replace_block(&h), Some(0));
    }

    #[test]
    fn empty_header_table_returns_none() {
        let mut strat = Nur::new(0);
        assert_eq!(strat.replace_block(&[]), None);
    }
}
