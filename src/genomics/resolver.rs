use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::genomics::{Direction, KmerIndex, PairOutcome, PairPlacement, SequenceStore};

/// Why a pair could not be resolved to a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// A read was shorter than k.
    ShortRead,
    /// An `N` in either k-base prefix.
    AmbiguousBase,
    /// No candidate on any replicon.
    NoMatch,
}

impl From<Unresolved> for PairOutcome {
    fn from(reason: Unresolved) -> Self {
        match reason {
            Unresolved::ShortRead => PairOutcome::ShortRead,
            Unresolved::AmbiguousBase => PairOutcome::AmbiguousBase,
            Unresolved::NoMatch => PairOutcome::NoMatch,
        }
    }
}

/// Resolves read pairs to the shortest-span placement across all replicons.
///
/// Ties at the minimum distance are broken by the injected random source,
/// so a fixed seed gives reproducible placements. Pass `&mut rng` to keep
/// the generator outside the resolver.
#[derive(Debug)]
pub struct PairResolver<'a, R = StdRng> {
    store: &'a SequenceStore,
    index: &'a KmerIndex,
    rng: R,
}

impl<'a> PairResolver<'a, StdRng> {
    /// Resolver with a [`StdRng`] seeded from `seed`.
    pub fn seeded(store: &'a SequenceStore, index: &'a KmerIndex, seed: u64) -> Self {
        Self::new(store, index, StdRng::seed_from_u64(seed))
    }
}

impl<'a, R: Rng> PairResolver<'a, R> {
    /// Resolver over `store`/`index` drawing tie-breaks from `rng`.
    pub fn new(store: &'a SequenceStore, index: &'a KmerIndex, rng: R) -> Self {
        Self { store, index, rng }
    }

    /// Best placement for the pair, or `None` when it cannot be placed.
    pub fn resolve(&mut self, read1: &[u8], read2: &[u8]) -> Option<PairPlacement> {
        self.classify(read1, read2).ok()
    }

    /// Like [`resolve`](Self::resolve), but reports why a pair was dropped.
    pub fn classify(&mut self, read1: &[u8], read2: &[u8]) -> Result<PairPlacement, Unresolved> {
        let k = self.index.k();
        if read1.len() < k || read2.len() < k {
            return Err(Unresolved::ShortRead);
        }

        let prefix1 = read1[..k].to_ascii_uppercase();
        let prefix2 = read2[..k].to_ascii_uppercase();
        if prefix1.contains(&b'N') || prefix2.contains(&b'N') {
            return Err(Unresolved::AmbiguousBase);
        }

        let candidates = self.candidates(&prefix1, &prefix2);
        self.select(candidates).ok_or(Unresolved::NoMatch)
    }

    /// Every candidate placement for two k-base prefixes, in replicon order.
    pub fn candidates(&self, prefix1: &[u8], prefix2: &[u8]) -> Vec<PairPlacement> {
        let mut candidates = Vec::new();

        for (replicon_index, replicon) in self.store.iter().enumerate() {
            let Some(tables) = self.index.replicon(replicon_index) else {
                continue;
            };
            let len = replicon.len() as u32;
            let circular = replicon.is_circular();
            let id = replicon.id_arc();

            // The forward-strand mate's prefix is looked up forward, its partner in reverse.
            for (forward_prefix, reverse_prefix, direction) in [
                (prefix1, prefix2, Direction::Forward),
                (prefix2, prefix1, Direction::Reverse),
            ] {
                let forward_hits = tables.lookup_forward(forward_prefix);
                if forward_hits.is_empty() {
                    continue;
                }
                let reverse_hits = tables.lookup_reverse(reverse_prefix);

                for &f in forward_hits {
                    for &r in reverse_hits {
                        if let Some(candidate) =
                            span_candidate(&id, replicon_index, len, circular, f, r, direction)
                        {
                            candidates.push(candidate);
                        }
                    }
                }
            }
        }

        candidates
    }

    fn select(&mut self, candidates: Vec<PairPlacement>) -> Option<PairPlacement> {
        let shortest = candidates.iter().map(|c| c.distance).min()?;
        let mut tied: Vec<PairPlacement> = candidates
            .into_iter()
            .filter(|c| c.distance == shortest)
            .collect();

        if tied.len() == 1 {
            return tied.pop();
        }
        let pick = self.rng.gen_range(0..tied.len());
        Some(tied.swap_remove(pick))
    }
}

/// Candidate for a forward hit `f` and a reverse hit `r`.
///
/// `r` is shifted by the replicon length when it does not follow `f`, which
/// is only meaningful on circular replicons.
fn span_candidate(
    id: &Arc<str>,
    replicon_index: usize,
    len: u32,
    circular: bool,
    f: u32,
    r: u32,
    direction: Direction,
) -> Option<PairPlacement> {
    let (reverse_position, distance) = if f < r {
        (r, r - f + 1)
    } else if circular {
        (r + len, len - f + r)
    } else {
        return None;
    };

    let (read1_position, read2_position) = match direction {
        Direction::Forward => (f, reverse_position),
        Direction::Reverse => (reverse_position, f),
    };

    Some(PairPlacement {
        replicon_id: Arc::clone(id),
        replicon_index,
        read1_position,
        read2_position,
        distance,
        direction,
    })
}
