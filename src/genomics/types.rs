use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::genomics::{reverse_complement, SequenceStore};

/// Orientation of a resolved pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Read 1 on the forward strand, read 2 on the reverse strand.
    Forward,
    /// Read 2 on the forward strand, read 1 on the reverse strand.
    Reverse,
}

impl Direction {
    /// Signed encoding: `+1` or `-1`.
    pub fn sign(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    /// Depth strand credited by a placement in this direction.
    pub fn strand(self) -> Strand {
        match self {
            Direction::Forward => Strand::Plus,
            Direction::Reverse => Strand::Minus,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.sign())
    }
}

/// Per-strand depth track selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strand {
    /// Pairs resolved in [`Direction::Forward`].
    Plus,
    /// Pairs resolved in [`Direction::Reverse`].
    Minus,
}

/// A pair resolved to a single genomic placement.
///
/// Coordinates index the replicon's extended sequence. A coordinate may
/// exceed the physical length when the pair spans the origin of a circular
/// replicon; it is reduced modulo the length only when depth is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairPlacement {
    /// Identifier of the replicon the pair landed on.
    pub replicon_id: Arc<str>,
    /// Store index of that replicon.
    pub replicon_index: usize,
    /// 5′ coordinate of read 1.
    pub read1_position: u32,
    /// 5′ coordinate of read 2.
    pub read2_position: u32,
    /// End-to-end span length in bases; always positive.
    pub distance: u32,
    /// Pair orientation.
    pub direction: Direction,
}

impl PairPlacement {
    /// Coordinate of the mate that mapped to the forward strand.
    ///
    /// Depth covers `[span_start, span_start + distance)`.
    pub fn span_start(&self) -> u32 {
        match self.direction {
            Direction::Forward => self.read1_position,
            Direction::Reverse => self.read2_position,
        }
    }

    /// Whether the span runs past the physical end of a replicon of `len` bases.
    pub fn wraps(&self, len: usize) -> bool {
        self.span_start() as usize + self.distance as usize > len
    }

    /// Reference k-mers under each mate, read in that mate's orientation.
    ///
    /// Returns `(read1_segment, read2_segment)`, or `None` if the replicon is
    /// not in `store`.
    pub fn genome_segments(&self, store: &SequenceStore, k: usize) -> Option<(Vec<u8>, Vec<u8>)> {
        let replicon = store.get(self.replicon_index)?;
        let len = replicon.len();
        let forward_at = |pos: u32| -> Vec<u8> {
            (0..k).map(|i| replicon.base_at(pos as usize + i)).collect()
        };
        // Reverse coordinates mark the last base of the k-mer.
        let reverse_at = |pos: u32| -> Vec<u8> {
            let last = pos as usize % len;
            let start = last + len * (k / len + 1) - (k - 1);
            let window: Vec<u8> = (0..k).map(|i| replicon.base_at(start + i)).collect();
            reverse_complement(&window)
        };

        Some(match self.direction {
            Direction::Forward => (
                forward_at(self.read1_position),
                reverse_at(self.read2_position),
            ),
            Direction::Reverse => (
                reverse_at(self.read1_position),
                forward_at(self.read2_position),
            ),
        })
    }
}

/// Outcome of processing one read pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    /// A read was shorter than k; the pair never reached resolution.
    ShortRead,
    /// An `N` occurred in either k-base prefix.
    AmbiguousBase,
    /// No candidate placement on any replicon.
    NoMatch,
    /// Resolved, but the distance fell outside the valid interval.
    OutOfRangeDistance(PairPlacement),
    /// Resolved and credited to the depth arrays.
    Accepted(PairPlacement),
}

impl PairOutcome {
    /// The resolved placement, if any.
    pub fn placement(&self) -> Option<&PairPlacement> {
        match self {
            PairOutcome::OutOfRangeDistance(p) | PairOutcome::Accepted(p) => Some(p),
            _ => None,
        }
    }

    /// Counted under "not valid": ambiguous or unmatched.
    pub fn is_not_valid(&self) -> bool {
        matches!(self, PairOutcome::AmbiguousBase | PairOutcome::NoMatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{RepliconRecord, StoreOptions};

    fn placement(read1: u32, read2: u32, distance: u32, direction: Direction) -> PairPlacement {
        PairPlacement {
            replicon_id: Arc::from("chr1"),
            replicon_index: 0,
            read1_position: read1,
            read2_position: read2,
            distance,
            direction,
        }
    }

    #[test]
    fn direction_signs() {
        assert_eq!(Direction::Forward.sign(), 1);
        assert_eq!(Direction::Reverse.sign(), -1);
        assert_eq!(Direction::Reverse.to_string(), "-1");
        assert_eq!(Direction::Forward.to_string(), "+1");
    }

    #[test]
    fn span_start_follows_forward_mate() {
        assert_eq!(placement(5, 30, 26, Direction::Forward).span_start(), 5);
        assert_eq!(placement(30, 5, 26, Direction::Reverse).span_start(), 5);
        assert!(placement(35, 48, 13, Direction::Forward).wraps(40));
        assert!(!placement(5, 30, 26, Direction::Forward).wraps(40));
    }

    #[test]
    fn genome_segments_read_in_mate_orientation() {
        let store = SequenceStore::build(
            vec![RepliconRecord::new("chr1", b"AAAACCCGGGTTTT".to_vec())],
            &StoreOptions::new(3),
        )
        .unwrap();
        // Read 1 starts at CCC (4); read 2 covers GGG ending at 9 and reads CCC.
        let p = placement(4, 9, 6, Direction::Forward);
        let (r1, r2) = p.genome_segments(&store, 3).unwrap();
        assert_eq!(r1, b"CCC".to_vec());
        assert_eq!(r2, b"CCC".to_vec());
    }
}
