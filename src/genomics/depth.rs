use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genomics::{PairPlacement, SequenceStore, Strand};

/// Errors raised by the depth accumulator.
#[derive(Debug, Error)]
pub enum DepthError {
    /// Placement refers to a replicon the accumulator does not track.
    #[error("placement refers to unknown replicon index {0}")]
    UnknownReplicon(usize),

    /// Two accumulators disagree on replicon layout.
    #[error("cannot merge depth arrays of different layouts")]
    LayoutMismatch,
}

/// Open interval `(min, max)` of acceptable end-to-end distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceRange {
    /// Exclusive lower bound.
    pub min: u32,
    /// Exclusive upper bound.
    pub max: u32,
}

impl DistanceRange {
    /// Construct a range with exclusive bounds.
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// `true` when `min < distance < max`.
    pub fn contains(&self, distance: u32) -> bool {
        self.min < distance && distance < self.max
    }
}

impl Default for DistanceRange {
    fn default() -> Self {
        Self { min: 20, max: 2000 }
    }
}

/// Result of offering a placement to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Depth was incremented over the placement's span.
    Accepted,
    /// Distance outside the valid range; nothing was recorded.
    AbnormalDistance,
}

/// Per-strand depth tracks for one replicon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthArrays {
    plus: Vec<u32>,
    minus: Vec<u32>,
}

impl DepthArrays {
    fn zeroed(len: usize) -> Self {
        Self {
            plus: vec![0; len],
            minus: vec![0; len],
        }
    }

    /// Physical replicon length.
    pub fn len(&self) -> usize {
        self.plus.len()
    }

    /// Whether the tracks are empty.
    pub fn is_empty(&self) -> bool {
        self.plus.is_empty()
    }

    /// Depth track for one strand.
    pub fn strand(&self, strand: Strand) -> &[u32] {
        match strand {
            Strand::Plus => &self.plus,
            Strand::Minus => &self.minus,
        }
    }

    /// Plus-strand track.
    pub fn plus(&self) -> &[u32] {
        &self.plus
    }

    /// Minus-strand track.
    pub fn minus(&self) -> &[u32] {
        &self.minus
    }

    /// Combined depth at a physical position.
    pub fn total_at(&self, position: usize) -> u64 {
        self.plus[position] as u64 + self.minus[position] as u64
    }

    /// Sum of both tracks over every position.
    pub fn sum(&self) -> u64 {
        self.plus
            .iter()
            .chain(self.minus.iter())
            .map(|&d| d as u64)
            .sum()
    }

    /// Increment `count` consecutive positions starting at `start`, modulo the length.
    /// Counters stop at `u32::MAX`.
    fn increment_span(&mut self, strand: Strand, start: usize, count: usize) {
        let track = match strand {
            Strand::Plus => &mut self.plus,
            Strand::Minus => &mut self.minus,
        };
        let len = track.len();
        let mut position = start % len;
        let mut remaining = count;

        while remaining > 0 {
            let run = remaining.min(len - position);
            for depth in &mut track[position..position + run] {
                *depth = depth.saturating_add(1);
            }
            remaining -= run;
            position = 0;
        }
    }
}

/// Cumulative per-replicon, per-strand coverage over accepted pair spans.
#[derive(Debug, Clone)]
pub struct DepthAccumulator {
    ids: Vec<Arc<str>>,
    arrays: Vec<DepthArrays>,
}

impl DepthAccumulator {
    /// Zeroed tracks for every replicon in `store`.
    pub fn new(store: &SequenceStore) -> Self {
        Self {
            ids: store.iter().map(|r| r.id_arc()).collect(),
            arrays: store.iter().map(|r| DepthArrays::zeroed(r.len())).collect(),
        }
    }

    /// Record a placement if its distance lies in `range`.
    ///
    /// The span `[span_start, span_start + distance)` is credited to the
    /// strand chosen by the placement's direction; the part running past the
    /// physical end continues from position 0.
    pub fn accept(
        &mut self,
        placement: &PairPlacement,
        range: DistanceRange,
    ) -> Result<Acceptance, DepthError> {
        let arrays = self
            .arrays
            .get_mut(placement.replicon_index)
            .ok_or(DepthError::UnknownReplicon(placement.replicon_index))?;

        if !range.contains(placement.distance) {
            return Ok(Acceptance::AbnormalDistance);
        }

        arrays.increment_span(
            placement.direction.strand(),
            placement.span_start() as usize,
            placement.distance as usize,
        );
        Ok(Acceptance::Accepted)
    }

    /// Fold another accumulator's counts into this one, saturating at `u32::MAX`.
    pub fn merge(&mut self, other: &DepthAccumulator) -> Result<(), DepthError> {
        if self.ids != other.ids
            || self
                .arrays
                .iter()
                .zip(&other.arrays)
                .any(|(a, b)| a.len() != b.len())
        {
            return Err(DepthError::LayoutMismatch);
        }

        for (mine, theirs) in self.arrays.iter_mut().zip(&other.arrays) {
            for (a, b) in mine.plus.iter_mut().zip(&theirs.plus) {
                *a = a.saturating_add(*b);
            }
            for (a, b) in mine.minus.iter_mut().zip(&theirs.minus) {
                *a = a.saturating_add(*b);
            }
        }
        Ok(())
    }

    /// Tracks for the replicon at a store index.
    pub fn arrays(&self, index: usize) -> Option<&DepthArrays> {
        self.arrays.get(index)
    }

    /// Tracks for the replicon named `id`.
    pub fn arrays_for(&self, id: &str) -> Option<&DepthArrays> {
        self.ids
            .iter()
            .position(|known| known.as_ref() == id)
            .map(|idx| &self.arrays[idx])
    }

    /// Iterate `(id, tracks)` in store order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DepthArrays)> {
        self.ids.iter().map(|id| id.as_ref()).zip(self.arrays.iter())
    }

    /// blake3 digest over all tracks in store order.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for (id, arrays) in self.iter() {
            hasher.update(id.as_bytes());
            hasher.update(&(arrays.len() as u64).to_le_bytes());
            for track in [&arrays.plus, &arrays.minus] {
                for depth in track {
                    hasher.update(&depth.to_le_bytes());
                }
            }
        }
        hasher.finalize()
    }
}
