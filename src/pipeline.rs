//! Run orchestration
//!
//! [`PairMapper`] is the explicit context object for a run: it owns the
//! sequence store, the k-mer index, the tie-break generator and the depth
//! accumulator, and folds a stream of read pairs into them.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::MappingConfig;
use crate::genomics::{
    Acceptance, CoverageWindower, DepthAccumulator, Direction, KmerIndex, PairOutcome,
    PairResolver, ReadPair, RepliconRecord, SequenceStore,
};
use crate::PairMapError;

/// Per-run classification counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunSummary {
    /// Every pair offered, including short ones.
    pub total_pairs: u64,
    /// Pairs with a read shorter than k.
    pub short_reads: u64,
    /// Pairs with `N` in a k-base prefix.
    pub ambiguous: u64,
    /// Pairs with no candidate placement.
    pub no_match: u64,
    /// Resolved pairs outside the valid distance range.
    pub abnormal_distance: u64,
    /// Pairs credited to depth.
    pub accepted: u64,
    /// Accepted pairs in [`Direction::Forward`].
    pub accepted_forward: u64,
    /// Accepted pairs in [`Direction::Reverse`].
    pub accepted_reverse: u64,
    /// Accepted pairs per replicon, in store order.
    pub accepted_per_replicon: Vec<(Arc<str>, u64)>,
    /// Distance → count over accepted pairs.
    pub distance_histogram: BTreeMap<u32, u64>,
}

impl RunSummary {
    fn for_store(store: &SequenceStore) -> Self {
        Self {
            accepted_per_replicon: store.iter().map(|r| (r.id_arc(), 0)).collect(),
            ..Self::default()
        }
    }

    /// Ambiguous plus unmatched pairs.
    pub fn not_valid(&self) -> u64 {
        self.ambiguous + self.no_match
    }

    /// Sum over every outcome category; equals `total_pairs`.
    pub fn classified(&self) -> u64 {
        self.short_reads + self.not_valid() + self.abnormal_distance + self.accepted
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: &PairOutcome) {
        self.total_pairs += 1;
        match outcome {
            PairOutcome::ShortRead => self.short_reads += 1,
            PairOutcome::AmbiguousBase => self.ambiguous += 1,
            PairOutcome::NoMatch => self.no_match += 1,
            PairOutcome::OutOfRangeDistance(_) => self.abnormal_distance += 1,
            PairOutcome::Accepted(placement) => {
                self.accepted += 1;
                match placement.direction {
                    Direction::Forward => self.accepted_forward += 1,
                    Direction::Reverse => self.accepted_reverse += 1,
                }
                if let Some((_, count)) = self.accepted_per_replicon.get_mut(placement.replicon_index)
                {
                    *count += 1;
                }
                *self.distance_histogram.entry(placement.distance).or_insert(0) += 1;
            }
        }
    }
}

/// Owns all state of a mapping run.
#[derive(Debug)]
pub struct PairMapper {
    config: MappingConfig,
    store: SequenceStore,
    index: KmerIndex,
    rng: StdRng,
    depth: DepthAccumulator,
    summary: RunSummary,
}

impl PairMapper {
    /// Finalise reference records, build the index and zero the depth tracks.
    pub fn new<I>(records: I, config: MappingConfig) -> Result<Self, PairMapError>
    where
        I: IntoIterator<Item = RepliconRecord>,
    {
        config.validate()?;
        let store = SequenceStore::build(records, &config.store_options())?;
        let index = KmerIndex::build(&store, config.kmer_len)?;
        Ok(Self::from_parts(store, index, config))
    }

    fn from_parts(store: SequenceStore, index: KmerIndex, config: MappingConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            depth: DepthAccumulator::new(&store),
            summary: RunSummary::for_store(&store),
            config,
            store,
            index,
        }
    }

    /// Resolve one pair and credit it to depth if its distance is valid.
    pub fn process_pair(&mut self, read1: &[u8], read2: &[u8]) -> Result<PairOutcome, PairMapError> {
        let resolved = PairResolver::new(&self.store, &self.index, &mut self.rng).classify(read1, read2);

        let outcome = match resolved {
            Err(reason) => reason.into(),
            Ok(placement) => match self.depth.accept(&placement, self.config.distance_range)? {
                Acceptance::Accepted => PairOutcome::Accepted(placement),
                Acceptance::AbnormalDistance => PairOutcome::OutOfRangeDistance(placement),
            },
        };

        self.summary.record(&outcome);
        if self.summary.total_pairs % self.config.progress_interval == 0 {
            debug!(
                pairs = self.summary.total_pairs,
                accepted = self.summary.accepted,
                "mapping progress"
            );
        }
        Ok(outcome)
    }

    /// Fold a fallible stream of pairs; the first input error aborts the run.
    pub fn map_pairs<I>(&mut self, pairs: I) -> anyhow::Result<&RunSummary>
    where
        I: IntoIterator<Item = anyhow::Result<ReadPair>>,
    {
        for pair in pairs {
            let pair = pair?;
            self.process_pair(&pair.read1, &pair.read2)?;
        }

        info!(
            total = self.summary.total_pairs,
            accepted = self.summary.accepted,
            not_valid = self.summary.not_valid(),
            abnormal = self.summary.abnormal_distance,
            short = self.summary.short_reads,
            "mapping finished"
        );
        Ok(&self.summary)
    }

    /// Run configuration.
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Finalised reference replicons.
    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    /// Exact-match index.
    pub fn index(&self) -> &KmerIndex {
        &self.index
    }

    /// Accumulated depth tracks.
    pub fn depth(&self) -> &DepthAccumulator {
        &self.depth
    }

    /// Counters so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Windowed view over the current depth.
    pub fn windower(&self) -> CoverageWindower<'_> {
        CoverageWindower::new(&self.store, &self.depth)
    }
}
