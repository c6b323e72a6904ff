use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::genomics::{reverse_complement, SequenceStore};

/// Errors raised while building or querying the k-mer index.
#[derive(Debug, Error)]
pub enum KmerIndexError {
    /// The store's circular extensions were derived for a different k.
    #[error("index k={requested} does not match sequence store k={store}")]
    KmerLengthMismatch {
        /// k requested for the index.
        requested: usize,
        /// k the store was finalised with.
        store: usize,
    },

    /// Lookup against an id the index does not know.
    #[error("unknown replicon '{0}'")]
    UnknownReplicon(String),
}

type PositionMap = HashMap<Box<[u8]>, Vec<u32>>;

/// Forward and reverse-complement lookup tables for one replicon.
#[derive(Debug, Clone, Default)]
pub struct RepliconKmers {
    forward: PositionMap,
    reverse: PositionMap,
}

impl RepliconKmers {
    fn build(sequence: &[u8], k: usize) -> Self {
        let mut forward: PositionMap = HashMap::new();
        let mut reverse: PositionMap = HashMap::new();

        if sequence.len() >= k {
            for (start, kmer) in sequence.windows(k).enumerate() {
                forward
                    .entry(Box::from(kmer))
                    .or_default()
                    .push(start as u32);
                reverse
                    .entry(reverse_complement(kmer).into_boxed_slice())
                    .or_default()
                    .push((start + k - 1) as u32);
            }
        }

        Self { forward, reverse }
    }

    /// Start offsets of every occurrence of `kmer`, ascending.
    pub fn lookup_forward(&self, kmer: &[u8]) -> &[u32] {
        self.forward.get(kmer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Last-base offsets of every occurrence of `kmer`'s reverse complement, ascending.
    pub fn lookup_reverse(&self, kmer: &[u8]) -> &[u32] {
        self.reverse.get(kmer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct forward k-mers.
    pub fn distinct_kmers(&self) -> usize {
        self.forward.len()
    }
}

/// Immutable exact-match index over every replicon of a [`SequenceStore`].
///
/// Tables are stored in the store's replicon order, so an index position
/// doubles as the replicon's store index. Once built the index is only
/// read, and can be shared across threads.
#[derive(Debug, Clone)]
pub struct KmerIndex {
    k: usize,
    replicons: Vec<RepliconKmers>,
}

impl KmerIndex {
    /// Slide a k-wide window over each replicon's index-extended sequence.
    pub fn build(store: &SequenceStore, k: usize) -> Result<Self, KmerIndexError> {
        if k != store.kmer_len() {
            return Err(KmerIndexError::KmerLengthMismatch {
                requested: k,
                store: store.kmer_len(),
            });
        }

        let replicons: Vec<RepliconKmers> = store
            .iter()
            .map(|replicon| {
                let kmers = RepliconKmers::build(replicon.index_extended_sequence(), k);
                debug!(
                    replicon = replicon.name(),
                    distinct = kmers.distinct_kmers(),
                    "indexed replicon"
                );
                kmers
            })
            .collect();

        info!(k, replicons = replicons.len(), "k-mer index built");
        Ok(Self { k, replicons })
    }

    /// k-mer length.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of indexed replicons.
    pub fn len(&self) -> usize {
        self.replicons.len()
    }

    /// Whether no replicons were indexed.
    pub fn is_empty(&self) -> bool {
        self.replicons.is_empty()
    }

    /// Tables for the replicon at a store index.
    pub fn replicon(&self, index: usize) -> Option<&RepliconKmers> {
        self.replicons.get(index)
    }

    /// Forward offsets of `kmer` on the replicon named `id`.
    pub fn lookup_forward<'a>(
        &'a self,
        store: &SequenceStore,
        id: &str,
        kmer: &[u8],
    ) -> Result<&'a [u32], KmerIndexError> {
        Ok(self.tables_for(store, id)?.lookup_forward(kmer))
    }

    /// Reverse offsets of `kmer` on the replicon named `id`.
    pub fn lookup_reverse<'a>(
        &'a self,
        store: &SequenceStore,
        id: &str,
        kmer: &[u8],
    ) -> Result<&'a [u32], KmerIndexError> {
        Ok(self.tables_for(store, id)?.lookup_reverse(kmer))
    }

    fn tables_for(&self, store: &SequenceStore, id: &str) -> Result<&RepliconKmers, KmerIndexError> {
        store
            .index_of(id)
            .and_then(|idx| self.replicons.get(idx))
            .ok_or_else(|| KmerIndexError::UnknownReplicon(id.to_string()))
    }
}
