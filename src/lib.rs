//! # Paired-End Span Coverage by Exact k-mer Seeds
//!
//! This library places paired-end reads on a set of reference replicons by
//! exact k-mer lookup of each mate's leading bases, and accumulates
//! per-strand coverage over the full fragment span between the mates.
//!
//! ## Pipeline
//!
//! 1. **Sequence store**: finalise reference records, extending circular
//!    replicons so seeds and windows can cross the origin
//! 2. **k-mer index**: map every forward k-mer and every reverse-complement
//!    k-mer to its coordinates
//! 3. **Pair resolution**: pick the shortest forward/reverse pairing of the
//!    two mates, breaking ties with a seeded generator
//! 4. **Depth accumulation**: credit accepted spans to the strand implied by
//!    the mate orientation
//! 5. **Windowing**: sum trimmed depth over sliding windows for export
//!
//! ## Usage Example
//!
//! ```ignore
//! use pairmap::{MappingConfig, PairMapper};
//! use pairmap::genomics::{read_reference, PairedReads};
//!
//! let records = read_reference("ref.fa")?;
//! let mut mapper = PairMapper::new(records, MappingConfig::default())?;
//! mapper.map_pairs(PairedReads::open("r1.fq.gz", "r2.fq.gz")?)?;
//! println!("{} pairs accepted", mapper.summary().accepted);
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod config; // Run parameters and defaults
pub mod genomics; // Store, index, resolver, depth, windows, I/O
pub mod pipeline; // Run context and counters

pub use config::{ConfigError, MappingConfig, DEFAULT_KMER_LEN};
pub use pipeline::{PairMapper, RunSummary};

use thiserror::Error;

use genomics::{DepthError, KmerIndexError, SequenceStoreError, WindowError};

/// Errors that can occur while building or running a mapper
#[derive(Error, Debug)]
pub enum PairMapError {
    /// Rejected run parameters
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reference records could not be finalised
    #[error(transparent)]
    Store(#[from] SequenceStoreError),

    /// Index construction or lookup failed
    #[error(transparent)]
    Index(#[from] KmerIndexError),

    /// Depth accumulation failed
    #[error(transparent)]
    Depth(#[from] DepthError),

    /// Windowed coverage could not be derived
    #[error(transparent)]
    Window(#[from] WindowError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use genomics::RepliconRecord;

    #[test]
    fn test_errors_convert_into_crate_error() {
        let err: PairMapError = ConfigError::Invalid("k".to_string()).into();
        assert!(matches!(err, PairMapError::Config(_)));
        assert_eq!(err.to_string(), "invalid configuration: k");

        let err: PairMapError = DepthError::LayoutMismatch.into();
        assert!(matches!(err, PairMapError::Depth(_)));
    }

    #[test]
    fn test_duplicate_records_fail_construction() {
        let records = vec![
            RepliconRecord::new("chr1", b"ACGTACGTACGT".to_vec()),
            RepliconRecord::new("chr1", b"TTTTGGGGCCCC".to_vec()),
        ];
        let config = MappingConfig::default().with_kmer_len(4);
        let err = PairMapper::new(records, config).unwrap_err();
        assert!(matches!(err, PairMapError::Store(_)));
    }
}
