//! Exact-seed paired-end placement and span coverage.
//!
//! Reference replicons are finalised into a [`SequenceStore`], indexed once
//! into a [`KmerIndex`], and each read pair is resolved by a
//! [`PairResolver`] to its shortest-span placement. Accepted placements are
//! credited to a [`DepthAccumulator`], whose tracks a [`CoverageWindower`]
//! smooths for export.

mod complement;
mod depth;
mod io;
mod kmer_index;
mod report;
mod resolver;
mod sequence_store;
mod types;
mod windows;

pub use complement::{complement, is_recognized, reverse_complement, UNMAPPABLE};
pub use depth::{Acceptance, DepthAccumulator, DepthArrays, DepthError, DistanceRange};
pub use io::{open_reader, read_reference, PairedReads, ReadPair};
pub use kmer_index::{KmerIndex, KmerIndexError, RepliconKmers};
pub use report::{
    render_depth_table, render_distance_histogram, render_summary, render_window_table,
    write_depth_table, write_distance_histogram, write_summary, write_window_table,
};
pub use resolver::{PairResolver, Unresolved};
pub use sequence_store::{
    Replicon, RepliconRecord, SequenceStore, SequenceStoreError, StoreOptions,
    DEFAULT_CIRCULAR_MARKER, DEFAULT_WINDOW_EXTENSION, MAX_REPLICON_LEN,
};
pub use types::{Direction, PairOutcome, PairPlacement, Strand};
pub use windows::{CoverageWindow, CoverageWindower, CoverageWindows, WindowError, WindowParams};
