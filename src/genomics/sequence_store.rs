use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

/// Default number of bases appended to circular replicons for windowing.
pub const DEFAULT_WINDOW_EXTENSION: usize = 2000;
/// Default substring marking a record as circular.
pub const DEFAULT_CIRCULAR_MARKER: &str = "topology=circular";
/// Longest replicon whose wrapped coordinates still fit in a `u32`.
pub const MAX_REPLICON_LEN: usize = (u32::MAX / 2) as usize;

/// Errors raised while finalising reference records.
#[derive(Debug, Error)]
pub enum SequenceStoreError {
    /// A record carried no sequence.
    #[error("reference record '{0}' has an empty sequence")]
    InvalidRecord(String),

    /// Two records share the same identifier.
    #[error("reference record '{0}' appears more than once")]
    DuplicateRecord(String),

    /// Two records share the first header token that reports key rows by.
    #[error("reference records '{first}' and '{second}' share the name '{name}'")]
    DuplicateName {
        /// Shared first token.
        name: String,
        /// Earlier record.
        first: String,
        /// Later record.
        second: String,
    },

    /// Replicon too long for 32-bit span coordinates.
    #[error("reference record '{id}' is {len} bases, above the {} base limit", MAX_REPLICON_LEN)]
    RepliconTooLong {
        /// Offending record.
        id: String,
        /// Its length.
        len: usize,
    },

    /// k-mer length must be at least one.
    #[error("k-mer length must be greater than zero")]
    InvalidKmerLength,
}

/// Raw `(id, sequence)` record handed over by a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepliconRecord {
    /// Record identifier (header text; may carry the circular marker).
    pub id: String,
    /// Sequence bytes as parsed.
    pub sequence: Vec<u8>,
}

impl RepliconRecord {
    /// Construct a new record.
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }
}

/// Options controlling how the store derives extended sequences.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// k-mer length; circular records get `k - 1` bases of index extension.
    pub kmer_len: usize,
    /// Substring of the id that marks a replicon as circular.
    pub circular_marker: String,
    /// Bases appended to circular records for window extraction.
    pub window_extension: usize,
}

impl StoreOptions {
    /// Options for a given k with default marker and window extension.
    pub fn new(kmer_len: usize) -> Self {
        Self {
            kmer_len,
            circular_marker: DEFAULT_CIRCULAR_MARKER.to_string(),
            window_extension: DEFAULT_WINDOW_EXTENSION,
        }
    }

    /// Override the circular marker.
    pub fn with_circular_marker(mut self, marker: impl Into<String>) -> Self {
        self.circular_marker = marker.into();
        self
    }

    /// Override the window extension length.
    pub fn with_window_extension(mut self, bases: usize) -> Self {
        self.window_extension = bases;
        self
    }
}

/// A finalised reference replicon.
///
/// The physical sequence and both circular extensions share one buffer:
/// `sequence[..len]` is the physical sequence and anything after it is the
/// origin prefix repeated as needed.
#[derive(Debug, Clone)]
pub struct Replicon {
    id: Arc<str>,
    circular: bool,
    len: usize,
    index_extension: usize,
    window_extension: usize,
    sequence: Vec<u8>,
}

impl Replicon {
    fn new(
        id: Arc<str>,
        raw: &[u8],
        circular: bool,
        index_extension: usize,
        window_extension: usize,
    ) -> Self {
        let len = raw.len();
        let (index_extension, window_extension) = if circular {
            (index_extension, window_extension)
        } else {
            (0, 0)
        };
        let extra = index_extension.max(window_extension);

        let mut sequence = Vec::with_capacity(len + extra);
        sequence.extend(raw.iter().map(u8::to_ascii_uppercase));
        // Origin prefix cycles so replicons shorter than the extension still fill it.
        for i in 0..extra {
            let base = sequence[i % len];
            sequence.push(base);
        }

        Self {
            id,
            circular,
            len,
            index_extension,
            window_extension,
            sequence,
        }
    }

    /// Record identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared handle to the identifier.
    pub fn id_arc(&self) -> Arc<str> {
        Arc::clone(&self.id)
    }

    /// First whitespace-delimited token of the identifier.
    pub fn name(&self) -> &str {
        self.id.split_whitespace().next().unwrap_or(&self.id)
    }

    /// Whether the replicon wraps from its end back to its start.
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Physical length in bases.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; empty records are rejected at build time.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Upper-cased physical sequence.
    pub fn raw_sequence(&self) -> &[u8] {
        &self.sequence[..self.len]
    }

    /// Physical sequence plus `k - 1` origin bases when circular.
    pub fn index_extended_sequence(&self) -> &[u8] {
        &self.sequence[..self.len + self.index_extension]
    }

    /// Physical sequence plus the window extension when circular.
    pub fn window_extended_sequence(&self) -> &[u8] {
        &self.sequence[..self.len + self.window_extension]
    }

    /// Number of bases appended for windowing (zero when linear).
    pub fn window_extension(&self) -> usize {
        self.window_extension
    }

    /// Base at a physical position, reduced modulo the replicon length.
    pub fn base_at(&self, position: usize) -> u8 {
        self.sequence[position % self.len]
    }
}

/// Owner of all finalised replicons, in input order.
#[derive(Debug, Clone)]
pub struct SequenceStore {
    replicons: Vec<Replicon>,
    by_id: HashMap<Arc<str>, usize>,
    kmer_len: usize,
}

impl SequenceStore {
    /// Finalise raw records into replicons with their derived extensions.
    pub fn build<I>(records: I, options: &StoreOptions) -> Result<Self, SequenceStoreError>
    where
        I: IntoIterator<Item = RepliconRecord>,
    {
        if options.kmer_len == 0 {
            return Err(SequenceStoreError::InvalidKmerLength);
        }

        let mut replicons: Vec<Replicon> = Vec::new();
        let mut by_id = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for record in records {
            if record.sequence.is_empty() {
                return Err(SequenceStoreError::InvalidRecord(record.id));
            }
            if record.sequence.len() > MAX_REPLICON_LEN {
                return Err(SequenceStoreError::RepliconTooLong {
                    len: record.sequence.len(),
                    id: record.id,
                });
            }
            let id: Arc<str> = Arc::from(record.id.as_str());
            if by_id.contains_key(&id) {
                return Err(SequenceStoreError::DuplicateRecord(record.id));
            }
            let name = record.id.split_whitespace().next().unwrap_or(&record.id);
            if let Some(&earlier) = by_name.get(name) {
                return Err(SequenceStoreError::DuplicateName {
                    name: name.to_string(),
                    first: replicons[earlier].id().to_string(),
                    second: record.id,
                });
            }
            by_name.insert(name.to_string(), replicons.len());

            let circular =
                !options.circular_marker.is_empty() && record.id.contains(&options.circular_marker);
            let replicon = Replicon::new(
                Arc::clone(&id),
                &record.sequence,
                circular,
                options.kmer_len - 1,
                options.window_extension,
            );
            debug!(
                replicon = replicon.name(),
                length = replicon.len(),
                circular,
                "finalised replicon"
            );

            by_id.insert(id, replicons.len());
            replicons.push(replicon);
        }

        info!(
            replicons = replicons.len(),
            circular = replicons.iter().filter(|r| r.is_circular()).count(),
            "sequence store built"
        );

        Ok(Self {
            replicons,
            by_id,
            kmer_len: options.kmer_len,
        })
    }

    /// k-mer length the index extensions were derived for.
    pub fn kmer_len(&self) -> usize {
        self.kmer_len
    }

    /// Number of replicons.
    pub fn len(&self) -> usize {
        self.replicons.len()
    }

    /// Whether the store holds no replicons.
    pub fn is_empty(&self) -> bool {
        self.replicons.is_empty()
    }

    /// Replicon at an input-order index.
    pub fn get(&self, index: usize) -> Option<&Replicon> {
        self.replicons.get(index)
    }

    /// Input-order index of a replicon id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Replicon with the given id.
    pub fn by_id(&self, id: &str) -> Option<&Replicon> {
        self.index_of(id).map(|idx| &self.replicons[idx])
    }

    /// Iterate replicons in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Replicon> {
        self.replicons.iter()
    }
}
