use anyhow::{anyhow, Context, Result};
use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

use super::RepliconRecord;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BUFFER_SIZE: usize = 1 << 20;

/// Open a plain or gzip/bgzip-compressed file, sniffing the gzip magic bytes.
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let is_gzip = reader
        .fill_buf()
        .with_context(|| format!("failed to read {}", path.display()))?
        .starts_with(&GZIP_MAGIC);

    if is_gzip {
        debug!(path = %path.display(), "reading gzip-compressed input");
        Ok(Box::new(BufReader::with_capacity(
            BUFFER_SIZE,
            MultiGzDecoder::new(reader),
        )))
    } else {
        Ok(Box::new(reader))
    }
}

/// Parse every FASTA record into `(header, sequence)` form.
///
/// The header keeps the description so a topology annotation there still
/// marks the replicon as circular.
pub fn read_reference<P: AsRef<Path>>(path: P) -> Result<Vec<RepliconRecord>> {
    let path = path.as_ref();
    let reader = fasta::Reader::from_bufread(open_reader(path)?);

    let mut records = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("malformed FASTA record in {}", path.display()))?;
        let id = match record.desc() {
            Some(desc) => format!("{} {}", record.id(), desc),
            None => record.id().to_string(),
        };
        records.push(RepliconRecord::new(id, record.seq().to_vec()));
    }
    Ok(records)
}

/// Sequences of one read pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPair {
    /// Mate 1 bases.
    pub read1: Vec<u8>,
    /// Mate 2 bases.
    pub read2: Vec<u8>,
}

impl ReadPair {
    /// Construct a pair from two sequences.
    pub fn new(read1: impl Into<Vec<u8>>, read2: impl Into<Vec<u8>>) -> Self {
        Self {
            read1: read1.into(),
            read2: read2.into(),
        }
    }
}

/// Lock-step reader over two mate FASTQ streams, one pair at a time.
pub struct PairedReads<R1: BufRead, R2: BufRead> {
    first: fastq::Records<R1>,
    second: fastq::Records<R2>,
    pairs: u64,
}

impl PairedReads<Box<dyn BufRead>, Box<dyn BufRead>> {
    /// Open both mate files (plain or gzip).
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(read1: P, read2: Q) -> Result<Self> {
        Ok(Self::new(open_reader(read1)?, open_reader(read2)?))
    }
}

impl<R1: BufRead, R2: BufRead> PairedReads<R1, R2> {
    /// Pair up two buffered FASTQ streams.
    pub fn new(read1: R1, read2: R2) -> Self {
        Self {
            first: fastq::Reader::from_bufread(read1).records(),
            second: fastq::Reader::from_bufread(read2).records(),
            pairs: 0,
        }
    }

    /// Pairs yielded so far.
    pub fn pairs_read(&self) -> u64 {
        self.pairs
    }
}

impl<R1: BufRead, R2: BufRead> fmt::Debug for PairedReads<R1, R2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairedReads")
            .field("pairs", &self.pairs)
            .finish_non_exhaustive()
    }
}

impl<R1: BufRead, R2: BufRead> Iterator for PairedReads<R1, R2> {
    type Item = Result<ReadPair>;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.first.next(), self.second.next()) {
            (None, None) => None,
            (Some(_), None) | (None, Some(_)) => {
                warn!(pairs = self.pairs, "mate files end at different records");
                Some(Err(anyhow!(
                    "paired FASTQ length mismatch after {} pairs",
                    self.pairs
                )))
            }
            (Some(a), Some(b)) => {
                let pair = a
                    .and_then(|a| b.map(|b| ReadPair::new(a.seq(), b.seq())))
                    .with_context(|| format!("malformed FASTQ record at pair {}", self.pairs + 1));
                if pair.is_ok() {
                    self.pairs += 1;
                }
                Some(pair)
            }
        }
    }
}
