use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pairmap::genomics::{
    read_reference, write_depth_table, write_distance_histogram, write_summary,
    write_window_table, KmerIndex, PairedReads, SequenceStore, WindowParams,
    DEFAULT_CIRCULAR_MARKER, DEFAULT_WINDOW_EXTENSION,
};
use pairmap::{MappingConfig, PairMapper, DEFAULT_KMER_LEN};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pairmap",
    about = "Paired-end span coverage from exact k-mer seeds"
)]
struct Cli {
    /// Log debug-level progress (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Map read pairs and write depth, window, and summary tables.
    Map {
        /// Reference FASTA (plain or gzip).
        reference: PathBuf,
        /// Mate 1 FASTQ (plain or gzip).
        read1: PathBuf,
        /// Mate 2 FASTQ (plain or gzip).
        read2: PathBuf,
        /// Directory receiving the output tables.
        #[arg(long, short, default_value = ".")]
        out_dir: PathBuf,
        /// Seed length.
        #[arg(long, short, default_value_t = DEFAULT_KMER_LEN)]
        kmer: usize,
        /// Exclusive lower bound on accepted distance.
        #[arg(long, default_value_t = 20)]
        min_distance: u32,
        /// Exclusive upper bound on accepted distance.
        #[arg(long, default_value_t = 2000)]
        max_distance: u32,
        /// Minimum combined depth for a position to appear in depth.tsv.
        #[arg(long, default_value_t = 1)]
        depth_threshold: u64,
        /// Header substring marking circular replicons.
        #[arg(long, default_value = DEFAULT_CIRCULAR_MARKER)]
        circular_marker: String,
        /// Bases appended to circular replicons for windowing.
        #[arg(long, default_value_t = DEFAULT_WINDOW_EXTENSION)]
        window_extension: usize,
        /// Bases per coverage window.
        #[arg(long, default_value_t = 120)]
        window_size: usize,
        /// Bases trimmed from each window side before summing.
        #[arg(long, default_value_t = 10)]
        window_margin: usize,
        /// Offset between consecutive windows.
        #[arg(long, default_value_t = 10)]
        window_step: usize,
        /// Seed for tie-break selection.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Describe the replicons of a reference and their k-mer content.
    Inspect {
        /// Reference FASTA (plain or gzip).
        reference: PathBuf,
        /// Seed length.
        #[arg(long, short, default_value_t = DEFAULT_KMER_LEN)]
        kmer: usize,
        /// Header substring marking circular replicons.
        #[arg(long, default_value = DEFAULT_CIRCULAR_MARKER)]
        circular_marker: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Map {
            reference,
            read1,
            read2,
            out_dir,
            kmer,
            min_distance,
            max_distance,
            depth_threshold,
            circular_marker,
            window_extension,
            window_size,
            window_margin,
            window_step,
            seed,
        } => {
            let config = MappingConfig::default()
                .with_kmer_len(kmer)
                .with_distance_range(min_distance, max_distance)
                .with_depth_threshold(depth_threshold)
                .with_circular_marker(circular_marker)
                .with_window_extension(window_extension)
                .with_window(WindowParams {
                    size: window_size,
                    margin: window_margin,
                    step: window_step,
                })
                .with_seed(seed);
            run_map(&reference, &read1, &read2, &out_dir, config)?
        }
        Commands::Inspect {
            reference,
            kmer,
            circular_marker,
        } => run_inspect(&reference, kmer, circular_marker)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_map(
    reference_path: &Path,
    read1_path: &Path,
    read2_path: &Path,
    out_dir: &Path,
    config: MappingConfig,
) -> Result<()> {
    let records = read_reference(reference_path).with_context(|| {
        format!(
            "failed to read reference from {}",
            reference_path.display()
        )
    })?;
    let mut mapper = PairMapper::new(records, config).context("failed to build mapper")?;

    let pairs = PairedReads::open(read1_path, read2_path)?;
    mapper.map_pairs(pairs).context("mapping failed")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut out = create_output(out_dir, "summary.txt")?;
    write_summary(&mut out, mapper.summary(), mapper.depth())?;

    let mut out = create_output(out_dir, "depth.tsv")?;
    write_depth_table(
        &mut out,
        mapper.store(),
        mapper.depth(),
        mapper.config().depth_threshold,
    )?;

    let mut out = create_output(out_dir, "windows.tsv")?;
    write_window_table(&mut out, mapper.store(), mapper.depth(), mapper.config().window)?;

    let mut out = create_output(out_dir, "distances.tsv")?;
    write_distance_histogram(&mut out, mapper.summary())?;

    info!(out_dir = %out_dir.display(), "reports written");
    Ok(())
}

fn run_inspect(reference_path: &Path, kmer: usize, circular_marker: String) -> Result<()> {
    let records = read_reference(reference_path).with_context(|| {
        format!(
            "failed to read reference from {}",
            reference_path.display()
        )
    })?;
    let config = MappingConfig::default()
        .with_kmer_len(kmer)
        .with_circular_marker(circular_marker);
    config.validate()?;

    let store = SequenceStore::build(records, &config.store_options())?;
    let index = KmerIndex::build(&store, kmer)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "#replicon\tlength\ttopology\tdistinct_kmers")?;
    for (idx, replicon) in store.iter().enumerate() {
        let distinct = index
            .replicon(idx)
            .map(|kmers| kmers.distinct_kmers())
            .unwrap_or_default();
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            replicon.name(),
            replicon.len(),
            if replicon.is_circular() { "circular" } else { "linear" },
            distinct
        )?;
    }
    Ok(())
}

fn create_output(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
