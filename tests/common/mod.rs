#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use pairmap::genomics::{reverse_complement, ReadPair, RepliconRecord};

/// 40-base linear replicon whose 21-mers are unique on both strands.
pub const CHR1: &[u8] = b"CTCCAGCGCGGTCAGTTCCATCACCCTAAGTAACCGAATA";
/// 40-base circular replicon, unique against `CHR1` including its origin-crossing 21-mers.
pub const PLASMID: &[u8] = b"TTTCCTCATGCAATTCAAAACCATGTCCGTAATGTAGGCG";

pub fn reference() -> Vec<RepliconRecord> {
    vec![
        RepliconRecord::new("chr1 linear test", CHR1.to_vec()),
        RepliconRecord::new("pA topology=circular", PLASMID.to_vec()),
    ]
}

/// `len` bases of a circular sequence starting at `start`, crossing the origin as needed.
pub fn cyclic(sequence: &[u8], start: usize, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| sequence[(start + i) % sequence.len()])
        .collect()
}

/// Pair whose mate 1 seeds forward at `forward_start` and mate 2 seeds
/// reverse-complement over `[reverse_start, reverse_start + k)`.
pub fn forward_pair(sequence: &[u8], forward_start: usize, reverse_start: usize, k: usize) -> ReadPair {
    ReadPair::new(
        cyclic(sequence, forward_start, k),
        reverse_complement(&cyclic(sequence, reverse_start, k)),
    )
}

/// The eight-pair scenario behind the golden report snapshots.
pub fn scenario_pairs() -> Vec<ReadPair> {
    let mut ambiguous = CHR1[0..21].to_vec();
    ambiguous[10] = b'n';
    vec![
        forward_pair(CHR1, 5, 10, 21),
        ReadPair::new(reverse_complement(&CHR1[12..33]), CHR1[0..21].to_vec()),
        forward_pair(PLASMID, 30, 5, 21),
        ReadPair::new(CHR1[0..15].to_vec(), reverse_complement(&CHR1[10..31])),
        ReadPair::new(ambiguous, reverse_complement(&CHR1[10..31])),
        ReadPair::new(vec![b'A'; 21], vec![b'C'; 21]),
        forward_pair(CHR1, 0, 0, 21),
        forward_pair(CHR1, 0, 19, 21),
    ]
}

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

/// First report row that differs, as `(1-based line, expected, actual)`.
/// Line endings are compared without `\r` and a missing row reads as `<end of report>`.
pub fn first_differing_row<'a>(
    expected: &'a str,
    actual: &'a str,
) -> Option<(usize, &'a str, &'a str)> {
    let mut expected_rows = expected.lines().map(|row| row.trim_end_matches('\r'));
    let mut actual_rows = actual.lines().map(|row| row.trim_end_matches('\r'));
    let mut line = 0;
    loop {
        line += 1;
        match (expected_rows.next(), actual_rows.next()) {
            (None, None) => return None,
            (e, a) if e == a => continue,
            (e, a) => {
                return Some((
                    line,
                    e.unwrap_or("<end of report>"),
                    a.unwrap_or("<end of report>"),
                ))
            }
        }
    }
}

/// Compare a rendered pairmap report with its stored golden table.
///
/// With `PAIRMAP_UPDATE_SNAPSHOTS` set the golden file is rewritten instead.
pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("PAIRMAP_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create report directory");
        }
        fs::write(&path, actual).expect("write golden report");
        return;
    }

    let expected = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("golden report {} unreadable: {err}", path.display()));
    if let Some((line, want, got)) = first_differing_row(&expected, actual) {
        let header = expected.lines().next().unwrap_or("");
        panic!(
            "pairmap report `{name}` differs from {} at line {line} (columns {header:?})\n  \
             golden:   {want}\n  rendered: {got}\n\
             rerun with PAIRMAP_UPDATE_SNAPSHOTS=1 to accept the rendered report.\n\
             Full rendered report:\n{actual}",
            path.display()
        );
    }
}
