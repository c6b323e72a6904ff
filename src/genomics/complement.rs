/// Value produced for any byte outside the recognised nucleotide alphabet.
///
/// It never equals a valid base code, so a k-mer carrying it can never be
/// hit by an exact-match lookup.
pub const UNMAPPABLE: u8 = 0;

const COMPLEMENT_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [UNMAPPABLE; 256];
    let pairs: [(u8, u8); 19] = [
        (b'A', b'T'),
        (b'C', b'G'),
        (b'G', b'C'),
        (b'T', b'A'),
        (b'U', b'A'),
        (b'R', b'Y'),
        (b'Y', b'R'),
        (b'S', b'S'),
        (b'W', b'W'),
        (b'K', b'M'),
        (b'M', b'K'),
        (b'B', b'V'),
        (b'V', b'B'),
        (b'D', b'H'),
        (b'H', b'D'),
        (b'N', b'N'),
        (b'*', b'*'),
        (b'-', b'-'),
        (b'?', b'?'),
    ];

    let mut i = 0;
    while i < pairs.len() {
        let (from, to) = pairs[i];
        table[from as usize] = to;
        if from.is_ascii_alphabetic() {
            table[from.to_ascii_lowercase() as usize] = to.to_ascii_lowercase();
        }
        i += 1;
    }
    table
}

/// Watson–Crick complement of a single nucleotide, preserving case.
#[inline]
pub fn complement(base: u8) -> u8 {
    COMPLEMENT_TABLE[base as usize]
}

/// Returns `true` if `base` belongs to the recognised DNA/RNA/IUPAC alphabet.
#[inline]
pub fn is_recognized(base: u8) -> bool {
    COMPLEMENT_TABLE[base as usize] != UNMAPPABLE
}

/// Reverse complement of a sequence.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}
