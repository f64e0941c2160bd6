//! The numeric nucleotide alphabet.
//!
//! Every sequence crossing the codec boundary is a `Vec<u8>` of values in
//! `0..=3` meaning A, C, G, T. Text only appears for primers and display.

use crate::error::{AlphabetError, Result};

pub const A: u8 = 0;
pub const C: u8 = 1;
pub const G: u8 = 2;
pub const T: u8 = 3;

/// An ordered run of nucleotides (codetext, primer, or encoder output).
pub type DnaSequence = Vec<u8>;

const ACGT: [char; 4] = ['A', 'C', 'G', 'T'];

/// Watson-Crick partner of each nucleotide value.
const COMPLEMENT: [u8; 4] = [T, G, C, A];

/// Parse an `ACGTacgt` string into numeric nucleotides.
///
/// # Errors
/// `AlphabetError::InvalidSymbol` for any other character.
pub fn parse_acgt(text: &str) -> Result<DnaSequence> {
    text.chars()
        .enumerate()
        .map(|(position, symbol)| match symbol.to_ascii_uppercase() {
            'A' => Ok(A),
            'C' => Ok(C),
            'G' => Ok(G),
            'T' => Ok(T),
            _ => Err(AlphabetError::InvalidSymbol { symbol, position }.into()),
        })
        .collect()
}

/// Render numeric nucleotides as text. Values above 3 render as `N`.
pub fn to_acgt_string(seq: &[u8]) -> String {
    seq.iter()
        .map(|&b| ACGT.get(b as usize).copied().unwrap_or('N'))
        .collect()
}

/// Check that every value is a nucleotide.
pub fn validate(seq: &[u8]) -> Result<()> {
    match seq.iter().position(|&b| b > T) {
        Some(position) => Err(AlphabetError::InvalidValue {
            value: seq[position],
            position,
        }
        .into()),
        None => Ok(()),
    }
}

/// Reverse-complement a sequence in place.
///
/// Values above 3 are reversed but not complemented.
pub fn reverse_complement_in_place(seq: &mut [u8]) {
    seq.reverse();
    for b in seq.iter_mut() {
        if let Some(&c) = COMPLEMENT.get(*b as usize) {
            *b = c;
        }
    }
}

/// Return the reverse complement of `seq`.
pub fn reverse_complement(seq: &[u8]) -> DnaSequence {
    let mut out = seq.to_vec();
    reverse_complement_in_place(&mut out);
    out
}
