//! Primer alignment and strand orientation.
//!
//! Sequencing reads come back in either orientation. [`orient`] scores the
//! left primer against the start of the read and of its reverse complement
//! with a small local-style alignment, and keeps whichever fits better.

use crate::alphabet::reverse_complement;

/// Cost of leaving the primer or candidate unaligned at either end.
const SKIP_COST: i64 = 1;
/// Cost of a gap inside the alignment.
const GAP_COST: i64 = 1;
const MATCH_COST: i64 = -1;
const MISMATCH_COST: i64 = 1;

/// Edit-style alignment cost of `primer` against the first `candidate_len`
/// symbols of `candidate`; lower is better.
///
/// Leading and trailing unaligned symbols cost [`SKIP_COST`] each, gaps in
/// the interior [`GAP_COST`], matches -1 and mismatches +1. A
/// `candidate_len` past the end of `candidate` is clamped.
pub fn alignment_cost(primer: &[u8], candidate: &[u8], candidate_len: usize) -> i64 {
    let candidate = &candidate[..candidate_len.min(candidate.len())];
    let (ia, ib) = (primer.len(), candidate.len());

    // Rolling rows over the primer axis
    let mut prev: Vec<i64> = (0..=ib as i64).map(|j| j * SKIP_COST).collect();
    let mut row = vec![0i64; ib + 1];

    for i in 1..=ia {
        row[0] = i as i64 * SKIP_COST;
        // advancing along the candidate on the last primer row is a skip
        let across = if i == ia { SKIP_COST } else { GAP_COST };
        for j in 1..=ib {
            let down = if j == ib { SKIP_COST } else { GAP_COST };
            let diag = if primer[i - 1] == candidate[j - 1] {
                MATCH_COST
            } else {
                MISMATCH_COST
            };
            row[j] = (prev[j - 1] + diag)
                .min(prev[j] + down)
                .min(row[j - 1] + across);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[ib]
}

/// Return `seq` in the orientation whose start best matches `primer`.
///
/// The reverse complement is chosen only when it aligns strictly better.
pub fn orient(primer: &[u8], seq: &[u8]) -> Vec<u8> {
    let len = primer.len().min(seq.len());
    let forward = alignment_cost(primer, seq, len);
    let flipped = reverse_complement(seq);
    let backward = alignment_cost(primer, &flipped, len);
    tracing::trace!(forward, backward, "primer alignment costs");
    if backward < forward {
        flipped
    } else {
        seq.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::parse_acgt;

    #[test]
    fn test_exact_match_cost() {
        let p = parse_acgt("ACGTAC").unwrap();
        assert_eq!(alignment_cost(&p, &p, 6), -6);
    }

    #[test]
    fn test_mismatch_raises_cost() {
        let p = parse_acgt("ACGTAC").unwrap();
        let c = parse_acgt("ACTTAC").unwrap();
        assert_eq!(alignment_cost(&p, &c, 6), -4);
    }

    #[test]
    fn test_empty_inputs() {
        let p = parse_acgt("ACG").unwrap();
        assert_eq!(alignment_cost(&p, &[], 0), 3);
        assert_eq!(alignment_cost(&[], &p, 3), 3);
        assert_eq!(alignment_cost(&[], &[], 0), 0);
    }

    #[test]
    fn test_candidate_len_clamped() {
        let p = parse_acgt("ACGT").unwrap();
        let c = parse_acgt("ACGT").unwrap();
        assert_eq!(alignment_cost(&p, &c, 100), -4);
    }

    #[test]
    fn test_orient_keeps_forward() {
        let primer = parse_acgt("TCGAAGTCAG").unwrap();
        let read = parse_acgt("TCGAAGTCAGGATTACAGATTACA").unwrap();
        assert_eq!(orient(&primer, &read), read);
    }

    #[test]
    fn test_orient_flips_reverse_read() {
        let primer = parse_acgt("TCGAAGTCAG").unwrap();
        let read = parse_acgt("TCGAAGTCAGGATTACAGATTACA").unwrap();
        let reversed = reverse_complement(&read);
        assert_eq!(orient(&primer, &reversed), read);
    }

    #[test]
    fn test_orient_tie_keeps_original() {
        // palindromic under reverse complement
        let primer = parse_acgt("AAAA").unwrap();
        let read = parse_acgt("ACGT").unwrap();
        assert_eq!(reverse_complement(&read), read);
        assert_eq!(orient(&primer, &read), read);
    }
}
