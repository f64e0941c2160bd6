//! Sequential encoder.
//!
//! Walks the vbits of a message once. At each position the rolling
//! [`CodeState`] picks one allowed nucleotide through the digest, then
//! absorbs the emitted symbol. The right primer is appended verbatim.

use crate::constraint::ConstraintEngine;
use crate::error::Result;
use crate::schedule::{CodeSchedule, CodeState};
use crate::vbits;

/// Encode `message` into a DNA codetext.
///
/// With `target_len` the codetext (right primer included) is filled out
/// with zero-bit positions to at least that length.
///
/// # Errors
/// `CapacityError::MaxSeqExceeded` if the message or target length needs
/// more than `max_seq` positions.
pub fn encode(
    schedule: &CodeSchedule,
    engine: &ConstraintEngine,
    message: &[u8],
    target_len: Option<usize>,
) -> Result<Vec<u8>> {
    let vbits = vbits::unpack(schedule, message, target_len.unwrap_or(0))?;
    let right = schedule.right_primer();

    let mut codetext = Vec::with_capacity(vbits.len() + right.len());
    let mut state = CodeState::initial();
    for (seq, &vbit) in vbits.iter().enumerate() {
        let (symbol, next) = state.step(schedule, engine, seq, vbit);
        codetext.push(symbol);
        state = next;
    }
    codetext.extend_from_slice(right);
    Ok(codetext)
}

/// Minimum codetext length carrying `payload_bytes` bytes, right primer
/// included.
pub fn min_strand_length(schedule: &CodeSchedule, payload_bytes: usize) -> Result<usize> {
    Ok(schedule.vbit_len(8 * payload_bytes)? + schedule.right_primer().len())
}
