//! Variable-rate bit codec.
//!
//! Splits a byte payload into vbits (0, 1 or 2 payload bits per position,
//! following the schedule's width table) and joins them back. Bits are taken
//! MSB-first; a payload shorter than the requested number of positions is
//! extended with zero bits.

use crate::bitio::{BitReader, BitWriter};
use crate::error::{CapacityError, Result};
use crate::schedule::CodeSchedule;

/// Split `message` into one vbit per position.
///
/// Produces enough positions to carry every payload bit, or
/// `target_len - right primer length` positions if that is larger.
///
/// # Errors
/// `CapacityError::MaxSeqExceeded` if more than `max_seq` positions are needed.
pub fn unpack(schedule: &CodeSchedule, message: &[u8], target_len: usize) -> Result<Vec<u8>> {
    let needed = schedule.vbit_len(8 * message.len())?;
    let fill = target_len.saturating_sub(schedule.right_primer().len());
    let positions = needed.max(fill);
    if positions > schedule.max_seq() {
        return Err(CapacityError::MaxSeqExceeded {
            needed: positions,
            max_seq: schedule.max_seq(),
        }
        .into());
    }

    let mut reader = BitReader::new(message);
    (0..positions)
        .map(|k| Ok(reader.read_padded(usize::from(schedule.width(k)))? as u8))
        .collect()
}

/// Join vbits back into bytes, stopping after `max_bits` bits if given.
///
/// # Errors
/// `CapacityError::MaxSeqExceeded` if `vbits` is longer than `max_seq`.
pub fn pack(schedule: &CodeSchedule, vbits: &[u8], max_bits: Option<usize>) -> Result<Vec<u8>> {
    if vbits.len() > schedule.max_seq() {
        return Err(CapacityError::MaxSeqExceeded {
            needed: vbits.len(),
            max_seq: schedule.max_seq(),
        }
        .into());
    }

    let carried = schedule.bits_in(vbits.len());
    let limit = max_bits.map_or(carried, |m| m.min(carried));
    let mut writer = BitWriter::with_capacity(limit);

    for (k, &vbit) in vbits.iter().enumerate() {
        let remaining = limit - writer.bit_len();
        if remaining == 0 {
            break;
        }
        let width = usize::from(schedule.width(k));
        let take = width.min(remaining);
        writer.write_bits(u64::from(vbit) >> (width - take), take)?;
    }
    Ok(writer.finish())
}
