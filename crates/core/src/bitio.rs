//! MSB-first bit cursors over byte buffers.
//!
//! The vbit codec pulls 0, 1 or 2 bits at a time from a message and pushes
//! them back out on decode. Reading past the end of the message yields zero
//! bits, which is what lets the encoder "fill" a codetext out to a requested
//! length. The writer zero-pads its final partial byte.
//!
//! # Example
//! ```
//! use dnacode_core::bitio::{BitReader, BitWriter};
//!
//! let mut reader = BitReader::new(&[0b1011_0000]);
//! assert_eq!(reader.read_padded(3).unwrap(), 0b101);
//! assert_eq!(reader.read_padded(8).unwrap(), 0b1000_0000); // 5 real bits, 3 fill
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b10, 2).unwrap();
//! writer.write_bits(0b1, 1).unwrap();
//! assert_eq!(writer.finish(), vec![0b1010_0000]);
//! ```

use crate::error::{BitIoError, Result};

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `bytes.len() == ceil(bit_len / 8)`
/// - bits past `bit_len` in the last byte are zero
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Append the low `count` bits of `value`, most significant first.
    ///
    /// # Errors
    /// `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        for k in (0..count).rev() {
            let bit = ((value >> k) & 1) as u8;
            let offset = self.bit_len % 8;
            if offset == 0 {
                self.bytes.push(0);
            }
            if bit == 1 {
                if let Some(last) = self.bytes.last_mut() {
                    *last |= 0x80 >> offset;
                }
            }
            self.bit_len += 1;
        }
        Ok(())
    }

    /// Total number of bits written.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Return the bytes, final partial byte zero-padded.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads bits MSB-first from a byte buffer, yielding zeros past the end.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    /// Read `count` bits; any bits beyond the buffer read as zero.
    ///
    /// # Errors
    /// `BitIoError::InvalidBitCount` if count > 64.
    pub fn read_padded(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        let mut value = 0u64;
        for _ in 0..count {
            let byte = self.data.get(self.bit_position / 8).copied().unwrap_or(0);
            let bit = (byte >> (7 - self.bit_position % 8)) & 1;
            value = (value << 1) | u64::from(bit);
            self.bit_position += 1;
        }
        Ok(value)
    }

    /// Bits consumed so far, fill bits included.
    pub fn position(&self) -> usize {
        self.bit_position
    }

    /// Real (non-fill) bits left in the buffer.
    pub fn bits_remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_position)
    }
}
