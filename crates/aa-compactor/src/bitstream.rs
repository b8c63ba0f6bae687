//! Bit-decision stream: one bit per address field, closed by a single `1`
//! terminator bit and zero padding.
//!
//! Each stream byte carries seven decisions, low bit first. The high bit is
//! a continuation flag, set on every byte except the last, so the stream
//! delimits itself and the records start right after the first byte with
//! the flag clear.

use aa_core::{CompactError, Result};

const DATA_BITS: usize = 7;
const DATA_MASK: u8 = 0x7f;
const CONTINUATION: u8 = 0x80;

/// Collects decisions during encoding.
#[derive(Debug, Default)]
pub struct DecisionWriter {
    bytes: Vec<u8>,
    bits: usize,
}

impl DecisionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, substituted: bool) {
        if self.bits % DATA_BITS == 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last |= CONTINUATION;
            }
            self.bytes.push(0);
        }
        if substituted {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << (self.bits % DATA_BITS);
            }
        }
        self.bits += 1;
    }

    /// Decisions pushed so far, terminator excluded.
    pub fn len(&self) -> usize {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Append the terminator and return the packed stream.
    pub fn finish(mut self) -> Vec<u8> {
        self.push(true);
        self.bytes
    }

    /// Packed length, in bytes, of a stream holding `decisions` decisions.
    pub fn packed_len(decisions: usize) -> usize {
        (decisions + 1).div_ceil(DATA_BITS)
    }
}

/// Replays decisions during decoding.
#[derive(Debug)]
pub struct DecisionReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DecisionReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Split the stream off the front of `input`. Returns the reader and
    /// the bytes that follow the stream.
    pub fn split(input: &'a [u8]) -> Result<(Self, &'a [u8])> {
        let last = input
            .iter()
            .position(|b| b & CONTINUATION == 0)
            .ok_or_else(|| CompactError::corrupt("unterminated decision stream"))?;
        let (stream, rest) = input.split_at(last + 1);
        Ok((Self::new(stream), rest))
    }

    /// Stream length in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn next_decision(&mut self) -> Result<bool> {
        let byte = self
            .bytes
            .get(self.pos / DATA_BITS)
            .ok_or_else(|| CompactError::corrupt("decision stream exhausted"))?;
        let bit = (byte >> (self.pos % DATA_BITS)) & 1 == 1;
        self.pos += 1;
        Ok(bit)
    }

    /// Decisions consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check the terminator sits right after the last decision, inside the
    /// final byte, followed only by zero padding.
    pub fn finish(mut self) -> Result<()> {
        let terminator_at = self.pos;
        if !self.next_decision()? {
            return Err(CompactError::corrupt(format!(
                "missing terminator after {terminator_at} decisions"
            )));
        }
        let byte_index = terminator_at / DATA_BITS;
        if byte_index + 1 != self.bytes.len() {
            return Err(CompactError::corrupt(format!(
                "terminator in byte {byte_index} of a {}-byte stream",
                self.bytes.len()
            )));
        }
        let last = self.bytes[byte_index];
        if last & CONTINUATION != 0 {
            return Err(CompactError::corrupt("continuation flag on final stream byte"));
        }
        if (last & DATA_MASK) >> (terminator_at % DATA_BITS + 1) != 0 {
            return Err(CompactError::corrupt("non-zero bits after terminator"));
        }
        Ok(())
    }
}
