//! Compact numeric encoding for amounts.
//!
//! Compact form, two bytes, for `m * 10^e` with `m <= 2047` and `e <= 30`:
//!
//! ```text
//! byte0 = (e + 1) << 3 | (m & 0b111)
//! byte1 = m >> 3
//! ```
//!
//! so `1e18` is `99 00` and `1e16` is `89 00`. A `byte0` whose high five
//! bits are zero is not compact: `00 n <n big-endian bytes>` is the wide
//! form for everything else. Only the canonical encoding of a value is
//! accepted on decode.

use aa_core::{CompactError, Result};
use alloy_primitives::U256;

pub const COMPACT_LEN: usize = 2;
pub const MAX_MANTISSA: u64 = 2047;
pub const MAX_EXPONENT: u32 = 30;

const WIDE_MARKER: u8 = 0x00;
const WORD_LEN: usize = 32;

/// `(mantissa, exponent)` of the compact form, if the value has one.
pub fn compact_parts(value: &U256) -> Option<(u64, u32)> {
    if value.is_zero() {
        return Some((0, 0));
    }
    let ten = U256::from(10u8);
    let mut mantissa = *value;
    let mut exponent = 0u32;
    while (mantissa % ten).is_zero() {
        mantissa /= ten;
        exponent += 1;
    }
    if mantissa > U256::from(MAX_MANTISSA) {
        return None;
    }
    let mut mantissa = mantissa.as_limbs()[0];
    while exponent > MAX_EXPONENT {
        mantissa *= 10;
        if mantissa > MAX_MANTISSA {
            return None;
        }
        exponent -= 1;
    }
    Some((mantissa, exponent))
}

pub fn encode(value: &U256) -> Vec<u8> {
    let mut out = Vec::with_capacity(COMPACT_LEN);
    encode_into(value, &mut out);
    out
}

pub fn encode_into(value: &U256, out: &mut Vec<u8>) {
    match compact_parts(value) {
        Some((mantissa, exponent)) => {
            out.push((((exponent + 1) << 3) as u8) | (mantissa & 0b111) as u8);
            out.push((mantissa >> 3) as u8);
        }
        None => {
            let word = value.to_be_bytes::<WORD_LEN>();
            let skip = word.iter().take_while(|b| **b == 0).count();
            out.push(WIDE_MARKER);
            out.push((WORD_LEN - skip) as u8);
            out.extend_from_slice(&word[skip..]);
        }
    }
}

pub fn encoded_len(value: &U256) -> usize {
    match compact_parts(value) {
        Some(_) => COMPACT_LEN,
        None => COMPACT_LEN + value.byte_len(),
    }
}

/// Decode the value starting at `offset`, returning it with the number of
/// bytes consumed.
pub fn decode(bytes: &[u8], offset: usize) -> Result<(U256, usize)> {
    let header = bytes
        .get(offset..offset + COMPACT_LEN)
        .ok_or_else(|| CompactError::corrupt("truncated value"))?;
    let (b0, b1) = (header[0], header[1]);

    let (value, consumed) = if b0 >> 3 != 0 {
        let exponent = u32::from(b0 >> 3) - 1;
        let mantissa = (u64::from(b1) << 3) | u64::from(b0 & 0b111);
        let ten = U256::from(10u8);
        let value = (0..exponent).fold(U256::from(mantissa), |acc, _| acc * ten);
        (value, COMPACT_LEN)
    } else if b0 == WIDE_MARKER {
        let len = usize::from(b1);
        if len == 0 || len > WORD_LEN {
            return Err(CompactError::corrupt(format!("wide value of {len} bytes")));
        }
        let start = offset + COMPACT_LEN;
        let body = bytes
            .get(start..start + len)
            .ok_or_else(|| CompactError::corrupt("truncated wide value"))?;
        (U256::from_be_slice(body), COMPACT_LEN + len)
    } else {
        return Err(CompactError::corrupt(format!("bad value header {b0:#04x}")));
    };

    if encode(&value) != bytes[offset..offset + consumed] {
        return Err(CompactError::corrupt("non-canonical value encoding"));
    }
    Ok((value, consumed))
}
