//! Byte-level reader and writer for per-action records.

use std::io::{Cursor, Read};

use aa_core::{CompactError, Result};
use alloy_primitives::{Address, Bytes, U256};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::value;

fn truncated(what: &str) -> impl FnOnce(std::io::Error) -> CompactError + '_ {
    move |_| CompactError::corrupt(format!("truncated {what}"))
}

/// Forward cursor over the record section of a blob.
pub struct RecordReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> RecordReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(bytes) }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.cursor.read_u8().map_err(truncated("tag"))
    }

    /// Big-endian registry index of `width` bytes.
    pub fn read_index(&mut self, width: u8) -> Result<u32> {
        let index = self
            .cursor
            .read_uint::<BigEndian>(usize::from(width))
            .map_err(truncated("registry index"))?;
        u32::try_from(index).map_err(|_| CompactError::corrupt("registry index out of range"))
    }

    pub fn read_address(&mut self) -> Result<Address> {
        let mut raw = [0u8; 20];
        self.cursor.read_exact(&mut raw).map_err(truncated("address"))?;
        Ok(Address::from(raw))
    }

    pub fn read_value(&mut self) -> Result<U256> {
        let offset = self.position();
        let (value, consumed) = value::decode(self.cursor.get_ref(), offset)?;
        self.cursor.set_position((offset + consumed) as u64);
        Ok(value)
    }

    /// A length written with the value codec; must fit in what is left.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_value()?;
        if len > U256::from(self.remaining()) {
            return Err(CompactError::corrupt("length exceeds remaining input"));
        }
        Ok(len.as_limbs()[0] as usize)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        let mut buf = vec![0u8; len];
        self.cursor.read_exact(&mut buf).map_err(truncated("call data"))?;
        Ok(Bytes::from(buf))
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }
}

/// Append-only record buffer.
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn write_index(&mut self, index: u32, width: u8) -> Result<()> {
        self.buf.write_uint::<BigEndian>(u64::from(index), usize::from(width))?;
        Ok(())
    }

    pub fn write_address(&mut self, address: &Address) {
        self.buf.extend_from_slice(address.as_slice());
    }

    pub fn write_value(&mut self, value: &U256) {
        value::encode_into(value, &mut self.buf);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
