//! Compactor: batch of actions <-> compressed blob.
//!
//! Blob layout: `[count: u8][decision stream][records]`, one record per
//! action:
//!
//! ```text
//! to · tag · [native value] · slot addresses · [amount] · [len · call data]
//! ```
//!
//! Every address field is a registry index when its decision bit is set,
//! otherwise the raw 20 bytes. The tag's high bit marks a non-zero native
//! value. The decision stream delimits itself, so decoding is one pass.

use std::collections::HashMap;

use aa_core::{Action, CodecConfig, CompactError, Result};
use aa_registry::RegistrySnapshot;
use alloy_primitives::{Address, U256};

use crate::bitstream::{DecisionReader, DecisionWriter};
use crate::cursor::{RecordReader, RecordWriter};
use crate::selector::{Call, SelectorTag};

/// Capacity of the one-byte action count.
pub const MAX_ACTIONS: usize = u8::MAX as usize;

const NATIVE_VALUE_FLAG: u8 = 0x80;
const MAX_SLOTS: usize = 2;

/// Statistics for one compression run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressionStats {
    pub actions: usize,
    pub original_len: usize,
    pub compressed_len: usize,
    pub substituted: usize,
    pub raw: usize,
    pub tags: HashMap<SelectorTag, usize>,
}

impl CompressionStats {
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 {
            return 1.0;
        }
        self.compressed_len as f64 / self.original_len as f64
    }

    pub fn reduction_pct(&self) -> f64 {
        if self.original_len == 0 {
            return 0.0;
        }
        (1.0 - self.ratio()) * 100.0
    }

    pub fn tag_count(&self, tag: SelectorTag) -> usize {
        self.tags.get(&tag).copied().unwrap_or(0)
    }
}

/// Stateless encoder/decoder. All state lives in the snapshot the caller
/// passes to each call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compactor {
    config: CodecConfig,
}

impl Compactor {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn compress(&self, actions: &[Action], snapshot: &RegistrySnapshot) -> Result<Vec<u8>> {
        let (blob, _) = self.compress_with_stats(actions, snapshot)?;
        Ok(blob)
    }

    pub fn compress_with_stats(
        &self,
        actions: &[Action],
        snapshot: &RegistrySnapshot,
    ) -> Result<(Vec<u8>, CompressionStats)> {
        if actions.len() > MAX_ACTIONS {
            return Err(CompactError::TooManyActions {
                count: actions.len(),
                max: MAX_ACTIONS,
            });
        }

        let mut encoder = Encoder::new(&self.config, snapshot);
        for action in actions {
            encoder.action(action)?;
        }
        let (blob, stats) = encoder.finish();

        tracing::debug!(
            actions = stats.actions,
            original = stats.original_len,
            compressed = stats.compressed_len,
            substituted = stats.substituted,
            raw = stats.raw,
            "compressed batch"
        );
        Ok((blob, stats))
    }

    /// Inverse of [`compress`](Self::compress). The snapshot must match the
    /// one used to encode.
    pub fn decompress(&self, blob: &[u8], snapshot: &RegistrySnapshot) -> Result<Vec<Action>> {
        let (&count, rest) = blob
            .split_first()
            .ok_or_else(|| CompactError::corrupt("empty input"))?;
        let (decisions, records) = DecisionReader::split(rest)?;
        let stream_len = decisions.byte_len();

        let mut decoder = Decoder {
            config: &self.config,
            snapshot,
            decisions,
            records: RecordReader::new(records),
        };
        let mut actions = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            actions.push(decoder.action()?);
        }
        decoder.finish()?;

        tracing::debug!(
            actions = actions.len(),
            bytes = blob.len(),
            stream_len,
            "decompressed batch"
        );
        Ok(actions)
    }
}

struct Encoder<'a> {
    config: &'a CodecConfig,
    snapshot: &'a RegistrySnapshot,
    decisions: DecisionWriter,
    records: RecordWriter,
    stats: CompressionStats,
}

impl<'a> Encoder<'a> {
    fn new(config: &'a CodecConfig, snapshot: &'a RegistrySnapshot) -> Self {
        Self {
            config,
            snapshot,
            decisions: DecisionWriter::new(),
            records: RecordWriter::new(),
            stats: CompressionStats::default(),
        }
    }

    fn action(&mut self, action: &Action) -> Result<()> {
        let call = Call::parse(action.data());
        let tag = call.tag();
        *self.stats.tags.entry(tag).or_insert(0) += 1;
        self.stats.actions += 1;
        self.stats.original_len += action.raw_len();

        self.address(&action.to())?;

        let native = action.value();
        if native.is_zero() {
            self.records.write_u8(tag.as_byte());
        } else {
            self.records.write_u8(tag.as_byte() | NATIVE_VALUE_FLAG);
            self.records.write_value(&native);
        }

        for address in call.addresses() {
            self.address(&address)?;
        }
        if let Some(amount) = call.amount() {
            self.records.write_value(&amount);
        }
        if let Call::Generic(data) = &call {
            self.records.write_value(&U256::from(data.len()));
            self.records.write_bytes(data);
        }
        Ok(())
    }

    /// Substitute only when the id fits the configured index width.
    fn address(&mut self, address: &Address) -> Result<()> {
        let max_index = self.config.max_index();
        match self.snapshot.lookup(address).filter(|id| *id <= max_index) {
            Some(id) => {
                self.decisions.push(true);
                self.records.write_index(id, self.config.index_width)?;
                self.stats.substituted += 1;
            }
            None => {
                self.decisions.push(false);
                self.records.write_address(address);
                self.stats.raw += 1;
            }
        }
        Ok(())
    }

    fn finish(self) -> (Vec<u8>, CompressionStats) {
        let stream = self.decisions.finish();
        let records = self.records.into_inner();
        let mut blob = Vec::with_capacity(1 + stream.len() + records.len());
        blob.push(self.stats.actions as u8);
        blob.extend_from_slice(&stream);
        blob.extend_from_slice(&records);

        let mut stats = self.stats;
        stats.compressed_len = blob.len();
        (blob, stats)
    }
}

struct Decoder<'a> {
    config: &'a CodecConfig,
    snapshot: &'a RegistrySnapshot,
    decisions: DecisionReader<'a>,
    records: RecordReader<'a>,
}

impl Decoder<'_> {
    fn action(&mut self) -> Result<Action> {
        let to = self.address()?;

        let tag_byte = self.records.read_u8()?;
        let Some(tag) = SelectorTag::from_byte(tag_byte & !NATIVE_VALUE_FLAG) else {
            return Err(CompactError::corrupt(format!("unknown selector tag {tag_byte:#04x}")));
        };
        let native = if tag_byte & NATIVE_VALUE_FLAG == 0 {
            U256::ZERO
        } else {
            let value = self.records.read_value()?;
            if value.is_zero() {
                return Err(CompactError::corrupt("native value flag set for zero value"));
            }
            value
        };

        let data = if tag == SelectorTag::Generic {
            let len = self.records.read_len()?;
            self.records.read_bytes(len)?
        } else {
            let mut slots = [Address::ZERO; MAX_SLOTS];
            let slots = &mut slots[..tag.address_slots()];
            for slot in slots.iter_mut() {
                *slot = self.address()?;
            }
            let amount = if tag.has_amount() {
                Some(self.records.read_value()?)
            } else {
                None
            };
            Call::from_parts(tag, slots, amount)?.encode()
        };

        Ok(Action::new(to, native, data))
    }

    fn address(&mut self) -> Result<Address> {
        if self.decisions.next_decision()? {
            let id = self.records.read_index(self.config.index_width)?;
            self.snapshot.resolve(id)
        } else {
            self.records.read_address()
        }
    }

    fn finish(self) -> Result<()> {
        self.decisions.finish()?;
        if !self.records.is_at_end() {
            return Err(CompactError::corrupt(format!(
                "{} trailing bytes after last record",
                self.records.remaining()
            )));
        }
        Ok(())
    }
}
