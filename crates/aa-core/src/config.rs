use serde::{Deserialize, Serialize};

use crate::error::{CompactError, Result};

/// Widest registry index the wire format supports, in bytes.
pub const MAX_INDEX_WIDTH: u8 = 4;

/// Codec parameters. Encoder and decoder must agree on them, the same way
/// they must agree on the registry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Width of a registry index on the wire, in bytes (1..=4).
    pub index_width: u8,
}

impl CodecConfig {
    pub fn new(index_width: u8) -> Result<Self> {
        let config = Self { index_width };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_width == 0 || self.index_width > MAX_INDEX_WIDTH {
            return Err(CompactError::InvalidConfig(format!(
                "index_width must be in 1..={MAX_INDEX_WIDTH}, got {}",
                self.index_width
            )));
        }
        Ok(())
    }

    /// Load from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Largest registry id addressable at this width.
    pub fn max_index(&self) -> u32 {
        match self.index_width {
            w if w >= MAX_INDEX_WIDTH => u32::MAX,
            w => (1u32 << (8 * u32::from(w))) - 1,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self { index_width: 2 }
    }
}
