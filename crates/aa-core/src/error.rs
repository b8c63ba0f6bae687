use alloy_primitives::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompactError {
    #[error("Too many actions: {count} exceeds the maximum of {max}")]
    TooManyActions { count: usize, max: usize },
    #[error("Unknown registry index: {0}")]
    UnknownIndex(u32),
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),
    #[error("Conflicting registry entry: id {id} -> {address}")]
    ConflictingEntry { id: u32, address: Address },
    #[error("Registry is full")]
    RegistryFull,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompactError {
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptStream(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, CompactError>;
