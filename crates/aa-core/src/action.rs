use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A single call in a batch: target, native value and call data.
///
/// Batches are plain `Vec<Action>`; order is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    to: Address,
    value: U256,
    data: Bytes,
}

impl Action {
    pub fn new(to: Address, value: U256, data: impl Into<Bytes>) -> Self {
        Self { to, value, data: data.into() }
    }

    /// A call carrying no native value.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self::new(to, U256::ZERO, data)
    }

    pub fn to(&self) -> Address {
        self.to
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size of the naive encoding: address, 32-byte value word, call data.
    pub fn raw_len(&self) -> usize {
        20 + 32 + self.data.len()
    }
}
