//! Action compactor: bit-exact compression for batches of wallet actions.
//!
//! Components:
//! 1. Selector catalogue: structural compression for token calls
//! 2. Bit-decision stream: one bit per address field, index or raw
//! 3. Value codec: two-byte form for round amounts, wide fallback
//! 4. Compactor: ties the above to a registry snapshot

pub mod bitstream;
pub mod compactor;
pub mod cursor;
pub mod selector;
pub mod value;

pub use compactor::{Compactor, CompressionStats, MAX_ACTIONS};
pub use selector::{classify, Call, SelectorTag};
