//! Address registry: assigns small stable ids to frequently used addresses
//! so the compactor can substitute them for the full 20 bytes.
//!
//! - [`AddressRegistry`]: owned, append-only registry
//! - [`SharedRegistry`]: single-writer / multi-reader wrapper
//! - [`RegistrySnapshot`]: immutable view handed to encoder and decoder

pub mod registry;
pub mod shared;
pub mod snapshot;

pub use registry::AddressRegistry;
pub use shared::SharedRegistry;
pub use snapshot::{RegistryEntry, RegistrySnapshot};

#[cfg(test)]
mod tests;
