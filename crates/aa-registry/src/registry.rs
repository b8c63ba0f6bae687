//! Append-only address registry.

use std::collections::HashMap;

use aa_core::{CompactError, Result};
use alloy_primitives::Address;

use crate::snapshot::{RegistryEntry, RegistrySnapshot};

/// Owned, mutable registry. Ids are handed out sequentially from `base`
/// and never change or disappear.
#[derive(Debug, Clone, Default)]
pub struct AddressRegistry {
    base: u32,
    addresses: Vec<Address>,
    ids: HashMap<Address, u32>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::with_base(0)
    }

    pub fn with_base(base: u32) -> Self {
        Self { base, addresses: Vec::new(), ids: HashMap::new() }
    }

    /// Rebuild a registry from a snapshot. Ids in the snapshot must be
    /// contiguous, as a live registry would have produced them.
    pub fn from_snapshot(snapshot: &RegistrySnapshot) -> Result<Self> {
        let base = snapshot.entries().first().map(|e| e.id).unwrap_or(0);
        let mut registry = Self::with_base(base);
        for entry in snapshot.entries() {
            let next = registry.next_id()?;
            if entry.id != next {
                return Err(CompactError::ConflictingEntry { id: entry.id, address: entry.address });
            }
            registry.register(entry.address)?;
        }
        Ok(registry)
    }

    /// Register an address, returning its id. Idempotent.
    pub fn register(&mut self, address: Address) -> Result<u32> {
        if let Some(&id) = self.ids.get(&address) {
            return Ok(id);
        }
        let id = self.next_id()?;
        self.addresses.push(address);
        self.ids.insert(address, id);
        tracing::trace!(id, %address, "registered address");
        Ok(id)
    }

    pub fn resolve(&self, id: u32) -> Result<Address> {
        id.checked_sub(self.base)
            .and_then(|slot| self.addresses.get(slot as usize))
            .copied()
            .ok_or(CompactError::UnknownIndex(id))
    }

    pub fn lookup(&self, address: &Address) -> Option<u32> {
        self.ids.get(address).copied()
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = RegistryEntry> + '_ {
        self.addresses
            .iter()
            .enumerate()
            .map(|(slot, address)| RegistryEntry::new(self.base + slot as u32, *address))
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let entries: Vec<RegistryEntry> = self.iter().collect();
        let by_id = entries.iter().map(|e| (e.id, e.address)).collect();
        let by_address = self.ids.clone();
        RegistrySnapshot::from_parts(entries, by_id, by_address)
    }

    fn next_id(&self) -> Result<u32> {
        u32::try_from(self.addresses.len())
            .ok()
            .and_then(|len| self.base.checked_add(len))
            .ok_or(CompactError::RegistryFull)
    }
}
