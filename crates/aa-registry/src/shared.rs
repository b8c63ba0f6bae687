use std::sync::Arc;

use aa_core::Result;
use alloy_primitives::Address;
use parking_lot::RwLock;

use crate::registry::AddressRegistry;
use crate::snapshot::RegistrySnapshot;

/// Registry shared between threads: one writer at a time, many readers.
/// Clones share the same underlying registry.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<AddressRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: AddressRegistry) -> Self {
        Self { inner: Arc::new(RwLock::new(registry)) }
    }

    pub fn register(&self, address: Address) -> Result<u32> {
        self.inner.write().register(address)
    }

    /// Register many addresses under a single write lock.
    pub fn register_all(&self, addresses: impl IntoIterator<Item = Address>) -> Result<Vec<u32>> {
        let mut registry = self.inner.write();
        addresses.into_iter().map(|a| registry.register(a)).collect()
    }

    pub fn resolve(&self, id: u32) -> Result<Address> {
        self.inner.read().resolve(id)
    }

    pub fn lookup(&self, address: &Address) -> Option<u32> {
        self.inner.read().lookup(address)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.inner.read().snapshot()
    }
}
