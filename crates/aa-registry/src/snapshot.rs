//! Immutable registry snapshots, the form the codec consumes.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use aa_core::{CompactError, Result};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// One `id -> address` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: u32,
    pub address: Address,
}

impl RegistryEntry {
    pub fn new(id: u32, address: Address) -> Self {
        Self { id, address }
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    entries: Vec<RegistryEntry>,
}

/// A frozen view of the registry, ordered by id.
///
/// Encoder and decoder must be handed equivalent snapshots: indices mean
/// nothing without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotFile", into = "SnapshotFile")]
pub struct RegistrySnapshot {
    entries: Vec<RegistryEntry>,
    by_id: HashMap<u32, Address>,
    by_address: HashMap<Address, u32>,
}

impl RegistrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary entries. Ids and addresses must each be unique.
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Result<Self> {
        let mut entries: Vec<RegistryEntry> = entries.into_iter().collect();
        entries.sort_by_key(|e| e.id);

        let mut by_id = HashMap::with_capacity(entries.len());
        let mut by_address = HashMap::with_capacity(entries.len());
        for entry in &entries {
            if by_id.insert(entry.id, entry.address).is_some()
                || by_address.insert(entry.address, entry.id).is_some()
            {
                return Err(CompactError::ConflictingEntry {
                    id: entry.id,
                    address: entry.address,
                });
            }
        }
        Ok(Self { entries, by_id, by_address })
    }

    /// Assemble from indexes already known to be consistent.
    pub(crate) fn from_parts(
        entries: Vec<RegistryEntry>,
        by_id: HashMap<u32, Address>,
        by_address: HashMap<Address, u32>,
    ) -> Self {
        Self { entries, by_id, by_address }
    }

    pub fn lookup(&self, address: &Address) -> Option<u32> {
        self.by_address.get(address).copied()
    }

    pub fn resolve(&self, id: u32) -> Result<Address> {
        self.by_id.get(&id).copied().ok_or(CompactError::UnknownIndex(id))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.by_address.contains_key(address)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot as JSON, atomically replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(self)?;
        let tmp_path = path.with_extension("tmp");
        let result = (|| -> std::io::Result<()> {
            let mut f = fs::File::create(&tmp_path)?;
            f.write_all(&bytes)?;
            f.sync_all()?;
            fs::rename(&tmp_path, path)
        })();
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        tracing::debug!(path = %path.display(), entries = self.len(), "saved registry snapshot");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let snapshot: Self = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            entries = snapshot.len(),
            "loaded registry snapshot"
        );
        Ok(snapshot)
    }
}

impl TryFrom<SnapshotFile> for RegistrySnapshot {
    type Error = CompactError;

    fn try_from(file: SnapshotFile) -> Result<Self> {
        Self::from_entries(file.entries)
    }
}

impl From<RegistrySnapshot> for SnapshotFile {
    fn from(snapshot: RegistrySnapshot) -> Self {
        Self { entries: snapshot.entries }
    }
}
