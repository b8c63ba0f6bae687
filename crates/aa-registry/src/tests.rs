use crate::*;
use aa_core::CompactError;
use alloy_primitives::{address, Address};
use std::thread;

fn addr(n: u8) -> Address {
    Address::repeat_byte(n)
}

// ========== AddressRegistry ==========

#[test]
fn test_register_sequential_ids() {
    let mut reg = AddressRegistry::new();
    assert_eq!(reg.register(addr(1)).unwrap(), 0);
    assert_eq!(reg.register(addr(2)).unwrap(), 1);
    assert_eq!(reg.register(addr(3)).unwrap(), 2);
    assert_eq!(reg.len(), 3);
}

#[test]
fn test_register_idempotent() {
    let mut reg = AddressRegistry::new();
    let first = reg.register(addr(7)).unwrap();
    let second = reg.register(addr(7)).unwrap();
    assert_eq!(first, second);
    assert_eq!(reg.len(), 1);
}

#[test]
fn test_register_with_base() {
    let mut reg = AddressRegistry::with_base(100);
    assert_eq!(reg.register(addr(1)).unwrap(), 100);
    assert_eq!(reg.register(addr(2)).unwrap(), 101);
    assert_eq!(reg.resolve(101).unwrap(), addr(2));
    assert!(matches!(reg.resolve(99), Err(CompactError::UnknownIndex(99))));
}

#[test]
fn test_resolve_unknown() {
    let reg = AddressRegistry::new();
    assert!(matches!(reg.resolve(0), Err(CompactError::UnknownIndex(0))));
}

#[test]
fn test_lookup_does_not_mutate() {
    let mut reg = AddressRegistry::new();
    reg.register(addr(1)).unwrap();
    assert_eq!(reg.lookup(&addr(1)), Some(0));
    assert_eq!(reg.lookup(&addr(2)), None);
    assert_eq!(reg.len(), 1);
}

#[test]
fn test_registry_full() {
    let mut reg = AddressRegistry::with_base(u32::MAX);
    assert_eq!(reg.register(addr(1)).unwrap(), u32::MAX);
    assert!(matches!(reg.register(addr(2)), Err(CompactError::RegistryFull)));
    // Known addresses still resolve to their id.
    assert_eq!(reg.register(addr(1)).unwrap(), u32::MAX);
}

#[test]
fn test_iter_in_id_order() {
    let mut reg = AddressRegistry::with_base(5);
    reg.register(addr(9)).unwrap();
    reg.register(addr(4)).unwrap();
    let entries: Vec<RegistryEntry> = reg.iter().collect();
    assert_eq!(entries, vec![RegistryEntry::new(5, addr(9)), RegistryEntry::new(6, addr(4))]);
}

// ========== RegistrySnapshot ==========

#[test]
fn test_snapshot_matches_registry() {
    let mut reg = AddressRegistry::new();
    for n in 1..=10 {
        reg.register(addr(n)).unwrap();
    }
    let snap = reg.snapshot();
    assert_eq!(snap.len(), 10);
    for n in 1..=10u8 {
        let id = reg.lookup(&addr(n)).unwrap();
        assert_eq!(snap.lookup(&addr(n)), Some(id));
        assert_eq!(snap.resolve(id).unwrap(), addr(n));
    }
}

#[test]
fn test_snapshot_is_frozen() {
    let mut reg = AddressRegistry::new();
    reg.register(addr(1)).unwrap();
    let snap = reg.snapshot();
    reg.register(addr(2)).unwrap();
    assert_eq!(snap.len(), 1);
    assert!(!snap.contains(&addr(2)));
}

#[test]
fn test_snapshot_from_entries_sorts() {
    let snap = RegistrySnapshot::from_entries(vec![
        RegistryEntry::new(3, addr(3)),
        RegistryEntry::new(1, addr(1)),
    ])
    .unwrap();
    let ids: Vec<u32> = snap.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_snapshot_rejects_duplicate_id() {
    let result = RegistrySnapshot::from_entries(vec![
        RegistryEntry::new(1, addr(1)),
        RegistryEntry::new(1, addr(2)),
    ]);
    assert!(matches!(result, Err(CompactError::ConflictingEntry { id: 1, .. })));
}

#[test]
fn test_snapshot_rejects_duplicate_address() {
    let result = RegistrySnapshot::from_entries(vec![
        RegistryEntry::new(1, addr(1)),
        RegistryEntry::new(2, addr(1)),
    ]);
    assert!(matches!(result, Err(CompactError::ConflictingEntry { .. })));
}

#[test]
fn test_snapshot_empty() {
    let snap = RegistrySnapshot::new();
    assert!(snap.is_empty());
    assert_eq!(snap.lookup(&addr(1)), None);
    assert!(matches!(snap.resolve(0), Err(CompactError::UnknownIndex(0))));
}

#[test]
fn test_snapshot_json_roundtrip() {
    let mut reg = AddressRegistry::new();
    reg.register(address!("0xdAC17F958D2ee523a2206206994597C13D831ec7")).unwrap();
    reg.register(address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")).unwrap();
    let snap = reg.snapshot();
    let json = snap.to_json().unwrap();
    assert!(json.contains("entries"));
    let back = RegistrySnapshot::from_json(&json).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn test_snapshot_json_rejects_conflicts() {
    let json = format!(
        r#"{{"entries":[{{"id":0,"address":"{a}"}},{{"id":0,"address":"{b}"}}]}}"#,
        a = addr(1),
        b = addr(2),
    );
    assert!(matches!(RegistrySnapshot::from_json(&json), Err(CompactError::Serialization(_))));
}

#[test]
fn test_snapshot_save_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("registry.json");
    let mut reg = AddressRegistry::with_base(1);
    for n in 1..=5 {
        reg.register(addr(n)).unwrap();
    }
    let snap = reg.snapshot();
    snap.save(&path).unwrap();
    let loaded = RegistrySnapshot::load(&path).unwrap();
    assert_eq!(loaded, snap);
    assert_eq!(loaded.resolve(1).unwrap(), addr(1));
}

#[test]
fn test_snapshot_load_missing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = RegistrySnapshot::load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(CompactError::Io(_))));
}

#[test]
fn test_registry_from_snapshot() {
    let mut reg = AddressRegistry::with_base(10);
    reg.register(addr(1)).unwrap();
    reg.register(addr(2)).unwrap();
    let mut rebuilt = AddressRegistry::from_snapshot(&reg.snapshot()).unwrap();
    assert_eq!(rebuilt.base(), 10);
    assert_eq!(rebuilt.register(addr(2)).unwrap(), 11);
    assert_eq!(rebuilt.register(addr(3)).unwrap(), 12);
}

#[test]
fn test_registry_from_sparse_snapshot_fails() {
    let snap = RegistrySnapshot::from_entries(vec![
        RegistryEntry::new(0, addr(1)),
        RegistryEntry::new(5, addr(2)),
    ])
    .unwrap();
    assert!(matches!(
        AddressRegistry::from_snapshot(&snap),
        Err(CompactError::ConflictingEntry { id: 5, .. })
    ));
}

// ========== SharedRegistry ==========

#[test]
fn test_shared_clones_share_state() {
    let shared = SharedRegistry::default();
    let other = shared.clone();
    let id = shared.register(addr(1)).unwrap();
    assert_eq!(other.lookup(&addr(1)), Some(id));
    assert_eq!(other.resolve(id).unwrap(), addr(1));
    assert_eq!(other.len(), 1);
}

#[test]
fn test_shared_register_all() {
    let shared = SharedRegistry::new(AddressRegistry::new());
    let ids = shared.register_all(vec![addr(1), addr(2), addr(1)]).unwrap();
    assert_eq!(ids, vec![0, 1, 0]);
    assert_eq!(shared.len(), 2);
}

#[test]
fn test_shared_concurrent_registration() {
    let shared = SharedRegistry::default();
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let reg = shared.clone();
            let offset = (t % 2) as u8;
            thread::spawn(move || {
                for n in 0..50u8 {
                    reg.register(addr(n + offset)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    // Addresses 0..=50 were each registered by several threads.
    assert_eq!(shared.len(), 51);
    let snap = shared.snapshot();
    let mut ids: Vec<u32> = snap.entries().iter().map(|e| e.id).collect();
    ids.dedup();
    assert_eq!(ids, (0..51).collect::<Vec<u32>>());
    for entry in snap.entries() {
        assert_eq!(shared.lookup(&entry.address), Some(entry.id));
    }
}
