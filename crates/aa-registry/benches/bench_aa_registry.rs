use aa_registry::{AddressRegistry, RegistrySnapshot, SharedRegistry};
use alloy_primitives::Address;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

fn random_addresses(n: usize) -> Vec<Address> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| Address::from(rng.gen::<[u8; 20]>())).collect()
}

fn bench_register(c: &mut Criterion) {
    let addrs = random_addresses(10_000);
    c.bench_function("registry_register_10k", |b| {
        b.iter(|| {
            let mut reg = AddressRegistry::new();
            for a in &addrs {
                reg.register(*a).unwrap();
            }
            black_box(reg);
        })
    });

    c.bench_function("shared_register_all_10k", |b| {
        b.iter(|| {
            let shared = SharedRegistry::default();
            black_box(shared.register_all(addrs.iter().copied()).unwrap());
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    let addrs = random_addresses(10_000);
    let mut reg = AddressRegistry::new();
    for a in &addrs {
        reg.register(*a).unwrap();
    }
    let snap = reg.snapshot();
    c.bench_function("snapshot_lookup_10k", |b| {
        b.iter(|| {
            for a in &addrs {
                black_box(snap.lookup(black_box(a)));
            }
        })
    });

    let json = snap.to_json().unwrap();
    c.bench_function("snapshot_from_json_10k", |b| {
        b.iter(|| black_box(RegistrySnapshot::from_json(black_box(&json)).unwrap()))
    });
}

criterion_group!(benches, bench_register, bench_lookup);
criterion_main!(benches);
