//! Benchmarks for anchorlog storage operations

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use tempfile::TempDir;

use anchorlog::Storage;

fn write_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");

    for size in [64usize, 4096, 65536] {
        let data = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("append_{size}b"), |b| {
            let temp_dir = TempDir::new().unwrap();
            let mut store = Storage::open(&temp_dir.path().join("bench.db")).unwrap();

            b.iter(|| store.write(&data).unwrap());
        });
    }

    group.finish();
}

fn read_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");

    for size in [64usize, 4096, 65536] {
        let data = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("read_{size}b"), |b| {
            let temp_dir = TempDir::new().unwrap();
            let mut store = Storage::open(&temp_dir.path().join("bench.db")).unwrap();
            let address = store.write(&data).unwrap();
            store.commit_root_address(address).unwrap();

            b.iter(|| store.read(address).unwrap());
        });
    }

    group.finish();
}

fn commit_benchmarks(c: &mut Criterion) {
    c.bench_function("commit_root_address", |b| {
        let temp_dir = TempDir::new().unwrap();
        let mut store = Storage::open(&temp_dir.path().join("bench.db")).unwrap();
        let address = store.write(b"root record").unwrap();

        b.iter_batched(
            || address,
            |address| store.commit_root_address(address).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, write_benchmarks, read_benchmarks, commit_benchmarks);
criterion_main!(benches);
