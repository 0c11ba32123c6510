//! CRC-32 throughput benchmarks.
//!
//! Measures the slicing-by-8 implementation across the data sizes that
//! matter for ZIP entries: small (config-sized) files, medium text files,
//! and the point where it switches over from the single-table path.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rezip_core::crc::Crc32;
use std::hint::black_box;

fn text_like(size: usize) -> Vec<u8> {
    let text = b"The quick brown fox jumps over the lazy dog. ";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        let remaining = size - data.len();
        data.extend_from_slice(&text[..remaining.min(text.len())]);
    }
    data
}

fn bench_crc32_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_sizes");

    for (name, size) in [
        ("16B", 16),
        ("256B", 256),
        ("4KB", 4 * 1024),
        ("64KB", 64 * 1024),
        ("1MB", 1024 * 1024),
    ] {
        let data = text_like(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| black_box(Crc32::compute(black_box(data))));
        });
    }

    group.finish();
}

fn bench_slicing_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("slicing_threshold");

    for size in [8, 12, 16, 20, 32, 64, 128] {
        let data = text_like(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("crc32", size), &data, |b, data| {
            b.iter(|| black_box(Crc32::compute(black_box(data))));
        });
    }

    group.finish();
}

fn bench_crc32_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_incremental");

    let size = 64 * 1024;
    let data = text_like(size);

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(
        BenchmarkId::from_parameter("single_shot"),
        &data,
        |b, data| {
            b.iter(|| black_box(Crc32::compute(black_box(data))));
        },
    );

    for chunk_size in [256, 1024, 4096, 16384] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("chunks_{}", chunk_size)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut crc = Crc32::new();
                    for chunk in data.chunks(chunk_size) {
                        crc.update(black_box(chunk));
                    }
                    black_box(crc.clone().finalize());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_crc32_sizes,
    bench_slicing_threshold,
    bench_crc32_incremental,
);
criterion_main!(benches);
