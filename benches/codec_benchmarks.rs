//! Benchmarks for transition row encoding and state subset keys.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fsakit::codec::TransitionCodec;
use fsakit::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Rows of `width` symbols where roughly `fill` percent of transitions succeed
fn create_rows(width: usize, fill: u32, count: usize) -> Vec<Vec<StateId>> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|_| {
            (0..width)
                .map(|_| {
                    if rng.gen_range(0..100) < fill {
                        rng.gen_range(1..100_000)
                    } else {
                        0
                    }
                })
                .collect()
        })
        .collect()
}

/// Benchmark: row compression at several densities
fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_compress");

    for fill in [2u32, 25, 90].iter() {
        let rows = create_rows(64, *fill, 1000);
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(fill), fill, |b, _| {
            let mut codec = TransitionCodec::new(64);
            b.iter(|| {
                let mut total = 0;
                for row in &rows {
                    total += codec.compress(black_box(row)).len();
                }
                black_box(total);
            });
        });
    }
    group.finish();
}

/// Benchmark: full row decoding versus single transition lookup
fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_decompress");

    for fill in [2u32, 25, 90].iter() {
        let rows = create_rows(64, *fill, 1000);
        let mut codec = TransitionCodec::new(64);
        let encoded: Vec<Vec<u8>> = rows.iter().map(|r| codec.compress(r).to_vec()).collect();
        group.throughput(Throughput::Elements(encoded.len() as u64));

        group.bench_with_input(BenchmarkId::new("row", fill), fill, |b, _| {
            let mut out = vec![0; 64];
            b.iter(|| {
                for data in &encoded {
                    codec.decompress(black_box(data), &mut out);
                }
                black_box(&out);
            });
        });
        group.bench_with_input(BenchmarkId::new("new_state", fill), fill, |b, _| {
            b.iter(|| {
                let mut sum = 0u64;
                for data in &encoded {
                    sum += codec.new_state(black_box(data), 37) as u64;
                }
                black_box(sum);
            });
        });
    }
    group.finish();
}

/// Benchmark: packing subsets as builder keys
fn bench_subset_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("subset_pack");
    let mut rng = StdRng::seed_from_u64(11);

    for members in [4usize, 64, 1024].iter() {
        let universe = 4096;
        let set = StateSubset::from_states(
            universe,
            (0..*members).map(|_| rng.gen_range(1..universe as StateId)),
        );
        group.bench_with_input(BenchmarkId::from_parameter(members), members, |b, _| {
            let mut key = Vec::new();
            b.iter(|| {
                black_box(&set).pack(&mut key);
                black_box(StateSubset::unpack(universe, &key));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress, bench_subset_pack);
criterion_main!(benches);
