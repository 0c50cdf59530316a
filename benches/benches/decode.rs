//! Benchmark suite for the hot decoding paths.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use macrez_benches::{generate_packbits_data, generate_test_pict, sizes};
use macrez_types::rsrc::image::{packbits, pict};

fn bench_packbits(c: &mut Criterion) {
	let mut group = c.benchmark_group("packbits");
	for &len in &[1024usize, 16 * 1024, 256 * 1024] {
		let packed = generate_packbits_data(len);
		group.throughput(Throughput::Bytes(len as u64));
		group.bench_with_input(BenchmarkId::new("unpack", len), &packed, |b, packed| {
			b.iter(|| packbits::unpack_all(black_box(packed), len));
		});
	}
	group.finish();
}

fn bench_pict_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("pict_decode");
	for &size in &[sizes::ICON, sizes::WINDOW, sizes::SCREEN] {
		let data = generate_test_pict(size);
		group.throughput(Throughput::Elements(u64::from(size as u16).pow(2)));
		group.bench_with_input(BenchmarkId::new("decode", size), &data, |b, data| {
			b.iter(|| pict::decode_pict(black_box(data)));
		});
	}
	group.finish();
}

criterion_group!(benches, bench_packbits, bench_pict_decode);
criterion_main!(benches);
