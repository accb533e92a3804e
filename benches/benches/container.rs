//! Box scanning and signature detection benchmarks
//!
//! Run with: cargo bench --bench container

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jxl_headers::{find_box, sniff, BoxType, Container, JxlBox, CONTAINER_SIGNATURE};

/// A container with `filler` unknown boxes ahead of the Exif box
fn create_container(filler: usize) -> Vec<u8> {
    let mut container = Container::with_codestream(vec![0xFF, 0x0A, 0, 0, 0, 0, 0, 0]);
    for i in 0..filler {
        container.push(JxlBox::new(BoxType::Unknown(*b"free"), vec![i as u8; 64]));
    }
    container.push(JxlBox::exif(b"II*\0\x08\0\0\0\0\0"));
    container.to_vec().unwrap()
}

fn bench_find_box(c: &mut Criterion) {
    let mut group = c.benchmark_group("Find Exif Box");

    for &filler in &[0usize, 16, 256, 4096] {
        let data = create_container(filler);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(filler), &data, |b, data| {
            b.iter(|| find_box(black_box(data), b"Exif", CONTAINER_SIGNATURE.len()).unwrap())
        });
    }

    group.finish();
}

fn bench_sniff(c: &mut Criterion) {
    let container = create_container(0);
    let codestream = [0xFF, 0x0A, 0xFA, 0x12];
    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    c.bench_function("sniff container", |b| b.iter(|| sniff(black_box(&container[..12]))));
    c.bench_function("sniff codestream", |b| b.iter(|| sniff(black_box(&codestream[..]))));
    c.bench_function("sniff other", |b| b.iter(|| sniff(black_box(&png[..]))));
}

criterion_group!(benches, bench_find_box, bench_sniff);
criterion_main!(benches);
