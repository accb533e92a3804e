//! Metadata extraction and encode resolution benchmarks
//!
//! Run with: cargo bench --bench metadata

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jxl_core::*;
use jxl_headers::{BoxType, Container, JxlBox};
use jxl_plugin::metadata::{collect_encode_metadata, read_container_metadata};
use jxl_plugin::options::resolve_config;
use jxl_plugin::SaveOptions;

fn create_tagged_container() -> Vec<u8> {
    let mut tiff = b"MM\0*\0\0\0\x08".to_vec();
    tiff.resize(4096, 0);
    let mut container = Container::with_codestream(vec![0xFF, 0x0A, 0, 0]);
    container.push(JxlBox::exif(&tiff));
    container.push(JxlBox::new(BoxType::Xml, vec![b'x'; 8192]));
    container.push(JxlBox::new(BoxType::Jumbf, vec![0; 1024]));
    container.to_vec().unwrap()
}

fn bench_read_metadata(c: &mut Criterion) {
    let data = create_tagged_container();
    c.bench_function("read container metadata", |b| {
        b.iter(|| read_container_metadata(black_box(&data)).unwrap())
    });
}

fn bench_resolve(c: &mut Criterion) {
    let mut metadata = MetadataBundle::new();
    metadata.exif = Some(b"Exif\0\0II*\0".to_vec());
    let image = HostImage::new(HostPixelMode::RGB, 64, 64, vec![0; 64 * 64 * 3])
        .unwrap()
        .with_metadata(metadata);
    let options = SaveOptions::new().quality(80.0).effort(5).xmp(b"<x/>".to_vec());

    c.bench_function("resolve encode settings", |b| {
        b.iter(|| {
            let bundle = collect_encode_metadata(black_box(&image), black_box(&options)).unwrap();
            resolve_config(&options, &bundle).unwrap()
        })
    });
}

criterion_group!(benches, bench_read_metadata, bench_resolve);
criterion_main!(benches);
