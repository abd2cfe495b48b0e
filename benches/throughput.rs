use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use tpaq::compress;

fn bench_compress(c: &mut Criterion) {
    let text: Vec<u8> = b"it was the best of times, it was the worst of times. "
        .iter()
        .copied()
        .cycle()
        .take(1 << 16)
        .collect();
    let sawtooth: Vec<u8> = (0u32..1 << 16).map(|i| (i * 7 & 0xFF) as u8).collect();

    let mut group = c.benchmark_group("compress");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("text_64k", |b| {
        b.iter(|| compress(black_box(&text)).unwrap());
    });
    group.bench_function("sawtooth_64k", |b| {
        b.iter(|| compress(black_box(&sawtooth)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_compress);
criterion_main!(benches);
