//! Benchmark – bulk conversions and `runecodec::StreamDecoder`
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use runecodec::{
    CodecOptions, MAX_SEQUENCE_LEN, StreamDecoder, encode_one, from_runes, to_runes, to_utf16,
};

/// Deterministic text of exactly `target_len` bytes cycling through one-,
/// two-, three- and four-byte sequences.
fn make_payload(target_len: usize) -> Vec<u8> {
    const SAMPLE: &str = "plain ascii, κόσμε, 漢字かな, 😀🜁 ";
    let mut out = Vec::with_capacity(target_len + 4);
    while out.len() < target_len {
        out.extend_from_slice(SAMPLE.as_bytes());
    }
    // Cut back to a sequence boundary so the payload stays well formed.
    let mut end = target_len;
    while end > 0 && end < out.len() && (out[end] & 0xC0) == 0x80 {
        end -= 1;
    }
    out.truncate(end);
    out
}

fn run_stream(payload: &[u8], parts: usize) -> usize {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts);

    let mut decoder = StreamDecoder::<u32>::new(CodecOptions::default());
    let mut produced = 0usize;
    for chunk in payload.chunks(chunk_size) {
        decoder.feed(chunk);
        for res in decoder.by_ref() {
            let _ = res.unwrap();
            produced += 1;
        }
    }
    for res in decoder.finish() {
        let _ = res.unwrap();
        produced += 1;
    }
    produced
}

fn bench_bulk(c: &mut Criterion) {
    let payload = make_payload(100_000);
    let runes = to_runes(&payload).unwrap();

    let mut group = c.benchmark_group("bulk");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("to_runes", |b| {
        b.iter(|| black_box(to_runes(black_box(&payload)).unwrap().len()));
    });
    group.bench_function("to_utf16", |b| {
        b.iter(|| black_box(to_utf16(black_box(&payload)).unwrap().len()));
    });
    group.bench_function("from_runes", |b| {
        b.iter(|| black_box(from_runes(black_box(&runes)).unwrap().len()));
    });
    group.bench_function("encode_one", |b| {
        b.iter(|| {
            let mut out = [0u8; MAX_SEQUENCE_LEN];
            let mut written = 0usize;
            for &rune in black_box(&runes) {
                written += encode_one(rune, &mut out).unwrap();
            }
            black_box(written)
        });
    });

    group.finish();
}

fn bench_stream(c: &mut Criterion) {
    let payload = make_payload(100_000);

    let mut group = c.benchmark_group("stream_decoder_split");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for &parts in &[1usize, 100, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter(|| black_box(run_stream(black_box(&payload), parts)));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_bulk, bench_stream
}
criterion_main!(benches);
