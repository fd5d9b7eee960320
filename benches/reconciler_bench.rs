use chatstream::streaming::{AnswerReconciler, Frame, SseDecoder};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn delta_stream(events: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..events {
        out.extend_from_slice(
            format!("data: {{\"content\":\" token{}\"}}\n", i).as_bytes(),
        );
    }
    out.extend_from_slice(b"data: [DONE]\n");
    out
}

fn snapshot_stream(events: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut answer = String::new();
    for i in 0..events {
        answer.push_str(&format!(" token{}", i));
        out.extend_from_slice(format!("data: {{\"content\":\"{}\"}}\n", answer).as_bytes());
    }
    out.extend_from_slice(b"data: [DONE]\n");
    out
}

fn benchmark_decode(c: &mut Criterion) {
    let data = delta_stream(256);
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("sse_decoder_feed", |b| {
        b.iter(|| {
            let mut dec = SseDecoder::new();
            black_box(dec.feed(black_box(&data)));
        });
    });
    group.finish();
}

fn benchmark_reconcile(c: &mut Criterion) {
    let deltas = delta_stream(256);
    let snapshots = snapshot_stream(256);

    c.bench_function("reconcile_deltas", |b| {
        b.iter(|| {
            let mut dec = SseDecoder::new();
            let mut rec = AnswerReconciler::new();
            for frame in dec.feed(&deltas) {
                if let Some(text) = rec.push(frame) {
                    black_box(text);
                }
            }
        });
    });

    c.bench_function("reconcile_snapshots", |b| {
        b.iter(|| {
            let mut dec = SseDecoder::new();
            let mut rec = AnswerReconciler::new();
            for frame in dec.feed(&snapshots) {
                if let Some(text) = rec.push(frame) {
                    black_box(text);
                }
            }
        });
    });
}

fn benchmark_chunked_feed(c: &mut Criterion) {
    // Same bytes fragmented into transport-sized chunks
    let data = delta_stream(256);
    c.bench_function("sse_decoder_feed_chunked", |b| {
        b.iter(|| {
            let mut dec = SseDecoder::new();
            let mut frames = Vec::new();
            for chunk in data.chunks(64) {
                frames.extend(dec.feed(chunk));
            }
            black_box(Frame::RawTerminator == frames[frames.len() - 1]);
        });
    });
}

criterion_group!(
    benches,
    benchmark_decode,
    benchmark_reconcile,
    benchmark_chunked_feed
);
criterion_main!(benches);
