//! Criterion benchmarks for the packet codec
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use market_packet::{text, PacketGenerator, PacketProcessor, Trade};
use std::io;

/// Sink that discards everything, so benches measure the codec rather
/// than an allocator.
struct NullSink;

impl io::Write for NullSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn bench_generate(c: &mut Criterion) {
    c.bench_function("generate_100_packets_cap_64", |b| {
        b.iter(|| {
            let mut generator = PacketGenerator::new(NullSink, black_box(42));
            generator.initialize();
            generator
                .generate_packets(black_box(100), black_box(64))
                .unwrap();
        });
    });
}

fn bench_process(c: &mut Criterion) {
    let mut wire = Vec::new();
    let mut generator = PacketGenerator::new(&mut wire, 42);
    generator.initialize();
    generator.generate_packets(100, 64).unwrap();

    c.bench_function("process_100_packets_cap_64", |b| {
        b.iter(|| {
            let mut processor = PacketProcessor::new(black_box(wire.as_slice()), NullSink);
            processor.initialize();
            processor.process_next_packet(Some(100)).unwrap();
        });
    });
}

fn bench_trade_line(c: &mut Criterion) {
    let trade = Trade {
        symbol: *b"ABCDE",
        size: 12,
        price: 5235,
    };

    c.bench_function("trade_line", |b| {
        b.iter(|| {
            let line = text::trade_line(black_box(&trade));
            black_box(line);
        });
    });
}

criterion_group!(benches, bench_generate, bench_process, bench_trade_line);
criterion_main!(benches);
