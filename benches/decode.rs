use ble_midi_decoder::BleMidiDecoder;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

/// BLE notification payload size used to chunk the stream, matching the
/// default ATT MTU minus overhead.
const CHUNK_SIZE: usize = 20;

/// Builds a valid BLE-MIDI stream of `events` note events, with a
/// running-status pair after every note and a short sysex every 16 events.
fn build_stream(events: usize) -> Vec<u8> {
    let mut stream = Vec::new();
    for i in 0..events {
        let note = 0x10 + (i % 0x60) as u8;
        stream.extend_from_slice(&[0x80, 0x80, 0x90, note, 0x40]);
        stream.extend_from_slice(&[note, 0x30]);
        if i % 16 == 0 {
            stream.extend_from_slice(&[0x81, 0x80, 0xF0, 0x01, 0x02, 0x03, 0xF7]);
        }
    }
    stream
}

fn bench_decode(c: &mut Criterion) {
    let stream = build_stream(1024);

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("mtu_chunks", |b| {
        b.iter(|| {
            let mut decoder = BleMidiDecoder::new();
            let mut messages = 0usize;
            for chunk in stream.chunks(CHUNK_SIZE) {
                messages += decoder.decode(black_box(chunk)).unwrap().len();
            }
            black_box(messages)
        })
    });

    group.bench_function("single_call", |b| {
        b.iter(|| {
            let mut decoder = BleMidiDecoder::new();
            black_box(decoder.decode(black_box(&stream)).unwrap().len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
