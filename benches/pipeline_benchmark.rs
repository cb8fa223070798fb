use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

use ark_streams::{
    make_split, CircularBufferFilter, MemoryDevice, MemoryViewDevice,
    SeekOffsetFilter, StreamReader, StreamWriter, ZlibCompressFilter,
    ZlibDecompressFilter,
};

// Modify time limit here
const BENCHMARK_TIME_LIMIT: std::time::Duration =
    std::time::Duration::from_secs(20);

fn generate_random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

fn generate_text_data(size: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut storage = MemoryDevice::new();
    {
        let mut pipeline = make_split(&mut storage) | ZlibCompressFilter::new();
        StreamWriter::new(&mut pipeline)
            .write_all(data)
            .expect("write_all returned an error");
    }
    storage.into_vec()
}

/// Benchmarks reading and writing through stacked filters.
///
/// - `buffered` measures the circular buffer alone.
/// - `deflate` and `inflate` measure zlib streaming through a pipeline.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.measurement_time(BENCHMARK_TIME_LIMIT);

    let inputs = [("small", 1024), ("medium", 65536), ("large", 1048576)];

    for (name, size) in inputs.iter() {
        for (kind, input_data) in [
            ("random", generate_random_data(*size)),
            ("text", generate_text_data(*size)),
        ] {
            let compressed = compress(&input_data);

            let id = format!("buffered:{}:{}", kind, name);
            group.bench_function(id, |b| {
                b.iter(|| {
                    let mut pipeline = MemoryViewDevice::new(black_box(&input_data))
                        | CircularBufferFilter::new(4096)
                            .expect("capacity is not zero");
                    StreamReader::new(&mut pipeline)
                        .read_to_end()
                        .expect("read_to_end returned an error")
                });
            });

            let id = format!("deflate:{}:{}", kind, name);
            group.bench_function(id, |b| {
                b.iter(|| compress(black_box(&input_data)));
            });

            let id = format!("inflate:{}:{}", kind, name);
            group.bench_function(id, |b| {
                b.iter(|| {
                    let mut pipeline = MemoryViewDevice::new(black_box(&compressed))
                        | SeekOffsetFilter::new(0)
                        | ZlibDecompressFilter::new();
                    StreamReader::new(&mut pipeline)
                        .read_to_end()
                        .expect("read_to_end returned an error")
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
