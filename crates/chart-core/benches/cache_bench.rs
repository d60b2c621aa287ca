use chart_core::transport::{Channel, Envelope, Reply};
use chart_core::{
    CacheConfig, CodecRegistry, DataRequest, Record, SeriesCache, SeriesStore, TransportAdapter, TransportError,
};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

const PERIOD: i64 = 60;

struct Sink;

impl Channel for Sink {
    fn send(&mut self, _envelope: Envelope) -> Result<(), TransportError> { Ok(()) }
    fn poll(&mut self) -> Option<Reply> { None }
}

fn gen_ohlcv(n: usize) -> Vec<Record> {
    let mut v = Vec::with_capacity(n);
    let mut price = 100.0f64;
    for i in 0..n {
        let o = price;
        let c = o + if i % 3 == 0 { -0.4 } else { 0.3 };
        price = c;
        v.push(Record::try_ohlcv(i as i64 * PERIOD, o, o.max(c) + 1.0, o.min(c) - 1.0, c, 1000.0).unwrap());
    }
    v
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_merge");
    for &n in &[10_000usize, 100_000usize] {
        let data = gen_ohlcv(n);
        group.bench_with_input(BenchmarkId::from_parameter(format!("n{n}")), &n, |b, _| {
            b.iter_batched(
                || data.clone(),
                |d| {
                    let mut store = SeriesStore::new();
                    black_box(store.merge(d));
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_extrema(c: &mut Criterion) {
    let mut cache = SeriesCache::new(TransportAdapter::new(Sink, CodecRegistry::with_defaults()), CacheConfig::default());
    let n = 100_000usize;
    let full = DataRequest::new("X", "OHLCV", PERIOD, 0, n as i64 * PERIOD);
    cache.merge(&full.key(), gen_ohlcv(n));

    let mut group = c.benchmark_group("extrema");
    for &bars in &[200i64, 2_000, 20_000] {
        let req = full.with_range(10_000 * PERIOD, (10_000 + bars) * PERIOD);
        group.bench_with_input(BenchmarkId::from_parameter(format!("bars{bars}")), &req, |b, req| {
            b.iter(|| {
                let lo = cache.get_min(req, &["open", "high", "low", "close"]);
                let hi = cache.get_max(req, &["open", "high", "low", "close"]);
                black_box((lo, hi))
            });
        });
    }
    group.finish();
}

fn bench_covered_get_data(c: &mut Criterion) {
    let mut cache = SeriesCache::new(TransportAdapter::new(Sink, CodecRegistry::with_defaults()), CacheConfig::default());
    let req = DataRequest::new("X", "OHLCV", PERIOD, 1_000 * PERIOD, 1_200 * PERIOD);
    cache.get_data(&req, None);
    c.bench_function("get_data_hit", |b| {
        b.iter(|| black_box(cache.get_data(black_box(&req), None).len()));
    });
}

criterion_group!(benches, bench_merge, bench_extrema, bench_covered_get_data);
criterion_main!(benches);
