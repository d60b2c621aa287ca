use chart_core::grid::{select_increment, ticks};
use chart_core::{Theme, ValueAxis, ValueAxisConfig, ValueType};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_increment");
    for &(lo, hi) in &[(0.0f64, 1.0f64), (0.0, 1_000.0), (25_000.0, 26_500.0), (0.0, 3.0e7)] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{lo}..{hi}")), &(lo, hi), |b, &(lo, hi)| {
            b.iter(|| {
                let inc = select_increment(black_box(lo), black_box(hi), 400.0, 20.0);
                black_box(ticks(lo, hi, inc.step))
            });
        });
    }
    group.finish();
}

fn bench_axis_draw(c: &mut Criterion) {
    let theme = Theme::dark();
    let mut axis = ValueAxis::new(1024.0, 600.0, 20.0, ValueType::PRICE, &ValueAxisConfig::default());
    axis.set_min_max(25_012.5, 26_487.25);
    c.bench_function("value_axis_draw", |b| {
        b.iter(|| {
            axis.draw(&theme, 60.0);
            black_box(axis.scene().len())
        });
    });
}

criterion_group!(benches, bench_select, bench_axis_draw);
criterion_main!(benches);
