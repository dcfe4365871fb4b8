use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dispersion::{DispersionCalculator, DispersionPipeline, PriceSeries, StatisticsSummarizer, split};

/// Roughly `years` of trading days with a drifting, oscillating close
fn daily_closes(years: usize) -> PriceSeries {
    let days = years * 252;
    PriceSeries::from_closes((0..days).map(|i| {
        let t = i as f64;
        150.0 + 0.02 * t + 6.0 * (t / 11.0).sin() + 2.0 * (t / 3.7).cos()
    }))
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for years in [1, 10, 40] {
        let prices = daily_closes(years);
        let pipeline = DispersionPipeline::new(21).unwrap();
        group.bench_with_input(BenchmarkId::new("sma21", years), &prices, |b, prices| {
            b.iter(|| pipeline.run(black_box(prices)).unwrap())
        });
    }
    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let prices = daily_closes(10);
    let calculator = DispersionCalculator::new(100).unwrap();
    let series = calculator.compute(&prices).unwrap();
    let partition = split(&series);
    let summarizer = StatisticsSummarizer::default();

    c.bench_function("compute_sma100_10y", |b| {
        b.iter(|| calculator.compute(black_box(&prices)).unwrap())
    });
    c.bench_function("split_10y", |b| b.iter(|| split(black_box(&series))));
    c.bench_function("summarize_10y", |b| {
        b.iter(|| summarizer.summarize(black_box(&partition)))
    });
}

criterion_group!(benches, bench_pipeline, bench_stages);
criterion_main!(benches);
