use criterion::{black_box, criterion_group, criterion_main, Criterion};
use specbode::{analyze, Profile, RunConfig, SpectralEstimator};
use std::f64::consts::PI;

fn signal(len: usize, sample_rate: f64) -> Vec<f64> {
    (0..len)
        .map(|n| {
            let t = n as f64 / sample_rate;
            (2.0 * PI * 1000.0 * t).sin() + 0.1 * (2.0 * PI * 9000.0 * t).sin()
        })
        .collect()
}

fn bench_spectrogram(c: &mut Criterion) {
    let config = RunConfig::from_profile(Profile::Standard);
    let samples = signal(480_000, config.analysis.sample_rate());

    c.bench_function("spectrogram_10s_48k", |b| {
        let mut estimator = SpectralEstimator::new(config.analysis, config.window).unwrap();
        b.iter(|| estimator.estimate(black_box(&samples)).unwrap())
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let config = RunConfig::from_profile(Profile::Bass);
    let a = signal(960_000, config.analysis.sample_rate());
    let b: Vec<f64> = a.iter().map(|x| 0.5 * x).collect();

    c.bench_function("analyze_10s_96k", |bench| {
        bench.iter(|| analyze(black_box(&a), black_box(&b), &config).unwrap())
    });
}

criterion_group!(benches, bench_spectrogram, bench_pipeline);
criterion_main!(benches);
