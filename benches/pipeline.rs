use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use erp300::{average::evoked, Detector, ThresholdSpec, TrialTensor};
use ndarray::Array3;

fn recording() -> TrialTensor {
    // 120 trials × 1 s @ 240 Hz × 8 channels
    TrialTensor::new(Array3::from_shape_fn((120, 240, 8), |(e, t, c)| {
        ((e * 31 + t * 7 + c) as f64 * 0.013).sin()
    }))
    .unwrap()
}

fn bench_evoked(c: &mut Criterion) {
    let trials = recording();
    c.bench_function("evoked [120×240×8] ch0", |b| {
        b.iter(|| black_box(evoked(black_box(&trials), 0).unwrap().len()))
    });
}

fn bench_analyze(c: &mut Criterion) {
    let trials = recording();
    let detector = Detector::default();
    c.bench_function("analyze auto threshold", |b| {
        b.iter(|| {
            let r = detector.analyze(black_box(&trials), &ThresholdSpec::Auto).unwrap();
            black_box(r.peak.amplitude)
        })
    });
}

criterion_group!(benches, bench_evoked, bench_analyze);
criterion_main!(benches);
