// benches/sweep_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kerr_comb_sim::prelude::*;
use num_complex::Complex64;

fn benchmark_lle(c: &mut Criterion) {
    let ring = Ring::new(RingConfig::silicon_nitride()).unwrap();
    let n = ring.modes();

    c.bench_function("spectral_round_trip_127", |b| {
        let mut transform = SpectralTransform::new(n);
        let mut buf: Vec<Complex64> = (0..n).map(|i| Complex64::new(i as f64, 1.0)).collect();
        b.iter(|| {
            transform.to_spatial(black_box(&mut buf));
            transform.to_mode(black_box(&mut buf));
        });
    });

    c.bench_function("lle_derivative_127", |b| {
        let mut transform = SpectralTransform::new(n);
        let step = LleStep {
            index: 0,
            zeta_start: 2.0,
            zeta_step: 0.1,
            duration: 1.0,
        };
        let mut lle = Lle::new(ring.constants(), step, &mut transform);
        let a: Vec<Complex64> = (0..n).map(|i| Complex64::from_polar(0.1, i as f64)).collect();
        let mut da = vec![Complex64::new(0.0, 0.0); n];
        b.iter(|| lle.derivative(black_box(0.5), black_box(&a), &mut da));
    });

    c.bench_function("sweep_20_steps_127", |b| {
        let sweep = DetuningSweep::new();
        let config = SweepConfig::from_empty_cavity(n, 0.0, 2.0, 0.1, 200.0)
            .with_seeded_noise(1e-6, 1);
        b.iter(|| sweep.run(&ring, black_box(&config)).unwrap());
    });
}

criterion_group!(benches, benchmark_lle);
criterion_main!(benches);
