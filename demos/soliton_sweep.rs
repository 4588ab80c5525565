//! Forward and backward detuning sweeps: soliton step and hysteresis.
//!
//! Run: cargo run --example soliton_sweep --release

use kerr_comb_sim::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║       SOLITON SWEEP — forward / backward tuning of a Si₃N₄ ring      ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝");
    println!();

    let ring = Ring::new(RingConfig {
        n: 127,
        pin: 0.2,
        ..RingConfig::silicon_nitride()
    })?;
    let n = ring.modes();
    let f2 = ring.constants().pump_amplitude().powi(2);
    println!("  N = {}, f² = {:.2}, d₂ = {:.4}", n, f2, ring.constants().d2);
    println!();

    let sweep = DetuningSweep::new();

    let forward_cfg = SweepConfig::from_empty_cavity(n, -5.0, 25.0, 0.1, 1000.0)
        .with_seeded_noise(1e-6, 7);
    let forward = sweep.run(&ring, &forward_cfg)?;

    // Backward sweep starts from the last forward state (converted back to
    // physical amplitudes so the sweep's input scaling is undone).
    let last = forward.row(forward.len() - 1);
    let mut spatial = last.clone();
    let mut transform = SpectralTransform::new(n);
    transform.to_spatial(&mut spatial);
    let inv_scale = 1.0 / ring.constants().field_scale();
    let backward_cfg = SweepConfig {
        zeta_start: 25.0,
        zeta_end: -5.0,
        zeta_step: -0.1,
        roundtrips_step: 1000.0,
        amu0: spatial.iter().map(|a| a * inv_scale).collect(),
    };
    let backward = sweep.run(&ring, &backward_cfg)?;

    let fwd = average_intensity(&forward);
    let bwd = average_intensity(&backward);

    println!("  {:>8}  {:>14}  {:>14}", "ζ", "Σ|a|² forward", "Σ|a|² backward");
    println!("  {:─>8}  {:─>14}  {:─>14}", "", "", "");
    for zeta in (-5..=25).step_by(2).map(|z| z as f64) {
        let (Some(i), Some(j)) = (
            nearest_index(&forward.detunings, zeta),
            nearest_index(&backward.detunings, zeta),
        ) else {
            continue;
        };
        println!("  {:>8.2}  {:>14.4}  {:>14.4}", zeta, fwd[i], bwd[j]);
    }
    println!();

    let steps: Vec<(f64, f64)> = forward
        .detunings
        .windows(2)
        .zip(fwd.windows(2))
        .filter(|(_, e)| e[1] < 0.7 * e[0] && e[0] > 1.0)
        .map(|(z, e)| (z[1], e[1] / e[0]))
        .collect();
    println!("  Forward energy drops > 30% (soliton steps): {}", steps.len());
    for (z, ratio) in steps.iter().take(10) {
        println!("    ζ = {:>7.2}  retained {:>5.1}%", z, ratio * 100.0);
    }

    Ok(())
}
