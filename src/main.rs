//! Kerr comb simulator: forward detuning sweep with tabulated summary.
//!
//! Usage: kerr-comb-sim [ring.json] [sweep.json]
//!
//! Without arguments a 100 GHz silicon-nitride ring is swept from ζ = -4 to 20
//! starting from seeded vacuum noise. Set `RUST_LOG=debug` for per-step logs.

use std::error::Error;
use std::ops::ControlFlow;

use kerr_comb_sim::prelude::*;
use kerr_comb_sim::units::PI;

/// Prints a progress line every tenth of the sweep.
struct Progress {
    next_tick: usize,
}

impl SweepObserver for Progress {
    fn on_step_complete(&mut self, report: &StepReport) -> ControlFlow<()> {
        let done = report.index + 1;
        if done * 10 >= self.next_tick * report.total {
            println!(
                "  [{:>3}%]  ζ = {:>7.3}   Σ|a|² = {:>10.4}   ({} steps, {} rejected)",
                done * 100 / report.total.max(1),
                report.detuning,
                report.intracavity_energy,
                report.accepted,
                report.rejected
            );
            self.next_tick += 1;
        }
        ControlFlow::Continue(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let ring_config = match args.first() {
        Some(path) => RingConfig::from_path(path)?,
        None => RingConfig {
            n: 63,
            ..RingConfig::silicon_nitride()
        },
    };
    let ring = Ring::new(ring_config)?;
    let sweep_config = match args.get(1) {
        Some(path) => SweepConfig::from_path(path, ring.modes())?,
        None => SweepConfig::from_empty_cavity(ring.modes(), -4.0, 20.0, 0.1, 500.0)
            .with_seeded_noise(1e-6, 2024),
    };

    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║          KERR COMB SIMULATOR — Lugiato–Lefever detuning sweep        ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝");
    println!();

    let cfg = ring.config();
    let c = ring.constants();
    println!("━━━ Ring ━━━");
    println!();
    println!(
        "  Modes:              N = {} (pump at index {})",
        ring.modes(),
        ring.pump_index()
    );
    println!("  FSR:                {:.2} GHz", cfg.fsr * 1e-9);
    println!(
        "  Pump:               {:.2} nm, {:.1} mW",
        cfg.lambda0 * 1e9,
        cfg.pin * 1e3
    );
    println!(
        "  Linewidth:          κ/2π = {:.1} MHz (Q ≈ {:.2e})",
        cfg.kappa * 1e-6,
        c.omega0 / c.kappa
    );
    println!("  Kerr coefficient:   g = {:.4e} rad/s", c.g);
    println!(
        "  Dispersion:         D₂/2π = {:.3} MHz, d₂ = {:.4}",
        cfg.d2 * 1e-6,
        c.d2
    );
    println!(
        "  Pump amplitude:     f = {:.4} (f² = {:.3})",
        c.pump_amplitude(),
        c.pump_amplitude().powi(2)
    );
    println!(
        "  Threshold pump:     f² = 1 at {:.2} mW",
        cfg.pin * 1e3 / c.pump_amplitude().powi(2).max(f64::MIN_POSITIVE)
    );
    println!();

    let duration = c.normalized_duration(sweep_config.roundtrips_step);
    println!("━━━ Sweep ━━━");
    println!();
    println!(
        "  ζ:                  {} → {} in steps of {}",
        sweep_config.zeta_start, sweep_config.zeta_end, sweep_config.zeta_step
    );
    println!(
        "  Per step:           {} round trips = {:.3} photon lifetimes",
        sweep_config.roundtrips_step, duration
    );
    println!();

    let result = DetuningSweep::new().run_with_observer(
        &ring,
        &sweep_config,
        &mut Progress { next_tick: 1 },
    )?;
    println!();

    let trace = average_intensity(&result);
    println!("━━━ Intracavity energy vs detuning ━━━");
    println!();
    println!("  {:>8}  {:>12}  {:>12}", "ζ", "Σ|a|²", "peak/mean");
    println!("  {:─>8}  {:─>12}  {:─>12}", "", "", "");
    let stride = (result.len() / 20).max(1);
    for i in (0..result.len()).step_by(stride) {
        let profile = intracavity_power(&ring, &result.row(i), 1024);
        let mean = profile.iter().map(|(_, p)| p).sum::<f64>() / profile.len() as f64;
        let peak = profile.iter().map(|(_, p)| *p).fold(0.0_f64, f64::max);
        let ratio = if mean > 0.0 { peak / mean } else { 0.0 };
        println!(
            "  {:>8.3}  {:>12.4}  {:>12.2}",
            result.detunings[i], trace[i], ratio
        );
    }
    println!();

    // Snapshot just before the end of the sweep, where solitons usually survive.
    let zeta_snap =
        sweep_config.zeta_start + 0.8 * (sweep_config.zeta_end - sweep_config.zeta_start);
    if let Some(snap) = Snapshot::capture(&ring, &result, zeta_snap) {
        println!("━━━ Snapshot at ζ = {:.3} (row {}) ━━━", snap.detuning, snap.index);
        println!();
        println!("  Peak/mean power around the ring: {:.2}", snap.peak_to_mean());
        if let Some((phi, p)) = snap
            .ring_profile
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))
        {
            println!(
                "  Peak at φ = {:.3} rad ({:.1}°), |A|² = {:.3}",
                phi,
                phi * 180.0 / PI,
                p
            );
        }
        if let Some(spec) = &snap.spectrum_dbm {
            let lines = spec.iter().filter(|p| **p > -60.0).count();
            println!("  Comb lines above -60 dBm: {} of {}", lines, spec.len());
            let span_thz =
                (snap.frequencies[snap.frequencies.len() - 1] - snap.frequencies[0]) * 1e-12;
            println!("  Simulated span: {:.2} THz", span_thz);
        }
    }

    Ok(())
}
