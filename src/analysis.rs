//! Observables reconstructed from a sweep for display elsewhere.
//!
//! Nothing here draws anything. These are the numbers a plotting front end
//! needs: the intracavity energy trace across the sweep, the resonance grid,
//! the transmitted comb spectrum and the intracavity power around the ring at
//! one chosen detuning.

use num_complex::Complex64;
use num_traits::Zero;
use rustfft::FftPlanner;

use crate::ring::Ring;
use crate::sweep::SweepResult;
use crate::units::{angular_to_hz, hz_to_angular, watts_to_dbm, PI};

/// Azimuthal samples used for the ring power profile.
pub const DEFAULT_RING_GRID: usize = 4096;

/// Σ|a_μ|² for every row of the sweep.
pub fn average_intensity(result: &SweepResult) -> Vec<f64> {
    result
        .field
        .row_iter()
        .map(|row| row.iter().map(|a| a.norm_sqr()).sum())
        .collect()
}

/// Row whose detuning is closest to `zeta`. `None` for an empty sequence.
pub fn nearest_index(detunings: &[f64], zeta: f64) -> Option<usize> {
    detunings
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - zeta).abs().total_cmp(&(*b - zeta).abs()))
        .map(|(i, _)| i)
}

/// Cold-cavity resonance frequencies f_μ = (ω₀ + 2π·FSR·μ + D₂μ²/2) / 2π (Hz).
pub fn resonance_frequencies(ring: &Ring) -> Vec<f64> {
    let c = ring.constants();
    let d1 = hz_to_angular(ring.config().fsr);
    c.mu
        .iter()
        .map(|&m| angular_to_hz(c.omega0 + d1 * m + 0.5 * c.d2_angular * m * m))
        .collect()
}

/// Transmitted spectrum per mode in dBm.
///
/// Output field f − 2η|a_μ| referenced to the pump amplitude and scaled by
/// the input power. `None` when the ring is not pumped.
pub fn optical_spectrum_dbm(ring: &Ring, row: &[Complex64]) -> Option<Vec<f64>> {
    let c = ring.constants();
    let eta = ring.config().eta;
    let pin = ring.config().pin;
    let fin = c.forcing.iter().map(|f| f.norm()).fold(0.0_f64, f64::max);
    if fin == 0.0 || pin == 0.0 {
        return None;
    }
    Some(
        c.forcing
            .iter()
            .zip(row)
            .map(|(f, a)| {
                let fout = f - Complex64::new(2.0 * eta * a.norm(), 0.0);
                watts_to_dbm(fout.norm_sqr() / (fin * fin) * pin)
            })
            .collect(),
    )
}

/// Intracavity power around the ring as `(φ, |A(φ)|²)` on `grid` points.
///
/// The mode amplitudes are placed at index μ + grid/2 + 1 of a zero vector
/// and taken to the spatial domain with the unnormalized forward transform.
/// φ runs over linspace(−π, π, grid).
pub fn intracavity_power(ring: &Ring, row: &[Complex64], grid: usize) -> Vec<(f64, f64)> {
    let mu = &ring.constants().mu;
    let mut buf = vec![Complex64::zero(); grid];
    let offset = (grid / 2 + 1) as i64;
    for (&m, &a) in mu.iter().zip(row) {
        let idx = m as i64 + offset;
        if (0..grid as i64).contains(&idx) {
            buf[idx as usize] = a;
        }
    }
    FftPlanner::<f64>::new().plan_fft_forward(grid).process(&mut buf);

    let dphi = if grid > 1 { 2.0 * PI / (grid - 1) as f64 } else { 0.0 };
    buf.iter()
        .enumerate()
        .map(|(i, a)| (-PI + i as f64 * dphi, a.norm_sqr()))
        .collect()
}

/// Everything a display needs about one detuning point of a sweep.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Row taken from the sweep
    pub index: usize,
    /// Detuning of that row
    pub detuning: f64,
    /// Σ|a_μ|² along the whole sweep
    pub intensity_trace: Vec<f64>,
    /// Resonance frequencies (Hz)
    pub frequencies: Vec<f64>,
    /// Transmitted spectrum (dBm), absent for an unpumped ring
    pub spectrum_dbm: Option<Vec<f64>>,
    /// Intracavity power around the ring
    pub ring_profile: Vec<(f64, f64)>,
}

impl Snapshot {
    /// Snapshot at the row nearest to `zeta`. `None` if the sweep is empty.
    pub fn capture(ring: &Ring, result: &SweepResult, zeta: f64) -> Option<Self> {
        let index = nearest_index(&result.detunings, zeta)?;
        let row = result.row(index);
        Some(Self {
            index,
            detuning: result.detunings[index],
            intensity_trace: average_intensity(result),
            frequencies: resonance_frequencies(ring),
            spectrum_dbm: optical_spectrum_dbm(ring, &row),
            ring_profile: intracavity_power(ring, &row, DEFAULT_RING_GRID),
        })
    }

    /// Peak-to-mean ratio of the ring profile; large for localized pulses.
    pub fn peak_to_mean(&self) -> f64 {
        let n = self.ring_profile.len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.ring_profile.iter().map(|(_, p)| p).sum::<f64>() / n as f64;
        let peak = self.ring_profile.iter().map(|(_, p)| *p).fold(0.0_f64, f64::max);
        if mean > 0.0 {
            peak / mean
        } else {
            0.0
        }
    }
}
