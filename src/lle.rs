//! Normalized Lugiato–Lefever right-hand side for one sweep step.
//!
//! Within a step the detuning is ramped linearly from ζ_start to
//! ζ_start + Δζ over the normalized duration T, so a sweep is one continuous
//! tuning ramp rather than a staircase of plateaus:
//!
//!   ζ(τ) = ζ_start + Δζ·τ/T
//!
//!   da/dτ = -(1 + i(ζ(τ) + d_int)) ⊙ a + i·to_mode(|to_spatial(a)|² ⊙ to_spatial(a)) + f

use num_complex::Complex64;
use num_traits::Zero;

use crate::ring::DerivedConstants;
use crate::transform::SpectralTransform;

/// Mode counts at and above which the pointwise assembly runs on rayon.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 4096;

/// Parameters of one detuning step. Built fresh for every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LleStep {
    /// Position of this step in the sweep
    pub index: usize,
    /// Detuning at τ = 0
    pub zeta_start: f64,
    /// Detuning change over the whole step
    pub zeta_step: f64,
    /// Normalized step duration T
    pub duration: f64,
}

impl LleStep {
    /// Detuning at normalized time `tau` within the step.
    pub fn detuning_at(&self, tau: f64) -> f64 {
        if self.duration > 0.0 {
            self.zeta_start + self.zeta_step * (tau / self.duration)
        } else {
            self.zeta_start
        }
    }
}

/// LLE derivative bound to one ring and one step.
pub struct Lle<'a> {
    constants: &'a DerivedConstants,
    step: LleStep,
    transform: &'a mut SpectralTransform,
    field: Vec<Complex64>,
}

impl<'a> Lle<'a> {
    pub fn new(
        constants: &'a DerivedConstants,
        step: LleStep,
        transform: &'a mut SpectralTransform,
    ) -> Self {
        let n = constants.mu.len();
        debug_assert_eq!(transform.len(), n);
        Self {
            constants,
            step,
            transform,
            field: vec![Complex64::zero(); n],
        }
    }

    pub fn step(&self) -> &LleStep {
        &self.step
    }

    /// Write da/dτ at `(tau, a)` into `da`.
    pub fn derivative(&mut self, tau: f64, a: &[Complex64], da: &mut [Complex64]) {
        let detuning = self.step.detuning_at(tau);

        // Kerr term: to_mode(|A|² A) with A = to_spatial(a)
        self.field.copy_from_slice(a);
        self.transform.to_spatial(&mut self.field);
        for x in self.field.iter_mut() {
            let intensity = x.norm_sqr();
            *x *= intensity;
        }
        self.transform.to_mode(&mut self.field);

        let dint = &self.constants.dint;
        let forcing = &self.constants.forcing;
        let kerr = &self.field;

        #[cfg(feature = "parallel")]
        {
            if a.len() >= PARALLEL_THRESHOLD {
                use rayon::prelude::*;
                da.par_iter_mut().enumerate().for_each(|(i, d)| {
                    *d = mode_rate(a[i], kerr[i], dint[i], forcing[i], detuning);
                });
                return;
            }
        }

        for (i, d) in da.iter_mut().enumerate() {
            *d = mode_rate(a[i], kerr[i], dint[i], forcing[i], detuning);
        }
    }
}

#[inline]
fn mode_rate(
    a: Complex64,
    kerr: Complex64,
    dint: f64,
    forcing: Complex64,
    detuning: f64,
) -> Complex64 {
    -Complex64::new(1.0, detuning + dint) * a + Complex64::i() * kerr + forcing
}
