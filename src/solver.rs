//! Adaptive ODE integration over complex state vectors.
//!
//! [`OdeSolver`] is the seam the sweep integrates through: hand it a
//! derivative, an initial state and an interval, get the state at the end of
//! the interval. [`DormandPrince`] is the default implementation, an explicit
//! embedded Runge–Kutta 5(4) pair with FSAL and the classic step-size controller:
//!
//!   h_new = h · clamp(0.9 · err^(-1/5), 0.2, 10)
//!
//! where `err` is the RMS over components of |e_i| / (atol + rtol·max(|y_i|, |y_new,i|)).
//! Complex components are weighted by their modulus, so the state counts as N
//! degrees of freedom in the norm (2N real unknowns in the update).
//!
//! References:
//! - Dormand & Prince (1980), J. Comput. Appl. Math. 6, 19
//! - Hairer, Nørsett & Wanner, "Solving Ordinary Differential Equations I" (1993), II.4

use num_complex::Complex64;
use num_traits::Zero;

use crate::error::SolverError;

/// Final state of one integration plus work counters.
#[derive(Debug, Clone)]
pub struct Integration {
    /// State at the end of the interval
    pub y: Vec<Complex64>,
    /// Derivative evaluations
    pub evals: usize,
    /// Accepted steps
    pub accepted: usize,
    /// Rejected steps
    pub rejected: usize,
}

/// Integrates dy/dt = rhs(t, y) over an interval.
///
/// `rhs(t, y, dy)` writes the derivative at `(t, y)` into `dy`.
pub trait OdeSolver {
    fn integrate<F>(
        &self,
        rhs: F,
        t_span: (f64, f64),
        y0: &[Complex64],
    ) -> Result<Integration, SolverError>
    where
        F: FnMut(f64, &[Complex64], &mut [Complex64]);
}

/// Tolerances and limits for [`DormandPrince`].
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Upper bound on accepted + rejected steps per integration
    pub max_steps: usize,
    /// Largest step allowed (normalized time)
    pub max_step: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_steps: 100_000,
            max_step: f64::INFINITY,
        }
    }
}

impl SolverSettings {
    /// Tight tolerances for regression checks against closed forms.
    pub fn precise() -> Self {
        Self {
            rtol: 1e-10,
            atol: 1e-12,
            ..Self::default()
        }
    }
}

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
/// -1 / (order of the embedded error estimator + 1)
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

// Butcher tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also row 7 of A, hence FSAL)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between 5th- and 4th-order weights
const E1: f64 = -71.0 / 57600.0;
const E3: f64 = 71.0 / 16695.0;
const E4: f64 = -71.0 / 1920.0;
const E5: f64 = 17253.0 / 339200.0;
const E6: f64 = -22.0 / 525.0;
const E7: f64 = 1.0 / 40.0;

/// Dormand–Prince RK45 with embedded error control.
#[derive(Debug, Clone, Default)]
pub struct DormandPrince {
    pub settings: SolverSettings,
}

impl DormandPrince {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    /// RMS of |v_i| / scale_i.
    fn rms_norm(v: &[Complex64], scale: &[f64]) -> f64 {
        if v.is_empty() {
            return 0.0;
        }
        let sum: f64 = v
            .iter()
            .zip(scale)
            .map(|(x, s)| {
                let r = x.norm() / s;
                r * r
            })
            .sum();
        (sum / v.len() as f64).sqrt()
    }

    /// Starting step from the local Lipschitz estimate (Hairer et al., II.4).
    fn initial_step<F>(
        &self,
        rhs: &mut F,
        t0: f64,
        y0: &[Complex64],
        f0: &[Complex64],
        direction: f64,
        span: f64,
    ) -> f64
    where
        F: FnMut(f64, &[Complex64], &mut [Complex64]),
    {
        let s = &self.settings;
        let scale: Vec<f64> = y0.iter().map(|y| s.atol + y.norm() * s.rtol).collect();
        let d0 = Self::rms_norm(y0, &scale);
        let d1 = Self::rms_norm(f0, &scale);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };

        let y1: Vec<Complex64> = y0
            .iter()
            .zip(f0)
            .map(|(y, f)| y + f * (h0 * direction))
            .collect();
        let mut f1 = vec![Complex64::zero(); y0.len()];
        rhs(t0 + h0 * direction, &y1, &mut f1);
        let diff: Vec<Complex64> = f1.iter().zip(f0).map(|(a, b)| a - b).collect();
        let d2 = Self::rms_norm(&diff, &scale) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(-ERROR_EXPONENT)
        };
        (100.0 * h0).min(h1).min(span).min(s.max_step)
    }
}

impl OdeSolver for DormandPrince {
    fn integrate<F>(
        &self,
        mut rhs: F,
        t_span: (f64, f64),
        y0: &[Complex64],
    ) -> Result<Integration, SolverError>
    where
        F: FnMut(f64, &[Complex64], &mut [Complex64]),
    {
        let (t0, t1) = t_span;
        if !t0.is_finite() || !t1.is_finite() {
            return Err(SolverError::InvalidInterval { t0, t1 });
        }
        if t0 == t1 {
            return Ok(Integration {
                y: y0.to_vec(),
                evals: 0,
                accepted: 0,
                rejected: 0,
            });
        }

        let s = &self.settings;
        let n = y0.len();
        let direction = (t1 - t0).signum();
        let span = (t1 - t0).abs();

        let mut t = t0;
        let mut y = y0.to_vec();
        let mut k1 = vec![Complex64::zero(); n];
        rhs(t, &y, &mut k1);
        let mut evals = 1;

        let mut h = self.initial_step(&mut rhs, t0, &y, &k1, direction, span);
        evals += 1;

        let mut k2 = vec![Complex64::zero(); n];
        let mut k3 = vec![Complex64::zero(); n];
        let mut k4 = vec![Complex64::zero(); n];
        let mut k5 = vec![Complex64::zero(); n];
        let mut k6 = vec![Complex64::zero(); n];
        let mut k7 = vec![Complex64::zero(); n];
        let mut stage = vec![Complex64::zero(); n];
        let mut y_new = vec![Complex64::zero(); n];
        let mut scale = vec![0.0; n];

        let mut accepted = 0;
        let mut rejected = 0;
        let mut last_rejected = false;

        while (t1 - t) * direction > 0.0 {
            if accepted + rejected >= s.max_steps {
                return Err(SolverError::MaxStepsExceeded {
                    t,
                    steps: accepted + rejected,
                });
            }

            let min_step = 10.0 * f64::EPSILON * t.abs().max(f64::MIN_POSITIVE);
            h = h.min(s.max_step);
            if h < min_step {
                return Err(SolverError::StepSizeTooSmall { t, h });
            }

            // Land exactly on t1.
            let remaining = (t1 - t).abs();
            let step = h.min(remaining);
            let hs = step * direction;
            let t_new = if step == remaining { t1 } else { t + hs };

            for i in 0..n {
                stage[i] = y[i] + k1[i] * (hs * A21);
            }
            rhs(t + C2 * hs, &stage, &mut k2);
            for i in 0..n {
                stage[i] = y[i] + (k1[i] * A31 + k2[i] * A32) * hs;
            }
            rhs(t + C3 * hs, &stage, &mut k3);
            for i in 0..n {
                stage[i] = y[i] + (k1[i] * A41 + k2[i] * A42 + k3[i] * A43) * hs;
            }
            rhs(t + C4 * hs, &stage, &mut k4);
            for i in 0..n {
                stage[i] = y[i] + (k1[i] * A51 + k2[i] * A52 + k3[i] * A53 + k4[i] * A54) * hs;
            }
            rhs(t + C5 * hs, &stage, &mut k5);
            for i in 0..n {
                stage[i] = y[i]
                    + (k1[i] * A61 + k2[i] * A62 + k3[i] * A63 + k4[i] * A64 + k5[i] * A65) * hs;
            }
            rhs(t + hs, &stage, &mut k6);
            for i in 0..n {
                y_new[i] = y[i]
                    + (k1[i] * B1 + k3[i] * B3 + k4[i] * B4 + k5[i] * B5 + k6[i] * B6) * hs;
            }
            rhs(t_new, &y_new, &mut k7);
            evals += 6;

            for i in 0..n {
                scale[i] = s.atol + y[i].norm().max(y_new[i].norm()) * s.rtol;
                stage[i] = (k1[i] * E1
                    + k3[i] * E3
                    + k4[i] * E4
                    + k5[i] * E5
                    + k6[i] * E6
                    + k7[i] * E7)
                    * hs;
            }
            let error_norm = Self::rms_norm(&stage, &scale);
            if !error_norm.is_finite() {
                return Err(SolverError::NonFinite { t });
            }

            if error_norm < 1.0 {
                let mut factor = if error_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * error_norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
                };
                if last_rejected {
                    factor = factor.min(1.0);
                }
                t = t_new;
                std::mem::swap(&mut y, &mut y_new);
                std::mem::swap(&mut k1, &mut k7);
                h = step * factor;
                accepted += 1;
                last_rejected = false;
            } else {
                h = step * (SAFETY * error_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR);
                rejected += 1;
                last_rejected = true;
            }
        }

        Ok(Integration {
            y,
            evals,
            accepted,
            rejected,
        })
    }
}
