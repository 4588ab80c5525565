//! Detuning sweep: the LLE integrated step by step across a detuning ramp.
//!
//! Each sweep step integrates one normalized window T = (κ/2)·T_r·n_rt with
//! the detuning ramped from ζ[i] to ζ[i] + Δζ, starting from the field left by
//! the previous step. Steps are strictly sequential.
//!
//! ```text
//! Idle ──► Integrating(0) ──► StepComplete(0) ──► Integrating(1) ──► … ──► Done
//! ```
//!
//! Any solver failure or non-finite field aborts the whole sweep; there is no
//! partial trajectory.

use std::ops::ControlFlow;

use log::{debug, info, trace};
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::config::{detuning_count, SweepConfig};
use crate::error::{ConfigError, SweepError};
use crate::lle::{Lle, LleStep};
use crate::ring::{DerivedConstants, Ring};
use crate::solver::{DormandPrince, Integration, OdeSolver};
use crate::transform::SpectralTransform;

/// Detuning values ζ_start, ζ_start + Δζ, … up to and including ζ_end.
///
/// `step` must be nonzero and point from `start` towards `end`.
pub fn detuning_sequence(start: f64, end: f64, step: f64) -> Result<Vec<f64>, ConfigError> {
    let count = detuning_count(start, end, step)?;
    Ok((0..count).map(|i| start + i as f64 * step).collect())
}

/// Trajectory of one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    /// Detuning at each row of `field`
    pub detunings: Vec<f64>,
    /// Normalized mode amplitudes, one row per detuning (K×N)
    pub field: DMatrix<Complex64>,
}

impl SweepResult {
    /// Number of detuning points K.
    pub fn len(&self) -> usize {
        self.detunings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detunings.is_empty()
    }

    /// Number of modes N.
    pub fn modes(&self) -> usize {
        self.field.ncols()
    }

    /// Mode amplitudes at row `i`.
    pub fn row(&self, i: usize) -> Vec<Complex64> {
        self.field.row(i).iter().copied().collect()
    }
}

/// What an observer learns after each completed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Index of the completed step (row `index + 1` was just written)
    pub index: usize,
    /// Total number of steps in the sweep (K − 1)
    pub total: usize,
    /// Detuning reached at the end of the step
    pub detuning: f64,
    /// Σ|a_μ|² of the new row
    pub intracavity_energy: f64,
    /// Solver work for this step
    pub evals: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Hook called between sweep steps. Returning `Break` cancels the sweep.
pub trait SweepObserver {
    fn on_step_complete(&mut self, report: &StepReport) -> ControlFlow<()>;
}

/// Observer that never interrupts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SweepObserver for NoopObserver {
    fn on_step_complete(&mut self, _report: &StepReport) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Sweep driver over an injectable ODE solver.
#[derive(Debug, Clone, Default)]
pub struct DetuningSweep<S = DormandPrince> {
    solver: S,
}

impl DetuningSweep<DormandPrince> {
    /// Sweep with the default Dormand–Prince solver and tolerances.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: OdeSolver> DetuningSweep<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Run the full sweep.
    pub fn run(&self, ring: &Ring, config: &SweepConfig) -> Result<SweepResult, SweepError> {
        self.run_with_observer(ring, config, &mut NoopObserver)
    }

    /// Run the full sweep, reporting to `observer` after every step.
    pub fn run_with_observer<O>(
        &self,
        ring: &Ring,
        config: &SweepConfig,
        observer: &mut O,
    ) -> Result<SweepResult, SweepError>
    where
        O: SweepObserver + ?Sized,
    {
        let n = ring.modes();
        config.validate(n)?;
        let constants = ring.constants();

        let detunings = detuning_sequence(config.zeta_start, config.zeta_end, config.zeta_step)?;
        let k = detunings.len();
        let duration = constants.normalized_duration(config.roundtrips_step);
        info!(
            "sweep: {} detuning points ζ = {} → {} (Δζ = {}), T = {:.4} per step, N = {}",
            k, config.zeta_start, detunings[k - 1], config.zeta_step, duration, n
        );

        let mut transform = SpectralTransform::new(n);
        let mut field = DMatrix::<Complex64>::zeros(k, n);

        // Row 0: caller's field rescaled to normalized units, not integrated.
        let scale = constants.field_scale();
        let mut state: Vec<Complex64> = config.amu0.iter().map(|a| a * scale).collect();
        transform.to_mode(&mut state);
        store_row(&mut field, 0, &state);
        trace!("sweep: idle, initial state stored");

        for i in 0..k - 1 {
            let step = LleStep {
                index: i,
                zeta_start: detunings[i],
                zeta_step: config.zeta_step,
                duration,
            };
            trace!("sweep: integrating step {} at ζ = {}", i, step.zeta_start);

            let out = self.integrate_step(constants, &mut transform, step, &state)?;
            if let Some(mode) = out.y.iter().position(|a| !a.is_finite()) {
                return Err(SweepError::NumericalAnomaly {
                    step: i,
                    detuning: step.zeta_start,
                    mode,
                });
            }

            store_row(&mut field, i + 1, &out.y);
            state = out.y;

            let report = StepReport {
                index: i,
                total: k - 1,
                detuning: detunings[i + 1],
                intracavity_energy: state.iter().map(|a| a.norm_sqr()).sum(),
                evals: out.evals,
                accepted: out.accepted,
                rejected: out.rejected,
            };
            debug!(
                "sweep: step {}/{} complete, ζ = {:.4}, Σ|a|² = {:.4e}, {} accepted / {} rejected",
                i + 1,
                k - 1,
                report.detuning,
                report.intracavity_energy,
                report.accepted,
                report.rejected
            );
            if observer.on_step_complete(&report).is_break() {
                info!("sweep: cancelled after step {}", i);
                return Err(SweepError::Cancelled { step: i });
            }
        }

        info!("sweep: done, {} rows", k);
        Ok(SweepResult { detunings, field })
    }

    /// Integrate a single step from `initial` over `[0, step.duration]`.
    pub fn integrate_step(
        &self,
        constants: &DerivedConstants,
        transform: &mut SpectralTransform,
        step: LleStep,
        initial: &[Complex64],
    ) -> Result<Integration, SweepError> {
        let mut lle = Lle::new(constants, step, transform);
        self.solver
            .integrate(
                |tau, a, da| lle.derivative(tau, a, da),
                (0.0, step.duration),
                initial,
            )
            .map_err(|source| SweepError::Integration {
                step: step.index,
                detuning: step.zeta_start,
                source,
            })
    }
}

fn store_row(field: &mut DMatrix<Complex64>, row: usize, values: &[Complex64]) {
    for (j, v) in values.iter().enumerate() {
        field[(row, j)] = *v;
    }
}
