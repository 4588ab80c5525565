//! Error types for configuration, ODE integration and detuning sweeps.

use thiserror::Error;

/// Invalid or missing ring/sweep configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The mapping could not be parsed (missing key, wrong type, bad JSON).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Even N gives a half-integer mode grid.
    #[error("mode count N must be odd for a centred mode grid, got {0}")]
    EvenModeCount(usize),

    /// The pumped mode sits at index N/2 + 1, which needs N >= 3.
    #[error("mode count N must be at least 3, got {0}")]
    TooFewModes(usize),

    #[error("{field} has length {actual}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Detuning step is zero or points away from the sweep end.
    #[error("detuning step {step} cannot reach {end} from {start}")]
    BadStep { start: f64, end: f64, step: f64 },

    /// Detuning step is so small the sweep would not fit in memory.
    #[error("detuning sweep {start} → {end} in steps of {step} needs {points:e} points, limit is {max}")]
    TooManyPoints {
        start: f64,
        end: f64,
        step: f64,
        points: f64,
        max: usize,
    },
}

/// Failure inside the adaptive ODE solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("maximum number of steps ({steps}) exceeded at t = {t}")]
    MaxStepsExceeded { t: f64, steps: usize },

    #[error("step size {h:e} fell below the resolvable minimum at t = {t}")]
    StepSizeTooSmall { t: f64, h: f64 },

    #[error("state or error estimate became non-finite at t = {t}")]
    NonFinite { t: f64 },

    #[error("invalid integration interval [{t0}, {t1}]")]
    InvalidInterval { t0: f64, t1: f64 },
}

/// Failure of a detuning sweep. No partial trajectory accompanies it.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("integration failed at sweep step {step} (detuning {detuning}): {source}")]
    Integration {
        step: usize,
        detuning: f64,
        #[source]
        source: SolverError,
    },

    #[error("non-finite field in mode {mode} after sweep step {step} (detuning {detuning})")]
    NumericalAnomaly {
        step: usize,
        detuning: f64,
        mode: usize,
    },

    #[error("sweep cancelled by observer after step {step}")]
    Cancelled { step: usize },
}
