//! Ring resonator and its normalized LLE constants.
//!
//! Time is measured in units of the photon lifetime 2/κ and detuning in
//! half-linewidths, so the normalized LLE for the mode amplitudes a_μ reads
//!
//!   ∂a_μ/∂τ = -(1 + i(ζ + d_int,μ)) a_μ + i F[|A|²A]_μ + f_μ
//!
//! with d_int,μ = (d₂/2) μ² and d₂ = 2D₂/κ.
//!
//! # Forcing
//!
//! The pump drives a single mode with normalized amplitude
//!
//!   f = √(8 g η P_in / (κ² ℏω₀))
//!
//! where g = ℏω₀² c n₂ / (n₀² V_eff) is the per-photon Kerr frequency shift.
//! The pumped index is N/2 + 1 (integer division), one above the centre of
//! the mode grid.

use num_complex::Complex64;

use crate::config::RingConfig;
use crate::error::ConfigError;
use crate::units::*;

/// Normalized constants derived once from a [`RingConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedConstants {
    /// Round-trip time 1/FSR (s)
    pub round_trip_time: f64,
    /// Pump frequency (Hz)
    pub pump_frequency: f64,
    /// Pump angular frequency ω₀ (rad/s)
    pub omega0: f64,
    /// Kerr coupling coefficient g (rad/s per photon)
    pub g: f64,
    /// Linewidth κ (rad/s)
    pub kappa: f64,
    /// Second-order dispersion D₂ (rad/s)
    pub d2_angular: f64,
    /// Normalized second-order dispersion d₂ = 2D₂/κ
    pub d2: f64,
    /// Mode numbers relative to the centre of the grid
    pub mu: Vec<f64>,
    /// Normalized integrated dispersion (d₂/2) μ²
    pub dint: Vec<f64>,
    /// Normalized pump forcing, nonzero only at the pumped index
    pub forcing: Vec<Complex64>,
}

impl DerivedConstants {
    /// Validate `config` and derive all constants from it.
    pub fn derive(config: &RingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let n = config.n;
        let round_trip_time = 1.0 / config.fsr;
        let pump_frequency = wavelength_to_frequency(config.lambda0);
        let omega0 = hz_to_angular(pump_frequency);
        let g = HBAR * omega0 * omega0 * C * config.n2 / (config.n0 * config.n0 * config.veff);
        let kappa = hz_to_angular(config.kappa);
        let d2_angular = hz_to_angular(config.d2);
        let d2 = (2.0 / kappa) * d2_angular;

        let half = (n as f64 - 1.0) / 2.0;
        let mu: Vec<f64> = (0..n).map(|i| i as f64 - half).collect();
        let dint = mu.iter().map(|&m| 0.5 * d2 * m * m).collect();

        let mut forcing = vec![Complex64::new(0.0, 0.0); n];
        let pump_amplitude = ((8.0 * g * config.eta / (kappa * kappa))
            * (config.pin / photon_energy(omega0)))
            .sqrt();
        forcing[pump_index(n)] = Complex64::new(pump_amplitude, 0.0);

        Ok(Self {
            round_trip_time,
            pump_frequency,
            omega0,
            g,
            kappa,
            d2_angular,
            d2,
            mu,
            dint,
            forcing,
        })
    }

    /// Normalized duration of `roundtrips` cavity round trips: (κ/2)·T_r·n.
    pub fn normalized_duration(&self, roundtrips: f64) -> f64 {
        0.5 * self.kappa * self.round_trip_time * roundtrips
    }

    /// Factor √(2g/κ) taking physical amplitudes to normalized ones.
    pub fn field_scale(&self) -> f64 {
        (2.0 * self.g / self.kappa).sqrt()
    }

    /// Magnitude of the pump term.
    pub fn pump_amplitude(&self) -> f64 {
        self.forcing
            .get(pump_index(self.forcing.len()))
            .map_or(0.0, |f| f.norm())
    }
}

/// Index of the pumped mode in an `n`-mode vector.
pub fn pump_index(n: usize) -> usize {
    n / 2 + 1
}

/// A validated ring together with its derived constants.
#[derive(Debug, Clone)]
pub struct Ring {
    config: RingConfig,
    constants: DerivedConstants,
}

impl Ring {
    pub fn new(config: RingConfig) -> Result<Self, ConfigError> {
        let constants = DerivedConstants::derive(&config)?;
        log::debug!(
            "ring: N={} g={:.4e} rad/s κ={:.4e} rad/s d2={:.4e} f={:.4}",
            config.n,
            constants.g,
            constants.kappa,
            constants.d2,
            constants.pump_amplitude()
        );
        Ok(Self { config, constants })
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    pub fn constants(&self) -> &DerivedConstants {
        &self.constants
    }

    /// Number of simulated modes.
    pub fn modes(&self) -> usize {
        self.config.n
    }

    pub fn pump_index(&self) -> usize {
        pump_index(self.config.n)
    }
}
