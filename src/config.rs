//! Ring and sweep configuration.
//!
//! Both structs deserialize from a JSON mapping using the key names of the
//! reference parameter sets (`N`, `FSR`, `dseta_start`, ...). A missing key is
//! a parse error; every value is range-checked by `validate` before anything
//! downstream sees it.

use std::path::Path;

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::units::PI;

/// Upper bound on the number of detuning points in one sweep.
pub const MAX_DETUNING_POINTS: usize = 10_000_000;

/// Slack on the last detuning point, in units of the step.
const END_TOLERANCE: f64 = 1e-9;

/// Number of detuning points ζ_start, ζ_start + Δζ, … up to and including
/// ζ_end.
///
/// Fails when the step is zero or points away from `end`, or when the sweep
/// would need more than [`MAX_DETUNING_POINTS`] points.
pub fn detuning_count(start: f64, end: f64, step: f64) -> Result<usize, ConfigError> {
    let span = end - start;
    let reachable = span == 0.0 || span.signum() == step.signum();
    if step == 0.0 || !step.is_finite() || !reachable {
        return Err(ConfigError::BadStep { start, end, step });
    }

    let intervals = (span / step + END_TOLERANCE).floor().max(0.0);
    let too_many = ConfigError::TooManyPoints {
        start,
        end,
        step,
        points: intervals + 1.0,
        max: MAX_DETUNING_POINTS,
    };
    if !intervals.is_finite() || intervals >= MAX_DETUNING_POINTS as f64 {
        return Err(too_many);
    }
    (intervals as usize).checked_add(1).ok_or(too_many)
}

/// Physical description of a pumped Kerr ring resonator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Number of simulated modes (odd, ≥ 3)
    #[serde(rename = "N")]
    pub n: usize,
    /// Linear refractive index
    pub n0: f64,
    /// Nonlinear (Kerr) refractive index (m²/W)
    pub n2: f64,
    /// Free spectral range (Hz)
    #[serde(rename = "FSR")]
    pub fsr: f64,
    /// Pump wavelength (m)
    pub lambda0: f64,
    /// Loaded linewidth κ/2π (Hz)
    pub kappa: f64,
    /// Coupling efficiency κ_ex/κ
    pub eta: f64,
    /// Effective mode volume (m³)
    #[serde(rename = "Veff")]
    pub veff: f64,
    /// Second-order dispersion D2/2π (Hz)
    #[serde(rename = "D2")]
    pub d2: f64,
    /// Thermal nonlinear index. Carried with the ring, not used by the LLE.
    #[serde(rename = "n2T")]
    pub n2t: f64,
    /// Pump power in the bus waveguide (W)
    #[serde(rename = "Pin")]
    pub pin: f64,
}

impl RingConfig {
    /// Silicon-nitride microring, 100 GHz FSR at 1550 nm, anomalous dispersion.
    pub fn silicon_nitride() -> Self {
        Self {
            n: 127,
            n0: 1.9,
            n2: 2.4e-19,
            fsr: 100e9,
            lambda0: 1.55e-6,
            kappa: 50e6,
            eta: 0.5,
            veff: 1e-15,
            d2: 1e6,
            n2t: 1.2e-19,
            pin: 0.05,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n < 3 {
            return Err(ConfigError::TooFewModes(self.n));
        }
        if self.n % 2 == 0 {
            return Err(ConfigError::EvenModeCount(self.n));
        }

        let fields = [
            ("n0", self.n0),
            ("n2", self.n2),
            ("FSR", self.fsr),
            ("lambda0", self.lambda0),
            ("kappa", self.kappa),
            ("eta", self.eta),
            ("Veff", self.veff),
            ("D2", self.d2),
            ("n2T", self.n2t),
            ("Pin", self.pin),
        ];
        for (field, value) in fields {
            require_finite(field, value)?;
        }

        require_positive("n0", self.n0)?;
        require_positive("FSR", self.fsr)?;
        require_positive("lambda0", self.lambda0)?;
        require_positive("kappa", self.kappa)?;
        require_positive("Veff", self.veff)?;
        require_non_negative("n2", self.n2)?;
        require_non_negative("Pin", self.pin)?;

        if !(0.0..=1.0).contains(&self.eta) {
            return Err(ConfigError::OutOfRange {
                field: "eta",
                value: self.eta,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Parameters of one detuning sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First normalized detuning ζ
    #[serde(rename = "dseta_start")]
    pub zeta_start: f64,
    /// Last normalized detuning ζ (inclusive)
    #[serde(rename = "dseta_end")]
    pub zeta_end: f64,
    /// Detuning increment per sweep step. Negative for backward tuning.
    #[serde(rename = "dseta_step")]
    pub zeta_step: f64,
    /// Cavity round trips integrated per sweep step
    pub roundtrips_step: f64,
    /// Initial mode amplitudes in physical units, one per mode
    #[serde(rename = "Amu0")]
    pub amu0: Vec<Complex64>,
}

impl SweepConfig {
    /// Sweep starting from an empty cavity.
    pub fn from_empty_cavity(
        n: usize,
        zeta_start: f64,
        zeta_end: f64,
        zeta_step: f64,
        roundtrips_step: f64,
    ) -> Self {
        Self {
            zeta_start,
            zeta_end,
            zeta_step,
            roundtrips_step,
            amu0: vec![Complex64::new(0.0, 0.0); n],
        }
    }

    /// Replace the initial field with random-phase noise of fixed magnitude.
    ///
    /// Seeded, so two sweeps built with the same seed are identical.
    pub fn with_seeded_noise(mut self, amplitude: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        for a in self.amu0.iter_mut() {
            let phase: f64 = rng.gen_range(0.0..2.0 * PI);
            *a = Complex64::from_polar(amplitude, phase);
        }
        self
    }

    pub fn from_json_str(json: &str, n: usize) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate(n)?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>, n: usize) -> Result<Self, ConfigError> {
        Self::from_json_str(&std::fs::read_to_string(path)?, n)
    }

    /// Check the sweep against a ring with `n` modes.
    pub fn validate(&self, n: usize) -> Result<(), ConfigError> {
        require_finite("dseta_start", self.zeta_start)?;
        require_finite("dseta_end", self.zeta_end)?;
        require_finite("dseta_step", self.zeta_step)?;
        require_finite("roundtrips_step", self.roundtrips_step)?;
        require_positive("roundtrips_step", self.roundtrips_step)?;

        detuning_count(self.zeta_start, self.zeta_end, self.zeta_step)?;

        if self.amu0.len() != n {
            return Err(ConfigError::LengthMismatch {
                field: "Amu0",
                expected: n,
                actual: self.amu0.len(),
            });
        }
        if let Some(bad) = self.amu0.iter().find(|a| !a.is_finite()) {
            return Err(ConfigError::NotFinite {
                field: "Amu0",
                value: if bad.re.is_finite() { bad.im } else { bad.re },
            });
        }
        Ok(())
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RING_JSON: &str = r#"{
        "N": 5, "n0": 1.9, "n2": 2.4e-19, "FSR": 100e9, "lambda0": 1.55e-6,
        "kappa": 50e6, "eta": 0.5, "Veff": 1e-15, "D2": 1e6, "n2T": 1.2e-19,
        "Pin": 0.05
    }"#;

    #[test]
    fn preset_is_valid() {
        assert!(RingConfig::silicon_nitride().validate().is_ok());
    }

    #[test]
    fn ring_parses_from_json_keys() {
        let ring = RingConfig::from_json_str(RING_JSON).unwrap();
        assert_eq!(ring.n, 5);
        assert_eq!(ring.fsr, 100e9);
        assert_eq!(ring.pin, 0.05);
    }

    #[test]
    fn missing_key_is_a_parse_error() {
        let json = RING_JSON.replace("\"Veff\": 1e-15,", "");
        let err = RingConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {:?}", err);
        assert!(err.to_string().contains("Veff"), "{}", err);
    }

    #[test]
    fn fractional_mode_count_is_rejected() {
        let json = RING_JSON.replace("\"N\": 5", "\"N\": 5.5");
        assert!(matches!(
            RingConfig::from_json_str(&json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn even_mode_count_is_rejected() {
        let ring = RingConfig {
            n: 64,
            ..RingConfig::silicon_nitride()
        };
        assert!(matches!(ring.validate(), Err(ConfigError::EvenModeCount(64))));
    }

    #[test]
    fn tiny_mode_count_is_rejected() {
        for n in [0, 1] {
            let ring = RingConfig {
                n,
                ..RingConfig::silicon_nitride()
            };
            assert!(matches!(ring.validate(), Err(ConfigError::TooFewModes(_))));
        }
    }

    #[test]
    fn non_positive_linewidth_and_volume_are_rejected() {
        let ring = RingConfig {
            kappa: 0.0,
            ..RingConfig::silicon_nitride()
        };
        assert!(matches!(
            ring.validate(),
            Err(ConfigError::NonPositive { field: "kappa", .. })
        ));

        let ring = RingConfig {
            veff: -1e-15,
            ..RingConfig::silicon_nitride()
        };
        assert!(matches!(
            ring.validate(),
            Err(ConfigError::NonPositive { field: "Veff", .. })
        ));
    }

    #[test]
    fn negative_pump_and_bad_eta_are_rejected() {
        let ring = RingConfig {
            pin: -0.1,
            ..RingConfig::silicon_nitride()
        };
        assert!(matches!(
            ring.validate(),
            Err(ConfigError::Negative { field: "Pin", .. })
        ));

        let ring = RingConfig {
            eta: 1.5,
            ..RingConfig::silicon_nitride()
        };
        assert!(matches!(
            ring.validate(),
            Err(ConfigError::OutOfRange { field: "eta", .. })
        ));
    }

    #[test]
    fn zero_pump_is_allowed() {
        let ring = RingConfig {
            pin: 0.0,
            n2: 0.0,
            ..RingConfig::silicon_nitride()
        };
        assert!(ring.validate().is_ok());
    }

    #[test]
    fn sweep_parses_complex_amplitudes() {
        let json = r#"{
            "dseta_start": -2.0, "dseta_end": 4.0, "dseta_step": 0.5,
            "roundtrips_step": 200,
            "Amu0": [[0.0, 0.0], [1.0, -1.0], [0.0, 0.0]]
        }"#;
        let sweep = SweepConfig::from_json_str(json, 3).unwrap();
        assert_eq!(sweep.amu0[1], Complex64::new(1.0, -1.0));
        assert_eq!(sweep.roundtrips_step, 200.0);
    }

    #[test]
    fn sweep_rejects_wrong_amplitude_length() {
        let sweep = SweepConfig::from_empty_cavity(4, 0.0, 1.0, 0.1, 10.0);
        assert!(matches!(
            sweep.validate(5),
            Err(ConfigError::LengthMismatch { expected: 5, actual: 4, .. })
        ));
    }

    #[test]
    fn sweep_rejects_step_pointing_away_from_end() {
        let zero = SweepConfig::from_empty_cavity(5, 0.0, 1.0, 0.0, 10.0);
        assert!(matches!(zero.validate(5), Err(ConfigError::BadStep { .. })));

        let wrong_sign = SweepConfig::from_empty_cavity(5, 0.0, 1.0, -0.1, 10.0);
        assert!(matches!(wrong_sign.validate(5), Err(ConfigError::BadStep { .. })));

        let backward = SweepConfig::from_empty_cavity(5, 1.0, 0.0, -0.1, 10.0);
        assert!(backward.validate(5).is_ok());
    }

    #[test]
    fn sweep_rejects_step_too_small_for_its_span() {
        let tiny = SweepConfig::from_empty_cavity(5, 0.0, 1.0, 1e-300, 10.0);
        assert!(matches!(
            tiny.validate(5),
            Err(ConfigError::TooManyPoints { max: MAX_DETUNING_POINTS, .. })
        ));

        let huge_span = SweepConfig::from_empty_cavity(5, -1e308, 1e308, 1.0, 10.0);
        assert!(matches!(
            huge_span.validate(5),
            Err(ConfigError::TooManyPoints { .. })
        ));
    }

    #[test]
    fn detuning_count_is_inclusive_and_bounded() {
        assert_eq!(detuning_count(0.0, 0.1, 0.05).unwrap(), 3);
        assert_eq!(detuning_count(-1.0, 1.0, 0.1).unwrap(), 21);
        assert_eq!(detuning_count(0.0, 1.0, 0.3).unwrap(), 4);
        assert_eq!(detuning_count(1.0, 0.0, -0.25).unwrap(), 5);
        assert_eq!(detuning_count(2.0, 2.0, 0.5).unwrap(), 1);

        let limit = MAX_DETUNING_POINTS as f64;
        assert_eq!(
            detuning_count(0.0, limit - 1.0, 1.0).unwrap(),
            MAX_DETUNING_POINTS
        );
        assert!(matches!(
            detuning_count(0.0, limit, 1.0),
            Err(ConfigError::TooManyPoints { .. })
        ));
        assert!(matches!(
            detuning_count(0.0, 1.0, 1e-300),
            Err(ConfigError::TooManyPoints { .. })
        ));
        assert!(matches!(
            detuning_count(0.0, 1.0, f64::NAN),
            Err(ConfigError::BadStep { .. })
        ));
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let a = SweepConfig::from_empty_cavity(9, 0.0, 1.0, 0.1, 10.0)
            .with_seeded_noise(1e-3, 42);
        let b = SweepConfig::from_empty_cavity(9, 0.0, 1.0, 0.1, 10.0)
            .with_seeded_noise(1e-3, 42);
        assert_eq!(a, b);
        for amp in &a.amu0 {
            assert!((amp.norm() - 1e-3).abs() < 1e-15);
        }
    }
}
