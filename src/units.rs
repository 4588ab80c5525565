//! Physical constants in SI units and the handful of conversions the
//! normalization needs.
//!
//! All values from CODATA 2018 / NIST.

/// Reduced Planck constant (J·s)
pub const HBAR: f64 = 1.054_571_817e-34;

/// Speed of light (m/s)
pub const C: f64 = 299_792_458.0;

/// Pi
pub const PI: f64 = std::f64::consts::PI;

/// Convert a frequency in Hz to angular frequency (rad/s)
pub fn hz_to_angular(f_hz: f64) -> f64 {
    2.0 * PI * f_hz
}

/// Convert angular frequency (rad/s) to Hz
pub fn angular_to_hz(omega: f64) -> f64 {
    omega / (2.0 * PI)
}

/// Optical frequency of a vacuum wavelength (Hz)
pub fn wavelength_to_frequency(lambda_m: f64) -> f64 {
    C / lambda_m
}

/// Photon energy ℏω (J)
pub fn photon_energy(omega: f64) -> f64 {
    HBAR * omega
}

/// Power in watts to dBm.
pub fn watts_to_dbm(p_watts: f64) -> f64 {
    10.0 * (1000.0 * p_watts).log10()
}
