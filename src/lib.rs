//! # kerr-comb-sim
//!
//! Detuning sweeps of a continuous-wave pumped Kerr microresonator, integrated
//! with the normalized Lugiato–Lefever equation (LLE) in the mode domain.
//!
//! ```text
//! RingConfig (SI units)
//!   ↓ normalization (ring)
//! DerivedConstants: κ, g, d₂, μ, d_int, f
//!   ↓ per sweep step: LLE right-hand side (lle) + FFT Kerr term (transform)
//! adaptive Dormand–Prince step (solver)
//!   ↓ row i → row i+1
//! SweepResult: ζ[K], a[K×N]
//!   ↓ observables (analysis)
//! intensity trace, comb spectrum, ring power profile
//! ```
//!
//! ## Normalization
//!
//! Time τ = κt/2, detuning ζ = 2(ω₀ − ω_p)/κ, amplitudes scaled by √(2g/κ).
//! With these units the loss term is −a and the Kerr term i|A|²A has unit
//! strength, so regime boundaries (modulation instability at |a|² = 1,
//! bistability at ζ > √3) do not depend on the particular device.
//!
//! ## Usage
//!
//! ```no_run
//! use kerr_comb_sim::prelude::*;
//!
//! let ring = Ring::new(RingConfig::silicon_nitride()).unwrap();
//! let sweep = SweepConfig::from_empty_cavity(ring.modes(), -5.0, 20.0, 0.05, 1000.0)
//!     .with_seeded_noise(1e-4, 1);
//! let result = DetuningSweep::new().run(&ring, &sweep).unwrap();
//! let snap = Snapshot::capture(&ring, &result, 10.0).unwrap();
//! println!("peak/mean at ζ = {}: {:.2}", snap.detuning, snap.peak_to_mean());
//! ```
//!
//! ## References
//!
//! - Lugiato & Lefever (1987), Phys. Rev. Lett. 58, 2209
//! - Herr et al. (2014), "Temporal solitons in optical microresonators",
//!   Nat. Photon. 8, 145
//! - Chembo & Yu (2010), "Modal expansion approach to optical-frequency-comb
//!   generation with monolithic whispering-gallery-mode resonators",
//!   Phys. Rev. A 82, 033801

pub mod units;
pub mod error;
pub mod config;
pub mod ring;
pub mod transform;
pub mod solver;
pub mod lle;
pub mod sweep;
pub mod analysis;

pub mod prelude {
    pub use crate::analysis::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::lle::*;
    pub use crate::ring::*;
    pub use crate::solver::*;
    pub use crate::sweep::*;
    pub use crate::transform::*;
}
