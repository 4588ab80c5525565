//! Mode-domain ⇄ spatial-domain transform pair.
//!
//! The Kerr term is local in the spatial domain, so instead of the O(N²)
//! four-wave-mixing convolution the derivative goes
//! mode → spatial, cubes pointwise, and comes back.
//!
//! Convention: `to_spatial` is the unnormalized forward DFT
//! (kernel e^{-2πi jk/N}) and `to_mode` the inverse DFT scaled by 1/N.
//! Swapping the two changes the sign convention of the azimuthal coordinate
//! and therefore the phase of the nonlinear term; keep them as they are.

use std::sync::Arc;

use num_complex::Complex64;
use num_traits::Zero;
use rustfft::{Fft, FftPlanner};

/// Planned FFT pair for one mode count, with its own scratch space.
pub struct SpectralTransform {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl SpectralTransform {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            len,
            forward,
            inverse,
            scratch: vec![Complex64::zero(); scratch_len],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mode amplitudes → field around the ring, in place.
    pub fn to_spatial(&mut self, buf: &mut [Complex64]) {
        debug_assert_eq!(buf.len(), self.len);
        self.forward.process_with_scratch(buf, &mut self.scratch);
    }

    /// Field around the ring → mode amplitudes, in place.
    pub fn to_mode(&mut self, buf: &mut [Complex64]) {
        debug_assert_eq!(buf.len(), self.len);
        self.inverse.process_with_scratch(buf, &mut self.scratch);
        let scale = 1.0 / self.len as f64;
        for x in buf.iter_mut() {
            *x *= scale;
        }
    }
}

impl std::fmt::Debug for SpectralTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralTransform").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::PI;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vector(rng: &mut StdRng, n: usize) -> Vec<Complex64> {
        (0..n)
            .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect()
    }

    /// O(N²) reference for the forward transform.
    fn direct_dft(x: &[Complex64]) -> Vec<Complex64> {
        let n = x.len();
        (0..n)
            .map(|k| {
                x.iter()
                    .enumerate()
                    .map(|(j, &xj)| {
                        xj * Complex64::from_polar(1.0, -2.0 * PI * (j * k) as f64 / n as f64)
                    })
                    .sum()
            })
            .collect()
    }

    fn max_error(a: &[Complex64], b: &[Complex64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).norm())
            .fold(0.0_f64, f64::max)
    }

    #[test]
    fn round_trip_recovers_input() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [3, 5, 15, 63, 127, 255, 511] {
            let mut t = SpectralTransform::new(n);
            let x = random_vector(&mut rng, n);
            let mut buf = x.clone();
            t.to_spatial(&mut buf);
            t.to_mode(&mut buf);
            let err = max_error(&buf, &x);
            assert!(err < 1e-9, "N={}: round-trip error {}", n, err);
        }
    }

    #[test]
    fn forward_matches_direct_dft() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in [5, 9, 21, 33] {
            let mut t = SpectralTransform::new(n);
            let x = random_vector(&mut rng, n);
            let expected = direct_dft(&x);
            let mut buf = x.clone();
            t.to_spatial(&mut buf);
            let err = max_error(&buf, &expected);
            assert!(err < 1e-10, "N={}: error vs direct DFT {}", n, err);
        }
    }

    #[test]
    fn single_mode_is_flat_in_space() {
        let n = 11;
        let mut t = SpectralTransform::new(n);
        let mut buf = vec![Complex64::zero(); n];
        buf[3] = Complex64::new(0.5, 0.5);
        t.to_spatial(&mut buf);
        for x in &buf {
            assert!((x.norm() - 0.5f64.hypot(0.5)).abs() < 1e-12);
        }
    }

    #[test]
    fn to_mode_normalizes_constant_field() {
        let n = 7;
        let mut t = SpectralTransform::new(n);
        let mut buf = vec![Complex64::new(2.0, 0.0); n];
        t.to_mode(&mut buf);
        assert!((buf[0] - Complex64::new(2.0, 0.0)).norm() < 1e-12);
        for x in &buf[1..] {
            assert!(x.norm() < 1e-12);
        }
    }
}
