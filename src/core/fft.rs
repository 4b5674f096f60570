//! FFT-related constants and plan handles shared across the crate.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Absolute floor for window sum normalization to prevent division by zero.
pub const WINDOW_SUM_EPSILON: f32 = 1e-6;

/// Forward/inverse plans of one size plus the in-place scratch they need.
///
/// Planning happens once at construction; `forward`/`inverse` then run
/// without touching the heap.
pub struct FftPair {
    size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl FftPair {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            size,
            forward,
            inverse,
            scratch: vec![COMPLEX_ZERO; scratch_len],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Unnormalized in-place forward transform.
    #[inline]
    pub fn forward(&mut self, buffer: &mut [Complex<f32>]) {
        let need = self.forward.get_inplace_scratch_len();
        self.forward
            .process_with_scratch(buffer, &mut self.scratch[..need]);
    }

    /// Unnormalized in-place inverse transform (caller divides by `size`).
    #[inline]
    pub fn inverse(&mut self, buffer: &mut [Complex<f32>]) {
        let need = self.inverse.get_inplace_scratch_len();
        self.inverse
            .process_with_scratch(buffer, &mut self.scratch[..need]);
    }
}

impl std::fmt::Debug for FftPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftPair").field("size", &self.size).finish()
    }
}
