//! Window functions for the analysis/synthesis pass.
//!
//! The streaming shifter uses the periodic Hann window. With a hop of
//! `size / overlap` and an overlap of at least 3, its squared overlap-add sum
//! is constant; smaller overlaps are still normalised per position.

use std::f64::consts::PI;

/// Returns `Some(trivial_window)` for degenerate sizes (0 or 1), or `None`
/// to indicate the caller should compute the full window.
#[inline]
fn trivial_window(size: usize) -> Option<Vec<f32>> {
    match size {
        0 => Some(vec![]),
        1 => Some(vec![1.0]),
        _ => None,
    }
}

/// Periodic (DFT-even) Hann window, the COLA-friendly variant for STFT framing.
pub fn periodic_hann(size: usize) -> Vec<f32> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = (2.0 * PI * i as f64) / n;
            (0.5 * (1.0 - x.cos())) as f32
        })
        .collect()
}

/// Squared-window overlap-add gain for each position within one hop.
///
/// Entry `i` is `sum_m window[i + m * hop]^2`, the weight every output sample
/// at phase `i` receives when frames are windowed on both analysis and
/// synthesis. Dividing by it undoes the overlap-add buildup.
pub fn overlap_gain(window: &[f32], hop: usize) -> Vec<f32> {
    if hop == 0 {
        return vec![];
    }
    let mut gain = vec![0.0f32; hop];
    for (i, &w) in window.iter().enumerate() {
        gain[i % hop] += w * w;
    }
    gain
}
