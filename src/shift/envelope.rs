//! Spectral envelope extraction and formant warping via real cepstrum.
//!
//! The envelope of each frame is estimated by cepstral smoothing and the
//! frame is reweighted with a frequency-warped copy of it. The pitch stage
//! scales the whole spectrum afterwards, so the warp pre-compensates for the
//! envelope shift the resampler will introduce.

use rustfft::num_complex::Complex;

use crate::core::fft::{FftPair, COMPLEX_ZERO};

/// Minimum magnitude floor to avoid log(0) in cepstral analysis.
const LOG_FLOOR: f32 = 1e-10;

/// Mean-square frame power below which envelope estimation is skipped.
pub const SILENCE_POWER_FLOOR: f32 = 1e-10;

/// Highest fundamental the lifter must stay clear of. The cepstral peak of a
/// voice at f0 sits at quefrency `sample_rate / f0`.
const MAX_VOICE_F0_HZ: f32 = 500.0;

/// Computes the spectral centroid from a magnitude spectrum.
///
/// Returns the centroid in Hz. Falls back to 1000 Hz if the spectrum is silent.
pub fn spectral_centroid(magnitudes: &[f32], sample_rate: u32, fft_size: usize) -> f32 {
    let mut weighted_sum = 0.0f64;
    let mut magnitude_sum = 0.0f64;
    let bin_freq = sample_rate as f64 / fft_size as f64;

    for (i, &mag) in magnitudes.iter().enumerate() {
        let freq = i as f64 * bin_freq;
        weighted_sum += freq * mag as f64;
        magnitude_sum += mag as f64;
    }

    if magnitude_sum > 1e-10 {
        (weighted_sum / magnitude_sum) as f32
    } else {
        1000.0
    }
}

/// Chooses a cepstral order from the spectral centroid of the current frame.
///
/// Dark frames get fewer coefficients (smoother envelope), bright vocal frames
/// get more so the formant peaks survive. The result is clamped to
/// `[10, max_order]` where `max_order` is `fft_size / 4`, further capped by
/// the pitch-period quefrency of the highest expected voice.
pub fn adaptive_cepstral_order(centroid: f32, fft_size: usize, sample_rate: u32) -> usize {
    let order = if centroid < 500.0 {
        25
    } else if centroid < 1500.0 {
        35
    } else if centroid < 4000.0 {
        50
    } else {
        40
    };

    let pitch_period = (sample_rate as f32 / MAX_VOICE_F0_HZ) as usize;
    let max_order = (fft_size / 4).min(pitch_period).max(10);
    order.clamp(10, max_order)
}

/// Extracts the spectral envelope from a magnitude spectrum using real cepstrum.
///
/// 1. log magnitude, mirrored to a full spectrum
/// 2. inverse FFT to the cepstrum
/// 3. lifter: keep quefrencies `0..=order` and their mirror
/// 4. forward FFT back to a smoothed log spectrum
/// 5. exponentiate
///
/// `cepstrum_buf` must hold `fft.size()` values and `envelope_out` at least
/// `num_bins`; neither is resized.
pub fn extract_envelope(
    magnitudes: &[f32],
    num_bins: usize,
    order: usize,
    fft: &mut FftPair,
    cepstrum_buf: &mut [Complex<f32>],
    envelope_out: &mut [f32],
) {
    let fft_size = fft.size();
    debug_assert_eq!(fft_size, (num_bins - 1) * 2);

    for i in 0..num_bins {
        let log_mag = magnitudes[i].max(LOG_FLOOR).ln();
        cepstrum_buf[i] = Complex::new(log_mag, 0.0);
    }
    for i in 1..num_bins - 1 {
        cepstrum_buf[fft_size - i] = cepstrum_buf[i];
    }

    fft.inverse(cepstrum_buf);

    let norm = 1.0 / fft_size as f32;
    let effective_order = order.min(fft_size / 2);
    for (i, c) in cepstrum_buf.iter_mut().enumerate() {
        if i > effective_order && i < fft_size - effective_order {
            *c = COMPLEX_ZERO;
        } else {
            *c *= norm;
        }
    }

    fft.forward(cepstrum_buf);

    for i in 0..num_bins {
        envelope_out[i] = cepstrum_buf[i].re.exp();
    }
}

/// Reads an envelope at a fractional bin position with linear interpolation.
///
/// Positions past the last bin hold the last value.
#[inline]
pub fn sample_envelope(envelope: &[f32], position: f32) -> f32 {
    let last = envelope.len() - 1;
    if position <= 0.0 {
        return envelope[0];
    }
    let idx = position as usize;
    if idx >= last {
        return envelope[last];
    }
    let frac = position - idx as f32;
    envelope[idx] * (1.0 - frac) + envelope[idx + 1] * frac
}

/// Estimates the noise floor of a magnitude spectrum as the 10th percentile value.
fn estimate_noise_floor(
    magnitudes: &[f32],
    start_bin: usize,
    num_bins: usize,
    scratch: &mut Vec<f32>,
) -> f32 {
    if start_bin >= num_bins {
        return LOG_FLOOR;
    }
    scratch.clear();
    scratch.extend(
        magnitudes[start_bin..num_bins]
            .iter()
            .copied()
            .filter(|&m| m > LOG_FLOOR),
    );
    if scratch.is_empty() {
        return LOG_FLOOR;
    }
    scratch.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = (scratch.len() as f64 * 0.10) as usize;
    scratch[idx.min(scratch.len() - 1)]
}

/// Computes a per-bin SNR-aware correction clamp.
///
/// Strong bins tolerate up to 3x, medium bins 2x, bins near the noise floor
/// 1.5x so warping never pulls noise up into audible peaks.
#[inline]
fn clamp_correction(correction: f32, magnitude: f32, noise_floor: f32) -> f32 {
    let snr = if noise_floor > 1e-10 {
        magnitude / noise_floor
    } else {
        100.0
    };

    let max_correction = if snr > 10.0 {
        3.0
    } else if snr > 3.0 {
        2.0
    } else {
        1.5
    };

    correction.clamp(1.0 / max_correction, max_correction)
}

/// What the corrector did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormantOutcome {
    /// Envelope warped onto the shifted excitation.
    Corrected,
    /// Formant ratio equals pitch ratio; the shifted spectrum already has
    /// the requested envelope.
    Unchanged,
    /// Frame too quiet for a stable envelope; excitation passed through.
    Silent,
}

/// Per-channel formant warping stage sharing the pitch shifter's framing.
///
/// All scratch is sized at construction; [`correct`](Self::correct) does not
/// allocate.
#[derive(Debug)]
pub struct FormantCorrector {
    fft_size: usize,
    num_bins: usize,
    sample_rate: u32,
    fft: FftPair,
    cepstrum: Vec<Complex<f32>>,
    envelope: Vec<f32>,
    noise_scratch: Vec<f32>,
}

impl FormantCorrector {
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        let num_bins = fft_size / 2 + 1;
        Self {
            fft_size,
            num_bins,
            sample_rate,
            fft: FftPair::new(fft_size),
            cepstrum: vec![COMPLEX_ZERO; fft_size],
            envelope: vec![1.0; num_bins],
            noise_scratch: Vec::with_capacity(num_bins),
        }
    }

    /// Reshapes `magnitudes` so that, once the pitch stage has scaled every
    /// frequency by the pitch ratio, the envelope ends up scaled by the
    /// formant ratio.
    ///
    /// `warp` is `pitch_ratio / formant_ratio`: bin `k` receives the gain
    /// `E(k * warp) / E(k)` where `E` is the frame's own envelope.
    pub fn correct(&mut self, magnitudes: &mut [f32], warp: f32) -> FormantOutcome {
        let num_bins = self.num_bins;

        // Parseval over the half spectrum, as mean-square time-domain power.
        let n = self.fft_size as f32;
        let power = 2.0 * magnitudes[..num_bins].iter().map(|m| m * m).sum::<f32>() / (n * n);
        if !power.is_finite() || power < SILENCE_POWER_FLOOR {
            return FormantOutcome::Silent;
        }

        if warp == 1.0 {
            return FormantOutcome::Unchanged;
        }

        let centroid = spectral_centroid(&magnitudes[..num_bins], self.sample_rate, self.fft_size);
        let order = adaptive_cepstral_order(centroid, self.fft_size, self.sample_rate);
        extract_envelope(
            magnitudes,
            num_bins,
            order,
            &mut self.fft,
            &mut self.cepstrum,
            &mut self.envelope,
        );

        let noise_floor = estimate_noise_floor(magnitudes, 1, num_bins, &mut self.noise_scratch);

        for (bin, mag) in magnitudes.iter_mut().enumerate().take(num_bins) {
            if *mag <= 0.0 {
                continue;
            }
            let carried = self.envelope[bin].max(LOG_FLOOR);
            let target = sample_envelope(&self.envelope, bin as f32 * warp);
            *mag *= clamp_correction(target / carried, *mag, noise_floor);
        }

        FormantOutcome::Corrected
    }
}
