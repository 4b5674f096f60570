//! Phase vocoder time stretching with a fused formant stage.
//!
//! Pitch is shifted in two steps: this module stretches time by the pitch
//! ratio, and [`StreamResampler`](crate::core::resample::StreamResampler)
//! reads the result back at the same ratio. Frames are taken every
//! `hop / ratio` input samples and resynthesised every `hop` samples. Each
//! bin's true frequency drives its synthesis phase, and identity phase
//! locking keeps the bins of one partial coherent.

use rustfft::num_complex::Complex;
use std::f32::consts::PI;

use crate::core::fft::{FftPair, COMPLEX_ZERO};
use crate::core::window::periodic_hann;
use crate::shift::envelope::{FormantCorrector, FormantOutcome};
use crate::shift::params::EngineParameters;
use crate::shift::phase_locking::{find_peaks, lock_to_peaks};

const TWO_PI: f32 = 2.0 * PI;

/// Frame-level time stretcher for one channel.
///
/// Buffers, window and FFT plans are allocated in [`new`](Self::new);
/// [`process_frame`](Self::process_frame) is allocation-free.
pub struct PitchShifter {
    fft_size: usize,
    /// Synthesis hop. Fixed, so overlap-add gain is the same every frame.
    hop: usize,
    num_bins: usize,
    window: Vec<f32>,
    fft: FftPair,
    spectrum: Vec<Complex<f32>>,
    prev_phase: Vec<f32>,
    analysis_phase: Vec<f32>,
    synth_phase: Vec<f32>,
    magnitude: Vec<f32>,
    /// True frequency of each analysis bin, in bins.
    frequency: Vec<f32>,
    peaks: Vec<usize>,
    /// False until the first frame after a reset has been analysed.
    primed: bool,
    formant: FormantCorrector,
}

impl PitchShifter {
    /// Creates a stretcher with window `fft_size` and synthesis hop `hop`.
    pub fn new(fft_size: usize, hop: usize, sample_rate: u32) -> Self {
        let num_bins = fft_size / 2 + 1;
        Self {
            fft_size,
            hop,
            num_bins,
            window: periodic_hann(fft_size),
            fft: FftPair::new(fft_size),
            spectrum: vec![COMPLEX_ZERO; fft_size],
            prev_phase: vec![0.0; num_bins],
            analysis_phase: vec![0.0; num_bins],
            synth_phase: vec![0.0; num_bins],
            magnitude: vec![0.0; num_bins],
            frequency: vec![0.0; num_bins],
            peaks: Vec::with_capacity(num_bins),
            primed: false,
            formant: FormantCorrector::new(fft_size, sample_rate),
        }
    }

    /// The analysis/synthesis window.
    #[inline]
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Clears phase history.
    pub fn reset(&mut self) {
        self.prev_phase.iter_mut().for_each(|x| *x = 0.0);
        self.synth_phase.iter_mut().for_each(|x| *x = 0.0);
        self.primed = false;
    }

    /// Stretches one frame of `fft_size` raw input samples.
    ///
    /// `analysis_hop` is the number of input samples between this frame and
    /// the previous one. Writes the windowed synthesis frame to `output`
    /// (also `fft_size` long), ready to be overlap-added at the synthesis hop.
    pub fn process_frame(
        &mut self,
        frame: &[f32],
        analysis_hop: usize,
        params: EngineParameters,
        output: &mut [f32],
    ) -> FormantOutcome {
        debug_assert_eq!(frame.len(), self.fft_size);
        debug_assert_eq!(output.len(), self.fft_size);

        for (i, (&sample, &win)) in frame.iter().zip(self.window.iter()).enumerate() {
            self.spectrum[i] = Complex::new(sample * win, 0.0);
        }
        self.fft.forward(&mut self.spectrum);

        self.analyse(analysis_hop);

        let outcome = if params.is_identity() {
            // Keep synthesis phase locked to analysis so a later ratio change
            // starts from the current signal phase.
            self.synth_phase.copy_from_slice(&self.analysis_phase);
            FormantOutcome::Unchanged
        } else {
            let pitch = params.pitch_ratio();
            self.advance_phases();
            let outcome = self
                .formant
                .correct(&mut self.magnitude, pitch / params.formant_ratio());
            if pitch > 1.0 {
                self.band_limit(pitch);
            }
            self.resynthesize();
            outcome
        };
        self.primed = true;

        self.fft.inverse(&mut self.spectrum);

        let norm = 1.0 / self.fft_size as f32;
        for (i, out) in output.iter_mut().enumerate() {
            *out = self.spectrum[i].re * norm * self.window[i];
        }
        outcome
    }

    /// Magnitude, phase and true frequency per bin from the forward spectrum.
    fn analyse(&mut self, analysis_hop: usize) {
        let n = self.fft_size as f32;
        let step = analysis_hop as f32;
        for bin in 0..self.num_bins {
            let c = self.spectrum[bin];
            let phase = c.arg();
            if analysis_hop > 0 {
                let expected = TWO_PI * bin as f32 * step / n;
                let deviation = wrap_phase(phase - self.prev_phase[bin] - expected);
                self.frequency[bin] = bin as f32 + deviation * n / (TWO_PI * step);
            }
            self.magnitude[bin] = c.norm();
            self.analysis_phase[bin] = phase;
            self.prev_phase[bin] = phase;
        }
    }

    /// Advances synthesis phases by one synthesis hop at each bin's true
    /// frequency, then locks the non-peak bins to their nearest peak.
    fn advance_phases(&mut self) {
        if !self.primed {
            self.synth_phase.copy_from_slice(&self.analysis_phase);
            return;
        }
        let radians_per_bin = TWO_PI * self.hop as f32 / self.fft_size as f32;
        for (phase, &freq) in self.synth_phase.iter_mut().zip(self.frequency.iter()) {
            *phase = wrap_phase(*phase + freq * radians_per_bin);
        }
        find_peaks(&self.magnitude, &mut self.peaks);
        lock_to_peaks(&self.peaks, &self.analysis_phase, &mut self.synth_phase);
    }

    /// Zeroes bins that the resampler would push past Nyquist.
    fn band_limit(&mut self, pitch_ratio: f32) {
        let cutoff = ((self.num_bins - 1) as f32 / pitch_ratio) as usize;
        for mag in self.magnitude.iter_mut().skip(cutoff + 1) {
            *mag = 0.0;
        }
    }

    /// Rebuilds the full Hermitian spectrum from magnitude and synthesis phase.
    fn resynthesize(&mut self) {
        for bin in 0..self.num_bins {
            self.spectrum[bin] = Complex::from_polar(self.magnitude[bin], self.synth_phase[bin]);
        }
        for bin in 1..self.num_bins - 1 {
            self.spectrum[self.fft_size - bin] = self.spectrum[bin].conj();
        }
    }
}

/// Wraps a phase value to [-PI, PI] using efficient modulo arithmetic.
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    let p = phase + PI;
    p - (p / TWO_PI).floor() * TWO_PI - PI
}
