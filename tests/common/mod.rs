#![allow(dead_code)]

use std::f32::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};
use voxshift::{
    EngineConfig, Gender, PresetTable, SessionController, StreamDriver, VoiceEngine,
};

/// Stream stand-in that reports a fixed format.
pub struct FakeStream {
    pub open: bool,
    pub sample_rate: u32,
    pub channels: u16,
}

impl FakeStream {
    pub fn for_config(config: &EngineConfig) -> Self {
        Self {
            open: true,
            sample_rate: config.sample_rate,
            channels: config.channels,
        }
    }
}

impl StreamDriver for FakeStream {
    fn is_open(&self) -> bool {
        self.open
    }
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
    fn channels(&self) -> u16 {
        self.channels
    }
}

/// Controller and engine with a stream attached, not yet started.
pub fn session(config: EngineConfig) -> (SessionController, VoiceEngine) {
    let (mut controller, engine) =
        SessionController::new(config.clone(), PresetTable::default()).unwrap();
    controller
        .attach_stream(Box::new(FakeStream::for_config(&config)))
        .unwrap();
    (controller, engine)
}

/// Running session on the given preset.
pub fn running_session(
    config: EngineConfig,
    gender: Gender,
    preset: usize,
) -> (SessionController, VoiceEngine) {
    let (mut controller, engine) = session(config);
    controller.select_gender(gender);
    controller.select_preset(preset).unwrap();
    controller.start().unwrap();
    (controller, engine)
}

pub fn gen_sine(freq_hz: f32, sr: u32, n: usize, amp: f32) -> Vec<f32> {
    (0..n)
        .map(|i| amp * (2.0 * PI * freq_hz * i as f32 / sr as f32).sin())
        .collect()
}

/// Pushes `input` through the engine in blocks of `block` samples.
pub fn run_blocks(engine: &mut VoiceEngine, input: &[f32], block: usize) -> Vec<f32> {
    let mut output = vec![0.0f32; input.len()];
    for (inp, out) in input.chunks(block).zip(output.chunks_mut(block)) {
        engine.process(inp, out);
    }
    output
}

pub fn rms(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = signal.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / signal.len() as f64).sqrt()
}

/// Hann-windowed, zero-padded magnitude spectrum.
pub fn magnitude_spectrum(signal: &[f32]) -> (Vec<f32>, usize) {
    let n = (signal.len() * 4).next_power_of_two();
    let len = signal.len();
    let mut buf: Vec<Complex<f32>> = (0..n)
        .map(|i| {
            if i < len {
                let w = 0.5 - 0.5 * (2.0 * PI * i as f32 / len as f32).cos();
                Complex::new(signal[i] * w, 0.0)
            } else {
                Complex::new(0.0, 0.0)
            }
        })
        .collect();
    FftPlanner::new().plan_fft_forward(n).process(&mut buf);
    let mags = buf[..n / 2 + 1].iter().map(|c| c.norm()).collect();
    (mags, n)
}

/// Frequency of the strongest partial, refined by parabolic interpolation.
pub fn dominant_frequency(signal: &[f32], sr: u32) -> f32 {
    let (mags, n) = magnitude_spectrum(signal);
    let mut peak = 1;
    for k in 2..mags.len() - 1 {
        if mags[k] > mags[peak] {
            peak = k;
        }
    }
    let a = mags[peak - 1].max(1e-12).ln();
    let b = mags[peak].max(1e-12).ln();
    let c = mags[peak + 1].max(1e-12).ln();
    let denom = a - 2.0 * b + c;
    let delta = if denom.abs() > 1e-12 {
        0.5 * (a - c) / denom
    } else {
        0.0
    };
    (peak as f32 + delta) * sr as f32 / n as f32
}

/// Peak magnitude within `±width_hz` of `freq_hz`.
pub fn band_peak(signal: &[f32], sr: u32, freq_hz: f32, width_hz: f32) -> f32 {
    let (mags, n) = magnitude_spectrum(signal);
    let hz_per_bin = sr as f32 / n as f32;
    let lo = ((freq_hz - width_hz) / hz_per_bin).floor().max(0.0) as usize;
    let hi = (((freq_hz + width_hz) / hz_per_bin).ceil() as usize).min(mags.len() - 1);
    mags[lo..=hi].iter().cloned().fold(0.0, f32::max)
}

pub fn assert_freq_near(actual: f32, expected: f32, tolerance: f32, context: &str) {
    let err = (actual - expected).abs() / expected;
    assert!(
        err <= tolerance,
        "{}: dominant {:.2} Hz, expected {:.2} Hz (error {:.2}%)",
        context,
        actual,
        expected,
        err * 100.0
    );
}
