use serde::{Deserialize, Serialize};

use crate::error::VoiceError;

/// A single audio sample (32-bit float, range -1.0 to 1.0).
pub type Sample = f32;

/// Smallest supported analysis window.
pub const MIN_WINDOW_SIZE: usize = 64;

/// Extra output delay covering the resampler's lookahead at the lowest
/// pitch ratio.
pub const RESAMPLE_MARGIN: usize = 16;

/// Engine configuration fixed for the lifetime of a processing session.
///
/// All buffers and FFT plans are sized from this at construction, so nothing
/// here can change while the stream runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz (default: 48000).
    pub sample_rate: u32,
    /// Number of interleaved channels, 1 or 2 (default: 1).
    pub channels: u16,
    /// Analysis/synthesis window length in samples (default: 1024).
    pub window_size: usize,
    /// Window length divided by hop length (default: 4).
    pub overlap: usize,
    /// Ring buffer capacity as a multiple of the window size (default: 4).
    pub ring_multiple: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 1,
            window_size: 1024,
            overlap: 4,
            ring_multiple: 4,
        }
    }
}

impl EngineConfig {
    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the number of channels.
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    /// Set the analysis window size.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the overlap factor (window size / hop size).
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the ring buffer capacity multiple.
    pub fn with_ring_multiple(mut self, ring_multiple: usize) -> Self {
        self.ring_multiple = ring_multiple;
        self
    }

    /// Hop size in samples.
    #[inline]
    pub fn hop_size(&self) -> usize {
        self.window_size / self.overlap.max(1)
    }

    /// Per-channel ring buffer capacity in samples.
    #[inline]
    pub fn ring_capacity(&self) -> usize {
        self.window_size * self.ring_multiple
    }

    /// End-to-end latency in samples: one full window plus
    /// [`RESAMPLE_MARGIN`].
    #[inline]
    pub fn latency_samples(&self) -> usize {
        self.window_size + RESAMPLE_MARGIN
    }

    /// End-to-end latency in seconds.
    pub fn latency_secs(&self) -> f64 {
        self.latency_samples() as f64 / self.sample_rate as f64
    }

    /// Checks every field, returning [`VoiceError::InvalidConfig`] on the first problem.
    pub fn validate(&self) -> Result<(), VoiceError> {
        if self.sample_rate == 0 {
            return Err(VoiceError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.channels == 0 || self.channels > 2 {
            return Err(VoiceError::InvalidConfig(format!(
                "channels must be 1 or 2, got {}",
                self.channels
            )));
        }
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(VoiceError::InvalidConfig(format!(
                "window size {} below minimum {}",
                self.window_size, MIN_WINDOW_SIZE
            )));
        }
        if self.overlap < 2 || self.window_size % self.overlap != 0 {
            return Err(VoiceError::InvalidConfig(format!(
                "overlap {} must be >= 2 and divide window size {}",
                self.overlap, self.window_size
            )));
        }
        if self.ring_multiple < 2 {
            return Err(VoiceError::InvalidConfig(format!(
                "ring multiple {} must be >= 2",
                self.ring_multiple
            )));
        }
        Ok(())
    }
}
