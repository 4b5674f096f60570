//! Core types, windows, FFT plans, resampling, and the real-time ring buffer.

pub mod fft;
pub mod resample;
pub mod ring_buffer;
pub mod types;
pub mod window;

pub use ring_buffer::{Overrun, RingBuffer, Underrun};
pub use types::*;
pub use resample::StreamResampler;
pub use window::{overlap_gain, periodic_hann};
