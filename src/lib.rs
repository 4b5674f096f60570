#![forbid(unsafe_code)]
//! Real-time voice changer core: pitch and formant shifting for a live
//! microphone stream, driven by gender-grouped presets.
//!
//! `voxshift` pairs a [`SessionController`] that lives on the UI/control
//! thread with a [`VoiceEngine`] that lives inside the audio callback. The
//! two only share atomics: selecting a preset publishes both ratios in a
//! single atomic store, and the callback reads them once per block.
//!
//! The engine time-stretches each channel with a phase-locked vocoder and
//! reads the stretched stream back through a cubic resampler, so partials
//! move by the pitch ratio while duration is preserved. Cepstral formant
//! warping is fused into the same analysis/synthesis pass. End-to-end
//! latency is one analysis window plus a short resampler margin.
//!
//! # Quick Start
//!
//! ```
//! use voxshift::{EngineConfig, Gender, PresetTable, SessionController, StreamDriver};
//!
//! struct Mic;
//! impl StreamDriver for Mic {
//!     fn is_open(&self) -> bool { true }
//!     fn sample_rate(&self) -> u32 { 48_000 }
//!     fn channels(&self) -> u16 { 1 }
//! }
//!
//! let config = EngineConfig::default().with_sample_rate(48_000);
//! let (mut controller, mut engine) =
//!     SessionController::new(config, PresetTable::default()).unwrap();
//!
//! controller.attach_stream(Box::new(Mic)).unwrap();
//! controller.select_gender(Gender::Female);
//! controller.select_preset(4).unwrap();
//! controller.start().unwrap();
//!
//! // Inside the stream callback:
//! let input = vec![0.0f32; 256];
//! let mut output = vec![0.0f32; 256];
//! engine.process(&input, &mut output);
//!
//! controller.stop();
//! ```

pub mod core;
pub mod error;
pub mod session;
pub mod shift;
pub mod stream;

pub use crate::core::types::{EngineConfig, Sample};
pub use error::{Result, VoiceError};
pub use session::{Gender, PresetTable, SessionController, SessionState, StateDescriptor, VoicePreset};
pub use shift::params::{semitones_to_ratio, EngineParameters};
pub use stream::{MetricsSnapshot, StreamDriver, VoiceEngine};
