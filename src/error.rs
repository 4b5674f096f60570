//! Error types for the voxshift crate.

use thiserror::Error;

use crate::session::presets::Gender;

/// Errors returned synchronously on the control path.
///
/// Real-time recoverable conditions (ring buffer overrun/underrun, unstable
/// envelope frames) never surface here; they are counted in
/// [`DspCounters`](crate::stream::metrics::DspCounters) instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoiceError {
    /// A pitch or formant ratio outside the supported range.
    #[error("invalid {name}: {value} is outside [{min}, {max}]")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    /// Preset index past the end of the current gender group.
    #[error("preset index {index} out of range (group has {len} presets)")]
    IndexOutOfRange { index: usize, len: usize },
    /// `start` was requested without an attached, open stream.
    #[error("no open audio stream attached")]
    StreamUnavailable,
    /// The attached stream's format does not match the engine configuration.
    #[error("stream does not match engine: {0}")]
    StreamMismatch(String),
    /// Invalid engine configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A gender group in the preset table has no entries.
    #[error("preset group {0:?} is empty")]
    EmptyPresetGroup(Gender),
    /// Preset data could not be parsed or serialized.
    #[error("preset format error: {0}")]
    PresetFormat(String),
}

impl From<serde_json::Error> for VoiceError {
    fn from(err: serde_json::Error) -> Self {
        VoiceError::PresetFormat(err.to_string())
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, VoiceError>;
