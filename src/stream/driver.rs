//! Boundary to the audio device layer.
//!
//! Opening and closing devices is the caller's job. The session controller
//! only needs to know that a stream exists, is open, and matches the engine
//! format; the driver's periodic callback then calls
//! [`VoiceEngine::process`](crate::stream::VoiceEngine::process).

use crate::core::types::EngineConfig;
use crate::error::VoiceError;

/// An already-open duplex audio stream owned by the caller.
pub trait StreamDriver: Send {
    /// Whether the underlying device is still open.
    fn is_open(&self) -> bool;

    /// Stream sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Interleaved channel count delivered to the callback.
    fn channels(&self) -> u16;
}

/// Checks that `driver` delivers the format `config` was built for.
pub fn check_format(driver: &dyn StreamDriver, config: &EngineConfig) -> Result<(), VoiceError> {
    if driver.sample_rate() != config.sample_rate {
        return Err(VoiceError::StreamMismatch(format!(
            "sample rate {} Hz, engine expects {} Hz",
            driver.sample_rate(),
            config.sample_rate
        )));
    }
    if driver.channels() != config.channels {
        return Err(VoiceError::StreamMismatch(format!(
            "{} channels, engine expects {}",
            driver.channels(),
            config.channels
        )));
    }
    Ok(())
}
