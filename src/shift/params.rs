//! Shift ratios and their lock-free hand-off to the audio thread.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::VoiceError;

/// Supported pitch ratio range (two octaves either way).
pub const PITCH_RATIO_MIN: f32 = 0.25;
pub const PITCH_RATIO_MAX: f32 = 4.0;

/// Supported formant ratio range (one octave either way).
pub const FORMANT_RATIO_MIN: f32 = 0.5;
pub const FORMANT_RATIO_MAX: f32 = 2.0;

/// Converts a shift in semitones to a frequency ratio: `2^(semitones / 12)`.
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    (semitones / 12.0).exp2()
}

/// Pitch and formant ratios applied by the DSP stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParameters {
    pitch_ratio: f32,
    formant_ratio: f32,
}

impl EngineParameters {
    /// Unity ratios: the signal passes through unchanged.
    pub const IDENTITY: Self = Self {
        pitch_ratio: 1.0,
        formant_ratio: 1.0,
    };

    /// Builds validated parameters.
    ///
    /// Out-of-range or non-finite ratios are rejected with
    /// [`VoiceError::InvalidParameter`], never clamped.
    pub fn new(pitch_ratio: f32, formant_ratio: f32) -> Result<Self, VoiceError> {
        check_range("pitch ratio", pitch_ratio, PITCH_RATIO_MIN, PITCH_RATIO_MAX)?;
        check_range(
            "formant ratio",
            formant_ratio,
            FORMANT_RATIO_MIN,
            FORMANT_RATIO_MAX,
        )?;
        Ok(Self {
            pitch_ratio,
            formant_ratio,
        })
    }

    /// Builds parameters from semitone offsets.
    pub fn from_semitones(pitch_semitones: f32, formant_semitones: f32) -> Result<Self, VoiceError> {
        Self::new(
            semitones_to_ratio(pitch_semitones),
            semitones_to_ratio(formant_semitones),
        )
    }

    #[inline]
    pub fn pitch_ratio(&self) -> f32 {
        self.pitch_ratio
    }

    #[inline]
    pub fn formant_ratio(&self) -> f32 {
        self.formant_ratio
    }

    /// True when both ratios are exactly one.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.pitch_ratio == 1.0 && self.formant_ratio == 1.0
    }

    #[inline]
    fn pack(self) -> u64 {
        ((self.pitch_ratio.to_bits() as u64) << 32) | self.formant_ratio.to_bits() as u64
    }

    #[inline]
    fn unpack(bits: u64) -> Self {
        Self {
            pitch_ratio: f32::from_bits((bits >> 32) as u32),
            formant_ratio: f32::from_bits(bits as u32),
        }
    }
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), VoiceError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(VoiceError::InvalidParameter {
            name,
            value,
            min,
            max,
        })
    }
}

/// Single-word publication slot for [`EngineParameters`].
///
/// Both ratios live in one `AtomicU64`, so a store is one atomic write and a
/// load always yields a pair that was stored together.
#[derive(Debug)]
pub struct ParameterCell {
    bits: AtomicU64,
}

impl ParameterCell {
    pub fn new(initial: EngineParameters) -> Self {
        Self {
            bits: AtomicU64::new(initial.pack()),
        }
    }

    #[inline]
    pub fn load(&self) -> EngineParameters {
        EngineParameters::unpack(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, params: EngineParameters) {
        self.bits.store(params.pack(), Ordering::Release);
    }
}

impl Default for ParameterCell {
    fn default() -> Self {
        Self::new(EngineParameters::IDENTITY)
    }
}
