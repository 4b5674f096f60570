//! Voice presets grouped by gender.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VoiceError;
use crate::shift::params::EngineParameters;

/// Preset group selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// One selectable voice: pitch and formant offsets in semitones plus a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicePreset {
    pub pitch_semitones: f32,
    pub formant_shift: f32,
    pub label: String,
}

impl VoicePreset {
    pub fn new(pitch_semitones: f32, formant_shift: f32, label: impl Into<String>) -> Self {
        Self {
            pitch_semitones,
            formant_shift,
            label: label.into(),
        }
    }

    /// Ratios derived as `2^(semitones / 12)`, validated against the engine ranges.
    pub fn parameters(&self) -> Result<EngineParameters, VoiceError> {
        EngineParameters::from_semitones(self.pitch_semitones, self.formant_shift)
    }
}

/// Ordered presets for each gender, validated on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetTable {
    male: Vec<VoicePreset>,
    female: Vec<VoicePreset>,
}

impl PresetTable {
    /// Builds a table, rejecting empty groups and presets whose ratios fall
    /// outside the supported ranges.
    pub fn new(male: Vec<VoicePreset>, female: Vec<VoicePreset>) -> Result<Self, VoiceError> {
        let table = Self { male, female };
        table.validate()?;
        Ok(table)
    }

    /// Parses a table from JSON of the form
    /// `{"male": [{"pitch_semitones": 0, "formant_shift": 0, "label": "..."}], "female": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, VoiceError> {
        let table: PresetTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, VoiceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), VoiceError> {
        for gender in Gender::ALL {
            let group = self.group(gender);
            if group.is_empty() {
                return Err(VoiceError::EmptyPresetGroup(gender));
            }
            for preset in group {
                preset.parameters()?;
            }
        }
        Ok(())
    }

    /// Presets of one gender, in selection order.
    pub fn group(&self, gender: Gender) -> &[VoicePreset] {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    /// Looks up a preset, failing with [`VoiceError::IndexOutOfRange`].
    pub fn get(&self, gender: Gender, index: usize) -> Result<&VoicePreset, VoiceError> {
        let group = self.group(gender);
        group.get(index).ok_or(VoiceError::IndexOutOfRange {
            index,
            len: group.len(),
        })
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self {
            male: vec![
                VoicePreset::new(0.0, 0.0, "通常"),
                VoicePreset::new(-2.0, 0.0, "低め"),
                VoicePreset::new(-4.0, -2.0, "さらに低い"),
                VoicePreset::new(1.0, -1.0, "少し高め"),
                VoicePreset::new(0.0, 2.0, "クリア"),
            ],
            female: vec![
                VoicePreset::new(0.0, 0.0, "通常"),
                VoicePreset::new(2.0, 1.0, "高め"),
                VoicePreset::new(4.0, 2.0, "さらに高い"),
                VoicePreset::new(3.0, 3.0, "かわいい"),
                VoicePreset::new(5.0, 4.0, "超かわいい"),
            ],
        }
    }
}
