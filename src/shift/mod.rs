pub mod envelope;
pub mod params;
pub mod phase_locking;
pub mod phase_vocoder;

pub use envelope::{FormantCorrector, FormantOutcome};
pub use params::{semitones_to_ratio, EngineParameters, ParameterCell};
pub use phase_vocoder::PitchShifter;
