//! Preset table, shared atomics, and the Idle/Running controller.

pub mod controller;
pub mod presets;
pub mod shared;

pub use controller::{SessionController, SessionState, StateDescriptor};
pub use presets::{Gender, PresetTable, VoicePreset};
