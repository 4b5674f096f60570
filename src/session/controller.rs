use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::core::types::EngineConfig;
use crate::error::VoiceError;
use crate::session::presets::{Gender, PresetTable, VoicePreset};
use crate::session::shared::SharedSession;
use crate::shift::params::EngineParameters;
use crate::stream::driver::{check_format, StreamDriver};
use crate::stream::metrics::MetricsSnapshot;
use crate::stream::processor::VoiceEngine;

/// Run state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Running,
}

/// What a UI needs to render the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDescriptor {
    pub gender: Gender,
    pub preset_index: usize,
    pub preset_label: String,
    pub running: bool,
}

/// Control-thread half of a voice session.
///
/// Owns the preset selection and the Idle/Running state machine, and
/// publishes ratios to the paired [`VoiceEngine`] through a single atomic
/// word. Every call returns immediately; none of them wait on the audio
/// callback.
pub struct SessionController {
    config: EngineConfig,
    presets: PresetTable,
    shared: Arc<SharedSession>,
    gender: Gender,
    preset_index: usize,
    state: SessionState,
    stream: Option<Box<dyn StreamDriver>>,
}

impl SessionController {
    /// Validates `config` and `presets` and returns the controller together
    /// with the engine to hand to the stream callback.
    ///
    /// The session starts Idle with `Gender::Male`, preset 0 selected.
    pub fn new(
        config: EngineConfig,
        presets: PresetTable,
    ) -> Result<(Self, VoiceEngine), VoiceError> {
        config.validate()?;
        presets.validate()?;

        let gender = Gender::Male;
        let initial = presets.get(gender, 0)?.parameters()?;
        let shared = Arc::new(SharedSession::new(initial));
        let engine = VoiceEngine::new(config.clone(), Arc::clone(&shared));

        let controller = Self {
            config,
            presets,
            shared,
            gender,
            preset_index: 0,
            state: SessionState::Idle,
            stream: None,
        };
        Ok((controller, engine))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Presets available for `gender`, for display.
    pub fn presets(&self, gender: Gender) -> &[VoicePreset] {
        self.presets.group(gender)
    }

    /// Ratios currently published to the engine.
    pub fn parameters(&self) -> EngineParameters {
        self.shared.parameters()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.counters().snapshot()
    }

    pub fn reset_metrics(&self) {
        self.shared.counters().reset();
    }

    /// Switches gender group, resets the selection to its first preset and
    /// publishes that preset.
    pub fn select_gender(&mut self, gender: Gender) {
        self.gender = gender;
        self.preset_index = 0;
        // Table validation guarantees a valid preset 0 in every group.
        if let Ok(params) = self
            .presets
            .get(gender, 0)
            .and_then(VoicePreset::parameters)
        {
            self.publish(params);
        }
    }

    /// Selects preset `index` of the current gender.
    ///
    /// An index past the end fails with [`VoiceError::IndexOutOfRange`] and
    /// leaves both the selection and the published parameters untouched.
    pub fn select_preset(&mut self, index: usize) -> Result<(), VoiceError> {
        let params = match self.presets.get(self.gender, index) {
            Ok(preset) => preset.parameters()?,
            Err(err) => {
                warn!("rejected preset {} for {}: {}", index, self.gender, err);
                return Err(err);
            }
        };
        self.preset_index = index;
        self.publish(params);
        Ok(())
    }

    /// Hands over the caller's open stream. Replaces any previous stream.
    pub fn attach_stream(&mut self, stream: Box<dyn StreamDriver>) -> Result<(), VoiceError> {
        check_format(stream.as_ref(), &self.config)?;
        info!(
            "stream attached: {} Hz, {} ch",
            stream.sample_rate(),
            stream.channels()
        );
        self.stream = Some(stream);
        Ok(())
    }

    /// Takes the stream back, stopping the session first if it is running.
    pub fn detach_stream(&mut self) -> Option<Box<dyn StreamDriver>> {
        self.stop();
        let stream = self.stream.take();
        if stream.is_some() {
            info!("stream detached");
        }
        stream
    }

    /// Idle -> Running.
    ///
    /// Fails with [`VoiceError::StreamUnavailable`] unless an open stream is
    /// attached. Starting an already running session is a no-op.
    pub fn start(&mut self) -> Result<(), VoiceError> {
        if self.state == SessionState::Running {
            return Ok(());
        }
        match &self.stream {
            Some(stream) if stream.is_open() => {}
            _ => {
                warn!("start requested without an open stream");
                return Err(VoiceError::StreamUnavailable);
            }
        }
        self.shared.begin();
        self.state = SessionState::Running;
        info!(
            "session started ({} / {}), latency {:.1} ms",
            self.gender,
            self.preset_index,
            self.config.latency_secs() * 1000.0
        );
        Ok(())
    }

    /// Running -> Idle.
    ///
    /// Unlike a strict state machine this accepts being called while Idle and
    /// does nothing, so callers can stop unconditionally. An in-flight
    /// callback finishes its block; the next one sees Idle and emits silence.
    pub fn stop(&mut self) {
        if self.state == SessionState::Idle {
            return;
        }
        self.shared.end();
        self.state = SessionState::Idle;
        info!("session stopped");
    }

    /// Starts when idle, stops when running. Returns the new state.
    pub fn toggle(&mut self) -> Result<SessionState, VoiceError> {
        match self.state {
            SessionState::Idle => self.start()?,
            SessionState::Running => self.stop(),
        }
        Ok(self.state)
    }

    pub fn current_state(&self) -> StateDescriptor {
        let label = self
            .presets
            .group(self.gender)
            .get(self.preset_index)
            .map(|p| p.label.clone())
            .unwrap_or_default();
        StateDescriptor {
            gender: self.gender,
            preset_index: self.preset_index,
            preset_label: label,
            running: self.is_running(),
        }
    }

    fn publish(&self, params: EngineParameters) {
        self.shared.publish(params);
        debug!(
            "published pitch ratio {:.4}, formant ratio {:.4} ({} / {})",
            params.pitch_ratio(),
            params.formant_ratio(),
            self.gender,
            self.preset_index
        );
    }
}
