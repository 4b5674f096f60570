//! State shared between the control thread and the audio callback.
//!
//! Everything here is an atomic: the controller writes, the engine reads, and
//! neither side ever waits on the other.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::shift::params::{EngineParameters, ParameterCell};
use crate::stream::metrics::DspCounters;

#[derive(Debug, Default)]
pub struct SharedSession {
    params: ParameterCell,
    running: AtomicBool,
    /// Bumped on every Idle -> Running transition.
    generation: AtomicU64,
    counters: DspCounters,
}

impl SharedSession {
    pub fn new(initial: EngineParameters) -> Self {
        Self {
            params: ParameterCell::new(initial),
            ..Self::default()
        }
    }

    #[inline]
    pub fn parameters(&self) -> EngineParameters {
        self.params.load()
    }

    #[inline]
    pub fn publish(&self, params: EngineParameters) {
        self.params.store(params);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Marks the session running under a fresh generation.
    pub fn begin(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.running.store(true, Ordering::Release);
    }

    pub fn end(&self) {
        self.running.store(false, Ordering::Release);
    }

    #[inline]
    pub fn counters(&self) -> &DspCounters {
        &self.counters
    }
}
