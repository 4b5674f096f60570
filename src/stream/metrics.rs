//! Non-blocking counters for conditions recovered inside the audio callback.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters bumped by the real-time path with relaxed atomics.
#[derive(Debug, Default)]
pub struct DspCounters {
    overruns: AtomicU64,
    underruns: AtomicU64,
    unstable_frames: AtomicU64,
    hops: AtomicU64,
    idle_callbacks: AtomicU64,
}

/// Point-in-time copy of [`DspCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Samples dropped because a ring buffer was full.
    pub overruns: u64,
    /// Samples replaced by silence because output was not ready.
    pub underruns: u64,
    /// Frames too quiet for envelope estimation, passed through unwarped.
    pub unstable_frames: u64,
    /// Analysis hops processed.
    pub hops: u64,
    /// Callbacks answered with silence because the session was idle.
    pub idle_callbacks: u64,
}

impl DspCounters {
    #[inline]
    pub fn add_overrun(&self, dropped: usize) {
        self.overruns.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_underrun(&self, missing: usize) {
        self.underruns.fetch_add(missing as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_unstable_frame(&self) {
        self.unstable_frames.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_hop(&self) {
        self.hops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_idle_callback(&self) {
        self.idle_callbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            overruns: self.overruns.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
            unstable_frames: self.unstable_frames.load(Ordering::Relaxed),
            hops: self.hops.load(Ordering::Relaxed),
            idle_callbacks: self.idle_callbacks.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.overruns.store(0, Ordering::Relaxed);
        self.underruns.store(0, Ordering::Relaxed);
        self.unstable_frames.store(0, Ordering::Relaxed);
        self.hops.store(0, Ordering::Relaxed);
        self.idle_callbacks.store(0, Ordering::Relaxed);
    }
}
