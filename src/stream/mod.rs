pub mod driver;
pub mod metrics;
pub mod processor;

pub use driver::StreamDriver;
pub use metrics::{DspCounters, MetricsSnapshot};
pub use processor::VoiceEngine;
