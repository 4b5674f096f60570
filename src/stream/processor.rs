use std::sync::Arc;

use crate::core::fft::WINDOW_SUM_EPSILON;
use crate::core::resample::StreamResampler;
use crate::core::ring_buffer::RingBuffer;
use crate::core::types::{EngineConfig, RESAMPLE_MARGIN};
use crate::core::window::overlap_gain;
use crate::session::shared::SharedSession;
use crate::shift::envelope::FormantOutcome;
use crate::shift::params::EngineParameters;
use crate::shift::phase_vocoder::PitchShifter;
use crate::stream::metrics::DspCounters;

/// Streaming state for one channel.
///
/// Input samples queue in `input` until a full window is available. The
/// [`PitchShifter`] stretches them into `stretched` one synthesis hop per
/// frame, and the [`StreamResampler`] turns that back into real-time
/// samples in `output`.
struct ChannelPipeline {
    window_size: usize,
    hop: usize,
    input: RingBuffer<f32>,
    /// Input samples still to be dropped because the last analysis step ran
    /// past the end of `input`.
    pending_skip: usize,
    /// Fractional part of the analysis position, in samples.
    analysis_frac: f64,
    stretched: RingBuffer<f32>,
    output: RingBuffer<f32>,
    /// Current analysis frame.
    frame: Vec<f32>,
    /// Windowed synthesis frame from the shifter.
    synth: Vec<f32>,
    accum: Vec<f32>,
    /// Squared-window overlap gain per position within a hop.
    gain: Vec<f32>,
    /// One hop of finished or requested samples.
    hop_buf: Vec<f32>,
    shifter: PitchShifter,
    resampler: StreamResampler,
}

impl ChannelPipeline {
    fn new(config: &EngineConfig) -> Self {
        let window_size = config.window_size;
        let hop = config.hop_size();
        let shifter = PitchShifter::new(window_size, hop, config.sample_rate);
        let gain = overlap_gain(shifter.window(), hop);

        let mut pipeline = Self {
            window_size,
            hop,
            input: RingBuffer::with_capacity(config.ring_capacity()),
            pending_skip: 0,
            analysis_frac: 0.0,
            stretched: RingBuffer::with_capacity(config.ring_capacity()),
            output: RingBuffer::with_capacity(config.ring_capacity()),
            frame: vec![0.0; window_size],
            synth: vec![0.0; window_size],
            accum: vec![0.0; window_size],
            gain,
            hop_buf: vec![0.0; hop],
            shifter,
            resampler: StreamResampler::new(),
        };
        pipeline.reset();
        pipeline
    }

    /// Drops all audio and primes every FIFO with silence.
    ///
    /// The input gets `window - hop` samples so the first frame completes
    /// after one hop. The stretched FIFO gets the resampler's history
    /// sample. The output gets one hop plus [`RESAMPLE_MARGIN`], which keeps
    /// block sizes that do not divide the hop and the resampler's lookahead
    /// from underrunning.
    fn reset(&mut self) {
        self.input.clear();
        self.stretched.clear();
        self.output.clear();
        self.pending_skip = 0;
        self.analysis_frac = 0.0;
        self.accum.iter_mut().for_each(|x| *x = 0.0);
        self.shifter.reset();
        self.resampler.reset();

        self.frame.iter_mut().for_each(|x| *x = 0.0);
        self.input.push_slice(&self.frame[..self.window_size - self.hop]);
        self.stretched.push_slice(&self.frame[..1]);
        self.output.push_slice(&self.frame[..self.hop + RESAMPLE_MARGIN]);
    }

    #[inline]
    fn feed(&mut self, sample: f32, counters: &DspCounters) {
        if self.pending_skip > 0 {
            self.pending_skip -= 1;
            return;
        }
        let sample = if sample.is_finite() { sample } else { 0.0 };
        if let Err(overrun) = self.input.write(&[sample]) {
            counters.add_overrun(overrun.dropped);
        }
    }

    /// Processes every complete frame waiting in the input FIFO and drains
    /// the resampler into the output FIFO.
    fn run_frames(&mut self, params: EngineParameters, counters: &DspCounters) {
        let w = self.window_size;
        let h = self.hop;
        let ratio = params.pitch_ratio() as f64;

        while self.input.len() >= w {
            let advance = self.analysis_frac + h as f64 / ratio;
            let step = advance.floor() as usize;
            self.analysis_frac = advance - step as f64;

            self.input.peek_slice(&mut self.frame);
            let outcome = self
                .shifter
                .process_frame(&self.frame, step, params, &mut self.synth);
            if outcome == FormantOutcome::Silent {
                counters.add_unstable_frame();
            }

            for (acc, &s) in self.accum.iter_mut().zip(self.synth.iter()) {
                *acc += s;
            }
            for (i, out) in self.hop_buf.iter_mut().enumerate() {
                *out = self.accum[i] / self.gain[i].max(WINDOW_SUM_EPSILON);
            }
            if let Err(overrun) = self.stretched.write(&self.hop_buf) {
                counters.add_overrun(overrun.dropped);
            }

            self.accum.copy_within(h.., 0);
            self.accum[w - h..].iter_mut().for_each(|x| *x = 0.0);
            counters.add_hop();

            let discarded = self.input.discard(step);
            self.pending_skip += step - discarded;
        }

        let Self {
            stretched,
            output,
            resampler,
            ..
        } = self;
        resampler.run(stretched, ratio, |s| {
            if let Err(overrun) = output.write(&[finalize_sample(s)]) {
                counters.add_overrun(overrun.dropped);
            }
        });
    }
}

/// Replaces non-finite values with silence and clamps to the sample range.
#[inline]
fn finalize_sample(sample: f32) -> f32 {
    if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Real-time half of a voice session.
///
/// Move this into the stream driver's callback and call
/// [`process`](Self::process) once per delivered block. It never blocks,
/// logs or allocates after construction; parameters and run state arrive
/// through atomics published by the
/// [`SessionController`](crate::session::SessionController).
pub struct VoiceEngine {
    config: EngineConfig,
    shared: Arc<SharedSession>,
    channels: Vec<ChannelPipeline>,
    /// Session generation the buffers belong to.
    generation: u64,
    active: EngineParameters,
}

impl VoiceEngine {
    pub(crate) fn new(config: EngineConfig, shared: Arc<SharedSession>) -> Self {
        let channels = (0..config.channels)
            .map(|_| ChannelPipeline::new(&config))
            .collect();
        let generation = shared.generation();
        let active = shared.parameters();
        Self {
            config,
            shared,
            channels,
            generation,
            active,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parameters used by the most recent running callback.
    pub fn active_parameters(&self) -> EngineParameters {
        self.active
    }

    /// Input-to-output delay in samples.
    pub fn latency_samples(&self) -> usize {
        self.config.latency_samples()
    }

    /// Input-to-output delay in seconds.
    pub fn latency_secs(&self) -> f64 {
        self.config.latency_secs()
    }

    /// Transforms one interleaved block.
    ///
    /// When the session is idle `output` is silenced and nothing else
    /// happens. If the slices differ in length only the common prefix is
    /// processed and the rest of `output` is silenced. Parameters are read
    /// once per call, so a whole block shares a single snapshot.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        if !self.shared.is_running() {
            output.iter_mut().for_each(|x| *x = 0.0);
            self.shared.counters().add_idle_callback();
            return;
        }

        let generation = self.shared.generation();
        if generation != self.generation {
            self.generation = generation;
            for channel in &mut self.channels {
                channel.reset();
            }
        }

        let params = self.shared.parameters();
        self.active = params;

        let nc = self.channels.len();
        let len = input.len().min(output.len());
        let frames = len / nc;
        output[frames * nc..].iter_mut().for_each(|x| *x = 0.0);

        let counters = self.shared.counters();
        let hop = self.config.hop_size();

        let mut start = 0;
        while start < frames {
            let end = (start + hop).min(frames);

            for (ch, pipeline) in self.channels.iter_mut().enumerate() {
                for f in start..end {
                    pipeline.feed(input[f * nc + ch], counters);
                }
                pipeline.run_frames(params, counters);
            }

            for (ch, pipeline) in self.channels.iter_mut().enumerate() {
                let n = end - start;
                let ChannelPipeline {
                    output: ring,
                    hop_buf,
                    ..
                } = pipeline;
                if let Err(underrun) = ring.read(&mut hop_buf[..n]) {
                    counters.add_underrun(underrun.missing);
                }
                for (i, &s) in hop_buf[..n].iter().enumerate() {
                    output[(start + i) * nc + ch] = s;
                }
            }

            start = end;
        }
    }
}
