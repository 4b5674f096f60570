//! Streaming cubic resampling for the pitch stage.
//!
//! The phase vocoder stretches time by the pitch ratio. Reading that stretched
//! signal back at `ratio` samples per output sample restores the original
//! duration and scales every frequency by the ratio.

use crate::core::ring_buffer::RingBuffer;

/// Source samples needed past the read position for a fractional read.
pub const LOOKAHEAD: usize = 2;

/// 4-point Hermite interpolation between `s1` and `s2` at `frac` in [0, 1).
#[inline]
pub fn hermite(taps: [f32; 4], frac: f32) -> f32 {
    let [s0, s1, s2, s3] = taps;
    let c0 = s1;
    let c1 = 0.5 * (s2 - s0);
    let c2 = s0 - 2.5 * s1 + 2.0 * s2 - 0.5 * s3;
    let c3 = 0.5 * (s3 - s0) + 1.5 * (s1 - s2);
    ((c3 * frac + c2) * frac + c1) * frac + c0
}

/// Fractional read head over a FIFO of source samples.
///
/// The source FIFO must start with one sample of history before the first
/// sample to read; [`reset`](Self::reset) assumes that priming.
#[derive(Debug, Clone)]
pub struct StreamResampler {
    /// Read position relative to the source front. The integer part is the
    /// index of `s1`.
    position: f64,
}

impl Default for StreamResampler {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamResampler {
    pub fn new() -> Self {
        Self { position: 1.0 }
    }

    pub fn reset(&mut self) {
        self.position = 1.0;
    }

    /// Emits every output sample whose taps are available in `source`,
    /// moving `step` source samples per output. Consumed history is
    /// discarded from `source`. Returns the number of samples emitted.
    ///
    /// Integer positions read `s1` directly and need no lookahead, so a step
    /// of exactly 1.0 is a sample-exact pass-through.
    pub fn run<F>(&mut self, source: &mut RingBuffer<f32>, step: f64, mut emit: F) -> usize
    where
        F: FnMut(f32),
    {
        let mut emitted = 0;
        loop {
            let base = self.position.floor();
            let idx = base as usize;
            if idx > 1 {
                let wanted = idx - 1;
                let dropped = source.discard(wanted);
                self.position -= dropped as f64;
                if dropped < wanted {
                    break;
                }
                continue;
            }

            let frac = (self.position - base) as f32;
            let needed = if frac == 0.0 { 2 } else { 2 + LOOKAHEAD };
            if source.len() < needed {
                break;
            }

            let mut taps = [0.0f32; 4];
            source.peek_slice(&mut taps);
            emit(hermite(taps, frac));
            emitted += 1;
            self.position += step;
        }
        emitted
    }
}
