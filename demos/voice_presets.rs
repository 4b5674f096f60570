//! Runs a synthetic voice through every preset and prints what comes out.
//!
//! ```sh
//! RUST_LOG=info cargo run --example voice_presets
//! ```

use std::f32::consts::PI;

use voxshift::{EngineConfig, Gender, PresetTable, SessionController, StreamDriver};

const SAMPLE_RATE: u32 = 48_000;
const BLOCK: usize = 480;

/// Pretends to be an open mono device.
struct SimulatedStream;

impl StreamDriver for SimulatedStream {
    fn is_open(&self) -> bool {
        true
    }
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
    fn channels(&self) -> u16 {
        1
    }
}

/// A buzzy 180 Hz source with a few decaying harmonics.
fn voice_like(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (1..=6)
                .map(|h| 0.3 / h as f32 * (2.0 * PI * 180.0 * h as f32 * t).sin())
                .sum()
        })
        .collect()
}

/// Rough f0 from positive-going zero crossings.
fn estimate_f0(signal: &[f32]) -> f32 {
    let crossings = signal
        .windows(2)
        .filter(|w| w[0] <= 0.0 && w[1] > 0.0)
        .count();
    crossings as f32 * SAMPLE_RATE as f32 / signal.len() as f32
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
    let (mut controller, mut engine) = SessionController::new(config, PresetTable::default())?;
    controller.attach_stream(Box::new(SimulatedStream))?;

    let input = voice_like(SAMPLE_RATE as usize);
    let mut output = vec![0.0f32; input.len()];
    let settle = engine.latency_samples() * 3;

    println!(
        "latency: {} samples ({:.1} ms)",
        engine.latency_samples(),
        engine.latency_secs() * 1000.0
    );
    println!("input f0 ~ {:.1} Hz\n", estimate_f0(&input[settle..]));

    for gender in Gender::ALL {
        controller.select_gender(gender);
        let count = controller.presets(gender).len();
        for index in 0..count {
            controller.select_preset(index)?;
            controller.start()?;

            for (inp, out) in input.chunks(BLOCK).zip(output.chunks_mut(BLOCK)) {
                engine.process(inp, out);
            }
            controller.stop();

            let state = controller.current_state();
            let params = controller.parameters();
            println!(
                "{:<6} {} {:<8} pitch x{:.3} formant x{:.3} -> f0 ~ {:.1} Hz",
                state.gender.to_string(),
                state.preset_index,
                state.preset_label,
                params.pitch_ratio(),
                params.formant_ratio(),
                estimate_f0(&output[settle..])
            );
        }
    }

    let metrics = controller.metrics();
    println!("\n{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}
