mod common;

use common::*;
use voxshift::{EngineConfig, Gender, PresetTable, SessionController, VoicePreset};

const SR: u32 = 44_100;

/// Window sizes the matrix tests run at: the default 48 kHz setup and a
/// longer window at 44.1 kHz.
const CONFIGS: [(u32, usize); 2] = [(48_000, 1024), (44_100, 2048)];

fn analysis_config() -> EngineConfig {
    EngineConfig::default()
        .with_sample_rate(SR)
        .with_window_size(2048)
        .with_overlap(4)
}

/// Session whose male group holds one preset per (pitch, formant) offset.
fn session_with_offsets(
    config: &EngineConfig,
    offsets: &[(f32, f32)],
) -> (voxshift::SessionController, voxshift::VoiceEngine) {
    let male = offsets
        .iter()
        .map(|&(pitch, formant)| VoicePreset::new(pitch, formant, format!("{:+}", pitch)))
        .collect();
    let female = vec![VoicePreset::new(0.0, 0.0, "plain")];
    let table = PresetTable::new(male, female).unwrap();
    let (mut controller, engine) = SessionController::new(config.clone(), table).unwrap();
    controller
        .attach_stream(Box::new(FakeStream::for_config(config)))
        .unwrap();
    (controller, engine)
}

/// Steady-state part of an output, past the latency and the first windows.
fn settled(output: &[f32], config: &EngineConfig) -> Vec<f32> {
    let skip = config.latency_samples() + 2 * config.window_size;
    output[skip..].to_vec()
}

#[test]
fn pitch_ratios_move_the_dominant_partial() {
    let semitones = [-24.0f32, -12.0, -5.0, 3.0, 7.0, 12.0, 19.0, 24.0];
    // Formant offsets stay inside their +/-12 semitone range.
    let offsets: Vec<(f32, f32)> = semitones
        .iter()
        .map(|&s| (s, s.clamp(-12.0, 12.0)))
        .collect();

    for (sample_rate, window) in CONFIGS {
        let config = EngineConfig::default()
            .with_sample_rate(sample_rate)
            .with_window_size(window);
        let (mut controller, mut engine) = session_with_offsets(&config, &offsets);

        for freq in [110.0f32, 220.0, 440.0] {
            let input = gen_sine(freq, sample_rate, sample_rate as usize * 3 / 2, 0.5);

            for (index, &st) in semitones.iter().enumerate() {
                controller.select_preset(index).unwrap();
                controller.stop();
                controller.start().unwrap();

                let output = run_blocks(&mut engine, &input, 512);
                assert_eq!(output.len(), input.len());

                let expected = freq * voxshift::semitones_to_ratio(st);
                let measured = dominant_frequency(&settled(&output, &config), sample_rate);
                assert_freq_near(
                    measured,
                    expected,
                    0.03,
                    &format!("{} Hz {:+} st at {}/{}", freq, st, sample_rate, window),
                );
            }
        }
    }
}

#[test]
fn level_is_kept_when_formants_follow_pitch() {
    let semitones = [-12.0f32, -7.0, -3.0, 3.0, 5.0, 7.0, 12.0];
    let offsets: Vec<(f32, f32)> = semitones.iter().map(|&s| (s, s)).collect();

    for (sample_rate, window) in CONFIGS {
        let config = EngineConfig::default()
            .with_sample_rate(sample_rate)
            .with_window_size(window);
        let (mut controller, mut engine) = session_with_offsets(&config, &offsets);
        let input = gen_sine(220.0, sample_rate, sample_rate as usize, 0.5);
        let input_rms = rms(&settled(&input, &config));

        for (index, &st) in semitones.iter().enumerate() {
            controller.select_preset(index).unwrap();
            controller.stop();
            controller.start().unwrap();

            let output = run_blocks(&mut engine, &input, 480);
            let output_rms = rms(&settled(&output, &config));
            let gain_db = 20.0 * (output_rms / input_rms).log10();
            assert!(
                gain_db.abs() <= 3.0,
                "{:+} st at {}/{}: level changed by {:.2} dB",
                st,
                sample_rate,
                window,
                gain_db
            );
        }
    }
}

#[test]
fn duration_is_preserved() {
    let config = analysis_config();
    let (mut controller, mut engine) = session_with_offsets(&config, &[(7.0, 0.0)]);
    controller.start().unwrap();

    let input = gen_sine(330.0, SR, SR as usize, 0.5);
    let output = run_blocks(&mut engine, &input, 441);
    assert_eq!(output.len(), input.len());

    // Energy reaches the end of the block stream instead of trailing off.
    let tail = &output[output.len() - config.window_size..];
    assert!(rms(tail) > 0.1, "tail rms {}", rms(tail));
}

#[test]
fn brightest_female_preset_on_a3() {
    let config = analysis_config();
    let (_controller, mut engine) = running_session(config.clone(), Gender::Female, 4);

    let input = gen_sine(220.0, SR, SR as usize * 2, 0.5);
    let output = run_blocks(&mut engine, &input, 256);

    // +5 semitones: 220 * 2^(5/12)
    let measured = dominant_frequency(&settled(&output, &config), SR);
    assert_freq_near(measured, 293.66, 0.02, "female preset 4");
}

#[test]
fn deepest_male_preset_lowers_pitch() {
    let config = analysis_config();
    let (_controller, mut engine) = running_session(config.clone(), Gender::Male, 2);

    let input = gen_sine(330.0, SR, SR as usize * 2, 0.5);
    let output = run_blocks(&mut engine, &input, 256);

    let measured = dominant_frequency(&settled(&output, &config), SR);
    assert_freq_near(measured, 330.0 * voxshift::semitones_to_ratio(-4.0), 0.03, "male preset 2");
}

#[test]
fn formant_only_preset_keeps_pitch() {
    // Male "clear" preset: pitch untouched, formants up two semitones.
    let config = analysis_config();
    let (_controller, mut engine) = running_session(config.clone(), Gender::Male, 4);

    let input = gen_sine(262.0, SR, SR as usize * 2, 0.5);
    let output = run_blocks(&mut engine, &input, 256);

    let measured = dominant_frequency(&settled(&output, &config), SR);
    assert_freq_near(measured, 262.0, 0.02, "male preset 4");
}

#[test]
fn stereo_channels_are_shifted_independently() {
    let config = analysis_config().with_channels(2);
    let (_controller, mut engine) = running_session(config.clone(), Gender::Female, 4);

    let n = SR as usize * 2;
    let left = gen_sine(220.0, SR, n, 0.5);
    let right = gen_sine(330.0, SR, n, 0.5);
    let input: Vec<f32> = left.iter().zip(&right).flat_map(|(&l, &r)| [l, r]).collect();

    let output = run_blocks(&mut engine, &input, 512);
    let out_left: Vec<f32> = output.iter().step_by(2).cloned().collect();
    let out_right: Vec<f32> = output.iter().skip(1).step_by(2).cloned().collect();

    let ratio = voxshift::semitones_to_ratio(5.0);
    assert_freq_near(
        dominant_frequency(&settled(&out_left, &config), SR),
        220.0 * ratio,
        0.02,
        "left",
    );
    assert_freq_near(
        dominant_frequency(&settled(&out_right, &config), SR),
        330.0 * ratio,
        0.02,
        "right",
    );
}

#[test]
fn silence_stays_silent_under_shift() {
    let (controller, mut engine) = running_session(analysis_config(), Gender::Female, 2);
    let input = vec![0.0f32; SR as usize / 2];
    let output = run_blocks(&mut engine, &input, 256);
    assert!(output.iter().all(|&s| s.abs() < 1e-6));
    assert!(controller.metrics().unstable_frames > 0);
}
