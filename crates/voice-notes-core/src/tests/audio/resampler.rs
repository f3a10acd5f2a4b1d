use crate::audio::Resampler;

// Test constants
const DEVICE_SAMPLE_RATE: u32 = 48000;
const LOW_QUALITY_RATE: u32 = 16000;
const HIGH_QUALITY_RATE: u32 = 44100;
const LENGTH_TOLERANCE: u64 = 100;
const TEST_SIGNAL_AMPLITUDE: f32 = 0.5;

/// WHAT: Resampler converts device rate to the LOW quality rate
/// WHY: LOW recordings are encoded at 16kHz regardless of the microphone rate
#[test]
#[allow(clippy::unwrap_used)]
fn given_48khz_audio_when_resampling_to_16khz_then_output_length_approximately_correct() {
    // Given: Resampler configured for 48kHz -> 16kHz
    let mut resampler = Resampler::new(DEVICE_SAMPLE_RATE, LOW_QUALITY_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; DEVICE_SAMPLE_RATE as usize];

    // When: Resampling one second of audio
    let output = resampler.resample(&input).unwrap();

    // Then: Output is approximately one second at 16kHz
    assert!(
        (output.len() as i64 - LOW_QUALITY_RATE as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        LOW_QUALITY_RATE,
        output.len()
    );
    assert!(output.iter().all(|&s| s.is_finite()));
}

/// WHAT: Non-integer ratios keep the recording length
/// WHY: HIGH quality (44.1kHz) from a 48kHz device must not change duration
#[test]
#[allow(clippy::unwrap_used)]
fn given_48khz_audio_when_converting_to_44_1khz_then_duration_preserved() {
    // Given: Two seconds at the device rate
    let input = vec![TEST_SIGNAL_AMPLITUDE; DEVICE_SAMPLE_RATE as usize * 2];

    // When: Converting to the HIGH quality rate
    let output = Resampler::convert(input, DEVICE_SAMPLE_RATE, HIGH_QUALITY_RATE).unwrap();

    // Then: Two seconds at 44.1kHz come out
    let expected = HIGH_QUALITY_RATE as i64 * 2;
    assert!((output.len() as i64 - expected).unsigned_abs() < LENGTH_TOLERANCE);
}

/// WHAT: Matching rates skip resampling entirely
/// WHY: Avoids filter artifacts when the device already runs at the file rate
#[test]
#[allow(clippy::unwrap_used)]
fn given_matching_rates_when_converting_then_samples_unchanged() {
    // Given: Samples already at the target rate
    let input: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();

    // When: Converting to the same rate
    let output = Resampler::convert(input.clone(), HIGH_QUALITY_RATE, HIGH_QUALITY_RATE).unwrap();

    // Then: The samples are returned as-is
    assert_eq!(output, input);
}

/// WHAT: Empty samples return empty output
/// WHY: Edge case handling for zero-length input
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_samples_when_resampling_then_empty_output() {
    // Given: Resampler and empty input
    let mut resampler = Resampler::new(DEVICE_SAMPLE_RATE, LOW_QUALITY_RATE).unwrap();

    // When: Resampling empty data
    let output = resampler.resample(&[]).unwrap();

    // Then: Output is also empty
    assert!(output.is_empty());
}
