use crate::{NoteError, RecordingQuality, audio::wav};

/// WHAT: Encoded files report their duration from the header
/// WHY: The header is the fallback when capture bookkeeping is missing
#[test]
#[allow(clippy::unwrap_used)]
fn given_one_second_high_quality_file_when_probing_then_duration_is_one_second() {
    // Given: One second of audio encoded at HIGH quality
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.wav");
    let quality = RecordingQuality::High;
    wav::encode(&path, &vec![0.25; quality.sample_rate() as usize], quality).unwrap();

    // When: Probing the header
    let duration = wav::probe_duration(&path).unwrap().unwrap();

    // Then: It reports one second
    assert!((duration.as_secs_f64() - 1.0).abs() < 1e-6);
}

/// WHAT: Quality selects encoder rate and bit depth
/// WHY: Quality affects encoder parameters of new recordings
#[test]
#[allow(clippy::unwrap_used)]
fn given_low_quality_when_encoding_then_header_is_16khz_16bit_mono() {
    // Given: A LOW quality encode
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("low.wav");
    wav::encode(&path, &[0.0; 1600], RecordingQuality::Low).unwrap();

    // When: Reading the header back
    let spec = hound::WavReader::open(&path).unwrap().spec();

    // Then: Parameters match LOW
    assert_eq!(spec.sample_rate, 16_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.channels, 1);
}

/// WHAT: Decoding restores normalized samples at the file rate
/// WHY: Playback needs the original rate to compute its cursor step
#[test]
#[allow(clippy::unwrap_used)]
fn given_encoded_file_when_decoding_then_samples_and_rate_restored() {
    // Given: A MEDIUM quality file holding a constant signal
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medium.wav");
    wav::encode(&path, &[0.5; 2205], RecordingQuality::Medium).unwrap();

    // When: Decoding it
    let decoded = wav::decode(&path).unwrap();

    // Then: Rate, length and level survive within quantization error
    assert_eq!(decoded.sample_rate, 22_050);
    assert_eq!(decoded.samples.len(), 2205);
    assert!(decoded.samples.iter().all(|s| (s - 0.5).abs() < 1e-3));
    assert!((decoded.duration().as_secs_f64() - 0.1).abs() < 1e-6);
}

/// WHAT: Out-of-range input is clamped instead of wrapping
/// WHY: Wrapped integers would produce loud clicks
#[test]
#[allow(clippy::unwrap_used)]
fn given_clipping_samples_when_encoding_then_values_clamped() {
    // Given: Samples beyond full scale
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    wav::encode(&path, &[2.0, -2.0], RecordingQuality::Low).unwrap();

    // When: Decoding
    let decoded = wav::decode(&path).unwrap();

    // Then: Values sit at full scale with their sign intact
    assert!(decoded.samples[0] > 0.99);
    assert!(decoded.samples[1] < -0.99);
}

/// WHAT: A missing file fails to decode with a playback error
/// WHY: Playback of a deleted file must report PlaybackError
#[test]
fn given_missing_file_when_decoding_then_playback_error() {
    // Given: A path that does not exist
    let path = std::path::Path::new("/nonexistent/note.wav");

    // When: Decoding
    let result = wav::decode(path);

    // Then: Returns Playback error
    assert!(matches!(result, Err(NoteError::Playback { .. })));
}

/// WHAT: An empty file has no known duration
/// WHY: Absent duration means unknown length, not zero length
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_file_when_probing_then_duration_absent() {
    // Given: A valid header with no samples
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.wav");
    wav::encode(&path, &[], RecordingQuality::High).unwrap();

    // When: Probing
    let duration = wav::probe_duration(&path).unwrap();

    // Then: None
    assert!(duration.is_none());
}
