use crate::{
    RecordingBackend,
    audio::{CpalRecordingBackend, capture::{MAX_CAPTURE_SECONDS, max_capture_frames}, wav},
};

use std::sync::{Arc, Mutex};

/// WHAT: Capture buffer bound allows half-hour memos at any device rate
/// WHY: Voice memos must not be truncated in normal use, even on 96kHz inputs
#[test]
fn given_device_rates_when_computing_capture_limit_then_thirty_minutes_each() {
    // Given/When: The frame limits for common input rates
    let at_44k = max_capture_frames(44_100);
    let at_48k = max_capture_frames(48_000);
    let at_96k = max_capture_frames(96_000);

    // Then: Each covers thirty minutes at its own rate
    assert_eq!(MAX_CAPTURE_SECONDS, 30 * 60);
    assert_eq!(at_44k, 44_100 * 1800);
    assert_eq!(at_48k, 86_400_000);
    assert_eq!(at_96k, 172_800_000);
}

/// WHAT: Stereo callback data is averaged to mono
/// WHY: Notes are stored as mono files regardless of the input layout
#[test]
fn given_stereo_frames_when_downmixing_then_channels_averaged() {
    // Given: Two interleaved stereo frames
    let interleaved = [0.2f32, 0.4, -1.0, 1.0];

    // When: Downmixing
    let mono = wav::downmix(&interleaved, 2);

    // Then: Each frame becomes the mean of its channels
    assert_eq!(mono.len(), 2);
    assert!((mono[0] - 0.3).abs() < f32::EPSILON);
    assert!(mono[1].abs() < f32::EPSILON);
}

/// WHAT: Lock poison recovery preserves buffer data
/// WHY: Ensures captured audio is never silently lost on mutex poison
#[test]
#[allow(clippy::unwrap_used)]
fn given_poisoned_mutex_when_recovering_then_data_preserved() {
    // Given: A mutex poisoned by a panic while holding the lock
    let buf = Arc::new(Mutex::new(vec![0.5f32; 100]));
    let buf_clone = Arc::clone(&buf);

    let _ = std::thread::spawn(move || {
        let _guard = buf_clone.lock().unwrap();
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering from poisoned lock using unwrap_or_else
    let recovered = buf.lock().unwrap_or_else(|e| e.into_inner());

    // Then: Original data is fully preserved
    assert_eq!(recovered.len(), 100);
    assert!(recovered.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

/// WHAT: Stopping a backend that never started yields no file
/// WHY: The recorder turns a missing file into a finalize error
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unstarted_backend_when_stopping_then_no_file_produced() {
    // Given: A backend that never opened a device
    let dir = tempfile::tempdir().unwrap();
    let mut backend = CpalRecordingBackend::new(None, dir.path());

    // When: Stopping capture
    let output = backend.stop_capture().await.unwrap();

    // Then: Nothing was produced
    assert!(output.file.is_none());
}

/// WHAT: Real microphone capture produces a WAV file
/// WHY: End-to-end check of cpal capture, resampling and encoding
#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
async fn given_default_microphone_when_recording_briefly_then_file_written() {
    // Given: The default input device
    let dir = tempfile::tempdir().unwrap();
    let mut backend = CpalRecordingBackend::new(None, dir.path());
    assert!(backend.request_permission().await);

    // When: Capturing for half a second
    backend
        .start_capture(crate::RecordingQuality::Low)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    let output = backend.stop_capture().await.unwrap();

    // Then: A file exists and bookkeeping saw roughly half a second
    let file = output.file.unwrap();
    assert!(file.exists());
    assert!(output.recorded.unwrap().as_millis() > 200);
}
