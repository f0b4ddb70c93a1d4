//! Integration Tests
//!
//! End-to-end tests for loading, transforming, inspecting and saving audio.

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use auris::dsp::{apply_filter, channel_spectrum, compress, spectrum, to_mono, to_stereo};
use auris::dsp::{FilterSpec, Transform, TransformPipeline};
use auris::engine::{inspect, load, save, waveform};
use auris::{AudioBuffer, AudioFormat, ErrorKind};

/// Helper to create a mono buffer holding the sum of unit sines
fn create_tone_buffer(frequencies: &[f64], sample_rate: f64, num_samples: usize) -> AudioBuffer {
    let samples = (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            frequencies
                .iter()
                .map(|f| (2.0 * std::f64::consts::PI * f * t).sin())
                .sum::<f64>() as f32
        })
        .collect();
    AudioBuffer::from_mono(samples, sample_rate).unwrap()
}

/// Magnitude of the bin nearest `frequency`
fn magnitude_near(buffer: &AudioBuffer, frequency: f64) -> f64 {
    let spec = channel_spectrum(buffer, 0).unwrap();
    spec.bins
        .iter()
        .min_by(|a, b| {
            (a.frequency - frequency)
                .abs()
                .total_cmp(&(b.frequency - frequency).abs())
        })
        .map(|b| b.magnitude)
        .unwrap()
}

// === Full Pipeline Tests ===

#[test]
fn test_stereo_to_mono_then_compress() {
    let mut buffer = AudioBuffer::silence(2, 1000, 1000.0).unwrap();

    to_mono(&mut buffer);
    compress(&mut buffer, 2).unwrap();

    assert_eq!(buffer.num_channels(), 1);
    assert_eq!(buffer.num_samples(), 500);
    assert_eq!(buffer.sample_rate(), 500.0);
}

#[test]
fn test_load_transform_save_load() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");

    let left = create_tone_buffer(&[50.0], 8000.0, 8000);
    let right = create_tone_buffer(&[60.0], 8000.0, 8000);
    let stereo = AudioBuffer::new(
        vec![left.channel(0).to_vec(), right.channel(0).to_vec()],
        8000.0,
    )
    .unwrap();
    save(&stereo, &input, AudioFormat::default()).unwrap();

    let mut buffer = load(&input).unwrap();
    assert_eq!(buffer.num_channels(), 2);

    let pipeline: TransformPipeline = [
        Transform::ToMono,
        Transform::Filter(FilterSpec::low_pass(1000.0)),
        Transform::Compress { factor: 4 },
    ]
    .into_iter()
    .collect();
    pipeline.apply(&mut buffer).unwrap();
    save(&buffer, &output, AudioFormat::wav(16)).unwrap();

    let reloaded = load(&output).unwrap();
    assert_eq!(reloaded.num_channels(), 1);
    assert_eq!(reloaded.num_samples(), 2000);
    assert_eq!(reloaded.sample_rate(), 2000.0);
    assert!(reloaded.is_approx_equal(&buffer, 1e-3));
}

#[test]
fn test_pipeline_file_drives_processing() {
    let dir = TempDir::new().unwrap();
    let pipeline_path = dir.path().join("pipeline.json");
    std::fs::write(
        &pipeline_path,
        r#"{ "steps": [
            { "op": "to_stereo" },
            { "op": "filter", "kind": "high_pass", "cutoff_hz": 20.0 }
        ] }"#,
    )
    .unwrap();

    let pipeline = TransformPipeline::from_file(&pipeline_path).unwrap();
    let mut buffer = create_tone_buffer(&[200.0], 1000.0, 1000);
    pipeline.apply(&mut buffer).unwrap();

    assert_eq!(buffer.num_channels(), 2);
    assert_eq!(buffer.channel(0), buffer.channel(1));
}

#[test]
fn test_missing_pipeline_file() {
    let dir = TempDir::new().unwrap();
    let err = TransformPipeline::from_file(&dir.path().join("none.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
}

// === Filter Tests ===

#[test]
fn test_filter_cutoff_above_nyquist_fails() {
    let mut buffer = create_tone_buffer(&[100.0], 1000.0, 1000);
    let before = buffer.clone();

    let err = apply_filter(&mut buffer, &FilterSpec::low_pass(2000.0)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(buffer, before);
}

#[test]
fn test_lowpass_separates_tones() {
    let mut buffer = create_tone_buffer(&[50.0, 400.0], 1000.0, 1000);
    let low_before = magnitude_near(&buffer, 50.0);
    let high_before = magnitude_near(&buffer, 400.0);

    apply_filter(&mut buffer, &FilterSpec::low_pass(100.0)).unwrap();

    let low_after = magnitude_near(&buffer, 50.0);
    let high_after = magnitude_near(&buffer, 400.0);

    // 50 Hz sits in the pass band, 400 Hz is two octaves past the cutoff
    assert!(low_after > 0.8 * low_before);
    assert!(high_after < 0.01 * high_before);
}

#[test]
fn test_highpass_separates_tones() {
    let mut buffer = create_tone_buffer(&[20.0, 300.0], 1000.0, 1000);

    apply_filter(&mut buffer, &FilterSpec::high_pass(150.0)).unwrap();

    assert!(magnitude_near(&buffer, 300.0) > 400.0);
    assert!(magnitude_near(&buffer, 20.0) < 5.0);
}

// === Channel Tests ===

#[test]
fn test_stereo_conversion_of_mono_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mono.wav");
    save(&create_tone_buffer(&[440.0], 44100.0, 441), &path, AudioFormat::wav(24)).unwrap();

    let mut buffer = load(&path).unwrap();
    to_stereo(&mut buffer);

    assert_eq!(buffer.num_channels(), 2);
    assert_eq!(buffer.channel(0), buffer.channel(1));
}

// === Inspection Tests ===

#[test]
fn test_spectrum_of_every_channel() {
    let buffer = AudioBuffer::new(
        vec![
            create_tone_buffer(&[100.0], 1000.0, 1000).channel(0).to_vec(),
            create_tone_buffer(&[250.0], 1000.0, 1000).channel(0).to_vec(),
        ],
        1000.0,
    )
    .unwrap();

    let spectra = spectrum(&buffer).unwrap();

    assert_eq!(spectra.len(), 2);
    assert_abs_diff_eq!(spectra[0].peak().unwrap().frequency, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(spectra[1].peak().unwrap().frequency, 250.0, epsilon = 1e-9);
}

#[test]
fn test_waveform_after_compress() {
    let mut buffer = create_tone_buffer(&[10.0], 1000.0, 100);
    compress(&mut buffer, 10).unwrap();

    let view = waveform(&buffer);

    assert_eq!(view.len(), 10);
    assert_abs_diff_eq!(view.time[1], 0.01, epsilon = 1e-12);
    assert_abs_diff_eq!(view.time[9], 0.09, epsilon = 1e-12);
}

#[test]
fn test_inspect_reports_file_facts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    save(&create_tone_buffer(&[440.0], 22050.0, 44100), &path, AudioFormat::default()).unwrap();

    let (buffer, info) = inspect(&path).unwrap();

    assert_eq!(info.channels, 1);
    assert_eq!(info.samples, buffer.num_samples());
    assert_abs_diff_eq!(info.duration_secs, 2.0, epsilon = 1e-12);
    assert_eq!(info.sha256.len(), 64);
}

// === Format Tests ===

#[test]
fn test_flac_load_spectrum_and_convert_to_wav() {
    let dir = TempDir::new().unwrap();
    let input = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/stereo_8k.flac");
    let output = dir.path().join("converted.wav");

    let mut buffer = load(&input).unwrap();
    assert_eq!(buffer.num_channels(), 2);
    assert_eq!(buffer.num_samples(), 1000);
    assert_eq!(buffer.sample_rate(), 8000.0);

    // Bins are 8 Hz apart; the two tones sit exactly on bins 55 and 125
    let spectra = spectrum(&buffer).unwrap();
    assert_abs_diff_eq!(spectra[0].peak().unwrap().frequency, 440.0, epsilon = 1e-9);
    assert_abs_diff_eq!(spectra[1].peak().unwrap().frequency, 1000.0, epsilon = 1e-9);

    to_mono(&mut buffer);
    save(&buffer, &output, AudioFormat::default()).unwrap();

    let reloaded = load(&output).unwrap();
    assert_eq!(reloaded, buffer);
}

#[test]
fn test_save_decode_only_format_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.flac");
    let buffer = AudioBuffer::silence(1, 10, 8000.0).unwrap();

    let err = save(&buffer, &path, AudioFormat::Flac).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    assert!(!path.exists());
}

#[test]
fn test_load_missing_file_fails() {
    let err = load(std::path::Path::new("/definitely/not/here.wav")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
}
