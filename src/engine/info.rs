//! Loaded-file summary
//!
//! What the inspector shows after a load: rate, duration, channels, sample
//! count, levels, and a SHA-256 of the source file for integrity checks.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::engine::buffer::{calculate_peak, calculate_rms, AudioBuffer};
use crate::engine::io;
use crate::error::Result;

/// Summary of a loaded audio file
#[derive(Debug, Clone, Serialize)]
pub struct AudioInfo {
    pub path: String,
    pub sample_rate: f64,
    pub duration_secs: f64,
    pub channels: usize,
    pub layout: String,
    pub samples: usize,
    /// Peak level in dBFS (null in JSON when silent)
    pub peak_db: f32,
    /// RMS level in dBFS (null in JSON when silent)
    pub rms_db: f32,
    pub sha256: String,
}

impl AudioInfo {
    /// Summarize an already-loaded buffer
    pub fn from_buffer(path: &Path, buffer: &AudioBuffer, sha256: String) -> Self {
        AudioInfo {
            path: path.display().to_string(),
            sample_rate: buffer.sample_rate(),
            duration_secs: buffer.duration_secs(),
            channels: buffer.num_channels(),
            layout: buffer.channel_layout().to_string(),
            samples: buffer.num_samples(),
            peak_db: calculate_peak(buffer),
            rms_db: calculate_rms(buffer),
            sha256,
        }
    }
}

impl fmt::Display for AudioInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loaded {}", self.path)?;
        writeln!(f, "Sample Rate: {} Hz", self.sample_rate)?;
        writeln!(f, "Duration: {:.2} seconds", self.duration_secs)?;
        writeln!(f, "Channels: {} ({})", self.channels, self.layout)?;
        writeln!(f, "Samples: {}", self.samples)?;
        writeln!(f, "Peak: {:.1} dBFS", self.peak_db)?;
        writeln!(f, "RMS: {:.1} dBFS", self.rms_db)?;
        write!(f, "SHA-256: {}", self.sha256)
    }
}

/// Load a file and summarize it
pub fn inspect(path: &Path) -> Result<(AudioBuffer, AudioInfo)> {
    let buffer = io::load(path)?;
    let hash = file_sha256(path)?;
    let info = AudioInfo::from_buffer(path, &buffer, hash);
    Ok((buffer, info))
}

/// Hex SHA-256 of a file's bytes
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&chunk[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::io::{save, AudioFormat};
    use tempfile::tempdir;

    #[test]
    fn test_sha256_known_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(
            file_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_inspect_reports_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let tone = AudioBuffer::sine_wave(440.0, 0.5, 16000.0).unwrap();
        save(&tone, &path, AudioFormat::default()).unwrap();

        let (buffer, info) = inspect(&path).unwrap();

        assert_eq!(buffer, tone);
        assert_eq!(info.sample_rate, 16000.0);
        assert_eq!(info.channels, 1);
        assert_eq!(info.layout, "mono");
        assert_eq!(info.samples, 8000);
        assert!((info.duration_secs - 0.5).abs() < 1e-9);
        assert!(info.peak_db <= 0.0 && info.peak_db > -0.1);
        assert_eq!(info.sha256.len(), 64);

        let text = info.to_string();
        assert!(text.contains("Sample Rate: 16000 Hz"));
        assert!(text.contains("Duration: 0.50 seconds"));
    }
}
