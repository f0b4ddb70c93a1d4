//! Magnitude spectrum for display
//!
//! One real-input DFT over the whole channel (no windowing, no averaging),
//! non-negative frequencies only. Bin `k` sits at `k * sample_rate / n` and
//! there are `n / 2 + 1` bins. Magnitudes are unnormalized `|X[k]|`.

use std::sync::Arc;

use log::debug;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use serde::Serialize;

use crate::engine::AudioBuffer;
use crate::error::{AurisError, Result};

/// Lowest level reported by [`ChannelSpectrum::to_db`]
pub const DB_FLOOR: f64 = -120.0;

/// One frequency bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectrumBin {
    /// Bin center in Hz
    pub frequency: f64,
    /// `|X[k]|`
    pub magnitude: f64,
}

/// Spectrum of a single channel, ordered by increasing frequency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSpectrum {
    pub channel: usize,
    pub bins: Vec<SpectrumBin>,
}

impl ChannelSpectrum {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Strongest bin above DC, or DC itself for a one-bin spectrum
    pub fn peak(&self) -> Option<&SpectrumBin> {
        let candidates = if self.bins.len() > 1 {
            &self.bins[1..]
        } else {
            &self.bins[..]
        };
        candidates
            .iter()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    }

    /// Magnitudes in dB relative to 1.0, floored at [`DB_FLOOR`]
    pub fn to_db(&self) -> Vec<f64> {
        self.bins
            .iter()
            .map(|bin| {
                if bin.magnitude > 0.0 {
                    (20.0 * bin.magnitude.log10()).max(DB_FLOOR)
                } else {
                    DB_FLOOR
                }
            })
            .collect()
    }
}

/// Spectrum of every channel
///
/// # Errors
/// `InvalidParameter` for a buffer with no samples.
pub fn spectrum(buffer: &AudioBuffer) -> Result<Vec<ChannelSpectrum>> {
    let fft = plan(buffer)?;
    Ok((0..buffer.num_channels())
        .map(|ch| analyze(buffer, ch, fft.as_ref()))
        .collect())
}

/// Spectrum of one channel
///
/// # Errors
/// `InvalidParameter` for a buffer with no samples or an out-of-range channel.
pub fn channel_spectrum(buffer: &AudioBuffer, channel: usize) -> Result<ChannelSpectrum> {
    if channel >= buffer.num_channels() {
        return Err(AurisError::invalid(
            "channel",
            format!(
                "channel {} requested but the buffer has {}",
                channel,
                buffer.num_channels()
            ),
        ));
    }
    let fft = plan(buffer)?;
    Ok(analyze(buffer, channel, fft.as_ref()))
}

fn plan(buffer: &AudioBuffer) -> Result<Arc<dyn Fft<f64>>> {
    if buffer.is_empty() {
        return Err(AurisError::invalid(
            "samples",
            "the spectrum of an empty buffer is undefined",
        ));
    }
    debug!("Planning {}-point FFT", buffer.num_samples());
    let mut planner = FftPlanner::<f64>::new();
    Ok(planner.plan_fft_forward(buffer.num_samples()))
}

fn analyze(buffer: &AudioBuffer, channel: usize, fft: &dyn Fft<f64>) -> ChannelSpectrum {
    let n = buffer.num_samples();
    let mut data: Vec<Complex64> = buffer
        .channel(channel)
        .iter()
        .map(|&s| Complex64::new(s as f64, 0.0))
        .collect();

    fft.process(&mut data);

    let bin_width = buffer.sample_rate() / n as f64;
    let bins = data[..n / 2 + 1]
        .iter()
        .enumerate()
        .map(|(k, c)| SpectrumBin {
            frequency: k as f64 * bin_width,
            magnitude: c.norm(),
        })
        .collect();

    ChannelSpectrum { channel, bins }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test_case(1000 ; "even length")]
    #[test_case(999 ; "odd length")]
    #[test_case(1 ; "single sample")]
    fn test_spectrum_length(n: usize) {
        let buffer = AudioBuffer::silence(2, n, 8000.0).unwrap();
        let spectra = spectrum(&buffer).unwrap();

        assert_eq!(spectra.len(), 2);
        for spec in &spectra {
            assert_eq!(spec.len(), n / 2 + 1);
        }
    }

    #[test]
    fn test_bins_are_increasing_and_spaced() {
        let buffer = AudioBuffer::silence(1, 100, 1000.0).unwrap();
        let spec = channel_spectrum(&buffer, 0).unwrap();

        assert_eq!(spec.bins[0].frequency, 0.0);
        assert_abs_diff_eq!(spec.bins[1].frequency, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spec.bins[50].frequency, 500.0, epsilon = 1e-9);
        assert!(spec.bins.windows(2).all(|w| w[0].frequency < w[1].frequency));
    }

    #[test]
    fn test_sine_peak_frequency() {
        let buffer = AudioBuffer::sine_wave(125.0, 1.0, 1000.0).unwrap();
        let spec = channel_spectrum(&buffer, 0).unwrap();

        let peak = spec.peak().unwrap();
        assert_abs_diff_eq!(peak.frequency, 125.0, epsilon = 1e-9);
        // A unit sine over an integer number of cycles gives n/2 at its bin
        assert_abs_diff_eq!(peak.magnitude, 500.0, epsilon = 1e-2);
    }

    #[test]
    fn test_dc_magnitude_is_sum() {
        let buffer = AudioBuffer::from_mono(vec![0.25; 8], 8.0).unwrap();
        let spec = channel_spectrum(&buffer, 0).unwrap();

        assert_abs_diff_eq!(spec.bins[0].magnitude, 2.0, epsilon = 1e-12);
        assert!(spec.bins[1..].iter().all(|b| b.magnitude < 1e-12));
        assert_eq!(spec.to_db()[1], DB_FLOOR);
    }

    #[test]
    fn test_spectrum_is_read_only() {
        let buffer = AudioBuffer::sine_wave(50.0, 0.2, 1000.0).unwrap();
        let before = buffer.clone();
        spectrum(&buffer).unwrap();
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_spectrum_errors() {
        let empty = AudioBuffer::from_mono(Vec::new(), 1000.0).unwrap();
        assert_eq!(spectrum(&empty).unwrap_err().kind(), ErrorKind::InvalidParameter);

        let mono = AudioBuffer::silence(1, 16, 1000.0).unwrap();
        assert_eq!(
            channel_spectrum(&mono, 1).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
    }
}
