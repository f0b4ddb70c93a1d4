//! Audio Buffer
//!
//! The single in-memory buffer every operation works on: a channels x samples
//! matrix of 32-bit floats plus its sample rate.

use std::fmt;

use crate::error::{AurisError, Result};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Calculate the RMS level of an audio buffer in dB
///
/// Returns -f32::INFINITY for empty or silent buffers.
pub fn calculate_rms(buffer: &AudioBuffer) -> f32 {
    let total_samples = buffer.num_channels() * buffer.num_samples();
    if total_samples == 0 {
        return f32::NEG_INFINITY;
    }

    let sum_squares: f64 = buffer
        .samples
        .iter()
        .flat_map(|channel| channel.iter())
        .map(|&s| (s as f64) * (s as f64))
        .sum();

    let rms = (sum_squares / total_samples as f64).sqrt() as f32;
    linear_to_db(rms)
}

/// Calculate the peak level of an audio buffer in dB
pub fn calculate_peak(buffer: &AudioBuffer) -> f32 {
    let peak = buffer
        .samples
        .iter()
        .flat_map(|channel| channel.iter())
        .map(|&s| s.abs())
        .fold(0.0_f32, f32::max);

    linear_to_db(peak)
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration, derived from the channel count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Single channel
    Mono,
    /// Two channels (left, right)
    Stereo,
    /// Three or more channels
    Multi(usize),
}

impl ChannelLayout {
    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            n => Some(ChannelLayout::Multi(n)),
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelLayout::Mono => write!(f, "mono"),
            ChannelLayout::Stereo => write!(f, "stereo"),
            ChannelLayout::Multi(n) => write!(f, "{}-channel", n),
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type
///
/// Stores audio as non-interleaved 32-bit floating point samples, one
/// `Vec<f32>` per channel. The fields are private so the shape invariant
/// holds at all times:
/// - there is at least one channel
/// - every channel has the same number of samples
/// - the sample rate is positive and finite
///
/// # Example
/// ```
/// use auris::engine::AudioBuffer;
///
/// let buffer = AudioBuffer::new(vec![vec![0.0; 1000], vec![0.0; 1000]], 1000.0).unwrap();
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_samples(), 1000);
/// assert!((buffer.duration_secs() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    sample_rate: f64,
}

impl AudioBuffer {
    /// Create a buffer from a channels x samples matrix
    ///
    /// # Errors
    /// `InvalidParameter` if there are no channels, the channels differ in
    /// length, or the sample rate is not a positive finite number.
    pub fn new(samples: Vec<Vec<f32>>, sample_rate: f64) -> Result<Self> {
        validate_sample_rate(sample_rate)?;
        validate_shape(&samples)?;
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a single-channel buffer
    pub fn from_mono(samples: Vec<f32>, sample_rate: f64) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Create a zeroed buffer
    pub fn silence(num_channels: usize, num_samples: usize, sample_rate: f64) -> Result<Self> {
        Self::new(vec![vec![0.0; num_samples]; num_channels], sample_rate)
    }

    /// Create an audio buffer from interleaved sample data
    ///
    /// # Arguments
    /// * `interleaved` - Interleaved sample data (L, R, L, R, ... for stereo)
    /// * `num_channels` - Number of interleaved channels
    /// * `sample_rate` - Sample rate in Hz
    pub fn from_interleaved(
        interleaved: &[f32],
        num_channels: usize,
        sample_rate: f64,
    ) -> Result<Self> {
        if num_channels == 0 {
            return Err(AurisError::invalid(
                "channels",
                "a buffer needs at least one channel",
            ));
        }

        if interleaved.len() % num_channels != 0 {
            return Err(AurisError::invalid(
                "samples",
                format!(
                    "interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
            ));
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];

        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Self::new(samples, sample_rate)
    }

    /// Generate a mono sine wave
    ///
    /// Useful for testing transform pipelines.
    pub fn sine_wave(frequency: f64, duration_secs: f64, sample_rate: f64) -> Result<Self> {
        validate_sample_rate(sample_rate)?;
        let num_samples = (duration_secs * sample_rate).round().max(0.0) as usize;
        let angular_freq = 2.0 * std::f64::consts::PI * frequency / sample_rate;

        let samples = (0..num_samples)
            .map(|i| (angular_freq * i as f64).sin() as f32)
            .collect();

        Self::from_mono(samples, sample_rate)
    }

    /// Convert the buffer to interleaved format (samples x channels)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let num_samples = self.num_samples();
        let mut interleaved = Vec::with_capacity(self.num_channels() * num_samples);

        for sample_idx in 0..num_samples {
            for channel in &self.samples {
                interleaved.push(channel[sample_idx]);
            }
        }

        interleaved
    }

    /// Get the number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.num_samples() as f64 / self.sample_rate
    }

    /// Get the channel layout
    pub fn channel_layout(&self) -> ChannelLayout {
        ChannelLayout::from_count(self.num_channels()).unwrap_or(ChannelLayout::Mono)
    }

    /// All channels, outer index is the channel
    #[inline]
    pub fn samples(&self) -> &[Vec<f32>] {
        &self.samples
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Get mutable access to a channel's samples
    ///
    /// The slice cannot change length, so the shape invariant is preserved.
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Mutable access to every channel at once
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.samples.iter_mut().map(|ch| ch.as_mut_slice())
    }

    /// Get a sample at the specified channel and index
    #[inline]
    pub fn get_sample(&self, channel: usize, index: usize) -> Option<f32> {
        self.samples
            .get(channel)
            .and_then(|ch| ch.get(index).copied())
    }

    /// Replace the sample matrix and sample rate together
    ///
    /// Validates the new contents first; on error the buffer is unchanged.
    pub fn replace(&mut self, samples: Vec<Vec<f32>>, sample_rate: f64) -> Result<()> {
        validate_sample_rate(sample_rate)?;
        validate_shape(&samples)?;
        self.samples = samples;
        self.sample_rate = sample_rate;
        Ok(())
    }

    /// Swap in a new channel matrix whose shape the caller has already checked
    pub(crate) fn set_channels(&mut self, samples: Vec<Vec<f32>>) {
        debug_assert!(validate_shape(&samples).is_ok());
        self.samples = samples;
    }

    /// Check if all samples are finite (not NaN or Infinity)
    pub fn is_finite(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .all(|s| s.is_finite())
    }

    /// Check if buffers match in shape and rate, with samples within tolerance
    pub fn is_approx_equal(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        self.num_channels() == other.num_channels()
            && self.num_samples() == other.num_samples()
            && (self.sample_rate - other.sample_rate).abs() < 1e-9
            && self
                .samples
                .iter()
                .flatten()
                .zip(other.samples.iter().flatten())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

fn validate_sample_rate(sample_rate: f64) -> Result<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(AurisError::invalid(
            "sample_rate",
            format!("must be a positive finite number of Hz, got {}", sample_rate),
        ));
    }
    Ok(())
}

fn validate_shape(samples: &[Vec<f32>]) -> Result<()> {
    let first = samples.first().ok_or_else(|| {
        AurisError::invalid("channels", "a buffer needs at least one channel")
    })?;

    if let Some((ch, other)) = samples
        .iter()
        .enumerate()
        .find(|(_, ch)| ch.len() != first.len())
    {
        return Err(AurisError::invalid(
            "samples",
            format!(
                "channel {} has {} samples but channel 0 has {}",
                ch,
                other.len(),
                first.len()
            ),
        ));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
