//! Waveform display data
//!
//! Pure data for the plotting layer: a time axis in seconds and one amplitude
//! array per channel. Nothing here renders anything.

use serde::Serialize;

use crate::engine::buffer::AudioBuffer;
use crate::error::{AurisError, Result};

/// Time-domain view of a buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformView {
    /// Sample rate the time axis was built from
    pub sample_rate: f64,
    /// `time[i]` is the position of point `i` in seconds
    pub time: Vec<f64>,
    /// One amplitude array per channel, each `time.len()` long
    pub channels: Vec<Vec<f32>>,
}

impl WaveformView {
    /// Number of points per channel
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Reduce the view to at most `max_points` per channel for plotting
    ///
    /// Samples are grouped into `max_points / 2` consecutive chunks. Each chunk
    /// contributes two points, its minimum at the chunk's first timestamp and
    /// its maximum at the chunk's last, so transients survive the reduction.
    /// Views that already fit are returned unchanged.
    pub fn decimate_for_display(&self, max_points: usize) -> Result<WaveformView> {
        if max_points < 2 {
            return Err(AurisError::invalid(
                "max_points",
                format!("need at least 2 display points, got {}", max_points),
            ));
        }

        if self.len() <= max_points {
            return Ok(self.clone());
        }

        let num_chunks = max_points / 2;
        let chunk_size = self.len().div_ceil(num_chunks);

        let mut time = Vec::with_capacity(max_points);
        for chunk in self.time.chunks(chunk_size) {
            time.push(chunk[0]);
            time.push(chunk[chunk.len() - 1]);
        }

        let channels = self
            .channels
            .iter()
            .map(|channel| {
                channel
                    .chunks(chunk_size)
                    .flat_map(|chunk| {
                        let min = chunk.iter().copied().fold(f32::INFINITY, f32::min);
                        let max = chunk.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                        [min, max]
                    })
                    .collect()
            })
            .collect();

        Ok(WaveformView {
            sample_rate: self.sample_rate,
            time,
            channels,
        })
    }
}

/// Build the waveform view: `time[i] = i / sample_rate`
pub fn waveform(buffer: &AudioBuffer) -> WaveformView {
    let sample_rate = buffer.sample_rate();
    let time = (0..buffer.num_samples())
        .map(|i| i as f64 / sample_rate)
        .collect();

    WaveformView {
        sample_rate,
        time,
        channels: buffer.samples().to_vec(),
    }
}
