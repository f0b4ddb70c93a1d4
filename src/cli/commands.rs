//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::info;
use serde::Serialize;

use crate::dsp::spectrum::DB_FLOOR;
use crate::dsp::{channel_spectrum, spectrum, ChannelSpectrum, Transform, TransformPipeline};
use crate::engine::{inspect, load, save, waveform, AudioFormat};
use crate::error::{AurisError, Result};

/// Print a file summary.
pub fn info_cmd(input: &Path, json: bool) -> Result<()> {
    info!("Inspecting: {}", input.display());

    let (_, info) = inspect(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info);
    }

    Ok(())
}

/// Load, transform and save.
///
/// Steps from `pipeline_file` run first, then `ops`. Nothing is written if
/// any step fails.
pub fn process(
    input: &Path,
    output: &Path,
    ops: &[Transform],
    pipeline_file: Option<&Path>,
    bit_depth: u16,
) -> Result<()> {
    let format = output_format(output, bit_depth)?;

    let mut pipeline = match pipeline_file {
        Some(path) => {
            info!("Loading pipeline: {}", path.display());
            TransformPipeline::from_file(path)?
        }
        None => TransformPipeline::new(),
    };
    pipeline.steps.extend_from_slice(ops);

    let mut buffer = load(input)?;
    println!(
        "Loaded {}: {} ch, {} samples @ {} Hz",
        input.display(),
        buffer.num_channels(),
        buffer.num_samples(),
        buffer.sample_rate()
    );

    pipeline.apply(&mut buffer)?;
    for step in &pipeline.steps {
        println!("  {} ({})", step.label(), step);
    }

    save(&buffer, output, format)?;
    println!(
        "Saved {}: {} ch, {} samples @ {} Hz",
        output.display(),
        buffer.num_channels(),
        buffer.num_samples(),
        buffer.sample_rate()
    );

    Ok(())
}

/// Format implied by the output extension; `bit_depth` only applies to WAV
fn output_format(output: &Path, bit_depth: u16) -> Result<AudioFormat> {
    match AudioFormat::from_path(output)? {
        AudioFormat::Wav { .. } => Ok(AudioFormat::wav(bit_depth)),
        other if other.is_writable() => Ok(other),
        other => Err(AurisError::UnsupportedFormat {
            format: format!("{} output (decode only, write a .wav file)", other.name()),
        }),
    }
}

#[derive(Serialize)]
struct SpectrumReport {
    channel: usize,
    frequency: Vec<f64>,
    magnitude: Vec<f64>,
    unit: &'static str,
}

impl SpectrumReport {
    fn new(spec: &ChannelSpectrum, db: bool) -> Self {
        let magnitude = if db {
            spec.to_db()
        } else {
            spec.bins.iter().map(|b| b.magnitude).collect()
        };
        SpectrumReport {
            channel: spec.channel,
            frequency: spec.bins.iter().map(|b| b.frequency).collect(),
            magnitude,
            unit: if db { "dB" } else { "linear" },
        }
    }
}

/// Print the magnitude spectrum of one or every channel.
pub fn spectrum_cmd(input: &Path, channel: Option<usize>, db: bool, json: bool) -> Result<()> {
    let buffer = load(input)?;
    let spectra = match channel {
        Some(ch) => vec![channel_spectrum(&buffer, ch)?],
        None => spectrum(&buffer)?,
    };

    if json {
        let reports: Vec<SpectrumReport> = spectra.iter().map(|s| SpectrumReport::new(s, db)).collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("Spectrum of {} ({} bins per channel)", input.display(), spectra[0].len());
    for spec in &spectra {
        if let Some(peak) = spec.peak() {
            let level = if db {
                format!("{:.1} dB", (20.0 * peak.magnitude.log10()).max(DB_FLOOR))
            } else {
                format!("{:.3}", peak.magnitude)
            };
            println!("  Channel {}: peak at {:.1} Hz, {}", spec.channel, peak.frequency, level);
        }
    }

    Ok(())
}

/// Print waveform display data as JSON.
pub fn waveform_cmd(input: &Path, max_points: Option<usize>) -> Result<()> {
    let buffer = load(input)?;
    let mut view = waveform(&buffer);
    if let Some(max_points) = max_points {
        view = view.decimate_for_display(max_points)?;
    }

    info!("Waveform: {} points x {} channels", view.len(), view.channels.len());
    println!("{}", serde_json::to_string(&view)?);

    Ok(())
}
