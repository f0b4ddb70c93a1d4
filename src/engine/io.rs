//! Audio file I/O for Auris
//!
//! WAV files are read and written with hound. FLAC, MP3 and Ogg Vorbis are
//! decode-only and go through symphonia. Audio is always loaded at its native
//! sample rate into a channels x samples matrix with at least one channel row.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::engine::buffer::AudioBuffer;
use crate::error::{AurisError, Result};

/// Bit depth used for WAV output when none is requested
pub const DEFAULT_WAV_BIT_DEPTH: u16 = 32;

/// Audio container/codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "container", rename_all = "snake_case")]
pub enum AudioFormat {
    /// RIFF WAVE; 16/24-bit integer PCM or 32-bit float
    Wav { bit_depth: u16 },
    /// Free Lossless Audio Codec (read only)
    Flac,
    /// MPEG-1 Layer III (read only)
    Mp3,
    /// Ogg Vorbis (read only)
    Ogg,
}

impl Default for AudioFormat {
    fn default() -> Self {
        AudioFormat::Wav {
            bit_depth: DEFAULT_WAV_BIT_DEPTH,
        }
    }
}

impl AudioFormat {
    /// WAV with the given bit depth
    pub fn wav(bit_depth: u16) -> Self {
        AudioFormat::Wav { bit_depth }
    }

    /// Look up a format by file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(AudioFormat::default()),
            "flac" => Some(AudioFormat::Flac),
            "mp3" => Some(AudioFormat::Mp3),
            "ogg" | "oga" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }

    /// Pick the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| AurisError::UnsupportedFormat {
            format: if ext.is_empty() {
                format!("{} (no file extension)", path.display())
            } else {
                ext.to_string()
            },
        })
    }

    /// Whether `save` can encode this format
    pub fn is_writable(&self) -> bool {
        matches!(self, AudioFormat::Wav { .. })
    }

    /// Short name for messages
    pub fn name(&self) -> String {
        match self {
            AudioFormat::Wav { bit_depth: 32 } => "wav (32-bit float)".to_string(),
            AudioFormat::Wav { bit_depth } => format!("wav ({}-bit)", bit_depth),
            AudioFormat::Flac => "flac".to_string(),
            AudioFormat::Mp3 => "mp3".to_string(),
            AudioFormat::Ogg => "ogg".to_string(),
        }
    }
}

/// Load an audio file at its native sample rate
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `UnsupportedFormat` - If the container or codec is not recognized
/// * `AudioRead` - If the file is recognized but cannot be decoded
pub fn load(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(AurisError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let is_wav = matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("wav") | Some("wave")
    );

    let buffer = if is_wav {
        load_wav(path)?
    } else {
        load_with_symphonia(path)?
    };

    info!(
        "Loaded {}: {} Hz, {} channel(s), {} samples ({:.2}s)",
        path.display(),
        buffer.sample_rate(),
        buffer.num_channels(),
        buffer.num_samples(),
        buffer.duration_secs()
    );

    Ok(buffer)
}

/// Save a buffer at `round(sample_rate)` in the requested format
///
/// # Errors
/// * `UnsupportedFormat` - If the format cannot be encoded or the bit depth is unknown
/// * `InvalidParameter` - If the rounded sample rate or channel count does not fit a WAV header
/// * `AudioWrite` - If the file cannot be created or written
pub fn save(buffer: &AudioBuffer, path: &Path, format: AudioFormat) -> Result<()> {
    let bit_depth = match format {
        AudioFormat::Wav { bit_depth } => bit_depth,
        other => {
            return Err(AurisError::UnsupportedFormat {
                format: format!("{} (decode only)", other.name()),
            })
        }
    };

    if !matches!(bit_depth, 16 | 24 | 32) {
        return Err(AurisError::UnsupportedFormat {
            format: format!("{}-bit audio (only 16, 24, 32 supported)", bit_depth),
        });
    }

    let sample_rate = buffer.sample_rate().round();
    if sample_rate < 1.0 || sample_rate > u32::MAX as f64 {
        return Err(AurisError::invalid(
            "sample_rate",
            format!(
                "{} Hz rounds to {} Hz, which cannot be stored in a WAV header",
                buffer.sample_rate(),
                sample_rate
            ),
        ));
    }

    let channels = u16::try_from(buffer.num_channels()).map_err(|_| {
        AurisError::invalid(
            "channels",
            format!("{} channels exceed the WAV limit", buffer.num_channels()),
        )
    })?;

    let spec = WavSpec {
        channels,
        sample_rate: sample_rate as u32,
        bits_per_sample: bit_depth,
        sample_format: if bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let write_err = |source: hound::Error| AurisError::AudioWrite {
        path: path.display().to_string(),
        source,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;
    let interleaved = buffer.to_interleaved();

    match bit_depth {
        16 => {
            for sample in interleaved {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(write_err)?;
            }
        }
        24 => {
            for sample in interleaved {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(write_err)?;
            }
        }
        _ => {
            for sample in interleaved {
                writer.write_sample(sample).map_err(write_err)?;
            }
        }
    }

    writer.finalize().map_err(write_err)?;

    info!(
        "Saved {} as {} at {} Hz",
        path.display(),
        format.name(),
        spec.sample_rate
    );

    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn load_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = match WavReader::open(path) {
        Ok(reader) => reader,
        Err(hound::Error::FormatError(reason)) => {
            return load_misnamed_or_damaged_wav(path, reason)
        }
        Err(e) => return Err(wav_read_error(path, e)),
    };

    let spec = reader.spec();
    debug!(
        "WAV header: {} ch, {} Hz, {} bits, {:?}",
        spec.channels, spec.sample_rate, spec.bits_per_sample, spec.sample_format
    );

    let samples = read_samples_as_f32(reader, path, spec.bits_per_sample, spec.sample_format)?;
    AudioBuffer::from_interleaved(&samples, spec.channels as usize, spec.sample_rate as f64)
}

/// hound refused the file: either it is not RIFF/WAVE at all (wrong
/// extension) or its data chunk is malformed, e.g. ends mid-frame. symphonia
/// probes the actual contents and keeps only whole frames.
fn load_misnamed_or_damaged_wav(path: &Path, reason: &str) -> Result<AudioBuffer> {
    let is_riff = has_riff_wave_header(path)?;
    debug!(
        "hound rejected {} ({}); riff header: {}, retrying with symphonia",
        path.display(),
        reason,
        is_riff
    );

    load_with_symphonia(path).map_err(|e| match e {
        AurisError::Io(_) => e,
        _ if is_riff => AurisError::AudioRead {
            path: path.display().to_string(),
            reason: reason.to_string(),
        },
        _ => AurisError::UnsupportedFormat {
            format: format!("{} (not a WAV file and no known codec)", path.display()),
        },
    })
}

fn has_riff_wave_header(path: &Path) -> Result<bool> {
    let mut header = [0u8; 12];
    match File::open(path)?.read_exact(&mut header) {
        Ok(()) => Ok(&header[0..4] == b"RIFF" && &header[8..12] == b"WAVE"),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn wav_read_error(path: &Path, err: hound::Error) -> AurisError {
    match err {
        hound::Error::Unsupported => AurisError::UnsupportedFormat {
            format: format!("{} (WAV encoding not supported)", path.display()),
        },
        hound::Error::IoError(e) => AurisError::Io(e),
        other => AurisError::AudioRead {
            path: path.display().to_string(),
            reason: other.to_string(),
        },
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    path: &Path,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let result: std::result::Result<Vec<f32>, hound::Error> = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect(),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect(),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect(),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect(),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect(),
        (format, bits) => {
            return Err(AurisError::UnsupportedFormat {
                format: format!("{}-bit {:?} WAV", bits, format),
            })
        }
    };

    result.map_err(|e| wav_read_error(path, e))
}

fn load_with_symphonia(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let mut hint = Hint::new();
    if !ext.is_empty() {
        hint.with_extension(ext);
    }

    let unsupported = |detail: String| AurisError::UnsupportedFormat {
        format: format!("{} ({})", path.display(), detail),
    };

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| unsupported(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| unsupported("no audio track".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| unsupported(e.to_string()))?;

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count());
    let mut interleaved: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AurisError::AudioRead {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => {
                skipped_packets += 1;
                continue;
            }
            Err(e) => {
                return Err(AurisError::AudioRead {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count());

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sample_buf.samples());
    }

    if skipped_packets > 0 {
        debug!(
            "Skipped {} undecodable packet(s) in {}",
            skipped_packets,
            path.display()
        );
    }

    let sample_rate = sample_rate.ok_or_else(|| AurisError::AudioRead {
        path: path.display().to_string(),
        reason: "stream does not declare a sample rate".to_string(),
    })?;

    AudioBuffer::from_interleaved(&interleaved, channels.unwrap_or(1), sample_rate as f64)
}

// ============================================================================
// Tests
// ============================================================================
