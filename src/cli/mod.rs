//! CLI Module
//!
//! Command-line interface for the Auris audio inspector.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::dsp::Transform;

/// Auris - load, reshape and inspect audio files
#[derive(Parser, Debug)]
#[command(name = "auris")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show sample rate, duration, channels and levels of a file
    #[command(name = "info")]
    Info {
        /// Input audio file
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply transforms and write the result as WAV
    #[command(name = "process")]
    Process {
        /// Input audio file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// Transform to apply, in order: mono, stereo, lowpass:<hz>,
        /// highpass:<hz>, compress:<factor>
        #[arg(short, long = "op")]
        ops: Vec<Transform>,

        /// JSON pipeline file, run before any --op
        #[arg(short, long)]
        pipeline: Option<PathBuf>,

        /// WAV bit depth (16, 24 or 32 float)
        #[arg(short, long, default_value_t = crate::engine::io::DEFAULT_WAV_BIT_DEPTH)]
        bit_depth: u16,
    },

    /// Print the magnitude spectrum
    #[command(name = "spectrum")]
    Spectrum {
        /// Input audio file
        input: PathBuf,

        /// Only this channel (0-based)
        #[arg(short, long)]
        channel: Option<usize>,

        /// Report magnitudes in dB
        #[arg(long)]
        db: bool,

        /// Print every bin as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print waveform display data as JSON
    #[command(name = "waveform")]
    Waveform {
        /// Input audio file
        input: PathBuf,

        /// Reduce to at most this many points per channel
        #[arg(short, long)]
        max_points: Option<usize>,
    },
}
