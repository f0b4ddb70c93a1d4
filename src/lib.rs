//! Auris - Audio Inspection Toolkit
//!
//! Load an audio file into an [`AudioBuffer`], reshape it with a small set of
//! transforms and look at the result.
//!
//! # Architecture
//!
//! - [`engine`]: the buffer type, file I/O and display data
//! - [`dsp`]: channel conversion, Butterworth filtering, decimation and the
//!   magnitude spectrum, plus the [`Transform`] pipeline that drives them
//! - [`cli`]: the `auris-cli` front end

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;

pub use dsp::{Transform, TransformPipeline};
pub use engine::{AudioBuffer, AudioFormat};
pub use error::{AurisError, ErrorKind, Result};
