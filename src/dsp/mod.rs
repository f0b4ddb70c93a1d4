//! Signal processing on [`AudioBuffer`](crate::engine::AudioBuffer)s
//!
//! Mutating operations ([`to_mono`], [`to_stereo`], [`apply_filter`],
//! [`compress`]) either succeed or leave the buffer exactly as it was.
//! [`spectrum`] is read-only.

pub mod channels;
pub mod decimate;
pub mod filter;
pub mod spectrum;
pub mod transform;

pub use channels::{to_mono, to_stereo};
pub use decimate::compress;
pub use filter::{apply_filter, butterworth, FilterKind, FilterSpec, IirCoefficients, IirFilter, BUTTERWORTH_ORDER};
pub use spectrum::{channel_spectrum, spectrum, ChannelSpectrum, SpectrumBin};
pub use transform::{Transform, TransformPipeline};
