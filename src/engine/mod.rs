//! Audio Engine Module
//!
//! Core audio data handling:
//! - Audio buffer management
//! - File I/O operations
//! - Display views and file summaries

pub mod buffer;
pub mod info;
pub mod io;
pub mod view;

pub use buffer::{AudioBuffer, ChannelLayout};
pub use info::{inspect, AudioInfo};
pub use io::{load, save, AudioFormat};
pub use view::{waveform, WaveformView};
