//! Channel layout conversion

use log::debug;

use crate::engine::AudioBuffer;

/// Mix all channels down to one, the per-sample mean across channels
///
/// No-op on a mono buffer. Sample count and sample rate are unchanged.
pub fn to_mono(buffer: &mut AudioBuffer) {
    let num_channels = buffer.num_channels();
    if num_channels == 1 {
        return;
    }

    let scale = 1.0 / num_channels as f64;
    let mono: Vec<f32> = (0..buffer.num_samples())
        .map(|i| {
            let sum: f64 = buffer.samples().iter().map(|ch| ch[i] as f64).sum();
            (sum * scale) as f32
        })
        .collect();

    debug!("Mixed {} channels down to mono", num_channels);
    buffer.set_channels(vec![mono]);
}

/// Duplicate a mono channel into two identical channels
///
/// Plain duplication, not spatialization. No-op on buffers that already have
/// two or more channels.
pub fn to_stereo(buffer: &mut AudioBuffer) {
    if buffer.num_channels() != 1 {
        return;
    }

    let mono = buffer.channel(0).to_vec();
    debug!("Duplicated mono channel into stereo");
    buffer.set_channels(vec![mono.clone(), mono]);
}
