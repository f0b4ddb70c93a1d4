//! Naive downsampling ("compression")
//!
//! Keeps every `factor`-th sample with no anti-aliasing filter in front, so
//! content above the new Nyquist frequency folds back into the pass band.

use log::{debug, warn};

use crate::engine::AudioBuffer;
use crate::error::{AurisError, Result};

/// Keep samples `0, factor, 2*factor, ...` of each channel and divide the
/// sample rate by `factor`
///
/// The new sample count is `ceil(old_count / factor)`.
///
/// # Errors
/// `InvalidParameter` if `factor` is zero. The buffer is untouched.
pub fn compress(buffer: &mut AudioBuffer, factor: usize) -> Result<()> {
    if factor == 0 {
        return Err(AurisError::invalid(
            "factor",
            "compression factor must be a positive integer",
        ));
    }

    if factor > buffer.num_samples() && !buffer.is_empty() {
        warn!(
            "Compression factor {} exceeds the sample count {}; one sample per channel remains",
            factor,
            buffer.num_samples()
        );
    }

    let decimated: Vec<Vec<f32>> = buffer
        .samples()
        .iter()
        .map(|channel| channel.iter().step_by(factor).copied().collect())
        .collect();
    let sample_rate = buffer.sample_rate() / factor as f64;

    debug!(
        "Decimated by {}: {} -> {} samples, {} -> {} Hz",
        factor,
        buffer.num_samples(),
        decimated[0].len(),
        buffer.sample_rate(),
        sample_rate
    );

    buffer.replace(decimated, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use test_case::test_case;

    #[test_case(1000, 2, 500 ; "even count")]
    #[test_case(1001, 2, 501 ; "odd count rounds up")]
    #[test_case(10, 3, 4 ; "factor three")]
    #[test_case(5, 1, 5 ; "factor one")]
    #[test_case(5, 7, 1 ; "factor above count")]
    #[test_case(0, 4, 0 ; "empty buffer")]
    fn test_compress_sample_count(count: usize, factor: usize, expected: usize) {
        let mut buffer = AudioBuffer::silence(2, count, 1000.0).unwrap();
        compress(&mut buffer, factor).unwrap();

        assert_eq!(buffer.num_samples(), expected);
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.sample_rate(), 1000.0 / factor as f64);
    }

    #[test]
    fn test_compress_keeps_every_nth_sample() {
        let mut buffer = AudioBuffer::new(
            vec![
                vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
                vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0],
            ],
            44100.0,
        )
        .unwrap();

        compress(&mut buffer, 3).unwrap();

        assert_eq!(buffer.channel(0), &[0.0, 3.0, 6.0]);
        assert_eq!(buffer.channel(1), &[10.0, 13.0, 16.0]);
        assert_eq!(buffer.sample_rate(), 14700.0);
    }

    #[test]
    fn test_compress_does_not_antialias() {
        // Alternating +1/-1 is a Nyquist tone; decimating by 2 aliases it to DC
        let samples: Vec<f32> = (0..16).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut buffer = AudioBuffer::from_mono(samples, 16.0).unwrap();

        compress(&mut buffer, 2).unwrap();

        assert!(buffer.channel(0).iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_compress_rejects_zero_factor() {
        let mut buffer = AudioBuffer::silence(1, 10, 1000.0).unwrap();
        let before = buffer.clone();

        let err = compress(&mut buffer, 0).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(buffer, before);
    }
}
