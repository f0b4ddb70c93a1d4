//! Butterworth low-pass / high-pass filtering
//!
//! A fixed 5th-order digital Butterworth design, run as a single causal pass
//! of a direct-form IIR filter over each channel. There is no forward-backward
//! (zero-phase) pass, so the output carries the filter's phase delay.
//!
//! Design steps:
//! 1. analog prototype poles on the unit circle's left half
//! 2. pre-warp the normalized cutoff for the bilinear transform
//! 3. low-pass scaling or low-pass to high-pass transform
//! 4. bilinear transform (fs = 2) to the z-plane
//! 5. expand zeros and poles into transfer-function coefficients

use std::f64::consts::PI;

use log::debug;
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::engine::AudioBuffer;
use crate::error::{AurisError, Result};

/// Order of every filter designed by [`apply_filter`]
pub const BUTTERWORTH_ORDER: usize = 5;

/// Pass band of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Remove above the cutoff
    LowPass,
    /// Remove below the cutoff
    HighPass,
}

/// What to filter and where
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    /// Cutoff frequency in Hz; must satisfy `0 < cutoff_hz < sample_rate / 2`
    pub cutoff_hz: f64,
}

impl FilterSpec {
    pub fn low_pass(cutoff_hz: f64) -> Self {
        FilterSpec {
            kind: FilterKind::LowPass,
            cutoff_hz,
        }
    }

    pub fn high_pass(cutoff_hz: f64) -> Self {
        FilterSpec {
            kind: FilterKind::HighPass,
            cutoff_hz,
        }
    }

    /// Cutoff as a fraction of Nyquist, checked to lie in `(0, 1)`
    pub fn normalized_cutoff(&self, sample_rate: f64) -> Result<f64> {
        let nyquist = sample_rate / 2.0;

        if !self.cutoff_hz.is_finite() || self.cutoff_hz <= 0.0 {
            return Err(AurisError::invalid(
                "cutoff_hz",
                format!("must be a positive frequency, got {} Hz", self.cutoff_hz),
            ));
        }

        if self.cutoff_hz >= nyquist {
            return Err(AurisError::invalid(
                "cutoff_hz",
                format!(
                    "{} Hz is not below the Nyquist frequency ({} Hz)",
                    self.cutoff_hz, nyquist
                ),
            ));
        }

        Ok(self.cutoff_hz / nyquist)
    }
}

/// Transfer function `H(z) = B(z) / A(z)`, highest power of `z^-1` last
#[derive(Debug, Clone, PartialEq)]
pub struct IirCoefficients {
    /// Feed-forward coefficients
    pub b: Vec<f64>,
    /// Feed-back coefficients, `a[0] == 1`
    pub a: Vec<f64>,
}

impl IirCoefficients {
    /// Filter order (number of delay elements)
    pub fn order(&self) -> usize {
        self.a.len().max(self.b.len()).saturating_sub(1)
    }

    /// Complex frequency response magnitude at a normalized frequency
    /// (`0` = DC, `1` = Nyquist)
    pub fn magnitude_at(&self, normalized_freq: f64) -> f64 {
        let w = PI * normalized_freq;
        let eval = |coeffs: &[f64]| {
            coeffs
                .iter()
                .enumerate()
                .fold(Complex64::new(0.0, 0.0), |acc, (k, &c)| {
                    acc + Complex64::from_polar(c, -w * k as f64)
                })
        };
        (eval(&self.b) / eval(&self.a)).norm()
    }
}

/// Design a digital Butterworth filter
///
/// # Arguments
/// * `order` - Filter order (number of poles), at least 1
/// * `normalized_cutoff` - Cutoff as a fraction of Nyquist, in `(0, 1)`
/// * `kind` - Low-pass or high-pass
pub fn butterworth(order: usize, normalized_cutoff: f64, kind: FilterKind) -> Result<IirCoefficients> {
    if order == 0 {
        return Err(AurisError::invalid("order", "filter order must be at least 1"));
    }
    if !(normalized_cutoff > 0.0 && normalized_cutoff < 1.0) {
        return Err(AurisError::invalid(
            "normalized_cutoff",
            format!("must lie strictly between 0 and 1, got {}", normalized_cutoff),
        ));
    }

    // Analog prototype: poles at -exp(i*pi*m/(2N)), m = -N+1, -N+3, ..., N-1
    let n = order as f64;
    let prototype: Vec<Complex64> = (0..order)
        .map(|i| {
            let m = -(n - 1.0) + 2.0 * i as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();

    // Bilinear transform with fs = 2, so s-plane frequencies are pre-warped by 2*fs
    let fs2 = 4.0;
    let warped = fs2 * (PI * normalized_cutoff / 2.0).tan();

    let (zeros, poles, gain) = match kind {
        FilterKind::LowPass => {
            let poles: Vec<Complex64> = prototype.iter().map(|p| *p * warped).collect();
            (Vec::new(), poles, warped.powi(order as i32))
        }
        FilterKind::HighPass => {
            let gain = (Complex64::new(1.0, 0.0) / product(prototype.iter().map(|p| -*p))).re;
            let poles: Vec<Complex64> = prototype.iter().map(|p| warped / *p).collect();
            (vec![Complex64::new(0.0, 0.0); order], poles, gain)
        }
    };

    let to_z = |s: &Complex64| (fs2 + *s) / (fs2 - *s);
    let mut digital_zeros: Vec<Complex64> = zeros.iter().map(to_z).collect();
    let digital_poles: Vec<Complex64> = poles.iter().map(to_z).collect();
    // Zeros at infinity map to z = -1
    digital_zeros.resize(digital_poles.len(), Complex64::new(-1.0, 0.0));

    let digital_gain = gain
        * (product(zeros.iter().map(|z| fs2 - *z)) / product(poles.iter().map(|p| fs2 - *p))).re;

    let b = expand_roots(&digital_zeros)
        .into_iter()
        .map(|c| (c * digital_gain).re)
        .collect();
    let a = expand_roots(&digital_poles).into_iter().map(|c| c.re).collect();

    Ok(IirCoefficients { b, a })
}

fn product(values: impl Iterator<Item = Complex64>) -> Complex64 {
    values.fold(Complex64::new(1.0, 0.0), |acc, v| acc * v)
}

/// Coefficients of `prod(x - r)`, highest power first
fn expand_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= *root * prev;
        }
    }
    coeffs
}

/// Causal IIR filter, direct form II transposed
#[derive(Debug, Clone)]
pub struct IirFilter {
    b: Vec<f64>,
    a: Vec<f64>,
    state: Vec<f64>,
}

impl IirFilter {
    /// Create a filter with zeroed state; coefficients are normalized by `a[0]`
    pub fn new(coeffs: &IirCoefficients) -> Result<Self> {
        let a0 = coeffs.a.first().copied().unwrap_or(0.0);
        if a0 == 0.0 || !a0.is_finite() {
            return Err(AurisError::invalid(
                "a",
                "leading feedback coefficient must be non-zero",
            ));
        }

        let len = coeffs.a.len().max(coeffs.b.len());
        let mut b: Vec<f64> = coeffs.b.iter().map(|c| c / a0).collect();
        let mut a: Vec<f64> = coeffs.a.iter().map(|c| c / a0).collect();
        b.resize(len, 0.0);
        a.resize(len, 0.0);

        Ok(Self {
            b,
            a,
            state: vec![0.0; len - 1],
        })
    }

    /// Process a single sample
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let Some(&first) = self.state.first() else {
            return self.b[0] * input;
        };

        let output = self.b[0] * input + first;
        let last = self.state.len() - 1;
        for i in 0..last {
            self.state[i] = self.b[i + 1] * input + self.state[i + 1] - self.a[i + 1] * output;
        }
        self.state[last] = self.b[last + 1] * input - self.a[last + 1] * output;

        output
    }

    /// Filter a block of samples in place
    pub fn process_in_place(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample as f64) as f32;
        }
    }

    /// Clear filter history
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }
}

/// Apply a 5th-order Butterworth filter to every channel independently
///
/// Shape and sample rate are unchanged; only amplitudes change.
///
/// # Errors
/// `InvalidParameter` if the cutoff is not in `(0, sample_rate / 2)`. The
/// buffer is left untouched in that case.
pub fn apply_filter(buffer: &mut AudioBuffer, spec: &FilterSpec) -> Result<()> {
    let normalized = spec.normalized_cutoff(buffer.sample_rate())?;
    let coeffs = butterworth(BUTTERWORTH_ORDER, normalized, spec.kind)?;
    debug!(
        "{:?} @ {} Hz (Wn = {:.6}): b = {:?}, a = {:?}",
        spec.kind, spec.cutoff_hz, normalized, coeffs.b, coeffs.a
    );

    let template = IirFilter::new(&coeffs)?;
    for channel in buffer.channels_mut() {
        let mut filter = template.clone();
        filter.process_in_place(channel);
    }

    Ok(())
}
