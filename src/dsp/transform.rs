//! Transform pipeline
//!
//! Every user-facing operation is one variant of the closed [`Transform`] enum
//! and maps to exactly one function. A [`TransformPipeline`] runs a list of
//! them in order. Pipelines load from JSON:
//!
//! ```json
//! { "steps": [
//!     { "op": "to_mono" },
//!     { "op": "filter", "kind": "low_pass", "cutoff_hz": 1000.0 },
//!     { "op": "compress", "factor": 2 }
//! ] }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use super::channels::{to_mono, to_stereo};
use super::decimate::compress;
use super::filter::{apply_filter, FilterKind, FilterSpec};
use crate::engine::AudioBuffer;
use crate::error::{AurisError, Result};

/// One operation on a buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transform {
    ToMono,
    ToStereo,
    Filter(FilterSpec),
    Compress { factor: usize },
}

impl Transform {
    /// Apply the transform in place
    ///
    /// On error the buffer is unchanged.
    pub fn apply(&self, buffer: &mut AudioBuffer) -> Result<()> {
        match self {
            Transform::ToMono => {
                to_mono(buffer);
                Ok(())
            }
            Transform::ToStereo => {
                to_stereo(buffer);
                Ok(())
            }
            Transform::Filter(spec) => apply_filter(buffer, spec),
            Transform::Compress { factor } => compress(buffer, *factor),
        }
    }

    /// Menu label shown by the inspector UI
    pub fn label(&self) -> &'static str {
        match self {
            Transform::ToMono => "Convert to Mono",
            Transform::ToStereo => "Convert to Stereo",
            Transform::Filter(FilterSpec {
                kind: FilterKind::LowPass,
                ..
            }) => "Low-Pass Filter",
            Transform::Filter(FilterSpec {
                kind: FilterKind::HighPass,
                ..
            }) => "High-Pass Filter",
            Transform::Compress { .. } => "Compress",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::ToMono => write!(f, "mono"),
            Transform::ToStereo => write!(f, "stereo"),
            Transform::Filter(FilterSpec { kind, cutoff_hz }) => match kind {
                FilterKind::LowPass => write!(f, "lowpass:{}", cutoff_hz),
                FilterKind::HighPass => write!(f, "highpass:{}", cutoff_hz),
            },
            Transform::Compress { factor } => write!(f, "compress:{}", factor),
        }
    }
}

/// Compact form used on the command line: `mono`, `stereo`,
/// `lowpass:<hz>`, `highpass:<hz>`, `compress:<factor>`
impl FromStr for Transform {
    type Err = AurisError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s, None),
        };

        let require_arg = |what: &str| {
            arg.filter(|a| !a.is_empty()).ok_or_else(|| {
                AurisError::invalid("transform", format!("'{}' needs {}, e.g. '{}:<value>'", name, what, name))
            })
        };

        match (name.to_ascii_lowercase().as_str(), arg) {
            ("mono", None) => Ok(Transform::ToMono),
            ("stereo", None) => Ok(Transform::ToStereo),
            ("lowpass" | "highpass", _) => {
                let raw = require_arg("a cutoff in Hz")?;
                let cutoff_hz: f64 = raw.parse().map_err(|_| {
                    AurisError::invalid("cutoff_hz", format!("'{}' is not a number", raw))
                })?;
                Ok(Transform::Filter(if name.eq_ignore_ascii_case("lowpass") {
                    FilterSpec::low_pass(cutoff_hz)
                } else {
                    FilterSpec::high_pass(cutoff_hz)
                }))
            }
            ("compress", _) => {
                let raw = require_arg("an integer factor")?;
                let factor: usize = raw.parse().map_err(|_| {
                    AurisError::invalid(
                        "factor",
                        format!("'{}' is not a positive integer", raw),
                    )
                })?;
                Ok(Transform::Compress { factor })
            }
            ("mono" | "stereo", Some(_)) => Err(AurisError::invalid(
                "transform",
                format!("'{}' takes no argument", name),
            )),
            _ => Err(AurisError::invalid(
                "transform",
                format!("unknown transform '{}'", s),
            )),
        }
    }
}

/// Ordered list of transforms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformPipeline {
    pub steps: Vec<Transform>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn push(&mut self, step: Transform) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Parse a pipeline from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a pipeline file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AurisError::FileNotFound {
                path: path.display().to_string(),
                source: Some(e),
            },
            _ => AurisError::Io(e),
        })?;
        Self::from_json(&text)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Run every step in order
    ///
    /// Steps run on a working copy that replaces `buffer` only once every
    /// step has succeeded. On error `buffer` is exactly as it was and the
    /// error names the failing step.
    pub fn apply(&self, buffer: &mut AudioBuffer) -> Result<()> {
        let mut working = buffer.clone();

        for (index, step) in self.steps.iter().enumerate() {
            step.apply(&mut working).map_err(|e| match e {
                AurisError::InvalidParameter { param, reason } => AurisError::InvalidParameter {
                    param,
                    reason: format!("{} (step {}: {})", reason, index + 1, step),
                },
                other => other,
            })?;
            info!(
                "Step {}/{} {}: {} ch, {} samples @ {} Hz",
                index + 1,
                self.steps.len(),
                step.label(),
                working.num_channels(),
                working.num_samples(),
                working.sample_rate()
            );
        }

        *buffer = working;
        Ok(())
    }
}

impl FromIterator<Transform> for TransformPipeline {
    fn from_iter<I: IntoIterator<Item = Transform>>(iter: I) -> Self {
        TransformPipeline {
            steps: iter.into_iter().collect(),
        }
    }
}
