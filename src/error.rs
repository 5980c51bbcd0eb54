use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a conversion. All variants are fatal to the
/// current request; nothing is retried.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A timecode string that is not `hh:mm:ss:ff` (or `hh:mm:ss,mmm` for SRT times).
    #[error("malformed timecode '{value}': {reason}")]
    Format { value: String, reason: &'static str },

    /// The input could not be read or is not valid JSON.
    #[error("cannot parse input {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The input parsed, but no record carried the required fields.
    #[error("no usable records found in input")]
    NoData,

    /// Every entry was dropped before rendering.
    #[error("no subtitle entries left to render")]
    EmptyOutput,

    /// The progress observer asked to stop.
    #[error("conversion cancelled at {percent:.0}%")]
    Cancelled { percent: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot write output {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn format(value: &str, reason: &'static str) -> Self {
        ConvertError::Format {
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
