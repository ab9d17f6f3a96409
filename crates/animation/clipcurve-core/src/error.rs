//! Error types for clip decoding and sampling

use serde::{Deserialize, Serialize};

/// Every failure surfaced by the crate.
///
/// Out-of-range sample times are not errors: [`crate::Sampler::sample`] reports
/// them through its `in_range` flag instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ClipError {
    /// Source document does not exist
    #[error("Document not found: {path}")]
    DocumentNotFound { path: String },

    /// A field the decoder consumes is missing or has the wrong shape
    #[error("Schema error: {reason}")]
    Schema { reason: String },

    /// Parallel keyframe arrays disagree in length
    #[error("Inconsistent keyframe arrays: {field} has {actual} entries, expected {expected}")]
    InconsistentKeyframes {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Slope string that is neither an infinity marker nor a finite number
    #[error("Invalid slope token: {token}")]
    InvalidSlope { token: String },

    /// Queried path is not part of the clip
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    /// Selected axis is not carried by the track
    #[error("Axis '{axis}' not present in {kind} track of path {path}")]
    AxisNotFound {
        path: String,
        kind: String,
        axis: String,
    },

    /// Sample option outside its allowed set
    #[error("Invalid option {option}: {reason}")]
    InvalidOption { option: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// IO error
    #[error("IO error: {reason}")]
    Io { reason: String },
}

impl ClipError {
    /// Build a schema error from anything printable.
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the document contents rather than the query.
    #[inline]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::InconsistentKeyframes { .. } | Self::InvalidSlope { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::DocumentNotFound { .. } | Self::Io { .. } => "io",
            Self::Schema { .. } | Self::InconsistentKeyframes { .. } | Self::InvalidSlope { .. } => {
                "schema"
            }
            Self::PathNotFound { .. } | Self::AxisNotFound { .. } | Self::InvalidOption { .. } => {
                "query"
            }
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<std::io::Error> for ClipError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClipError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
