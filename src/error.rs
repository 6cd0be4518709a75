//! Typed errors for the sampling, classification and estimation core, plus the
//! reasons a stored history payload can be rejected.
//!
//! Application layers (history, settings, CLI) wrap these in `anyhow::Error`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimationError {
    /// Rejected before any computation ran.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A point fell outside the pixel buffer. Sampler and classifier disagree
    /// about the image bounds, which is a logic fault rather than a user error.
    #[error("point ({x}, {y}) is outside the {width}x{height} pixel buffer")]
    IndexOutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl EstimationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EstimationError::InvalidArgument(message.into())
    }
}

/// A stored history payload that cannot be used at all. Individual bad entries
/// are not errors; the codec skips them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryDecodeError {
    #[error("history payload is not a list of results: {0}")]
    Unreadable(String),

    #[error("history schema version {found} is not supported (expected 1..={supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

pub type EstimationResult<T> = std::result::Result<T, EstimationError>;
