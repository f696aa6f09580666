//! Error types for kosha-slam.

use crate::core::FrameId;

/// Result type alias
pub type Result<T> = std::result::Result<T, SlamError>;

/// Runtime errors raised at component boundaries.
///
/// Input-validation failures are local and immediate: the offending call
/// returns an error without mutating any state. None of these are fatal;
/// a driver may skip the tick and continue.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SlamError {
    /// A pose contained a NaN or infinite component
    #[error("non-finite pose in {0}")]
    NonFinitePose(&'static str),

    /// A motion delta contained a NaN or infinite component
    #[error("non-finite motion delta in {0}")]
    NonFiniteMotion(&'static str),

    /// A range or bearing measurement was invalid
    #[error("invalid range measurement: {0}")]
    InvalidRange(f32),

    /// An operation requiring hits was given an empty scan
    #[error("empty scan")]
    EmptyScan,

    /// An observation confidence was zero, negative, or non-finite
    #[error("invalid observation confidence: {0}")]
    InvalidConfidence(f32),

    /// A scan was integrated against a pose from a different frame
    /// than the one it was measured in
    #[error("scan frame {scan:?} does not match reference frame {reference:?}")]
    FrameMismatch {
        /// Frame the scan was tagged with at measurement time
        scan: FrameId,
        /// Frame of the reference pose supplied to the update
        reference: FrameId,
    },
}
