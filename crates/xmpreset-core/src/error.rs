//! Error and warning types for a conversion run.
//!
//! Only a corrupt point stream or a failing source aborts a run. Everything
//! else (a missing field, a scalar that does not parse, a curve with too few
//! points) is recorded as a [`ConversionWarning`] and the run continues.

use crate::source::SourceError;
use crate::spline::CurveError;
use crate::xmp::XmpError;
use thiserror::Error;

/// Fatal conversion failures.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// An array item is not a pair of comma-separated numbers.
    #[error("malformed point {index} in {field}: {item:?}")]
    MalformedInput {
        field: String,
        index: usize,
        item: String,
    },

    /// The parameter source failed unexpectedly.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The XMP packet could not be read.
    #[error(transparent)]
    Xmp(#[from] XmpError),

    /// The preset could not be serialized.
    #[error("failed to serialize preset: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Non-fatal conditions met during a conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionWarning {
    /// A field is present but its value could not be read; it was ignored.
    #[error("ignoring {name}: {reason}")]
    UnreadableField { name: String, reason: SourceError },

    /// A curve has too few points to fit; the identity curve was used.
    #[error("{curve} has {count} point(s), using a linear curve")]
    InsufficientCurveData { curve: String, count: usize },

    /// A curve could not be fitted; its previous shape was kept.
    #[error("could not fit {curve}: {reason}")]
    UnfittableCurve { curve: String, reason: CurveError },
}
