//! XMPreset Core - develop settings to filter preset conversion
//!
//! This crate turns the camera-raw develop settings stored in an XMP sidecar
//! (or any other [`source::ParameterSource`]) into an ordered list of filter
//! descriptors for a fixed downstream filter graph.
//!
//! The conversion runs a fixed pipeline of feature processors over a fresh
//! [`context::ConversionContext`]. Some processors emit filters directly, others
//! edit the shared tone curve and color bands, which are assembled into filters
//! at a fixed point in the pipeline.

pub mod assemble;
pub mod bands;
pub mod context;
pub mod convert;
pub mod curve;
pub mod error;
pub mod features;
pub mod preset;
pub mod range;
pub mod source;
pub mod spline;
pub mod xmp;

pub use bands::{ColorBand, ColorBands, HsvShift};
pub use context::ConversionContext;
pub use convert::{convert, convert_with_report, convert_xmp, Conversion};
pub use error::{ConversionWarning, ConvertError, ConvertResult};
pub use preset::{FilterDescriptor, ParamType, ParamValue, Parameter, Preset, PresetInfo};
pub use source::{ParameterSource, SourceError};
pub use spline::{CurveError, Spline};
pub use xmp::{XmpError, XmpProperties};

/// Input abscissas of the five tone curve control points (0-100 scale).
pub const TONE_CURVE_ABSCISSAS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];

/// Options for a single conversion run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Output identifier written to the preset's `key` field
    pub key: String,
    /// Preferred language for localized text such as the preset name
    pub language: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            key: "preset".to_string(),
            language: xmp::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl ConvertOptions {
    /// Create options with the given preset key and the default language
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set the preferred language for localized text
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Tone curve control point
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurvePoint {
    /// Input value
    pub x: f64,
    /// Output value
    pub y: f64,
}

impl CurvePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Five-point tone curve on the 0-100 scale.
///
/// Several processors edit this curve in turn; each edit starts from the
/// result of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToneCurve {
    /// Control points, ordered by x
    pub points: [CurvePoint; 5],
}

impl Default for ToneCurve {
    fn default() -> Self {
        // Identity line by default
        Self::from_outputs(TONE_CURVE_ABSCISSAS)
    }
}

impl ToneCurve {
    /// Create a new identity tone curve
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve with the canonical abscissas and the given outputs.
    pub fn from_outputs(outputs: [f64; 5]) -> Self {
        let mut points = [CurvePoint::new(0.0, 0.0); 5];
        for (point, (&x, y)) in points
            .iter_mut()
            .zip(TONE_CURVE_ABSCISSAS.iter().zip(outputs))
        {
            *point = CurvePoint::new(x, y);
        }
        Self { points }
    }

    /// Check if the curve is the identity line (no adjustment)
    pub fn is_linear(&self) -> bool {
        self.approx_eq(&Self::default())
    }

    /// Compare two curves coordinate by coordinate within the curve epsilon.
    pub fn approx_eq(&self, other: &ToneCurve) -> bool {
        self.points.iter().zip(other.points.iter()).all(|(a, b)| {
            range::approx_eq(a.x, b.x) && range::approx_eq(a.y, b.y)
        })
    }
}
