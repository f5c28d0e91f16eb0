//! Range and unit conversion.
//!
//! Source fields arrive in slider units (percentages, degrees, Kelvin) and the
//! filters expect normalized or filter-specific ranges. Every conversion is a
//! linear rescale between two ranges, clamped to the target unless a caller
//! explicitly opts out.
//!
//! ## Thresholds
//!
//! Values whose magnitude does not exceed [`FIELD_EPSILON`] count as "unset" and
//! never cause a filter to be emitted. Curve outputs use the tighter
//! [`CURVE_EPSILON`].

/// Magnitude at or below which a source field is treated as unset.
pub const FIELD_EPSILON: f64 = 0.01;

/// Magnitude below which a curve value is treated as zero.
pub const CURVE_EPSILON: f64 = 0.001;

/// A closed numeric interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub lo: f64,
    pub hi: f64,
}

impl Range {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Width of the interval.
    #[inline]
    pub fn span(self) -> f64 {
        self.hi - self.lo
    }

    /// Clamp a value into the interval.
    #[inline]
    pub fn clamp(self, value: f64) -> f64 {
        clamp(value, self.lo.min(self.hi), self.lo.max(self.hi))
    }
}

/// Signed slider percentage.
pub const PERCENT: Range = Range::new(-100.0, 100.0);
/// Unsigned slider percentage.
pub const POSITIVE_PERCENT: Range = Range::new(0.0, 100.0);
/// Normalized unit interval.
pub const UNIT: Range = Range::new(0.0, 1.0);
/// Signed unit interval.
pub const SIGNED_UNIT: Range = Range::new(-1.0, 1.0);
/// Hue angle in degrees.
pub const DEGREES: Range = Range::new(0.0, 360.0);
/// 8-bit curve coordinates as stored in sidecars.
pub const CURVE_8BIT: Range = Range::new(0.0, 255.0);

/// Linearly map `value` from `from` to `to`, optionally clamping to `to`.
///
/// A degenerate source range maps everything to `to.lo`.
///
/// # Example
/// ```ignore
/// use xmpreset_core::range::{convert, PERCENT, Range};
///
/// // Saturation slider -100..100 -> filter 0..2
/// assert_eq!(convert(50.0, PERCENT, Range::new(0.0, 2.0), true), 1.5);
/// ```
pub fn convert(value: f64, from: Range, to: Range, clamp_output: bool) -> f64 {
    let span = from.span();
    if span == 0.0 {
        return to.lo;
    }
    let mapped = (value - from.lo) / span * to.span() + to.lo;
    if clamp_output {
        to.clamp(mapped)
    } else {
        mapped
    }
}

/// Clamp `value` to `[min, max]`.
///
/// Unlike `f64::clamp` this never panics: with `min > max` the result is `min`.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Check whether a source field carries a detectable change.
#[inline]
pub fn is_set(value: f64) -> bool {
    value.abs() > FIELD_EPSILON
}

/// Check whether two values are equal within the curve epsilon.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < CURVE_EPSILON
}

/// Snap sub-epsilon curve outputs to exactly zero.
#[inline]
pub fn snap_to_zero(value: f64) -> f64 {
    if value < CURVE_EPSILON {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_percent_to_signed_unit() {
        assert!((convert(40.0, PERCENT, SIGNED_UNIT, true) - 0.4).abs() < 1e-12);
        assert!((convert(-100.0, PERCENT, SIGNED_UNIT, true) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_convert_clamps_output() {
        assert_eq!(convert(250.0, PERCENT, Range::new(0.0, 2.0), true), 2.0);
        assert_eq!(convert(-250.0, PERCENT, Range::new(0.0, 2.0), true), 0.0);
    }

    #[test]
    fn test_convert_without_clamp() {
        let v = convert(720.0, DEGREES, UNIT, false);
        assert!((v - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_convert_degenerate_source() {
        assert_eq!(convert(5.0, Range::new(1.0, 1.0), UNIT, true), 0.0);
    }

    #[test]
    fn test_convert_8bit_to_percent() {
        let v = convert(127.5, CURVE_8BIT, POSITIVE_PERCENT, true);
        assert!((v - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_inverted_bounds() {
        assert_eq!(clamp(5.0, 10.0, 0.0), 10.0);
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
    }

    #[test]
    fn test_range_clamp_reversed_range() {
        assert_eq!(Range::new(1.0, 0.0).clamp(2.0), 1.0);
    }

    #[test]
    fn test_is_set_threshold() {
        assert!(!is_set(0.0));
        assert!(!is_set(0.01));
        assert!(!is_set(-0.01));
        assert!(is_set(0.0101));
        assert!(is_set(-0.5));
    }

    #[test]
    fn test_snap_to_zero() {
        assert_eq!(snap_to_zero(0.0009), 0.0);
        assert_eq!(snap_to_zero(-0.2), 0.0);
        assert_eq!(snap_to_zero(0.25), 0.25);
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.0005));
        assert!(!approx_eq(1.0, 1.002));
    }
}
