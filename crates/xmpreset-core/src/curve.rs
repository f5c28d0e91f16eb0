//! Curve algebra: percentage-of-remaining-room adjustments.
//!
//! Slider edits on curve points are expressed as a percentage of the distance
//! the point can still travel, not as absolute deltas. A +100 edit on a point
//! already near its ceiling lands exactly on the ceiling and never overshoots.

use crate::range::clamp;

/// Gap kept between a control point and the neighbour that bounds it.
pub const POINT_MARGIN: f64 = 10.0;

/// Move `current` by `change` percent of its remaining room on `[0, scale]`.
///
/// A positive change moves toward `scale` by that fraction of
/// `scale - current`; a negative change moves toward zero by that fraction of
/// `current`. The result is clamped to `[0, scale]`.
pub fn move_toward(current: f64, change: f64, scale: f64) -> f64 {
    if change >= 100.0 {
        return scale;
    }
    if change <= -100.0 {
        return 0.0;
    }
    let value = if change > 0.0 {
        current + (scale - current) * change / 100.0
    } else {
        current + current * change / 100.0
    };
    clamp(value, 0.0, scale)
}

/// Move `current` by `change` percent of its room between two bounds.
///
/// A positive change moves toward `upper` by that fraction of
/// `upper - current`; otherwise it moves toward `lower` by that fraction of
/// `current - lower`. The result is clamped to `[lower, upper]`.
pub fn move_constrained(current: f64, change: f64, upper: f64, lower: f64) -> f64 {
    if change >= 100.0 {
        return clamp(upper, lower, upper);
    }
    if change <= -100.0 {
        return lower;
    }
    let value = if change > 0.0 {
        current + (upper - current) * change / 100.0
    } else {
        current + (current - lower) * change / 100.0
    };
    clamp(value, lower, upper)
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for a (lower, current, upper) triple with lower <= current <= upper.
    fn bounded_point() -> impl Strategy<Value = (f64, f64, f64)> {
        (0.0f64..=50.0, 0.0f64..=1.0, 0.0f64..=50.0).prop_map(|(lower, t, width)| {
            let upper = lower + width;
            (lower, lower + t * width, upper)
        })
    }

    proptest! {
        /// Property: the result always stays within the bounds.
        #[test]
        fn prop_constrained_within_bounds(
            (lower, current, upper) in bounded_point(),
            change in -100.0f64..=100.0,
        ) {
            let result = move_constrained(current, change, upper, lower);
            prop_assert!(result >= lower && result <= upper);
        }

        /// Property: a zero change leaves an in-range point untouched.
        #[test]
        fn prop_constrained_zero_noop((lower, current, upper) in bounded_point()) {
            prop_assert_eq!(move_constrained(current, 0.0, upper, lower), current);
        }

        /// Property: the extremes of the change range land on the scale bounds.
        #[test]
        fn prop_toward_extremes(current in 0.0f64..=100.0, scale in 1.0f64..=255.0) {
            let current = current.min(scale);
            prop_assert_eq!(move_toward(current, 100.0, scale), scale);
            prop_assert_eq!(move_toward(current, -100.0, scale), 0.0);
        }

        /// Property: positive changes never move a point down.
        #[test]
        fn prop_toward_positive_monotonic(current in 0.0f64..=100.0, change in 0.0f64..=100.0) {
            prop_assert!(move_toward(current, change, 100.0) >= current);
        }
    }
}
