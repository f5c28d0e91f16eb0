//! Interpolating spline fitting and curve resampling.
//!
//! Sidecar curves carry an arbitrary number of control points, while the
//! filters take a fixed five-point curve. The points are fitted with an
//! interpolating B-spline (zero smoothing: the spline passes through every
//! input point) of degree `min(5, n - 1)`, which is then sampled at the fixed
//! output abscissas.
//!
//! ## Knot placement
//!
//! The knot vector has `degree + 1` repeated boundary knots at each end and
//! `n - degree - 1` interior knots. For odd degrees the interior knots sit on
//! the data abscissas, for even degrees halfway between them, so the
//! collocation system is always square and well posed for strictly increasing
//! abscissas.

use crate::range::{clamp, snap_to_zero};
use crate::CurvePoint;
use std::cmp::Ordering;
use thiserror::Error;

/// Highest polynomial degree used for fitting.
pub const MAX_DEGREE: usize = 5;

/// Minimum number of points a fit needs.
pub const MIN_POINTS: usize = 2;

const PIVOT_EPSILON: f64 = 1e-12;

/// Error types for spline fitting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// Fewer points than a fit can use.
    #[error("too few curve points ({count}), at least {MIN_POINTS} required")]
    TooFewPoints { count: usize },

    /// Abscissas are not strictly increasing.
    #[error("curve abscissas must be strictly increasing (point {index})")]
    NonIncreasing { index: usize },

    /// The collocation system could not be solved.
    #[error("curve points do not determine a unique spline")]
    Singular,
}

/// A fitted B-spline curve.
#[derive(Debug, Clone)]
pub struct Spline {
    knots: Vec<f64>,
    coefficients: Vec<f64>,
    degree: usize,
}

impl Spline {
    /// Fit an interpolating spline through `points`.
    ///
    /// # Errors
    /// Returns an error if fewer than two points are supplied, if the x values
    /// are not strictly increasing, or if the system is numerically singular.
    pub fn fit(points: &[CurvePoint]) -> Result<Self, CurveError> {
        let n = points.len();
        if n < MIN_POINTS {
            return Err(CurveError::TooFewPoints { count: n });
        }
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].x.partial_cmp(&pair[0].x) != Some(Ordering::Greater) {
                return Err(CurveError::NonIncreasing { index: index + 1 });
            }
        }

        let degree = MAX_DEGREE.min(n - 1);
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let knots = build_knots(&xs, degree);

        // Collocation matrix: row j holds the basis functions evaluated at x_j
        let mut matrix = vec![vec![0.0; n]; n];
        for (row, &x) in matrix.iter_mut().zip(xs.iter()) {
            let span = find_span(&knots, degree, n, x);
            let basis = basis_functions(&knots, degree, span, x);
            for (r, value) in basis.into_iter().enumerate() {
                row[span - degree + r] = value;
            }
        }

        let rhs: Vec<f64> = points.iter().map(|p| p.y).collect();
        let coefficients = solve(matrix, rhs)?;

        Ok(Self {
            knots,
            coefficients,
            degree,
        })
    }

    /// Polynomial degree of the fitted spline.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Evaluate the spline at `x`.
    ///
    /// Outside the fitted range the boundary polynomial pieces are extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.coefficients.len();
        let span = find_span(&self.knots, self.degree, n, x);
        let basis = basis_functions(&self.knots, self.degree, span, x);
        basis
            .iter()
            .enumerate()
            .map(|(r, b)| b * self.coefficients[span - self.degree + r])
            .sum()
    }

    /// Sample the spline at each of `xs`, clamping results to `[0, max]`.
    pub fn sample(&self, xs: &[f64], max: f64) -> Vec<f64> {
        xs.iter()
            .map(|&x| clamp(self.evaluate(x), 0.0, max))
            .collect()
    }
}

/// Fit `points` given on a `[0, input_max]` scale and resample them on a
/// `[0, output_max]` scale at the abscissas `xs`.
///
/// Sampled values are clamped to the output range and values under the curve
/// epsilon are snapped to exactly zero.
pub fn resample(
    points: &[CurvePoint],
    input_max: f64,
    output_max: f64,
    xs: &[f64],
) -> Result<Vec<f64>, CurveError> {
    let factor = output_max / input_max;
    let scaled: Vec<CurvePoint> = points
        .iter()
        .map(|p| CurvePoint::new(p.x * factor, p.y * factor))
        .collect();

    let spline = Spline::fit(&scaled)?;
    Ok(spline
        .sample(xs, output_max)
        .into_iter()
        .map(snap_to_zero)
        .collect())
}

// ============================================================================
// B-spline internals
// ============================================================================

fn build_knots(xs: &[f64], degree: usize) -> Vec<f64> {
    let n = xs.len();
    let mut knots = Vec::with_capacity(n + degree + 1);
    knots.extend(std::iter::repeat(xs[0]).take(degree + 1));

    let interior = n - degree - 1;
    if degree % 2 == 1 {
        let offset = (degree + 1) / 2;
        knots.extend((0..interior).map(|j| xs[j + offset]));
    } else {
        let offset = degree / 2;
        knots.extend((0..interior).map(|j| 0.5 * (xs[j + offset] + xs[j + offset + 1])));
    }

    knots.extend(std::iter::repeat(xs[n - 1]).take(degree + 1));
    knots
}

/// Index `span` with `knots[span] <= x < knots[span + 1]`, limited to the
/// valid spans `degree..n`.
fn find_span(knots: &[f64], degree: usize, n: usize, x: f64) -> usize {
    if x >= knots[n] {
        return n - 1;
    }
    if x <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = n;
    let mut mid = (low + high) / 2;
    while x < knots[mid] || x >= knots[mid + 1] {
        if x < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Non-zero basis functions `N[span - degree ..= span]` at `x`.
fn basis_functions(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;

    for j in 1..=degree {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let denominator = right[r + 1] + left[j - r];
            let temp = if denominator == 0.0 {
                0.0
            } else {
                values[r] / denominator
            };
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }

    values
}

/// Solve a dense square system with Gaussian elimination and partial pivoting.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>, CurveError> {
    let n = rhs.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .ok_or(CurveError::Singular)?;
        if matrix[pivot][col].abs() < PIVOT_EPSILON {
            return Err(CurveError::Singular);
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Ok(solution)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(f64, f64)]) -> Vec<CurvePoint> {
        coords.iter().map(|&(x, y)| CurvePoint::new(x, y)).collect()
    }

    #[test]
    fn test_too_few_points() {
        let result = Spline::fit(&points(&[(0.0, 0.0)]));
        assert_eq!(result.unwrap_err(), CurveError::TooFewPoints { count: 1 });
        assert!(Spline::fit(&[]).is_err());
    }

    #[test]
    fn test_non_increasing_rejected() {
        let result = Spline::fit(&points(&[(0.0, 0.0), (50.0, 40.0), (50.0, 60.0)]));
        assert_eq!(result.unwrap_err(), CurveError::NonIncreasing { index: 2 });
    }

    #[test]
    fn test_degree_selection() {
        assert_eq!(Spline::fit(&points(&[(0.0, 0.0), (1.0, 1.0)])).unwrap().degree(), 1);
        let four = points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)]);
        assert_eq!(Spline::fit(&four).unwrap().degree(), 3);
        let eight: Vec<CurvePoint> = (0..8).map(|i| CurvePoint::new(i as f64, 0.0)).collect();
        assert_eq!(Spline::fit(&eight).unwrap().degree(), MAX_DEGREE);
    }

    #[test]
    fn test_two_points_is_linear() {
        let spline = Spline::fit(&points(&[(0.0, 10.0), (100.0, 90.0)])).unwrap();
        assert!((spline.evaluate(50.0) - 50.0).abs() < 1e-9);
        assert!((spline.evaluate(25.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_reproduces_quadratic() {
        // Three points determine the quadratic exactly
        let spline = Spline::fit(&points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)])).unwrap();
        assert!((spline.evaluate(1.5) - 2.25).abs() < 1e-9);
        assert!((spline.evaluate(0.5) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_extrapolates_boundary_piece() {
        let spline = Spline::fit(&points(&[(10.0, 10.0), (90.0, 90.0)])).unwrap();
        assert!(spline.evaluate(0.0).abs() < 1e-9);
        assert!((spline.evaluate(100.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolates_many_points() {
        let input = points(&[
            (0.0, 0.0),
            (32.0, 22.0),
            (64.0, 56.0),
            (128.0, 128.0),
            (192.0, 200.0),
            (224.0, 235.0),
            (255.0, 255.0),
        ]);
        let spline = Spline::fit(&input).unwrap();
        for p in &input {
            assert!(
                (spline.evaluate(p.x) - p.y).abs() < 1e-6,
                "Spline misses ({}, {}): got {}",
                p.x,
                p.y,
                spline.evaluate(p.x)
            );
        }
    }

    #[test]
    fn test_sample_clamps() {
        let spline = Spline::fit(&points(&[(0.0, -20.0), (1.0, 140.0)])).unwrap();
        let samples = spline.sample(&[0.0, 1.0], 100.0);
        assert_eq!(samples, vec![0.0, 100.0]);
    }

    #[test]
    fn test_resample_identity_8bit() {
        let input = points(&[(0.0, 0.0), (255.0, 255.0)]);
        let out = resample(&input, 255.0, 100.0, &crate::TONE_CURVE_ABSCISSAS).unwrap();
        for (sample, expected) in out.iter().zip(crate::TONE_CURVE_ABSCISSAS) {
            assert!((sample - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_resample_snaps_small_values() {
        let input = points(&[(0.0, 0.1), (255.0, 255.0)]);
        let out = resample(&input, 255.0, 1.0, &[0.0, 1.0]).unwrap();
        // 0.1 / 255 is below the curve epsilon
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_resample_propagates_error() {
        let input = points(&[(0.0, 0.0)]);
        assert!(resample(&input, 255.0, 1.0, &[0.5]).is_err());
    }
}
