//! Point-sequence interpolators.
//!
//! Each interpolator is constructed from a sequence of (x, y) points with
//! strictly increasing x. `sample(x)` clamps x to the covered range, locates
//! the segment by upper bound, and evaluates that segment.
//! `lower_bound(y)` performs the reverse mapping where one exists.

use super::polynomial::CubicPolynomial;
use super::is_near;

use crate::error::{Error, Result};

use std::f64::consts::PI;

/// A control point of an interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn check_sorted(points: &[Point]) -> Result<()> {
    if points.is_empty() {
        return Err(Error::BadArgument("interpolator needs at least one point".into()));
    }
    for pair in points.windows(2) {
        if pair[1].x <= pair[0].x {
            return Err(Error::BadArgument(
                "interpolator points must have strictly increasing x".into(),
            ));
        }
    }
    Ok(())
}

/// Returns the index of the point on the *left* of `x`, such that `x` is
/// greater than or equal to the returned point's x.
fn find_index(points: &[Point], x: f64) -> usize {
    debug_assert!(!points.is_empty());
    let upper = points.partition_point(|p| p.x <= x);
    // x is clamped to the points range before we get here, but guard against
    // floating-point comparison weirdness at the left edge.
    upper.max(1) - 1
}

fn clamp_to_range(points: &[Point], x: f64) -> f64 {
    x.clamp(points[0].x, points[points.len() - 1].x)
}

/// A zero-order-hold interpolator: `sample` returns the y of the nearest
/// point on the left.
#[derive(Debug, Clone)]
pub struct StepInterpolator {
    points: Vec<Point>,
}

impl StepInterpolator {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        check_sorted(&points)?;
        Ok(Self { points })
    }

    #[must_use]
    pub fn sample(&self, x: f64) -> f64 {
        let x = clamp_to_range(&self.points, x);
        self.points[find_index(&self.points, x)].y
    }

    /// Returns the x of the step whose y is closest to `y` from below.
    #[must_use]
    pub fn lower_bound(&self, y: f64) -> Option<f64> {
        let mut min_dy = 0.0;
        let mut min_x = None;
        for point in &self.points {
            let dy = y - point.y;
            if dy >= 0.0 && (min_x.is_none() || dy < min_dy) {
                min_dy = dy;
                min_x = Some(point.x);
            }
        }
        min_x
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// A piecewise-linear interpolator.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    points: Vec<Point>,
}

impl LinearInterpolator {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        check_sorted(&points)?;
        Ok(Self { points })
    }

    #[must_use]
    pub fn sample(&self, x: f64) -> f64 {
        let x = clamp_to_range(&self.points, x);
        let index = find_index(&self.points, x);

        // For the pair (xi, yi), (xi+1, yi+1) with x in [xi, xi+1]:
        //   y = dy/dx · (x - xi) + yi
        let x = x - self.points[index].x;
        if index == self.points.len() - 1 || is_near(x, 0.0) {
            return self.points[index].y;
        }

        let dx = self.points[index + 1].x - self.points[index].x;
        let dy = self.points[index + 1].y - self.points[index].y;
        self.points[index].y + dy * (x / dx)
    }

    /// Returns the smallest x that maps to `y`, if any segment covers it.
    #[must_use]
    pub fn lower_bound(&self, y: f64) -> Option<f64> {
        for pair in self.points.windows(2) {
            // Invert y = dy/dx · (x - xi) + yi for x in [xi, xi+1].
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            let t = (y - pair[0].y) / dy;
            if (0.0..=1.0).contains(&t) {
                return Some(pair[0].x + t * dx);
            }
        }
        None
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// A cosine-eased interpolator.
#[derive(Debug, Clone)]
pub struct CosineInterpolator {
    points: Vec<Point>,
}

impl CosineInterpolator {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        check_sorted(&points)?;
        Ok(Self { points })
    }

    #[must_use]
    pub fn sample(&self, x: f64) -> f64 {
        let x = clamp_to_range(&self.points, x);
        let index = find_index(&self.points, x);

        // For the pair (xi, yi), (xi+1, yi+1) with x in [xi, xi+1]:
        //   y = dy · ½(1 - cos π(x - xi)/dx) + yi
        let x = x - self.points[index].x;
        if index == self.points.len() - 1 || is_near(x, 0.0) {
            return self.points[index].y;
        }

        let dx = self.points[index + 1].x - self.points[index].x;
        let dy = self.points[index + 1].y - self.points[index].y;
        let t = (1.0 - (x / dx * PI).cos()) / 2.0;
        self.points[index].y + dy * t
    }

    /// Returns the smallest x that maps to `y`, if any segment covers it.
    #[must_use]
    pub fn lower_bound(&self, y: f64) -> Option<f64> {
        for pair in self.points.windows(2) {
            // Invert y = dy · ½(1 - cos π(x - xi)/dx) + yi:
            //   x = cos⁻¹(1 - 2(y - yi)/dy)·dx/π + xi
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            let t = (1.0 - 2.0 * (y - pair[0].y) / dy).acos() / PI;
            if (0.0..=1.0).contains(&t) {
                return Some(pair[0].x + t * dx);
            }
        }
        None
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// A natural cubic-spline interpolator.
///
/// The piecewise polynomial is C² continuous across interior points and has
/// zero curvature at the end points.
#[derive(Debug, Clone)]
pub struct CubicInterpolator {
    points: Vec<Point>,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    polynomial: CubicPolynomial,
    min_x: f64,
}

impl CubicInterpolator {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        check_sorted(&points)?;
        let segments = create_segments(&points);
        Ok(Self { points, segments })
    }

    #[must_use]
    pub fn sample(&self, x: f64) -> f64 {
        let x = clamp_to_range(&self.points, x);
        let index = find_index(&self.points, x);

        if index == self.points.len() - 1 || is_near(x, self.points[index].x) {
            return self.points[index].y;
        }
        let segment = &self.segments[index.min(self.segments.len() - 1)];
        segment.polynomial.sample(x - segment.min_x)
    }

    /// Returns the smallest x that maps to `y`, if any segment covers it.
    #[must_use]
    pub fn lower_bound(&self, y: f64) -> Option<f64> {
        for (i, segment) in self.segments.iter().enumerate() {
            for t in segment.polynomial.solve(y) {
                // The polynomial is in segment-local coordinates.
                let x = segment.min_x + t;
                let (lo, hi) = (self.points[i].x, self.points[(i + 1).min(self.points.len() - 1)].x);
                if x >= lo && x <= hi {
                    return Some(x);
                }
            }
        }
        None
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Solves the natural-cubic-spline coefficients for `points`.
///
/// For N+1 points this produces N cubics fᵢ(x) = Aᵢ + Bᵢ·(x-xᵢ) + Cᵢ·(x-xᵢ)²
/// + Dᵢ·(x-xᵢ)³ constrained to interpolate the points and to be C²
/// continuous at every interior point, with zero curvature at both ends.
/// Substituting the constraints yields a diagonally dominant tridiagonal
/// system in the Cᵢ, solved here with the Thomas algorithm; Bᵢ and Dᵢ follow
/// from the Cᵢ.
fn create_segments(points: &[Point]) -> Vec<Segment> {
    debug_assert!(!points.is_empty());

    if points.len() == 1 {
        // Horizontal line at y = points[0].y
        return vec![Segment {
            polynomial: CubicPolynomial::new([points[0].y, 0.0, 0.0, 0.0]),
            min_x: 0.0,
        }];
    }

    if points.len() == 2 {
        // Straight line from points[0] to points[1]
        let slope = (points[1].y - points[0].y) / (points[1].x - points[0].x);
        return vec![Segment {
            polynomial: CubicPolynomial::new([points[0].y, slope, 0.0, 0.0]),
            min_x: points[0].x,
        }];
    }

    // Forward sweep of the Thomas algorithm. `superd` holds the updated
    // superdiagonal, `c` the right-hand side, then the solved unknowns.
    let n = points.len();
    let mut superd = vec![0.0; n - 1];
    let mut c = vec![0.0; n];

    for i in 1..n - 1 {
        let alpha = 3.0 * (points[i + 1].y - points[i].y) / (points[i + 1].x - points[i].x)
            - 3.0 * (points[i].y - points[i - 1].y) / (points[i].x - points[i - 1].x);
        let tmp =
            2.0 * (points[i + 1].x - points[i - 1].x) - superd[i - 1] * (points[i].x - points[i - 1].x);

        superd[i] = (points[i + 1].x - points[i].x) / tmp;
        c[i] = (alpha - (points[i].x - points[i - 1].x) * c[i - 1]) / tmp;
    }

    // Back substitution for the C coefficients.
    c[n - 1] = 0.0;
    for i in (1..n).rev() {
        c[i - 1] -= superd[i - 1] * c[i];
    }

    // Derive the remaining polynomial coefficients per segment.
    let mut segments = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let h = points[i + 1].x - points[i].x;
        let a = points[i].y;
        let b = (points[i + 1].y - points[i].y) / h - (c[i + 1] + 2.0 * c[i]) * h / 3.0;
        let d = (c[i + 1] - c[i]) / (3.0 * h);
        segments.push(Segment {
            polynomial: CubicPolynomial::new([a, b, c[i], d]),
            min_x: points[i].x,
        });
    }
    segments
}

/// A point-sequence interpolator of any supported kind.
///
/// Tagged variant over the concrete interpolators so stores and camera
/// properties can hold "some interpolator" without boxing a trait object.
#[derive(Debug, Clone)]
pub enum Interpolator {
    Step(StepInterpolator),
    Linear(LinearInterpolator),
    Cosine(CosineInterpolator),
    Cubic(CubicInterpolator),
}

impl Interpolator {
    #[must_use]
    pub fn sample(&self, x: f64) -> f64 {
        match self {
            Interpolator::Step(i) => i.sample(x),
            Interpolator::Linear(i) => i.sample(x),
            Interpolator::Cosine(i) => i.sample(x),
            Interpolator::Cubic(i) => i.sample(x),
        }
    }

    #[must_use]
    pub fn lower_bound(&self, y: f64) -> Option<f64> {
        match self {
            Interpolator::Step(i) => i.lower_bound(y),
            Interpolator::Linear(i) => i.lower_bound(y),
            Interpolator::Cosine(i) => i.lower_bound(y),
            Interpolator::Cubic(i) => i.lower_bound(y),
        }
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        match self {
            Interpolator::Step(i) => i.points(),
            Interpolator::Linear(i) => i.points(),
            Interpolator::Cosine(i) => i.points(),
            Interpolator::Cubic(i) => i.points(),
        }
    }
}

impl From<LinearInterpolator> for Interpolator {
    fn from(i: LinearInterpolator) -> Self {
        Interpolator::Linear(i)
    }
}

impl From<CubicInterpolator> for Interpolator {
    fn from(i: CubicInterpolator) -> Self {
        Interpolator::Cubic(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsorted_points_are_rejected() {
        assert!(LinearInterpolator::new(vec![Point::new(1.0, 0.0), Point::new(0.0, 1.0)]).is_err());
        assert!(LinearInterpolator::new(Vec::new()).is_err());
    }

    #[test]
    fn linear_sample_and_inverse_agree() {
        let interp =
            LinearInterpolator::new(vec![Point::new(0.0, 10.0), Point::new(2.0, 30.0)]).unwrap();
        assert!(is_near(interp.sample(1.0), 20.0));
        assert!(is_near(interp.lower_bound(20.0).unwrap(), 1.0));
    }

    #[test]
    fn sample_clamps_outside_the_range() {
        let interp =
            StepInterpolator::new(vec![Point::new(0.0, 1.0), Point::new(1.0, 2.0)]).unwrap();
        assert!(is_near(interp.sample(-5.0), 1.0));
        assert!(is_near(interp.sample(5.0), 2.0));
    }
}
