//! Interpolator Tests
//!
//! Tests for:
//! - StepInterpolator / LinearInterpolator / CosineInterpolator: clamping,
//!   segment location, reverse lookup
//! - CubicInterpolator: interpolation through the control points and C²
//!   continuity at the interior points

use auriga::math::{
    CosineInterpolator, CubicInterpolator, LinearInterpolator, Point, StepInterpolator,
};

const MAX_ERROR: f64 = 1e-4;

fn points(values: &[(f64, f64)]) -> Vec<Point> {
    values.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

// ============================================================================
// Step / linear / cosine
// ============================================================================

#[test]
fn step_interpolator_holds_the_left_point() {
    let interp = StepInterpolator::new(points(&[(0.0, 1.0), (1.0, 5.0), (2.0, 3.0)])).unwrap();
    assert_eq!(interp.sample(0.0), 1.0);
    assert_eq!(interp.sample(0.99), 1.0);
    assert_eq!(interp.sample(1.0), 5.0);
    assert_eq!(interp.sample(100.0), 3.0);
    assert_eq!(interp.sample(-100.0), 1.0);
}

#[test]
fn step_lower_bound_picks_the_closest_step_below() {
    let interp = StepInterpolator::new(points(&[(0.0, 1.0), (1.0, 5.0), (2.0, 3.0)])).unwrap();
    assert_eq!(interp.lower_bound(4.0), Some(2.0));
    assert_eq!(interp.lower_bound(1.0), Some(0.0));
    assert_eq!(interp.lower_bound(0.5), None);
}

#[test]
fn linear_interpolator_midpoints() {
    let interp = LinearInterpolator::new(points(&[(0.0, 10.0), (1.0, 1000.0)])).unwrap();
    assert!((interp.sample(0.5) - 505.0).abs() < MAX_ERROR);
    assert!((interp.sample(0.0) - 10.0).abs() < MAX_ERROR);
    assert!((interp.sample(1.0) - 1000.0).abs() < MAX_ERROR);
    // Clamped outside the range
    assert!((interp.sample(2.0) - 1000.0).abs() < MAX_ERROR);

    let x = interp.lower_bound(505.0).unwrap();
    assert!((x - 0.5).abs() < MAX_ERROR);
}

#[test]
fn cosine_interpolator_eases_in_and_out() {
    let interp = CosineInterpolator::new(points(&[(0.0, 0.0), (1.0, 1.0)])).unwrap();
    // Halfway in x is halfway in y, but the quarter points are eased
    assert!((interp.sample(0.5) - 0.5).abs() < MAX_ERROR);
    assert!(interp.sample(0.25) < 0.25);
    assert!(interp.sample(0.75) > 0.75);

    let x = interp.lower_bound(0.5).unwrap();
    assert!((x - 0.5).abs() < MAX_ERROR);
}

// ============================================================================
// Cubic spline
// ============================================================================

// Control point sets the spline tests run over
fn spline_cases() -> Vec<Vec<Point>> {
    vec![
        points(&[(0.0, 0.0), (1.0, 1.0)]),
        points(&[(0.0, 10.0), (0.5, 400.0), (1.0, 1000.0)]),
        points(&[(0.0, 0.0), (1.0, 3.0), (2.0, -1.0), (4.0, 8.0), (5.0, 8.0)]),
        points(&[(-2.0, 4.0), (-1.0, 1.0), (0.0, 0.0), (1.0, 1.0), (2.0, 4.0)]),
    ]
}

#[test]
fn cubic_spline_interpolates_its_control_points() {
    for case in spline_cases() {
        let interp = CubicInterpolator::new(case.clone()).unwrap();
        for point in &case {
            assert!(
                (interp.sample(point.x) - point.y).abs() < MAX_ERROR,
                "spline misses control point ({}, {})",
                point.x,
                point.y
            );
        }
    }
}

#[test]
fn cubic_spline_is_c2_continuous_at_interior_points() {
    const H: f64 = 1e-4;
    for case in spline_cases() {
        let interp = CubicInterpolator::new(case.clone()).unwrap();
        for point in &case[1..case.len() - 1] {
            let x = point.x;

            // One-sided first derivatives
            let left_d = (interp.sample(x) - interp.sample(x - H)) / H;
            let right_d = (interp.sample(x + H) - interp.sample(x)) / H;
            assert!(
                (left_d - right_d).abs() < 1e-2,
                "tangent discontinuity at x={x}: {left_d} vs {right_d}"
            );

            // One-sided second derivatives
            let left_dd =
                (interp.sample(x) - 2.0 * interp.sample(x - H) + interp.sample(x - 2.0 * H))
                    / (H * H);
            let right_dd =
                (interp.sample(x + 2.0 * H) - 2.0 * interp.sample(x + H) + interp.sample(x))
                    / (H * H);
            assert!(
                (left_dd - right_dd).abs() < 1e-1,
                "curvature discontinuity at x={x}: {left_dd} vs {right_dd}"
            );
        }
    }
}

#[test]
fn cubic_spline_has_zero_end_curvature() {
    const H: f64 = 1e-4;
    let interp =
        CubicInterpolator::new(points(&[(0.0, 0.0), (1.0, 3.0), (2.0, -1.0), (3.0, 2.0)])).unwrap();
    // Natural spline: second derivative vanishes at both end points
    let start_dd =
        (interp.sample(2.0 * H) - 2.0 * interp.sample(H) + interp.sample(0.0)) / (H * H);
    let end_dd =
        (interp.sample(3.0) - 2.0 * interp.sample(3.0 - H) + interp.sample(3.0 - 2.0 * H)) / (H * H);
    assert!(start_dd.abs() < 1e-1, "start curvature {start_dd}");
    assert!(end_dd.abs() < 1e-1, "end curvature {end_dd}");
}

#[test]
fn cubic_spline_lower_bound_finds_a_matching_x() {
    let interp =
        CubicInterpolator::new(points(&[(0.0, 10.0), (0.5, 400.0), (1.0, 1000.0)])).unwrap();
    let x = interp.lower_bound(400.0).unwrap();
    assert!((interp.sample(x) - 400.0).abs() < MAX_ERROR);
    assert!((0.0..=1.0).contains(&x));

    assert_eq!(interp.lower_bound(-50.0), None);
}

#[test]
fn degenerate_splines_are_lines() {
    let single = CubicInterpolator::new(points(&[(2.0, 7.0)])).unwrap();
    assert_eq!(single.sample(-10.0), 7.0);
    assert_eq!(single.sample(10.0), 7.0);

    let pair = CubicInterpolator::new(points(&[(0.0, 0.0), (2.0, 4.0)])).unwrap();
    assert!((pair.sample(1.0) - 2.0).abs() < MAX_ERROR);
}
