//! Math Primitive Tests
//!
//! Tests for:
//! - Rect: contains/offset/intersect/combine algebra
//! - Polynomial: sampling and exact real-root solving for degrees 1-4
//! - Quaternion Euler conversions (via glam)

use auriga::math::{
    CubicPolynomial, LinearPolynomial, QuadraticPolynomial, QuarticPolynomial, Rect,
};

use glam::{EulerRot, IVec2, Quat, Vec3};

const MAX_ERROR: f64 = 1e-6;

fn assert_roots(actual: &[f64], expected: &[f64]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "expected roots {expected:?}, got {actual:?}"
    );
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a - e).abs() < MAX_ERROR,
            "expected roots {expected:?}, got {actual:?}"
        );
    }
}

// ============================================================================
// Rect
// ============================================================================

#[test]
fn rect_intersect_is_contained_in_both() {
    let a = Rect::new(0, 0, 100, 50);
    let b = Rect::new(30, 20, 100, 50);
    let i = Rect::intersect(&a, &b).unwrap();
    assert_eq!(i, Rect::new(30, 20, 70, 30));
    // Contained in both inputs
    assert_eq!(Rect::intersect(&i, &a), Some(i));
    assert_eq!(Rect::intersect(&i, &b), Some(i));
}

#[test]
fn rect_combine_contains_both() {
    let a = Rect::new(-10, 0, 20, 20);
    let b = Rect::new(50, 30, 10, 10);
    let u = Rect::combine(&a, &b);
    assert_eq!(Rect::intersect(&u, &a), Some(a));
    assert_eq!(Rect::intersect(&u, &b), Some(b));
}

#[test]
fn rect_identities() {
    let a = Rect::new(3, 4, 5, 6);
    assert_eq!(Rect::intersect(&a, &a), Some(a));
    assert_eq!(Rect::combine(&a, &a), a);
}

#[test]
fn rect_edges_are_exclusive() {
    let a = Rect::new(0, 0, 10, 10);
    assert!(a.contains(IVec2::new(9, 9)));
    assert!(!a.contains(IVec2::new(10, 9)));
    let b = a.offset(IVec2::new(10, 0));
    assert_eq!(Rect::intersect(&a, &b), None);
}

// ============================================================================
// Polynomials
// ============================================================================

#[test]
fn linear_polynomial_sample_and_solve() {
    // f(x) = 2x + 1
    let p = LinearPolynomial::new([1.0, 2.0]);
    assert_eq!(p.sample(0.0), 1.0);
    assert_eq!(p.sample(1.0), 3.0);
    assert_eq!(p.sample(10.0), 21.0);

    assert_roots(&p.solve(6.0), &[2.5]);
    assert_roots(&p.solve(2.0), &[0.5]);
    assert_roots(&p.solve(0.0), &[-0.5]);
    assert_roots(&p.solve(-100.0), &[-50.5]);
}

#[test]
fn quadratic_polynomial_sample_and_solve() {
    // f(x) = 3x² + 2x + 1, a parabola with its minimum at (-1/3, 2/3)
    let p = QuadraticPolynomial::new([1.0, 2.0, 3.0]);
    assert_eq!(p.sample(0.0), 1.0);
    assert_eq!(p.sample(1.0), 6.0);
    assert_eq!(p.sample(10.0), 321.0);

    assert_roots(&p.solve(0.0), &[]);
    assert_roots(&p.solve(0.5), &[]);
    assert_roots(&p.solve(2.0), &[-1.0, 1.0 / 3.0]);
    assert_roots(&p.solve(100.0), &[-6.087_558_83, 5.420_892_17]);
}

#[test]
fn cubic_polynomial_sample_and_solve() {
    // f(x) = 4x³ + 3x² + 2x + 1, a cubic without local extrema
    let p = CubicPolynomial::new([1.0, 2.0, 3.0, 4.0]);
    assert_eq!(p.sample(0.0), 1.0);
    assert_eq!(p.sample(1.0), 10.0);
    assert_eq!(p.sample(10.0), 4321.0);

    assert_roots(&p.solve(-10.0), &[-1.559_777_29]);
    assert_roots(&p.solve(0.0), &[-0.605_829_59]);
    assert_roots(&p.solve(1.0), &[0.0]);
    assert_roots(&p.solve(10.0), &[1.0]);
}

#[test]
fn cubic_polynomial_with_local_extrema() {
    // f(x) = 4x³ - 3x² + 1, local maximum at (0, 1), local minimum at
    // (0.5, 0.75)
    let p = CubicPolynomial::new([1.0, 0.0, -3.0, 4.0]);

    // At the extrema: two solutions
    assert_roots(&p.solve(1.0), &[0.0, 0.75]);
    assert_roots(&p.solve(0.75), &[-0.25, 0.5]);

    // Between the extrema: three solutions, sorted ascending
    let roots = p.solve(0.875);
    assert_eq!(roots.len(), 3);
    assert!(roots.windows(2).all(|w| w[0] < w[1]));
    for root in &roots {
        assert!((p.sample(*root) - 0.875).abs() < MAX_ERROR);
    }

    // Outside: one solution
    assert_eq!(p.solve(5.0).len(), 1);
    assert_eq!(p.solve(-5.0).len(), 1);
}

#[test]
fn cubic_polynomial_with_repeated_roots() {
    // f(x) = x³ - 3x² + 1, local maximum at (0, 1), local minimum at
    // (2, -3)
    let p = CubicPolynomial::new([1.0, 0.0, -3.0, 1.0]);
    assert_roots(&p.solve(1.0), &[0.0, 3.0]);
    assert_roots(&p.solve(-3.0), &[-1.0, 2.0]);
}

#[test]
fn quartic_polynomial_sample_and_solve() {
    // f(x) = 5x⁴ + 4x³ + 3x² + 2x + 1, minimum around (-0.437, 0.547)
    let p = QuarticPolynomial::new([1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(p.sample(0.0), 1.0);
    assert_eq!(p.sample(1.0), 15.0);
    assert_eq!(p.sample(10.0), 54321.0);

    assert_roots(&p.solve(-10.0), &[]);
    assert_roots(&p.solve(0.0), &[]);
    assert_roots(&p.solve(1.0), &[-0.729_323_14, 0.0]);
    assert_roots(&p.solve(10.0), &[-1.333_718_06, 0.852_344_77]);
}

#[test]
fn quartic_polynomial_four_real_roots() {
    // f(x) = x⁴ + 4x³ - 8x² = -1 has four real solutions
    let p = QuarticPolynomial::new([0.0, 0.0, -8.0, 4.0, 1.0]);
    assert_roots(
        &p.solve(-1.0),
        &[-5.459_255_25, -0.329_520_20, 0.400_378_71, 1.388_396_73],
    );

    // f(x) = x⁴ has one real solution at 0
    let p = QuarticPolynomial::new([0.0, 0.0, 0.0, 0.0, 1.0]);
    assert_roots(&p.solve(0.0), &[0.0]);

    // f(x) = x⁴ + x² + 5 = 5 has one real solution
    let p = QuarticPolynomial::new([5.0, 0.0, 1.0, 0.0, 1.0]);
    assert_roots(&p.solve(5.0), &[0.0]);
}

#[test]
fn solved_roots_sample_back_to_y() {
    let p = CubicPolynomial::new([1.0, 0.0, -3.0, 4.0]);
    for y in [-3.0, -1.0, 0.0, 0.5, 1.0, 2.0] {
        for root in p.solve(y) {
            assert!(
                (p.sample(root) - y).abs() < MAX_ERROR,
                "root {root} of y={y} does not sample back"
            );
        }
    }
}

// ============================================================================
// Quaternion Euler conversions
// ============================================================================

fn assert_vec_near(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-3,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn euler_rotation_about_x_rotates_axes() {
    // 90° about X (intrinsic XYZ): X stays, Y -> Z, Z -> -Y
    let q = Quat::from_euler(EulerRot::XYZ, std::f32::consts::FRAC_PI_2, 0.0, 0.0);
    assert_vec_near(q * Vec3::X, Vec3::new(1.0, 0.0, 0.0));
    assert_vec_near(q * Vec3::Y, Vec3::new(0.0, 0.0, 1.0));
    assert_vec_near(q * Vec3::Z, Vec3::new(0.0, -1.0, 0.0));
}

#[test]
fn intrinsic_matches_reversed_extrinsic() {
    // A composed rotation: intrinsic XYZ equals extrinsic ZYX with the
    // same angles.
    let (a, b, c) = (0.3, -0.7, 1.1);
    let intrinsic = Quat::from_euler(EulerRot::XYZ, a, b, c);
    let extrinsic = Quat::from_euler(EulerRot::ZYXEx, c, b, a);
    let probe = Vec3::new(0.5, -2.0, 1.5);
    assert_vec_near(intrinsic * probe, extrinsic * probe);
}
