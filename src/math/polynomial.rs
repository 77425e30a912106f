//! Generic low-degree polynomials.
//!
//! An n-degree polynomial (n >= 0) is defined by its coefficients
//! (c0, c1, ..., cn) as f(x) = c0 + c1·x + c2·x² + ... + cn·xⁿ.
//!
//! Exact real-root solving is supported up to degree four; by the
//! Abel-Ruffini theorem there are no closed-form solutions beyond that, and
//! numerical root finders are too error-sensitive to be worth carrying here.

use super::is_near;

use std::f64::consts::PI;

/// A polynomial with `C` coefficients (degree `C - 1`), lowest order first.
///
/// `Polynomial<1>` is a constant function; `x` is ignored during sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polynomial<const C: usize> {
    /// The coefficients, lowest order first.
    pub coefficients: [f64; C],
}

impl<const C: usize> Default for Polynomial<C> {
    fn default() -> Self {
        Self {
            coefficients: [0.0; C],
        }
    }
}

/// A first-degree (linear) polynomial: y = a + b·x.
pub type LinearPolynomial = Polynomial<2>;

/// A second-degree (quadratic) polynomial: y = a + b·x + c·x².
pub type QuadraticPolynomial = Polynomial<3>;

/// A third-degree (cubic) polynomial: y = a + b·x + c·x² + d·x³.
pub type CubicPolynomial = Polynomial<4>;

/// A fourth-degree (quartic) polynomial: y = a + b·x + c·x² + d·x³ + e·x⁴.
pub type QuarticPolynomial = Polynomial<5>;

impl<const C: usize> Polynomial<C> {
    #[must_use]
    pub const fn new(coefficients: [f64; C]) -> Self {
        Self { coefficients }
    }

    /// Samples the polynomial at `x` using Horner's rule.
    #[must_use]
    pub fn sample(&self, x: f64) -> f64 {
        let mut y = self.coefficients[C - 1];
        for i in (0..C - 1).rev() {
            y = self.coefficients[i] + x * y;
        }
        y
    }

    /// Returns all real `x` (sorted ascending) such that `sample(x) == y`.
    ///
    /// Only valid for polynomials of degree less than five.
    #[must_use]
    pub fn solve(&self, y: f64) -> Vec<f64> {
        solve_polynomial(y, &self.coefficients)
    }
}

/// Solves `f(x) = y` for a polynomial given by `coefficients` (lowest order
/// first, degree = len - 1, at most 4).
///
/// Leading coefficients that are (near) zero demote the polynomial to a
/// lower degree before the degree-specific formula is chosen.
#[must_use]
pub fn solve_polynomial(y: f64, coefficients: &[f64]) -> Vec<f64> {
    assert!(!coefficients.is_empty() && coefficients.len() <= 5);

    let degree = coefficients.len() - 1;
    if degree >= 4 && !is_near(coefficients[4], 0.0) {
        return solve_quartic(y, coefficients);
    }
    if degree >= 3 && !is_near(coefficients[3], 0.0) {
        return solve_cubic(y, coefficients);
    }
    if degree >= 2 && !is_near(coefficients[2], 0.0) {
        return solve_quadratic(y, coefficients);
    }
    if degree >= 1 && !is_near(coefficients[1], 0.0) {
        return vec![(y - coefficients[0]) / coefficients[1]];
    }

    // Constant function: every x solves it iff y == c0. Returning all of
    // them isn't doable, so return a representative.
    if is_near(y, coefficients[0]) {
        return vec![0.0];
    }
    Vec::new()
}

// Solve y = c0 + c1·x + c2·x² via the quadratic formula.
fn solve_quadratic(y: f64, c: &[f64]) -> Vec<f64> {
    let (a, b, c) = (c[2], c[1], c[0] - y);
    let d = b * b - 4.0 * a * c;
    if d >= 0.0 {
        let sqrt_d = d.sqrt();
        let mut xs = vec![(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)];
        xs.sort_by(f64::total_cmp);
        return xs;
    }
    Vec::new()
}

// Solve y = c0 + c1·x + c2·x² + c3·x³ via Cardano's formula.
fn solve_cubic(y: f64, c: &[f64]) -> Vec<f64> {
    // Normalize to a monic cubic: a0 + a1·x + a2·x² + x³ = 0
    let a0 = (c[0] - y) / c[3];
    let a1 = c[1] / c[3];
    let a2 = c[2] / c[3];

    // With Q = (3a1 - a2²)/9, R = (9·a2·a1 - 27·a0 - 2·a2³)/54 and
    // D = Q³ + R², the sign of D determines the number of real roots.
    let q = (3.0 * a1 - a2 * a2) / 9.0;
    let r = (9.0 * a2 * a1 - 27.0 * a0 - 2.0 * a2 * a2 * a2) / 54.0;
    let d = q * q * q + r * r;

    if is_near(d, 0.0) {
        // Two of the three roots coincide.
        let s = r.cbrt();
        let x1 = 2.0 * s - a2 / 3.0;
        let x2 = -s - a2 / 3.0;
        if is_near(x1, x2) {
            return vec![x1];
        }
        let mut xs = vec![x1, x2];
        xs.sort_by(f64::total_cmp);
        return xs;
    }

    if d > 0.0 {
        // One real root; the other two are complex conjugates.
        let sqrt_d = d.sqrt();
        let s = (r + sqrt_d).cbrt();
        let t = (r - sqrt_d).cbrt();
        return vec![s + t - a2 / 3.0];
    }

    // Three distinct real roots via the trigonometric form.
    debug_assert!(q <= 0.0);
    let theta = (r / (-q * q * q).sqrt()).acos();
    let m = 2.0 * (-q).sqrt();
    let mut xs = vec![
        m * (theta / 3.0).cos() - a2 / 3.0,
        m * ((theta + 2.0 * PI) / 3.0).cos() - a2 / 3.0,
        m * ((theta + 4.0 * PI) / 3.0).cos() - a2 / 3.0,
    ];
    xs.sort_by(f64::total_cmp);
    xs
}

// Solve y = c0 + c1·x + c2·x² + c3·x³ + c4·x⁴ via the resolvent cubic.
fn solve_quartic(y: f64, co: &[f64]) -> Vec<f64> {
    // Normalize to a monic quartic: x⁴ + b·x³ + c·x² + d·x + e = 0
    let b = co[3] / co[4];
    let c = co[2] / co[4];
    let d = co[1] / co[4];
    let e = (co[0] - y) / co[4];

    // Resolvent cubic: z³ - c·z² + (d·b - 4e)·z + (4·c·e - d² - b²·e) = 0
    let cubic = [4.0 * c * e - d * d - b * b * e, d * b - 4.0 * e, -c, 1.0];
    let zs = solve_polynomial(0.0, &cubic);
    if zs.is_empty() {
        return Vec::new();
    }

    // Use a non-zero real root of the cubic (largest for better precision).
    let Some(&z) = zs.iter().rev().find(|&&v| !is_near(v, 0.0)) else {
        // The resolvent cubic only has a single solution: 0.
        return vec![0.0];
    };

    let r = (b * b / 4.0 - c + z).sqrt() / 2.0;
    let m = b * b * 3.0 / 16.0 - r * r - c / 2.0;
    let n = if is_near(r, 0.0) {
        (z * z / 4.0 - e).sqrt()
    } else {
        (b * c / 8.0 - d / 4.0 - b * b * b / 32.0) / r
    };

    let mut xs = Vec::new();
    if m + n >= 0.0 {
        let dd = (m + n).sqrt();
        xs.push(b / -4.0 + r + dd);
        if !is_near(dd, 0.0) {
            xs.push(b / -4.0 + r - dd);
        }
    }
    if m >= n {
        let ee = (m - n).sqrt();
        xs.push(b / -4.0 - r + ee);
        if !is_near(ee, 0.0) {
            xs.push(b / -4.0 - r - ee);
        }
    }

    xs.sort_by(f64::total_cmp);
    xs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_uses_all_coefficients() {
        let p = CubicPolynomial::new([1.0, -3.0, 0.0, 4.0]);
        assert!(is_near(p.sample(0.0), 1.0));
        assert!(is_near(p.sample(1.0), 2.0));
        assert!(is_near(p.sample(2.0), 27.0));
    }

    #[test]
    fn degenerate_leading_coefficient_demotes_degree() {
        // 2 + 3x + 0x² is really linear
        let xs = solve_polynomial(8.0, &[2.0, 3.0, 0.0]);
        assert_eq!(xs.len(), 1);
        assert!(is_near(xs[0], 2.0));
    }
}
