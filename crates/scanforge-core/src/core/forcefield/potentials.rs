#[inline]
pub fn harmonic(dist: f64, r0: f64, k: f64) -> f64 {
    0.5 * k * (dist - r0).powi(2)
}

#[inline]
pub fn harmonic_deriv(dist: f64, r0: f64, k: f64) -> f64 {
    k * (dist - r0)
}

#[inline]
pub fn lennard_jones_12_6(dist: f64, r_min: f64, well_depth: f64) -> f64 {
    let rho = r_min / dist;
    well_depth * (rho.powi(12) - 2.0 * rho.powi(6))
}

#[inline]
pub fn lennard_jones_12_6_deriv(dist: f64, r_min: f64, well_depth: f64) -> f64 {
    let rho = r_min / dist;
    12.0 * well_depth / dist * (rho.powi(6) - rho.powi(12))
}

#[inline]
pub fn harmonic_cosine_bend(cos_theta: f64, cos_theta0: f64, k_cos: f64) -> f64 {
    0.5 * k_cos * (cos_theta - cos_theta0).powi(2)
}

#[inline]
pub fn harmonic_cosine_bend_deriv(cos_theta: f64, cos_theta0: f64, k_cos: f64) -> f64 {
    k_cos * (cos_theta - cos_theta0)
}

#[inline]
pub fn linear_bend(cos_theta: f64, k: f64) -> f64 {
    k * (1.0 + cos_theta)
}

#[inline]
pub fn linear_bend_deriv(k: f64) -> f64 {
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn numeric_deriv(f: impl Fn(f64) -> f64, x: f64) -> f64 {
        let h = 1e-6;
        (f(x + h) - f(x - h)) / (2.0 * h)
    }

    #[test]
    fn harmonic_is_zero_at_equilibrium() {
        assert!(f64_approx_equal(harmonic(1.5, 1.5, 300.0), 0.0));
    }

    #[test]
    fn harmonic_is_symmetric_about_equilibrium() {
        let compressed = harmonic(1.4, 1.5, 300.0);
        let stretched = harmonic(1.6, 1.5, 300.0);
        assert!(f64_approx_equal(compressed, stretched));
        assert!(compressed > 0.0);
    }

    #[test]
    fn harmonic_deriv_matches_numeric_derivative() {
        let analytic = harmonic_deriv(1.62, 1.5, 300.0);
        let numeric = numeric_deriv(|d| harmonic(d, 1.5, 300.0), 1.62);
        assert!((analytic - numeric).abs() < 1e-5);
    }

    #[test]
    fn lennard_jones_reaches_minus_well_depth_at_minimum() {
        let energy = lennard_jones_12_6(3.5, 3.5, 0.25);
        assert!(f64_approx_equal(energy, -0.25));
    }

    #[test]
    fn lennard_jones_deriv_is_zero_at_minimum() {
        assert!(f64_approx_equal(lennard_jones_12_6_deriv(3.5, 3.5, 0.25), 0.0));
    }

    #[test]
    fn lennard_jones_is_repulsive_inside_the_minimum() {
        assert!(lennard_jones_12_6(2.0, 3.5, 0.25) > 0.0);
        assert!(lennard_jones_12_6_deriv(2.0, 3.5, 0.25) < 0.0);
    }

    #[test]
    fn lennard_jones_deriv_matches_numeric_derivative() {
        for dist in [2.8, 3.5, 4.7] {
            let analytic = lennard_jones_12_6_deriv(dist, 3.5, 0.25);
            let numeric = numeric_deriv(|d| lennard_jones_12_6(d, 3.5, 0.25), dist);
            assert!((analytic - numeric).abs() < 1e-4);
        }
    }

    #[test]
    fn harmonic_cosine_bend_is_zero_at_equilibrium_angle() {
        let cos0 = (109.47f64).to_radians().cos();
        assert!(f64_approx_equal(harmonic_cosine_bend(cos0, cos0, 150.0), 0.0));
    }

    #[test]
    fn harmonic_cosine_bend_deriv_matches_numeric_derivative() {
        let cos0 = (109.47f64).to_radians().cos();
        let analytic = harmonic_cosine_bend_deriv(0.1, cos0, 150.0);
        let numeric = numeric_deriv(|c| harmonic_cosine_bend(c, cos0, 150.0), 0.1);
        assert!((analytic - numeric).abs() < 1e-5);
    }

    #[test]
    fn linear_bend_vanishes_at_straight_angle() {
        // cos(180 deg) = -1.
        assert!(f64_approx_equal(linear_bend(-1.0, 40.0), 0.0));
        assert!(linear_bend(0.0, 40.0) > 0.0);
    }
}
