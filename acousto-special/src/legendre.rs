//! Associated Legendre functions and spherical harmonics.
//!
//! Conventions follow the quantum mechanical standard: the Condon-Shortley
//! phase is included in the associated Legendre functions and the
//! spherical harmonics are
//! ```text
//! Y_lm(θ, φ) = N_lm P_l^m(cos θ) e^{i m φ}
//! N_lm = sqrt((2l+1)(l-m)! / (4π (l+m)!))
//! ```
//! Arguments outside [-1, 1] and complex arguments, which appear for
//! evanescent wave directions, use the continuation (1 - z²)^{m/2} on the
//! principal branch.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Associated Legendre function P_l^m(x) of real argument.
///
/// Negative orders are handled through
/// P_l^{-m} = (-1)^m (l-m)!/(l+m)! P_l^m.
pub fn lpmv(m: i32, l: usize, x: f64) -> f64 {
    let li = l as i32;
    if m.abs() > li {
        return 0.0;
    }
    if m < 0 {
        let ma = -m;
        let mut ratio = 1.0;
        for j in (li - ma + 1)..=(li + ma) {
            ratio *= j as f64;
        }
        let sign = if ma % 2 == 0 { 1.0 } else { -1.0 };
        return sign / ratio * lpmv(ma, l, x);
    }
    let mu = m as usize;
    // P_m^m = (-1)^m (2m-1)!! (1-x²)^{m/2}, then upward in degree
    let somx2 = (1.0 - x * x).max(0.0).sqrt();
    let mut pmm = 1.0;
    let mut fact = 1.0;
    for _ in 0..mu {
        pmm *= -fact * somx2;
        fact += 2.0;
    }
    if l == mu {
        return pmm;
    }
    let mut pm1 = pmm;
    let mut pcur = x * (2 * mu + 1) as f64 * pmm;
    for ll in (mu + 2)..=l {
        let llf = ll as f64;
        let next = ((2.0 * llf - 1.0) * x * pcur - (llf + mu as f64 - 1.0) * pm1)
            / (llf - mu as f64);
        pm1 = pcur;
        pcur = next;
    }
    pcur
}

/// Associated Legendre function continued to complex argument.
pub fn assoc_legendre_c(l: usize, m: i32, z: Complex64) -> Complex64 {
    let li = l as i32;
    if m.abs() > li {
        return Complex64::new(0.0, 0.0);
    }
    if m < 0 {
        let ma = -m;
        let mut ratio = 1.0;
        for j in (li - ma + 1)..=(li + ma) {
            ratio *= j as f64;
        }
        let sign = if ma % 2 == 0 { 1.0 } else { -1.0 };
        return sign / ratio * assoc_legendre_c(l, ma, z);
    }
    let mu = m as usize;
    let somx2 = (1.0 - z * z).sqrt();
    let mut pmm = Complex64::new(1.0, 0.0);
    let mut fact = 1.0;
    for _ in 0..mu {
        pmm *= -fact * somx2;
        fact += 2.0;
    }
    if l == mu {
        return pmm;
    }
    let mut pm1 = pmm;
    let mut pcur = z * (2 * mu + 1) as f64 * pmm;
    for ll in (mu + 2)..=l {
        let llf = ll as f64;
        let next = ((2.0 * llf - 1.0) * z * pcur - (llf + mu as f64 - 1.0) * pm1)
            / (llf - mu as f64);
        pm1 = pcur;
        pcur = next;
    }
    pcur
}

/// Associated Legendre function of real argument, alias with degree first.
pub fn assoc_legendre(l: usize, m: i32, x: f64) -> f64 {
    lpmv(m, l, x)
}

/// Normalization factor of the spherical harmonics.
pub fn legendre_norm(l: usize, m: i32) -> f64 {
    let li = l as i32;
    if m.abs() > li {
        return 0.0;
    }
    // (l-m)!/(l+m)! as a running product
    let mut ratio = 1.0;
    if m >= 0 {
        for j in (li - m + 1)..=(li + m) {
            ratio /= j as f64;
        }
    } else {
        for j in (li + m + 1)..=(li - m) {
            ratio *= j as f64;
        }
    }
    ((2 * l + 1) as f64 * ratio / (4.0 * PI)).sqrt()
}

/// Spherical harmonic Y_lm with azimuthal angle `phi` and polar angle
/// `theta`.
pub fn sph_harm(m: i32, l: usize, phi: f64, theta: f64) -> Complex64 {
    legendre_norm(l, m)
        * lpmv(m, l, theta.cos())
        * Complex64::new(0.0, m as f64 * phi).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lpmv_low_orders() {
        let x = 0.5;
        assert_relative_eq!(lpmv(0, 0, x), 1.0, epsilon = 1e-14);
        assert_relative_eq!(lpmv(0, 1, x), x, epsilon = 1e-14);
        assert_relative_eq!(lpmv(1, 1, x), -(1.0 - x * x).sqrt(), epsilon = 1e-14);
        assert_relative_eq!(lpmv(0, 2, x), 0.5 * (3.0 * x * x - 1.0), epsilon = 1e-14);
        assert_relative_eq!(
            lpmv(1, 2, x),
            -3.0 * x * (1.0 - x * x).sqrt(),
            epsilon = 1e-13
        );
        assert_relative_eq!(lpmv(2, 3, x), 15.0 * x * (1.0 - x * x), epsilon = 1e-13);
    }

    #[test]
    fn test_lpmv_negative_order() {
        let x = 0.3;
        // P_2^{-1} = -P_2^1/6
        assert_relative_eq!(lpmv(-1, 2, x), -lpmv(1, 2, x) / 6.0, epsilon = 1e-14);
        // P_3^{-2} = P_3^2/120
        assert_relative_eq!(lpmv(-2, 3, x), lpmv(2, 3, x) / 120.0, epsilon = 1e-14);
    }

    #[test]
    fn test_lpmv_order_larger_than_degree() {
        assert_eq!(lpmv(3, 2, 0.4), 0.0);
        assert_eq!(lpmv(-4, 1, 0.4), 0.0);
    }

    #[test]
    fn test_complex_matches_real_inside_interval() {
        for &(l, m) in &[(0usize, 0i32), (2, 1), (4, -2), (5, 5)] {
            let x = -0.37;
            let zc = assoc_legendre_c(l, m, Complex64::new(x, 0.0));
            assert_relative_eq!(zc.re, lpmv(m, l, x), epsilon = 1e-12);
            assert_relative_eq!(zc.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_complex_continuation_beyond_one() {
        // P_1^1(x) = -(1-x²)^{1/2} -> -i sqrt(x²-1) on the principal branch
        let p = assoc_legendre_c(1, 1, Complex64::new(1.25, 0.0));
        assert_relative_eq!(p.re, 0.0, epsilon = 1e-14);
        assert_relative_eq!(p.im, -0.75, epsilon = 1e-14);
    }

    #[test]
    fn test_sph_harm_values() {
        let y00 = sph_harm(0, 0, 0.7, 1.1);
        assert_relative_eq!(y00.re, 0.282_094_791_773_878_14, epsilon = 1e-14);
        assert_relative_eq!(y00.im, 0.0, epsilon = 1e-14);

        let theta = 0.9;
        let y10 = sph_harm(0, 1, 0.0, theta);
        assert_relative_eq!(
            y10.re,
            (3.0 / (4.0 * PI)).sqrt() * theta.cos(),
            epsilon = 1e-13
        );

        let phi = 0.4;
        let y11 = sph_harm(1, 1, phi, theta);
        let want = -(3.0 / (8.0 * PI)).sqrt() * theta.sin() * Complex64::new(0.0, phi).exp();
        assert_relative_eq!(y11.re, want.re, epsilon = 1e-13);
        assert_relative_eq!(y11.im, want.im, epsilon = 1e-13);
    }

    #[test]
    fn test_sph_harm_conjugation() {
        // Y_{l,-m} = (-1)^m conj(Y_{lm})
        let (l, m, phi, theta) = (3usize, 2i32, 0.8, 1.3);
        let plus = sph_harm(m, l, phi, theta);
        let minus = sph_harm(-m, l, phi, theta);
        let want = plus.conj();
        assert_relative_eq!(minus.re, want.re, epsilon = 1e-13);
        assert_relative_eq!(minus.im, want.im, epsilon = 1e-13);
    }

    #[test]
    fn test_legendre_norm_symmetry() {
        assert_relative_eq!(
            legendre_norm(4, 3) * legendre_norm(4, -3),
            (9.0 / (4.0 * PI)) / 1.0_f64,
            max_relative = 1e-12
        );
    }
}
