//! Wigner rotation matrices and coupling coefficients.
//!
//! Rotations follow the z-y-z convention with Euler angles (α, β, γ),
//! ```text
//! D^l_{m'm}(α, β, γ) = e^{-i m' α} d^l_{m'm}(β) e^{-i m γ}
//! ```
//! The summation formulas run over factorials of moderate size; they are
//! accumulated in logarithmic space so that degrees beyond the usual
//! multipole cutoffs remain finite.

use num_complex::Complex64;
use std::f64::consts::PI;

fn ln_fact(n: i32) -> f64 {
    debug_assert!(n >= 0);
    let mut acc = 0.0;
    for k in 2..=n {
        acc += (k as f64).ln();
    }
    acc
}

/// Wigner (small) d-matrix element d^l_{mp,m}(β).
pub fn wignersmalld(l: i32, mp: i32, m: i32, beta: f64) -> f64 {
    if mp.abs() > l || m.abs() > l {
        return 0.0;
    }
    let ch = (0.5 * beta).cos();
    let sh = (0.5 * beta).sin();
    let prefac = 0.5
        * (ln_fact(l + mp) + ln_fact(l - mp) + ln_fact(l + m) + ln_fact(l - m));
    let smin = (m - mp).max(0);
    let smax = (l + m).min(l - mp);
    let mut acc = 0.0;
    for s in smin..=smax {
        let lnden = ln_fact(l + m - s) + ln_fact(s) + ln_fact(mp - m + s) + ln_fact(l - mp - s);
        let sign = if (mp - m + s) % 2 == 0 { 1.0 } else { -1.0 };
        let pc = 2 * l + m - mp - 2 * s;
        let ps = mp - m + 2 * s;
        // powers may vanish at the endpoints, 0^0 = 1 is intended
        let mut term = sign * (prefac - lnden).exp();
        term *= ch.powi(pc);
        term *= sh.powi(ps);
        acc += term;
    }
    acc
}

/// Wigner D-matrix element for the rotation (α, β, γ).
pub fn wignerd(l: i32, mp: i32, m: i32, alpha: f64, beta: f64, gamma: f64) -> Complex64 {
    Complex64::new(0.0, -(mp as f64) * alpha - (m as f64) * gamma).exp()
        * wignersmalld(l, mp, m, beta)
}

/// Wigner 3j symbol for integer angular momenta.
pub fn wigner3j(j1: i32, j2: i32, j3: i32, m1: i32, m2: i32, m3: i32) -> f64 {
    if m1 + m2 + m3 != 0 {
        return 0.0;
    }
    if j3 < (j1 - j2).abs() || j3 > j1 + j2 {
        return 0.0;
    }
    if m1.abs() > j1 || m2.abs() > j2 || m3.abs() > j3 {
        return 0.0;
    }
    let lndelta = 0.5
        * (ln_fact(j1 + j2 - j3) + ln_fact(j1 - j2 + j3) + ln_fact(-j1 + j2 + j3)
            - ln_fact(j1 + j2 + j3 + 1));
    let lnnum = 0.5
        * (ln_fact(j1 + m1)
            + ln_fact(j1 - m1)
            + ln_fact(j2 + m2)
            + ln_fact(j2 - m2)
            + ln_fact(j3 + m3)
            + ln_fact(j3 - m3));
    let kmin = 0.max(j2 - j3 - m1).max(j1 - j3 + m2);
    let kmax = (j1 + j2 - j3).min(j1 - m1).min(j2 + m2);
    if kmin > kmax {
        return 0.0;
    }
    let mut acc = 0.0;
    for k in kmin..=kmax {
        let lnden = ln_fact(k)
            + ln_fact(j1 + j2 - j3 - k)
            + ln_fact(j1 - m1 - k)
            + ln_fact(j2 + m2 - k)
            + ln_fact(j3 - j2 + m1 + k)
            + ln_fact(j3 - j1 - m2 + k);
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        acc += sign * (lndelta + lnnum - lnden).exp();
    }
    let phase = if (j1 - j2 - m3).rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    };
    phase * acc
}

/// Gaunt coefficient, the integral of a product of three spherical
/// harmonics over the unit sphere.
pub fn gaunt(l1: i32, m1: i32, l2: i32, m2: i32, l3: i32, m3: i32) -> f64 {
    if m1 + m2 + m3 != 0 {
        return 0.0;
    }
    let w0 = wigner3j(l1, l2, l3, 0, 0, 0);
    if w0 == 0.0 {
        return 0.0;
    }
    let wm = wigner3j(l1, l2, l3, m1, m2, m3);
    (((2 * l1 + 1) * (2 * l2 + 1) * (2 * l3 + 1)) as f64 / (4.0 * PI)).sqrt() * w0 * wm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_smalld_degree_one() {
        let beta = 0.7;
        assert_relative_eq!(wignersmalld(1, 0, 0, beta), beta.cos(), epsilon = 1e-13);
        assert_relative_eq!(
            wignersmalld(1, 1, 0, beta),
            -beta.sin() / 2.0_f64.sqrt(),
            epsilon = 1e-13
        );
        assert_relative_eq!(
            wignersmalld(1, 1, 1, beta),
            0.5 * (1.0 + beta.cos()),
            epsilon = 1e-13
        );
        assert_relative_eq!(
            wignersmalld(1, -1, 1, beta),
            0.5 * (1.0 - beta.cos()),
            epsilon = 1e-13
        );
    }

    #[test]
    fn test_smalld_degree_two() {
        let beta: f64 = 1.2;
        let c = beta.cos();
        assert_relative_eq!(
            wignersmalld(2, 0, 0, beta),
            0.5 * (3.0 * c * c - 1.0),
            epsilon = 1e-13
        );
    }

    #[test]
    fn test_smalld_row_normalization() {
        let beta = 0.9;
        for l in [1, 3, 6] {
            for m in -l..=l {
                let mut acc = 0.0;
                for mp in -l..=l {
                    let d = wignersmalld(l, mp, m, beta);
                    acc += d * d;
                }
                assert_relative_eq!(acc, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_wignerd_identity_rotation() {
        let d = wignerd(3, 2, 2, 0.0, 0.0, 0.0);
        assert_relative_eq!(d.re, 1.0, epsilon = 1e-14);
        assert_relative_eq!(d.im, 0.0, epsilon = 1e-14);
        let off = wignerd(3, 2, 1, 0.0, 0.0, 0.0);
        assert_relative_eq!(off.re, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_wignerd_pure_azimuthal() {
        let (alpha, gamma) = (0.4, 1.1);
        let d = wignerd(2, -1, -1, alpha, 0.0, gamma);
        let want = Complex64::new(0.0, alpha + gamma).exp();
        assert_relative_eq!(d.re, want.re, epsilon = 1e-13);
        assert_relative_eq!(d.im, want.im, epsilon = 1e-13);
    }

    #[test]
    fn test_wigner3j_known_values() {
        assert_relative_eq!(
            wigner3j(1, 1, 0, 0, 0, 0),
            -1.0 / 3.0_f64.sqrt(),
            epsilon = 1e-13
        );
        assert_relative_eq!(
            wigner3j(1, 1, 2, 0, 0, 0),
            (2.0 / 15.0_f64).sqrt(),
            epsilon = 1e-13
        );
        assert_relative_eq!(
            wigner3j(1, 1, 2, 1, -1, 0),
            1.0 / 30.0_f64.sqrt(),
            epsilon = 1e-13
        );
        // odd sum of degrees vanishes at zero orders
        assert_eq!(wigner3j(1, 2, 2, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_wigner3j_orthogonality() {
        // Σ_{m1,m2} (2j3+1) (j1 j2 j3; m1 m2 m3)² = 1
        let (j1, j2, j3, m3) = (2, 3, 4, 1);
        let mut acc = 0.0;
        for m1 in -j1..=j1 {
            for m2 in -j2..=j2 {
                if m1 + m2 + m3 != 0 {
                    continue;
                }
                let w = wigner3j(j1, j2, j3, m1, m2, -m3);
                acc += (2 * j3 + 1) as f64 * w * w;
            }
        }
        assert_relative_eq!(acc, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gaunt_projection_on_monopole() {
        // ∫ Y_lm Y_{l,-m} Y_00 = (-1)^m / sqrt(4π)
        for &(l, m) in &[(1i32, 1i32), (2, -1), (4, 3)] {
            let want = if m % 2 == 0 { 1.0 } else { -1.0 } / (4.0 * PI).sqrt();
            assert_relative_eq!(gaunt(l, m, l, -m, 0, 0), want, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_gaunt_symmetry() {
        // invariant under exchanging the first two harmonics
        let a = gaunt(3, 2, 2, -1, 1, -1);
        let b = gaunt(2, -1, 3, 2, 1, -1);
        assert_relative_eq!(a, b, epsilon = 1e-13);
        assert_ne!(a, 0.0);
    }
}
