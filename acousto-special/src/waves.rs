//! Scalar wave functions of the three bases.
//!
//! The pressure fields are
//! ```text
//! ssw:  Ψ_lm(x, θ, φ)  = z_l(x) Y_lm(θ, φ)                x = k r
//! scw:  Ψ_kz,m(x, φ, z) = Z_m(x) e^{i m φ} e^{i kz z}      x = k_ρ ρ
//! spw:  Ψ_k(r)          = e^{i k·r}
//! ```
//! with z_l and Z_m either regular (j_l, J_m) or singular (h_l^(1),
//! H_m^(1)) radial functions. The corresponding velocity fields are the
//! scaled gradients L = ∇Ψ/k, returned in the local orthonormal basis of
//! each coordinate system.

use num_complex::Complex64;

use crate::bessel::{
    besselj, besselj_d, hankel1, hankel1_d, spherical_bessel_j_c, spherical_hankel1_c,
};
use crate::legendre::{legendre_norm, lpmv};

fn azimuthal(m: i32, phi: f64) -> Complex64 {
    Complex64::new(0.0, m as f64 * phi).exp()
}

/// Singular scalar spherical wave h_l^(1)(x) Y_lm(θ, φ).
pub fn ssw_psi(l: usize, m: i32, x: Complex64, theta: f64, phi: f64) -> Complex64 {
    let h = spherical_hankel1_c(l + 1, x);
    h[l] * legendre_norm(l, m) * lpmv(m, l, theta.cos()) * azimuthal(m, phi)
}

/// Regular scalar spherical wave j_l(x) Y_lm(θ, φ).
pub fn ssw_rpsi(l: usize, m: i32, x: Complex64, theta: f64, phi: f64) -> Complex64 {
    let j = spherical_bessel_j_c(l + 1, x);
    j[l] * legendre_norm(l, m) * lpmv(m, l, theta.cos()) * azimuthal(m, phi)
}

/// Singular scalar cylindrical wave H_m^(1)(x) e^{i m φ} e^{i kz z}.
pub fn scw_psi(kz: f64, m: i32, xrho: Complex64, phi: f64, z: f64) -> Complex64 {
    hankel1(m, xrho) * azimuthal(m, phi) * Complex64::new(0.0, kz * z).exp()
}

/// Regular scalar cylindrical wave J_m(x) e^{i m φ} e^{i kz z}.
pub fn scw_rpsi(kz: f64, m: i32, xrho: Complex64, phi: f64, z: f64) -> Complex64 {
    besselj(m, xrho) * azimuthal(m, phi) * Complex64::new(0.0, kz * z).exp()
}

/// Scalar plane wave e^{i k·r}.
pub fn spw_psi(kx: Complex64, ky: Complex64, kz: Complex64, x: f64, y: f64, z: f64) -> Complex64 {
    (Complex64::i() * (kx * x + ky * y + kz * z)).exp()
}

// angular derivative functions; the poles are approached by a nudge
fn pi_tau(l: usize, m: i32, theta: f64) -> (f64, f64) {
    let mut th = theta;
    if th.sin().abs() < 1e-10 {
        th = if th.cos() > 0.0 { 1e-10 } else { std::f64::consts::PI - 1e-10 };
    }
    let (s, c) = th.sin_cos();
    let p = lpmv(m, l, c);
    let pm1 = if l == 0 { 0.0 } else { lpmv(m, l - 1, c) };
    let pi = m as f64 * p / s;
    let tau = (l as f64 * c * p - (l as f64 + m as f64) * pm1) / s;
    (pi, tau)
}

fn vsw(
    l: usize,
    m: i32,
    x: Complex64,
    theta: f64,
    phi: f64,
    radial: &[Complex64],
) -> [Complex64; 3] {
    let norm = legendre_norm(l, m);
    let (pi, tau) = pi_tau(l, m, theta);
    let e = azimuthal(m, phi);
    let zl = radial[l];
    let dzl = if l == 0 {
        -radial[1]
    } else {
        radial[l - 1] - (l + 1) as f64 / x * radial[l]
    };
    let angular = norm * lpmv(m, l, theta.cos());
    [
        dzl * angular * e,
        zl / x * norm * tau * e,
        zl / x * norm * pi * e * Complex64::i(),
    ]
}

/// Singular longitudinal vector spherical wave ∇(h_l^(1)(kr) Y_lm)/k in
/// spherical components.
pub fn vsw_l(l: usize, m: i32, x: Complex64, theta: f64, phi: f64) -> [Complex64; 3] {
    let h = spherical_hankel1_c(l + 2, x);
    vsw(l, m, x, theta, phi, &h)
}

/// Regular longitudinal vector spherical wave ∇(j_l(kr) Y_lm)/k in
/// spherical components.
pub fn vsw_rl(l: usize, m: i32, x: Complex64, theta: f64, phi: f64) -> [Complex64; 3] {
    let j = spherical_bessel_j_c(l + 2, x);
    vsw(l, m, x, theta, phi, &j)
}

fn vcw(
    kz: f64,
    m: i32,
    xrho: Complex64,
    phi: f64,
    z: f64,
    krho: Complex64,
    k: Complex64,
    zm: Complex64,
    dzm: Complex64,
) -> [Complex64; 3] {
    let e = azimuthal(m, phi) * Complex64::new(0.0, kz * z).exp();
    [
        krho / k * dzm * e,
        Complex64::i() * m as f64 * krho / (k * xrho) * zm * e,
        Complex64::new(0.0, kz) / k * zm * e,
    ]
}

/// Singular longitudinal vector cylindrical wave in cylindrical
/// components.
pub fn vcw_l(
    kz: f64,
    m: i32,
    xrho: Complex64,
    phi: f64,
    z: f64,
    krho: Complex64,
    k: Complex64,
) -> [Complex64; 3] {
    vcw(kz, m, xrho, phi, z, krho, k, hankel1(m, xrho), hankel1_d(m, xrho))
}

/// Regular longitudinal vector cylindrical wave in cylindrical components.
pub fn vcw_rl(
    kz: f64,
    m: i32,
    xrho: Complex64,
    phi: f64,
    z: f64,
    krho: Complex64,
    k: Complex64,
) -> [Complex64; 3] {
    vcw(kz, m, xrho, phi, z, krho, k, besselj(m, xrho), besselj_d(m, xrho))
}

/// Longitudinal vector plane wave k̂ e^{i k·r} in Cartesian components.
pub fn vpw_l(
    kx: Complex64,
    ky: Complex64,
    kz: Complex64,
    x: f64,
    y: f64,
    z: f64,
) -> [Complex64; 3] {
    let k = (kx * kx + ky * ky + kz * kz).sqrt();
    let e = spw_psi(kx, ky, kz, x, y, z);
    [kx / k * e, ky / k * e, kz / k * e]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{car2cyl, car2sph, vcyl2car, vsph2car};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const K: f64 = 1.3;

    #[test]
    fn test_ssw_monopole() {
        // h_0(x) Y_00 = -i e^{ix}/x / sqrt(4π)
        let x = Complex64::new(2.0, 0.0);
        let got = ssw_psi(0, 0, x, 0.7, 0.3);
        let want = -Complex64::i() * (Complex64::i() * x).exp() / x / (4.0 * PI).sqrt();
        assert_relative_eq!(got.re, want.re, epsilon = 1e-12);
        assert_relative_eq!(got.im, want.im, epsilon = 1e-12);
    }

    #[test]
    fn test_plane_wave_expansion_in_regular_ssw() {
        // e^{i k·r} = Σ_lm 4π i^l j_l(kr) Y_lm(r̂) conj(Y_lm(k̂))
        use crate::legendre::sph_harm;
        let kvec = [0.4, -0.6, 1.1];
        let r = [0.8, 0.5, -0.3];
        let ks = car2sph(kvec);
        let rs = car2sph(r);
        let mut acc = Complex64::new(0.0, 0.0);
        for l in 0..=14usize {
            let il = Complex64::i().powi(l as i32);
            for m in -(l as i32)..=(l as i32) {
                acc += 4.0
                    * PI
                    * il
                    * ssw_rpsi(l, m, Complex64::new(ks[0] * rs[0], 0.0), rs[1], rs[2])
                    * sph_harm(m, l, ks[2], ks[1]).conj();
            }
        }
        let want = spw_psi(
            Complex64::new(kvec[0], 0.0),
            Complex64::new(kvec[1], 0.0),
            Complex64::new(kvec[2], 0.0),
            r[0],
            r[1],
            r[2],
        );
        assert_relative_eq!(acc.re, want.re, epsilon = 1e-9);
        assert_relative_eq!(acc.im, want.im, epsilon = 1e-9);
    }

    fn ssw_at(l: usize, m: i32, p: [f64; 3], regular: bool) -> Complex64 {
        let s = car2sph(p);
        let x = Complex64::new(K * s[0], 0.0);
        if regular {
            ssw_rpsi(l, m, x, s[1], s[2])
        } else {
            ssw_psi(l, m, x, s[1], s[2])
        }
    }

    #[test]
    fn test_vsw_is_scaled_gradient() {
        let p = [0.9, -0.4, 0.7];
        for &(l, m, regular) in &[(0usize, 0i32, true), (2, 1, false), (3, -2, true)] {
            let s = car2sph(p);
            let x = Complex64::new(K * s[0], 0.0);
            let v = if regular {
                vsw_rl(l, m, x, s[1], s[2])
            } else {
                vsw_l(l, m, x, s[1], s[2])
            };
            let vcar = vsph2car(v, s);
            let h = 1e-6;
            for axis in 0..3 {
                let mut pp = p;
                let mut pm = p;
                pp[axis] += h;
                pm[axis] -= h;
                let grad =
                    (ssw_at(l, m, pp, regular) - ssw_at(l, m, pm, regular)) / (2.0 * h * K);
                assert_relative_eq!(vcar[axis].re, grad.re, max_relative = 1e-5, epsilon = 1e-8);
                assert_relative_eq!(vcar[axis].im, grad.im, max_relative = 1e-5, epsilon = 1e-8);
            }
        }
    }

    fn scw_at(kz: f64, m: i32, krho: f64, p: [f64; 3], regular: bool) -> Complex64 {
        let c = car2cyl(p);
        let x = Complex64::new(krho * c[0], 0.0);
        if regular {
            scw_rpsi(kz, m, x, c[1], c[2])
        } else {
            scw_psi(kz, m, x, c[1], c[2])
        }
    }

    #[test]
    fn test_vcw_is_scaled_gradient() {
        let p = [0.8, 0.55, -0.2];
        let kz = 0.5;
        let krho = (K * K - kz * kz).sqrt();
        for &(m, regular) in &[(0i32, true), (1, false), (-2, true)] {
            let c = car2cyl(p);
            let x = Complex64::new(krho * c[0], 0.0);
            let v = if regular {
                vcw_rl(kz, m, x, c[1], c[2], Complex64::new(krho, 0.0), Complex64::new(K, 0.0))
            } else {
                vcw_l(kz, m, x, c[1], c[2], Complex64::new(krho, 0.0), Complex64::new(K, 0.0))
            };
            let vcar = vcyl2car(v, c);
            let h = 1e-6;
            for axis in 0..3 {
                let mut pp = p;
                let mut pm = p;
                pp[axis] += h;
                pm[axis] -= h;
                let grad = (scw_at(kz, m, krho, pp, regular)
                    - scw_at(kz, m, krho, pm, regular))
                    / (2.0 * h * K);
                assert_relative_eq!(vcar[axis].re, grad.re, max_relative = 1e-5, epsilon = 1e-8);
                assert_relative_eq!(vcar[axis].im, grad.im, max_relative = 1e-5, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_vpw_direction() {
        let (kx, ky, kz) = (
            Complex64::new(0.3, 0.0),
            Complex64::new(-1.1, 0.0),
            Complex64::new(0.6, 0.0),
        );
        let v = vpw_l(kx, ky, kz, 0.2, 0.4, -0.5);
        let k = (0.3f64.powi(2) + 1.1f64.powi(2) + 0.6f64.powi(2)).sqrt();
        let e = spw_psi(kx, ky, kz, 0.2, 0.4, -0.5);
        let want = [kx / k * e, ky / k * e, kz / k * e];
        for i in 0..3 {
            assert_relative_eq!(v[i].re, want[i].re, epsilon = 1e-13);
            assert_relative_eq!(v[i].im, want[i].im, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_scw_composition() {
        let (kz, m) = (0.4, 2);
        let x = Complex64::new(1.7, 0.0);
        let got = scw_psi(kz, m, x, 0.9, 1.5);
        let want = hankel1(m, x)
            * Complex64::new(0.0, m as f64 * 0.9).exp()
            * Complex64::new(0.0, kz * 1.5).exp();
        assert_relative_eq!(got.re, want.re, epsilon = 1e-12);
        assert_relative_eq!(got.im, want.im, epsilon = 1e-12);
    }
}
