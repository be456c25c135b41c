//! Translation coefficients and basis changes.
//!
//! All coefficients express a wave of one basis in waves of another basis
//! or of the same basis at a shifted origin. The row index is the
//! expanding mode, the column index the expanded mode, so for modes
//! `out` and `in`
//! ```text
//! Ψ_in(x + d) = Σ_out  tl(out, in; d) Ψ_out(x)
//! ```
//! converges for |x| < |d| in the singular case and everywhere in the
//! regular case.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::bessel::{besselj, hankel1, spherical_bessel_j_c, spherical_hankel1_c};
use crate::legendre::{assoc_legendre_c, legendre_norm, sph_harm};
use crate::wigner::{gaunt, wignerd};

fn ipow(n: i32) -> Complex64 {
    match n.rem_euclid(4) {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

fn azimuthal_power(kx: Complex64, ky: Complex64, m: i32) -> Complex64 {
    let krho = (kx * kx + ky * ky).sqrt();
    if krho.norm() == 0.0 {
        return if m == 0 {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        };
    }
    ((kx - Complex64::i() * ky) / krho).powi(m)
}

/// Translation coefficient between scalar spherical waves.
///
/// `x` is the wave number times the translation distance and (θ, φ) the
/// direction of the translation vector. Singular coefficients use
/// outgoing radial functions and are valid inside the shifted sphere.
pub fn tl_ssw(
    lout: usize,
    mout: i32,
    lin: usize,
    min: i32,
    x: Complex64,
    theta: f64,
    phi: f64,
    singular: bool,
) -> Complex64 {
    if x.norm() == 0.0 {
        return if lout == lin && mout == min {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        };
    }
    let mu = min - mout;
    let lmax = lout + lin;
    let radial = if singular {
        spherical_hankel1_c(lmax + 1, x)
    } else {
        spherical_bessel_j_c(lmax + 1, x)
    };
    let lmin = (lout as i32 - lin as i32).unsigned_abs() as usize;
    let mut acc = Complex64::new(0.0, 0.0);
    let mut lam = lmin.max(mu.unsigned_abs() as usize);
    // the zero-order 3j symbol enforces an even total degree
    if (lout + lin + lam) % 2 == 1 {
        lam += 1;
    }
    while lam <= lmax {
        let g = gaunt(
            lin as i32,
            min,
            lout as i32,
            -mout,
            lam as i32,
            mout - min,
        );
        if g != 0.0 {
            let sign = if min % 2 == 0 { 1.0 } else { -1.0 };
            acc += 4.0
                * PI
                * sign
                * g
                * ipow(lout as i32 - lin as i32 + lam as i32)
                * radial[lam]
                * sph_harm(mu, lam, phi, theta);
        }
        lam += 2;
    }
    acc
}

/// Translation coefficient between scalar cylindrical waves.
///
/// The translation vector enters through its polar components
/// (x = k_ρ ρ_d, φ) and its axial component z. Modes of different kz do
/// not couple.
pub fn tl_scw(
    kzout: f64,
    mout: i32,
    kzin: f64,
    min: i32,
    xrho: Complex64,
    phi: f64,
    z: f64,
    singular: bool,
) -> Complex64 {
    if kzout != kzin {
        return Complex64::new(0.0, 0.0);
    }
    let mu = min - mout;
    let radial = if singular {
        hankel1(mu, xrho)
    } else {
        besselj(mu, xrho)
    };
    radial
        * Complex64::new(0.0, mu as f64 * phi).exp()
        * Complex64::new(0.0, kzin * z).exp()
}

/// Rotation coefficient between scalar spherical waves.
pub fn ssw_rotate(
    lout: usize,
    mout: i32,
    lin: usize,
    min: i32,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Complex64 {
    if lout != lin {
        return Complex64::new(0.0, 0.0);
    }
    wignerd(lin as i32, mout, min, alpha, beta, gamma)
}

/// Rotation coefficient between scalar cylindrical waves, a rotation
/// about the cylinder axis.
pub fn scw_rotate(kzout: f64, mout: i32, kzin: f64, min: i32, phi: f64) -> Complex64 {
    if kzout != kzin || mout != min {
        return Complex64::new(0.0, 0.0);
    }
    Complex64::new(0.0, -(min as f64) * phi).exp()
}

/// Expansion of a regular (or singular) scalar cylindrical wave in scalar
/// spherical waves of the same kind.
pub fn scw_to_ssw(l: usize, m: i32, kz: f64, mcw: i32, k: Complex64) -> Complex64 {
    if m != mcw {
        return Complex64::new(0.0, 0.0);
    }
    4.0 * PI
        * ipow(l as i32 - m)
        * legendre_norm(l, m)
        * assoc_legendre_c(l, m, kz / k)
}

/// Expansion of a scalar plane wave in regular scalar spherical waves.
pub fn spw_to_ssw(l: usize, m: i32, kx: Complex64, ky: Complex64, kz: Complex64) -> Complex64 {
    let k = (kx * kx + ky * ky + kz * kz).sqrt();
    4.0 * PI
        * ipow(l as i32)
        * legendre_norm(l, m)
        * assoc_legendre_c(l, m, kz / k)
        * azimuthal_power(kx, ky, m)
}

/// Expansion of a scalar plane wave in regular scalar cylindrical waves.
pub fn spw_to_scw(kzcw: f64, m: i32, kx: Complex64, ky: Complex64, kz: Complex64) -> Complex64 {
    if kz.im != 0.0 || kz.re != kzcw {
        return Complex64::new(0.0, 0.0);
    }
    ipow(m) * azimuthal_power(kx, ky, m)
}

/// Phase factor of a translated scalar plane wave.
pub fn spw_translate(kx: Complex64, ky: Complex64, kz: Complex64, r: [f64; 3]) -> Complex64 {
    (Complex64::i() * (kx * r[0] + ky * r[1] + kz * r[2])).exp()
}

/// Coefficient of a scalar plane wave under cyclic permutation of the
/// coordinate axes. The wave vector components are permuted in the basis
/// annotation, the expansion coefficient is unchanged.
pub fn spw_permute_xyz(
    kx: Complex64,
    ky: Complex64,
    kz: Complex64,
    qx: Complex64,
    qy: Complex64,
    qz: Complex64,
) -> Complex64 {
    if (kx - qz).norm() == 0.0 && (ky - qx).norm() == 0.0 && (kz - qy).norm() == 0.0 {
        Complex64::new(1.0, 0.0)
    } else {
        Complex64::new(0.0, 0.0)
    }
}

/// Expansion of a z-periodic array of singular scalar spherical waves in
/// outgoing scalar cylindrical waves. `a` is the lattice pitch.
pub fn ssw_periodic_to_scw(l: usize, m: i32, kz: f64, mcw: i32, k: Complex64, a: f64) -> Complex64 {
    if m != mcw {
        return Complex64::new(0.0, 0.0);
    }
    PI / (k * a)
        * ipow(m - l as i32)
        * legendre_norm(l, m)
        * assoc_legendre_c(l, m, kz / k)
}

/// Expansion of an in-plane periodic array of singular scalar spherical
/// waves in scalar plane waves. `area` is the unit cell area and the sign
/// of `kz` selects the propagation half space. Grazing orders with
/// vanishing `kz` carry no power and map to zero.
pub fn ssw_periodic_to_spw(
    kx: Complex64,
    ky: Complex64,
    kz: Complex64,
    l: usize,
    m: i32,
    area: f64,
) -> Complex64 {
    if kz.norm() == 0.0 {
        return Complex64::new(0.0, 0.0);
    }
    let k = (kx * kx + ky * ky + kz * kz).sqrt();
    2.0 * PI
        * ipow(-(l as i32))
        * legendre_norm(l, m)
        * assoc_legendre_c(l, m, kz / k)
        * azimuthal_power(kx, -ky, m)
        / (k * (kz * kz).sqrt() * area)
}

/// Expansion of an x-periodic array of singular scalar cylindrical waves
/// in scalar plane waves. `a` is the lattice pitch; at grazing diffraction
/// orders the coefficient diverges and a large sentinel value is
/// returned.
pub fn scw_periodic_to_spw(
    kx: Complex64,
    ky: Complex64,
    kz: Complex64,
    kzcw: f64,
    m: i32,
    a: f64,
) -> Complex64 {
    if kz.im != 0.0 || kz.re != kzcw {
        return Complex64::new(0.0, 0.0);
    }
    if ky.norm() == 0.0 {
        return Complex64::new(5e19, 5e19);
    }
    let krho = (kx * kx + ky * ky).sqrt();
    2.0 / (a * (ky * ky).sqrt()) * ((ky - Complex64::i() * kx) / krho).powi(m)
}
