//! Scattering coefficients of highly symmetric objects.
//!
//! Spheres and infinitely long circular cylinders scatter each incident
//! mode into the same mode, so their transition matrices are diagonal
//! with the coefficients computed here. The scatterer may be a fluid or
//! an isotropic elastic solid, the embedding must be a fluid.
//!
//! The coefficients follow from the boundary conditions at the
//! interface: continuity of radial displacement, the radial normal
//! stress balancing the negative pressure, and vanishing shear
//! traction on a solid surface.

use ndarray::{arr1, arr2};
use num_complex::Complex64;

use acousto_solvers::lu_solve;
use acousto_special::{besselj, hankel1, spherical_bessel_j_c, spherical_hankel1_c};

use crate::error::{AcousticsError, Result};
use crate::material::{AcousticMaterial, C_REF};
use crate::util::sqrt_up;

fn check_pair(inner: &AcousticMaterial, outer: &AcousticMaterial) -> Result<()> {
    if !outer.is_fluid() {
        return Err(AcousticsError::InvalidMaterial(
            "embedding material must be a fluid".into(),
        ));
    }
    let zero = Complex64::new(0.0, 0.0);
    if inner.c == zero || outer.c == zero {
        return Err(AcousticsError::InvalidMaterial(
            "vanishing longitudinal sound speed".into(),
        ));
    }
    Ok(())
}

/// Spherical Bessel function with argument and argument derivative.
fn sph_j(l: usize, z: Complex64) -> (Complex64, Complex64) {
    let v = spherical_bessel_j_c(l + 1, z);
    let d = if l == 0 {
        -v[1]
    } else {
        v[l - 1] - (l as f64 + 1.0) / z * v[l]
    };
    (v[l], d)
}

fn sph_h(l: usize, z: Complex64) -> (Complex64, Complex64) {
    let v = spherical_hankel1_c(l + 1, z);
    let d = if l == 0 {
        -v[1]
    } else {
        v[l - 1] - (l as f64 + 1.0) / z * v[l]
    };
    (v[l], d)
}

/// Second argument derivative from the spherical Bessel equation.
fn sph_jdd(l: usize, z: Complex64) -> Complex64 {
    let (f, fp) = sph_j(l, z);
    -2.0 / z * fp - (1.0 - (l * (l + 1)) as f64 / (z * z)) * f
}

/// Mie coefficient of a sphere.
///
/// The size parameter is `x = k0 * radius`. The coefficient relates the
/// scattered singular wave of degree `l` to a regular incident wave of
/// the same degree and is independent of the azimuthal order.
pub fn mie_acoustics(
    l: usize,
    x: f64,
    inner: &AcousticMaterial,
    outer: &AcousticMaterial,
) -> Result<Complex64> {
    check_pair(inner, outer)?;
    // normalized to unit radius, the coefficient only depends on x
    let omega = C_REF * x;
    let k = omega / outer.c;
    let kl = omega / inner.c;
    let (j, jp) = sph_j(l, k);
    let (h, hp) = sph_h(l, k);
    let f = sph_j(l, kl);
    let (ff, fp) = (f.0, kl * f.1);

    if inner.is_fluid() {
        // pressure and radial displacement continuity
        let m00 = h;
        let m01 = -ff;
        let m10 = k * hp / outer.rho;
        let m11 = -fp / inner.rho;
        let det = m00 * m11 - m01 * m10;
        return Ok(((-j) * m11 - m01 * (-k * jp / outer.rho)) / det);
    }

    let kt = omega / inner.ct;
    let mu = inner.rho * inner.ct * inner.ct;
    let lam = inner.rho * inner.c * inner.c - 2.0 * mu;
    let fpp = kl * kl * sph_jdd(l, kl);
    let g = sph_j(l, kt);
    let (gg, gp) = (g.0, kt * g.1);
    let gpp = kt * kt * sph_jdd(l, kt);
    let ll1 = (l * (l + 1)) as f64;
    let rho_w2 = outer.rho * omega * omega;

    let srr_a = -lam * kl * kl * ff + 2.0 * mu * fpp;
    if l == 0 {
        // the monopole carries no shear
        let m00 = k * hp / rho_w2;
        let m01 = -fp;
        let m10 = h;
        let m11 = srr_a;
        let det = m00 * m11 - m01 * m10;
        return Ok(((-k * jp / rho_w2) * m11 - m01 * (-j)) / det);
    }

    let srr_b = 2.0 * mu * ll1 * (gp - gg);
    let srt_a = 2.0 * mu * (fp - ff);
    let srt_b = mu * (gpp + (ll1 - 2.0) * gg);
    let zero = Complex64::new(0.0, 0.0);
    let m = arr2(&[
        [k * hp / rho_w2, -fp, -ll1 * gg],
        [h, srr_a, srr_b],
        [zero, srt_a, srt_b],
    ]);
    let rhs = arr1(&[-k * jp / rho_w2, -j, zero]);
    let sol = lu_solve(&m, &rhs)?;
    Ok(sol[0])
}

fn cyl_jd(m: i32, z: Complex64) -> Complex64 {
    (besselj(m - 1, z) - besselj(m + 1, z)) / 2.0
}

fn cyl_hd(m: i32, z: Complex64) -> Complex64 {
    (hankel1(m - 1, z) - hankel1(m + 1, z)) / 2.0
}

/// Mie coefficient of an infinite cylinder.
///
/// The cylinder axis is the z axis, the incident cylindrical wave has
/// axial wave number `kz` and azimuthal order `m`. For an elastic
/// cylinder the interior couples compressional and both shear
/// polarizations, which are eliminated through the boundary conditions
/// on the mantle.
pub fn mie_acoustics_cyl(
    kz: f64,
    m: i32,
    k0: f64,
    radius: f64,
    inner: &AcousticMaterial,
    outer: &AcousticMaterial,
) -> Result<Complex64> {
    check_pair(inner, outer)?;
    let a = radius;
    let omega = C_REF * k0;
    let k = omega / outer.c;
    let kl = omega / inner.c;
    let kap = sqrt_up(k * k - Complex64::new(kz * kz, 0.0));
    let kapl = sqrt_up(kl * kl - Complex64::new(kz * kz, 0.0));
    let h = hankel1(m, kap * a);
    let dh = kap * cyl_hd(m, kap * a);
    let j = besselj(m, kap * a);
    let dj = kap * cyl_jd(m, kap * a);
    let ff = besselj(m, kapl * a);
    let df = kapl * cyl_jd(m, kapl * a);

    if inner.is_fluid() {
        let m00 = h;
        let m01 = -ff;
        let m10 = dh / outer.rho;
        let m11 = -df / inner.rho;
        let det = m00 * m11 - m01 * m10;
        return Ok(((-j) * m11 - m01 * (-dj / outer.rho)) / det);
    }

    let kt = omega / inner.ct;
    let kapt = sqrt_up(kt * kt - Complex64::new(kz * kz, 0.0));
    let mu = inner.rho * inner.ct * inner.ct;
    let lam = inner.rho * inner.c * inner.c - 2.0 * mu;
    let i = Complex64::i();
    let mf = m as f64;
    let ddf = -df / a - (kapl * kapl - Complex64::new(mf * mf / (a * a), 0.0)) * ff;
    let gg = besselj(m, kapt * a);
    let dg = kapt * cyl_jd(m, kapt * a);
    let ddg = -dg / a - (kapt * kapt - Complex64::new(mf * mf / (a * a), 0.0)) * gg;
    let rho_w2 = outer.rho * omega * omega;
    let zero = Complex64::new(0.0, 0.0);

    // unknowns: scattered fluid wave and the compressional and two shear
    // potentials of the interior
    let mat = arr2(&[
        [dh / rho_w2, -df, -i * mf * gg / a, -i * kz * dg],
        [
            h,
            -lam * kl * kl * ff + 2.0 * mu * ddf,
            2.0 * mu * i * mf * (dg / a - gg / (a * a)),
            2.0 * mu * i * kz * ddg,
        ],
        [
            zero,
            2.0 * mu * i * mf * (df / a - ff / (a * a)),
            mu * (-ddg + dg / a - mf * mf * gg / (a * a)),
            2.0 * mu * i * kz * i * mf * (dg / a - gg / (a * a)),
        ],
        [
            zero,
            2.0 * mu * i * kz * df,
            -mu * kz * mf * gg / a,
            mu * (kapt * kapt - Complex64::new(kz * kz, 0.0)) * dg,
        ],
    ]);
    let rhs = arr1(&[-dj / rho_w2, -j, zero, zero]);
    let sol = lu_solve(&mat, &rhs)?;
    Ok(sol[0])
}
