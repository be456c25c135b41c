//! Exponentially convergent lattice sums of scalar waves.
//!
//! The sums accumulate a singular wave over all vectors `R` of a one-,
//! two- or three-dimensional lattice, weighted by a Bloch phase,
//! ```text
//! D_λμ(k, β; s) = Σ_R  h_λ(k|s+R|) Y_λμ(θ_{s+R}, φ_{s+R}) e^{iβ·R}
//! D_μ(k, β; s)  = Σ_R  H_μ(k ρ_{s+R}) e^{iμφ_{s+R}} e^{iβ·R}
//! ```
//! where lattice points with `s + R = 0` are omitted. Spherical sums put
//! a one-dimensional lattice on the z axis and a two-dimensional lattice
//! into the x-y plane; cylindrical sums put a one-dimensional lattice on
//! the x axis and a two-dimensional lattice into the x-y plane.
//!
//! Direct summation converges only in absorbing media. Here each sum is
//! split at a Gaussian separation parameter `eta` into a sum over lattice
//! vectors and a sum over diffraction orders `q = β + G`, both falling
//! off like Gaussians. The integrals appearing in both halves are the
//! families of [`crate::gamma`], continued below the branch cut so that
//! propagating and evanescent orders come out on the limit of a slightly
//! absorbing medium. Passing `eta <= 0` selects a balanced default
//! derived from the cell dimensions. At a Wood anomaly, where some
//! diffraction order fulfils `q² = k²` exactly, the sums diverge and the
//! returned values are non-finite.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::coord::car2sph;
use crate::gamma::{
    ewald_integral, ewald_integral_range, incgamma, kambe_integral, kambe_integral_range,
};
use crate::legendre::{legendre_norm, sph_harm};

const SPI: f64 = 1.772_453_850_905_516;
const TOL: f64 = 1e-14;
const MAX_SHELLS: i32 = 40;
const ORIGIN_EPS: f64 = 1e-20;

fn fact(n: i32) -> f64 {
    (1..=n).map(f64::from).product()
}

fn binom(n: i32, k: i32) -> f64 {
    fact(n) / (fact(k) * fact(n - k))
}

/// Monomial expansion of the solid harmonic,
/// `r^λ Y_λμ = Σ c_{pqr} x^p y^q z^r`.
fn solid_monomials(l: usize, m: i32) -> Vec<(i32, i32, i32, Complex64)> {
    let lam = l as i32;
    let amu = m.abs();
    let sign = if m >= 0 && m % 2 != 0 { -1.0 } else { 1.0 };
    let pref = sign * legendre_norm(l, amu);
    let wsign = if m >= 0 {
        Complex64::new(0.0, 1.0)
    } else {
        Complex64::new(0.0, -1.0)
    };
    let mut terms = Vec::new();
    for j in 0..=(lam - amu) / 2 {
        let zpow = lam - amu - 2 * j;
        let ej = 0.5f64.powi(lam)
            * if j % 2 == 0 { 1.0 } else { -1.0 }
            * binom(lam, j)
            * binom(2 * lam - 2 * j, lam)
            * fact(lam - 2 * j)
            / fact(lam - 2 * j - amu);
        for w in 0..=amu {
            let cw = binom(amu, w) * wsign.powi(amu - w);
            for jx in 0..=j {
                for jy in 0..=(j - jx) {
                    let jz = j - jx - jy;
                    let ct = fact(j) / (fact(jx) * fact(jy) * fact(jz));
                    terms.push((
                        w + 2 * jx,
                        amu - w + 2 * jy,
                        zpow + 2 * jz,
                        pref * ej * ct * cw,
                    ));
                }
            }
        }
    }
    terms
}

/// Coefficients of the physicists' Hermite polynomials H_0 .. H_n.
fn hermite_table(n: i32) -> Vec<Vec<f64>> {
    let mut table = vec![vec![1.0], vec![0.0, 2.0]];
    while table.len() <= n as usize {
        let k = table.len() - 1;
        let prev = &table[k];
        let prev2 = &table[k - 1];
        let mut next = vec![0.0; k + 2];
        for (i, &c) in prev.iter().enumerate() {
            next[i + 1] += 2.0 * c;
        }
        for (i, &c) in prev2.iter().enumerate() {
            next[i] -= 2.0 * k as f64 * c;
        }
        table.push(next);
    }
    table.truncate(n as usize + 1);
    table
}

fn settled(shell: Complex64, acc: Complex64, quiet: &mut u32) -> bool {
    if shell.norm() <= TOL * (1.0 + acc.norm()) {
        *quiet += 1;
    } else {
        *quiet = 0;
    }
    *quiet >= 2
}

fn shell_2d(n: i32) -> Vec<[i32; 2]> {
    if n == 0 {
        return vec![[0, 0]];
    }
    let mut pts = Vec::with_capacity(8 * n as usize);
    for i in -n..=n {
        pts.push([i, n]);
        pts.push([i, -n]);
    }
    for j in (-n + 1)..n {
        pts.push([n, j]);
        pts.push([-n, j]);
    }
    pts
}

fn shell_3d(n: i32) -> Vec<[i32; 3]> {
    if n == 0 {
        return vec![[0, 0, 0]];
    }
    let mut pts = Vec::new();
    for i in -n..=n {
        for j in -n..=n {
            pts.push([i, j, n]);
            pts.push([i, j, -n]);
        }
    }
    for i in -n..=n {
        for h in (-n + 1)..n {
            pts.push([i, n, h]);
            pts.push([i, -n, h]);
        }
    }
    for j in (-n + 1)..n {
        for h in (-n + 1)..n {
            pts.push([n, j, h]);
            pts.push([-n, j, h]);
        }
    }
    pts
}

/// One real-space summand at `v = s + R`: solid harmonic times tail
/// integral, without the common prefactor.
fn sw_real_term(l: usize, m: i32, k: Complex64, eta: f64, v: [f64; 3]) -> Complex64 {
    let r2 = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
    let sph = car2sph(v);
    sph[0].powi(l as i32)
        * sph_harm(m, l, sph[2], sph[1])
        * ewald_integral(l as i32, Complex64::new(r2, 0.0), k * k / 4.0, eta)
}

fn sw_origin_term(l: usize, m: i32, k: Complex64, eta: f64) -> Complex64 {
    if l != 0 || m != 0 {
        return Complex64::new(0.0, 0.0);
    }
    -2.0 / (Complex64::i() * k * SPI) / (4.0 * PI).sqrt()
        * ewald_integral(-1, -k * k / 4.0, Complex64::new(0.0, 0.0), 1.0 / eta)
}

/// Sum of singular scalar spherical waves over a one-dimensional lattice
/// along z with pitch `a` and Bloch factor `exp(i kpar R_z)`, evaluated
/// at the shift `r` off the lattice line.
pub fn lsum_sw_1d(
    l: usize,
    m: i32,
    k: Complex64,
    kpar: f64,
    a: f64,
    r: [f64; 3],
    eta: f64,
) -> Complex64 {
    let eta = if eta > 0.0 { eta } else { SPI / a };
    let lam = l as i32;
    let pref = 2.0 / (Complex64::i() * k * SPI) * (2.0 / k).powi(lam);
    let mut acc = Complex64::new(0.0, 0.0);
    let mut excluded = false;
    let mut quiet = 0;
    for n in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        let signs: &[i32] = if n == 0 { &[1] } else { &[1, -1] };
        for &sgn in signs {
            let step = (n * sgn) as f64 * a;
            let v = [r[0], r[1], r[2] + step];
            if v[0] * v[0] + v[1] * v[1] + v[2] * v[2] <= ORIGIN_EPS {
                excluded = true;
                continue;
            }
            shell += Complex64::new(0.0, kpar * step).exp() * sw_real_term(l, m, k, eta, v);
        }
        acc += shell;
        if n >= 1 && settled(shell, acc, &mut quiet) {
            break;
        }
    }
    acc *= pref;

    let monos = solid_monomials(l, m);
    let herm = hermite_table(lam);
    let gpref = pref * (-0.5f64).powi(lam) * SPI / a;
    let b = Complex64::new(-(r[0] * r[0] + r[1] * r[1]), 0.0);
    let mut rec = Complex64::new(0.0, 0.0);
    quiet = 0;
    for g in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        let signs: &[i32] = if g == 0 { &[1] } else { &[1, -1] };
        for &sgn in signs {
            let qz = kpar + 2.0 * PI * (g * sgn) as f64 / a;
            let afam = (Complex64::new(qz * qz, 0.0) - k * k) / 4.0;
            let kint = kambe_integral_range(-lam - 1, -1, afam, b, 1.0 / eta);
            let mut gterm = Complex64::new(0.0, 0.0);
            for &(px, py, pz, c) in &monos {
                let zfac = Complex64::new(0.0, -qz).powi(pz);
                for (ix, &cx) in herm[px as usize].iter().enumerate() {
                    if cx == 0.0 {
                        continue;
                    }
                    for (iy, &cy) in herm[py as usize].iter().enumerate() {
                        if cy == 0.0 {
                            continue;
                        }
                        let par = if (px + py) % 2 == 0 { 1.0 } else { -1.0 };
                        let cc = c
                            * zfac
                            * (par * cx * cy * r[0].powi(ix as i32) * r[1].powi(iy as i32));
                        // t-power after the variable inversion, always odd
                        let p = px + py + ix as i32 + iy as i32 - 1;
                        gterm += cc * kint[((-p - 3) / 2 + lam + 1) as usize];
                    }
                }
            }
            shell += gterm * Complex64::new(0.0, -qz * r[2]).exp();
        }
        rec += shell;
        if g >= 1 && settled(shell, rec, &mut quiet) {
            break;
        }
    }
    acc += gpref * rec;
    if excluded {
        acc += sw_origin_term(l, m, k, eta);
    }
    acc
}

/// Sum of singular scalar spherical waves over a two-dimensional lattice
/// in the x-y plane. `a` holds the two lattice vectors as rows, `kpar`
/// the in-plane Bloch vector and `r` the shift out of the lattice plane.
pub fn lsum_sw_2d(
    l: usize,
    m: i32,
    k: Complex64,
    kpar: [f64; 2],
    a: [[f64; 2]; 2],
    r: [f64; 3],
    eta: f64,
) -> Complex64 {
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    let area = det.abs();
    let eta = if eta > 0.0 { eta } else { SPI / area.sqrt() };
    let b1 = [2.0 * PI * a[1][1] / det, -2.0 * PI * a[1][0] / det];
    let b2 = [-2.0 * PI * a[0][1] / det, 2.0 * PI * a[0][0] / det];
    let lam = l as i32;
    let pref = 2.0 / (Complex64::i() * k * SPI) * (2.0 / k).powi(lam);
    let mut acc = Complex64::new(0.0, 0.0);
    let mut excluded = false;
    let mut quiet = 0;
    for n in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        for [n1, n2] in shell_2d(n) {
            let rx = n1 as f64 * a[0][0] + n2 as f64 * a[1][0];
            let ry = n1 as f64 * a[0][1] + n2 as f64 * a[1][1];
            let v = [r[0] + rx, r[1] + ry, r[2]];
            if v[0] * v[0] + v[1] * v[1] + v[2] * v[2] <= ORIGIN_EPS {
                excluded = true;
                continue;
            }
            shell += Complex64::new(0.0, kpar[0] * rx + kpar[1] * ry).exp()
                * sw_real_term(l, m, k, eta, v);
        }
        acc += shell;
        if n >= 1 && settled(shell, acc, &mut quiet) {
            break;
        }
    }
    acc *= pref;

    let monos = solid_monomials(l, m);
    let herm = hermite_table(lam);
    let gpref = pref * (-0.5f64).powi(lam) * PI / area;
    let b = Complex64::new(-r[2] * r[2], 0.0);
    let mut rec = Complex64::new(0.0, 0.0);
    quiet = 0;
    for g in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        for [g1, g2] in shell_2d(g) {
            let qx = kpar[0] + g1 as f64 * b1[0] + g2 as f64 * b2[0];
            let qy = kpar[1] + g1 as f64 * b1[1] + g2 as f64 * b2[1];
            let afam = (Complex64::new(qx * qx + qy * qy, 0.0) - k * k) / 4.0;
            let eint = ewald_integral_range(-lam, 0, afam, b, 1.0 / eta);
            let mut gterm = Complex64::new(0.0, 0.0);
            for &(px, py, pz, c) in &monos {
                let xyfac = Complex64::new(0.0, -qx).powi(px) * Complex64::new(0.0, -qy).powi(py);
                for (iz, &cz) in herm[pz as usize].iter().enumerate() {
                    if cz == 0.0 {
                        continue;
                    }
                    let par = if pz % 2 == 0 { 1.0 } else { -1.0 };
                    let cc = c * xyfac * (par * cz * r[2].powi(iz as i32));
                    // t-power after the variable inversion, always even
                    let p = pz + iz as i32 - 2;
                    gterm += cc * eint[((-p - 2) / 2 + lam) as usize];
                }
            }
            shell += gterm * Complex64::new(0.0, -(qx * r[0] + qy * r[1])).exp();
        }
        rec += shell;
        if g >= 1 && settled(shell, rec, &mut quiet) {
            break;
        }
    }
    acc += gpref * rec;
    if excluded {
        acc += sw_origin_term(l, m, k, eta);
    }
    acc
}

/// Sum of singular scalar spherical waves over a three-dimensional
/// lattice with the rows of `a` as lattice vectors.
pub fn lsum_sw_3d(
    l: usize,
    m: i32,
    k: Complex64,
    kpar: [f64; 3],
    a: [[f64; 3]; 3],
    r: [f64; 3],
    eta: f64,
) -> Complex64 {
    let cross = |u: [f64; 3], w: [f64; 3]| {
        [
            u[1] * w[2] - u[2] * w[1],
            u[2] * w[0] - u[0] * w[2],
            u[0] * w[1] - u[1] * w[0],
        ]
    };
    let c23 = cross(a[1], a[2]);
    let det = a[0][0] * c23[0] + a[0][1] * c23[1] + a[0][2] * c23[2];
    let vol = det.abs();
    let eta = if eta > 0.0 { eta } else { SPI / vol.cbrt() };
    let c31 = cross(a[2], a[0]);
    let c12 = cross(a[0], a[1]);
    let bvec = [
        [2.0 * PI * c23[0] / det, 2.0 * PI * c23[1] / det, 2.0 * PI * c23[2] / det],
        [2.0 * PI * c31[0] / det, 2.0 * PI * c31[1] / det, 2.0 * PI * c31[2] / det],
        [2.0 * PI * c12[0] / det, 2.0 * PI * c12[1] / det, 2.0 * PI * c12[2] / det],
    ];
    let lam = l as i32;
    let pref = 2.0 / (Complex64::i() * k * SPI) * (2.0 / k).powi(lam);
    let mut acc = Complex64::new(0.0, 0.0);
    let mut excluded = false;
    let mut quiet = 0;
    for n in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        for [n1, n2, n3] in shell_3d(n) {
            let mut rv = [0.0; 3];
            for d in 0..3 {
                rv[d] = n1 as f64 * a[0][d] + n2 as f64 * a[1][d] + n3 as f64 * a[2][d];
            }
            let v = [r[0] + rv[0], r[1] + rv[1], r[2] + rv[2]];
            if v[0] * v[0] + v[1] * v[1] + v[2] * v[2] <= ORIGIN_EPS {
                excluded = true;
                continue;
            }
            shell += Complex64::new(0.0, kpar[0] * rv[0] + kpar[1] * rv[1] + kpar[2] * rv[2])
                .exp()
                * sw_real_term(l, m, k, eta, v);
        }
        acc += shell;
        if n >= 1 && settled(shell, acc, &mut quiet) {
            break;
        }
    }
    acc *= pref;

    let monos = solid_monomials(l, m);
    let gpref = pref * (-0.5f64).powi(lam) * SPI.powi(3) / vol;
    let mut rec = Complex64::new(0.0, 0.0);
    quiet = 0;
    for g in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        for [g1, g2, g3] in shell_3d(g) {
            let mut q = [0.0; 3];
            for d in 0..3 {
                q[d] = kpar[d]
                    + g1 as f64 * bvec[0][d]
                    + g2 as f64 * bvec[1][d]
                    + g3 as f64 * bvec[2][d];
            }
            let q2 = q[0] * q[0] + q[1] * q[1] + q[2] * q[2];
            let afam = (Complex64::new(q2, 0.0) - k * k) / 4.0;
            let mut sval = Complex64::new(0.0, 0.0);
            for &(px, py, pz, c) in &monos {
                sval += c
                    * Complex64::new(0.0, -q[0]).powi(px)
                    * Complex64::new(0.0, -q[1]).powi(py)
                    * Complex64::new(0.0, -q[2]).powi(pz);
            }
            let tint = kambe_integral(0, afam, Complex64::new(0.0, 0.0), 1.0 / eta);
            shell += sval
                * tint
                * Complex64::new(0.0, -(q[0] * r[0] + q[1] * r[1] + q[2] * r[2])).exp();
        }
        rec += shell;
        if g >= 1 && settled(shell, rec, &mut quiet) {
            break;
        }
    }
    acc += gpref * rec;
    if excluded {
        acc += sw_origin_term(l, m, k, eta);
    }
    acc
}

fn cw_solid(m: i32, v: [f64; 2]) -> Complex64 {
    let amu = m.abs();
    let w = if m >= 0 {
        Complex64::new(v[0], v[1])
    } else {
        Complex64::new(v[0], -v[1])
    };
    let sign = if m < 0 && amu % 2 != 0 { -1.0 } else { 1.0 };
    sign * w.powi(amu)
}

fn cw_real_term(m: i32, k: Complex64, eta: f64, v: [f64; 2]) -> Complex64 {
    let rho2 = v[0] * v[0] + v[1] * v[1];
    cw_solid(m, v) * kambe_integral(m.abs() - 1, Complex64::new(rho2, 0.0), k * k / 4.0, eta)
}

fn cw_origin_term(m: i32, k: Complex64, eta: f64) -> Complex64 {
    if m != 0 {
        return Complex64::new(0.0, 0.0);
    }
    -1.0 / (Complex64::i() * PI) * incgamma(0, -k * k / (4.0 * eta * eta))
}

/// Sum of singular scalar cylindrical waves over a one-dimensional
/// lattice along x with pitch `a`, at the in-plane shift `r`.
pub fn lsum_cw_1d(m: i32, k: Complex64, kpar: f64, a: f64, r: [f64; 2], eta: f64) -> Complex64 {
    let eta = if eta > 0.0 { eta } else { SPI / a };
    let amu = m.abs();
    let pref = 2.0 / (Complex64::i() * PI) * (2.0 / k).powi(amu);
    let mut acc = Complex64::new(0.0, 0.0);
    let mut excluded = false;
    let mut quiet = 0;
    for n in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        let signs: &[i32] = if n == 0 { &[1] } else { &[1, -1] };
        for &sgn in signs {
            let step = (n * sgn) as f64 * a;
            let v = [r[0] + step, r[1]];
            if v[0] * v[0] + v[1] * v[1] <= ORIGIN_EPS {
                excluded = true;
                continue;
            }
            shell += Complex64::new(0.0, kpar * step).exp() * cw_real_term(m, k, eta, v);
        }
        acc += shell;
        if n >= 1 && settled(shell, acc, &mut quiet) {
            break;
        }
    }
    acc *= pref;

    let wsign = if m >= 0 {
        Complex64::new(0.0, 1.0)
    } else {
        Complex64::new(0.0, -1.0)
    };
    let msign = if m < 0 && amu % 2 != 0 { -1.0 } else { 1.0 };
    let herm = hermite_table(amu);
    let gpref = pref * (-0.5f64).powi(amu) * SPI / a * msign;
    let b = Complex64::new(-r[1] * r[1], 0.0);
    let mut rec = Complex64::new(0.0, 0.0);
    quiet = 0;
    for g in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        let signs: &[i32] = if g == 0 { &[1] } else { &[1, -1] };
        for &sgn in signs {
            let qx = kpar + 2.0 * PI * (g * sgn) as f64 / a;
            let afam = (Complex64::new(qx * qx, 0.0) - k * k) / 4.0;
            let eint = ewald_integral_range(-amu, 0, afam, b, 1.0 / eta);
            let mut gterm = Complex64::new(0.0, 0.0);
            for w in 0..=amu {
                let py = amu - w;
                let cb = binom(amu, w) * wsign.powi(py) * Complex64::new(0.0, -qx).powi(w);
                for (iy, &cy) in herm[py as usize].iter().enumerate() {
                    if cy == 0.0 {
                        continue;
                    }
                    let par = if py % 2 == 0 { 1.0 } else { -1.0 };
                    let cc = cb * (par * cy * r[1].powi(iy as i32));
                    let p = py + iy as i32 - 2;
                    gterm += cc * eint[((-p - 2) / 2 + amu) as usize];
                }
            }
            shell += gterm * Complex64::new(0.0, -qx * r[0]).exp();
        }
        rec += shell;
        if g >= 1 && settled(shell, rec, &mut quiet) {
            break;
        }
    }
    acc += gpref * rec;
    if excluded {
        acc += cw_origin_term(m, k, eta);
    }
    acc
}

/// Sum of singular scalar cylindrical waves over a two-dimensional
/// lattice in the x-y plane with the rows of `a` as lattice vectors.
pub fn lsum_cw_2d(
    m: i32,
    k: Complex64,
    kpar: [f64; 2],
    a: [[f64; 2]; 2],
    r: [f64; 2],
    eta: f64,
) -> Complex64 {
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    let area = det.abs();
    let eta = if eta > 0.0 { eta } else { SPI / area.sqrt() };
    let b1 = [2.0 * PI * a[1][1] / det, -2.0 * PI * a[1][0] / det];
    let b2 = [-2.0 * PI * a[0][1] / det, 2.0 * PI * a[0][0] / det];
    let amu = m.abs();
    let pref = 2.0 / (Complex64::i() * PI) * (2.0 / k).powi(amu);
    let mut acc = Complex64::new(0.0, 0.0);
    let mut excluded = false;
    let mut quiet = 0;
    for n in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        for [n1, n2] in shell_2d(n) {
            let rx = n1 as f64 * a[0][0] + n2 as f64 * a[1][0];
            let ry = n1 as f64 * a[0][1] + n2 as f64 * a[1][1];
            let v = [r[0] + rx, r[1] + ry];
            if v[0] * v[0] + v[1] * v[1] <= ORIGIN_EPS {
                excluded = true;
                continue;
            }
            shell +=
                Complex64::new(0.0, kpar[0] * rx + kpar[1] * ry).exp() * cw_real_term(m, k, eta, v);
        }
        acc += shell;
        if n >= 1 && settled(shell, acc, &mut quiet) {
            break;
        }
    }
    acc *= pref;

    let msign = if m < 0 && amu % 2 != 0 { -1.0 } else { 1.0 };
    let mut rec = Complex64::new(0.0, 0.0);
    quiet = 0;
    for g in 0..=MAX_SHELLS {
        let mut shell = Complex64::new(0.0, 0.0);
        for [g1, g2] in shell_2d(g) {
            let qx = kpar[0] + g1 as f64 * b1[0] + g2 as f64 * b2[0];
            let qy = kpar[1] + g1 as f64 * b1[1] + g2 as f64 * b2[1];
            let q2 = qx * qx + qy * qy;
            let wq = if m >= 0 {
                Complex64::new(qx, qy)
            } else {
                Complex64::new(qx, -qy)
            };
            shell += (Complex64::i() / k).powi(amu) * wq.powi(amu)
                * Complex64::new(0.0, -(qx * r[0] + qy * r[1])).exp()
                * ((k * k - q2) / (4.0 * eta * eta)).exp()
                / (Complex64::new(q2, 0.0) - k * k);
        }
        rec += shell;
        if g >= 1 && settled(shell, rec, &mut quiet) {
            break;
        }
    }
    acc += msign * 4.0 / (Complex64::i() * area) * rec;
    if excluded {
        acc += cw_origin_term(m, k, eta);
    }
    acc
}
