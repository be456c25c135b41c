//! Operator matrices between wave bases.
//!
//! Every function here returns a plain coefficient matrix mapping the
//! modes of an input basis to the modes of an output basis. Annotation
//! bookkeeping (k0, material, lattice, Bloch vector) is layered on top by
//! [`crate::array::AcousticsArray`] and the T-matrix types.

use std::f64::consts::{FRAC_PI_4, PI};

use ndarray::{Array2, Array3};
use num_complex::Complex64;
use rayon::prelude::*;

use acousto_special::{
    car2cyl, car2pol, car2sph,
    coord::{vcyl2car, vsph2car},
    gaunt, lsum_cw_1d, lsum_cw_2d, lsum_sw_1d, lsum_sw_2d, lsum_sw_3d, scw_periodic_to_spw,
    scw_psi, scw_rotate, scw_rpsi, scw_to_ssw, sph_harm, spw_permute_xyz, spw_psi, spw_to_scw,
    spw_to_ssw, spw_translate, ssw_periodic_to_scw, ssw_periodic_to_spw, ssw_psi, ssw_rotate,
    ssw_rpsi, tl_scw, tl_ssw, vcw_l, vcw_rl, vpw_l, vsw_l, vsw_rl,
};

use crate::basis::{
    AcousticBasis, Alignment, ModeType, ScalarCylindricalWaveBasis, ScalarPlaneWaveBasisByComp,
    ScalarPlaneWaveBasisByUnitVector, ScalarSphericalWaveBasis,
};
use crate::error::{AcousticsError, Result};
use crate::lattice::{Axis, Lattice};
use crate::material::AcousticMaterial;
use crate::util::{dot3, ipow, neg1pow, par_matrix, par_matrix3, sqrt_up, sub3};

/// Matrix of the active rotation `Rz(phi) Ry(theta) Rz(psi)`.
fn euler_matrix(phi: f64, theta: f64, psi: f64) -> [[f64; 3]; 3] {
    let (sa, ca) = phi.sin_cos();
    let (sb, cb) = theta.sin_cos();
    let (sc, cc) = psi.sin_cos();
    [
        [ca * cb * cc - sa * sc, -ca * cb * sc - sa * cc, ca * sb],
        [sa * cb * cc + ca * sc, -sa * cb * sc + ca * cc, sa * sb],
        [-sb * cc, sb * sc, cb],
    ]
}

fn rot_apply(r: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        r[0][0] * v[0] + r[0][1] * v[1] + r[0][2] * v[2],
        r[1][0] * v[0] + r[1][1] * v[1] + r[1][2] * v[2],
        r[2][0] * v[0] + r[2][1] * v[1] + r[2][2] * v[2],
    ]
}

// Rotated directions pass through a normalizing constructor, so matching
// them against freshly rotated input modes needs a little slack.
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

fn close3(a: [f64; 3], b: [f64; 3]) -> bool {
    close(a[0], b[0]) && close(a[1], b[1]) && close(a[2], b[2])
}

fn one_if(cond: bool) -> Complex64 {
    if cond {
        Complex64::new(1.0, 0.0)
    } else {
        Complex64::new(0.0, 0.0)
    }
}

/// Rotation operator between two bases.
///
/// The angles are z-y-z Euler angles of the active rotation carrying the
/// input modes onto the output modes: Wigner D-matrices for spherical
/// waves, an azimuthal phase for cylindrical waves and a relabeling of
/// the propagation directions for plane waves. Cylindrical and
/// fixed-component plane wave bases only rotate about the z axis.
pub fn rotate(
    out: &AcousticBasis,
    inb: &AcousticBasis,
    phi: f64,
    theta: f64,
    psi: f64,
) -> Result<Array2<Complex64>> {
    match (out, inb) {
        (AcousticBasis::Spherical(o), AcousticBasis::Spherical(i)) => {
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, l, m) = o.mode(a);
                let (pi_, lp, mp) = i.mode(b);
                if po != pi_ {
                    return Complex64::new(0.0, 0.0);
                }
                ssw_rotate(l, m, lp, mp, phi, theta, psi)
            })
        }
        (AcousticBasis::Cylindrical(o), AcousticBasis::Cylindrical(i)) => {
            if theta != 0.0 || psi != 0.0 {
                return Err(AcousticsError::InvalidMode(
                    "cylindrical waves only rotate about the z axis".into(),
                ));
            }
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, kz, m) = o.mode(a);
                let (pi_, kzp, mp) = i.mode(b);
                if po != pi_ {
                    return Complex64::new(0.0, 0.0);
                }
                scw_rotate(kz, m, kzp, mp, phi)
            })
        }
        (AcousticBasis::PlaneUnitVector(o), AcousticBasis::PlaneUnitVector(i)) => {
            let r = euler_matrix(phi, theta, psi);
            par_matrix(o.len(), i.len(), |a, b| {
                one_if(close3(o.mode(a), rot_apply(&r, i.mode(b))))
            })
        }
        (AcousticBasis::PlaneComp(o), AcousticBasis::PlaneComp(i)) => {
            if theta != 0.0 || psi != 0.0 {
                return Err(AcousticsError::InvalidMode(
                    "fixed-component plane waves only rotate about the z axis".into(),
                ));
            }
            if o.alignment() != Alignment::Xy || i.alignment() != Alignment::Xy {
                return Err(AcousticsError::InvalidMode(
                    "in-plane rotation needs the xy alignment".into(),
                ));
            }
            let (s, c) = phi.sin_cos();
            par_matrix(o.len(), i.len(), |a, b| {
                let p = i.mode(b);
                let q = o.mode(a);
                one_if(close(q[0], c * p[0] - s * p[1]) && close(q[1], s * p[0] + c * p[1]))
            })
        }
        _ => Err(AcousticsError::IncompatibleBasis(
            "rotation does not mix basis families".into(),
        )),
    }
}

/// The image of a basis under the rotation used by [`rotate`].
pub fn rotate_basis(
    basis: &AcousticBasis,
    phi: f64,
    theta: f64,
    psi: f64,
) -> Result<AcousticBasis> {
    let r = euler_matrix(phi, theta, psi);
    match basis {
        AcousticBasis::Spherical(b) => {
            let modes: Vec<(usize, i64, i64)> = b
                .modes()
                .iter()
                .map(|&(p, l, m)| (p, l as i64, m as i64))
                .collect();
            let positions: Vec<[f64; 3]> =
                b.positions().iter().map(|&p| rot_apply(&r, p)).collect();
            Ok(ScalarSphericalWaveBasis::new(&modes, &positions)?.into())
        }
        AcousticBasis::Cylindrical(b) => {
            if theta != 0.0 || psi != 0.0 {
                return Err(AcousticsError::InvalidMode(
                    "cylindrical waves only rotate about the z axis".into(),
                ));
            }
            let modes: Vec<(usize, f64, i64)> = b
                .modes()
                .iter()
                .map(|&(p, kz, m)| (p, kz, m as i64))
                .collect();
            let positions: Vec<[f64; 3]> =
                b.positions().iter().map(|&p| rot_apply(&r, p)).collect();
            Ok(ScalarCylindricalWaveBasis::new(&modes, &positions)?.into())
        }
        AcousticBasis::PlaneUnitVector(b) => {
            let qs: Vec<[f64; 3]> = b.modes().iter().map(|&q| rot_apply(&r, q)).collect();
            Ok(ScalarPlaneWaveBasisByUnitVector::new(&qs)?.into())
        }
        AcousticBasis::PlaneComp(b) => {
            if theta != 0.0 || psi != 0.0 {
                return Err(AcousticsError::InvalidMode(
                    "fixed-component plane waves only rotate about the z axis".into(),
                ));
            }
            if b.alignment() != Alignment::Xy {
                return Err(AcousticsError::InvalidMode(
                    "in-plane rotation needs the xy alignment".into(),
                ));
            }
            let (s, c) = phi.sin_cos();
            let pairs: Vec<[f64; 2]> = b
                .pairs()
                .iter()
                .map(|p| [c * p[0] - s * p[1], s * p[0] + c * p[1]])
                .collect();
            Ok(ScalarPlaneWaveBasisByComp::aligned(&pairs, Alignment::Xy)?.into())
        }
    }
}

/// Translation operator by the vector `r` within one basis family.
///
/// The coefficients are the regular translation coefficients, so the
/// matrix is valid for regular and for singular fields alike. Plane
/// waves only pick up phase factors; for fixed-component bases the
/// missing component follows the up or down mode type.
pub fn translate(
    out: &AcousticBasis,
    inb: &AcousticBasis,
    r: [f64; 3],
    k0: f64,
    material: &AcousticMaterial,
    modetype: ModeType,
) -> Result<Array2<Complex64>> {
    let ks = material.ks(k0);
    match (out, inb) {
        (AcousticBasis::Spherical(o), AcousticBasis::Spherical(i)) => {
            if !matches!(modetype, ModeType::Regular | ModeType::Singular) {
                return Err(AcousticsError::InvalidMode(
                    "spherical waves are regular or singular".into(),
                ));
            }
            if o.positions() != i.positions() {
                return Err(AcousticsError::IncompatibleBasis(
                    "translation needs matching positions".into(),
                ));
            }
            let sph = car2sph(r);
            let x = ks * sph[0];
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, l, m) = o.mode(a);
                let (pi_, lp, mp) = i.mode(b);
                if po != pi_ {
                    return Complex64::new(0.0, 0.0);
                }
                tl_ssw(l, m, lp, mp, x, sph[1], sph[2], false)
            })
        }
        (AcousticBasis::Cylindrical(o), AcousticBasis::Cylindrical(i)) => {
            if !matches!(modetype, ModeType::Regular | ModeType::Singular) {
                return Err(AcousticsError::InvalidMode(
                    "cylindrical waves are regular or singular".into(),
                ));
            }
            if o.positions() != i.positions() {
                return Err(AcousticsError::IncompatibleBasis(
                    "translation needs matching positions".into(),
                ));
            }
            let cyl = car2cyl(r);
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, kz, m) = o.mode(a);
                let (pi_, kzp, mp) = i.mode(b);
                if po != pi_ {
                    return Complex64::new(0.0, 0.0);
                }
                let krho = sqrt_up(ks * ks - Complex64::new(kzp * kzp, 0.0));
                tl_scw(kz, m, kzp, mp, krho * cyl[0], cyl[1], cyl[2], false)
            })
        }
        (AcousticBasis::PlaneUnitVector(o), AcousticBasis::PlaneUnitVector(i)) => {
            par_matrix(o.len(), i.len(), |a, b| {
                let q = i.mode(b);
                if o.mode(a) != q {
                    return Complex64::new(0.0, 0.0);
                }
                spw_translate(ks * q[0], ks * q[1], ks * q[2], r)
            })
        }
        (AcousticBasis::PlaneComp(o), AcousticBasis::PlaneComp(i)) => {
            if o.alignment() != i.alignment() {
                return Err(AcousticsError::IncompatibleBasis(
                    "translation needs matching alignments".into(),
                ));
            }
            let kvecs = i.kvecs(k0, material, modetype)?;
            par_matrix(o.len(), i.len(), |a, b| {
                if o.mode(a) != i.mode(b) {
                    return Complex64::new(0.0, 0.0);
                }
                let k = kvecs[b];
                spw_translate(k[0], k[1], k[2], r)
            })
        }
        _ => Err(AcousticsError::IncompatibleBasis(
            "translation does not mix basis families".into(),
        )),
    }
}

/// Expansion of one basis in another.
///
/// Within a family this is the translation between the expansion
/// centers; the mode types select the regular (`(Regular, Regular)`,
/// `(Singular, Singular)`) or the singular (`(Regular, Singular)`)
/// translation coefficients. Across families the plane and cylindrical
/// wave decompositions in spherical waves are available, with the phase
/// of each output center applied to plane wave modes.
pub fn expand(
    out: &AcousticBasis,
    out_mt: ModeType,
    inb: &AcousticBasis,
    in_mt: ModeType,
    k0: f64,
    material: &AcousticMaterial,
) -> Result<Array2<Complex64>> {
    let ks = material.ks(k0);
    match (out, inb) {
        (AcousticBasis::Spherical(o), AcousticBasis::Spherical(i)) => {
            let singular = expansion_kind(out_mt, in_mt)?;
            let opos = o.positions();
            let ipos = i.positions();
            if singular {
                for po in opos {
                    for pi_ in ipos {
                        if sub3(*po, *pi_) == [0.0; 3] {
                            return Err(AcousticsError::InvalidMode(
                                "singular expansion needs distinct origins".into(),
                            ));
                        }
                    }
                }
            }
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, l, m) = o.mode(a);
                let (pi_, lp, mp) = i.mode(b);
                let sph = car2sph(sub3(opos[po], ipos[pi_]));
                tl_ssw(l, m, lp, mp, ks * sph[0], sph[1], sph[2], singular)
            })
        }
        (AcousticBasis::Cylindrical(o), AcousticBasis::Cylindrical(i)) => {
            let singular = expansion_kind(out_mt, in_mt)?;
            let opos = o.positions();
            let ipos = i.positions();
            if singular {
                for po in opos {
                    for pi_ in ipos {
                        let d = sub3(*po, *pi_);
                        if d[0] == 0.0 && d[1] == 0.0 {
                            return Err(AcousticsError::InvalidMode(
                                "singular expansion needs distinct axes".into(),
                            ));
                        }
                    }
                }
            }
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, kz, m) = o.mode(a);
                let (pi_, kzp, mp) = i.mode(b);
                let cyl = car2cyl(sub3(opos[po], ipos[pi_]));
                let krho = sqrt_up(ks * ks - Complex64::new(kzp * kzp, 0.0));
                tl_scw(kz, m, kzp, mp, krho * cyl[0], cyl[1], cyl[2], singular)
            })
        }
        (AcousticBasis::Spherical(o), AcousticBasis::Cylindrical(i)) => {
            if out_mt != in_mt || !matches!(out_mt, ModeType::Regular | ModeType::Singular) {
                return Err(AcousticsError::InvalidMode(
                    "cylindrical waves expand in spherical waves of the same kind".into(),
                ));
            }
            if o.positions() != i.positions() {
                return Err(AcousticsError::IncompatibleBasis(
                    "expansion needs matching positions".into(),
                ));
            }
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, l, m) = o.mode(a);
                let (pi_, kz, mcw) = i.mode(b);
                if po != pi_ {
                    return Complex64::new(0.0, 0.0);
                }
                scw_to_ssw(l, m, kz, mcw, ks)
            })
        }
        (AcousticBasis::Spherical(o), AcousticBasis::PlaneUnitVector(i)) => {
            if out_mt != ModeType::Regular {
                return Err(AcousticsError::InvalidMode(
                    "plane waves expand in regular spherical waves".into(),
                ));
            }
            let opos = o.positions();
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, l, m) = o.mode(a);
                let q = i.mode(b);
                let (kx, ky, kz) = (ks * q[0], ks * q[1], ks * q[2]);
                spw_to_ssw(l, m, kx, ky, kz) * spw_translate(kx, ky, kz, opos[po])
            })
        }
        (AcousticBasis::Spherical(o), AcousticBasis::PlaneComp(i)) => {
            if out_mt != ModeType::Regular {
                return Err(AcousticsError::InvalidMode(
                    "plane waves expand in regular spherical waves".into(),
                ));
            }
            let kvecs = i.kvecs(k0, material, in_mt)?;
            let opos = o.positions();
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, l, m) = o.mode(a);
                let k = kvecs[b];
                spw_to_ssw(l, m, k[0], k[1], k[2]) * spw_translate(k[0], k[1], k[2], opos[po])
            })
        }
        (AcousticBasis::Cylindrical(o), AcousticBasis::PlaneUnitVector(i)) => {
            if out_mt != ModeType::Regular {
                return Err(AcousticsError::InvalidMode(
                    "plane waves expand in regular cylindrical waves".into(),
                ));
            }
            let opos = o.positions();
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, kz, m) = o.mode(a);
                let q = i.mode(b);
                let (kqx, kqy, kqz) = (ks * q[0], ks * q[1], ks * q[2]);
                spw_to_scw(kz, m, kqx, kqy, kqz) * spw_translate(kqx, kqy, kqz, opos[po])
            })
        }
        (AcousticBasis::Cylindrical(o), AcousticBasis::PlaneComp(i)) => {
            if out_mt != ModeType::Regular {
                return Err(AcousticsError::InvalidMode(
                    "plane waves expand in regular cylindrical waves".into(),
                ));
            }
            let kvecs = i.kvecs(k0, material, in_mt)?;
            let opos = o.positions();
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, kz, m) = o.mode(a);
                let k = kvecs[b];
                spw_to_scw(kz, m, k[0], k[1], k[2]) * spw_translate(k[0], k[1], k[2], opos[po])
            })
        }
        (AcousticBasis::PlaneUnitVector(o), AcousticBasis::PlaneUnitVector(i)) => {
            par_matrix(o.len(), i.len(), |a, b| one_if(o.mode(a) == i.mode(b)))
        }
        (AcousticBasis::PlaneComp(o), AcousticBasis::PlaneComp(i)) => {
            if o.alignment() != i.alignment() || out_mt != in_mt {
                return Err(AcousticsError::IncompatibleBasis(
                    "fixed-component plane waves expand within one alignment and kind".into(),
                ));
            }
            par_matrix(o.len(), i.len(), |a, b| one_if(o.mode(a) == i.mode(b)))
        }
        _ => Err(AcousticsError::IncompatibleBasis(
            "no expansion between these bases".into(),
        )),
    }
}

fn expansion_kind(out_mt: ModeType, in_mt: ModeType) -> Result<bool> {
    match (out_mt, in_mt) {
        (ModeType::Regular, ModeType::Regular) | (ModeType::Singular, ModeType::Singular) => {
            Ok(false)
        }
        (ModeType::Regular, ModeType::Singular) => Ok(true),
        _ => Err(AcousticsError::InvalidMode(
            "expansion maps singular fields to regular ones".into(),
        )),
    }
}

/// Periodic expansion of singular fields over a lattice of copies.
///
/// Each output mode collects the singular waves radiated by all lattice
/// copies of the input modes, re-expanded as a regular wave at the
/// output center. The lattice sums attach `exp(+i kpar·R)` to the copy
/// at `R`, while the copy fields of a Bloch-periodic arrangement carry
/// `exp(-i kpar·R)` seen from the origin cell, so the sums are taken at
/// the negated Bloch vector. `kpar` has one entry per lattice dimension.
pub fn expand_lattice(
    out: &AcousticBasis,
    inb: &AcousticBasis,
    lattice: &Lattice,
    kpar: &[f64],
    k0: f64,
    material: &AcousticMaterial,
) -> Result<Array2<Complex64>> {
    let ks = material.ks(k0);
    match (out, inb) {
        (AcousticBasis::Spherical(o), AcousticBasis::Spherical(i)) => {
            check_lattice_kpar(lattice, kpar, Axis::Z)?;
            let kneg: Vec<f64> = kpar.iter().map(|v| -v).collect();
            let opos = o.positions();
            let ipos = i.positions();
            let (npo, npi) = (opos.len(), ipos.len());
            let lam_max = o.lmax() + i.lmax();
            let nmu = 2 * lam_max + 1;
            let tdim = (lam_max + 1) * nmu;
            let dtab: Vec<Complex64> = (0..npo * npi * tdim)
                .into_par_iter()
                .map(|idx| {
                    let pair = idx / tdim;
                    let lam = (idx % tdim) / nmu;
                    let mu = ((idx % tdim) % nmu) as i32 - lam_max as i32;
                    if mu.unsigned_abs() as usize > lam {
                        return Complex64::new(0.0, 0.0);
                    }
                    let s = sub3(opos[pair / npi], ipos[pair % npi]);
                    match lattice {
                        Lattice::OneD { pitch, .. } => {
                            lsum_sw_1d(lam, mu, ks, kneg[0], *pitch, s, 0.0)
                        }
                        Lattice::TwoD { vectors } => {
                            lsum_sw_2d(lam, mu, ks, [kneg[0], kneg[1]], *vectors, s, 0.0)
                        }
                        Lattice::ThreeD { vectors } => {
                            lsum_sw_3d(lam, mu, ks, [kneg[0], kneg[1], kneg[2]], *vectors, s, 0.0)
                        }
                    }
                })
                .collect();
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, l, m) = o.mode(a);
                let (pi_, lp, mp) = i.mode(b);
                let base = (po * npi + pi_) * tdim;
                let mu = mp - m;
                let mut acc = Complex64::new(0.0, 0.0);
                let mut lam = l.abs_diff(lp);
                while lam <= l + lp {
                    if mu.unsigned_abs() as usize <= lam {
                        let g = gaunt(lp as i32, mp, l as i32, -m, lam as i32, m - mp);
                        if g != 0.0 {
                            let d = dtab[base + lam * nmu + (mu + lam_max as i32) as usize];
                            acc += ipow(l as i32 - lp as i32 + lam as i32) * g * d;
                        }
                    }
                    lam += 2;
                }
                4.0 * PI * neg1pow(mp) * acc
            })
        }
        (AcousticBasis::Cylindrical(o), AcousticBasis::Cylindrical(i)) => {
            check_lattice_kpar(lattice, kpar, Axis::X)?;
            if lattice.dim() == 3 {
                return Err(AcousticsError::InvalidLattice(
                    "cylindrical waves sum over one or two dimensional lattices".into(),
                ));
            }
            let kneg: Vec<f64> = kpar.iter().map(|v| -v).collect();
            let opos = o.positions();
            let ipos = i.positions();
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, kz, m) = o.mode(a);
                let (pi_, kzp, mp) = i.mode(b);
                if kz != kzp {
                    return Complex64::new(0.0, 0.0);
                }
                let d = sub3(opos[po], ipos[pi_]);
                let krho = sqrt_up(ks * ks - Complex64::new(kz * kz, 0.0));
                let sum = match lattice {
                    Lattice::OneD { pitch, .. } => {
                        lsum_cw_1d(mp - m, krho, kneg[0], *pitch, [d[0], d[1]], 0.0)
                    }
                    Lattice::TwoD { vectors } => {
                        lsum_cw_2d(mp - m, krho, [kneg[0], kneg[1]], *vectors, [d[0], d[1]], 0.0)
                    }
                    Lattice::ThreeD { .. } => Complex64::new(0.0, 0.0),
                };
                Complex64::new(0.0, kz * d[2]).exp() * sum
            })
        }
        (AcousticBasis::Cylindrical(o), AcousticBasis::Spherical(i)) => {
            let pitch = lattice.z_pitch()?;
            if kpar.len() != 1 {
                return Err(AcousticsError::DimensionMismatch {
                    expected: 1,
                    got: kpar.len(),
                });
            }
            if o.positions() != i.positions() {
                return Err(AcousticsError::IncompatibleBasis(
                    "expansion needs matching positions".into(),
                ));
            }
            par_matrix(o.len(), i.len(), |a, b| {
                let (po, kz, mcw) = o.mode(a);
                let (pi_, l, m) = i.mode(b);
                if po != pi_ {
                    return Complex64::new(0.0, 0.0);
                }
                ssw_periodic_to_scw(l, m, kz, mcw, ks, pitch)
            })
        }
        _ => Err(AcousticsError::IncompatibleBasis(
            "no lattice expansion between these bases".into(),
        )),
    }
}

fn check_lattice_kpar(lattice: &Lattice, kpar: &[f64], axis_1d: Axis) -> Result<()> {
    if let Lattice::OneD { axis, .. } = lattice {
        if *axis != axis_1d {
            return Err(AcousticsError::InvalidLattice(format!(
                "one dimensional lattice must lie on the {axis_1d:?} axis"
            )));
        }
    }
    if kpar.len() != lattice.dim() {
        return Err(AcousticsError::DimensionMismatch {
            expected: lattice.dim(),
            got: kpar.len(),
        });
    }
    Ok(())
}

/// Diffraction amplitudes of a periodic arrangement of singular fields.
///
/// Expands the z-periodic (spherical sources over a 2D xy lattice) or
/// y-periodic (cylindrical sources over a 1D x lattice) radiated field
/// in up or down propagating plane waves of the matching alignment. The
/// output pairs select the tangential wave vectors, usually the
/// diffraction orders of the lattice.
pub fn periodic_to_plane(
    out: &ScalarPlaneWaveBasisByComp,
    modetype: ModeType,
    inb: &AcousticBasis,
    lattice: &Lattice,
    k0: f64,
    material: &AcousticMaterial,
) -> Result<Array2<Complex64>> {
    let kvecs = out.kvecs(k0, material, modetype)?;
    match inb {
        AcousticBasis::Spherical(i) => {
            if out.alignment() != Alignment::Xy {
                return Err(AcousticsError::IncompatibleBasis(
                    "spherical sources diffract into xy aligned plane waves".into(),
                ));
            }
            let area = lattice.xy_sublattice()?.volume();
            let ipos = i.positions();
            par_matrix(out.len(), i.len(), |a, b| {
                let (pi_, l, m) = i.mode(b);
                let k = kvecs[a];
                let p = ipos[pi_];
                ssw_periodic_to_spw(k[0], k[1], k[2], l, m, area)
                    * spw_translate(k[0], k[1], k[2], [-p[0], -p[1], -p[2]])
            })
        }
        AcousticBasis::Cylindrical(i) => {
            if out.alignment() != Alignment::Zx {
                return Err(AcousticsError::IncompatibleBasis(
                    "cylindrical sources diffract into zx aligned plane waves".into(),
                ));
            }
            let pitch = match lattice {
                Lattice::OneD { pitch, axis: Axis::X } => *pitch,
                _ => {
                    return Err(AcousticsError::InvalidLattice(
                        "cylindrical sources repeat along the x axis".into(),
                    ))
                }
            };
            let ipos = i.positions();
            par_matrix(out.len(), i.len(), |a, b| {
                let (pi_, kz, m) = i.mode(b);
                let k = kvecs[a];
                let p = ipos[pi_];
                scw_periodic_to_spw(k[0], k[1], k[2], kz, m, pitch)
                    * spw_translate(k[0], k[1], k[2], [-p[0], -p[1], -p[2]])
            })
        }
        _ => Err(AcousticsError::IncompatibleBasis(
            "only spherical and cylindrical sources diffract into plane waves".into(),
        )),
    }
}

/// Cyclic relabeling of the coordinate axes of a plane wave basis.
///
/// Returns the relabeled basis together with the coefficient matrix,
/// which is a permutation of the identity.
pub fn permute(basis: &AcousticBasis) -> Result<(AcousticBasis, Array2<Complex64>)> {
    match basis {
        AcousticBasis::PlaneUnitVector(b) => {
            let out = b.permute();
            let mat = par_matrix(out.len(), b.len(), |a, c| {
                let q = out.mode(a);
                let p = b.mode(c);
                spw_permute_xyz(
                    q[0].into(),
                    q[1].into(),
                    q[2].into(),
                    p[0].into(),
                    p[1].into(),
                    p[2].into(),
                )
            })?;
            Ok((out.into(), mat))
        }
        AcousticBasis::PlaneComp(b) => {
            let out = b.permute();
            let mat = Array2::eye(b.len());
            Ok((out.into(), mat))
        }
        _ => Err(AcousticsError::IncompatibleBasis(
            "only plane wave bases permute".into(),
        )),
    }
}

/// Pressure evaluation matrix, one row per point and one column per mode.
pub fn pfield(
    points: &[[f64; 3]],
    basis: &AcousticBasis,
    k0: f64,
    material: &AcousticMaterial,
    modetype: ModeType,
) -> Result<Array2<Complex64>> {
    let ks = material.ks(k0);
    match basis {
        AcousticBasis::Spherical(b) => {
            let regular = field_kind(modetype)?;
            let pos = b.positions();
            par_matrix(points.len(), b.len(), |a, c| {
                let (p, l, m) = b.mode(c);
                let sph = car2sph(sub3(points[a], pos[p]));
                if regular {
                    ssw_rpsi(l, m, ks * sph[0], sph[1], sph[2])
                } else {
                    ssw_psi(l, m, ks * sph[0], sph[1], sph[2])
                }
            })
        }
        AcousticBasis::Cylindrical(b) => {
            let regular = field_kind(modetype)?;
            let pos = b.positions();
            par_matrix(points.len(), b.len(), |a, c| {
                let (p, kz, m) = b.mode(c);
                let cyl = car2cyl(sub3(points[a], pos[p]));
                let krho = sqrt_up(ks * ks - Complex64::new(kz * kz, 0.0));
                if regular {
                    scw_rpsi(kz, m, krho * cyl[0], cyl[1], cyl[2])
                } else {
                    scw_psi(kz, m, krho * cyl[0], cyl[1], cyl[2])
                }
            })
        }
        AcousticBasis::PlaneUnitVector(b) => par_matrix(points.len(), b.len(), |a, c| {
            let q = b.mode(c);
            let p = points[a];
            spw_psi(ks * q[0], ks * q[1], ks * q[2], p[0], p[1], p[2])
        }),
        AcousticBasis::PlaneComp(b) => {
            let kvecs = b.kvecs(k0, material, modetype)?;
            par_matrix(points.len(), b.len(), |a, c| {
                let k = kvecs[c];
                let p = points[a];
                spw_psi(k[0], k[1], k[2], p[0], p[1], p[2])
            })
        }
    }
}

fn field_kind(modetype: ModeType) -> Result<bool> {
    match modetype {
        ModeType::Regular => Ok(true),
        ModeType::Singular => Ok(false),
        _ => Err(AcousticsError::InvalidMode(
            "field evaluation needs regular or singular modes".into(),
        )),
    }
}

/// Velocity evaluation matrix in Cartesian components.
///
/// The velocity of a pressure mode is `-i ∇p / (k0 rho)`, the sound
/// speed scale of the pressure normalization [`crate::material::C_REF`].
pub fn vfield(
    points: &[[f64; 3]],
    basis: &AcousticBasis,
    k0: f64,
    material: &AcousticMaterial,
    modetype: ModeType,
) -> Result<Array3<Complex64>> {
    let ks = material.ks(k0);
    let grad = -Complex64::i() * ks / (k0 * material.rho);
    match basis {
        AcousticBasis::Spherical(b) => {
            let regular = field_kind(modetype)?;
            let pos = b.positions();
            par_matrix3(points.len(), b.len(), |a, c| {
                let (p, l, m) = b.mode(c);
                let sph = car2sph(sub3(points[a], pos[p]));
                let v = if regular {
                    vsw_rl(l, m, ks * sph[0], sph[1], sph[2])
                } else {
                    vsw_l(l, m, ks * sph[0], sph[1], sph[2])
                };
                let v = vsph2car(v, sph);
                [grad * v[0], grad * v[1], grad * v[2]]
            })
        }
        AcousticBasis::Cylindrical(b) => {
            let regular = field_kind(modetype)?;
            let pos = b.positions();
            par_matrix3(points.len(), b.len(), |a, c| {
                let (p, kz, m) = b.mode(c);
                let cyl = car2cyl(sub3(points[a], pos[p]));
                let krho = sqrt_up(ks * ks - Complex64::new(kz * kz, 0.0));
                let v = if regular {
                    vcw_rl(kz, m, krho * cyl[0], cyl[1], cyl[2], krho, ks)
                } else {
                    vcw_l(kz, m, krho * cyl[0], cyl[1], cyl[2], krho, ks)
                };
                let v = vcyl2car(v, cyl);
                [grad * v[0], grad * v[1], grad * v[2]]
            })
        }
        AcousticBasis::PlaneUnitVector(b) => {
            let fac = ks / (k0 * material.rho);
            par_matrix3(points.len(), b.len(), |a, c| {
                let q = b.mode(c);
                let p = points[a];
                let v = vpw_l(ks * q[0], ks * q[1], ks * q[2], p[0], p[1], p[2]);
                [fac * v[0], fac * v[1], fac * v[2]]
            })
        }
        AcousticBasis::PlaneComp(b) => {
            let fac = ks / (k0 * material.rho);
            let kvecs = b.kvecs(k0, material, modetype)?;
            par_matrix3(points.len(), b.len(), |a, c| {
                let k = kvecs[c];
                let p = points[a];
                let v = vpw_l(k[0], k[1], k[2], p[0], p[1], p[2]);
                [fac * v[0], fac * v[1], fac * v[2]]
            })
        }
    }
}

/// Far-field pressure amplitude of singular waves.
///
/// For spherical waves the amplitude multiplies the outgoing factor
/// `exp(i ks r) / r` in the direction of each given unit vector. For
/// cylindrical waves the directions lie in the xy plane and the amplitude
/// multiplies `exp(i krho rho) / sqrt(rho)` per axial order.
pub fn pamplitude_ff(
    dirs: &[[f64; 3]],
    basis: &AcousticBasis,
    k0: f64,
    material: &AcousticMaterial,
) -> Result<Array2<Complex64>> {
    for n in dirs {
        if *n == [0.0; 3] {
            return Err(AcousticsError::InvalidMode(
                "far-field directions must be nonzero".into(),
            ));
        }
    }
    let ks = material.ks(k0);
    match basis {
        AcousticBasis::Spherical(b) => {
            let pos = b.positions();
            par_matrix(dirs.len(), b.len(), |a, c| {
                let (p, l, m) = b.mode(c);
                let sph = car2sph(dirs[a]);
                let n = [
                    dirs[a][0] / sph[0],
                    dirs[a][1] / sph[0],
                    dirs[a][2] / sph[0],
                ];
                ipow(-(l as i32 + 1)) * sph_harm(m, l, sph[2], sph[1]) / ks
                    * (-Complex64::i() * ks * dot3(n, pos[p])).exp()
            })
        }
        AcousticBasis::Cylindrical(b) => {
            for n in dirs {
                if n[2] != 0.0 {
                    return Err(AcousticsError::InvalidMode(
                        "cylindrical far-field directions lie in the xy plane".into(),
                    ));
                }
            }
            let pos = b.positions();
            par_matrix(dirs.len(), b.len(), |a, c| {
                let (p, kz, m) = b.mode(c);
                let pol = car2pol([dirs[a][0], dirs[a][1]]);
                let n = [dirs[a][0] / pol[0], dirs[a][1] / pol[0]];
                let krho = sqrt_up(ks * ks - Complex64::new(kz * kz, 0.0));
                let shift = krho * (n[0] * pos[p][0] + n[1] * pos[p][1]) + kz * pos[p][2];
                (2.0 / (PI * krho)).sqrt()
                    * ipow(-m)
                    * Complex64::from_polar(1.0, m as f64 * pol[1] - FRAC_PI_4)
                    * (-Complex64::i() * shift).exp()
            })
        }
        _ => Err(AcousticsError::IncompatibleBasis(
            "far-field amplitudes need singular spherical or cylindrical waves".into(),
        )),
    }
}

/// Far-field velocity amplitude.
///
/// In the far field the velocity follows the propagation direction: for
/// spherical waves only the radial slot carries `ks p / (k0 rho)`, for
/// cylindrical waves the radial and axial slots carry `krho` and `kz`
/// scaled the same way.
pub fn vamplitude_ff(
    dirs: &[[f64; 3]],
    basis: &AcousticBasis,
    k0: f64,
    material: &AcousticMaterial,
) -> Result<Array3<Complex64>> {
    let amp = pamplitude_ff(dirs, basis, k0, material)?;
    let ks = material.ks(k0);
    let fac = 1.0 / (k0 * material.rho);
    let zero = Complex64::new(0.0, 0.0);
    match basis {
        AcousticBasis::Spherical(_) => par_matrix3(dirs.len(), basis.len(), |a, c| {
            [fac * ks * amp[[a, c]], zero, zero]
        }),
        AcousticBasis::Cylindrical(b) => par_matrix3(dirs.len(), b.len(), |a, c| {
            let (_, kz, _) = b.mode(c);
            let krho = sqrt_up(ks * ks - Complex64::new(kz * kz, 0.0));
            [fac * krho * amp[[a, c]], zero, fac * kz * amp[[a, c]]]
        }),
        _ => Err(AcousticsError::IncompatibleBasis(
            "far-field amplitudes need singular spherical or cylindrical waves".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn assert_entry(got: Complex64, re: f64, im: f64, eps: f64) {
        assert_relative_eq!(got.re, re, epsilon = eps, max_relative = eps);
        assert_relative_eq!(got.im, im, epsilon = eps, max_relative = eps);
    }

    #[test]
    fn rotate_spherical_identity() {
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(2).into();
        let r = rotate(&b, &b, 0.0, 0.0, 0.0).unwrap();
        for i in 0..b.len() {
            for j in 0..b.len() {
                let want = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(r[[i, j]].re, want, epsilon = 1e-14);
                assert_relative_eq!(r[[i, j]].im, 0.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn rotate_cylindrical_phase() {
        let b: AcousticBasis = ScalarCylindricalWaveBasis::default(&[0.4], 2).into();
        let r = rotate(&b, &b, 0.7, 0.0, 0.0).unwrap();
        let cwb = match &b {
            AcousticBasis::Cylindrical(c) => c,
            _ => unreachable!(),
        };
        for (i, &(_, _, m)) in cwb.modes().iter().enumerate() {
            let want = Complex64::new(0.0, -(m as f64) * 0.7).exp();
            assert_entry(r[[i, i]], want.re, want.im, 1e-14);
        }
        assert!(rotate(&b, &b, 0.1, 0.2, 0.0).is_err());
    }

    #[test]
    fn rotate_consistency_with_plane_wave_expansion() {
        // Expanding a rotated plane wave must equal rotating the
        // expansion of the unrotated wave.
        let (phi, theta, psi) = (0.4, 1.1, -0.7);
        let mat = AcousticMaterial::default();
        let k0 = 1.0;
        let ks = mat.ks(k0);
        let q = {
            let v: [f64; 3] = [0.3, -0.5, 0.8];
            let n = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            [v[0] / n, v[1] / n, v[2] / n]
        };
        let rq = rot_apply(&euler_matrix(phi, theta, psi), q);
        for l in 0..3usize {
            for m in -(l as i32)..=(l as i32) {
                let lhs = spw_to_ssw(l, m, ks * rq[0], ks * rq[1], ks * rq[2]);
                let mut rhs = Complex64::new(0.0, 0.0);
                for mp in -(l as i32)..=(l as i32) {
                    rhs += ssw_rotate(l, m, l, mp, phi, theta, psi)
                        * spw_to_ssw(l, mp, ks * q[0], ks * q[1], ks * q[2]);
                }
                assert_entry(lhs, rhs.re, rhs.im, 1e-12);
            }
        }
    }

    #[test]
    fn rotate_unit_vectors() {
        let b: AcousticBasis = ScalarPlaneWaveBasisByUnitVector::default([1.0, 0.0, 0.0])
            .unwrap()
            .into();
        let rb = rotate_basis(&b, FRAC_PI_2, 0.0, 0.0).unwrap();
        if let AcousticBasis::PlaneUnitVector(u) = &rb {
            assert!(close3(u.mode(0), [0.0, 1.0, 0.0]));
        } else {
            unreachable!();
        }
        let m = rotate(&rb, &b, FRAC_PI_2, 0.0, 0.0).unwrap();
        assert_entry(m[[0, 0]], 1.0, 0.0, 1e-15);
    }

    #[test]
    fn translate_plane_wave_phase() {
        let b: AcousticBasis = ScalarPlaneWaveBasisByUnitVector::default([0.0, 0.0, 1.0])
            .unwrap()
            .into();
        let mat = AcousticMaterial::default();
        let m = translate(&b, &b, [0.0, 0.0, 1.0], 1.3, &mat, ModeType::Regular).unwrap();
        let want = Complex64::new(0.0, 1.3).exp();
        assert_entry(m[[0, 0]], want.re, want.im, 1e-14);
    }

    #[test]
    fn translate_spherical_zero_is_identity() {
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(1).into();
        let mat = AcousticMaterial::new(1.5, 400.0, 0.0);
        let m = translate(&b, &b, [0.0; 3], 2.0, &mat, ModeType::Singular).unwrap();
        for i in 0..b.len() {
            for j in 0..b.len() {
                let want = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(m[[i, j]].re, want, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn expand_plane_wave_in_spherical_waves() {
        let swb: AcousticBasis = ScalarSphericalWaveBasis::default_at(1, &[[0.1, -0.2, 0.3]])
            .unwrap()
            .into();
        let pwb: AcousticBasis = ScalarPlaneWaveBasisByUnitVector::default([0.0, 0.6, 0.8])
            .unwrap()
            .into();
        let mat = AcousticMaterial::default();
        let k0 = 1.7;
        let ks = mat.ks(k0);
        let m = expand(&swb, ModeType::Regular, &pwb, ModeType::Regular, k0, &mat).unwrap();
        let swb = match &swb {
            AcousticBasis::Spherical(b) => b,
            _ => unreachable!(),
        };
        for (i, &(_, l, mm)) in swb.modes().iter().enumerate() {
            let want = spw_to_ssw(l, mm, ks * 0.0, ks * 0.6, ks * 0.8)
                * spw_translate(ks * 0.0, ks * 0.6, ks * 0.8, [0.1, -0.2, 0.3]);
            assert_entry(m[[i, 0]], want.re, want.im, 1e-13);
        }
    }

    #[test]
    fn expand_singular_needs_distinct_origins() {
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(1).into();
        let mat = AcousticMaterial::default();
        let r = expand(&b, ModeType::Regular, &b, ModeType::Singular, 1.0, &mat);
        assert!(r.is_err());
    }

    #[test]
    fn expand_lattice_spherical_1d() {
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(2).into();
        let lat = Lattice::one_d(2.0, Axis::Z);
        let mat = AcousticMaterial::new(1.3, 343.0 / 1.1, 0.0);
        let c = expand_lattice(&b, &b, &lat, &[0.3], 1.0, &mat).unwrap();
        let sb = match &b {
            AcousticBasis::Spherical(x) => x,
            _ => unreachable!(),
        };
        let i10 = sb.index_of((0, 1, 0)).unwrap();
        let i1m1 = sb.index_of((0, 1, -1)).unwrap();
        let i21 = sb.index_of((0, 2, 1)).unwrap();
        let i00 = sb.index_of((0, 0, 0)).unwrap();
        let i20 = sb.index_of((0, 2, 0)).unwrap();
        assert_entry(
            c[[i10, i10]],
            -0.68135611702883389,
            2.2677912525366838,
            1e-8,
        );
        // on-axis sums keep only mu = 0
        assert!(c[[i1m1, i21]].norm() < 1e-10);
        assert_entry(
            c[[i00, i20]],
            1.2402941110402485,
            -2.0072198767831795,
            1e-8,
        );
    }

    #[test]
    fn expand_lattice_spherical_1d_offset() {
        let out: AcousticBasis = ScalarSphericalWaveBasis::default(1).into();
        let inb: AcousticBasis = ScalarSphericalWaveBasis::default_at(1, &[[0.3, 0.1, 0.5]])
            .unwrap()
            .into();
        let lat = Lattice::one_d(2.0, Axis::Z);
        let mat = AcousticMaterial::new(1.3, 343.0 / 1.1, 0.0);
        let c = expand_lattice(&out, &inb, &lat, &[0.3], 1.0, &mat).unwrap();
        let sb = match &out {
            AcousticBasis::Spherical(x) => x,
            _ => unreachable!(),
        };
        let i10 = sb.index_of((0, 1, 0)).unwrap();
        let i00 = sb.index_of((0, 0, 0)).unwrap();
        let i11 = sb.index_of((0, 1, 1)).unwrap();
        assert_entry(
            c[[i10, i10]],
            1.1368352766112881,
            14.521861200331995,
            1e-8,
        );
        assert_entry(
            c[[i00, i11]],
            0.82444639109295972,
            -1.8122772074080194,
            1e-8,
        );
    }

    #[test]
    fn expand_lattice_spherical_2d() {
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(2).into();
        let lat = Lattice::square(2.0);
        let mat = AcousticMaterial::new(1.3, 343.0 / 1.3, 0.0);
        let c = expand_lattice(&b, &b, &lat, &[0.2, -0.1], 1.0, &mat).unwrap();
        let sb = match &b {
            AcousticBasis::Spherical(x) => x,
            _ => unreachable!(),
        };
        let i11 = sb.index_of((0, 1, 1)).unwrap();
        let i20 = sb.index_of((0, 2, 0)).unwrap();
        let i00 = sb.index_of((0, 0, 0)).unwrap();
        assert_entry(
            c[[i11, i11]],
            -0.95812747413808092,
            1.5405037948110466,
            1e-8,
        );
        assert_entry(
            c[[i20, i00]],
            -2.016161999469913,
            0.8265564388980385,
            1e-8,
        );
    }

    #[test]
    fn expand_lattice_spherical_3d() {
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(1).into();
        let lat = Lattice::cubic(2.0);
        let mat = AcousticMaterial::new(1.3, 343.0 / 0.9, 0.0);
        let c = expand_lattice(&b, &b, &lat, &[0.1, 0.2, 0.3], 1.0, &mat).unwrap();
        let sb = match &b {
            AcousticBasis::Spherical(x) => x,
            _ => unreachable!(),
        };
        let i10 = sb.index_of((0, 1, 0)).unwrap();
        let i1m1 = sb.index_of((0, 1, -1)).unwrap();
        let i11 = sb.index_of((0, 1, 1)).unwrap();
        // propagating lossless diagonal has real part -1
        assert_entry(c[[i10, i10]], -1.0, 4.2566904605462904, 1e-8);
        assert_entry(
            c[[i1m1, i11]],
            0.25489860148009675,
            0.11901496571436077,
            1e-8,
        );
    }

    #[test]
    fn expand_lattice_unit_pitch() {
        let mat = AcousticMaterial::default();
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(2).into();
        let sb = match &b {
            AcousticBasis::Spherical(x) => x,
            _ => unreachable!(),
        };
        let i10 = sb.index_of((0, 1, 0)).unwrap();
        let i2m1 = sb.index_of((0, 2, -1)).unwrap();
        let i20 = sb.index_of((0, 2, 0)).unwrap();
        let lat = Lattice::one_d(1.0, Axis::Z);
        let c = expand_lattice(&b, &b, &lat, &[0.0], 1.0, &mat).unwrap();
        assert_entry(c[[i10, i10]], -1.0, 17.298268640737217, 1e-8);
        let c = expand_lattice(&b, &b, &Lattice::square(1.0), &[0.0, 0.0], 1.0, &mat).unwrap();
        assert_entry(c[[i2m1, i2m1]], -1.0, 381.01677719288557, 1e-7);
        // odd lambda sums vanish on the square lattice at the zone center
        assert!(c[[i10, i20]].norm() < 1e-8);
        let b3: AcousticBasis = ScalarSphericalWaveBasis::default(3).into();
        let sb3 = match &b3 {
            AcousticBasis::Spherical(x) => x,
            _ => unreachable!(),
        };
        let i33 = sb3.index_of((0, 3, 3)).unwrap();
        let c = expand_lattice(&b3, &b3, &Lattice::cubic(1.0), &[0.0; 3], 1.0, &mat).unwrap();
        assert_entry(c[[i33, i33]], -1.0, -1203.5127397081713, 1e-6);
    }

    #[test]
    fn expand_lattice_cylindrical_1d() {
        let b: AcousticBasis = ScalarCylindricalWaveBasis::default(&[0.4], 2).into();
        let lat = Lattice::one_d(2.0, Axis::X);
        let mat = AcousticMaterial::new(1.3, 343.0 / 1.2, 0.0);
        let c = expand_lattice(&b, &b, &lat, &[0.25], 1.0, &mat).unwrap();
        let cb = match &b {
            AcousticBasis::Cylindrical(x) => x,
            _ => unreachable!(),
        };
        let ip1 = cb.index_of((0, 0.4, 1)).unwrap();
        let im1 = cb.index_of((0, 0.4, -1)).unwrap();
        let i0 = cb.index_of((0, 0.4, 0)).unwrap();
        assert_entry(
            c[[ip1, im1]],
            0.81778196697813678,
            -0.50177224891763268,
            1e-8,
        );
        assert_entry(
            c[[i0, i0]],
            -0.093713491141112489,
            0.66268386350476485,
            1e-8,
        );
    }

    #[test]
    fn expand_lattice_cylindrical_1d_offset() {
        let out: AcousticBasis = ScalarCylindricalWaveBasis::default(&[0.4], 2).into();
        let inb: AcousticBasis =
            ScalarCylindricalWaveBasis::default_at(&[0.4], 2, &[[-0.3, 0.2, -0.7]])
                .unwrap()
                .into();
        let lat = Lattice::one_d(2.0, Axis::X);
        let mat = AcousticMaterial::new(1.3, 343.0 / 1.2, 0.0);
        let c = expand_lattice(&out, &inb, &lat, &[0.25], 1.0, &mat).unwrap();
        let cb = match &out {
            AcousticBasis::Cylindrical(x) => x,
            _ => unreachable!(),
        };
        let i2 = cb.index_of((0, 0.4, 2)).unwrap();
        let i1 = cb.index_of((0, 0.4, 1)).unwrap();
        assert_entry(
            c[[i2, i1]],
            -1.4182201393808037,
            0.90099293840472337,
            1e-8,
        );
    }

    #[test]
    fn expand_lattice_cylindrical_2d() {
        let b: AcousticBasis = ScalarCylindricalWaveBasis::default(&[0.4], 2).into();
        let lat = Lattice::square(2.0);
        let mat = AcousticMaterial::new(1.3, 343.0 / 1.2, 0.0);
        let c = expand_lattice(&b, &b, &lat, &[0.2, 0.3], 1.0, &mat).unwrap();
        let cb = match &b {
            AcousticBasis::Cylindrical(x) => x,
            _ => unreachable!(),
        };
        let ip1 = cb.index_of((0, 0.4, 1)).unwrap();
        let im2 = cb.index_of((0, 0.4, -2)).unwrap();
        let ip2 = cb.index_of((0, 0.4, 2)).unwrap();
        // propagating lossless diagonal has real part -1
        assert_entry(c[[ip1, ip1]], -1.0, 1.1571881658496256, 1e-8);
        assert_entry(
            c[[im2, ip2]],
            0.014763402967837071,
            -4.7360387394515978,
            1e-8,
        );
    }

    #[test]
    fn expand_lattice_cylindrical_in_plane() {
        let b: AcousticBasis = ScalarCylindricalWaveBasis::default(&[0.0], 1).into();
        let lat = Lattice::square(2.0);
        let mat = AcousticMaterial::default();
        let c = expand_lattice(&b, &b, &lat, &[0.0, 0.0], 1.0, &mat).unwrap();
        let cb = match &b {
            AcousticBasis::Cylindrical(x) => x,
            _ => unreachable!(),
        };
        let i0 = cb.index_of((0, 0.0, 0)).unwrap();
        assert_entry(c[[i0, i0]], -1.0, 1.3996268693872552, 1e-8);
    }

    #[test]
    fn expand_lattice_cylindrical_from_spherical() {
        let cwb: AcousticBasis = ScalarCylindricalWaveBasis::default(&[0.3], 1).into();
        let swb: AcousticBasis = ScalarSphericalWaveBasis::default(1).into();
        let lat = Lattice::one_d(2.0, Axis::Z);
        let mat = AcousticMaterial::default();
        let c = expand_lattice(&cwb, &swb, &lat, &[0.3], 1.0, &mat).unwrap();
        let (cb, sb) = match (&cwb, &swb) {
            (AcousticBasis::Cylindrical(c), AcousticBasis::Spherical(s)) => (c, s),
            _ => unreachable!(),
        };
        let ks = mat.ks(1.0);
        let a = cb.index_of((0, 0.3, 1)).unwrap();
        let b_ = sb.index_of((0, 1, 1)).unwrap();
        let want = ssw_periodic_to_scw(1, 1, 0.3, 1, ks, 2.0);
        assert_entry(c[[a, b_]], want.re, want.im, 1e-13);
        let b0 = sb.index_of((0, 1, 0)).unwrap();
        assert!(c[[a, b0]].norm() == 0.0);
    }

    #[test]
    fn permute_unit_vectors() {
        let n = 14f64.sqrt();
        let b: AcousticBasis =
            ScalarPlaneWaveBasisByUnitVector::new(&[[2.0 / n, 3.0 / n, 1.0 / n]])
                .unwrap()
                .into();
        let (out, m) = permute(&b).unwrap();
        if let AcousticBasis::PlaneUnitVector(u) = &out {
            assert_eq!(u.mode(0), [1.0 / n, 2.0 / n, 3.0 / n]);
        } else {
            unreachable!();
        }
        assert_entry(m[[0, 0]], 1.0, 0.0, 1e-15);
    }

    #[test]
    fn pfield_monopole() {
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(0).into();
        let mat = AcousticMaterial::default();
        let k0 = 1.3;
        let m = pfield(&[[0.0, 0.0, 2.0]], &b, k0, &mat, ModeType::Singular).unwrap();
        let x = Complex64::new(2.6, 0.0);
        let want = -Complex64::i() * (Complex64::i() * x).exp() / x / (4.0 * PI).sqrt();
        assert_entry(m[[0, 0]], want.re, want.im, 1e-13);
    }

    #[test]
    fn pamplitude_monopole() {
        let b: AcousticBasis = ScalarSphericalWaveBasis::default(0).into();
        let mat = AcousticMaterial::default();
        let k0 = 1.3;
        let m = pamplitude_ff(&[[0.0, 1.0, 0.0]], &b, k0, &mat).unwrap();
        let want = -Complex64::i() / (k0 * (4.0 * PI).sqrt());
        assert_entry(m[[0, 0]], want.re, want.im, 1e-14);
    }

    #[test]
    fn pamplitude_cylindrical() {
        let b: AcousticBasis = ScalarCylindricalWaveBasis::default(&[0.3], 1).into();
        let mat = AcousticMaterial::default();
        let k0 = 1.3;
        let ks = mat.ks(k0);
        let krho = sqrt_up(ks * ks - Complex64::new(0.09, 0.0));
        let m = pamplitude_ff(&[[0.0, 1.0, 0.0]], &b, k0, &mat).unwrap();
        let cb = match &b {
            AcousticBasis::Cylindrical(x) => x,
            _ => unreachable!(),
        };
        let i1 = cb.index_of((0, 0.3, 1)).unwrap();
        // at phi = pi/2 the order m = 1 collects exp(-i pi/4)
        let want = (2.0 / (PI * krho)).sqrt() * Complex64::from_polar(1.0, -FRAC_PI_4);
        assert_entry(m[[0, i1]], want.re, want.im, 1e-14);
        // the amplitude reproduces the singular field at large radius
        let rho = 2000.0;
        let f = pfield(&[[0.0, rho, 0.0]], &b, k0, &mat, ModeType::Singular).unwrap();
        let ff = m[[0, i1]] * (Complex64::i() * krho * rho).exp() / rho.sqrt();
        assert!((f[[0, i1]] - ff).norm() < 1e-5);
        let v = vamplitude_ff(&[[0.0, 1.0, 0.0]], &b, k0, &mat).unwrap();
        let fac = 1.0 / (k0 * mat.rho);
        let wr = fac * krho * m[[0, i1]];
        let wz = fac * 0.3 * m[[0, i1]];
        assert_entry(v[[0, i1, 0]], wr.re, wr.im, 1e-14);
        assert!(v[[0, i1, 1]].norm() == 0.0);
        assert_entry(v[[0, i1, 2]], wz.re, wz.im, 1e-14);
    }

    #[test]
    fn vfield_plane_wave() {
        let b: AcousticBasis = ScalarPlaneWaveBasisByUnitVector::default([0.0, 0.0, 1.0])
            .unwrap()
            .into();
        let mat = AcousticMaterial::new(1.3, 343.0, 0.0);
        let k0 = 1.1;
        let v = vfield(&[[0.0, 0.0, 0.5]], &b, k0, &mat, ModeType::Regular).unwrap();
        let want = (Complex64::new(0.0, 1.1 * 0.5)).exp() / Complex64::new(1.3, 0.0);
        assert!(v[[0, 0, 0]].norm() < 1e-15);
        assert!(v[[0, 0, 1]].norm() < 1e-15);
        assert_entry(v[[0, 0, 2]], want.re, want.im, 1e-13);
    }

    #[test]
    fn periodic_to_plane_grazing_order_vanishes() {
        let swb: AcousticBasis = ScalarSphericalWaveBasis::default(1).into();
        let out = ScalarPlaneWaveBasisByComp::aligned(&[[1.0, 0.0]], Alignment::Xy).unwrap();
        let lat = Lattice::square(2.0);
        let mat = AcousticMaterial::default();
        let m = periodic_to_plane(&out, ModeType::Up, &swb, &lat, 1.0, &mat).unwrap();
        for j in 0..swb.len() {
            assert!(m[[0, j]].norm() == 0.0);
        }
    }
}
