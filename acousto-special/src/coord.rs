//! Coordinate transformations.
//!
//! Points are stored as plain arrays in the order `[x, y, z]`,
//! `[r, θ, φ]` with the polar angle θ measured from the z-axis,
//! `[ρ, φ, z]` for cylindrical and `[ρ, φ]` for polar coordinates.
//! The azimuthal angle is taken in (-π, π]. Vector transformations act on
//! complex field components in the local orthonormal basis.

use num_complex::Complex64;

/// Cartesian to spherical coordinates.
pub fn car2sph(p: [f64; 3]) -> [f64; 3] {
    let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
    let theta = if r == 0.0 { 0.0 } else { (p[2] / r).acos() };
    let phi = p[1].atan2(p[0]);
    [r, theta, phi]
}

/// Spherical to Cartesian coordinates.
pub fn sph2car(p: [f64; 3]) -> [f64; 3] {
    let (r, theta, phi) = (p[0], p[1], p[2]);
    [
        r * theta.sin() * phi.cos(),
        r * theta.sin() * phi.sin(),
        r * theta.cos(),
    ]
}

/// Cartesian to cylindrical coordinates.
pub fn car2cyl(p: [f64; 3]) -> [f64; 3] {
    let rho = (p[0] * p[0] + p[1] * p[1]).sqrt();
    let phi = p[1].atan2(p[0]);
    [rho, phi, p[2]]
}

/// Cylindrical to Cartesian coordinates.
pub fn cyl2car(p: [f64; 3]) -> [f64; 3] {
    let (rho, phi, z) = (p[0], p[1], p[2]);
    [rho * phi.cos(), rho * phi.sin(), z]
}

/// Two-dimensional Cartesian to polar coordinates.
pub fn car2pol(p: [f64; 2]) -> [f64; 2] {
    [(p[0] * p[0] + p[1] * p[1]).sqrt(), p[1].atan2(p[0])]
}

/// Polar to two-dimensional Cartesian coordinates.
pub fn pol2car(p: [f64; 2]) -> [f64; 2] {
    [p[0] * p[1].cos(), p[0] * p[1].sin()]
}

/// Cylindrical to spherical coordinates.
pub fn cyl2sph(p: [f64; 3]) -> [f64; 3] {
    let (rho, phi, z) = (p[0], p[1], p[2]);
    let r = (rho * rho + z * z).sqrt();
    let theta = if r == 0.0 { 0.0 } else { (z / r).acos() };
    [r, theta, phi]
}

/// Spherical to cylindrical coordinates.
pub fn sph2cyl(p: [f64; 3]) -> [f64; 3] {
    let (r, theta, phi) = (p[0], p[1], p[2]);
    [r * theta.sin(), phi, r * theta.cos()]
}

/// Complex vector components from the spherical to the Cartesian basis at
/// the point `[r, θ, φ]`.
pub fn vsph2car(v: [Complex64; 3], p: [f64; 3]) -> [Complex64; 3] {
    let (st, ct) = p[1].sin_cos();
    let (sp, cp) = p[2].sin_cos();
    [
        v[0] * st * cp + v[1] * ct * cp - v[2] * sp,
        v[0] * st * sp + v[1] * ct * sp + v[2] * cp,
        v[0] * ct - v[1] * st,
    ]
}

/// Complex vector components from the cylindrical to the Cartesian basis
/// at the point `[ρ, φ, z]`.
pub fn vcyl2car(v: [Complex64; 3], p: [f64; 3]) -> [Complex64; 3] {
    let (sp, cp) = p[1].sin_cos();
    [v[0] * cp - v[1] * sp, v[0] * sp + v[1] * cp, v[2]]
}

/// Complex vector components from the Cartesian to the spherical basis at
/// the point `[r, θ, φ]`.
pub fn vcar2sph(v: [Complex64; 3], p: [f64; 3]) -> [Complex64; 3] {
    let (st, ct) = p[1].sin_cos();
    let (sp, cp) = p[2].sin_cos();
    [
        v[0] * st * cp + v[1] * st * sp + v[2] * ct,
        v[0] * ct * cp + v[1] * ct * sp - v[2] * st,
        -v[0] * sp + v[1] * cp,
    ]
}

/// Complex vector components from the Cartesian to the cylindrical basis
/// at the point `[ρ, φ, z]`.
pub fn vcar2cyl(v: [Complex64; 3], p: [f64; 3]) -> [Complex64; 3] {
    let (sp, cp) = p[1].sin_cos();
    [v[0] * cp + v[1] * sp, -v[0] * sp + v[1] * cp, v[2]]
}

/// Complex vector components from the two-dimensional Cartesian to the
/// polar basis at the point `[ρ, φ]`.
pub fn vcar2pol(v: [Complex64; 2], p: [f64; 2]) -> [Complex64; 2] {
    let (sp, cp) = p[1].sin_cos();
    [v[0] * cp + v[1] * sp, -v[0] * sp + v[1] * cp]
}

/// Complex vector components from the polar to the two-dimensional
/// Cartesian basis at the point `[ρ, φ]`.
pub fn vpol2car(v: [Complex64; 2], p: [f64; 2]) -> [Complex64; 2] {
    let (sp, cp) = p[1].sin_cos();
    [v[0] * cp - v[1] * sp, v[0] * sp + v[1] * cp]
}
