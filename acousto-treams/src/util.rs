//! Small numeric helpers shared across modules.

use ndarray::{Array2, Array3};
use num_complex::Complex64;
use rayon::prelude::*;

use crate::error::{AcousticsError, Result};

/// Square root with nonnegative imaginary part.
///
/// Wave vector components are obtained from squared differences like
/// `ks² - kz²`. For the `e^{-iωt}` time convention the root with
/// `Im >= 0` makes evanescent waves decay away from their source.
pub(crate) fn sqrt_up(z: Complex64) -> Complex64 {
    let w = z.sqrt();
    if w.im < 0.0 {
        -w
    } else {
        w
    }
}

/// Integer power of the imaginary unit.
pub(crate) fn ipow(n: i32) -> Complex64 {
    match n.rem_euclid(4) {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

/// Minus one to an integer power.
pub(crate) fn neg1pow(n: i32) -> f64 {
    if n % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

pub(crate) fn sub3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot3(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Assemble a matrix entry by entry, rows in parallel.
pub(crate) fn par_matrix<F>(nrows: usize, ncols: usize, f: F) -> Result<Array2<Complex64>>
where
    F: Fn(usize, usize) -> Complex64 + Sync,
{
    let data: Vec<Complex64> = (0..nrows)
        .into_par_iter()
        .flat_map_iter(|i| {
            let f = &f;
            (0..ncols).map(move |j| f(i, j))
        })
        .collect();
    let n = data.len();
    Array2::from_shape_vec((nrows, ncols), data).map_err(|_| AcousticsError::DimensionMismatch {
        expected: nrows * ncols,
        got: n,
    })
}

/// Assemble a stack of three-vectors entry by entry, rows in parallel.
pub(crate) fn par_matrix3<F>(nrows: usize, ncols: usize, f: F) -> Result<Array3<Complex64>>
where
    F: Fn(usize, usize) -> [Complex64; 3] + Sync,
{
    let data: Vec<Complex64> = (0..nrows)
        .into_par_iter()
        .flat_map_iter(|i| {
            let f = &f;
            (0..ncols).flat_map(move |j| f(i, j))
        })
        .collect();
    let n = data.len();
    Array3::from_shape_vec((nrows, ncols, 3), data).map_err(|_| {
        AcousticsError::DimensionMismatch {
            expected: nrows * ncols * 3,
            got: n,
        }
    })
}
