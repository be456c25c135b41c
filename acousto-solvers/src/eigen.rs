//! Eigenvalues and eigenvectors of general complex matrices.
//!
//! The matrix is reduced to upper Hessenberg form by Householder
//! reflections, then the shifted QR iteration with deflation drives the
//! subdiagonal to zero. The accumulated unitary similarity gives the
//! Schur form `A = Q T Q*`; eigenvalues are the diagonal of `T` and
//! eigenvectors follow from back-substitution on `T`.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use thiserror::Error;

/// Errors of the eigensolver.
#[derive(Error, Debug)]
pub enum EigenError {
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("QR iteration did not converge within {sweeps} sweeps")]
    NoConvergence { sweeps: usize },
}

const SWEEPS_PER_EIGENVALUE: usize = 30;

/// Rotation `G = [[c, s], [-conj(s), c]]` with real `c` such that
/// `G [f; g] = [r; 0]`.
fn givens(f: Complex64, g: Complex64) -> (f64, Complex64) {
    if g.norm() == 0.0 {
        return (1.0, Complex64::new(0.0, 0.0));
    }
    if f.norm() == 0.0 {
        return (0.0, Complex64::new(1.0, 0.0));
    }
    let d = (f.norm_sqr() + g.norm_sqr()).sqrt();
    (f.norm() / d, f / f.norm() * g.conj() / d)
}

/// Schur decomposition `A = Q T Q*` with `T` upper triangular.
fn schur(
    a: &Array2<Complex64>,
    want_q: bool,
) -> Result<(Array2<Complex64>, Option<Array2<Complex64>>), EigenError> {
    let n = a.nrows();
    let zero = Complex64::new(0.0, 0.0);
    let mut t = a.clone();
    let mut q = if want_q { Some(Array2::eye(n)) } else { None };

    // Householder reduction to upper Hessenberg form
    for k in 0..n.saturating_sub(2) {
        let mut xnorm2 = 0.0;
        for i in (k + 1)..n {
            xnorm2 += t[[i, k]].norm_sqr();
        }
        let xnorm = xnorm2.sqrt();
        if xnorm == 0.0 {
            continue;
        }
        let x0 = t[[k + 1, k]];
        let phase = if x0.norm() == 0.0 {
            Complex64::new(1.0, 0.0)
        } else {
            x0 / x0.norm()
        };
        let alpha = -phase * xnorm;
        let mut v: Vec<Complex64> = ((k + 1)..n).map(|i| t[[i, k]]).collect();
        v[0] -= alpha;
        let vnorm2: f64 = v.iter().map(|z| z.norm_sqr()).sum();
        if vnorm2 == 0.0 {
            continue;
        }
        let beta = 2.0 / vnorm2;

        // left reflection on rows k+1.., then exact zeros in column k
        for j in k..n {
            let mut w = zero;
            for (i, vi) in v.iter().enumerate() {
                w += vi.conj() * t[[k + 1 + i, j]];
            }
            let w = beta * w;
            for (i, vi) in v.iter().enumerate() {
                let update = w * vi;
                t[[k + 1 + i, j]] -= update;
            }
        }
        t[[k + 1, k]] = alpha;
        for i in (k + 2)..n {
            t[[i, k]] = zero;
        }

        // right reflection on columns k+1..
        for i in 0..n {
            let mut w = zero;
            for (j, vj) in v.iter().enumerate() {
                w += t[[i, k + 1 + j]] * vj;
            }
            let w = beta * w;
            for (j, vj) in v.iter().enumerate() {
                let update = w * vj.conj();
                t[[i, k + 1 + j]] -= update;
            }
        }
        if let Some(q) = q.as_mut() {
            for i in 0..n {
                let mut w = zero;
                for (j, vj) in v.iter().enumerate() {
                    w += q[[i, k + 1 + j]] * vj;
                }
                let w = beta * w;
                for (j, vj) in v.iter().enumerate() {
                    let update = w * vj.conj();
                    q[[i, k + 1 + j]] -= update;
                }
            }
        }
    }

    // Shifted QR iteration with deflation from the bottom
    let eps = f64::EPSILON;
    let max_sweeps = SWEEPS_PER_EIGENVALUE * n.max(1);
    let mut sweeps = 0usize;
    let mut hi = n;
    while hi > 1 {
        for i in 1..hi {
            let tol = eps * (t[[i - 1, i - 1]].norm() + t[[i, i]].norm());
            if t[[i, i - 1]].norm() <= tol {
                t[[i, i - 1]] = zero;
            }
        }
        if t[[hi - 1, hi - 2]].norm() == 0.0 {
            hi -= 1;
            continue;
        }
        let mut lo = hi - 1;
        while lo > 0 && t[[lo, lo - 1]].norm() != 0.0 {
            lo -= 1;
        }

        sweeps += 1;
        if sweeps > max_sweeps {
            return Err(EigenError::NoConvergence { sweeps });
        }

        // Wilkinson shift: eigenvalue of the trailing 2x2 closest to the
        // bottom corner
        let a11 = t[[hi - 2, hi - 2]];
        let a12 = t[[hi - 2, hi - 1]];
        let a21 = t[[hi - 1, hi - 2]];
        let a22 = t[[hi - 1, hi - 1]];
        let mid = (a11 + a22) / 2.0;
        let disc = ((a11 - a22) / 2.0 * ((a11 - a22) / 2.0) + a12 * a21).sqrt();
        let mu = if (mid + disc - a22).norm() <= (mid - disc - a22).norm() {
            mid + disc
        } else {
            mid - disc
        };

        for i in lo..hi {
            t[[i, i]] -= mu;
        }
        let mut rots = Vec::with_capacity(hi - 1 - lo);
        for i in lo..(hi - 1) {
            let (c, s) = givens(t[[i, i]], t[[i + 1, i]]);
            for j in i..n {
                let ti = t[[i, j]];
                let tn = t[[i + 1, j]];
                t[[i, j]] = c * ti + s * tn;
                t[[i + 1, j]] = -s.conj() * ti + c * tn;
            }
            rots.push((c, s));
        }
        for (idx, &(c, s)) in rots.iter().enumerate() {
            let col = lo + idx;
            for r in 0..(col + 2).min(n) {
                let tc = t[[r, col]];
                let tn = t[[r, col + 1]];
                t[[r, col]] = c * tc + s.conj() * tn;
                t[[r, col + 1]] = -s * tc + c * tn;
            }
            if let Some(q) = q.as_mut() {
                for r in 0..n {
                    let qc = q[[r, col]];
                    let qn = q[[r, col + 1]];
                    q[[r, col]] = c * qc + s.conj() * qn;
                    q[[r, col + 1]] = -s * qc + c * qn;
                }
            }
        }
        for i in lo..hi {
            t[[i, i]] += mu;
        }
    }

    Ok((t, q))
}

/// Eigenvalues of a general complex matrix.
pub fn eigvals(a: &Array2<Complex64>) -> Result<Array1<Complex64>, EigenError> {
    if a.nrows() != a.ncols() {
        return Err(EigenError::NotSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    let (t, _) = schur(a, false)?;
    Ok(Array1::from_iter((0..a.nrows()).map(|i| t[[i, i]])))
}

/// Eigenvalues and right eigenvectors of a general complex matrix.
///
/// Returns the eigenvalues and a matrix holding the corresponding unit
/// eigenvectors as columns. For defective matrices the returned columns
/// still satisfy the residual equation up to the conditioning of the
/// cluster.
pub fn eig(a: &Array2<Complex64>) -> Result<(Array1<Complex64>, Array2<Complex64>), EigenError> {
    if a.nrows() != a.ncols() {
        return Err(EigenError::NotSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    let n = a.nrows();
    let zero = Complex64::new(0.0, 0.0);
    let (t, q) = schur(a, true)?;
    let q = q.unwrap_or_else(|| Array2::eye(n));

    let values = Array1::from_iter((0..n).map(|i| t[[i, i]]));
    let tnorm = t.iter().map(|z| z.norm()).fold(0.0f64, f64::max);
    let floor = (f64::EPSILON * tnorm).max(f64::MIN_POSITIVE);

    let mut vectors = Array2::zeros((n, n));
    let mut y = vec![zero; n];
    for i in 0..n {
        let lam = t[[i, i]];
        y[i] = Complex64::new(1.0, 0.0);
        for j in (0..i).rev() {
            let mut s = zero;
            for k in (j + 1)..=i {
                s += t[[j, k]] * y[k];
            }
            let mut den = t[[j, j]] - lam;
            if den.norm() < floor {
                den = Complex64::new(floor, 0.0);
            }
            y[j] = -s / den;
        }
        let mut norm2 = 0.0;
        for r in 0..n {
            let mut s = zero;
            for k in 0..=i {
                s += q[[r, k]] * y[k];
            }
            vectors[[r, i]] = s;
            norm2 += s.norm_sqr();
        }
        let scale = 1.0 / norm2.sqrt();
        for r in 0..n {
            vectors[[r, i]] *= scale;
        }
    }
    Ok((values, vectors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn assert_eigenpairs(a: &Array2<Complex64>) {
        let (values, vectors) = eig(a).expect("eig should succeed");
        let anorm = a.iter().map(|z| z.norm()).fold(0.0f64, f64::max);
        for i in 0..a.nrows() {
            let v = vectors.column(i).to_owned();
            let av = a.dot(&v);
            let lv = v.mapv(|x| x * values[i]);
            let res: f64 = av
                .iter()
                .zip(lv.iter())
                .map(|(x, y)| (x - y).norm_sqr())
                .sum::<f64>()
                .sqrt();
            assert!(
                res <= 1e-9 * anorm.max(1.0),
                "residual {} for eigenvalue {}",
                res,
                values[i]
            );
        }
    }

    #[test]
    fn test_eig_diagonal() {
        let a = Array2::from_diag(&array![c(1.0, 0.0), c(2.0, -1.0), c(-3.0, 0.5)]);
        let mut values = eigvals(&a).expect("eigvals should succeed").to_vec();
        values.sort_by(|x, y| x.re.partial_cmp(&y.re).unwrap());
        assert_relative_eq!(values[0].re, -3.0, epsilon = 1e-12);
        assert_relative_eq!(values[0].im, 0.5, epsilon = 1e-12);
        assert_relative_eq!(values[2].re, 2.0, epsilon = 1e-12);
        assert_relative_eq!(values[2].im, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eig_exchange_matrix() {
        let a = array![[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let mut values = eigvals(&a).expect("eigvals should succeed").to_vec();
        values.sort_by(|x, y| x.re.partial_cmp(&y.re).unwrap());
        assert_relative_eq!(values[0].re, -1.0, epsilon = 1e-12);
        assert_relative_eq!(values[1].re, 1.0, epsilon = 1e-12);
        assert_eigenpairs(&a);
    }

    #[test]
    fn test_eig_rotation_matrix() {
        // planar rotation has eigenvalues ±i
        let a = array![[c(0.0, 0.0), c(-1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]];
        let mut values = eigvals(&a).expect("eigvals should succeed").to_vec();
        values.sort_by(|x, y| x.im.partial_cmp(&y.im).unwrap());
        assert_relative_eq!(values[0].re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(values[0].im, -1.0, epsilon = 1e-12);
        assert_relative_eq!(values[1].im, 1.0, epsilon = 1e-12);
        assert_eigenpairs(&a);
    }

    #[test]
    fn test_eig_companion_cubic() {
        // companion matrix of (x-1)(x-2)(x-3)
        let a = array![
            [c(0.0, 0.0), c(0.0, 0.0), c(6.0, 0.0)],
            [c(1.0, 0.0), c(0.0, 0.0), c(-11.0, 0.0)],
            [c(0.0, 0.0), c(1.0, 0.0), c(6.0, 0.0)],
        ];
        let mut values = eigvals(&a).expect("eigvals should succeed").to_vec();
        values.sort_by(|x, y| x.re.partial_cmp(&y.re).unwrap());
        for (got, want) in values.iter().zip([1.0, 2.0, 3.0]) {
            assert_relative_eq!(got.re, want, epsilon = 1e-9);
            assert_relative_eq!(got.im, 0.0, epsilon = 1e-9);
        }
        assert_eigenpairs(&a);
    }

    #[test]
    fn test_eig_dense_complex_residuals() {
        let a = array![
            [c(1.2, 0.3), c(-0.7, 1.1), c(0.4, 0.0), c(0.2, -0.5)],
            [c(0.9, -0.2), c(2.1, 0.0), c(-1.3, 0.6), c(0.0, 0.8)],
            [c(0.0, 1.4), c(0.5, 0.5), c(-0.8, -0.9), c(1.7, 0.1)],
            [c(-0.6, 0.0), c(1.0, -1.0), c(0.3, 0.2), c(0.9, 1.6)],
        ];
        assert_eigenpairs(&a);
        // trace equals the eigenvalue sum
        let values = eigvals(&a).expect("eigvals should succeed");
        let sum: Complex64 = values.iter().sum();
        assert_relative_eq!(sum.re, 1.2 + 2.1 - 0.8 + 0.9, epsilon = 1e-9);
        assert_relative_eq!(sum.im, 0.3 + 0.0 - 0.9 + 1.6, epsilon = 1e-9);
    }

    #[test]
    fn test_eig_not_square() {
        let a = Array2::<Complex64>::zeros((2, 3));
        assert!(matches!(
            eigvals(&a),
            Err(EigenError::NotSquare { rows: 2, cols: 3 })
        ));
    }
}
