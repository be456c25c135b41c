//! LU decomposition with partial pivoting for dense complex systems.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use thiserror::Error;

const PIVOT_TOL: f64 = 1e-30;

/// Errors that can occur during factorization and solving.
#[derive(Error, Debug)]
pub enum LuError {
    #[error("matrix is singular or nearly singular")]
    SingularMatrix,
    #[error("matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// LU factorization result.
///
/// Stores the combined factors together with the pivot rows, so several
/// right-hand sides can be solved against one factorization.
#[derive(Debug, Clone)]
pub struct LuFactorization {
    /// Combined L and U matrices (L is unit lower triangular, stored below
    /// the diagonal)
    pub lu: Array2<Complex64>,
    /// Row interchanged with row `k` at elimination step `k`
    pub pivots: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl LuFactorization {
    /// Solve `Ax = b` using the pre-computed factorization.
    pub fn solve(&self, b: &Array1<Complex64>) -> Result<Array1<Complex64>, LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }

        let mut x = b.clone();

        // Replay the row interchanges in elimination order
        for i in 0..self.n {
            let pivot = self.pivots[i];
            if pivot != i {
                x.swap(i, pivot);
            }
        }

        // Forward substitution: Ly = Pb
        for i in 0..self.n {
            for j in 0..i {
                let l_ij = self.lu[[i, j]];
                let update = l_ij * x[j];
                x[i] -= update;
            }
        }

        // Backward substitution: Ux = y
        for i in (0..self.n).rev() {
            for j in (i + 1)..self.n {
                let u_ij = self.lu[[i, j]];
                let update = u_ij * x[j];
                x[i] -= update;
            }
            let u_ii = self.lu[[i, i]];
            if u_ii.norm() < PIVOT_TOL {
                return Err(LuError::SingularMatrix);
            }
            x[i] /= u_ii;
        }

        Ok(x)
    }

    /// Solve `AX = B` column by column for a block right-hand side.
    pub fn solve_mat(&self, b: &Array2<Complex64>) -> Result<Array2<Complex64>, LuError> {
        if b.nrows() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.nrows(),
            });
        }
        let mut x = Array2::zeros((self.n, b.ncols()));
        for (j, col) in b.columns().into_iter().enumerate() {
            let xj = self.solve(&col.to_owned())?;
            x.column_mut(j).assign(&xj);
        }
        Ok(x)
    }

    /// Explicit inverse, by solving against the identity.
    pub fn inverse(&self) -> Result<Array2<Complex64>, LuError> {
        self.solve_mat(&Array2::eye(self.n))
    }
}

/// Compute the LU factorization with partial pivoting.
pub fn lu_factorize(a: &Array2<Complex64>) -> Result<LuFactorization, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let mut lu = a.clone();
    let mut pivots = vec![0usize; n];

    for k in 0..n {
        // Find pivot
        let mut max_val = lu[[k, k]].norm();
        let mut max_row = k;

        for i in (k + 1)..n {
            let val = lu[[i, k]].norm();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        // Check for singularity
        if max_val < PIVOT_TOL {
            return Err(LuError::SingularMatrix);
        }

        // Swap rows if needed
        pivots[k] = max_row;
        if max_row != k {
            for j in 0..n {
                let tmp = lu[[k, j]];
                lu[[k, j]] = lu[[max_row, j]];
                lu[[max_row, j]] = tmp;
            }
        }

        // Compute multipliers and eliminate
        let pivot = lu[[k, k]];
        for i in (k + 1)..n {
            let mult = lu[[i, k]] / pivot;
            lu[[i, k]] = mult; // Store multiplier in L part

            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, pivots, n })
}

/// Solve `Ax = b` by LU decomposition.
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve(
    a: &Array2<Complex64>,
    b: &Array1<Complex64>,
) -> Result<Array1<Complex64>, LuError> {
    let factorization = lu_factorize(a)?;
    factorization.solve(b)
}

/// Solve `AX = B` for a block right-hand side.
pub fn lu_solve_mat(
    a: &Array2<Complex64>,
    b: &Array2<Complex64>,
) -> Result<Array2<Complex64>, LuError> {
    let factorization = lu_factorize(a)?;
    factorization.solve_mat(b)
}
