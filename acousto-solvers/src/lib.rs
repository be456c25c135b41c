//! Dense complex linear algebra for scattering calculations.
//!
//! The interaction problems of coupled scatterers, the star products of
//! layered systems and the band structures of periodic stacks all reduce
//! to dense complex matrices of moderate size. This crate provides the
//! two direct kernels those reductions need:
//!
//! - [`lu_factorize`]/[`lu_solve`]: LU decomposition with partial
//!   pivoting, with solves for single and block right-hand sides and
//!   explicit inversion,
//! - [`eig`]: eigenvalues and eigenvectors of a general complex matrix
//!   through Hessenberg reduction and the shifted QR iteration.

pub mod eigen;
pub mod lu;

pub use eigen::{eig, eigvals, EigenError};
pub use lu::{lu_factorize, lu_solve, lu_solve_mat, LuError, LuFactorization};
