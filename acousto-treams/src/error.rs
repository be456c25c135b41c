//! Error types shared across the crate.

use thiserror::Error;

/// Errors raised while building bases, assembling operators, or solving
/// scattering problems.
#[derive(Error, Debug)]
pub enum AcousticsError {
    /// A mode tuple violates the constraints of its basis set.
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Two objects refer to bases that cannot be combined.
    #[error("incompatible bases: {0}")]
    IncompatibleBasis(String),

    /// A material parameter is outside the supported range.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// A lattice has the wrong dimension or alignment for the operation.
    #[error("invalid lattice: {0}")]
    InvalidLattice(String),

    /// Array lengths or matrix shapes do not match.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length or dimension
        expected: usize,
        /// Received length or dimension
        got: usize,
    },

    /// Objects carry different wave numbers, materials, or annotations.
    #[error("incompatible annotations: {0}")]
    AnnotationMismatch(String),

    /// A dense linear solve failed.
    #[error(transparent)]
    Linalg(#[from] acousto_solvers::LuError),

    /// An eigenvalue computation failed.
    #[error(transparent)]
    Eigen(#[from] acousto_solvers::EigenError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AcousticsError>;
