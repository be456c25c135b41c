//! T-matrix method for acoustic wave scattering.
//!
//! This crate solves scattering of scalar (pressure) waves at individual
//! particles, finite clusters, and periodic arrangements:
//!
//! - Spherical, cylindrical and plane wave bases with multiple expansion
//!   origins ([`basis`])
//! - Fluid and isotropic elastic materials with complex parameters
//!   ([`material`])
//! - Mie coefficients of layered spheres and infinite cylinders
//!   ([`coeffs`])
//! - One-, two- and three-dimensional lattices and Bloch vectors
//!   ([`lattice`])
//! - Rotation, translation, basis change and lattice coupling as explicit
//!   matrices ([`operators`])
//! - Expansion coefficient vectors with their physical annotations
//!   ([`array`]) and common illuminations ([`source`])
//! - T-matrices in the spherical ([`tmatrix`]) and cylindrical
//!   ([`tmatrixc`]) basis, with multiple scattering and cross sections
//! - Plane wave S-matrices of stratified structures ([`smatrix`])
//!
//! All quantities use the `exp(-iωt)` time convention and wave numbers are
//! referred to a sound speed of [`C_REF`] at vacuum wave number `k0`.
//!
//! # Example
//!
//! ```rust
//! use acoustotreams::{plane_wave_scalar, AcousticMaterial, AcousticTMatrix};
//!
//! let water = AcousticMaterial::fluid(998.0, 1497.0);
//! let air = AcousticMaterial::default();
//! let tm = AcousticTMatrix::sphere(4, 100.0, 0.015, &[air, water]).unwrap();
//! let illu = plane_wave_scalar(
//!     &[0.0, 0.0, 1.0],
//!     tm.k0,
//!     Some(&tm.basis.clone().into()),
//!     tm.material,
//!     None,
//! )
//! .unwrap();
//! let (sca, ext) = tm.xs(&illu, 1.0).unwrap();
//! assert!(sca <= ext * (1.0 + 1e-10));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod array;
pub mod basis;
pub mod coeffs;
pub mod error;
pub mod lattice;
pub mod material;
pub mod operators;
pub mod smatrix;
pub mod source;
pub mod tmatrix;
pub mod tmatrixc;
mod util;

pub use array::AcousticsArray;
pub use basis::{
    AcousticBasis, Alignment, ModeType, ScalarCylindricalWaveBasis, ScalarPlaneWaveBasisByComp,
    ScalarPlaneWaveBasisByUnitVector, ScalarSphericalWaveBasis,
};
pub use coeffs::{mie_acoustics, mie_acoustics_cyl};
pub use error::{AcousticsError, Result};
pub use lattice::{Axis, Lattice, WaveVector};
pub use material::{AcousticMaterial, C_REF};
pub use smatrix::AcousticSMatrices;
pub use source::{cylindrical_wave_scalar, plane_wave_scalar, spherical_wave_scalar};
pub use tmatrix::AcousticTMatrix;
pub use tmatrixc::AcousticTMatrixC;
