//! Special (mathematical) functions for acoustic wave scattering.
//!
//! This crate collects the closed-form machinery behind the T-matrix method
//! for scalar (pressure) waves:
//!
//! - Spherical and cylindrical Bessel/Hankel functions for real and complex
//!   arguments ([`bessel`])
//! - The complex error function and the incomplete-gamma-type integrals of
//!   the Ewald method ([`erf`], [`gamma`])
//! - Legendre functions and spherical harmonics, including the analytic
//!   continuation to complex polar angles needed for evanescent diffraction
//!   orders ([`legendre`])
//! - Wigner d- and D-matrix elements and Wigner 3j symbols ([`wigner`])
//! - Coordinate transformations between Cartesian, cylindrical and
//!   spherical frames ([`coord`])
//! - The scalar wave functions of the three basis families and their
//!   velocity companions ([`waves`])
//! - Translation, rotation and basis-conversion coefficients ([`translations`])
//! - Exponentially convergent lattice sums for periodic arrays ([`lattice`])
//!
//! All functions use the `exp(-iωt)` time convention, so outgoing waves are
//! built on Hankel functions of the first kind.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::many_single_char_names)]

pub mod bessel;
pub mod coord;
pub mod erf;
pub mod gamma;
pub mod lattice;
pub mod legendre;
pub mod translations;
pub mod waves;
pub mod wigner;

pub use bessel::{
    besselj, besselj_d, bessely, hankel1, hankel1_d, spherical_bessel_j, spherical_bessel_j_c,
    spherical_bessel_j_derivative, spherical_bessel_y, spherical_bessel_y_c, spherical_hankel1,
    spherical_hankel1_c,
};
pub use coord::{car2cyl, car2pol, car2sph, cyl2car, cyl2sph, pol2car, sph2car, sph2cyl};
pub use erf::{erfc_c, faddeeva};
pub use gamma::{
    branch_sqrt, ewald_integral, ewald_integral_range, expint_e1, incgamma, kambe_integral,
    kambe_integral_range,
};
pub use lattice::{lsum_cw_1d, lsum_cw_2d, lsum_sw_1d, lsum_sw_2d, lsum_sw_3d};
pub use legendre::{assoc_legendre, assoc_legendre_c, legendre_norm, lpmv, sph_harm};
pub use translations::{
    scw_periodic_to_spw, scw_rotate, scw_to_ssw, spw_permute_xyz, spw_to_scw, spw_to_ssw,
    spw_translate, ssw_periodic_to_scw, ssw_periodic_to_spw, ssw_rotate, tl_scw, tl_ssw,
};
pub use waves::{
    scw_psi, scw_rpsi, spw_psi, ssw_psi, ssw_rpsi, vcw_l, vcw_rl, vpw_l, vsw_l, vsw_rl,
};
pub use wigner::{gaunt, wigner3j, wignerd, wignersmalld};
