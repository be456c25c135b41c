//! Homogeneous acoustic materials.
//!
//! A material is described by its mass density and its longitudinal and
//! transverse sound speeds. Fluids have a vanishing transverse speed.
//! Lossy media are expressed through complex densities and speeds.
//!
//! Wave numbers are referenced to the speed of sound in air: an object
//! with vacuum wave number `k0` has, in a medium with longitudinal speed
//! `c`, the wave number `ks = k0 * C_REF / c`.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::sqrt_up;

/// Reference speed of sound in air in m/s.
pub const C_REF: f64 = 343.0;

/// Acoustic material parameters.
///
/// The default material is air with a density of 1.3 kg/m³.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcousticMaterial {
    /// Mass density in kg/m³
    pub rho: Complex64,
    /// Longitudinal speed of sound in m/s
    pub c: Complex64,
    /// Transverse speed of sound in m/s, zero for fluids
    pub ct: Complex64,
}

impl Default for AcousticMaterial {
    fn default() -> Self {
        Self {
            rho: Complex64::new(1.3, 0.0),
            c: Complex64::new(C_REF, 0.0),
            ct: Complex64::new(0.0, 0.0),
        }
    }
}

impl AcousticMaterial {
    /// Create a material from density and both sound speeds.
    pub fn new(
        rho: impl Into<Complex64>,
        c: impl Into<Complex64>,
        ct: impl Into<Complex64>,
    ) -> Self {
        Self {
            rho: rho.into(),
            c: c.into(),
            ct: ct.into(),
        }
    }

    /// Create a fluid material from density and longitudinal sound speed.
    pub fn fluid(rho: impl Into<Complex64>, c: impl Into<Complex64>) -> Self {
        Self::new(rho, c, 0.0)
    }

    /// True if the material does not support transverse waves.
    pub fn is_fluid(&self) -> bool {
        self.ct == Complex64::new(0.0, 0.0)
    }

    /// True if all parameters are real, so no absorption takes place.
    pub fn is_lossless(&self) -> bool {
        self.rho.im == 0.0 && self.c.im == 0.0 && self.ct.im == 0.0
    }

    /// Longitudinal wave number at vacuum wave number `k0`.
    pub fn ks(&self, k0: f64) -> Complex64 {
        k0 * C_REF / self.c
    }

    /// Transverse wave number at vacuum wave number `k0`.
    ///
    /// Fluids carry no transverse waves and give `None`.
    pub fn kst(&self, k0: f64) -> Option<Complex64> {
        if self.is_fluid() {
            None
        } else {
            Some(k0 * C_REF / self.ct)
        }
    }

    /// Characteristic impedance `rho * c`.
    pub fn impedance(&self) -> Complex64 {
        self.rho * self.c
    }

    /// Radial wave number components for the given axial components.
    ///
    /// Each entry is `sqrt(ks² - kz²)` with nonnegative imaginary part,
    /// so modes beyond the sound cone become evanescent.
    pub fn krhos(&self, k0: f64, kzs: &[f64]) -> Vec<Complex64> {
        let ks = self.ks(k0);
        kzs.iter()
            .map(|&kz| sqrt_up(ks * ks - Complex64::new(kz * kz, 0.0)))
            .collect()
    }

    /// Axial wave number component for the given tangential components.
    pub fn kzs(&self, k0: f64, kx: f64, ky: f64) -> Complex64 {
        let ks = self.ks(k0);
        sqrt_up(ks * ks - Complex64::new(kx * kx + ky * ky, 0.0))
    }
}

impl fmt::Display for AcousticMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AcousticMaterial({}, {}, {})",
            self.rho, self.c, self.ct
        )
    }
}

impl From<()> for AcousticMaterial {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<f64> for AcousticMaterial {
    fn from(rho: f64) -> Self {
        Self::new(rho, C_REF, 0.0)
    }
}

impl From<(f64, f64)> for AcousticMaterial {
    fn from((rho, c): (f64, f64)) -> Self {
        Self::new(rho, c, 0.0)
    }
}

impl From<(f64, f64, f64)> for AcousticMaterial {
    fn from((rho, c, ct): (f64, f64, f64)) -> Self {
        Self::new(rho, c, ct)
    }
}

impl From<(Complex64, Complex64)> for AcousticMaterial {
    fn from((rho, c): (Complex64, Complex64)) -> Self {
        Self::new(rho, c, 0.0)
    }
}

impl From<(Complex64, Complex64, Complex64)> for AcousticMaterial {
    fn from((rho, c, ct): (Complex64, Complex64, Complex64)) -> Self {
        Self::new(rho, c, ct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_is_air() {
        let mat = AcousticMaterial::default();
        assert_eq!(mat.rho.re, 1.3);
        assert_eq!(mat.c.re, C_REF);
        assert!(mat.is_fluid());
        assert!(mat.is_lossless());
    }

    #[test]
    fn wave_number_scaling() {
        let mat = AcousticMaterial::from((1000.0, 686.0));
        let ks = mat.ks(2.0);
        assert_abs_diff_eq!(ks.re, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(ks.im, 0.0);
        assert!(mat.kst(2.0).is_none());
        let solid = AcousticMaterial::from((1000.0, 686.0, 343.0));
        let kst = solid.kst(2.0).unwrap();
        assert_abs_diff_eq!(kst.re, 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(kst.im, 0.0);
    }

    #[test]
    fn radial_components_follow_sound_cone() {
        // ks = 3, so kz = 5 lies outside the cone
        let mat = AcousticMaterial::from(1.3);
        let krhos = mat.krhos(3.0, &[0.0, 5.0]);
        assert_abs_diff_eq!(krhos[0].re, 3.0, epsilon = 1e-14);
        assert_abs_diff_eq!(krhos[0].im, 0.0);
        assert_abs_diff_eq!(krhos[1].re, 0.0);
        assert_abs_diff_eq!(krhos[1].im, 4.0, epsilon = 1e-14);
    }

    #[test]
    fn conversions() {
        let a = AcousticMaterial::from(900.0);
        assert_eq!(a.c.re, C_REF);
        assert!(a.is_fluid());
        let b = AcousticMaterial::from((200.0, 1000.0, 500.0));
        assert!(!b.is_fluid());
        let c = AcousticMaterial::from((
            Complex64::new(200.0, 10.0),
            Complex64::new(1000.0, -100.0),
        ));
        assert!(!c.is_lossless());
        assert!(c.is_fluid());
    }
}
