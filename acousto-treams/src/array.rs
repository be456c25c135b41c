//! Coefficient arrays carrying their physical context.
//!
//! An [`AcousticsArray`] bundles the expansion coefficients of a field
//! with the basis they refer to, the vacuum wave number, the embedding
//! material, and the mode type. Periodic fields additionally carry their
//! lattice and Bloch wave vector. The methods wrap the matrices of
//! [`crate::operators`] and keep these annotations consistent, erroring
//! out instead of silently combining incompatible fields.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::basis::{AcousticBasis, ModeType, ScalarPlaneWaveBasisByComp};
use crate::error::{AcousticsError, Result};
use crate::lattice::{Lattice, WaveVector};
use crate::material::AcousticMaterial;
use crate::operators;

/// Expansion coefficients of a scalar acoustic field.
#[derive(Clone, Debug)]
pub struct AcousticsArray {
    /// Coefficient of every mode of `basis`, in basis order
    pub data: Array1<Complex64>,
    /// Basis the coefficients refer to
    pub basis: AcousticBasis,
    /// Vacuum wave number
    pub k0: f64,
    /// Embedding material
    pub material: AcousticMaterial,
    /// Mode type of the expansion
    pub modetype: ModeType,
    /// Lattice of a periodic arrangement
    pub lattice: Option<Lattice>,
    /// Bloch wave vector of a periodic arrangement
    pub kpar: Option<WaveVector>,
}

impl AcousticsArray {
    /// Create an array, checking that the data matches the basis size.
    pub fn new(
        data: Array1<Complex64>,
        basis: AcousticBasis,
        k0: f64,
        material: AcousticMaterial,
        modetype: ModeType,
    ) -> Result<Self> {
        if data.len() != basis.len() {
            return Err(AcousticsError::DimensionMismatch {
                expected: basis.len(),
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            basis,
            k0,
            material,
            modetype,
            lattice: None,
            kpar: None,
        })
    }

    /// Attach lattice and Bloch wave vector annotations.
    pub fn with_lattice(mut self, lattice: Lattice, kpar: WaveVector) -> Self {
        self.lattice = Some(lattice);
        self.kpar = Some(kpar);
        self
    }

    /// Wave number in the embedding material.
    pub fn ks(&self) -> Complex64 {
        self.material.ks(self.k0)
    }

    /// Rotate the field by the Euler angles `phi`, `theta`, `psi`.
    ///
    /// The result is expanded in the rotated basis, so plane wave
    /// directions and expansion centers move along with the field.
    /// Lattice annotations do not survive a rotation.
    pub fn rotate(&self, phi: f64, theta: f64, psi: f64) -> Result<Self> {
        let basis = operators::rotate_basis(&self.basis, phi, theta, psi)?;
        let mat = operators::rotate(&basis, &self.basis, phi, theta, psi)?;
        Ok(Self {
            data: mat.dot(&self.data),
            basis,
            k0: self.k0,
            material: self.material,
            modetype: self.modetype,
            lattice: None,
            kpar: None,
        })
    }

    /// Translate the field by the vector `r`.
    pub fn translate(&self, r: [f64; 3]) -> Result<Self> {
        let mat = operators::translate(
            &self.basis,
            &self.basis,
            r,
            self.k0,
            &self.material,
            self.modetype,
        )?;
        Ok(Self {
            data: mat.dot(&self.data),
            basis: self.basis.clone(),
            k0: self.k0,
            material: self.material,
            modetype: self.modetype,
            lattice: self.lattice,
            kpar: self.kpar,
        })
    }

    /// Re-expand the field in another basis.
    ///
    /// Singular fields expanded at distinct origins turn into regular
    /// fields, all other combinations keep the wave kind. The expansion
    /// holds only where the underlying addition theorem converges.
    pub fn expand(&self, basis: &AcousticBasis, modetype: ModeType) -> Result<Self> {
        let mat = operators::expand(
            basis,
            modetype,
            &self.basis,
            self.modetype,
            self.k0,
            &self.material,
        )?;
        Ok(Self {
            data: mat.dot(&self.data),
            basis: basis.clone(),
            k0: self.k0,
            material: self.material,
            modetype,
            lattice: None,
            kpar: None,
        })
    }

    /// Sum the field over all lattice copies and re-expand it.
    ///
    /// The field must be singular. Within one basis family the result is
    /// the regular field that all copies produce in the central unit
    /// cell. A z-periodic spherical field can instead be re-expanded in
    /// singular cylindrical waves.
    pub fn expand_lattice(
        &self,
        basis: &AcousticBasis,
        lattice: &Lattice,
        kpar: &[f64],
    ) -> Result<Self> {
        if self.modetype != ModeType::Singular {
            return Err(AcousticsError::InvalidMode(
                "lattice expansion starts from a singular field".into(),
            ));
        }
        let modetype = match (basis, &self.basis) {
            (AcousticBasis::Cylindrical(_), AcousticBasis::Spherical(_)) => ModeType::Singular,
            _ => ModeType::Regular,
        };
        let mat =
            operators::expand_lattice(basis, &self.basis, lattice, kpar, self.k0, &self.material)?;
        let bloch = lattice.bloch_vector(kpar)?;
        let kpar_ann = match &self.kpar {
            Some(old) => old.merge(&bloch)?,
            None => bloch,
        };
        if let Some(old) = &self.lattice {
            if old != lattice {
                return Err(AcousticsError::AnnotationMismatch(
                    "lattice annotations differ".into(),
                ));
            }
        }
        Ok(Self {
            data: mat.dot(&self.data),
            basis: basis.clone(),
            k0: self.k0,
            material: self.material,
            modetype,
            lattice: Some(*lattice),
            kpar: Some(kpar_ann),
        })
    }

    /// Diffract the periodic field into plane waves.
    ///
    /// Requires a lattice annotation on the field. The output basis
    /// usually comes from
    /// [`ScalarPlaneWaveBasisByComp::diffr_orders`].
    pub fn periodic_to_plane(
        &self,
        out: &ScalarPlaneWaveBasisByComp,
        modetype: ModeType,
    ) -> Result<Self> {
        if self.modetype != ModeType::Singular {
            return Err(AcousticsError::InvalidMode(
                "diffraction starts from a singular field".into(),
            ));
        }
        let lattice = self.lattice.ok_or_else(|| {
            AcousticsError::InvalidLattice("field carries no lattice annotation".into())
        })?;
        let mat = operators::periodic_to_plane(
            out,
            modetype,
            &self.basis,
            &lattice,
            self.k0,
            &self.material,
        )?;
        Ok(Self {
            data: mat.dot(&self.data),
            basis: AcousticBasis::PlaneComp(out.clone()),
            k0: self.k0,
            material: self.material,
            modetype,
            lattice: self.lattice,
            kpar: self.kpar,
        })
    }

    /// Cycle the coordinate axes, x to y, y to z, z to x.
    pub fn permute(&self) -> Result<Self> {
        let (basis, mat) = operators::permute(&self.basis)?;
        Ok(Self {
            data: mat.dot(&self.data),
            basis,
            k0: self.k0,
            material: self.material,
            modetype: self.modetype,
            lattice: None,
            kpar: None,
        })
    }

    /// Pressure at the given points.
    pub fn pfield(&self, points: &[[f64; 3]]) -> Result<Array1<Complex64>> {
        let mat = operators::pfield(points, &self.basis, self.k0, &self.material, self.modetype)?;
        Ok(mat.dot(&self.data))
    }

    /// Velocity at the given points, Cartesian components per row.
    pub fn vfield(&self, points: &[[f64; 3]]) -> Result<Array2<Complex64>> {
        let mat = operators::vfield(points, &self.basis, self.k0, &self.material, self.modetype)?;
        Ok(contract_modes(&mat, &self.data))
    }

    /// Far-field pressure amplitude in the given directions.
    ///
    /// The amplitude multiplies `exp(i ks r) / r` for spherical waves and
    /// `exp(i krho rho) / sqrt(rho)` for cylindrical waves.
    pub fn pamplitude_ff(&self, dirs: &[[f64; 3]]) -> Result<Array1<Complex64>> {
        self.require_singular()?;
        let mat = operators::pamplitude_ff(dirs, &self.basis, self.k0, &self.material)?;
        Ok(mat.dot(&self.data))
    }

    /// Far-field velocity amplitude along the propagation direction.
    pub fn vamplitude_ff(&self, dirs: &[[f64; 3]]) -> Result<Array2<Complex64>> {
        self.require_singular()?;
        let mat = operators::vamplitude_ff(dirs, &self.basis, self.k0, &self.material)?;
        Ok(contract_modes(&mat, &self.data))
    }

    /// Add two fields over the same basis and context.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        if self.basis != other.basis {
            return Err(AcousticsError::AnnotationMismatch(
                "bases differ".into(),
            ));
        }
        if self.k0 != other.k0 || self.material != other.material {
            return Err(AcousticsError::AnnotationMismatch(
                "wave number or material differ".into(),
            ));
        }
        if self.modetype != other.modetype {
            return Err(AcousticsError::AnnotationMismatch(
                "mode types differ".into(),
            ));
        }
        let lattice = match (&self.lattice, &other.lattice) {
            (Some(a), Some(b)) if a != b => {
                return Err(AcousticsError::AnnotationMismatch(
                    "lattice annotations differ".into(),
                ))
            }
            (Some(a), _) => Some(*a),
            (None, b) => *b,
        };
        let kpar = match (&self.kpar, &other.kpar) {
            (Some(a), Some(b)) => Some(a.merge(b)?),
            (Some(a), None) => Some(*a),
            (None, b) => *b,
        };
        Ok(Self {
            data: &self.data + &other.data,
            basis: self.basis.clone(),
            k0: self.k0,
            material: self.material,
            modetype: self.modetype,
            lattice,
            kpar,
        })
    }

    fn require_singular(&self) -> Result<()> {
        if self.modetype != ModeType::Singular {
            return Err(AcousticsError::InvalidMode(
                "far fields exist for singular waves only".into(),
            ));
        }
        Ok(())
    }
}

fn contract_modes(
    mat: &ndarray::Array3<Complex64>,
    data: &Array1<Complex64>,
) -> Array2<Complex64> {
    let (npoints, nmodes, _) = mat.dim();
    let mut out = Array2::zeros((npoints, 3));
    for a in 0..npoints {
        for c in 0..nmodes {
            for x in 0..3 {
                out[[a, x]] += mat[[a, c, x]] * data[c];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{ScalarPlaneWaveBasisByUnitVector, ScalarSphericalWaveBasis};
    use crate::lattice::Axis;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn monopole() -> AcousticsArray {
        let basis = AcousticBasis::Spherical(ScalarSphericalWaveBasis::default(0));
        AcousticsArray::new(
            array![Complex64::new(1.0, 0.0)],
            basis,
            1.3,
            AcousticMaterial::default(),
            ModeType::Singular,
        )
        .unwrap()
    }

    #[test]
    fn monopole_pressure_and_far_field() {
        let arr = monopole();
        let p = arr.pfield(&[[0.0, 0.0, 2.0]]).unwrap();
        // h_0(x) = -i exp(ix) / x over Y_00
        let x = 2.0 * 1.3;
        let want = -Complex64::i() * Complex64::new(0.0, x).exp() / x
            / (4.0 * std::f64::consts::PI).sqrt();
        assert_abs_diff_eq!(p[0].re, want.re, epsilon = 1e-14);
        assert_abs_diff_eq!(p[0].im, want.im, epsilon = 1e-14);

        let a = arr.pamplitude_ff(&[[0.0, 0.0, 1.0]]).unwrap();
        let want = -Complex64::i() / (1.3 * (4.0 * std::f64::consts::PI).sqrt());
        assert_abs_diff_eq!(a[0].re, want.re, epsilon = 1e-14);
        assert_abs_diff_eq!(a[0].im, want.im, epsilon = 1e-14);

        let v = arr.vamplitude_ff(&[[0.0, 0.0, 1.0]]).unwrap();
        let fac = arr.ks() / (1.3 * arr.material.rho);
        assert_abs_diff_eq!(v[[0, 0]].re, (fac * want).re, epsilon = 1e-14);
        assert_abs_diff_eq!(v[[0, 1]].norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn rotation_about_z_is_a_phase() {
        let basis = AcousticBasis::Spherical(ScalarSphericalWaveBasis::default(1));
        let arr = AcousticsArray::new(
            Array1::from_elem(4, Complex64::new(1.0, 0.0)),
            basis,
            1.0,
            AcousticMaterial::default(),
            ModeType::Regular,
        )
        .unwrap();
        let rot = arr.rotate(0.4, 0.0, 0.0).unwrap();
        // modes are (0,0), (1,-1), (1,0), (1,1)
        for (i, m) in [0i32, -1, 0, 1].iter().enumerate() {
            let want = Complex64::new(0.0, -(*m as f64) * 0.4).exp();
            assert_abs_diff_eq!(rot.data[i].re, want.re, epsilon = 1e-14);
            assert_abs_diff_eq!(rot.data[i].im, want.im, epsilon = 1e-14);
        }
    }

    #[test]
    fn translate_roundtrip_plane_wave() {
        let basis = AcousticBasis::PlaneUnitVector(
            ScalarPlaneWaveBasisByUnitVector::new(&[[0.0, 0.6, 0.8], [1.0, 0.0, 0.0]]).unwrap(),
        );
        let arr = AcousticsArray::new(
            array![Complex64::new(1.0, 0.5), Complex64::new(-0.25, 0.0)],
            basis,
            2.0,
            AcousticMaterial::default(),
            ModeType::Up,
        )
        .unwrap();
        let r = [0.3, -0.8, 1.1];
        let back = arr
            .translate(r)
            .unwrap()
            .translate([-r[0], -r[1], -r[2]])
            .unwrap();
        for i in 0..2 {
            assert_abs_diff_eq!(back.data[i].re, arr.data[i].re, epsilon = 1e-14);
            assert_abs_diff_eq!(back.data[i].im, arr.data[i].im, epsilon = 1e-14);
        }
    }

    #[test]
    fn lattice_expansion_annotates() {
        let arr = monopole();
        let basis = arr.basis.clone();
        let lat = Lattice::one_d(2.0, Axis::Z);
        let out = arr.expand_lattice(&basis, &lat, &[0.3]).unwrap();
        assert_eq!(out.modetype, ModeType::Regular);
        assert_eq!(out.lattice, Some(lat));
        assert_eq!(out.kpar, Some(WaveVector::from_kz(0.3)));

        let regular = AcousticsArray {
            modetype: ModeType::Regular,
            ..arr
        };
        assert!(regular.expand_lattice(&basis, &lat, &[0.3]).is_err());
    }

    #[test]
    fn checked_add_rejects_mismatched_context() {
        let a = monopole();
        let mut b = a.clone();
        let sum = a.checked_add(&b).unwrap();
        assert_abs_diff_eq!(sum.data[0].re, 2.0, epsilon = 1e-14);
        b.k0 = 2.0;
        assert!(a.checked_add(&b).is_err());
    }
}
