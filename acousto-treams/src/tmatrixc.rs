//! Acoustic T-matrices over cylindrical waves.
//!
//! The cylindrical analog of [`crate::tmatrix::AcousticTMatrix`] for
//! structures extended along z: infinite cylinders, or z-periodic
//! columns of compact scatterers condensed through
//! [`AcousticTMatrixC::from_array`]. Cross sections turn into widths per
//! unit length, and lattice interactions run over one or two of the
//! remaining directions.

use ndarray::Array2;
use num_complex::Complex64;

use acousto_solvers::lu_solve_mat;
use acousto_special::{car2cyl, scw_to_ssw, ssw_periodic_to_scw, tl_scw};

use crate::array::AcousticsArray;
use crate::basis::{AcousticBasis, ModeType, ScalarCylindricalWaveBasis};
use crate::coeffs::mie_acoustics_cyl;
use crate::error::{AcousticsError, Result};
use crate::lattice::{Lattice, WaveVector};
use crate::material::AcousticMaterial;
use crate::operators;
use crate::tmatrix::AcousticTMatrix;
use crate::util::{par_matrix, sqrt_up, sub3};

/// T-matrix of one or several scatterers extended along z.
#[derive(Clone, Debug)]
pub struct AcousticTMatrixC {
    /// Scattered coefficients per unit incident coefficient
    pub data: Array2<Complex64>,
    /// Cylindrical wave basis of rows and columns alike
    pub basis: ScalarCylindricalWaveBasis,
    /// Vacuum wave number
    pub k0: f64,
    /// Embedding material
    pub material: AcousticMaterial,
    /// Lattice of a periodic arrangement
    pub lattice: Option<Lattice>,
    /// Bloch wave vector of a periodic arrangement
    pub kpar: Option<WaveVector>,
}

impl AcousticTMatrixC {
    /// Create a T-matrix, checking dimensions and the embedding.
    pub fn new(
        data: Array2<Complex64>,
        basis: ScalarCylindricalWaveBasis,
        k0: f64,
        material: AcousticMaterial,
    ) -> Result<Self> {
        if data.nrows() != basis.len() || data.ncols() != basis.len() {
            return Err(AcousticsError::DimensionMismatch {
                expected: basis.len(),
                got: data.nrows().max(data.ncols()),
            });
        }
        if !material.is_fluid() {
            return Err(AcousticsError::InvalidMaterial(
                "embedding material must be a fluid".into(),
            ));
        }
        Ok(Self {
            data,
            basis,
            k0,
            material,
            lattice: None,
            kpar: None,
        })
    }

    /// T-matrix of an infinite cylinder on the z axis.
    ///
    /// One diagonal block per axial wave number in `kzs`, with azimuthal
    /// orders up to `mmax`. `materials` holds the cylinder material and
    /// the embedding.
    pub fn cylinder(
        kzs: &[f64],
        mmax: i64,
        k0: f64,
        radius: f64,
        materials: &[AcousticMaterial],
    ) -> Result<Self> {
        if materials.len() != 2 {
            return Err(AcousticsError::InvalidMaterial(
                "a cylinder separates exactly two materials".into(),
            ));
        }
        let basis = ScalarCylindricalWaveBasis::default_at(kzs, mmax, &[[0.0; 3]])?;
        let mut data = Array2::zeros((basis.len(), basis.len()));
        for i in 0..basis.len() {
            let (_, kz, m) = basis.mode(i);
            data[[i, i]] = mie_acoustics_cyl(kz, m, k0, radius, &materials[0], &materials[1])?;
        }
        Self::new(data, basis, k0, materials[1])
    }

    /// Block-diagonal T-matrix of isolated scatterers at given positions.
    pub fn cluster(tmatrices: &[Self], positions: &[[f64; 3]]) -> Result<Self> {
        if tmatrices.is_empty() || tmatrices.len() != positions.len() {
            return Err(AcousticsError::DimensionMismatch {
                expected: positions.len(),
                got: tmatrices.len(),
            });
        }
        let first = &tmatrices[0];
        let mut modes = Vec::new();
        let mut dim = 0;
        for (i, tm) in tmatrices.iter().enumerate() {
            if tm.k0 != first.k0 || tm.material != first.material {
                return Err(AcousticsError::AnnotationMismatch(
                    "cluster members share wave number and material".into(),
                ));
            }
            if !tm.basis.is_global() {
                return Err(AcousticsError::IncompatibleBasis(
                    "cluster members need a single expansion center".into(),
                ));
            }
            for &(_, kz, m) in tm.basis.modes() {
                modes.push((i, kz, m as i64));
            }
            dim += tm.basis.len();
        }
        let basis = ScalarCylindricalWaveBasis::new(&modes, positions)?;
        let mut data = Array2::zeros((dim, dim));
        let mut offset = 0;
        for tm in tmatrices {
            let n = tm.basis.len();
            data.slice_mut(ndarray::s![offset..offset + n, offset..offset + n])
                .assign(&tm.data);
            offset += n;
        }
        Self::new(data, basis, first.k0, first.material)
    }

    /// Cylindrical T-matrix of a z-periodic column of spherical scatterers.
    ///
    /// `tm` is the lattice-interacted spherical T-matrix of one unit
    /// cell, annotated with its one-dimensional z lattice. The column
    /// radiates cylindrical waves on the diffraction orders collected in
    /// `basis`, which shares the expansion centers of `tm`.
    pub fn from_array(tm: &AcousticTMatrix, basis: &ScalarCylindricalWaveBasis) -> Result<Self> {
        let lattice = tm.lattice.ok_or_else(|| {
            AcousticsError::InvalidLattice("T-matrix carries no lattice annotation".into())
        })?;
        let pitch = lattice.z_pitch()?;
        if basis.positions() != tm.basis.positions() {
            return Err(AcousticsError::IncompatibleBasis(
                "column and cell share the expansion centers".into(),
            ));
        }
        let ks = tm.ks();
        let swb = &tm.basis;
        let out = par_matrix(basis.len(), swb.len(), |a, b| {
            let (pc, kz, mc) = basis.mode(a);
            let (ps, l, m) = swb.mode(b);
            if pc != ps {
                return Complex64::new(0.0, 0.0);
            }
            ssw_periodic_to_scw(l, m, kz, mc, ks, pitch)
        })?;
        let inm = par_matrix(swb.len(), basis.len(), |a, b| {
            let (ps, l, m) = swb.mode(a);
            let (pc, kz, mc) = basis.mode(b);
            if ps != pc {
                return Complex64::new(0.0, 0.0);
            }
            scw_to_ssw(l, m, kz, mc, ks)
        })?;
        Self::new(
            out.dot(&tm.data).dot(&inm),
            basis.clone(),
            tm.k0,
            tm.material,
        )
    }

    /// Wave number in the embedding material.
    pub fn ks(&self) -> Complex64 {
        self.material.ks(self.k0)
    }

    /// Radial wave number of every mode.
    pub fn krhos(&self) -> Vec<Complex64> {
        let kzs: Vec<f64> = self.basis.modes().iter().map(|&(_, kz, _)| kz).collect();
        self.material.krhos(self.k0, &kzs)
    }

    /// Singular translations between distinct expansion centers.
    fn coupling(&self) -> Result<Array2<Complex64>> {
        let ks = self.ks();
        let basis = &self.basis;
        let pos = basis.positions();
        par_matrix(basis.len(), basis.len(), |a, b| {
            let (p, kz, m) = basis.mode(a);
            let (q, kzp, mp) = basis.mode(b);
            if p == q {
                return Complex64::new(0.0, 0.0);
            }
            let cyl = car2cyl(sub3(pos[p], pos[q]));
            let krho = sqrt_up(ks * ks - Complex64::new(kzp * kzp, 0.0));
            tl_scw(kz, m, kzp, mp, krho * cyl[0], cyl[1], cyl[2], true)
        })
    }

    /// Multiple scattering matrix `I - T C`.
    pub fn interaction_matrix(&self) -> Result<Array2<Complex64>> {
        let c = self.coupling()?;
        Ok(Array2::eye(self.basis.len()) - self.data.dot(&c))
    }

    /// Effective T-matrix of the interacting arrangement.
    pub fn interaction_solve(&self) -> Result<Self> {
        let m = self.interaction_matrix()?;
        let data = lu_solve_mat(&m, &self.data)?;
        Ok(Self {
            data,
            ..self.clone()
        })
    }

    /// Born series approximation of [`AcousticTMatrixC::interaction_solve`].
    pub fn interaction_solve_born(&self, iterations: usize) -> Result<Self> {
        let c = self.coupling()?;
        let tc = self.data.dot(&c);
        let mut x = self.data.clone();
        for _ in 0..iterations {
            x = &self.data + &tc.dot(&x);
        }
        Ok(Self {
            data: x,
            ..self.clone()
        })
    }

    /// Multiple scattering matrix of the lattice arrangement.
    pub fn lattice_interaction_matrix(
        &self,
        lattice: &Lattice,
        kpar: &[f64],
    ) -> Result<Array2<Complex64>> {
        let wrapped = AcousticBasis::Cylindrical(self.basis.clone());
        let c = operators::expand_lattice(
            &wrapped,
            &wrapped,
            lattice,
            kpar,
            self.k0,
            &self.material,
        )?;
        Ok(Array2::eye(self.basis.len()) - self.data.dot(&c))
    }

    /// Effective T-matrix of one unit cell of the lattice arrangement.
    pub fn lattice_interaction_solve(&self, lattice: &Lattice, kpar: &[f64]) -> Result<Self> {
        let m = self.lattice_interaction_matrix(lattice, kpar)?;
        let data = lu_solve_mat(&m, &self.data)?;
        Ok(Self {
            data,
            basis: self.basis.clone(),
            k0: self.k0,
            material: self.material,
            lattice: Some(*lattice),
            kpar: Some(lattice.bloch_vector(kpar)?),
        })
    }

    /// Re-expand the T-matrix in another cylindrical wave basis.
    pub fn expand(&self, basis: &ScalarCylindricalWaveBasis) -> Result<Self> {
        let new = AcousticBasis::Cylindrical(basis.clone());
        let old = AcousticBasis::Cylindrical(self.basis.clone());
        let out = operators::expand(
            &new,
            ModeType::Singular,
            &old,
            ModeType::Singular,
            self.k0,
            &self.material,
        )?;
        let inm = operators::expand(
            &old,
            ModeType::Regular,
            &new,
            ModeType::Regular,
            self.k0,
            &self.material,
        )?;
        Ok(Self {
            data: out.dot(&self.data).dot(&inm),
            basis: basis.clone(),
            k0: self.k0,
            material: self.material,
            lattice: self.lattice,
            kpar: self.kpar,
        })
    }

    /// Rotate the T-matrix about the z axis.
    pub fn rotate(&self, phi: f64) -> Result<Self> {
        let old = AcousticBasis::Cylindrical(self.basis.clone());
        let rotated = operators::rotate_basis(&old, phi, 0.0, 0.0)?;
        let fwd = operators::rotate(&rotated, &old, phi, 0.0, 0.0)?;
        let bwd = operators::rotate(&old, &rotated, -phi, 0.0, 0.0)?;
        let basis = match rotated {
            AcousticBasis::Cylindrical(b) => b,
            _ => unreachable!(),
        };
        Ok(Self {
            data: fwd.dot(&self.data).dot(&bwd),
            basis,
            k0: self.k0,
            material: self.material,
            lattice: None,
            kpar: None,
        })
    }

    /// Move the scatterer by `r`, keeping the expansion origin.
    pub fn translate(&self, r: [f64; 3]) -> Result<Self> {
        let wrapped = AcousticBasis::Cylindrical(self.basis.clone());
        let fwd = operators::translate(
            &wrapped,
            &wrapped,
            [-r[0], -r[1], -r[2]],
            self.k0,
            &self.material,
            ModeType::Singular,
        )?;
        let bwd = operators::translate(
            &wrapped,
            &wrapped,
            r,
            self.k0,
            &self.material,
            ModeType::Regular,
        )?;
        Ok(Self {
            data: fwd.dot(&self.data).dot(&bwd),
            basis: self.basis.clone(),
            k0: self.k0,
            material: self.material,
            lattice: None,
            kpar: None,
        })
    }

    /// Orientation averaged extinction width per unit length.
    ///
    /// The average runs over the azimuth of the illumination for every
    /// axial wave number of the basis.
    pub fn xw_ext_avg(&self) -> Result<f64> {
        self.require_lossless()?;
        let nkz = self.basis.kz_unique().len() as f64;
        let mut tr = 0.0;
        for i in 0..self.basis.len() {
            tr += self.data[[i, i]].re;
        }
        Ok(-4.0 * tr / (self.ks().re * nkz))
    }

    /// Orientation averaged scattering width per unit length.
    pub fn xw_sca_avg(&self) -> Result<f64> {
        self.require_lossless()?;
        let nkz = self.basis.kz_unique().len() as f64;
        let tr: f64 = self.data.iter().map(|v| v.norm_sqr()).sum();
        Ok(4.0 * tr / (self.ks().re * nkz))
    }

    /// Scattering and extinction widths for an illumination.
    ///
    /// Returns `(scattering, extinction)` per unit length.
    pub fn xw(&self, illu: &AcousticsArray, flux: f64) -> Result<(f64, f64)> {
        let local = self.incident_local(illu)?;
        let p = self.data.dot(&local.data);
        let norm = self.ks().re * flux;
        let mut sca = 0.0;
        let mut ext = 0.0;
        for (a, b) in local.data.iter().zip(p.iter()) {
            sca += b.norm_sqr();
            ext -= (a.conj() * b).re;
        }
        Ok((2.0 * sca / norm, 2.0 * ext / norm))
    }

    /// Scattered field coefficients for an illumination.
    pub fn sca(&self, illu: &AcousticsArray) -> Result<AcousticsArray> {
        let local = self.incident_local(illu)?;
        let kpar = match (&self.kpar, &local.kpar) {
            (Some(a), Some(b)) => Some(a.merge(b)?),
            (Some(a), None) => Some(*a),
            (None, b) => *b,
        };
        Ok(AcousticsArray {
            data: self.data.dot(&local.data),
            basis: AcousticBasis::Cylindrical(self.basis.clone()),
            k0: self.k0,
            material: self.material,
            modetype: ModeType::Singular,
            lattice: self.lattice.or(local.lattice),
            kpar,
        })
    }

    /// True for points lying outside every cylinder around the centers.
    pub fn valid_points(&self, points: &[[f64; 3]], radii: &[f64]) -> Result<Vec<bool>> {
        let pos = self.basis.positions();
        if radii.len() != pos.len() {
            return Err(AcousticsError::DimensionMismatch {
                expected: pos.len(),
                got: radii.len(),
            });
        }
        Ok(points
            .iter()
            .map(|pt| {
                pos.iter().zip(radii.iter()).all(|(c, r)| {
                    let dx = pt[0] - c[0];
                    let dy = pt[1] - c[1];
                    (dx * dx + dy * dy).sqrt() > *r
                })
            })
            .collect())
    }

    fn incident_local(&self, illu: &AcousticsArray) -> Result<AcousticsArray> {
        if illu.k0 != self.k0 || illu.material != self.material {
            return Err(AcousticsError::AnnotationMismatch(
                "illumination and T-matrix context differ".into(),
            ));
        }
        match &illu.basis {
            AcousticBasis::Cylindrical(b) if *b == self.basis => {
                if illu.modetype != ModeType::Regular {
                    return Err(AcousticsError::InvalidMode(
                        "illuminations are regular fields".into(),
                    ));
                }
                Ok(illu.clone())
            }
            _ => illu.expand(
                &AcousticBasis::Cylindrical(self.basis.clone()),
                ModeType::Regular,
            ),
        }
    }

    fn require_lossless(&self) -> Result<()> {
        if !self.material.is_lossless() {
            return Err(AcousticsError::InvalidMaterial(
                "width traces need a lossless embedding".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cylinder_is_block_diagonal() {
        let inner = AcousticMaterial::new(200.0, 1000.0, 500.0);
        let outer = AcousticMaterial::fluid(900.0, 686.0);
        let tm = AcousticTMatrixC::cylinder(&[1.0], 2, 3.0, 4.0, &[inner, outer]).unwrap();
        assert_eq!(tm.basis.len(), 5);
        assert_abs_diff_eq!(tm.ks().re, 1.5, epsilon = 1e-15);
        for i in 0..5 {
            let (_, kz, m) = tm.basis.mode(i);
            let want = mie_acoustics_cyl(kz, m, 3.0, 4.0, &inner, &outer).unwrap();
            assert_eq!(tm.data[[i, i]], want);
            for j in 0..5 {
                if i != j {
                    assert_eq!(tm.data[[i, j]], Complex64::new(0.0, 0.0));
                }
            }
        }
    }

    #[test]
    fn krhos_follow_the_sound_cone() {
        let inner =
            AcousticMaterial::fluid(Complex64::new(200.0, 10.0), Complex64::new(1000.0, -100.0));
        let tm = AcousticTMatrixC::cylinder(
            &[0.0, 5.0],
            1,
            3.0,
            1.0,
            &[inner, AcousticMaterial::default()],
        )
        .unwrap();
        let krhos = tm.krhos();
        for k in &krhos[..3] {
            assert_abs_diff_eq!(k.re, 3.0, epsilon = 1e-15);
            assert_abs_diff_eq!(k.im, 0.0, epsilon = 1e-15);
        }
        for k in &krhos[3..] {
            assert_abs_diff_eq!(k.re, 0.0, epsilon = 1e-15);
            assert_abs_diff_eq!(k.im, 4.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn mode_order_groups_by_kz() {
        let inner = AcousticMaterial::fluid(200.0, 1000.0);
        let tm = AcousticTMatrixC::cylinder(
            &[-1.0, 1.0],
            1,
            3.0,
            4.0,
            &[inner, AcousticMaterial::fluid(900.0, 686.0)],
        )
        .unwrap();
        let want_kz = [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0];
        let want_m = [-1, 0, 1, -1, 0, 1];
        for i in 0..6 {
            let (p, kz, m) = tm.basis.mode(i);
            assert_eq!(p, 0);
            assert_eq!(kz, want_kz[i]);
            assert_eq!(m, want_m[i]);
        }
    }

    #[test]
    fn lone_scatterer_interaction_is_identity() {
        let inner = AcousticMaterial::fluid(200.0, 1000.0);
        let tm = AcousticTMatrixC::cylinder(
            &[0.5],
            1,
            2.0,
            1.0,
            &[inner, AcousticMaterial::default()],
        )
        .unwrap();
        let solo = AcousticTMatrixC::cluster(&[tm.clone()], &[[0.0, 0.0, 0.0]]).unwrap();
        let solved = solo.interaction_solve().unwrap();
        for i in 0..tm.basis.len() {
            for j in 0..tm.basis.len() {
                assert_abs_diff_eq!(
                    solved.data[[i, j]].re,
                    tm.data[[i, j]].re,
                    epsilon = 1e-14
                );
                assert_abs_diff_eq!(
                    solved.data[[i, j]].im,
                    tm.data[[i, j]].im,
                    epsilon = 1e-14
                );
            }
        }
    }

    #[test]
    fn from_array_needs_lattice_annotation() {
        let tm = AcousticTMatrix::sphere(
            1,
            1.0,
            0.3,
            &[
                AcousticMaterial::fluid(2000.0, 1000.0),
                AcousticMaterial::default(),
            ],
        )
        .unwrap();
        let cwb = ScalarCylindricalWaveBasis::default_at(&[0.0], 1, &[[0.0; 3]]).unwrap();
        assert!(AcousticTMatrixC::from_array(&tm, &cwb).is_err());
    }
}
