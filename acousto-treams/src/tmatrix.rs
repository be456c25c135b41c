//! Acoustic T-matrices over spherical waves.
//!
//! A T-matrix maps the regular coefficients of an incident field to the
//! singular coefficients of the scattered field. Multi-scatterer setups
//! keep one block per expansion center; solving the multiple scattering
//! problem turns the collection of isolated T-matrices into the
//! effective T-matrix of the whole arrangement, either in the local
//! basis or re-expanded about a single origin.

use ndarray::Array2;
use num_complex::Complex64;

use acousto_solvers::lu_solve_mat;
use acousto_special::{car2sph, tl_ssw};

use crate::array::AcousticsArray;
use crate::basis::{AcousticBasis, ModeType, ScalarSphericalWaveBasis};
use crate::coeffs::mie_acoustics;
use crate::error::{AcousticsError, Result};
use crate::lattice::{Lattice, WaveVector};
use crate::material::AcousticMaterial;
use crate::operators;
use crate::util::{par_matrix, sub3};

/// T-matrix of one or several compact scatterers.
#[derive(Clone, Debug)]
pub struct AcousticTMatrix {
    /// Scattered coefficients per unit incident coefficient
    pub data: Array2<Complex64>,
    /// Spherical wave basis of rows and columns alike
    pub basis: ScalarSphericalWaveBasis,
    /// Vacuum wave number
    pub k0: f64,
    /// Embedding material
    pub material: AcousticMaterial,
    /// Lattice of a periodic arrangement
    pub lattice: Option<Lattice>,
    /// Bloch wave vector of a periodic arrangement
    pub kpar: Option<WaveVector>,
}

impl AcousticTMatrix {
    /// Create a T-matrix, checking dimensions and the embedding.
    pub fn new(
        data: Array2<Complex64>,
        basis: ScalarSphericalWaveBasis,
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

    /// T-matrix of a single sphere centered at the origin.
    ///
    /// `materials` holds the sphere material and the embedding. The
    /// matrix is diagonal with the Mie coefficient of each degree.
    pub fn sphere(
        lmax: usize,
        k0: f64,
        radius: f64,
        materials: &[AcousticMaterial],
    ) -> Result<Self> {
        if materials.len() != 2 {
            return Err(AcousticsError::InvalidMaterial(
                "a sphere separates exactly two materials".into(),
            ));
        }
        let basis = ScalarSphericalWaveBasis::default(lmax);
        let mut coeffs = Vec::with_capacity(lmax + 1);
        for l in 0..=lmax {
            coeffs.push(mie_acoustics(l, k0 * radius, &materials[0], &materials[1])?);
        }
        let mut data = Array2::zeros((basis.len(), basis.len()));
        for i in 0..basis.len() {
            let (_, l, _) = basis.mode(i);
            data[[i, i]] = coeffs[l];
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
            for &(_, l, m) in tm.basis.modes() {
                modes.push((i, l as i64, m as i64));
            }
            dim += tm.basis.len();
        }
        let basis = ScalarSphericalWaveBasis::new(&modes, positions)?;
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

    /// Wave number in the embedding material.
    pub fn ks(&self) -> Complex64 {
        self.material.ks(self.k0)
    }

    /// Singular translations between distinct expansion centers.
    fn coupling(&self) -> Result<Array2<Complex64>> {
        let ks = self.ks();
        let basis = &self.basis;
        let pos = basis.positions();
        par_matrix(basis.len(), basis.len(), |a, b| {
            let (p, l, m) = basis.mode(a);
            let (q, lp, mp) = basis.mode(b);
            if p == q {
                return Complex64::new(0.0, 0.0);
            }
            let sph = car2sph(sub3(pos[p], pos[q]));
            tl_ssw(l, m, lp, mp, ks * sph[0], sph[1], sph[2], true)
        })
    }

    /// Multiple scattering matrix `I - T C`.
    ///
    /// `C` re-expands the singular field of every scatterer as a regular
    /// field at every other center.
    pub fn interaction_matrix(&self) -> Result<Array2<Complex64>> {
        let c = self.coupling()?;
        Ok(Array2::eye(self.basis.len()) - self.data.dot(&c))
    }

    /// Effective T-matrix of the interacting arrangement.
    ///
    /// Solves `(I - T C) X = T` for the local basis T-matrix `X`.
    pub fn interaction_solve(&self) -> Result<Self> {
        let m = self.interaction_matrix()?;
        let data = lu_solve_mat(&m, &self.data)?;
        Ok(Self {
            data,
            ..self.clone()
        })
    }

    /// Born series approximation of [`AcousticTMatrix::interaction_solve`].
    ///
    /// Iterates `X <- T + T C X` the given number of times, starting
    /// from the non-interacting `T`.
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
        let wrapped = AcousticBasis::Spherical(self.basis.clone());
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
    ///
    /// The result maps the regular Bloch-periodic illumination of the
    /// cell to the singular field of its scatterers and carries the
    /// lattice and Bloch vector annotations.
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

    /// Re-expand the T-matrix in another spherical wave basis.
    ///
    /// Incident waves are expanded from the new basis into the old one,
    /// scattered waves the other way around. Moving all modes to a
    /// single origin yields the global T-matrix of a cluster.
    pub fn expand(&self, basis: &ScalarSphericalWaveBasis) -> Result<Self> {
        let new = AcousticBasis::Spherical(basis.clone());
        let old = AcousticBasis::Spherical(self.basis.clone());
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

    /// Rotate the T-matrix by the Euler angles `phi`, `theta`, `psi`.
    pub fn rotate(&self, phi: f64, theta: f64, psi: f64) -> Result<Self> {
        let old = AcousticBasis::Spherical(self.basis.clone());
        let rotated = operators::rotate_basis(&old, phi, theta, psi)?;
        let fwd = operators::rotate(&rotated, &old, phi, theta, psi)?;
        let bwd = operators::rotate(&old, &rotated, -psi, -theta, -phi)?;
        let basis = match rotated {
            AcousticBasis::Spherical(b) => b,
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
        let wrapped = AcousticBasis::Spherical(self.basis.clone());
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

    /// Restrict the T-matrix to the modes of a smaller basis.
    pub fn subset(&self, basis: &ScalarSphericalWaveBasis) -> Result<Self> {
        if basis.positions() != self.basis.positions() {
            return Err(AcousticsError::IncompatibleBasis(
                "subsetting keeps the expansion centers".into(),
            ));
        }
        let mut idx = Vec::with_capacity(basis.len());
        for i in 0..basis.len() {
            let found = self.basis.index_of(basis.mode(i)).ok_or_else(|| {
                AcousticsError::IncompatibleBasis("mode missing from the T-matrix".into())
            })?;
            idx.push(found);
        }
        let mut data = Array2::zeros((idx.len(), idx.len()));
        for (a, &i) in idx.iter().enumerate() {
            for (b, &j) in idx.iter().enumerate() {
                data[[a, b]] = self.data[[i, j]];
            }
        }
        Ok(Self {
            data,
            basis: basis.clone(),
            k0: self.k0,
            material: self.material,
            lattice: self.lattice,
            kpar: self.kpar,
        })
    }

    /// Orientation averaged extinction cross section.
    pub fn xs_ext_avg(&self) -> Result<f64> {
        self.require_lossless()?;
        let k2 = self.ks().re * self.ks().re;
        let mut tr = 0.0;
        for i in 0..self.basis.len() {
            tr += self.data[[i, i]].re;
        }
        Ok(-4.0 * std::f64::consts::PI * tr / k2)
    }

    /// Orientation averaged scattering cross section.
    pub fn xs_sca_avg(&self) -> Result<f64> {
        self.require_lossless()?;
        let k2 = self.ks().re * self.ks().re;
        let tr: f64 = self.data.iter().map(|v| v.norm_sqr()).sum();
        Ok(4.0 * std::f64::consts::PI * tr / k2)
    }

    /// Scattering and extinction cross sections for an illumination.
    ///
    /// `flux` normalizes the power carried by the illumination. Returns
    /// `(scattering, extinction)`.
    pub fn xs(&self, illu: &AcousticsArray, flux: f64) -> Result<(f64, f64)> {
        let local = self.incident_local(illu)?;
        let p = self.data.dot(&local.data);
        let k2 = self.ks().re * self.ks().re;
        let norm = 2.0 * k2 * flux;
        let mut sca = 0.0;
        let mut ext = 0.0;
        for (a, b) in local.data.iter().zip(p.iter()) {
            sca += b.norm_sqr();
            ext -= (a.conj() * b).re;
        }
        Ok((sca / norm, ext / norm))
    }

    /// Scattered field coefficients for an illumination.
    ///
    /// Illuminations over other bases, plane waves included, are first
    /// expanded in the regular modes of the T-matrix basis.
    pub fn sca(&self, illu: &AcousticsArray) -> Result<AcousticsArray> {
        let local = self.incident_local(illu)?;
        let kpar = match (&self.kpar, &local.kpar) {
            (Some(a), Some(b)) => Some(a.merge(b)?),
            (Some(a), None) => Some(*a),
            (None, b) => *b,
        };
        Ok(AcousticsArray {
            data: self.data.dot(&local.data),
            basis: AcousticBasis::Spherical(self.basis.clone()),
            k0: self.k0,
            material: self.material,
            modetype: ModeType::Singular,
            lattice: self.lattice.or(local.lattice),
            kpar,
        })
    }

    fn incident_local(&self, illu: &AcousticsArray) -> Result<AcousticsArray> {
        if illu.k0 != self.k0 || illu.material != self.material {
            return Err(AcousticsError::AnnotationMismatch(
                "illumination and T-matrix context differ".into(),
            ));
        }
        match &illu.basis {
            AcousticBasis::Spherical(b) if *b == self.basis => {
                if illu.modetype != ModeType::Regular {
                    return Err(AcousticsError::InvalidMode(
                        "illuminations are regular fields".into(),
                    ));
                }
                Ok(illu.clone())
            }
            _ => illu.expand(
                &AcousticBasis::Spherical(self.basis.clone()),
                ModeType::Regular,
            ),
        }
    }

    /// True for points lying outside every sphere around the centers.
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
                    let d = sub3(*pt, *c);
                    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt() > *r
                })
            })
            .collect())
    }

    fn require_lossless(&self) -> Result<()> {
        if !self.material.is_lossless() {
            return Err(AcousticsError::InvalidMaterial(
                "cross section traces need a lossless embedding".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn steel_like() -> AcousticMaterial {
        AcousticMaterial::new(
            Complex64::new(200.0, 10.0),
            Complex64::new(1000.0, -100.0),
            Complex64::new(500.0, -50.0),
        )
    }

    fn water_like() -> AcousticMaterial {
        AcousticMaterial::fluid(900.0, 800.0)
    }

    #[test]
    fn sphere_is_diagonal() {
        let tm = AcousticTMatrix::sphere(2, 3.0, 4.0, &[steel_like(), water_like()]).unwrap();
        assert_eq!(tm.basis.len(), 9);
        for i in 0..9 {
            for j in 0..9 {
                if i != j {
                    assert_eq!(tm.data[[i, j]], Complex64::new(0.0, 0.0));
                }
            }
        }
        let (_, l, _) = tm.basis.mode(5);
        let want = mie_acoustics(l, 12.0, &steel_like(), &water_like()).unwrap();
        assert_eq!(tm.data[[5, 5]], want);
    }

    #[test]
    fn sphere_rejects_elastic_embedding() {
        let solid = AcousticMaterial::new(1000.0, 900.0, 400.0);
        assert!(AcousticTMatrix::sphere(1, 1.0, 1.0, &[water_like(), solid]).is_err());
        assert!(AcousticTMatrix::sphere(1, 1.0, 1.0, &[water_like()]).is_err());
    }

    #[test]
    fn lone_scatterer_interaction_is_identity() {
        let tm = AcousticTMatrix::sphere(2, 3.0, 4.0, &[steel_like(), water_like()]).unwrap();
        let solo = AcousticTMatrix::cluster(&[tm.clone()], &[[0.0, 0.0, 0.0]]).unwrap();
        let solved = solo.interaction_solve().unwrap();
        for i in 0..9 {
            for j in 0..9 {
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
    fn born_series_approaches_solution() {
        let mat = AcousticMaterial::fluid(2000.0, 1000.0);
        let tm = AcousticTMatrix::sphere(1, 0.2, 1.0, &[mat, AcousticMaterial::default()]).unwrap();
        let cl = AcousticTMatrix::cluster(
            &[tm.clone(), tm],
            &[[0.0, 0.0, -4.0], [0.0, 0.0, 4.0]],
        )
        .unwrap();
        let solved = cl.interaction_solve().unwrap();
        let born = cl.interaction_solve_born(40).unwrap();
        for i in 0..cl.basis.len() {
            for j in 0..cl.basis.len() {
                assert_abs_diff_eq!(
                    born.data[[i, j]].re,
                    solved.data[[i, j]].re,
                    epsilon = 1e-10
                );
                assert_abs_diff_eq!(
                    born.data[[i, j]].im,
                    solved.data[[i, j]].im,
                    epsilon = 1e-10
                );
            }
        }
    }

    #[test]
    fn subset_picks_monopole_block() {
        let tm = AcousticTMatrix::sphere(2, 3.0, 4.0, &[steel_like(), water_like()]).unwrap();
        let small = ScalarSphericalWaveBasis::default(0);
        let sub = tm.subset(&small).unwrap();
        assert_eq!(sub.data.dim(), (1, 1));
        assert_eq!(sub.data[[0, 0]], tm.data[[0, 0]]);
    }

    #[test]
    fn cross_section_traces_guard_lossy_embedding() {
        let lossy =
            AcousticMaterial::fluid(Complex64::new(900.0, 0.0), Complex64::new(800.0, -8.0));
        let tm = AcousticTMatrix::sphere(1, 3.0, 4.0, &[steel_like(), lossy]).unwrap();
        assert!(tm.xs_ext_avg().is_err());
        assert!(tm.xs_sca_avg().is_err());
    }

    #[test]
    fn valid_points_masks_interiors() {
        let tm = AcousticTMatrix::sphere(1, 3.0, 1.0, &[steel_like(), water_like()]).unwrap();
        let mask = tm
            .valid_points(&[[0.0, 0.0, 0.5], [0.0, 0.0, 1.5]], &[1.0])
            .unwrap();
        assert_eq!(mask, vec![false, true]);
        assert!(tm.valid_points(&[[0.0; 3]], &[1.0, 2.0]).is_err());
    }
}
