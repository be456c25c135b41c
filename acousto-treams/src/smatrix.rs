//! Plane-wave S-matrices of stratified structures.
//!
//! A structure that is finite along one axis and homogeneous or
//! periodic in the remaining directions scatters an incoming plane wave
//! into a finite set of diffraction orders. The four blocks collected
//! here relate upward and downward traveling amplitudes on both sides.
//! Interfaces, homogeneous layers, and lattices of T-matrices provide
//! the elementary S-matrices, the Redheffer star product composes them
//! into stacks.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use acousto_solvers::{eig, lu_factorize, lu_solve_mat};
use acousto_special::spw_translate;

use crate::array::AcousticsArray;
use crate::basis::{AcousticBasis, Alignment, ModeType, ScalarPlaneWaveBasisByComp};
use crate::error::{AcousticsError, Result};
use crate::lattice::Lattice;
use crate::material::AcousticMaterial;
use crate::operators;
use crate::tmatrix::AcousticTMatrix;
use crate::tmatrixc::AcousticTMatrixC;

fn missing_index(alignment: Alignment) -> usize {
    match alignment {
        Alignment::Xy => 2,
        Alignment::Yz => 0,
        Alignment::Zx => 1,
    }
}

/// Scattering matrix blocks of a stratified arrangement.
///
/// `smats[i][j]` maps incoming amplitudes of direction `j` to outgoing
/// amplitudes of direction `i`, with `0` for up and `1` for down along
/// the stratification axis.
#[derive(Clone, Debug)]
pub struct AcousticSMatrices {
    /// Blocks indexed by outgoing and incoming direction
    pub smats: [[Array2<Complex64>; 2]; 2],
    /// Plane wave basis of the diffraction orders
    pub basis: ScalarPlaneWaveBasisByComp,
    /// Vacuum wave number
    pub k0: f64,
    /// Materials below and above the structure
    pub materials: [AcousticMaterial; 2],
}

impl AcousticSMatrices {
    /// Create an S-matrix collection, checking the block dimensions.
    pub fn new(
        smats: [[Array2<Complex64>; 2]; 2],
        basis: ScalarPlaneWaveBasisByComp,
        k0: f64,
        materials: [AcousticMaterial; 2],
    ) -> Result<Self> {
        let n = basis.len();
        for row in &smats {
            for block in row {
                if block.nrows() != n || block.ncols() != n {
                    return Err(AcousticsError::DimensionMismatch {
                        expected: n,
                        got: block.nrows().max(block.ncols()),
                    });
                }
            }
        }
        Ok(Self {
            smats,
            basis,
            k0,
            materials,
        })
    }

    /// S-matrix of the planar interface between two fluids.
    ///
    /// Pressure and normal velocity stay continuous across the
    /// interface, which fixes the transmission and reflection of every
    /// tangential wave vector separately.
    pub fn interface(
        basis: &ScalarPlaneWaveBasisByComp,
        k0: f64,
        materials: [AcousticMaterial; 2],
    ) -> Result<Self> {
        let n = basis.len();
        let mi = missing_index(basis.alignment());
        let below = basis.kvecs(k0, &materials[0], ModeType::Up)?;
        let above = basis.kvecs(k0, &materials[1], ModeType::Up)?;
        let mut s = [
            [Array2::zeros((n, n)), Array2::zeros((n, n))],
            [Array2::zeros((n, n)), Array2::zeros((n, n))],
        ];
        for q in 0..n {
            let kz1 = below[q][mi];
            let kz2 = above[q][mi];
            let denom = kz1 * materials[1].rho + kz2 * materials[0].rho;
            let r = (kz1 * materials[1].rho - kz2 * materials[0].rho) / denom;
            s[0][0][[q, q]] = 2.0 * kz1 * materials[1].rho / denom;
            s[1][0][[q, q]] = r;
            s[1][1][[q, q]] = 2.0 * kz2 * materials[0].rho / denom;
            s[0][1][[q, q]] = -r;
        }
        Self::new(s, basis.clone(), k0, materials)
    }

    /// S-matrix of free propagation by the vector `r`.
    pub fn propagation(
        r: [f64; 3],
        basis: &ScalarPlaneWaveBasisByComp,
        k0: f64,
        material: AcousticMaterial,
    ) -> Result<Self> {
        let n = basis.len();
        let up = basis.kvecs(k0, &material, ModeType::Up)?;
        let down = basis.kvecs(k0, &material, ModeType::Down)?;
        let mut s = [
            [Array2::zeros((n, n)), Array2::zeros((n, n))],
            [Array2::zeros((n, n)), Array2::zeros((n, n))],
        ];
        let back = [-r[0], -r[1], -r[2]];
        for q in 0..n {
            s[0][0][[q, q]] = spw_translate(up[q][0], up[q][1], up[q][2], r);
            s[1][1][[q, q]] = spw_translate(down[q][0], down[q][1], down[q][2], back);
        }
        Self::new(s, basis.clone(), k0, [material, material])
    }

    /// S-matrix of a homogeneous layer between two half spaces.
    ///
    /// `materials` holds the material below, inside, and above the
    /// layer; the stratification axis follows the basis alignment.
    pub fn slab(
        thickness: f64,
        basis: &ScalarPlaneWaveBasisByComp,
        k0: f64,
        materials: [AcousticMaterial; 3],
    ) -> Result<Self> {
        let mi = missing_index(basis.alignment());
        let mut r = [0.0; 3];
        r[mi] = thickness;
        let bottom = Self::interface(basis, k0, [materials[0], materials[1]])?;
        let inside = Self::propagation(r, basis, k0, materials[1])?;
        let top = Self::interface(basis, k0, [materials[1], materials[2]])?;
        Self::stack(&[bottom, inside, top])
    }

    /// Couple another S-matrix on top of this one.
    ///
    /// The Redheffer star product sums all multiple reflections between
    /// the two subsystems.
    pub fn add(&self, other: &Self) -> Result<Self> {
        if self.basis != other.basis {
            return Err(AcousticsError::IncompatibleBasis(
                "stacked S-matrices share the diffraction orders".into(),
            ));
        }
        if self.k0 != other.k0 || self.materials[1] != other.materials[0] {
            return Err(AcousticsError::AnnotationMismatch(
                "stacked S-matrices meet in a common material".into(),
            ));
        }
        let n = self.basis.len();
        let eye: Array2<Complex64> = Array2::eye(n);
        let m1 = &eye - &self.smats[0][1].dot(&other.smats[1][0]);
        let x00 = lu_solve_mat(&m1, &self.smats[0][0])?;
        let m2 = &eye - &other.smats[1][0].dot(&self.smats[0][1]);
        let x11 = lu_solve_mat(&m2, &other.smats[1][1])?;
        let s00 = other.smats[0][0].dot(&x00);
        let s01 = &other.smats[0][1] + &other.smats[0][0].dot(&self.smats[0][1]).dot(&x11);
        let s10 = &self.smats[1][0] + &self.smats[1][1].dot(&other.smats[1][0]).dot(&x00);
        let s11 = self.smats[1][1].dot(&x11);
        Self::new(
            [[s00, s01], [s10, s11]],
            self.basis.clone(),
            self.k0,
            [self.materials[0], other.materials[1]],
        )
    }

    /// Repeatedly double the structure, giving `2^times` copies.
    pub fn double(&self, times: usize) -> Result<Self> {
        let mut acc = self.clone();
        for _ in 0..times {
            acc = acc.add(&acc)?;
        }
        Ok(acc)
    }

    /// Stack S-matrices from bottom to top.
    pub fn stack(items: &[Self]) -> Result<Self> {
        let mut iter = items.iter();
        let mut acc = iter
            .next()
            .ok_or_else(|| {
                AcousticsError::DimensionMismatch {
                    expected: 1,
                    got: 0,
                }
            })?
            .clone();
        for item in iter {
            acc = acc.add(item)?;
        }
        Ok(acc)
    }

    /// S-matrix of a two-dimensional lattice of spherical scatterers.
    ///
    /// `tm` is the lattice-interacted T-matrix of one unit cell of an
    /// x-y periodic arrangement; `basis` collects the diffraction
    /// orders, usually from
    /// [`ScalarPlaneWaveBasisByComp::diffr_orders`].
    pub fn from_array(tm: &AcousticTMatrix, basis: &ScalarPlaneWaveBasisByComp) -> Result<Self> {
        let lattice = tm.lattice.ok_or_else(|| {
            AcousticsError::InvalidLattice("T-matrix carries no lattice annotation".into())
        })?;
        if lattice.dim() != 2 {
            return Err(AcousticsError::InvalidLattice(
                "plane wave scattering needs an x-y periodic arrangement".into(),
            ));
        }
        if let Some(hint) = basis.lattice {
            if hint != lattice {
                return Err(AcousticsError::AnnotationMismatch(
                    "lattice annotations differ".into(),
                ));
            }
        }
        if let (Some(a), Some(b)) = (&basis.kpar, &tm.kpar) {
            a.merge(b)?;
        }
        let wrapped = AcousticBasis::Spherical(tm.basis.clone());
        Self::assemble(&tm.data, &wrapped, basis, &lattice, tm.k0, tm.material)
    }

    /// S-matrix of a grating of cylindrical scatterers.
    ///
    /// The cylinders run along z and repeat along x, so the structure
    /// stratifies along y and the diffraction orders use the zx
    /// alignment.
    pub fn from_arrayc(tm: &AcousticTMatrixC, basis: &ScalarPlaneWaveBasisByComp) -> Result<Self> {
        let lattice = tm.lattice.ok_or_else(|| {
            AcousticsError::InvalidLattice("T-matrix carries no lattice annotation".into())
        })?;
        let wrapped = AcousticBasis::Cylindrical(tm.basis.clone());
        Self::assemble(&tm.data, &wrapped, basis, &lattice, tm.k0, tm.material)
    }

    fn assemble(
        data: &Array2<Complex64>,
        sources: &AcousticBasis,
        basis: &ScalarPlaneWaveBasisByComp,
        lattice: &Lattice,
        k0: f64,
        material: AcousticMaterial,
    ) -> Result<Self> {
        let plane = AcousticBasis::PlaneComp(basis.clone());
        let mut matrices = Vec::with_capacity(2);
        for mt in [ModeType::Up, ModeType::Down] {
            let outgoing =
                operators::periodic_to_plane(basis, mt, sources, lattice, k0, &material)?;
            let incoming =
                operators::expand(sources, ModeType::Regular, &plane, mt, k0, &material)?;
            matrices.push((outgoing, incoming));
        }
        let eye: Array2<Complex64> = Array2::eye(basis.len());
        let block = |o: usize, i: usize| {
            let mut m = matrices[o].0.dot(data).dot(&matrices[i].1);
            if o == i {
                m += &eye;
            }
            m
        };
        let smats = [[block(0, 0), block(0, 1)], [block(1, 0), block(1, 1)]];
        Self::new(smats, basis.clone(), k0, [material, material])
    }

    /// Transmittance and reflectance for an illumination.
    ///
    /// The flux of every order is weighted with `Re(kz / rho)` of its
    /// medium, so evanescent orders carry none.
    pub fn tr(&self, illu: &AcousticsArray) -> Result<(f64, f64)> {
        match &illu.basis {
            AcousticBasis::PlaneComp(b) if *b == self.basis => {}
            _ => {
                return Err(AcousticsError::IncompatibleBasis(
                    "illumination lives on the S-matrix orders".into(),
                ))
            }
        }
        if illu.k0 != self.k0 {
            return Err(AcousticsError::AnnotationMismatch(
                "illumination and S-matrix wave numbers differ".into(),
            ));
        }
        let d_in = match illu.modetype {
            ModeType::Up => 0,
            ModeType::Down => 1,
            _ => {
                return Err(AcousticsError::InvalidMode(
                    "stratified structures take up or down illuminations".into(),
                ))
            }
        };
        if illu.material != self.materials[d_in] {
            return Err(AcousticsError::AnnotationMismatch(
                "illumination material is not the entry medium".into(),
            ));
        }
        let w_below = self.flux_weights(&self.materials[0])?;
        let w_above = self.flux_weights(&self.materials[1])?;
        let out_up = self.smats[0][d_in].dot(&illu.data);
        let out_down = self.smats[1][d_in].dot(&illu.data);
        let weighted = |w: &[f64], v: &Array1<Complex64>| -> f64 {
            w.iter().zip(v.iter()).map(|(w, c)| w * c.norm_sqr()).sum()
        };
        let incident = if d_in == 0 {
            weighted(&w_below, &illu.data)
        } else {
            weighted(&w_above, &illu.data)
        };
        let (t, r) = if d_in == 0 {
            (weighted(&w_above, &out_up), weighted(&w_below, &out_down))
        } else {
            (weighted(&w_below, &out_down), weighted(&w_above, &out_up))
        };
        Ok((t / incident, r / incident))
    }

    /// Bloch wave numbers along the stratification axis.
    ///
    /// Treats the structure as the unit cell of an `az`-periodic stack
    /// and diagonalizes its transfer map. Returns the wave numbers and
    /// the eigenvector columns in up-then-down block order.
    pub fn bands_kz(&self, az: f64) -> Result<(Array1<Complex64>, Array2<Complex64>)> {
        let n = self.basis.len();
        let s11inv = lu_factorize(&self.smats[1][1])?.inverse()?;
        let s11inv_s10 = s11inv.dot(&self.smats[1][0]);
        let m00 = &self.smats[0][0] - &self.smats[0][1].dot(&s11inv_s10);
        let m01 = self.smats[0][1].dot(&s11inv);
        let mut transfer = Array2::zeros((2 * n, 2 * n));
        transfer.slice_mut(ndarray::s![..n, ..n]).assign(&m00);
        transfer.slice_mut(ndarray::s![..n, n..]).assign(&m01);
        transfer
            .slice_mut(ndarray::s![n.., ..n])
            .assign(&(-&s11inv_s10));
        transfer.slice_mut(ndarray::s![n.., n..]).assign(&s11inv);
        let (vals, vecs) = eig(&transfer)?;
        let kz = vals.mapv(|v| v.ln() / (Complex64::i() * az));
        Ok((kz, vecs))
    }

    fn flux_weights(&self, material: &AcousticMaterial) -> Result<Vec<f64>> {
        let mi = missing_index(self.basis.alignment());
        Ok(self
            .basis
            .kvecs(self.k0, material, ModeType::Up)?
            .iter()
            .map(|k| (k[mi] / material.rho).re)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn water() -> AcousticMaterial {
        AcousticMaterial::fluid(1000.0, 1500.0)
    }

    #[test]
    fn interface_normal_incidence() {
        let basis = ScalarPlaneWaveBasisByComp::default([0.0, 0.0]);
        let air = AcousticMaterial::default();
        let sm = AcousticSMatrices::interface(&basis, 2.0, [water(), air]).unwrap();
        let kz1 = water().ks(2.0);
        let kz2 = air.ks(2.0);
        let r = (kz1 * air.rho - kz2 * water().rho) / (kz1 * air.rho + kz2 * water().rho);
        assert_abs_diff_eq!(sm.smats[1][0][[0, 0]].re, r.re, epsilon = 1e-14);
        assert_abs_diff_eq!(sm.smats[1][0][[0, 0]].im, r.im, epsilon = 1e-14);
        assert_abs_diff_eq!(
            sm.smats[0][0][[0, 0]].re,
            1.0 + r.re,
            epsilon = 1e-14
        );
        assert_abs_diff_eq!(sm.smats[0][1][[0, 0]].re, -r.re, epsilon = 1e-14);
    }

    #[test]
    fn interface_conserves_flux() {
        // oblique but propagating on both sides
        let basis = ScalarPlaneWaveBasisByComp::default([0.1, -0.2]);
        let sm = AcousticSMatrices::interface(&basis, 2.0, [water(), AcousticMaterial::default()])
            .unwrap();
        let illu = AcousticsArray::new(
            array![Complex64::new(1.0, 0.0)],
            AcousticBasis::PlaneComp(basis),
            2.0,
            water(),
            ModeType::Up,
        )
        .unwrap();
        let (t, r) = sm.tr(&illu).unwrap();
        assert_abs_diff_eq!(t + r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn slab_matches_closed_form() {
        let below = AcousticMaterial::default();
        let inside = AcousticMaterial::fluid(2500.0, 600.0);
        let basis = ScalarPlaneWaveBasisByComp::default([0.3, -0.2]);
        let k0 = 1.1;
        let d = 0.7;
        let sm = AcousticSMatrices::slab(d, &basis, k0, [below, inside, below]).unwrap();

        let kz1 = below.kzs(k0, 0.3, -0.2);
        let kz2 = inside.kzs(k0, 0.3, -0.2);
        let r = (kz1 * inside.rho - kz2 * below.rho) / (kz1 * inside.rho + kz2 * below.rho);
        let p = (Complex64::i() * kz2 * d).exp();
        let den = 1.0 - r * r * p * p;
        let t_want = (1.0 - r * r) * p / den;
        let r_want = r * (1.0 - p * p) / den;
        assert_abs_diff_eq!(sm.smats[0][0][[0, 0]].re, t_want.re, epsilon = 1e-12);
        assert_abs_diff_eq!(sm.smats[0][0][[0, 0]].im, t_want.im, epsilon = 1e-12);
        assert_abs_diff_eq!(sm.smats[1][0][[0, 0]].re, r_want.re, epsilon = 1e-12);
        assert_abs_diff_eq!(sm.smats[1][0][[0, 0]].im, r_want.im, epsilon = 1e-12);

        let illu = AcousticsArray::new(
            array![Complex64::new(1.0, 0.0)],
            AcousticBasis::PlaneComp(sm.basis.clone()),
            k0,
            below,
            ModeType::Up,
        )
        .unwrap();
        let (t, rr) = sm.tr(&illu).unwrap();
        assert_abs_diff_eq!(t + rr, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_cell_bands_are_linear() {
        let basis = ScalarPlaneWaveBasisByComp::default([0.2, 0.1]);
        let mat = AcousticMaterial::default();
        let k0 = 1.3;
        let az = 0.4;
        let sm = AcousticSMatrices::propagation([0.0, 0.0, az], &basis, k0, mat).unwrap();
        let (kz, _) = sm.bands_kz(az).unwrap();
        let want = mat.kzs(k0, 0.2, 0.1);
        let mut got: Vec<f64> = kz.iter().map(|v| v.re).collect();
        got.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_abs_diff_eq!(got[0], -want.re, epsilon = 1e-10);
        assert_abs_diff_eq!(got[1], want.re, epsilon = 1e-10);
        for v in kz.iter() {
            assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn double_squares_the_phase() {
        let basis = ScalarPlaneWaveBasisByComp::default([0.0, 0.0]);
        let mat = AcousticMaterial::default();
        let sm = AcousticSMatrices::propagation([0.0, 0.0, 0.3], &basis, 1.0, mat).unwrap();
        let twice = sm.double(1).unwrap();
        let want = (Complex64::i() * mat.ks(1.0) * 0.6).exp();
        assert_abs_diff_eq!(twice.smats[0][0][[0, 0]].re, want.re, epsilon = 1e-14);
        assert_abs_diff_eq!(twice.smats[0][0][[0, 0]].im, want.im, epsilon = 1e-14);
    }

    #[test]
    fn from_array_guards_annotations() {
        let tm = AcousticTMatrix::sphere(
            1,
            1.0,
            0.2,
            &[
                AcousticMaterial::fluid(2000.0, 1000.0),
                AcousticMaterial::default(),
            ],
        )
        .unwrap();
        let basis = ScalarPlaneWaveBasisByComp::default([0.0, 0.0]);
        assert!(AcousticSMatrices::from_array(&tm, &basis).is_err());
    }
}
