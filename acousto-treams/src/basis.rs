//! Sets of scalar wave modes.
//!
//! Solutions of the Helmholtz equation are expanded in spherical,
//! cylindrical, or plane waves. A basis set collects the mode indices of
//! such an expansion together with the positions the modes are attached
//! to, and fixes the order in which coefficient vectors and matrices are
//! laid out.
//!
//! Spherical modes are indexed by degree `l` and order `m`, cylindrical
//! modes by the axial wave number `kz` and order `m`. Plane waves come in
//! two flavors: fixed directions of propagation, or fixed tangential wave
//! vector components with the remaining component determined by the
//! embedding medium.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AcousticsError, Result};
use crate::lattice::{reciprocal_orders_1d, reciprocal_orders_2d, Axis, Lattice, WaveVector};
use crate::material::AcousticMaterial;
use crate::util::sqrt_up;

/// Kind of wave attached to an expansion.
///
/// Spherical and cylindrical waves are either regular, finite at their
/// origin, or singular, satisfying the radiation condition. Plane waves
/// with fixed tangential components propagate or decay either up or down
/// along the missing axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeType {
    /// Regular wave, finite at the expansion center
    Regular,
    /// Singular wave, outgoing radiation
    Singular,
    /// Plane wave traveling toward positive values of the missing axis
    Up,
    /// Plane wave traveling toward negative values of the missing axis
    Down,
}

impl fmt::Display for ModeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Regular => "regular",
            Self::Singular => "singular",
            Self::Up => "up",
            Self::Down => "down",
        };
        f.write_str(s)
    }
}

fn validate_positions(positions: &[[f64; 3]]) -> Result<()> {
    if positions.is_empty() {
        return Err(AcousticsError::InvalidMode(
            "basis needs at least one position".into(),
        ));
    }
    if positions.iter().flatten().any(|x| !x.is_finite()) {
        return Err(AcousticsError::InvalidMode(
            "positions must be finite".into(),
        ));
    }
    Ok(())
}

fn positions_match(a: &[[f64; 3]], b: &[[f64; 3]]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| p == q)
}

/// Basis of scalar spherical waves.
///
/// Modes are triples `(pidx, l, m)` of position index, degree, and
/// order. The monopole `l = 0` is included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarSphericalWaveBasis {
    modes: Vec<(usize, usize, i32)>,
    positions: Vec<[f64; 3]>,
}

impl ScalarSphericalWaveBasis {
    /// Create a basis from mode triples and positions.
    ///
    /// Duplicate modes are dropped, keeping the first occurrence. The
    /// degree is checked against `l >= |m|` and the position index
    /// against the number of positions.
    pub fn new(modes: &[(usize, i64, i64)], positions: &[[f64; 3]]) -> Result<Self> {
        validate_positions(positions)?;
        let mut seen = Vec::with_capacity(modes.len());
        for &(pidx, l, m) in modes {
            if l < 0 {
                return Err(AcousticsError::InvalidMode(format!(
                    "negative degree l = {l}"
                )));
            }
            if m.abs() > l {
                return Err(AcousticsError::InvalidMode(format!(
                    "order m = {m} exceeds degree l = {l}"
                )));
            }
            if pidx >= positions.len() {
                return Err(AcousticsError::InvalidMode(format!(
                    "position index {pidx} out of range for {} positions",
                    positions.len()
                )));
            }
            let mode = (pidx, l as usize, m as i32);
            if !seen.contains(&mode) {
                seen.push(mode);
            }
        }
        Ok(Self {
            modes: seen,
            positions: positions.to_vec(),
        })
    }

    /// Create a basis at the origin from `(l, m)` pairs.
    pub fn from_lm(lm: &[(i64, i64)]) -> Result<Self> {
        let modes: Vec<(usize, i64, i64)> = lm.iter().map(|&(l, m)| (0, l, m)).collect();
        Self::new(&modes, &[[0.0; 3]])
    }

    /// Complete basis at the origin with all degrees up to `lmax`.
    pub fn default(lmax: usize) -> Self {
        Self::default_at(lmax, &[[0.0; 3]])
            .unwrap_or(Self {
                modes: Vec::new(),
                positions: vec![[0.0; 3]],
            })
    }

    /// Complete basis with all degrees up to `lmax` at each position.
    ///
    /// Modes are ordered position major, then by ascending degree and
    /// order.
    pub fn default_at(lmax: usize, positions: &[[f64; 3]]) -> Result<Self> {
        validate_positions(positions)?;
        let mut modes = Vec::with_capacity(positions.len() * (lmax + 1) * (lmax + 1));
        for pidx in 0..positions.len() {
            for l in 0..=lmax {
                for m in -(l as i32)..=(l as i32) {
                    modes.push((pidx, l, m));
                }
            }
        }
        Ok(Self {
            modes,
            positions: positions.to_vec(),
        })
    }

    /// Number of modes of a complete basis.
    pub fn default_dim(lmax: usize, npos: usize) -> usize {
        npos * (lmax + 1) * (lmax + 1)
    }

    /// Maximal degree of a complete basis with the given number of modes.
    pub fn default_lmax(dim: usize, npos: usize) -> Result<usize> {
        if npos == 0 || dim == 0 || dim % npos != 0 {
            return Err(AcousticsError::DimensionMismatch {
                expected: npos.max(1),
                got: dim,
            });
        }
        let per_pos = dim / npos;
        let lmax = (per_pos as f64).sqrt() as usize;
        for cand in lmax.saturating_sub(1)..=lmax + 1 {
            if (cand + 1) * (cand + 1) == per_pos {
                return Ok(cand);
            }
        }
        Err(AcousticsError::InvalidMode(format!(
            "{dim} modes at {npos} positions do not form a complete basis"
        )))
    }

    /// Mode triples `(pidx, l, m)`.
    pub fn modes(&self) -> &[(usize, usize, i32)] {
        &self.modes
    }

    /// Positions the modes are attached to.
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// Mode at the given index.
    pub fn mode(&self, i: usize) -> (usize, usize, i32) {
        self.modes[i]
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// True if the basis holds no modes.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Index of a mode in the basis.
    pub fn index_of(&self, mode: (usize, usize, i32)) -> Option<usize> {
        self.modes.iter().position(|&m| m == mode)
    }

    /// Largest degree appearing in the basis.
    pub fn lmax(&self) -> usize {
        self.modes.iter().map(|&(_, l, _)| l).max().unwrap_or(0)
    }

    /// True if all modes sit at the global origin.
    pub fn is_global(&self) -> bool {
        self.positions.len() == 1 && self.positions[0] == [0.0; 3]
    }

    /// Modes contained in both bases, in the order of `self`.
    pub fn intersection(&self, other: &Self) -> Result<Self> {
        if !positions_match(&self.positions, &other.positions) {
            return Err(AcousticsError::IncompatibleBasis(
                "positions differ".into(),
            ));
        }
        let modes = self
            .modes
            .iter()
            .copied()
            .filter(|m| other.modes.contains(m))
            .collect();
        Ok(Self {
            modes,
            positions: self.positions.clone(),
        })
    }

    /// True if every mode of `self` appears in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        positions_match(&self.positions, &other.positions)
            && self.modes.iter().all(|m| other.modes.contains(m))
    }
}

/// Basis of scalar cylindrical waves.
///
/// Modes are triples `(pidx, kz, m)` of position index, axial wave
/// number, and azimuthal order. Bases generated from diffraction orders
/// carry their lattice and Bloch wave vector as annotation hints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScalarCylindricalWaveBasis {
    modes: Vec<(usize, f64, i32)>,
    positions: Vec<[f64; 3]>,
    /// Lattice hint set by [`ScalarCylindricalWaveBasis::diffr_orders`]
    pub lattice: Option<Lattice>,
    /// Bloch wave vector hint
    pub kpar: Option<WaveVector>,
}

impl PartialEq for ScalarCylindricalWaveBasis {
    fn eq(&self, other: &Self) -> bool {
        self.modes == other.modes && positions_match(&self.positions, &other.positions)
    }
}

impl ScalarCylindricalWaveBasis {
    /// Create a basis from mode triples and positions.
    pub fn new(modes: &[(usize, f64, i64)], positions: &[[f64; 3]]) -> Result<Self> {
        validate_positions(positions)?;
        let mut seen = Vec::with_capacity(modes.len());
        for &(pidx, kz, m) in modes {
            if !kz.is_finite() {
                return Err(AcousticsError::InvalidMode(format!(
                    "axial wave number kz = {kz} is not finite"
                )));
            }
            if pidx >= positions.len() {
                return Err(AcousticsError::InvalidMode(format!(
                    "position index {pidx} out of range for {} positions",
                    positions.len()
                )));
            }
            let mode = (pidx, kz, m as i32);
            if !seen.contains(&mode) {
                seen.push(mode);
            }
        }
        Ok(Self {
            modes: seen,
            positions: positions.to_vec(),
            lattice: None,
            kpar: None,
        })
    }

    /// Create a basis at the origin from `(kz, m)` pairs.
    pub fn from_zm(zm: &[(f64, i64)]) -> Result<Self> {
        let modes: Vec<(usize, f64, i64)> = zm.iter().map(|&(kz, m)| (0, kz, m)).collect();
        Self::new(&modes, &[[0.0; 3]])
    }

    /// Complete basis at the origin for the given axial wave numbers.
    ///
    /// The wave numbers keep their given order, the azimuthal order runs
    /// from `-mmax` to `mmax` within each of them.
    pub fn default(kzs: &[f64], mmax: i64) -> Self {
        let mut modes = Vec::with_capacity(kzs.len() * (2 * mmax as usize + 1));
        for &kz in kzs {
            for m in -mmax..=mmax {
                modes.push((0, kz, m as i32));
            }
        }
        Self {
            modes,
            positions: vec![[0.0; 3]],
            lattice: None,
            kpar: None,
        }
    }

    /// Complete basis at each position for the given axial wave numbers.
    pub fn default_at(kzs: &[f64], mmax: i64, positions: &[[f64; 3]]) -> Result<Self> {
        validate_positions(positions)?;
        let mut modes = Vec::new();
        for pidx in 0..positions.len() {
            for &kz in kzs {
                for m in -mmax..=mmax {
                    modes.push((pidx, kz, m as i32));
                }
            }
        }
        Ok(Self {
            modes,
            positions: positions.to_vec(),
            lattice: None,
            kpar: None,
        })
    }

    /// Number of modes of a complete basis.
    pub fn default_dim(nkz: usize, mmax: i64, npos: usize) -> usize {
        npos * nkz * (2 * mmax as usize + 1)
    }

    /// Maximal azimuthal order of a complete basis with the given size.
    pub fn default_mmax(dim: usize, nkz: usize, npos: usize) -> Result<i64> {
        let per = nkz * npos;
        if per == 0 || dim % per != 0 || (dim / per) % 2 == 0 {
            return Err(AcousticsError::InvalidMode(format!(
                "{dim} modes do not form a complete basis with {nkz} axial wave \
                 numbers at {npos} positions"
            )));
        }
        Ok(((dim / per - 1) / 2) as i64)
    }

    /// Basis of diffraction orders of a z-periodic arrangement.
    ///
    /// The axial wave numbers are `kz` shifted by all reciprocal lattice
    /// points within `bmax`, in ascending order. The lattice and the
    /// Bloch wave vector are kept as annotation hints.
    pub fn diffr_orders(kz: f64, mmax: i64, lattice: &Lattice, bmax: f64) -> Result<Self> {
        Self::diffr_orders_at(kz, mmax, lattice, bmax, &[[0.0; 3]])
    }

    /// Diffraction orders with modes repeated at each position.
    pub fn diffr_orders_at(
        kz: f64,
        mmax: i64,
        lattice: &Lattice,
        bmax: f64,
        positions: &[[f64; 3]],
    ) -> Result<Self> {
        validate_positions(positions)?;
        let pitch = lattice.z_pitch()?;
        let b = std::f64::consts::TAU / pitch;
        let mut kzs: Vec<f64> = reciprocal_orders_1d(b, bmax)
            .into_iter()
            .map(|n| kz + n as f64 * b)
            .collect();
        kzs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mut basis = Self::default_at(&kzs, mmax, positions)?;
        basis.lattice = Some(Lattice::one_d(pitch, Axis::Z));
        basis.kpar = Some(WaveVector::from_kz(kz));
        Ok(basis)
    }

    /// Mode triples `(pidx, kz, m)`.
    pub fn modes(&self) -> &[(usize, f64, i32)] {
        &self.modes
    }

    /// Positions the modes are attached to.
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// Mode at the given index.
    pub fn mode(&self, i: usize) -> (usize, f64, i32) {
        self.modes[i]
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// True if the basis holds no modes.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Index of a mode in the basis.
    pub fn index_of(&self, mode: (usize, f64, i32)) -> Option<usize> {
        self.modes.iter().position(|&m| m == mode)
    }

    /// Axial wave numbers of all modes.
    pub fn kz(&self) -> Vec<f64> {
        self.modes.iter().map(|&(_, kz, _)| kz).collect()
    }

    /// Distinct axial wave numbers, ascending.
    pub fn kz_unique(&self) -> Vec<f64> {
        let mut kzs = self.kz();
        kzs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        kzs.dedup();
        kzs
    }

    /// Largest azimuthal order appearing in the basis.
    pub fn mmax(&self) -> i64 {
        self.modes.iter().map(|&(_, _, m)| m.abs() as i64).max().unwrap_or(0)
    }

    /// True if all modes sit at the global origin.
    pub fn is_global(&self) -> bool {
        self.positions.len() == 1 && self.positions[0] == [0.0; 3]
    }

    /// Modes contained in both bases, in the order of `self`.
    pub fn intersection(&self, other: &Self) -> Result<Self> {
        if !positions_match(&self.positions, &other.positions) {
            return Err(AcousticsError::IncompatibleBasis(
                "positions differ".into(),
            ));
        }
        let modes = self
            .modes
            .iter()
            .copied()
            .filter(|m| other.modes.contains(m))
            .collect();
        Ok(Self {
            modes,
            positions: self.positions.clone(),
            lattice: self.lattice,
            kpar: self.kpar,
        })
    }

    /// True if every mode of `self` appears in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        positions_match(&self.positions, &other.positions)
            && self.modes.iter().all(|m| other.modes.contains(m))
    }
}

/// Basis of scalar plane waves with fixed propagation directions.
///
/// Modes are unit vectors. The wave vector of each mode is the unit
/// vector scaled by the wave number of the embedding medium, so the
/// basis itself is independent of frequency and material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarPlaneWaveBasisByUnitVector {
    qs: Vec<[f64; 3]>,
}

impl ScalarPlaneWaveBasisByUnitVector {
    /// Create a basis from direction vectors.
    ///
    /// The vectors are normalized, duplicates after normalization are
    /// dropped.
    pub fn new(qs: &[[f64; 3]]) -> Result<Self> {
        let mut seen: Vec<[f64; 3]> = Vec::with_capacity(qs.len());
        for q in qs {
            let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2]).sqrt();
            if norm == 0.0 || !norm.is_finite() {
                return Err(AcousticsError::InvalidMode(
                    "propagation direction must be a nonzero finite vector".into(),
                ));
            }
            let unit = [q[0] / norm, q[1] / norm, q[2] / norm];
            if !seen.contains(&unit) {
                seen.push(unit);
            }
        }
        Ok(Self { qs: seen })
    }

    /// Basis holding the single given direction.
    pub fn default(q: [f64; 3]) -> Result<Self> {
        Self::new(&[q])
    }

    /// Unit vectors of all modes.
    pub fn modes(&self) -> &[[f64; 3]] {
        &self.qs
    }

    /// Mode at the given index.
    pub fn mode(&self, i: usize) -> [f64; 3] {
        self.qs[i]
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.qs.len()
    }

    /// True if the basis holds no modes.
    pub fn is_empty(&self) -> bool {
        self.qs.is_empty()
    }

    /// Index of a direction in the basis.
    pub fn index_of(&self, q: [f64; 3]) -> Option<usize> {
        self.qs.iter().position(|&m| m == q)
    }

    /// Tangential components and downward flags.
    ///
    /// Each direction is split into its x and y components and a flag
    /// that is one for directions with negative z component.
    pub fn xys(&self) -> (Vec<f64>, Vec<f64>, Vec<usize>) {
        let x = self.qs.iter().map(|q| q[0]).collect();
        let y = self.qs.iter().map(|q| q[1]).collect();
        let s = self
            .qs
            .iter()
            .map(|q| usize::from(q[2] < 0.0))
            .collect();
        (x, y, s)
    }

    /// Always true, plane waves have no expansion center.
    pub fn is_global(&self) -> bool {
        true
    }

    /// True if every mode of `self` appears in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.qs.iter().all(|q| other.qs.contains(q))
    }

    /// Cycle the coordinate axes, x to y, y to z, z to x.
    pub fn permute(&self) -> Self {
        Self {
            qs: self.qs.iter().map(|q| [q[2], q[0], q[1]]).collect(),
        }
    }

    /// Express the directions through fixed wave vector components.
    ///
    /// The embedding medium must be lossless so the components are real.
    pub fn by_comp(
        &self,
        k0: f64,
        material: &AcousticMaterial,
        alignment: Alignment,
    ) -> Result<ScalarPlaneWaveBasisByComp> {
        let ks = material.ks(k0);
        if ks.im != 0.0 {
            return Err(AcousticsError::InvalidMaterial(
                "lossy embedding has no real wave vector components".into(),
            ));
        }
        let pairs: Vec<[f64; 2]> = self
            .qs
            .iter()
            .map(|q| {
                let k = [q[0] * ks.re, q[1] * ks.re, q[2] * ks.re];
                match alignment {
                    Alignment::Xy => [k[0], k[1]],
                    Alignment::Yz => [k[1], k[2]],
                    Alignment::Zx => [k[2], k[0]],
                }
            })
            .collect();
        ScalarPlaneWaveBasisByComp::aligned(&pairs, alignment)
    }
}

/// Plane of the fixed wave vector components of a
/// [`ScalarPlaneWaveBasisByComp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    /// Components `(kx, ky)` fixed, z component from the medium
    Xy,
    /// Components `(ky, kz)` fixed, x component from the medium
    Yz,
    /// Components `(kz, kx)` fixed, y component from the medium
    Zx,
}

impl Alignment {
    /// Cyclic permutation x to y to z.
    pub fn permuted(self) -> Self {
        match self {
            Self::Xy => Self::Yz,
            Self::Yz => Self::Zx,
            Self::Zx => Self::Xy,
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Xy => "xy",
            Self::Yz => "yz",
            Self::Zx => "zx",
        };
        f.write_str(s)
    }
}

/// Basis of scalar plane waves with fixed tangential wave vector
/// components.
///
/// Two wave vector components are fixed per mode, the third follows
/// from the dispersion relation of the embedding medium and the
/// propagation direction [`ModeType::Up`] or [`ModeType::Down`]. Bases
/// generated from diffraction orders carry lattice and Bloch wave
/// vector hints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScalarPlaneWaveBasisByComp {
    pairs: Vec<[f64; 2]>,
    alignment: Alignment,
    /// Lattice hint set by [`ScalarPlaneWaveBasisByComp::diffr_orders`]
    pub lattice: Option<Lattice>,
    /// Bloch wave vector hint
    pub kpar: Option<WaveVector>,
}

impl PartialEq for ScalarPlaneWaveBasisByComp {
    fn eq(&self, other: &Self) -> bool {
        self.pairs == other.pairs && self.alignment == other.alignment
    }
}

impl ScalarPlaneWaveBasisByComp {
    /// Create a basis from component pairs, dropping duplicates.
    pub fn aligned(pairs: &[[f64; 2]], alignment: Alignment) -> Result<Self> {
        let mut seen: Vec<[f64; 2]> = Vec::with_capacity(pairs.len());
        for p in pairs {
            if !p[0].is_finite() || !p[1].is_finite() {
                return Err(AcousticsError::InvalidMode(
                    "wave vector components must be finite".into(),
                ));
            }
            if !seen.contains(p) {
                seen.push(*p);
            }
        }
        Ok(Self {
            pairs: seen,
            alignment,
            lattice: None,
            kpar: None,
        })
    }

    /// Basis holding a single pair of x and y components.
    pub fn default(kpar: [f64; 2]) -> Self {
        Self {
            pairs: vec![kpar],
            alignment: Alignment::Xy,
            lattice: None,
            kpar: None,
        }
    }

    /// Basis holding a single pair with the given alignment.
    pub fn single(kpar: [f64; 2], alignment: Alignment) -> Self {
        Self {
            pairs: vec![kpar],
            alignment,
            lattice: None,
            kpar: None,
        }
    }

    /// Basis of diffraction orders of an x-y periodic arrangement.
    ///
    /// The pairs are `kpar` shifted by all reciprocal lattice points
    /// within `bmax`. The lattice and the Bloch wave vector are kept as
    /// annotation hints.
    pub fn diffr_orders(kpar: [f64; 2], lattice: &Lattice, bmax: f64) -> Result<Self> {
        let sub = lattice.xy_sublattice()?;
        let vectors = match sub.reciprocal() {
            Lattice::TwoD { vectors } => vectors,
            _ => {
                return Err(AcousticsError::InvalidLattice(
                    "diffraction orders need a two-dimensional lattice".into(),
                ))
            }
        };
        let pairs: Vec<[f64; 2]> = reciprocal_orders_2d(&vectors, bmax)
            .into_iter()
            .map(|[n1, n2]| {
                [
                    kpar[0] + n1 as f64 * vectors[0][0] + n2 as f64 * vectors[1][0],
                    kpar[1] + n1 as f64 * vectors[0][1] + n2 as f64 * vectors[1][1],
                ]
            })
            .collect();
        let mut basis = Self::aligned(&pairs, Alignment::Xy)?;
        basis.lattice = Some(sub);
        basis.kpar = Some(WaveVector::from_kxky(kpar[0], kpar[1]));
        Ok(basis)
    }

    /// Component pairs of all modes.
    pub fn pairs(&self) -> &[[f64; 2]] {
        &self.pairs
    }

    /// Plane of the fixed components.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Mode at the given index.
    pub fn mode(&self, i: usize) -> [f64; 2] {
        self.pairs[i]
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if the basis holds no modes.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Index of a component pair in the basis.
    pub fn index_of(&self, pair: [f64; 2]) -> Option<usize> {
        self.pairs.iter().position(|&p| p == pair)
    }

    /// Fixed x components, if the alignment carries them.
    pub fn kx(&self) -> Option<Vec<f64>> {
        match self.alignment {
            Alignment::Xy => Some(self.pairs.iter().map(|p| p[0]).collect()),
            Alignment::Zx => Some(self.pairs.iter().map(|p| p[1]).collect()),
            Alignment::Yz => None,
        }
    }

    /// Fixed y components, if the alignment carries them.
    pub fn ky(&self) -> Option<Vec<f64>> {
        match self.alignment {
            Alignment::Xy => Some(self.pairs.iter().map(|p| p[1]).collect()),
            Alignment::Yz => Some(self.pairs.iter().map(|p| p[0]).collect()),
            Alignment::Zx => None,
        }
    }

    /// Fixed z components, if the alignment carries them.
    pub fn kz(&self) -> Option<Vec<f64>> {
        match self.alignment {
            Alignment::Yz => Some(self.pairs.iter().map(|p| p[1]).collect()),
            Alignment::Zx => Some(self.pairs.iter().map(|p| p[0]).collect()),
            Alignment::Xy => None,
        }
    }

    /// Always true, plane waves have no expansion center.
    pub fn is_global(&self) -> bool {
        true
    }

    /// True if every mode of `self` appears in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.alignment == other.alignment
            && self.pairs.iter().all(|p| other.pairs.contains(p))
    }

    /// Cycle the alignment plane, keeping the component pairs.
    ///
    /// Annotation hints refer to the old axes and are dropped.
    pub fn permute(&self) -> Self {
        Self {
            pairs: self.pairs.clone(),
            alignment: self.alignment.permuted(),
            lattice: None,
            kpar: None,
        }
    }

    /// Complete wave vectors in the given medium.
    ///
    /// The missing component is `sqrt(ks² - k1² - k2²)` with nonnegative
    /// imaginary part, negated for [`ModeType::Down`].
    pub fn kvecs(
        &self,
        k0: f64,
        material: &AcousticMaterial,
        modetype: ModeType,
    ) -> Result<Vec<[Complex64; 3]>> {
        let sign = match modetype {
            ModeType::Up => 1.0,
            ModeType::Down => -1.0,
            _ => {
                return Err(AcousticsError::InvalidMode(
                    "plane waves with fixed components are up or down".into(),
                ))
            }
        };
        let ks = material.ks(k0);
        Ok(self
            .pairs
            .iter()
            .map(|p| {
                let missing = sign
                    * sqrt_up(ks * ks - Complex64::new(p[0] * p[0] + p[1] * p[1], 0.0));
                match self.alignment {
                    Alignment::Xy => [p[0].into(), p[1].into(), missing],
                    Alignment::Yz => [missing, p[0].into(), p[1].into()],
                    Alignment::Zx => [p[1].into(), missing, p[0].into()],
                }
            })
            .collect())
    }

    /// Express the modes through propagation directions.
    ///
    /// All modes must be propagating in the given lossless medium, with
    /// the missing component taken on the upward branch.
    pub fn by_unit_vector(
        &self,
        k0: f64,
        material: &AcousticMaterial,
    ) -> Result<ScalarPlaneWaveBasisByUnitVector> {
        let ks = material.ks(k0);
        if ks.im != 0.0 {
            return Err(AcousticsError::InvalidMaterial(
                "lossy embedding has no real propagation directions".into(),
            ));
        }
        let mut qs = Vec::with_capacity(self.pairs.len());
        for kvec in self.kvecs(k0, material, ModeType::Up)? {
            if kvec.iter().any(|c| c.im != 0.0) {
                return Err(AcousticsError::InvalidMode(
                    "evanescent mode has no propagation direction".into(),
                ));
            }
            qs.push([kvec[0].re / ks.re, kvec[1].re / ks.re, kvec[2].re / ks.re]);
        }
        ScalarPlaneWaveBasisByUnitVector::new(&qs)
    }
}

/// Any of the four scalar wave basis sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AcousticBasis {
    /// Spherical waves
    Spherical(ScalarSphericalWaveBasis),
    /// Cylindrical waves
    Cylindrical(ScalarCylindricalWaveBasis),
    /// Plane waves by unit vector
    PlaneUnitVector(ScalarPlaneWaveBasisByUnitVector),
    /// Plane waves by components
    PlaneComp(ScalarPlaneWaveBasisByComp),
}

impl AcousticBasis {
    /// Number of modes.
    pub fn len(&self) -> usize {
        match self {
            Self::Spherical(b) => b.len(),
            Self::Cylindrical(b) => b.len(),
            Self::PlaneUnitVector(b) => b.len(),
            Self::PlaneComp(b) => b.len(),
        }
    }

    /// True if the basis holds no modes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions of the expansion centers.
    ///
    /// Plane wave bases report the global origin.
    pub fn positions(&self) -> &[[f64; 3]] {
        match self {
            Self::Spherical(b) => b.positions(),
            Self::Cylindrical(b) => b.positions(),
            Self::PlaneUnitVector(_) | Self::PlaneComp(_) => &[[0.0; 3]],
        }
    }
}

impl From<ScalarSphericalWaveBasis> for AcousticBasis {
    fn from(b: ScalarSphericalWaveBasis) -> Self {
        Self::Spherical(b)
    }
}

impl From<ScalarCylindricalWaveBasis> for AcousticBasis {
    fn from(b: ScalarCylindricalWaveBasis) -> Self {
        Self::Cylindrical(b)
    }
}

impl From<ScalarPlaneWaveBasisByUnitVector> for AcousticBasis {
    fn from(b: ScalarPlaneWaveBasisByUnitVector) -> Self {
        Self::PlaneUnitVector(b)
    }
}

impl From<ScalarPlaneWaveBasisByComp> for AcousticBasis {
    fn from(b: ScalarPlaneWaveBasisByComp) -> Self {
        Self::PlaneComp(b)
    }
}
