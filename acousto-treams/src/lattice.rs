//! Periodic lattices and partial wave vectors.
//!
//! Lattices of one, two, and three dimensions describe periodic
//! arrangements of scatterers. One-dimensional lattices lie along a
//! coordinate axis, two-dimensional lattices in the x-y plane. The
//! accompanying [`WaveVector`] holds the tangential Bloch wave vector,
//! with unconstrained components marked as NaN.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

use crate::error::{AcousticsError, Result};

/// Coordinate axis of a one-dimensional lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// x axis
    X,
    /// y axis
    Y,
    /// z axis
    Z,
}

/// A periodic lattice of dimension one, two, or three.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Lattice {
    /// Equispaced points along a single axis.
    OneD {
        /// Distance between neighboring lattice points
        pitch: f64,
        /// Axis the lattice is aligned with
        axis: Axis,
    },
    /// A lattice spanned by two vectors in the x-y plane.
    TwoD {
        /// Lattice vectors as rows
        vectors: [[f64; 2]; 2],
    },
    /// A lattice spanned by three vectors.
    ThreeD {
        /// Lattice vectors as rows
        vectors: [[f64; 3]; 3],
    },
}

impl Lattice {
    /// One-dimensional lattice along the given axis.
    pub fn one_d(pitch: f64, axis: Axis) -> Self {
        Self::OneD { pitch, axis }
    }

    /// Square lattice in the x-y plane.
    pub fn square(pitch: f64) -> Self {
        Self::TwoD {
            vectors: [[pitch, 0.0], [0.0, pitch]],
        }
    }

    /// Rectangular lattice in the x-y plane.
    pub fn rectangular(x: f64, y: f64) -> Self {
        Self::TwoD {
            vectors: [[x, 0.0], [0.0, y]],
        }
    }

    /// Cubic lattice.
    pub fn cubic(pitch: f64) -> Self {
        Self::ThreeD {
            vectors: [
                [pitch, 0.0, 0.0],
                [0.0, pitch, 0.0],
                [0.0, 0.0, pitch],
            ],
        }
    }

    /// Two-dimensional lattice from its row vectors.
    pub fn two_d(vectors: [[f64; 2]; 2]) -> Result<Self> {
        let det = vectors[0][0] * vectors[1][1] - vectors[0][1] * vectors[1][0];
        if det == 0.0 {
            return Err(AcousticsError::InvalidLattice(
                "lattice vectors are linearly dependent".into(),
            ));
        }
        Ok(Self::TwoD { vectors })
    }

    /// Three-dimensional lattice from its row vectors.
    pub fn three_d(vectors: [[f64; 3]; 3]) -> Result<Self> {
        if det3(&vectors) == 0.0 {
            return Err(AcousticsError::InvalidLattice(
                "lattice vectors are linearly dependent".into(),
            ));
        }
        Ok(Self::ThreeD { vectors })
    }

    /// Lattice dimension.
    pub fn dim(&self) -> usize {
        match self {
            Self::OneD { .. } => 1,
            Self::TwoD { .. } => 2,
            Self::ThreeD { .. } => 3,
        }
    }

    /// Length, area, or volume of the unit cell.
    pub fn volume(&self) -> f64 {
        match self {
            Self::OneD { pitch, .. } => pitch.abs(),
            Self::TwoD { vectors } => {
                (vectors[0][0] * vectors[1][1] - vectors[0][1] * vectors[1][0]).abs()
            }
            Self::ThreeD { vectors } => det3(vectors).abs(),
        }
    }

    /// Reciprocal lattice, scaled by 2π.
    pub fn reciprocal(&self) -> Self {
        match self {
            Self::OneD { pitch, axis } => Self::OneD {
                pitch: TAU / pitch,
                axis: *axis,
            },
            Self::TwoD { vectors } => {
                let det = vectors[0][0] * vectors[1][1] - vectors[0][1] * vectors[1][0];
                let f = TAU / det;
                Self::TwoD {
                    vectors: [
                        [f * vectors[1][1], -f * vectors[1][0]],
                        [-f * vectors[0][1], f * vectors[0][0]],
                    ],
                }
            }
            Self::ThreeD { vectors } => {
                let det = det3(vectors);
                let f = TAU / det;
                let c = |i: usize, j: usize| {
                    let a = vectors[(i + 1) % 3];
                    let b = vectors[(i + 2) % 3];
                    match j {
                        0 => a[1] * b[2] - a[2] * b[1],
                        1 => a[2] * b[0] - a[0] * b[2],
                        _ => a[0] * b[1] - a[1] * b[0],
                    }
                };
                Self::ThreeD {
                    vectors: [
                        [f * c(0, 0), f * c(0, 1), f * c(0, 2)],
                        [f * c(1, 0), f * c(1, 1), f * c(1, 2)],
                        [f * c(2, 0), f * c(2, 1), f * c(2, 2)],
                    ],
                }
            }
        }
    }

    /// Pitch of a one-dimensional lattice.
    pub fn pitch(&self) -> Option<f64> {
        match self {
            Self::OneD { pitch, .. } => Some(*pitch),
            _ => None,
        }
    }

    /// Period along the z axis.
    ///
    /// Available for a z-aligned one-dimensional lattice and for a
    /// three-dimensional lattice with one vector on the z axis.
    pub fn z_pitch(&self) -> Result<f64> {
        match self {
            Self::OneD {
                pitch,
                axis: Axis::Z,
            } => Ok(*pitch),
            Self::ThreeD { vectors } => vectors
                .iter()
                .find(|v| v[0] == 0.0 && v[1] == 0.0 && v[2] != 0.0)
                .map(|v| v[2])
                .ok_or_else(|| {
                    AcousticsError::InvalidLattice(
                        "no lattice vector along the z axis".into(),
                    )
                }),
            _ => Err(AcousticsError::InvalidLattice(
                "lattice has no z period".into(),
            )),
        }
    }

    /// The part of the lattice lying in the x-y plane.
    ///
    /// A two-dimensional lattice is returned unchanged. For a
    /// three-dimensional lattice the two vectors without z component are
    /// extracted.
    pub fn xy_sublattice(&self) -> Result<Self> {
        match self {
            Self::TwoD { .. } => Ok(*self),
            Self::ThreeD { vectors } => {
                let planar: Vec<[f64; 2]> = vectors
                    .iter()
                    .filter(|v| v[2] == 0.0)
                    .map(|v| [v[0], v[1]])
                    .collect();
                if planar.len() != 2 {
                    return Err(AcousticsError::InvalidLattice(
                        "lattice has no x-y plane sublattice".into(),
                    ));
                }
                Self::two_d([planar[0], planar[1]])
            }
            Self::OneD { pitch, axis } => match axis {
                Axis::Z => Err(AcousticsError::InvalidLattice(
                    "z-aligned lattice has no x-y plane sublattice".into(),
                )),
                _ => Ok(Self::OneD {
                    pitch: *pitch,
                    axis: *axis,
                }),
            },
        }
    }

    /// Place the phase vector components into the slots this lattice spans.
    ///
    /// The remaining components stay unconstrained, so annotations from
    /// lattices of different dimensionality can still be merged.
    pub fn bloch_vector(&self, kpar: &[f64]) -> Result<WaveVector> {
        if kpar.len() != self.dim() {
            return Err(AcousticsError::DimensionMismatch {
                expected: self.dim(),
                got: kpar.len(),
            });
        }
        Ok(match self {
            Self::OneD { axis: Axis::X, .. } => WaveVector::from_kx(kpar[0]),
            Self::OneD { axis: Axis::Y, .. } => {
                WaveVector([f64::NAN, kpar[0], f64::NAN])
            }
            Self::OneD { axis: Axis::Z, .. } => WaveVector::from_kz(kpar[0]),
            Self::TwoD { .. } => WaveVector::from_kxky(kpar[0], kpar[1]),
            Self::ThreeD { .. } => WaveVector([kpar[0], kpar[1], kpar[2]]),
        })
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneD { pitch, axis } => write!(f, "Lattice({pitch}, {axis:?})"),
            Self::TwoD { vectors } => write!(f, "Lattice({vectors:?})"),
            Self::ThreeD { vectors } => write!(f, "Lattice({vectors:?})"),
        }
    }
}

fn det3(v: &[[f64; 3]; 3]) -> f64 {
    v[0][0] * (v[1][1] * v[2][2] - v[1][2] * v[2][1])
        - v[0][1] * (v[1][0] * v[2][2] - v[1][2] * v[2][0])
        + v[0][2] * (v[1][0] * v[2][1] - v[1][1] * v[2][0])
}

/// Reciprocal lattice points of a one-dimensional lattice within `bmax`.
///
/// Returns the integer orders `n` with `|n * b| <= bmax` in ascending
/// order.
pub fn reciprocal_orders_1d(b: f64, bmax: f64) -> Vec<i64> {
    if bmax < 0.0 || b == 0.0 {
        return Vec::new();
    }
    let nmax = (bmax / b.abs()).floor() as i64;
    (-nmax..=nmax).collect()
}

/// Reciprocal lattice points of a two-dimensional lattice within `bmax`.
///
/// Returns integer order pairs `(n1, n2)` with `|n1 b1 + n2 b2| <= bmax`,
/// sorted by distance from the origin.
pub fn reciprocal_orders_2d(b: &[[f64; 2]; 2], bmax: f64) -> Vec<[i64; 2]> {
    let det = (b[0][0] * b[1][1] - b[0][1] * b[1][0]).abs();
    if det == 0.0 || bmax < 0.0 {
        return Vec::new();
    }
    let len = |v: &[f64; 2]| (v[0] * v[0] + v[1] * v[1]).sqrt();
    // bound each index by the distance between neighboring lattice lines
    let n1max = (bmax * len(&b[1]) / det).floor() as i64;
    let n2max = (bmax * len(&b[0]) / det).floor() as i64;
    let mut orders = Vec::new();
    for n1 in -n1max..=n1max {
        for n2 in -n2max..=n2max {
            let x = n1 as f64 * b[0][0] + n2 as f64 * b[1][0];
            let y = n1 as f64 * b[0][1] + n2 as f64 * b[1][1];
            if (x * x + y * y).sqrt() <= bmax {
                orders.push([n1, n2]);
            }
        }
    }
    orders.sort_by(|p, q| {
        let np = norm2(p, b);
        let nq = norm2(q, b);
        np.partial_cmp(&nq)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(p.cmp(q))
    });
    orders
}

fn norm2(n: &[i64; 2], b: &[[f64; 2]; 2]) -> f64 {
    let x = n[0] as f64 * b[0][0] + n[1] as f64 * b[1][0];
    let y = n[0] as f64 * b[0][1] + n[1] as f64 * b[1][1];
    x * x + y * y
}

/// A wave vector with possibly unconstrained components.
///
/// Lattice interactions fix only the components along the periodic
/// directions. The remaining components are marked NaN and compare equal
/// to any other NaN entry.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WaveVector(pub [f64; 3]);

impl WaveVector {
    /// Wave vector with only the z component fixed.
    pub fn from_kz(kz: f64) -> Self {
        Self([f64::NAN, f64::NAN, kz])
    }

    /// Wave vector with only the x component fixed.
    pub fn from_kx(kx: f64) -> Self {
        Self([kx, f64::NAN, f64::NAN])
    }

    /// Wave vector with the x and y components fixed.
    pub fn from_kxky(kx: f64, ky: f64) -> Self {
        Self([kx, ky, f64::NAN])
    }

    /// Combine two wave vectors, requiring fixed components to agree.
    pub fn merge(&self, other: &Self) -> Result<Self> {
        let mut out = [0.0; 3];
        for i in 0..3 {
            let (a, b) = (self.0[i], other.0[i]);
            out[i] = match (a.is_nan(), b.is_nan()) {
                (true, true) => f64::NAN,
                (true, false) => b,
                (false, true) => a,
                (false, false) => {
                    if a == b {
                        a
                    } else {
                        return Err(AcousticsError::AnnotationMismatch(format!(
                            "wave vector components {a} and {b} differ"
                        )));
                    }
                }
            };
        }
        Ok(Self(out))
    }
}

impl PartialEq for WaveVector {
    fn eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a.is_nan() && b.is_nan()) || a == b)
    }
}

impl From<[f64; 3]> for WaveVector {
    fn from(v: [f64; 3]) -> Self {
        Self(v)
    }
}
