//! Canonical incident fields.
//!
//! These helpers build the coefficient arrays of single plane, spherical,
//! and cylindrical waves. Without a target basis the array lives in the
//! natural basis of the source. With one, plane waves are re-expanded in
//! regular spherical or cylindrical modes, while spherical and
//! cylindrical sources pick their mode out of the given basis.

use ndarray::Array1;
use num_complex::Complex64;

use crate::array::AcousticsArray;
use crate::basis::{
    AcousticBasis, ModeType, ScalarCylindricalWaveBasis, ScalarPlaneWaveBasisByComp,
    ScalarPlaneWaveBasisByUnitVector, ScalarSphericalWaveBasis,
};
use crate::error::{AcousticsError, Result};
use crate::material::AcousticMaterial;

/// A plane wave with unit amplitude.
///
/// Two wave vector components fix a plane wave basis with x and y
/// components, three components fix a propagation direction. The mode
/// type defaults to [`ModeType::Up`], for three components to the sign
/// of the z component.
pub fn plane_wave_scalar(
    kvec: &[f64],
    k0: f64,
    basis: Option<&AcousticBasis>,
    material: AcousticMaterial,
    modetype: Option<ModeType>,
) -> Result<AcousticsArray> {
    let native = match kvec.len() {
        3 => {
            let qs = [[kvec[0], kvec[1], kvec[2]]];
            let b = ScalarPlaneWaveBasisByUnitVector::new(&qs)?;
            let mt = modetype.unwrap_or(if kvec[2] >= 0.0 {
                ModeType::Up
            } else {
                ModeType::Down
            });
            AcousticsArray::new(unit_coefficient(), b.into(), k0, material, mt)?
        }
        2 => {
            let b = ScalarPlaneWaveBasisByComp::default([kvec[0], kvec[1]]);
            let mt = modetype.unwrap_or(ModeType::Up);
            AcousticsArray::new(unit_coefficient(), b.into(), k0, material, mt)?
        }
        n => {
            return Err(AcousticsError::DimensionMismatch {
                expected: 3,
                got: n,
            })
        }
    };
    match basis {
        None => Ok(native),
        Some(b) => {
            let mt = match b {
                AcousticBasis::Spherical(_) | AcousticBasis::Cylindrical(_) => ModeType::Regular,
                _ => native.modetype,
            };
            native.expand(b, mt)
        }
    }
}

/// A single spherical wave of degree `l` and order `m`.
pub fn spherical_wave_scalar(
    l: usize,
    m: i32,
    k0: f64,
    basis: Option<&AcousticBasis>,
    material: AcousticMaterial,
    modetype: Option<ModeType>,
) -> Result<AcousticsArray> {
    let modetype = source_kind(modetype)?;
    let basis = match basis {
        Some(b) => b.clone(),
        None => ScalarSphericalWaveBasis::from_lm(&[(l as i64, m as i64)])?.into(),
    };
    let swb = match &basis {
        AcousticBasis::Spherical(b) => b,
        _ => {
            return Err(AcousticsError::IncompatibleBasis(
                "a spherical source needs a spherical basis".into(),
            ))
        }
    };
    let idx = swb.index_of((0, l, m)).ok_or_else(|| {
        AcousticsError::IncompatibleBasis("basis does not hold the requested mode".into())
    })?;
    let mut data = Array1::zeros(swb.len());
    data[idx] = Complex64::new(1.0, 0.0);
    AcousticsArray::new(data, basis, k0, material, modetype)
}

/// A single cylindrical wave of axial wave number `kz` and order `m`.
pub fn cylindrical_wave_scalar(
    kz: f64,
    m: i32,
    k0: f64,
    basis: Option<&AcousticBasis>,
    material: AcousticMaterial,
    modetype: Option<ModeType>,
) -> Result<AcousticsArray> {
    let modetype = source_kind(modetype)?;
    let basis = match basis {
        Some(b) => b.clone(),
        None => ScalarCylindricalWaveBasis::new(&[(0, kz, m as i64)], &[[0.0; 3]])?.into(),
    };
    let cwb = match &basis {
        AcousticBasis::Cylindrical(b) => b,
        _ => {
            return Err(AcousticsError::IncompatibleBasis(
                "a cylindrical source needs a cylindrical basis".into(),
            ))
        }
    };
    let idx = cwb.index_of((0, kz, m)).ok_or_else(|| {
        AcousticsError::IncompatibleBasis("basis does not hold the requested mode".into())
    })?;
    let mut data = Array1::zeros(cwb.len());
    data[idx] = Complex64::new(1.0, 0.0);
    AcousticsArray::new(data, basis, k0, material, modetype)
}

fn unit_coefficient() -> Array1<Complex64> {
    Array1::from_elem(1, Complex64::new(1.0, 0.0))
}

fn source_kind(modetype: Option<ModeType>) -> Result<ModeType> {
    match modetype {
        None => Ok(ModeType::Regular),
        Some(mt @ (ModeType::Regular | ModeType::Singular)) => Ok(mt),
        Some(_) => Err(AcousticsError::InvalidMode(
            "wave sources are regular or singular".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn plane_wave_native_annotations() {
        let up = plane_wave_scalar(&[0.0, 0.6, 0.8], 2.0, None, AcousticMaterial::default(), None)
            .unwrap();
        assert_eq!(up.modetype, ModeType::Up);
        assert_eq!(up.data.len(), 1);

        let down =
            plane_wave_scalar(&[0.0, 0.6, -0.8], 2.0, None, AcousticMaterial::default(), None)
                .unwrap();
        assert_eq!(down.modetype, ModeType::Down);

        let partial = plane_wave_scalar(
            &[0.3, -0.4],
            2.0,
            None,
            AcousticMaterial::default(),
            Some(ModeType::Down),
        )
        .unwrap();
        assert!(matches!(partial.basis, AcousticBasis::PlaneComp(_)));
        assert_eq!(partial.modetype, ModeType::Down);

        assert!(
            plane_wave_scalar(&[1.0], 2.0, None, AcousticMaterial::default(), None).is_err()
        );
    }

    #[test]
    fn plane_wave_spherical_expansion_reproduces_field() {
        let mat = AcousticMaterial::default();
        let k0 = 1.0;
        let kvec = [0.0, 0.6, 0.8];
        let native = plane_wave_scalar(&kvec, k0, None, mat, None).unwrap();
        let basis = AcousticBasis::Spherical(ScalarSphericalWaveBasis::default(10));
        let expanded = plane_wave_scalar(&kvec, k0, Some(&basis), mat, None).unwrap();
        assert_eq!(expanded.modetype, ModeType::Regular);

        let points = [[0.1, 0.2, 0.3], [-0.2, 0.0, 0.1]];
        let want = native.pfield(&points).unwrap();
        let got = expanded.pfield(&points).unwrap();
        for i in 0..points.len() {
            assert_abs_diff_eq!(got[i].re, want[i].re, epsilon = 1e-10);
            assert_abs_diff_eq!(got[i].im, want[i].im, epsilon = 1e-10);
        }
    }

    #[test]
    fn spherical_wave_in_larger_basis() {
        let basis = AcousticBasis::Spherical(ScalarSphericalWaveBasis::default(2));
        let arr = spherical_wave_scalar(2, -1, 1.5, Some(&basis), AcousticMaterial::default(), None)
            .unwrap();
        assert_eq!(arr.modetype, ModeType::Regular);
        let mut nonzero = 0;
        for (i, c) in arr.data.iter().enumerate() {
            if c.norm() != 0.0 {
                nonzero += 1;
                if let AcousticBasis::Spherical(b) = &arr.basis {
                    assert_eq!(b.mode(i), (0, 2, -1));
                }
            }
        }
        assert_eq!(nonzero, 1);

        assert!(spherical_wave_scalar(
            3,
            0,
            1.5,
            Some(&basis),
            AcousticMaterial::default(),
            None
        )
        .is_err());
    }

    #[test]
    fn cylindrical_wave_defaults() {
        let arr =
            cylindrical_wave_scalar(0.2, 1, 1.5, None, AcousticMaterial::default(), None).unwrap();
        assert_eq!(arr.data.len(), 1);
        assert!(matches!(arr.basis, AcousticBasis::Cylindrical(_)));

        assert!(cylindrical_wave_scalar(
            0.2,
            1,
            1.5,
            None,
            AcousticMaterial::default(),
            Some(ModeType::Up)
        )
        .is_err());
    }
}
