//! Scattering widths and amplitudes of infinite cylinders.
//!
//! Pins the orientation averaged widths, the plane wave widths and the
//! scattered amplitudes of single cylinders, and the classification of
//! modes into propagating and evanescent radial wave numbers.

use approx::assert_relative_eq;
use num_complex::Complex64;

use acoustotreams::{plane_wave_scalar, AcousticMaterial, AcousticTMatrixC};

fn lossy_solid() -> AcousticMaterial {
    AcousticMaterial::new(
        Complex64::new(200.0, 10.0),
        Complex64::new(1000.0, -100.0),
        500.0,
    )
}

fn lossy_fluid() -> AcousticMaterial {
    AcousticMaterial::new(
        Complex64::new(200.0, 10.0),
        Complex64::new(1000.0, -100.0),
        0.0,
    )
}

fn embedding() -> AcousticMaterial {
    AcousticMaterial::fluid(900.0, 686.0)
}

#[test]
fn averaged_widths_fluid_core() {
    let tm =
        AcousticTMatrixC::cylinder(&[-1.0, 1.0], 1, 3.0, 4.0, &[lossy_fluid(), embedding()])
            .unwrap();
    assert_relative_eq!(tm.xw_ext_avg().unwrap(), 2.976939980231719, max_relative = 1e-9);
    assert_relative_eq!(tm.xw_sca_avg().unwrap(), 1.3598694262205515, max_relative = 1e-9);
}

#[test]
fn averaged_widths_solid_core() {
    let tm =
        AcousticTMatrixC::cylinder(&[-1.0, 1.0], 1, 3.0, 4.0, &[lossy_solid(), embedding()])
            .unwrap();
    assert_relative_eq!(tm.xw_ext_avg().unwrap(), 2.290707230990416, max_relative = 1e-9);
    assert_relative_eq!(tm.xw_sca_avg().unwrap(), 1.4786629338238299, max_relative = 1e-9);
}

#[test]
fn radial_wave_numbers_split_at_the_sound_cone() {
    let tm = AcousticTMatrixC::cylinder(
        &[0.0, 5.0],
        1,
        3.0,
        1.0,
        &[lossy_fluid(), AcousticMaterial::default()],
    )
    .unwrap();
    let want = [
        Complex64::new(3.0, 0.0),
        Complex64::new(3.0, 0.0),
        Complex64::new(3.0, 0.0),
        Complex64::new(0.0, 4.0),
        Complex64::new(0.0, 4.0),
        Complex64::new(0.0, 4.0),
    ];
    let krhos = tm.krhos();
    assert_eq!(krhos.len(), want.len());
    for (got, want) in krhos.iter().zip(want.iter()) {
        assert!((got - want).norm() < 1e-14, "krho {got} differs from {want}");
    }
}

#[test]
fn plane_wave_widths() {
    let tm = AcousticTMatrixC::cylinder(
        &[1.0],
        1,
        3.0,
        4.0,
        &[lossy_fluid(), AcousticMaterial::default()],
    )
    .unwrap();
    let kx = (tm.k0 * tm.k0 - 1.0).sqrt();
    let inc = plane_wave_scalar(&[kx, 0.0, 1.0], tm.k0, None, tm.material, None).unwrap();
    let (sca, ext) = tm.xw(&inc, 0.1255).unwrap();
    assert_relative_eq!(sca, 5.892670869743773, max_relative = 1e-9);
    assert_relative_eq!(ext, 5.902641304396861, max_relative = 1e-9);
}

#[test]
fn scattered_amplitudes_of_oblique_plane_wave() {
    let tm = AcousticTMatrixC::cylinder(
        &[1.0],
        1,
        3.0,
        4.0,
        &[lossy_fluid(), AcousticMaterial::default()],
    )
    .unwrap();
    let kx = (tm.k0 * tm.k0 - 1.0).sqrt();
    let inc = plane_wave_scalar(&[kx, 0.0, 1.0], tm.k0, None, tm.material, None).unwrap();
    let sca = tm.sca(&inc).unwrap();

    // mode order (1,-1), (1,0), (1,1)
    let want0 = Complex64::new(0.3506619987521309, 0.14429243052400523);
    let want1 = Complex64::new(-0.8225873645046986, -0.38088979145646645);
    assert!((sca.data[0] - want0).norm() < 1e-9 * want0.norm());
    assert!((sca.data[1] - want1).norm() < 1e-9 * want1.norm());
    assert!((sca.data[2] + want0).norm() < 1e-9 * want0.norm());
}
