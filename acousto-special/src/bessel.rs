//! Bessel and Hankel functions for real and complex arguments.
//!
//! The spherical functions follow the standard definitions
//! ```text
//! j_l(x) = √(π/2x) J_{l+1/2}(x)
//! y_l(x) = √(π/2x) Y_{l+1/2}(x)
//! h_l^(1)(x) = j_l(x) + i y_l(x)
//! ```
//! and the cylindrical functions are the integer-order J_m, Y_m and
//! H_m^(1) = J_m + i Y_m.
//!
//! Real-argument spherical functions use Miller's downward recurrence for
//! j_l and upward recurrence for y_l. The complex-argument cylindrical
//! J_m uses the downward recurrence normalized with the series identity
//! ```text
//! J_0(z) + 2 J_2(z) + 2 J_4(z) + ... = 1
//! ```
//! which stays valid off the real axis. The outgoing H_m^(1) is seeded at
//! orders 0 and 1 (ascending series below |z| = 20, the large-argument
//! expansion above) and carried upward; with Im z >= 0 the outgoing
//! solution dominates in that direction, so the recurrence is stable.

use num_complex::Complex64;
use std::f64::consts::PI;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Spherical Bessel functions j_l(x) for l = 0, ..., order-1.
///
/// Uses Miller's downward recurrence
/// ```text
/// j_{l-1}(x) = (2l+1)/x * j_l(x) - j_{l+1}(x)
/// ```
/// normalized with j_0(x) = sin(x)/x, which is stable also for l > x.
///
/// # Arguments
/// * `order` - Number of terms (returns j_0 through j_{order-1})
/// * `x` - Argument
pub fn spherical_bessel_j(order: usize, x: f64) -> Vec<f64> {
    assert!(order >= 1, "order must be at least 1");

    let mut result = vec![0.0; order];

    if x.abs() < 1e-15 {
        result[0] = 1.0;
        return result;
    }

    if x.abs() < 1e-8 {
        result[0] = 1.0 - x * x / 6.0;
        if order > 1 {
            result[1] = x / 3.0;
        }
        return result;
    }

    let start_n = order + (x.abs() as usize) + 20;
    let mut values = vec![0.0; start_n + 2];
    values[start_n] = 1e-30;

    for k in (0..start_n).rev() {
        values[k] = (2 * k + 3) as f64 / x * values[k + 1] - values[k + 2];
    }

    let scale = (x.sin() / x) / values[0];
    for l in 0..order {
        result[l] = values[l] * scale;
    }
    result
}

/// Spherical Bessel functions y_l(x) for l = 0, ..., order-1.
///
/// Upward recurrence from y_0(x) = -cos(x)/x and
/// y_1(x) = -cos(x)/x² - sin(x)/x, stable in this direction.
pub fn spherical_bessel_y(order: usize, x: f64) -> Vec<f64> {
    assert!(order >= 1, "order must be at least 1");

    let mut result = vec![0.0; order];
    if x.abs() < 1e-15 {
        for item in result.iter_mut() {
            *item = f64::NEG_INFINITY;
        }
        return result;
    }

    let (sin_x, cos_x) = x.sin_cos();
    result[0] = -cos_x / x;
    if order == 1 {
        return result;
    }
    result[1] = -cos_x / (x * x) - sin_x / x;
    for l in 2..order {
        result[l] = (2 * l - 1) as f64 / x * result[l - 1] - result[l - 2];
    }
    result
}

/// Spherical Hankel functions of the first kind for l = 0, ..., order-1.
pub fn spherical_hankel1(order: usize, x: f64) -> Vec<Complex64> {
    let j = spherical_bessel_j(order, x);
    let y = spherical_bessel_y(order, x);
    j.iter()
        .zip(y.iter())
        .map(|(&re, &im)| Complex64::new(re, im))
        .collect()
}

/// Derivatives j_l'(x) for l = 0, ..., order-1 via
/// ```text
/// j_l'(x) = j_{l-1}(x) - (l+1)/x * j_l(x),    j_0'(x) = -j_1(x)
/// ```
pub fn spherical_bessel_j_derivative(order: usize, x: f64) -> Vec<f64> {
    let j = spherical_bessel_j(order + 1, x);
    let mut result = vec![0.0; order];
    for l in 0..order {
        if l == 0 {
            result[0] = -j[1];
        } else {
            result[l] = j[l - 1] - (l + 1) as f64 / x * j[l];
        }
    }
    result
}

/// Spherical Bessel functions j_l(z) of complex argument, l = 0, ..., order-1.
///
/// Same downward recurrence as the real case; the normalization switches to
/// j_1 when sin(z)/z is close to a zero.
pub fn spherical_bessel_j_c(order: usize, z: Complex64) -> Vec<Complex64> {
    assert!(order >= 1, "order must be at least 1");

    let mut result = vec![Complex64::new(0.0, 0.0); order];
    if z.norm() < 1e-15 {
        result[0] = Complex64::new(1.0, 0.0);
        return result;
    }

    let start_n = order + (z.norm() as usize) + 20;
    let mut values = vec![Complex64::new(0.0, 0.0); start_n + 2];
    values[start_n] = Complex64::new(1e-30, 0.0);

    for k in (0..start_n).rev() {
        values[k] = (2 * k + 3) as f64 / z * values[k + 1] - values[k + 2];
        if values[k].norm() > 1e250 {
            for v in values.iter_mut().skip(k) {
                *v *= 1e-250;
            }
        }
    }

    let j0 = z.sin() / z;
    let magnitude = (z.sin().norm() + z.cos().norm()) / z.norm();
    let scale = if j0.norm() > 1e-6 * magnitude {
        j0 / values[0]
    } else {
        let j1 = z.sin() / (z * z) - z.cos() / z;
        j1 / values[1]
    };
    for l in 0..order {
        result[l] = values[l] * scale;
    }
    result
}

/// Spherical Hankel functions h_l^(1)(z) of complex argument.
///
/// Evaluated from the closed Rayleigh form
/// ```text
/// h_l^(1)(z) = (-i)^{l+1} e^{iz}/z * Σ_{k=0}^{l} i^k (l+k)! / (k! (l-k)! (2z)^k)
/// ```
/// which is exact and free of subtractive cancellation for Im z >= 0.
pub fn spherical_hankel1_c(order: usize, z: Complex64) -> Vec<Complex64> {
    assert!(order >= 1, "order must be at least 1");
    let mut result = vec![Complex64::new(0.0, 0.0); order];
    let prefactor = (Complex64::i() * z).exp() / z;
    let mut minus_i_pow = Complex64::new(0.0, -1.0);
    for (l, item) in result.iter_mut().enumerate() {
        let mut sum = Complex64::new(1.0, 0.0);
        let mut term = Complex64::new(1.0, 0.0);
        for k in 0..l {
            term *= Complex64::i() * ((l + k + 1) * (l - k)) as f64
                / ((k + 1) as f64 * 2.0 * z);
            sum += term;
        }
        *item = minus_i_pow * prefactor * sum;
        minus_i_pow *= Complex64::new(0.0, -1.0);
    }
    result
}

/// Spherical Bessel functions y_l(z) = (h_l^(1)(z) - j_l(z)) / i.
pub fn spherical_bessel_y_c(order: usize, z: Complex64) -> Vec<Complex64> {
    let j = spherical_bessel_j_c(order, z);
    let h = spherical_hankel1_c(order, z);
    h.iter()
        .zip(j.iter())
        .map(|(&h, &j)| (h - j) / Complex64::i())
        .collect()
}

/// All J_m(z) for m = 0, ..., mmax by normalized downward recurrence.
fn besselj_all(mmax: usize, z: Complex64) -> Vec<Complex64> {
    if z.norm() < 1e-12 {
        let mut result = vec![Complex64::new(0.0, 0.0); mmax + 1];
        result[0] = Complex64::new(1.0, 0.0) - z * z / 4.0;
        if mmax >= 1 {
            result[1] = z / 2.0;
        }
        return result;
    }

    let start = mmax + (z.norm() as usize) + 24 + 4 * (z.norm().sqrt() as usize);
    let start = start + (start % 2); // even, so the sum ends on an even order
    let mut plus2 = Complex64::new(0.0, 0.0);
    let mut plus1 = Complex64::new(1e-30, 0.0);
    let mut sum = Complex64::new(0.0, 0.0);
    let mut values = vec![Complex64::new(0.0, 0.0); mmax + 1];

    for k in (0..=start).rev() {
        let current = 2.0 * (k + 1) as f64 / z * plus1 - plus2;
        if k <= mmax {
            values[k] = current;
        }
        if k % 2 == 0 {
            sum += if k == 0 { current } else { 2.0 * current };
        }
        plus2 = plus1;
        plus1 = current;
        if current.norm() > 1e250 {
            plus1 *= 1e-250;
            plus2 *= 1e-250;
            sum *= 1e-250;
            for v in values.iter_mut() {
                *v *= 1e-250;
            }
        }
    }

    for v in values.iter_mut() {
        *v /= sum;
    }
    values
}

/// Ascending series for Y_0(z) and Y_1(z), DLMF 10.8.1.
fn bessely_seed_series(z: Complex64) -> (Complex64, Complex64) {
    let half = z / 2.0;
    let log_half = half.ln();
    let z2 = -half * half;

    // Y_0
    let mut term = Complex64::new(1.0, 0.0);
    let mut psi = -EULER_GAMMA;
    let mut sum = psi * term;
    let mut j0 = term;
    for k in 1..200 {
        term *= z2 / ((k * k) as f64);
        psi += 1.0 / k as f64;
        sum += psi * term;
        j0 += term;
        if term.norm() < 1e-17 * sum.norm().max(1.0) {
            break;
        }
    }
    let y0 = (2.0 / PI) * (log_half * j0 - sum);

    // Y_1
    let mut term = half;
    let mut psi_k = -EULER_GAMMA;
    let mut psi_k1 = 1.0 - EULER_GAMMA;
    let mut sum = (psi_k + psi_k1) * term;
    let mut j1 = term;
    for k in 1..200 {
        term *= z2 / ((k * (k + 1)) as f64);
        psi_k += 1.0 / k as f64;
        psi_k1 += 1.0 / (k + 1) as f64;
        sum += (psi_k + psi_k1) * term;
        j1 += term;
        if term.norm() < 1e-17 * sum.norm().max(1.0) {
            break;
        }
    }
    let y1 = (2.0 / PI) * (log_half * j1) - 1.0 / (PI * half) - sum / PI;

    (y0, y1)
}

/// Large-argument expansion of H_m^(1)(z), DLMF 10.17.5, for m = 0 or 1.
fn hankel1_seed_asymptotic(m: usize, z: Complex64) -> Complex64 {
    let mu = 4.0 * (m * m) as f64;
    let mut term = Complex64::new(1.0, 0.0);
    let mut sum = term;
    let mut prev_norm = f64::INFINITY;
    for k in 0..30 {
        let numer = mu - ((2 * k + 1) * (2 * k + 1)) as f64;
        term *= Complex64::i() * numer / (8.0 * (k + 1) as f64 * z);
        if term.norm() >= prev_norm {
            break;
        }
        prev_norm = term.norm();
        sum += term;
        if term.norm() < 1e-17 * sum.norm() {
            break;
        }
    }
    let phase = z - (m as f64 * PI / 2.0 + PI / 4.0);
    (2.0 / (PI * z)).sqrt() * (Complex64::i() * phase).exp() * sum
}

/// All H_m^(1)(z) for m = 0, ..., mmax.
///
/// Valid for Im z >= 0, where the outgoing solution grows along the upward
/// recurrence and the seeds dominate.
fn hankel1_all(mmax: usize, z: Complex64) -> Vec<Complex64> {
    let (h0, h1) = if z.norm() < 20.0 {
        let j = besselj_all(1, z);
        let (y0, y1) = bessely_seed_series(z);
        (j[0] + Complex64::i() * y0, j[1] + Complex64::i() * y1)
    } else {
        (hankel1_seed_asymptotic(0, z), hankel1_seed_asymptotic(1, z))
    };

    let mut values = vec![Complex64::new(0.0, 0.0); mmax + 1];
    values[0] = h0;
    if mmax >= 1 {
        values[1] = h1;
    }
    for m in 2..=mmax {
        values[m] = 2.0 * (m - 1) as f64 / z * values[m - 1] - values[m - 2];
    }
    values
}

/// Bessel function of the first kind J_m(z), integer order, complex argument.
///
/// Negative orders use J_{-m}(z) = (-1)^m J_m(z).
pub fn besselj(m: i32, z: Complex64) -> Complex64 {
    let n = m.unsigned_abs() as usize;
    let value = besselj_all(n, z)[n];
    if m < 0 && m % 2 != 0 {
        -value
    } else {
        value
    }
}

/// Bessel function of the second kind Y_m(z), integer order, complex argument.
pub fn bessely(m: i32, z: Complex64) -> Complex64 {
    (hankel1(m, z) - besselj(m, z)) / Complex64::i()
}

/// Hankel function of the first kind H_m^(1)(z), integer order, Im z >= 0.
///
/// Negative orders use H_{-m}^(1)(z) = (-1)^m H_m^(1)(z).
pub fn hankel1(m: i32, z: Complex64) -> Complex64 {
    let n = m.unsigned_abs() as usize;
    let value = hankel1_all(n, z)[n];
    if m < 0 && m % 2 != 0 {
        -value
    } else {
        value
    }
}

/// Derivative J_m'(z) = (J_{m-1}(z) - J_{m+1}(z)) / 2.
pub fn besselj_d(m: i32, z: Complex64) -> Complex64 {
    (besselj(m - 1, z) - besselj(m + 1, z)) / 2.0
}

/// Derivative H_m^(1)'(z) = (H_{m-1}^(1)(z) - H_{m+1}^(1)(z)) / 2.
pub fn hankel1_d(m: i32, z: Complex64) -> Complex64 {
    (hankel1(m - 1, z) - hankel1(m + 1, z)) / 2.0
}
