//! Incomplete gamma functions and Ewald integrals.
//!
//! The Ewald summation splits slowly converging lattice sums into a
//! real-space and a reciprocal-space part. Both parts reduce to members of
//! two integral families together with upper incomplete gamma functions of
//! integer and half-integer order,
//! ```text
//! I_n(t0; a, b) = ∫_{t0}^∞ t^{2n}   e^{-a t² + b/t²} dt
//! K_n(t0; a, b) = ∫_{t0}^∞ t^{2n+1} e^{-a t² + b/t²} dt
//! Γ(s, z)       = ∫_z^∞ t^{s-1} e^{-t} dt
//! ```
//! For propagating diffraction orders the parameters leave the classical
//! domain of convergence. All functions here are continued analytically in
//! the sense of a vanishing positive imaginary part of the wave number,
//! which places arguments on the lower rim of the branch cut along the
//! negative real axis.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::erf::erfc_c;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Square root continued from below the branch cut.
///
/// Coincides with the principal branch except on the negative real axis,
/// where the limit from negative imaginary part, -i sqrt(|z|), is taken.
/// This is the continuation consistent with a wave number of vanishing
/// positive imaginary part throughout the lattice sums.
pub fn branch_sqrt(z: Complex64) -> Complex64 {
    if z.im == 0.0 && z.re < 0.0 {
        Complex64::new(0.0, -(-z.re).sqrt())
    } else {
        z.sqrt()
    }
}

fn branch_ln(z: Complex64) -> Complex64 {
    if z.im == 0.0 && z.re < 0.0 {
        Complex64::new((-z.re).ln(), -PI)
    } else {
        z.ln()
    }
}

/// Exponential integral E_1 of complex argument.
///
/// The branch cut lies on the negative real axis and is approached from
/// below, matching [`branch_sqrt`].
pub fn expint_e1(z: Complex64) -> Complex64 {
    if z.norm() > 100.0 && z.re > 0.0 {
        // asymptotic expansion, optimal truncation far below f64 precision
        let mut sum = Complex64::new(1.0, 0.0);
        let mut term = Complex64::new(1.0, 0.0);
        for k in 1..40 {
            term *= -(k as f64) / z;
            let prev = sum;
            sum += term;
            if (sum - prev).norm() < 1e-17 * sum.norm() {
                break;
            }
        }
        return (-z).exp() / z * sum;
    }
    if z.re > 0.0 && z.norm() > 8.0 {
        // E_1(z) = e^{-z} / (z + 1/(1 + 1/(z + 2/(1 + 2/(z + ...)))))
        // evaluated with the modified Lentz scheme
        let tiny = 1e-300;
        let mut f = z;
        let mut c = z;
        let mut d = Complex64::new(0.0, 0.0);
        for j in 1..200 {
            let a = Complex64::new(((j + 1) / 2) as f64, 0.0);
            let b = if j % 2 == 1 {
                Complex64::new(1.0, 0.0)
            } else {
                z
            };
            d = b + a * d;
            if d.norm() < tiny {
                d = Complex64::new(tiny, 0.0);
            }
            c = b + a / c;
            if c.norm() < tiny {
                c = Complex64::new(tiny, 0.0);
            }
            d = 1.0 / d;
            let delta = c * d;
            f *= delta;
            if (delta - 1.0).norm() < 1e-16 {
                break;
            }
        }
        return (-z).exp() / f;
    }
    // entire series; free of cancellation for Re z <= 0
    let mut sum = Complex64::new(0.0, 0.0);
    let mut term = Complex64::new(-1.0, 0.0);
    for k in 1..300 {
        term *= -z / k as f64;
        let delta = term / k as f64;
        sum += delta;
        if delta.norm() < 1e-18 * sum.norm().max(1e-300) && k > 4 {
            break;
        }
    }
    -EULER_GAMMA - branch_ln(z) - sum
}

/// Upper incomplete gamma function Γ(s, z) with s = `two_s` / 2.
///
/// Integer and half-integer orders share one entry point through the
/// doubled order argument. Negative orders are reached by the downward
/// recurrence, which is the stable direction, starting from Γ(1/2, z) or
/// Γ(0, z) = E_1(z).
pub fn incgamma(two_s: i32, z: Complex64) -> Complex64 {
    if two_s % 2 == 0 {
        let s = two_s / 2;
        if s > 0 {
            // Γ(n, z) = (n-1)! e^{-z} Σ_{j<n} z^j/j!
            let mut sum = Complex64::new(1.0, 0.0);
            let mut term = Complex64::new(1.0, 0.0);
            let mut fact = 1.0;
            for j in 1..s {
                term *= z / j as f64;
                sum += term;
                fact *= j as f64;
            }
            fact * (-z).exp() * sum
        } else {
            let mut value = expint_e1(z);
            let emz = (-z).exp();
            let mut power = 1.0 / z; // z^{s-1} at s = 0
            for j in 0..(-s) {
                let s_cur = -j; // recurrence Γ(s-1, z) = (Γ(s, z) - z^{s-1} e^{-z})/(s - 1)
                value = (value - power * emz) / (s_cur - 1) as f64;
                power /= z;
            }
            value
        }
    } else {
        let sq = branch_sqrt(z);
        let mut value = PI.sqrt() * erfc_c(sq);
        let emz = (-z).exp();
        if two_s >= 1 {
            // upward from Γ(1/2, z)
            let mut power = sq / z; // z^{s-1} at s = 1/2
            let mut s_cur = 0.5;
            for _ in 0..(two_s - 1) / 2 {
                value = s_cur * value + power * z * emz;
                power *= z;
                s_cur += 1.0;
            }
            value
        } else {
            // downward from Γ(1/2, z)
            let mut power = sq / z; // z^{s-1} at s = 1/2
            let mut s_cur = 0.5;
            for _ in 0..(1 - two_s) / 2 {
                value = (value - power * emz) / (s_cur - 1.0);
                power /= z;
                s_cur -= 1.0;
            }
            value
        }
    }
}

fn integrand_at(a: Complex64, b: Complex64, t0: f64) -> Complex64 {
    (-a * t0 * t0 + b / (t0 * t0)).exp()
}

fn even_seeds(a: Complex64, b: Complex64, t0: f64) -> (Complex64, Complex64) {
    let sa = branch_sqrt(a);
    let spi = PI.sqrt();
    // c² = -b, so e^{-a t² + b/t²} = e^{-a t² - c²/t²}
    let c = branch_sqrt(-b);
    let i0 = spi / (4.0 * sa)
        * ((2.0 * sa * c).exp() * erfc_c(sa * t0 + c / t0)
            + (-2.0 * sa * c).exp() * erfc_c(sa * t0 - c / t0));
    // I_{-1} by inversion of the integration variable
    let full = spi / (2.0 * c) * (-2.0 * c * sa).exp();
    let tail = spi / (4.0 * c)
        * ((2.0 * c * sa).exp() * erfc_c(c / t0 + sa * t0)
            + (-2.0 * c * sa).exp() * erfc_c(c / t0 - sa * t0));
    (full - tail, i0)
}

/// Integrals over even powers, I_n = ∫_{t0}^∞ t^{2n} e^{-a t² + b/t²} dt,
/// for all orders `nmin..=nmax`.
pub fn ewald_integral_range(
    nmin: i32,
    nmax: i32,
    a: Complex64,
    b: Complex64,
    t0: f64,
) -> Vec<Complex64> {
    debug_assert!(nmin <= nmax);
    if b.norm() == 0.0 {
        // ∫_{t0}^∞ t^{2n} e^{-a t²} dt = a^{-n-1/2} Γ(n + 1/2, a t0²)/2
        let mut out = Vec::with_capacity((nmax - nmin + 1) as usize);
        for n in nmin..=nmax {
            let g = incgamma(2 * n + 1, a * t0 * t0);
            let mut pw = branch_sqrt(a);
            if n >= 0 {
                for _ in 0..n {
                    pw *= a;
                }
            } else {
                for _ in 0..(-n) {
                    pw /= a;
                }
            }
            out.push(0.5 * g / pw);
        }
        return out;
    }
    let (im1, i0) = even_seeds(a, b, t0);
    let e0 = integrand_at(a, b, t0);
    let count = (nmax - nmin + 1) as usize;
    let mut out = vec![Complex64::new(0.0, 0.0); count];
    let store = |out: &mut Vec<Complex64>, n: i32, v: Complex64| {
        if n >= nmin && n <= nmax {
            out[(n - nmin) as usize] = v;
        }
    };
    store(&mut out, -1, im1);
    store(&mut out, 0, i0);
    if nmax > 0 {
        let mut prev2 = im1;
        let mut prev1 = i0;
        let mut boundary = e0 * t0; // t0^{2n-1} e0 at n = 1
        for n in 1..=nmax {
            let cur = ((2 * n - 1) as f64 * prev1 - 2.0 * b * prev2 + boundary) / (2.0 * a);
            store(&mut out, n, cur);
            prev2 = prev1;
            prev1 = cur;
            boundary *= t0 * t0;
        }
    }
    if nmin < -1 {
        let mut next2 = i0;
        let mut next1 = im1;
        let mut boundary = e0 / t0; // t0^{2n+3} e0 at n = -2
        for n in (nmin..=-2).rev() {
            // recurrence at order n + 2 solved for I_n
            let cur = ((2 * n + 3) as f64 * next1 - 2.0 * a * next2 + boundary) / (2.0 * b);
            store(&mut out, n, cur);
            next2 = next1;
            next1 = cur;
            boundary /= t0 * t0;
        }
    }
    out
}

/// Single integral over even powers, see [`ewald_integral_range`].
pub fn ewald_integral(n: i32, a: Complex64, b: Complex64, t0: f64) -> Complex64 {
    ewald_integral_range(n, n, a, b, t0)[0]
}

fn odd_seeds(a: Complex64, b: Complex64, t0: f64) -> (Complex64, Complex64) {
    // M_n = ∫_T^∞ u^n e^{-a u + b/u} du at n = -1, 0 with T = t0² through
    // the expansion of e^{b/u} and a running incomplete gamma recurrence
    let t = Complex64::new(t0 * t0, 0.0);
    let at = a * t;
    let emat = (-at).exp();
    let mut g1mj = incgamma(2, at); // Γ(1 - j, aT) at j = 0
    let mut g0mj = incgamma(0, at); // Γ(-j, aT) at j = 0
    let mut coeff = Complex64::new(1.0, 0.0); // b^j / j!
    let mut pow_a = 1.0 / a; // a^{j-1}
    let mut m0 = Complex64::new(0.0, 0.0);
    let mut mm1 = Complex64::new(0.0, 0.0);
    let mut power = 1.0 / at; // (aT)^{s-1} at s = -j
    for j in 0..160 {
        let d0 = coeff * pow_a * g1mj;
        let dm1 = coeff * pow_a * a * g0mj;
        m0 += d0;
        mm1 += dm1;
        if j > 4
            && d0.norm() < 1e-16 * m0.norm().max(1e-300)
            && dm1.norm() < 1e-16 * mm1.norm().max(1e-300)
        {
            break;
        }
        // step both gamma values down by one integer order
        let jf = j as f64;
        g1mj = g0mj;
        g0mj = (g0mj - power * emat) / (-jf - 1.0);
        power /= at;
        coeff *= b / (jf + 1.0);
        pow_a *= a;
    }
    (0.5 * mm1, 0.5 * m0)
}

/// Integrals over odd powers, K_n = ∫_{t0}^∞ t^{2n+1} e^{-a t² + b/t²} dt,
/// for all orders `nmin..=nmax`.
pub fn kambe_integral_range(
    nmin: i32,
    nmax: i32,
    a: Complex64,
    b: Complex64,
    t0: f64,
) -> Vec<Complex64> {
    debug_assert!(nmin <= nmax);
    if b.norm() == 0.0 {
        // K_n = a^{-n-1} Γ(n + 1, a t0²)/2
        let mut out = Vec::with_capacity((nmax - nmin + 1) as usize);
        for n in nmin..=nmax {
            let g = incgamma(2 * n + 2, a * t0 * t0);
            let mut pw = a;
            if n >= 0 {
                for _ in 0..n {
                    pw *= a;
                }
            } else {
                for _ in 0..(-n) {
                    pw /= a;
                }
            }
            out.push(0.5 * g / pw);
        }
        return out;
    }
    let (km1, k0) = odd_seeds(a, b, t0);
    let e0 = integrand_at(a, b, t0);
    let count = (nmax - nmin + 1) as usize;
    let mut out = vec![Complex64::new(0.0, 0.0); count];
    let store = |out: &mut Vec<Complex64>, n: i32, v: Complex64| {
        if n >= nmin && n <= nmax {
            out[(n - nmin) as usize] = v;
        }
    };
    store(&mut out, -1, km1);
    store(&mut out, 0, k0);
    let t = t0 * t0;
    if nmax > 0 {
        let mut prev2 = km1;
        let mut prev1 = k0;
        let mut boundary = e0 * t; // T^n e0 at n = 1, halved recurrence
        for n in 1..=nmax {
            let cur = (n as f64 * prev1 - b * prev2 + 0.5 * boundary) / a;
            store(&mut out, n, cur);
            prev2 = prev1;
            prev1 = cur;
            boundary *= t;
        }
    }
    if nmin < -1 {
        let mut next2 = k0;
        let mut next1 = km1;
        let mut boundary = e0; // T^n e0 at n = 0
        for n in (nmin..=-2).rev() {
            let cur = ((n + 2) as f64 * next1 - a * next2 + 0.5 * boundary) / b;
            store(&mut out, n, cur);
            next2 = next1;
            next1 = cur;
            boundary /= t;
        }
    }
    out
}

/// Single integral over odd powers, see [`kambe_integral_range`].
pub fn kambe_integral(n: i32, a: Complex64, b: Complex64, t0: f64) -> Complex64 {
    kambe_integral_range(n, n, a, b, t0)[0]
}
