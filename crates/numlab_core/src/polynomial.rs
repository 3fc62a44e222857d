//! Real polynomials and their roots.
//!
//! Coefficients are stored highest degree first. General roots come from the
//! eigenvalues of the companion matrix; the quadratic and cubic closed forms
//! are kept as standalone solvers.

use crate::error::PolynomialError;
use log::{debug, warn};
use nalgebra::linalg::Schur;
use nalgebra::DMatrix;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Orthogonal similarity transforms tried when Schur iteration stalls on the
/// companion matrix itself.
const ROTATION_ATTEMPTS: u64 = 3;
/// Sweep cap for the Aberth-Ehrlich fallback.
const ABERTH_SWEEPS: usize = 500;

/// Tolerances used when extracting and grouping polynomial roots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSettings {
    /// Decimal digits kept when normalising a root.
    pub rounding_digits: i32,
    /// Imaginary parts below this magnitude are snapped to zero.
    pub imag_snap: f64,
    /// Magnitude under which a real or imaginary part counts as zero.
    pub zero_tolerance: f64,
    /// An `m`-fold cluster may spread up to
    /// `cluster_spread * eps^(1/m) * max(1, |mean|)` around its mean.
    pub cluster_spread: f64,
    /// Scale of the allowed `p^(k)(mean)` residuals when confirming a
    /// multiple root; see [`Polynomial::has_root_of_multiplicity`].
    pub residual_factor: f64,
    /// Relative distance under which two groups count as conjugates.
    pub pair_tolerance: f64,
    /// Schur iteration cap. Zero means iterate until convergence, which
    /// also disables the stall fallbacks.
    pub max_iterations: usize,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            rounding_digits: 10,
            imag_snap: 1e-9,
            zero_tolerance: 1e-10,
            cluster_spread: 100.0,
            residual_factor: 64.0,
            pair_tolerance: 1e-6,
            max_iterations: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Builds a polynomial from coefficients ordered highest degree first.
    pub fn from_descending(coefficients: &[f64]) -> Result<Self, PolynomialError> {
        if coefficients.is_empty() {
            return Err(PolynomialError::EmptyCoefficients);
        }
        for (index, &value) in coefficients.iter().enumerate() {
            if !value.is_finite() {
                return Err(PolynomialError::NonFiniteCoefficient { index, value });
            }
        }
        if coefficients[0] == 0.0 {
            return Err(PolynomialError::ZeroLeadingCoefficient);
        }
        Ok(Self {
            coefficients: coefficients.to_vec(),
        })
    }

    /// Builds a polynomial from coefficients where `c[i]` multiplies `x^i`.
    pub fn from_ascending(coefficients: &[f64]) -> Result<Self, PolynomialError> {
        let reversed: Vec<f64> = coefficients.iter().rev().copied().collect();
        Self::from_descending(&reversed).map_err(|err| match err {
            PolynomialError::NonFiniteCoefficient { index, value } => {
                PolynomialError::NonFiniteCoefficient {
                    index: coefficients.len() - 1 - index,
                    value,
                }
            }
            other => other,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Horner evaluation at a complex point.
    pub fn eval(&self, z: Complex<f64>) -> Complex<f64> {
        self.coefficients
            .iter()
            .fold(Complex::new(0.0, 0.0), |acc, &c| acc * z + c)
    }

    pub fn eval_real(&self, x: f64) -> f64 {
        self.coefficients.iter().fold(0.0, |acc, &c| acc * x + c)
    }

    /// Companion matrix of the monic polynomial `p(x) / a_0`.
    ///
    /// The first row holds `-a_i / a_0` and the sub-diagonal is all ones, so
    /// the eigenvalues are exactly the roots of `p`.
    pub fn companion_matrix(&self) -> DMatrix<f64> {
        let n = self.degree();
        let lead = self.coefficients[0];
        let mut matrix = DMatrix::zeros(n, n);
        for j in 0..n {
            matrix[(0, j)] = -self.coefficients[j + 1] / lead;
        }
        for i in 1..n {
            matrix[(i, i - 1)] = 1.0;
        }
        matrix
    }

    /// `p^(k)(z) / k!`, paired with the same sum taken over absolute values.
    ///
    /// The second value bounds the rounding error of the first and is the
    /// natural scale for deciding whether the first is zero.
    pub fn taylor_coefficient(&self, z: Complex<f64>, k: usize) -> (Complex<f64>, f64) {
        let n = self.degree();
        let radius = z.norm();
        let mut value = Complex::new(0.0, 0.0);
        let mut magnitude = 0.0;
        for (i, &a) in self.coefficients.iter().enumerate() {
            let power = n - i;
            if power < k {
                break;
            }
            let weight = a * binomial(power, k);
            let exponent = power - k;
            value += z.powu(exponent as u32) * weight;
            magnitude += weight.abs() * radius.powi(exponent as i32);
        }
        (value, magnitude)
    }

    /// Whether `z` is numerically a root of multiplicity at least `m`.
    ///
    /// An `m`-fold root computed in floating point is only accurate to about
    /// `eps^(1/m)`, so `p^(k)(z) / k!` may be as large as
    /// `factor * n * eps^((m - k) / m)` relative to its absolute-value sum.
    pub fn has_root_of_multiplicity(&self, z: Complex<f64>, m: usize, factor: f64) -> bool {
        let n = self.degree() as f64;
        (0..m).all(|k| {
            let (value, magnitude) = self.taylor_coefficient(z, k);
            let allowed = factor * n * f64::EPSILON.powf((m - k) as f64 / m as f64);
            value.norm() <= allowed * magnitude
        })
    }

    /// All complex roots, with multiplicity, in the order the eigenvalue
    /// routine produces them.
    ///
    /// Schur iteration without exceptional shifts can cycle on structured
    /// companion matrices such as that of `x^4 + 1`. When the capped
    /// iteration fails, the companion matrix is rotated by a seeded random
    /// orthogonal matrix (same eigenvalues) and retried, and as a last resort
    /// the roots are found by Aberth-Ehrlich iteration on the polynomial.
    pub fn roots(&self, settings: &RootSettings) -> Result<Vec<Complex<f64>>, PolynomialError> {
        if self.degree() == 0 {
            return Ok(Vec::new());
        }

        let roots = match self.companion_eigenvalues(settings.max_iterations) {
            Some(roots) => roots,
            None => {
                warn!(
                    "eigenvalue iteration stalled for {:?}, falling back to Aberth iteration",
                    self.coefficients
                );
                self.aberth_roots(ABERTH_SWEEPS).ok_or_else(|| {
                    PolynomialError::RootFindingFailed(format!(
                        "Schur decomposition of the companion matrix did not converge within {} iterations and Aberth iteration did not settle within {} sweeps.",
                        settings.max_iterations, ABERTH_SWEEPS
                    ))
                })?
            }
        };

        if let Some(bad) = roots
            .iter()
            .find(|r| !r.re.is_finite() || !r.im.is_finite())
        {
            return Err(PolynomialError::RootFindingFailed(format!(
                "eigenvalue routine produced a non-finite root ({bad})."
            )));
        }

        debug!("roots of {:?}: {:?}", self.coefficients, roots);
        Ok(roots)
    }

    fn companion_eigenvalues(&self, max_iterations: usize) -> Option<Vec<Complex<f64>>> {
        let companion = self.companion_matrix();
        if let Some(schur) = Schur::try_new(companion.clone(), f64::EPSILON, max_iterations) {
            return Some(schur.complex_eigenvalues().iter().cloned().collect());
        }

        let n = companion.nrows();
        for seed in 1..=ROTATION_ATTEMPTS {
            debug!("Schur iteration stalled, rotating the companion matrix (attempt {seed})");
            let mut rng = StdRng::seed_from_u64(seed);
            let q = DMatrix::from_fn(n, n, |_, _| rng.random::<f64>() - 0.5)
                .qr()
                .q();
            let rotated = q.transpose() * &companion * &q;
            if let Some(schur) = Schur::try_new(rotated, f64::EPSILON, max_iterations) {
                return Some(schur.complex_eigenvalues().iter().cloned().collect());
            }
        }
        None
    }

    /// `p(z)` and `p'(z)` in one Horner pass.
    fn eval_with_derivative(&self, z: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        let mut value = Complex::new(0.0, 0.0);
        let mut slope = Complex::new(0.0, 0.0);
        for &c in &self.coefficients {
            slope = slope * z + value;
            value = value * z + c;
        }
        (value, slope)
    }

    /// Simultaneous Aberth-Ehrlich iteration, started on a circle of the
    /// Cauchy bound radius. Stops once every estimate has a residual at the
    /// rounding level of Horner evaluation.
    fn aberth_roots(&self, max_sweeps: usize) -> Option<Vec<Complex<f64>>> {
        let n = self.degree();
        let lead = self.coefficients[0];
        let bound = 1.0
            + self.coefficients[1..]
                .iter()
                .map(|c| (c / lead).abs())
                .fold(0.0, f64::max);
        let mut z: Vec<Complex<f64>> = (0..n)
            .map(|k| Complex::from_polar(bound, TAU * k as f64 / n as f64 + 0.4))
            .collect();
        let noise = 4.0 * n as f64 * f64::EPSILON;

        for _ in 0..max_sweeps {
            let mut settled = true;
            for i in 0..n {
                let (value, slope) = self.eval_with_derivative(z[i]);
                let (_, magnitude) = self.taylor_coefficient(z[i], 0);
                if value.norm() <= noise * magnitude {
                    continue;
                }
                settled = false;

                let newton = value / slope;
                let repulsion: Complex<f64> = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| (z[i] - z[j]).inv())
                    .sum();
                let step = newton / (Complex::new(1.0, 0.0) - newton * repulsion);
                if step.is_finite() {
                    z[i] -= step;
                } else {
                    // stationary point of p, nudge off it
                    z[i] = z[i] * Complex::from_polar(1.0 + 1e-3, 0.1) + 1e-3;
                }
            }
            if settled {
                return Some(z);
            }
        }
        None
    }
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Rounds `value` to `digits` decimal places.
///
/// Values whose scaled form overflows or is beyond integer precision are
/// returned unchanged.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    let scaled = value * scale;
    if scale == 0.0 || !scaled.is_finite() || scaled.abs() >= 2f64.powi(52) {
        return if value == 0.0 { 0.0 } else { value };
    }
    let rounded = scaled.round() / scale;
    // -0.0 would print as "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Roots of `a x^2 + b x + c` through the complex square root of the
/// discriminant. Real and imaginary parts smaller than `tol` are set to zero.
pub fn solve_quadratic(
    a: f64,
    b: f64,
    c: f64,
    tol: f64,
) -> Result<(Complex<f64>, Complex<f64>), PolynomialError> {
    if a == 0.0 {
        return Err(PolynomialError::ZeroLeadingCoefficient);
    }
    let discriminant = Complex::new(b * b - 4.0 * a * c, 0.0);
    let sqrt_d = discriminant.sqrt();

    let x1 = (-b + sqrt_d) / (2.0 * a);
    let x2 = (-b - sqrt_d) / (2.0 * a);

    let clean = |z: Complex<f64>| {
        Complex::new(
            if z.re.abs() < tol { 0.0 } else { z.re },
            if z.im.abs() < tol { 0.0 } else { z.im },
        )
    };
    Ok((clean(x1), clean(x2)))
}

/// Roots of `a x^3 + b x^2 + c x + d` by Cardano's formula.
///
/// The cubic is reduced to `y^3 + p y + q` with `x = y - b / (3a)`. The two
/// cube roots must satisfy `u v = -p / 3`, so `v` is derived from `u` instead
/// of taking a second principal cube root.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Result<[Complex<f64>; 3], PolynomialError> {
    if a == 0.0 {
        return Err(PolynomialError::ZeroLeadingCoefficient);
    }

    let p = (3.0 * a * c - b * b) / (3.0 * a * a);
    let q = (2.0 * b * b * b - 9.0 * a * b * c + 27.0 * a * a * d) / (27.0 * a * a * a);

    let discriminant = (q / 2.0).powi(2) + (p / 3.0).powi(3);
    let sqrt_d = Complex::new(discriminant, 0.0).sqrt();
    let half_q = Complex::new(-q / 2.0, 0.0);

    let u = (half_q + sqrt_d).cbrt();
    let v = if u.norm() < 1e-300 {
        (half_q - sqrt_d).cbrt()
    } else {
        -p / (3.0 * u)
    };

    let rotation = Complex::new(0.0, 3f64.sqrt() / 2.0);
    let y1 = u + v;
    let y2 = -(u + v) / 2.0 + (u - v) * rotation;
    let y3 = -(u + v) / 2.0 - (u - v) * rotation;

    let shift = b / (3.0 * a);
    Ok([y1 - shift, y2 - shift, y3 - shift])
}
