//! General solutions of linear homogeneous ODEs with constant coefficients.
//!
//! The characteristic polynomial `a_0 r^n + ... + a_n` is factored
//! numerically; every root of multiplicity `m` contributes `m` basis
//! functions (`m` cosine/sine pairs for a conjugate pair). The resulting
//! expression is rendered as `y(x) = C_1... + C_2... + ...`.

use crate::error::PolynomialError;
use crate::polynomial::{round_to, Polynomial, RootSettings};
use crate::solvers::integrate_fixed;
use crate::traits::FirstOrderSystem;
use anyhow::{bail, Result};
use log::{debug, warn};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A distinct root of the characteristic polynomial with its multiplicity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootGroup {
    pub root: Complex<f64>,
    pub multiplicity: usize,
}

impl RootGroup {
    pub fn is_real(&self) -> bool {
        self.root.im == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Oscillation {
    Cos,
    Sin,
}

/// One additive term `C_k x^p e^(rate x) [cos|sin](frequency x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionTerm {
    /// Index of the arbitrary constant, starting at 1.
    pub constant: usize,
    pub power: usize,
    /// Exponential rate; zero means the term has no exponential factor.
    pub rate: f64,
    /// Oscillating factor and its angular frequency, for complex roots.
    pub oscillation: Option<(Oscillation, f64)>,
}

impl SolutionTerm {
    /// Value of the basis function (without its constant) at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let mut value = x.powi(self.power as i32) * (self.rate * x).exp();
        if let Some((kind, frequency)) = self.oscillation {
            value *= match kind {
                Oscillation::Cos => (frequency * x).cos(),
                Oscillation::Sin => (frequency * x).sin(),
            };
        }
        value
    }

    /// `[y(0), y'(0), ..., y^(order-1)(0)]` of the basis function.
    ///
    /// The term is the real or imaginary part of `x^k e^(lambda x)` with
    /// `lambda = rate + i frequency`, whose n-th derivative at zero is
    /// `n! / (n - k)! * lambda^(n - k)` for `n >= k` and zero otherwise.
    pub fn initial_conditions(&self, order: usize) -> Vec<f64> {
        let (frequency, take_imag) = match self.oscillation {
            Some((Oscillation::Cos, w)) => (w, false),
            Some((Oscillation::Sin, w)) => (w, true),
            None => (0.0, false),
        };
        let lambda = Complex::new(self.rate, frequency);
        let k = self.power;

        (0..order)
            .map(|n| {
                if n < k {
                    return 0.0;
                }
                let falling: f64 = ((n - k + 1)..=n).map(|i| i as f64).product();
                let value = lambda.powu((n - k) as u32) * falling;
                if take_imag {
                    value.im
                } else {
                    value.re
                }
            })
            .collect()
    }
}

fn format_scaled_x(factor: f64) -> String {
    if factor == 1.0 {
        "x".to_string()
    } else if factor == -1.0 {
        "-x".to_string()
    } else {
        format!("{factor}x")
    }
}

impl fmt::Display for SolutionTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C_{}", self.constant)?;
        match self.power {
            0 => {}
            1 => write!(f, "x")?,
            k => write!(f, "x^{k}")?,
        }
        if self.rate != 0.0 {
            write!(f, "e^({})", format_scaled_x(self.rate))?;
        }
        if let Some((kind, frequency)) = self.oscillation {
            let name = match kind {
                Oscillation::Cos => "cos",
                Oscillation::Sin => "sin",
            };
            write!(f, "{name}({})", format_scaled_x(frequency))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralSolution {
    pub terms: Vec<SolutionTerm>,
}

impl fmt::Display for GeneralSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y(x) = ")?;
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

fn normalize_root(root: Complex<f64>, settings: &RootSettings) -> Complex<f64> {
    let re = round_to(root.re, settings.rounding_digits);
    let im = round_to(root.im, settings.rounding_digits);
    if im.abs() < settings.imag_snap {
        Complex::new(re, 0.0)
    } else {
        Complex::new(re, im)
    }
}

fn group_order(a: &RootGroup, b: &RootGroup) -> Ordering {
    b.is_real()
        .cmp(&a.is_real())
        .then(a.root.re.total_cmp(&b.root.re))
        .then(a.root.im.abs().total_cmp(&b.root.im.abs()))
        .then(b.root.im.total_cmp(&a.root.im))
}

/// Mean of `members` if they plausibly form one root of multiplicity
/// `members.len()`: all lie within the spread allowed for that multiplicity
/// and the polynomial's Taylor coefficients vanish at the mean.
fn confirmed_cluster(
    polynomial: &Polynomial,
    roots: &[Complex<f64>],
    members: &[usize],
    settings: &RootSettings,
) -> Option<Complex<f64>> {
    let m = members.len();
    let mean = members.iter().map(|&i| roots[i]).sum::<Complex<f64>>() / m as f64;
    let spread =
        settings.cluster_spread * f64::EPSILON.powf(1.0 / m as f64) * mean.norm().max(1.0);
    if members.iter().any(|&i| (roots[i] - mean).norm() > spread) {
        return None;
    }
    polynomial
        .has_root_of_multiplicity(mean, m, settings.residual_factor)
        .then_some(mean)
}

/// Groups the computed roots of `polynomial` into distinct roots with
/// multiplicities.
///
/// Taking roots in ascending order, each one is combined with its nearest
/// remaining neighbours into the largest cluster that is confirmed as one
/// multiple root; a root that joins nothing is simple. Each cluster
/// is replaced by its normalised mean. Real groups come first in ascending
/// order, followed by complex groups ordered by real part and then by `|im|`.
pub fn group_roots(
    polynomial: &Polynomial,
    roots: &[Complex<f64>],
    settings: &RootSettings,
) -> Vec<RootGroup> {
    let mut remaining = roots.to_vec();
    remaining.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));

    let mut groups = Vec::new();
    while let Some(&seed) = remaining.first() {
        let mut nearest: Vec<usize> = (0..remaining.len()).collect();
        nearest.sort_by(|&i, &j| {
            (remaining[i] - seed)
                .norm()
                .total_cmp(&(remaining[j] - seed).norm())
        });

        let (multiplicity, center) = (2..=remaining.len())
            .rev()
            .find_map(|m| {
                confirmed_cluster(polynomial, &remaining, &nearest[..m], settings)
                    .map(|mean| (m, mean))
            })
            .unwrap_or((1, seed));

        let mut members = nearest[..multiplicity].to_vec();
        members.sort_unstable_by(|a, b| b.cmp(a));
        for idx in members {
            remaining.remove(idx);
        }
        groups.push(RootGroup {
            root: normalize_root(center, settings),
            multiplicity,
        });
    }

    groups.sort_by(group_order);
    debug!("root groups: {:?}", groups);
    groups
}

/// Collects terms and hands out constant labels in order.
struct TermAccumulator {
    next_constant: usize,
    terms: Vec<SolutionTerm>,
}

impl TermAccumulator {
    fn new() -> Self {
        Self {
            next_constant: 1,
            terms: Vec::new(),
        }
    }

    fn push(&mut self, power: usize, rate: f64, oscillation: Option<(Oscillation, f64)>) {
        self.terms.push(SolutionTerm {
            constant: self.next_constant,
            power,
            rate,
            oscillation,
        });
        self.next_constant += 1;
    }

    fn push_real(&mut self, rate: f64, multiplicity: usize) {
        for power in 0..multiplicity {
            self.push(power, rate, None);
        }
    }

    fn push_oscillating(&mut self, rate: f64, frequency: f64, multiplicity: usize) {
        for power in 0..multiplicity {
            self.push(power, rate, Some((Oscillation::Cos, frequency)));
            self.push(power, rate, Some((Oscillation::Sin, frequency)));
        }
    }
}

fn find_conjugate(
    groups: &[RootGroup],
    consumed: &[bool],
    idx: usize,
    settings: &RootSettings,
) -> Option<usize> {
    let target = groups[idx].root.conj();
    let tolerance = settings.pair_tolerance * target.norm().max(1.0);
    groups
        .iter()
        .enumerate()
        .filter(|(j, g)| {
            *j != idx && !consumed[*j] && !g.is_real() && g.root.im * target.im > 0.0
        })
        .map(|(j, g)| (j, (g.root - target).norm()))
        .filter(|(_, distance)| *distance <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(j, _)| j)
}

/// Builds the basis terms for already grouped roots.
///
/// Each conjugate pair is emitted once, from the partner in the upper half
/// plane. A complex group without a partner is still emitted as a full
/// cosine/sine family.
pub fn terms_from_groups(groups: &[RootGroup], settings: &RootSettings) -> GeneralSolution {
    let mut acc = TermAccumulator::new();
    let mut consumed = vec![false; groups.len()];

    for idx in 0..groups.len() {
        if consumed[idx] {
            continue;
        }
        consumed[idx] = true;
        let group = groups[idx];

        if group.root.im.abs() < settings.zero_tolerance {
            let rate = if group.root.re.abs() < settings.zero_tolerance {
                0.0
            } else {
                group.root.re
            };
            acc.push_real(rate, group.multiplicity);
            continue;
        }

        let mut multiplicity = group.multiplicity;
        let mut alpha = group.root.re;
        let mut frequency = group.root.im.abs();
        match find_conjugate(groups, &consumed, idx, settings) {
            Some(partner) => {
                consumed[partner] = true;
                let other = groups[partner];
                if other.multiplicity != group.multiplicity {
                    warn!(
                        "conjugate roots {} and {} have multiplicities {} and {}",
                        group.root, other.root, group.multiplicity, other.multiplicity
                    );
                }
                if other.root.im > 0.0 {
                    multiplicity = other.multiplicity;
                    alpha = other.root.re;
                    frequency = other.root.im;
                }
            }
            None => warn!("complex root {} has no conjugate partner", group.root),
        }

        let rate = if alpha.abs() < settings.zero_tolerance {
            0.0
        } else {
            alpha
        };
        acc.push_oscillating(rate, frequency, multiplicity);
    }

    GeneralSolution { terms: acc.terms }
}

/// General solution of the ODE whose characteristic polynomial has the given
/// coefficients, highest degree first.
pub fn general_solution(
    coefficients: &[f64],
    settings: &RootSettings,
) -> Result<GeneralSolution, PolynomialError> {
    let polynomial = Polynomial::from_descending(coefficients)?;
    let roots = polynomial.roots(settings)?;
    let groups = group_roots(&polynomial, &roots, settings);
    Ok(terms_from_groups(&groups, settings))
}

/// [`general_solution`] with default settings, rendered as a string.
pub fn solve_ode_general(coefficients: &[f64]) -> Result<String, PolynomialError> {
    general_solution(coefficients, &RootSettings::default()).map(|s| s.to_string())
}

/// First-order form of `a_0 y^(n) + a_1 y^(n-1) + ... + a_n y = 0` with
/// state `[y, y', ..., y^(n-1)]`.
#[derive(Debug, Clone)]
pub struct LinearOde {
    /// `a_i / a_0` for `i = 1..=n`.
    normalized: Vec<f64>,
}

impl LinearOde {
    pub fn new(polynomial: &Polynomial) -> Self {
        let coefficients = polynomial.coefficients();
        let lead = coefficients[0];
        Self {
            normalized: coefficients[1..].iter().map(|c| c / lead).collect(),
        }
    }

    pub fn order(&self) -> usize {
        self.normalized.len()
    }
}

impl FirstOrderSystem<f64> for LinearOde {
    fn dimension(&self) -> usize {
        self.order()
    }

    fn apply(&self, _x: f64, y: &[f64], out: &mut [f64]) {
        let n = self.order();
        for i in 0..n.saturating_sub(1) {
            out[i] = y[i + 1];
        }
        let mut highest = 0.0;
        for (i, c) in self.normalized.iter().enumerate() {
            highest -= c * y[n - 1 - i];
        }
        out[n - 1] = highest;
    }
}

/// Integrates every basis term of `solution` with RK4 from its own initial
/// conditions and returns the largest absolute deviation from the closed
/// form at `x_end`.
pub fn verify_solution(
    polynomial: &Polynomial,
    solution: &GeneralSolution,
    x_end: f64,
    steps: usize,
) -> Result<f64> {
    if steps == 0 {
        bail!("Verification requires at least one integration step.");
    }
    if !x_end.is_finite() {
        bail!("x_end must be finite.");
    }
    let ode = LinearOde::new(polynomial);
    if ode.order() == 0 {
        return Ok(0.0);
    }

    let h = x_end / steps as f64;
    let mut worst = 0.0_f64;
    for term in &solution.terms {
        let initial = term.initial_conditions(ode.order());
        let state = integrate_fixed(&ode, 0.0, &initial, h, steps);
        let deviation = (state[0] - term.evaluate(x_end)).abs();
        debug!("term {term}: deviation {deviation:e}");
        worst = worst.max(deviation);
    }
    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(coefficients: &[f64]) -> GeneralSolution {
        general_solution(coefficients, &RootSettings::default()).expect("solution should build")
    }

    fn real_rates(solution: &GeneralSolution) -> Vec<(usize, f64)> {
        solution
            .terms
            .iter()
            .filter(|t| t.oscillation.is_none())
            .map(|t| (t.power, t.rate))
            .collect()
    }

    fn assert_unique_constants(solution: &GeneralSolution) {
        for (idx, term) in solution.terms.iter().enumerate() {
            assert_eq!(term.constant, idx + 1);
        }
    }

    #[test]
    fn distinct_real_roots_give_two_exponentials() {
        for (r1, r2) in [(1.0, 2.0), (-1.5, 3.0), (-4.0, -0.25), (0.5, 7.0)] {
            let s = solution(&[1.0, -(r1 + r2), r1 * r2]);
            let rates = real_rates(&s);
            assert_eq!(s.terms.len(), 2, "{s}");
            assert_eq!(rates.len(), 2);
            assert!(rates.iter().all(|(power, _)| *power == 0));
            assert!((rates[0].1 - r1.min(r2)).abs() < 1e-9, "{s}");
            assert!((rates[1].1 - r1.max(r2)).abs() < 1e-9, "{s}");
        }
    }

    #[test]
    fn double_real_root_gives_bare_and_x_scaled_terms() {
        for r in [2.0, -3.0, 0.5] {
            let s = solution(&[1.0, -2.0 * r, r * r]);
            assert_eq!(s.terms.len(), 2, "{s}");
            assert_eq!(s.terms[0].power, 0);
            assert_eq!(s.terms[1].power, 1);
            for term in &s.terms {
                assert!(term.oscillation.is_none());
                assert!((term.rate - r).abs() < 1e-9, "{s}");
            }
        }
    }

    #[test]
    fn pure_imaginary_roots_give_cos_and_sin_without_exponential() {
        for omega in [1.0, 2.0, 3.5] {
            let s = solution(&[1.0, 0.0, omega * omega]);
            assert_eq!(s.terms.len(), 2, "{s}");
            let kinds: Vec<Oscillation> = s
                .terms
                .iter()
                .map(|t| t.oscillation.expect("oscillating term").0)
                .collect();
            assert_eq!(kinds, vec![Oscillation::Cos, Oscillation::Sin]);
            for term in &s.terms {
                assert_eq!(term.rate, 0.0);
                let (_, frequency) = term.oscillation.expect("oscillating term");
                assert!((frequency - omega).abs() < 1e-9);
                assert!(!term.to_string().contains("e^"));
            }
        }
    }

    #[test]
    fn repeated_conjugate_pair_gives_four_terms() {
        let s = solution(&[1.0, 0.0, 2.0, 0.0, 1.0]);
        assert_eq!(
            s.to_string(),
            "y(x) = C_1cos(x) + C_2sin(x) + C_3xcos(x) + C_4xsin(x)"
        );
        assert_unique_constants(&s);
    }

    #[test]
    fn damped_oscillation_keeps_exponential_factor() {
        // r = -1 +/- 2i
        let s = solution(&[1.0, 2.0, 5.0]);
        assert_eq!(s.to_string(), "y(x) = C_1e^(-x)cos(2x) + C_2e^(-x)sin(2x)");
    }

    #[test]
    fn fixed_examples_render_expected_strings() {
        assert_eq!(
            solve_ode_general(&[1.0, -3.0, 2.0]).expect("solve"),
            "y(x) = C_1e^(x) + C_2e^(2x)"
        );
        assert_eq!(
            solve_ode_general(&[1.0, -4.0, 4.0]).expect("solve"),
            "y(x) = C_1e^(2x) + C_2xe^(2x)"
        );
        assert_eq!(
            solve_ode_general(&[1.0, 0.0, 4.0]).expect("solve"),
            "y(x) = C_1cos(2x) + C_2sin(2x)"
        );
        assert_eq!(
            solve_ode_general(&[1.0, -6.0, 12.0, -8.0]).expect("solve"),
            "y(x) = C_1e^(2x) + C_2xe^(2x) + C_3x^2e^(2x)"
        );
    }

    #[test]
    fn first_order_equation_has_single_exponential() {
        assert_eq!(
            solve_ode_general(&[1.0, -5.0]).expect("solve"),
            "y(x) = C_1e^(5x)"
        );
    }

    #[test]
    fn constant_polynomial_gives_degenerate_string() {
        assert_eq!(solve_ode_general(&[4.0]).expect("solve"), "y(x) = ");
    }

    #[test]
    fn zero_root_has_no_exponential_factor() {
        assert_eq!(
            solve_ode_general(&[1.0, 0.0, 0.0]).expect("solve"),
            "y(x) = C_1 + C_2x"
        );
    }

    #[test]
    fn mixed_real_and_complex_roots() {
        // (r - 1)(r^2 + 1) = r^3 - r^2 + r - 1
        let s = solution(&[1.0, -1.0, 1.0, -1.0]);
        assert_eq!(s.to_string(), "y(x) = C_1e^(x) + C_2cos(x) + C_3sin(x)");
    }

    #[test]
    fn output_is_deterministic() {
        for coefficients in [
            vec![1.0, -3.0, 2.0],
            vec![1.0, 0.0, 2.0, 0.0, 1.0],
            vec![1.0, -6.0, 12.0, -8.0],
            vec![2.0, 3.0, -1.0, 4.0, 0.5],
        ] {
            let first = solve_ode_general(&coefficients).expect("solve");
            let second = solve_ode_general(&coefficients).expect("solve");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn invalid_input_is_rejected() {
        assert_eq!(
            solve_ode_general(&[]),
            Err(PolynomialError::EmptyCoefficients)
        );
        assert_eq!(
            solve_ode_general(&[0.0, 1.0, 2.0]),
            Err(PolynomialError::ZeroLeadingCoefficient)
        );
    }

    #[test]
    fn group_roots_merges_perturbed_multiple_root() {
        // (r - 2)^3 (r + 1)
        let polynomial = Polynomial::from_descending(&[1.0, -5.0, 6.0, 4.0, -8.0]).expect("valid");
        let roots = vec![
            Complex::new(2.0 + 1e-6, 0.0),
            Complex::new(2.0 - 0.5e-6, 0.8e-6),
            Complex::new(2.0 - 0.5e-6, -0.8e-6),
            Complex::new(-1.0, 0.0),
        ];
        let groups = group_roots(&polynomial, &roots, &RootSettings::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].root, Complex::new(-1.0, 0.0));
        assert_eq!(groups[0].multiplicity, 1);
        assert_eq!(groups[1].root, Complex::new(2.0, 0.0));
        assert_eq!(groups[1].multiplicity, 3);
    }

    #[test]
    fn group_roots_snaps_tiny_imaginary_parts() {
        let polynomial = Polynomial::from_descending(&[1.0, -3.0]).expect("valid");
        let roots = vec![Complex::new(3.0, 1e-12)];
        let groups = group_roots(&polynomial, &roots, &RootSettings::default());
        assert!(groups[0].is_real());
        assert_eq!(groups[0].root.re, 3.0);
    }

    #[test]
    fn residual_check_keeps_close_roots_apart() {
        // (r - 1)(r - 1.00005) with a spread wide enough to admit the pair
        let polynomial =
            Polynomial::from_descending(&[1.0, -2.00005, 1.00005]).expect("valid");
        let roots = vec![Complex::new(1.0, 0.0), Complex::new(1.00005, 0.0)];
        let settings = RootSettings {
            cluster_spread: 1e6,
            ..RootSettings::default()
        };
        let groups = group_roots(&polynomial, &roots, &settings);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.multiplicity == 1));
    }

    #[test]
    fn quadruple_real_root() {
        assert_eq!(
            solve_ode_general(&[1.0, -8.0, 24.0, -32.0, 16.0]).expect("solve"),
            "y(x) = C_1e^(2x) + C_2xe^(2x) + C_3x^2e^(2x) + C_4x^3e^(2x)"
        );
    }

    #[test]
    fn quintuple_real_root() {
        assert_eq!(
            solve_ode_general(&[1.0, 5.0, 10.0, 10.0, 5.0, 1.0]).expect("solve"),
            "y(x) = C_1e^(-x) + C_2xe^(-x) + C_3x^2e^(-x) + C_4x^3e^(-x) + C_5x^4e^(-x)"
        );
    }

    #[test]
    fn close_real_roots_stay_distinct() {
        for (r1, r2) in [
            (1.0, 1.00005),
            (-3.0, -2.9999),
            (10.0, 10.0002),
            (0.0, 1e-3),
        ] {
            let s = solution(&[1.0, -(r1 + r2), r1 * r2]);
            let rates = real_rates(&s);
            assert_eq!(s.terms.len(), 2, "{s}");
            assert_eq!(rates.len(), 2, "{s}");
            assert!(rates.iter().all(|(power, _)| *power == 0), "{s}");
            assert!((rates[0].1 - r1).abs() < 1e-8, "{s}");
            assert!((rates[1].1 - r2).abs() < 1e-8, "{s}");
        }
    }

    #[test]
    fn x4_plus_one_gives_two_damped_families() {
        assert_eq!(
            solve_ode_general(&[1.0, 0.0, 0.0, 0.0, 1.0]).expect("solve"),
            "y(x) = C_1e^(-0.7071067812x)cos(0.7071067812x) \
             + C_2e^(-0.7071067812x)sin(0.7071067812x) \
             + C_3e^(0.7071067812x)cos(0.7071067812x) \
             + C_4e^(0.7071067812x)sin(0.7071067812x)"
        );
    }

    #[test]
    fn triple_conjugate_pair() {
        // (r^2 + 1)^3
        assert_eq!(
            solve_ode_general(&[1.0, 0.0, 3.0, 0.0, 3.0, 0.0, 1.0]).expect("solve"),
            "y(x) = C_1cos(x) + C_2sin(x) + C_3xcos(x) + C_4xsin(x) + C_5x^2cos(x) + C_6x^2sin(x)"
        );
    }

    #[test]
    fn huge_root_is_not_rounded_to_infinity() {
        let s = solution(&[1.0, -1e300]);
        assert_eq!(s.terms.len(), 1);
        assert_eq!(s.terms[0].rate, 1e300);
        assert!(!s.to_string().contains("inf"));
    }

    #[test]
    fn unpaired_complex_group_still_emits_cos_sin_family() {
        let groups = vec![RootGroup {
            root: Complex::new(0.0, -2.0),
            multiplicity: 1,
        }];
        let s = terms_from_groups(&groups, &RootSettings::default());
        assert_eq!(s.to_string(), "y(x) = C_1cos(2x) + C_2sin(2x)");
    }

    #[test]
    fn mismatched_conjugate_multiplicity_uses_upper_partner() {
        let groups = vec![
            RootGroup {
                root: Complex::new(1.0, 1.0),
                multiplicity: 2,
            },
            RootGroup {
                root: Complex::new(1.0, -1.0),
                multiplicity: 1,
            },
        ];
        let s = terms_from_groups(&groups, &RootSettings::default());
        assert_eq!(s.terms.len(), 4);
        assert_unique_constants(&s);
    }

    #[test]
    fn upper_partner_supplies_rate_frequency_and_multiplicity() {
        let groups = vec![
            RootGroup {
                root: Complex::new(0.5, -1.0),
                multiplicity: 1,
            },
            RootGroup {
                root: Complex::new(0.5000002, 1.0000005),
                multiplicity: 2,
            },
        ];
        let s = terms_from_groups(&groups, &RootSettings::default());
        assert_eq!(s.terms.len(), 4);
        for term in &s.terms {
            assert_eq!(term.rate, 0.5000002);
            let (_, frequency) = term.oscillation.expect("oscillating term");
            assert_eq!(frequency, 1.0000005);
        }
    }

    #[test]
    fn term_formatting_rules() {
        let term = SolutionTerm {
            constant: 7,
            power: 3,
            rate: -0.5,
            oscillation: Some((Oscillation::Sin, 1.25)),
        };
        assert_eq!(term.to_string(), "C_7x^3e^(-0.5x)sin(1.25x)");
    }

    #[test]
    fn initial_conditions_match_finite_differences() {
        let term = SolutionTerm {
            constant: 1,
            power: 2,
            rate: 0.3,
            oscillation: Some((Oscillation::Cos, 1.7)),
        };
        let ic = term.initial_conditions(3);
        let h = 1e-4;
        let f = |x: f64| term.evaluate(x);
        assert!((ic[0] - f(0.0)).abs() < 1e-12);
        assert!((ic[1] - (f(h) - f(-h)) / (2.0 * h)).abs() < 1e-6);
        assert!((ic[2] - (f(h) - 2.0 * f(0.0) + f(-h)) / (h * h)).abs() < 1e-4);
        // x^2 e^(0.3x) cos(1.7x) has y''(0) = 2
        assert!((ic[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn linear_ode_companion_form() {
        let polynomial = Polynomial::from_descending(&[2.0, -6.0, 4.0]).expect("valid");
        let ode = LinearOde::new(&polynomial);
        assert_eq!(ode.dimension(), 2);
        let mut out = [0.0; 2];
        ode.apply(0.0, &[1.0, 2.0], &mut out);
        // y'' = 3 y' - 2 y
        assert_eq!(out, [2.0, 4.0]);
    }

    #[test]
    fn every_basis_term_solves_its_equation() {
        for coefficients in [
            vec![1.0, -3.0, 2.0],
            vec![1.0, -4.0, 4.0],
            vec![1.0, 0.0, 4.0],
            vec![1.0, 0.0, 2.0, 0.0, 1.0],
            vec![1.0, -6.0, 12.0, -8.0],
            vec![1.0, 2.0, 5.0],
        ] {
            let polynomial = Polynomial::from_descending(&coefficients).expect("valid");
            let s = solution(&coefficients);
            let deviation =
                verify_solution(&polynomial, &s, 1.0, 2000).expect("verification should run");
            assert!(deviation < 1e-7, "{s}: deviation {deviation}");
        }
    }

    #[test]
    fn verify_solution_rejects_bad_arguments() {
        let polynomial = Polynomial::from_descending(&[1.0, -1.0]).expect("valid");
        let s = solution(&[1.0, -1.0]);
        let err = verify_solution(&polynomial, &s, 1.0, 0).expect_err("zero steps");
        assert!(format!("{err}").contains("at least one integration step"));
        let err = verify_solution(&polynomial, &s, f64::NAN, 10).expect_err("NaN end");
        assert!(format!("{err}").contains("finite"));
    }
}
