//! Information-theory quantities for discrete distributions, in nats.
//!
//! Entries with zero probability contribute nothing: `0 log 0` is taken as 0
//! and pairs where either side is zero are skipped in the two-distribution
//! formulas.

use anyhow::{bail, Result};
use nalgebra::DMatrix;
use rand::Rng;

fn validate(name: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        bail!("Distribution {} is empty.", name);
    }
    for (idx, &p) in values.iter().enumerate() {
        if !p.is_finite() || p < 0.0 {
            bail!(
                "Distribution {} has an invalid probability at index {} ({}).",
                name,
                idx,
                p
            );
        }
    }
    Ok(())
}

fn validate_pair(p: &[f64], q: &[f64]) -> Result<()> {
    validate("P", p)?;
    validate("Q", q)?;
    if p.len() != q.len() {
        bail!(
            "Distribution length mismatch: P has {} entries, Q has {}.",
            p.len(),
            q.len()
        );
    }
    Ok(())
}

/// `H(P) = -sum p log p`.
pub fn entropy(p: &[f64]) -> Result<f64> {
    validate("P", p)?;
    Ok(-p.iter().filter(|&&v| v > 0.0).map(|v| v * v.ln()).sum::<f64>())
}

/// `H(P, Q) = -sum p log q`.
pub fn cross_entropy(p: &[f64], q: &[f64]) -> Result<f64> {
    validate_pair(p, q)?;
    Ok(-p
        .iter()
        .zip(q)
        .filter(|(&pi, &qi)| pi > 0.0 && qi > 0.0)
        .map(|(pi, qi)| pi * qi.ln())
        .sum::<f64>())
}

/// `D(P || Q) = sum p log(p / q)`.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> Result<f64> {
    validate_pair(p, q)?;
    Ok(p.iter()
        .zip(q)
        .filter(|(&pi, &qi)| pi > 0.0 && qi > 0.0)
        .map(|(pi, qi)| pi * (pi / qi).ln())
        .sum())
}

/// `I(X; Y) = sum p(x, y) log(p(x, y) / (p(x) p(y)))` for a joint table
/// with `X` along rows and `Y` along columns.
pub fn mutual_information(joint: &DMatrix<f64>) -> Result<f64> {
    validate("P(X, Y)", joint.as_slice())?;

    let px: Vec<f64> = joint.row_iter().map(|row| row.sum()).collect();
    let py: Vec<f64> = joint.column_iter().map(|col| col.sum()).collect();

    let mut info = 0.0;
    for i in 0..joint.nrows() {
        for j in 0..joint.ncols() {
            let pxy = joint[(i, j)];
            if pxy > 0.0 {
                info += pxy * (pxy / (px[i] * py[j])).ln();
            }
        }
    }
    Ok(info)
}

/// Random probability vector of length `n`: uniform draws normalised to 1.
pub fn random_distribution<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Vec<f64>> {
    if n == 0 {
        bail!("Distribution size must be at least 1.");
    }
    let draws: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
    let total: f64 = draws.iter().sum();
    if total <= 0.0 {
        bail!("Random draws summed to zero; cannot normalise.");
    }
    Ok(draws.into_iter().map(|v| v / total).collect())
}
