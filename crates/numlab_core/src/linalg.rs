//! Matrix lab: determinants two ways, an SVD assembled from a symmetric
//! eigendecomposition, and PCA on top of the SVD.

use anyhow::{anyhow, bail, Result};
use nalgebra::{DMatrix, DVector, SymmetricEigen};

const SINGULAR_EPS: f64 = 1e-10;

fn ensure_square(matrix: &DMatrix<f64>) -> Result<()> {
    if matrix.nrows() == 0 {
        bail!("Matrix must not be empty.");
    }
    if !matrix.is_square() {
        bail!(
            "Matrix must be square, got {}x{}.",
            matrix.nrows(),
            matrix.ncols()
        );
    }
    Ok(())
}

/// Determinant by cofactor expansion along the first row. O(n!).
pub fn recursive_determinant(matrix: &DMatrix<f64>) -> Result<f64> {
    ensure_square(matrix)?;
    Ok(cofactor_expansion(matrix))
}

fn cofactor_expansion(matrix: &DMatrix<f64>) -> f64 {
    let n = matrix.nrows();
    match n {
        1 => matrix[(0, 0)],
        2 => matrix[(0, 0)] * matrix[(1, 1)] - matrix[(0, 1)] * matrix[(1, 0)],
        _ => (0..n)
            .map(|j| {
                let minor = matrix.clone().remove_row(0).remove_column(j);
                let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
                sign * matrix[(0, j)] * cofactor_expansion(&minor)
            })
            .sum(),
    }
}

/// Determinant as `det(P) * prod(diag(U))` from an LU factorisation with
/// partial pivoting; `L` has a unit diagonal.
pub fn lu_determinant(matrix: &DMatrix<f64>) -> Result<f64> {
    ensure_square(matrix)?;
    let lu = matrix.clone().lu();
    let det_p: f64 = lu.p().determinant();
    let det_u: f64 = lu.u().diagonal().product();
    Ok(det_p * det_u)
}

#[derive(Debug, Clone)]
pub struct SvdFactors {
    pub u: DMatrix<f64>,
    /// Descending.
    pub singular_values: DVector<f64>,
    pub v_t: DMatrix<f64>,
}

impl SvdFactors {
    pub fn reconstruct(&self) -> DMatrix<f64> {
        &self.u * DMatrix::from_diagonal(&self.singular_values) * &self.v_t
    }
}

/// `A = U S V^T` where `V` and `S^2` are the eigenvectors and eigenvalues of
/// `A^T A`, and `U = A V S^-1`. Singular values below `1e-10` keep a zero
/// column in `U`.
pub fn svd_from_eigen(a: &DMatrix<f64>) -> Result<SvdFactors> {
    if a.nrows() == 0 || a.ncols() == 0 {
        bail!("Matrix must not be empty.");
    }
    let n = a.ncols();
    let eigen = SymmetricEigen::new(a.transpose() * a);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[j].total_cmp(&eigen.eigenvalues[i]));

    let v = DMatrix::from_fn(n, n, |r, c| eigen.eigenvectors[(r, order[c])]);
    let singular_values =
        DVector::from_fn(n, |i, _| eigen.eigenvalues[order[i]].max(0.0).sqrt());
    let inverse = singular_values.map(|s| if s > SINGULAR_EPS { 1.0 / s } else { 0.0 });

    let u = a * &v * DMatrix::from_diagonal(&inverse);
    Ok(SvdFactors {
        u,
        singular_values,
        v_t: v.transpose(),
    })
}

/// Projects the column-centred data onto its first `n_components`
/// principal axes. Rows are observations, columns are features.
pub fn pca(x: &DMatrix<f64>, n_components: usize) -> Result<DMatrix<f64>> {
    if x.nrows() == 0 || x.ncols() == 0 {
        bail!("Data matrix must not be empty.");
    }
    if n_components == 0 || n_components > x.ncols().min(x.nrows()) {
        bail!(
            "n_components must be between 1 and {}, got {}.",
            x.ncols().min(x.nrows()),
            n_components
        );
    }

    let means = x.row_mean();
    let centered = DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[(i, j)] - means[j]);
    let svd = centered.clone().svd(false, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| anyhow!("SVD did not produce right singular vectors."))?;

    let axes = v_t.rows(0, n_components).transpose();
    Ok(centered * axes)
}
