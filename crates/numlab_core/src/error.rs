use thiserror::Error;

/// Failure classes of the polynomial root and ODE solution pipeline.
///
/// Input problems and numeric failures are kept apart so callers can tell a
/// malformed coefficient list from a root finder that did not converge.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolynomialError {
    #[error("Coefficient list is empty.")]
    EmptyCoefficients,
    #[error("Leading coefficient must be nonzero.")]
    ZeroLeadingCoefficient,
    #[error("Coefficient at index {index} is not finite ({value}).")]
    NonFiniteCoefficient { index: usize, value: f64 },
    #[error("Root finding failed: {0}")]
    RootFindingFailed(String),
}
