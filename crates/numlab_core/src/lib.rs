pub mod error;
pub mod fourier;
pub mod geometry;
pub mod information;
pub mod linalg;
pub mod ode;
pub mod polynomial;
pub mod solvers;
/// The `numlab_core` crate collects the numerical routines of a
/// numerical-methods course behind small, pure functions.
///
/// Key components:
/// - **Polynomial**: companion-matrix roots plus the quadratic and Cardano closed forms.
/// - **ODE**: general solutions of constant-coefficient linear ODEs from root multiplicities,
///   with an RK4 cross-check of every basis term.
/// - **Fourier**: naive DFT / inverse DFT and rustfft-backed reference transforms.
/// - **Geometry**, **Information**, **Linalg**: analytic geometry, entropy-family formulas,
///   determinants, SVD via eigendecomposition and PCA.
pub mod traits;

pub use error::PolynomialError;
pub use ode::{general_solution, solve_ode_general, GeneralSolution, SolutionTerm};
pub use polynomial::{Polynomial, RootSettings};
