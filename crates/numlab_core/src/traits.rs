use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Floating-point types the integrators and ODE systems are generic over.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A first-order system `y' = f(x, y)`.
///
/// Higher-order linear equations are brought into this form through their
/// companion (state-space) representation, see [`crate::ode::LinearOde`].
pub trait FirstOrderSystem<T: Scalar> {
    /// Number of state components.
    fn dimension(&self) -> usize;

    /// Writes `f(x, y)` into `out`.
    fn apply(&self, x: T, y: &[T], out: &mut [T]);
}

/// Fixed-step integrators.
pub trait Steppable<T: Scalar> {
    /// Advances `state` from `x` to `x + h` and updates `x`.
    fn step(&mut self, system: &impl FirstOrderSystem<T>, x: &mut T, state: &mut [T], h: T);
}
