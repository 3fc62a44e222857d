use crate::traits::{FirstOrderSystem, Scalar, Steppable};

/// Classic fourth-order Runge-Kutta stepper with reusable stage buffers.
pub struct RK4<T: Scalar> {
    slopes: [Vec<T>; 4],
    scratch: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            slopes: std::array::from_fn(|_| vec![T::zero(); dim]),
            scratch: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl FirstOrderSystem<T>, x: &mut T, state: &mut [T], h: T) {
        let two = T::one() + T::one();
        let half_h = h / two;
        // stage s is evaluated at x + offsets[s], from state + offsets[s] * slope[s - 1]
        let offsets = [T::zero(), half_h, half_h, h];

        for (stage, &offset) in offsets.iter().enumerate() {
            if stage == 0 {
                self.scratch.copy_from_slice(state);
            } else {
                let previous = &self.slopes[stage - 1];
                for ((trial, &y), &k) in self.scratch.iter_mut().zip(state.iter()).zip(previous) {
                    *trial = y + offset * k;
                }
            }
            system.apply(*x + offset, &self.scratch, &mut self.slopes[stage]);
        }

        let weight = h / (two + two + two);
        let [k1, k2, k3, k4] = &self.slopes;
        for (i, y) in state.iter_mut().enumerate() {
            *y = *y + weight * (k1[i] + two * (k2[i] + k3[i]) + k4[i]);
        }
        *x = *x + h;
    }
}

/// Integrates `system` from `x0` over `steps` equal steps of size `h`,
/// returning the final state.
pub fn integrate_fixed<T: Scalar>(
    system: &impl FirstOrderSystem<T>,
    x0: T,
    initial: &[T],
    h: T,
    steps: usize,
) -> Vec<T> {
    let mut stepper = RK4::new(initial.len());
    let mut state = initial.to_vec();
    let mut x = x0;
    for _ in 0..steps {
        stepper.step(system, &mut x, &mut state, h);
    }
    state
}
