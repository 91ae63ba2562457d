//! Rosenbrock 2(3) W-method for stiff circuits.
//!
//! A linearly implicit Runge–Kutta method (Shampine & Reichelt's modified
//! Rosenbrock triple). Each step factors W = I - h·d·J once and performs
//! three linear solves; no Newton iteration is needed.
//!
//! ```text
//! W  = I - h d J
//! k1 = W⁻¹ (f(t, y) + h d T)
//! F1 = f(t + h/2, y + h/2 k1)
//! k2 = W⁻¹ (F1 - k1) + k1
//! y1 = y + h k2
//! F2 = f(t + h, y1)
//! k3 = W⁻¹ (F2 - e32 (k2 - F1) - 2 (k1 - f(t, y)) + h d T)
//! err = h/6 (k1 - 2 k2 + k3)
//! ```
//!
//! where T = ∂f/∂t, d = 1/(2 + √2) and e32 = 6 + √2. The method is
//! L-stable, so the fast mode of a heavily overdamped parallel tank (1/RC
//! much larger than ω₀) does not force tiny steps.

use std::f64::consts::SQRT_2;

use crate::circuit::CircuitParameters;
use crate::error::FailureReason;
use crate::model::{combine, State, StateModel};

use super::linear::IterationMatrix;
use super::step::{DenseOutput, StepAttempt, Stepper};

const D: f64 = 1.0 / (2.0 + SQRT_2);
const E32: f64 = 6.0 + SQRT_2;

/// Second-order L-stable Rosenbrock method with third-order error estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rosenbrock23;

impl Stepper for Rosenbrock23 {
    fn error_exponent(&self) -> f64 {
        1.0 / 3.0
    }

    fn attempt<M: StateModel + ?Sized>(
        &self,
        model: &M,
        params: &CircuitParameters,
        t: f64,
        y: &State,
        f0: &State,
        h: f64,
    ) -> std::result::Result<StepAttempt, FailureReason> {
        let jac = model.jacobian(y, t, params);
        let dfdt = model.time_derivative(y, t, params);
        let w = IterationMatrix::factor(&jac, h * D).ok_or(FailureReason::SingularIterationMatrix)?;

        let k1 = w.solve(&combine(f0, &[(h * D, &dfdt)]));

        let y_half = combine(y, &[(0.5 * h, &k1)]);
        let f1 = model.derivative(&y_half, t + 0.5 * h, params);
        let k2 = combine(&w.solve(&combine(&f1, &[(-1.0, &k1)])), &[(1.0, &k1)]);

        let y_new = combine(y, &[(h, &k2)]);
        let f_new = model.derivative(&y_new, t + h, params);

        let rhs = combine(
            &f_new,
            &[
                (-E32, &k2),
                (E32, &f1),
                (-2.0, &k1),
                (2.0, f0),
                (h * D, &dfdt),
            ],
        );
        let k3 = w.solve(&rhs);

        let zero = [0.0; crate::model::STATE_DIM];
        let error = combine(&zero, &[(h / 6.0, &k1), (-h / 3.0, &k2), (h / 6.0, &k3)]);

        Ok(StepAttempt {
            y_new,
            f_new,
            error,
            dense: DenseOutput::Rosenbrock { k1, k2, d: D },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Topology;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_step_is_second_order() {
        // Undamped series loop: exact solution v = V0 cos(w0 t), i = V0 sqrt(C/L) sin(w0 t)
        let params = CircuitParameters::new(1e-3, 1e-3, 0.0, 1.0).unwrap();
        let model = Topology::Series.model();
        let y0 = model.initial_state(&params);
        let f0 = model.derivative(&y0, 0.0, &params);
        let w0 = params.natural_frequency();

        let local_error = |h: f64| {
            let step = Rosenbrock23.attempt(model, &params, 0.0, &y0, &f0, h).unwrap();
            let di = step.y_new[0] - (w0 * h).sin();
            let dv = step.y_new[1] - (w0 * h).cos();
            (di.hypot(dv), step.error[0].hypot(step.error[1]))
        };

        // Halving h should shrink the local error by about 2^3
        let (e1, est1) = local_error(1e-4);
        let (e2, _) = local_error(5e-5);
        let ratio = e1 / e2;
        assert!(ratio > 7.0 && ratio < 9.0, "ratio = {}", ratio);

        // and the embedded estimate should track the true error
        assert_relative_eq!(est1, e1, max_relative = 0.1);
    }

    #[test]
    fn test_interpolant_matches_endpoints() {
        let params = CircuitParameters::new(1e-3, 1e-6, 5.0, 3.0).unwrap();
        let model = Topology::Parallel.model();
        let y0 = model.initial_state(&params);
        let f0 = model.derivative(&y0, 0.0, &params);
        let h = 1e-5;
        let step = Rosenbrock23.attempt(model, &params, 0.0, &y0, &f0, h).unwrap();

        let start = step.interpolate(&y0, h, 0.0);
        let end = step.interpolate(&y0, h, 1.0);
        for k in 0..2 {
            assert_relative_eq!(start[k], y0[k], epsilon = 1e-12);
            assert_relative_eq!(end[k], step.y_new[k], epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_stiff_decay_stays_bounded() {
        // 1/RC = 1e9 with h far beyond the explicit stability limit
        let params = CircuitParameters::new(1e-3, 1e-6, 1e-3, 100.0).unwrap();
        let model = Topology::Parallel.model();
        let y0 = model.initial_state(&params);
        let f0 = model.derivative(&y0, 0.0, &params);
        let step = Rosenbrock23.attempt(model, &params, 0.0, &y0, &f0, 1e-4).unwrap();
        assert!(step.y_new[0].abs() < y0[0].abs());
        assert!(step.y_new.iter().all(|v| v.is_finite()));
    }
}
