//! Single-step interface shared by the integration methods.

use crate::circuit::CircuitParameters;
use crate::error::FailureReason;
use crate::model::{combine, State, StateModel};

use super::dormand_prince::continuous_weights;

/// Outcome of one trial step from (t, y) to (t + h, y_new).
#[derive(Debug, Clone)]
pub struct StepAttempt {
    /// Proposed state at t + h
    pub y_new: State,
    /// f(t + h, y_new), reused as the first stage of the next step
    pub f_new: State,
    /// Embedded local error estimate
    pub error: State,
    /// Data for the continuous extension over the step
    pub dense: DenseOutput,
}

/// Continuous extension of an accepted step.
#[derive(Debug, Clone)]
pub enum DenseOutput {
    /// Second-order interpolant built from the first two Rosenbrock stages
    Rosenbrock { k1: State, k2: State, d: f64 },
    /// Fourth-order continuous extension over all seven Dormand–Prince stages
    DormandPrince { stages: [State; 7] },
}

impl StepAttempt {
    /// State at t + θ·h for θ in [0, 1].
    pub fn interpolate(&self, y0: &State, h: f64, theta: f64) -> State {
        match &self.dense {
            DenseOutput::Rosenbrock { k1, k2, d } => {
                let denom = 1.0 - 2.0 * d;
                let c1 = theta * (1.0 - theta) / denom;
                let c2 = theta * (theta - 2.0 * d) / denom;
                combine(y0, &[(h * c1, k1), (h * c2, k2)])
            }
            DenseOutput::DormandPrince { stages } => {
                let w = continuous_weights(theta);
                let mut out = *y0;
                for (wi, k) in w.iter().zip(stages.iter()) {
                    for (o, v) in out.iter_mut().zip(k.iter()) {
                        *o += h * wi * v;
                    }
                }
                out
            }
        }
    }
}

/// An embedded Runge–Kutta type method.
pub trait Stepper {
    /// Exponent used in the step-size update, 1 / (q + 1) where q is the
    /// order of the error estimate.
    fn error_exponent(&self) -> f64;

    /// Try one step of size `h`. `f0` is f(t, y).
    fn attempt<M: StateModel + ?Sized>(
        &self,
        model: &M,
        params: &CircuitParameters,
        t: f64,
        y: &State,
        f0: &State,
        h: f64,
    ) -> std::result::Result<StepAttempt, FailureReason>;
}
