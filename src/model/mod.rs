//! State-space models of the RLC topologies.
//!
//! Each topology is a pair of coupled first-order ODEs derived from
//! Kirchhoff's laws for the source-free circuit:
//!
//! ```text
//! series   (i, v):   di/dt = (v - R i) / L      dv/dt = -i / C
//! parallel (v, i):   dv/dt = -(v/R + i) / C     di/dt = v / L
//! ```
//!
//! The integrators in [`crate::solver`] only see the [`StateModel`] trait, so
//! any other two-state linear or nonlinear system can be plugged in.

mod rlc;

pub use rlc::{ParallelRlc, SeriesRlc};

use crate::circuit::{CircuitParameters, Topology};

/// Number of state variables of a second-order circuit.
pub const STATE_DIM: usize = 2;

/// A point in state space.
pub type State = [f64; STATE_DIM];

/// Row-major Jacobian ∂f/∂y.
pub type Jacobian = [[f64; STATE_DIM]; STATE_DIM];

/// Relative perturbation used by the finite-difference Jacobian.
const FD_PERTURBATION: f64 = 1e-7;

/// Right-hand side of y' = f(y, t; params).
pub trait StateModel {
    /// Which circuit arrangement this model describes.
    fn topology(&self) -> Topology;

    /// State derivative at `state` and time `t`.
    fn derivative(&self, state: &State, t: f64, params: &CircuitParameters) -> State;

    /// Jacobian ∂f/∂y at `state`.
    ///
    /// The default is a forward-difference approximation; linear models
    /// should override it with the exact matrix.
    fn jacobian(&self, state: &State, t: f64, params: &CircuitParameters) -> Jacobian {
        let f0 = self.derivative(state, t, params);
        let mut jac = [[0.0; STATE_DIM]; STATE_DIM];
        for col in 0..STATE_DIM {
            let delta = FD_PERTURBATION * state[col].abs().max(1.0);
            let mut perturbed = *state;
            perturbed[col] += delta;
            let f1 = self.derivative(&perturbed, t, params);
            for row in 0..STATE_DIM {
                jac[row][col] = (f1[row] - f0[row]) / delta;
            }
        }
        jac
    }

    /// Explicit time derivative ∂f/∂t. Zero for autonomous models.
    fn time_derivative(&self, _state: &State, _t: f64, _params: &CircuitParameters) -> State {
        [0.0; STATE_DIM]
    }

    /// State at t = 0 for the given initial capacitor voltage.
    fn initial_state(&self, params: &CircuitParameters) -> State {
        let mut state = [0.0; STATE_DIM];
        state[self.topology().voltage_index()] = params.initial_voltage();
        state
    }

    /// Stored energy ½Li² + ½Cv² of a state.
    fn stored_energy(&self, state: &State, params: &CircuitParameters) -> f64 {
        let topology = self.topology();
        params.stored_energy(state[topology.current_index()], state[topology.voltage_index()])
    }
}

impl Topology {
    /// The state model for this topology.
    pub fn model(&self) -> &'static dyn StateModel {
        match self {
            Topology::Series => &SeriesRlc,
            Topology::Parallel => &ParallelRlc,
        }
    }
}

/// `y + Σ cᵢ·kᵢ`.
pub(crate) fn combine(y: &State, terms: &[(f64, &State)]) -> State {
    let mut out = *y;
    for (c, k) in terms {
        for (o, v) in out.iter_mut().zip(k.iter()) {
            *o += c * v;
        }
    }
    out
}

/// Whether every component is finite.
pub(crate) fn is_finite(y: &State) -> bool {
    y.iter().all(|v| v.is_finite())
}
