//! Time-domain integration of the circuit state equations.
//!
//! The solver advances y' = f(y, t) with an adaptive step size chosen from
//! an embedded error estimate, then reports the state at exactly the
//! requested grid points using each step's continuous extension.
//!
//! ## Error control
//!
//! A step of size h is accepted when the weighted RMS norm
//!
//! ```text
//! ‖err‖ = sqrt( 1/n Σ (errᵢ / (atol + rtol·max(|yᵢ|, |y_newᵢ|)))² )
//! ```
//!
//! is at most one. The next step is h·clamp(0.9·‖err‖^(-1/(q+1)), 0.2, 5),
//! with no growth right after a rejection.
//!
//! ## Methods
//!
//! - [`Rosenbrock23`]: linearly implicit and L-stable (default)
//! - [`DormandPrince45`]: explicit, fifth order

mod dormand_prince;
mod integrator;
mod linear;
mod rosenbrock;
mod step;
mod trajectory;

pub use dormand_prince::DormandPrince45;
pub use integrator::{IntegratorConfig, Method, TimeDomainSolver};
pub use linear::IterationMatrix;
pub use rosenbrock::Rosenbrock23;
pub use step::{DenseOutput, StepAttempt, Stepper};
pub use trajectory::StateTrajectory;

/// Default relative tolerance.
pub const DEFAULT_RTOL: f64 = 1e-8;

/// Default absolute tolerance (amperes and volts alike).
pub const DEFAULT_ATOL: f64 = 1e-9;

/// Default budget of step attempts per integration.
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// Safety factor applied to the optimal step-size ratio.
const SAFETY: f64 = 0.9;

/// Smallest allowed step-size ratio between consecutive attempts.
const MIN_FACTOR: f64 = 0.2;

/// Largest allowed step-size ratio between consecutive attempts.
const MAX_FACTOR: f64 = 5.0;
