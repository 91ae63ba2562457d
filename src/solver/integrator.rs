//! Adaptive integration driver.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

use crate::circuit::{CircuitParameters, Topology};
use crate::error::{FailureReason, Result, RlcError};
use crate::grid::TimeGrid;
use crate::model::{is_finite, State, StateModel, STATE_DIM};

use super::step::Stepper;
use super::{
    DormandPrince45, Rosenbrock23, StateTrajectory, DEFAULT_ATOL, DEFAULT_MAX_STEPS, DEFAULT_RTOL,
    MAX_FACTOR, MIN_FACTOR, SAFETY,
};

/// Fraction of a step below which the gap to the end is absorbed.
const END_SLIVER: f64 = 1e-3;

/// Integration method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Linearly implicit, L-stable Rosenbrock 2(3)
    #[default]
    Rosenbrock23,
    /// Explicit Dormand–Prince 5(4)
    DormandPrince45,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Rosenbrock23 => write!(f, "rosenbrock23"),
            Method::DormandPrince45 => write!(f, "dormand-prince45"),
        }
    }
}

impl FromStr for Method {
    type Err = RlcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rosenbrock23" | "rosenbrock" | "ros23" => Ok(Method::Rosenbrock23),
            "dormand-prince45" | "dormand-prince" | "dopri5" | "rk45" => Ok(Method::DormandPrince45),
            _ => Err(RlcError::invalid_config(format!("unknown method '{}'", s))),
        }
    }
}

/// Configuration for the time-domain solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegratorConfig {
    /// Integration method.
    pub method: Method,
    /// Relative tolerance on each state component.
    pub rtol: f64,
    /// Absolute tolerance on each state component.
    pub atol: f64,
    /// Maximum number of step attempts (accepted and rejected).
    pub max_steps: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl IntegratorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the integration method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set relative and absolute tolerances.
    ///
    /// Tighter tolerances give better energy conservation for undamped
    /// circuits at the cost of more steps.
    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    /// Set the step attempt budget.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Check that tolerances are positive and the budget is non-zero.
    pub fn validate(&self) -> Result<()> {
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return Err(RlcError::invalid_config(format!(
                "rtol must be positive, got {}",
                self.rtol
            )));
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(RlcError::invalid_config(format!(
                "atol must be positive, got {}",
                self.atol
            )));
        }
        if self.max_steps == 0 {
            return Err(RlcError::invalid_config("max_steps must be at least 1"));
        }
        Ok(())
    }
}

/// Integrates a [`StateModel`] over a [`TimeGrid`].
#[derive(Debug, Clone)]
pub struct TimeDomainSolver {
    config: IntegratorConfig,
}

impl Default for TimeDomainSolver {
    fn default() -> Self {
        Self {
            config: IntegratorConfig::default(),
        }
    }
}

impl TimeDomainSolver {
    /// Create a solver, validating the configuration.
    pub fn new(config: IntegratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Ring-down of `topology` from its stored initial charge.
    ///
    /// Series starts at (i, v) = (0, V0); parallel at (v, i) = (V0, 0).
    pub fn solve(
        &self,
        topology: Topology,
        params: &CircuitParameters,
        grid: &TimeGrid,
    ) -> Result<StateTrajectory> {
        let model = topology.model();
        self.integrate(model, params, model.initial_state(params), grid)
    }

    /// Integrate `model` from `initial` at the first grid point to the last,
    /// reporting the state at every grid point.
    pub fn integrate<M: StateModel + ?Sized>(
        &self,
        model: &M,
        params: &CircuitParameters,
        initial: State,
        grid: &TimeGrid,
    ) -> Result<StateTrajectory> {
        if !is_finite(&initial) {
            return Err(RlcError::invalid_config(format!(
                "initial state {:?} is not finite",
                initial
            )));
        }

        let topology = model.topology();
        let states = match self.config.method {
            Method::Rosenbrock23 => drive(&Rosenbrock23, model, params, initial, grid, &self.config),
            Method::DormandPrince45 => {
                drive(&DormandPrince45, model, params, initial, grid, &self.config)
            }
        }
        .map_err(|e| {
            warn!(%topology, method = %self.config.method, error = %e, "time-domain integration failed");
            e
        })?;

        Ok(StateTrajectory::from_states(
            topology,
            grid.points().to_vec(),
            &states,
        ))
    }
}

/// Run the adaptive loop and sample the dense output on the grid.
fn drive<S: Stepper, M: StateModel + ?Sized>(
    stepper: &S,
    model: &M,
    params: &CircuitParameters,
    initial: State,
    grid: &TimeGrid,
    config: &IntegratorConfig,
) -> Result<Vec<State>> {
    let points = grid.points();
    let n = points.len();
    let t_end = grid.end();
    let span = grid.span();
    let exponent = stepper.error_exponent();

    let mut states = Vec::with_capacity(n);
    states.push(initial);

    let mut t = grid.start();
    let mut y = initial;
    let mut f = model.derivative(&y, t, params);
    if !is_finite(&f) {
        return Err(RlcError::integration_failure(t, 0, FailureReason::NonFiniteState));
    }

    let mut h = initial_step(&y, &f, span, config);
    let mut attempts = 0usize;
    let mut rejected = 0usize;
    let mut after_rejection = false;

    while states.len() < n {
        if attempts >= config.max_steps {
            return Err(RlcError::integration_failure(
                t,
                attempts,
                FailureReason::StepBudgetExhausted {
                    max_steps: config.max_steps,
                },
            ));
        }

        let h_min = 16.0 * f64::EPSILON * t.abs().max(span);
        let (h_step, last) = clip_to_end(t, h, t_end, h_min);
        h = h_step;
        if h < h_min {
            return Err(RlcError::integration_failure(
                t,
                attempts,
                FailureReason::StepSizeUnderflow { step: h },
            ));
        }

        attempts += 1;
        let step = stepper
            .attempt(model, params, t, &y, &f, h)
            .map_err(|reason| RlcError::integration_failure(t, attempts, reason))?;

        let err = if is_finite(&step.y_new) && is_finite(&step.f_new) {
            error_norm(&step.error, &y, &step.y_new, config)
        } else {
            f64::INFINITY
        };

        if err <= 1.0 {
            let t_new = if last { t_end } else { t + h };
            while states.len() < n && points[states.len()] <= t_new {
                let theta = ((points[states.len()] - t) / h).clamp(0.0, 1.0);
                states.push(step.interpolate(&y, h, theta));
            }

            t = t_new;
            y = step.y_new;
            f = step.f_new;

            let mut factor = step_factor(err, exponent);
            if after_rejection {
                factor = factor.min(1.0);
            }
            after_rejection = false;
            h *= factor;
        } else {
            rejected += 1;
            after_rejection = true;
            h *= if err.is_finite() {
                step_factor(err, exponent)
            } else {
                MIN_FACTOR
            };
        }
    }

    debug!(
        topology = %model.topology(),
        attempts,
        rejected,
        samples = n,
        "time-domain integration finished"
    );

    Ok(states)
}

/// Step size to try from `t`, and whether it lands on `t_end`.
///
/// A step that would leave less than `h_min` (or a sliver of itself) before
/// `t_end` is stretched to finish there, so `t + h` rounding a few ulps
/// short never leaves an unresolvable final step.
fn clip_to_end(t: f64, h: f64, t_end: f64, h_min: f64) -> (f64, bool) {
    let remaining = t_end - t;
    if remaining - h <= h_min.max(END_SLIVER * h) {
        (remaining, true)
    } else {
        (h, false)
    }
}

/// Weighted RMS norm of the local error estimate.
fn error_norm(err: &State, y: &State, y_new: &State, config: &IntegratorConfig) -> f64 {
    let sum: f64 = (0..STATE_DIM)
        .map(|k| {
            let scale = config.atol + config.rtol * y[k].abs().max(y_new[k].abs());
            let e = err[k] / scale;
            e * e
        })
        .sum();
    (sum / STATE_DIM as f64).sqrt()
}

/// Step-size ratio for the next attempt.
fn step_factor(err: f64, exponent: f64) -> f64 {
    if err == 0.0 {
        MAX_FACTOR
    } else {
        (SAFETY * err.powf(-exponent)).clamp(MIN_FACTOR, MAX_FACTOR)
    }
}

/// First trial step from the scaled sizes of y and f(y).
fn initial_step(y: &State, f: &State, span: f64, config: &IntegratorConfig) -> f64 {
    let rms = |v: &State| {
        let sum: f64 = (0..STATE_DIM)
            .map(|k| {
                let scaled = v[k] / (config.atol + config.rtol * y[k].abs());
                scaled * scaled
            })
            .sum();
        (sum / STATE_DIM as f64).sqrt()
    };

    let d0 = rms(y);
    let d1 = rms(f);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6 * span
    } else {
        0.01 * d0 / d1
    };
    h0.min(span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solver(method: Method) -> TimeDomainSolver {
        TimeDomainSolver::new(IntegratorConfig::new().with_method(method)).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(IntegratorConfig::new().validate().is_ok());
        assert!(IntegratorConfig::new().with_tolerances(0.0, 1e-9).validate().is_err());
        assert!(IntegratorConfig::new().with_tolerances(1e-6, -1.0).validate().is_err());
        assert!(IntegratorConfig::new().with_max_steps(0).validate().is_err());
        assert!(TimeDomainSolver::new(IntegratorConfig::new().with_tolerances(f64::NAN, 1e-9)).is_err());
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("rosenbrock".parse::<Method>().unwrap(), Method::Rosenbrock23);
        assert_eq!("dopri5".parse::<Method>().unwrap(), Method::DormandPrince45);
        assert!("euler".parse::<Method>().is_err());
    }

    #[test]
    fn test_matches_analytic_underdamped_series() {
        // v(t) = V0 e^{-at} (cos wd t + a/wd sin wd t)
        let params = CircuitParameters::new(1e-3, 1e-6, 10.0, 5.0).unwrap();
        let a = params.resistance() / (2.0 * params.inductance());
        let w0 = params.natural_frequency();
        let wd = (w0 * w0 - a * a).sqrt();
        let grid = TimeGrid::linspace(0.0, 2e-3, 401).unwrap();

        for method in [Method::Rosenbrock23, Method::DormandPrince45] {
            let traj = solver(method).solve(Topology::Series, &params, &grid).unwrap();
            assert_eq!(traj.len(), grid.len());
            for (t, v) in traj.time().iter().zip(traj.capacitor_voltage()) {
                let exact = 5.0 * (-a * t).exp() * ((wd * t).cos() + a / wd * (wd * t).sin());
                assert_relative_eq!(*v, exact, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_output_lands_on_grid_points() {
        let params = CircuitParameters::new(1e-3, 1e-6, 10.0, 5.0).unwrap();
        let grid = TimeGrid::new(vec![0.0, 1e-6, 3e-4, 3.1e-4, 1e-3]).unwrap();
        let traj = TimeDomainSolver::default()
            .solve(Topology::Parallel, &params, &grid)
            .unwrap();
        assert_eq!(traj.time(), grid.points());
        assert_eq!(traj.capacitor_voltage()[0], 5.0);
        assert_eq!(traj.inductor_current()[0], 0.0);
        assert!(traj.capacitor_voltage().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_grid_may_start_away_from_zero() {
        let params = CircuitParameters::new(1e-3, 1e-6, 10.0, 5.0).unwrap();
        let shifted = TimeGrid::linspace(1.0, 1.0 + 1e-3, 101).unwrap();
        let origin = TimeGrid::linspace(0.0, 1e-3, 101).unwrap();
        let a = TimeDomainSolver::default().solve(Topology::Series, &params, &shifted).unwrap();
        let b = TimeDomainSolver::default().solve(Topology::Series, &params, &origin).unwrap();
        for (x, y) in a.capacitor_voltage().iter().zip(b.capacitor_voltage()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_step_budget_reports_failure() {
        let params = CircuitParameters::reference();
        let config = IntegratorConfig::new().with_max_steps(20);
        let err = TimeDomainSolver::new(config)
            .unwrap()
            .solve(Topology::Series, &params, &TimeGrid::reference())
            .unwrap_err();
        match err {
            RlcError::IntegrationFailure {
                attempts, reason, ..
            } => {
                assert_eq!(attempts, 20);
                assert_eq!(reason, FailureReason::StepBudgetExhausted { max_steps: 20 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explicit_method_gives_up_on_stiff_tank() {
        // 1/RC ≈ 5.6e9 s⁻¹: explicit stability needs millions of steps
        let params = CircuitParameters::reference().with_resistance(1e-6).unwrap();
        let config = IntegratorConfig::new()
            .with_method(Method::DormandPrince45)
            .with_max_steps(10_000);
        let result = TimeDomainSolver::new(config)
            .unwrap()
            .solve(Topology::Parallel, &params, &TimeGrid::reference());
        assert!(matches!(result, Err(RlcError::IntegrationFailure { .. })));

        // the stiff method handles the same circuit
        let traj = TimeDomainSolver::default()
            .solve(Topology::Parallel, &params, &TimeGrid::reference())
            .unwrap();
        assert!(traj.capacitor_voltage().iter().all(|v| v.is_finite()));
        assert!(traj.capacitor_voltage()[traj.len() - 1].abs() < 1e-3);
    }

    #[test]
    fn test_step_stretches_to_reach_end() {
        let t = 1.0;
        let t_end = 1.0 + 1e-3;
        let h_min = 16.0 * f64::EPSILON * t;
        let remaining = t_end - t;

        // a few ulps short of the end: finish there instead
        let (h, last) = clip_to_end(t, remaining - 4.0 * f64::EPSILON, t_end, h_min);
        assert!(last);
        assert_eq!(h, remaining);
        assert_eq!(t + h, t_end);

        let (h, last) = clip_to_end(t, 0.5 * remaining, t_end, h_min);
        assert!(!last);
        assert_eq!(h, 0.5 * remaining);

        let (h, last) = clip_to_end(t, 2.0 * remaining, t_end, h_min);
        assert!(last);
        assert_eq!(h, remaining);
    }

    #[test]
    fn test_long_shifted_run_finishes_without_underflow() {
        // large |t| makes every step end on a coarse float lattice
        let params = CircuitParameters::new(1e-3, 1e-6, 10.0, 5.0).unwrap();
        let grid = TimeGrid::linspace(1.0e3, 1.0e3 + 2e-3, 7).unwrap();
        for method in [Method::Rosenbrock23, Method::DormandPrince45] {
            let traj = solver(method).solve(Topology::Series, &params, &grid).unwrap();
            assert_eq!(traj.len(), 7);
            assert!(traj.capacitor_voltage().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_zero_initial_voltage_stays_at_rest() {
        let params = CircuitParameters::new(1e-3, 1e-6, 1.0, 0.0).unwrap();
        let traj = TimeDomainSolver::default()
            .solve(Topology::Series, &params, &TimeGrid::reference())
            .unwrap();
        assert!(traj.capacitor_voltage().iter().all(|v| *v == 0.0));
        assert!(traj.inductor_current().iter().all(|i| *i == 0.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn damped_energy_never_grows(
            l_uh in 1.0_f64..100.0,
            c_uf in 1.0_f64..1000.0,
            r in 0.01_f64..10.0,
            v0 in 1.0_f64..1000.0,
        ) {
            let params = CircuitParameters::from_micro_units(l_uh, c_uf, r, v0).unwrap();
            let period = 2.0 * std::f64::consts::PI / params.natural_frequency();
            let grid = TimeGrid::linspace(0.0, 3.0 * period, 301).unwrap();

            for topology in Topology::ALL {
                let traj = TimeDomainSolver::default().solve(topology, &params, &grid).unwrap();
                let energy = traj.stored_energy(&params);
                for w in energy.windows(2) {
                    prop_assert!(w[1] <= w[0] + 1e-9 * energy[0]);
                }
            }
        }
    }
}
