//! Series and parallel RLC state equations.

use crate::circuit::{CircuitParameters, Topology};

use super::{Jacobian, State, StateModel};

/// Source-free series RLC loop.
///
/// KVL around the loop gives L·di/dt + R·i = v, and the capacitor discharges
/// into the loop, so i = -C·dv/dt.
///
/// State: `[inductor current, capacitor voltage]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesRlc;

impl StateModel for SeriesRlc {
    fn topology(&self) -> Topology {
        Topology::Series
    }

    fn derivative(&self, state: &State, _t: f64, params: &CircuitParameters) -> State {
        let [i, v] = *state;
        [
            (v - params.resistance() * i) / params.inductance(),
            -i / params.capacitance(),
        ]
    }

    fn jacobian(&self, _state: &State, _t: f64, params: &CircuitParameters) -> Jacobian {
        let l = params.inductance();
        [
            [-params.resistance() / l, 1.0 / l],
            [-1.0 / params.capacitance(), 0.0],
        ]
    }
}

/// Source-free parallel RLC tank.
///
/// KCL at the single node: the capacitor current is minus the sum of the
/// resistor and inductor currents; the inductor sees the node voltage.
/// R = 0 is read as an open resistive branch, see
/// [`CircuitParameters::shunt_conductance`].
///
/// State: `[capacitor voltage, inductor current]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelRlc;

impl StateModel for ParallelRlc {
    fn topology(&self) -> Topology {
        Topology::Parallel
    }

    fn derivative(&self, state: &State, _t: f64, params: &CircuitParameters) -> State {
        let [v, i] = *state;
        [
            -(v * params.shunt_conductance() + i) / params.capacitance(),
            v / params.inductance(),
        ]
    }

    fn jacobian(&self, _state: &State, _t: f64, params: &CircuitParameters) -> Jacobian {
        let c = params.capacitance();
        [
            [-params.shunt_conductance() / c, -1.0 / c],
            [1.0 / params.inductance(), 0.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct FiniteDifference<M>(M);

    impl<M: StateModel> StateModel for FiniteDifference<M> {
        fn topology(&self) -> Topology {
            self.0.topology()
        }

        fn derivative(&self, state: &State, t: f64, params: &CircuitParameters) -> State {
            self.0.derivative(state, t, params)
        }
    }

    fn params() -> CircuitParameters {
        CircuitParameters::new(2e-3, 5e-6, 4.0, 10.0).unwrap()
    }

    #[test]
    fn test_series_derivative() {
        let p = params();
        let d = SeriesRlc.derivative(&[0.5, 10.0], 0.0, &p);
        // (10 - 4*0.5) / 2e-3
        assert_relative_eq!(d[0], 4000.0, max_relative = 1e-12);
        // -0.5 / 5e-6
        assert_relative_eq!(d[1], -100000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_parallel_derivative() {
        let p = params();
        let d = ParallelRlc.derivative(&[10.0, 0.5], 0.0, &p);
        // -(10/4 + 0.5) / 5e-6
        assert_relative_eq!(d[0], -600000.0, max_relative = 1e-12);
        // 10 / 2e-3
        assert_relative_eq!(d[1], 5000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_parallel_zero_resistance_is_undamped() {
        let p = params().with_resistance(0.0).unwrap();
        let d = ParallelRlc.derivative(&[10.0, 0.5], 0.0, &p);
        assert!(d.iter().all(|v| v.is_finite()));
        assert_relative_eq!(d[0], -100000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_initial_states() {
        let p = params();
        assert_eq!(SeriesRlc.initial_state(&p), [0.0, 10.0]);
        assert_eq!(ParallelRlc.initial_state(&p), [10.0, 0.0]);
    }

    #[test]
    fn test_analytic_jacobians_match_finite_differences() {
        let p = params();
        let state = [3.0, -7.0];
        for model in [Topology::Series.model(), Topology::Parallel.model()] {
            let exact = model.jacobian(&state, 0.0, &p);
            let numeric = match model.topology() {
                Topology::Series => FiniteDifference(SeriesRlc).jacobian(&state, 0.0, &p),
                Topology::Parallel => FiniteDifference(ParallelRlc).jacobian(&state, 0.0, &p),
            };
            for row in 0..2 {
                for col in 0..2 {
                    assert_relative_eq!(
                        exact[row][col],
                        numeric[row][col],
                        epsilon = 1e-3,
                        max_relative = 1e-5
                    );
                }
            }
        }
    }

    #[test]
    fn test_energy_rate_is_dissipation() {
        // dE/dt = L i i' + C v v' = -R i² (series), -v²/R (parallel)
        let p = params();
        let (i, v) = (0.3, 7.0);

        let d = SeriesRlc.derivative(&[i, v], 0.0, &p);
        let rate = p.inductance() * i * d[0] + p.capacitance() * v * d[1];
        assert_relative_eq!(rate, -p.resistance() * i * i, max_relative = 1e-9);

        let d = ParallelRlc.derivative(&[v, i], 0.0, &p);
        let rate = p.capacitance() * v * d[0] + p.inductance() * i * d[1];
        assert_relative_eq!(rate, -v * v / p.resistance(), max_relative = 1e-9);
    }
}
