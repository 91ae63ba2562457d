//! Sampled time-domain solution.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::circuit::{CircuitParameters, Topology};
use crate::model::{State, STATE_DIM};

/// State of one topology sampled on a time grid.
///
/// Columns are stored in the topology's own state order (series:
/// current then voltage; parallel: voltage then current). Use
/// [`inductor_current`](Self::inductor_current) and
/// [`capacitor_voltage`](Self::capacitor_voltage) instead of indexing them.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTrajectory {
    topology: Topology,
    time: Vec<f64>,
    columns: [Vec<f64>; STATE_DIM],
}

impl StateTrajectory {
    /// Build a trajectory from per-sample states.
    pub(crate) fn from_states(topology: Topology, time: Vec<f64>, states: &[State]) -> Self {
        debug_assert_eq!(time.len(), states.len());
        let columns = [
            states.iter().map(|s| s[0]).collect(),
            states.iter().map(|s| s[1]).collect(),
        ];
        Self {
            topology,
            time,
            columns,
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Sample times in seconds.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Raw state column `index` in the topology's state order.
    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    /// Inductor current in amperes.
    pub fn inductor_current(&self) -> &[f64] {
        &self.columns[self.topology.current_index()]
    }

    /// Capacitor voltage in volts.
    pub fn capacitor_voltage(&self) -> &[f64] {
        &self.columns[self.topology.voltage_index()]
    }

    /// State vector at sample `k`.
    pub fn state(&self, k: usize) -> State {
        [self.columns[0][k], self.columns[1][k]]
    }

    /// Stored energy ½Li² + ½Cv² at every sample.
    pub fn stored_energy(&self, params: &CircuitParameters) -> Vec<f64> {
        self.inductor_current()
            .iter()
            .zip(self.capacitor_voltage())
            .map(|(i, v)| params.stored_energy(*i, *v))
            .collect()
    }

    /// Largest |inductor current| and the time it occurs.
    pub fn peak_current(&self) -> (f64, f64) {
        let current = self.inductor_current();
        let (k, value) = current
            .iter()
            .enumerate()
            .fold((0, 0.0f64), |(best_k, best), (k, i)| {
                if i.abs() > best {
                    (k, i.abs())
                } else {
                    (best_k, best)
                }
            });
        (value, self.time[k])
    }
}

impl Serialize for StateTrajectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("StateTrajectory", 4)?;
        s.serialize_field("topology", &self.topology)?;
        s.serialize_field("time", &self.time)?;
        s.serialize_field("inductor_current", self.inductor_current())?;
        s.serialize_field("capacitor_voltage", self.capacitor_voltage())?;
        s.end()
    }
}
