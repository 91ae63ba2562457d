//! Circuit arrangement and zero-resistance handling.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, RlcError};

use super::CircuitParameters;

/// The two canonical arrangements of R, L and C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// R, L and C in one loop; state is (inductor current, capacitor voltage).
    Series,
    /// R, L and C across one node pair; state is (capacitor voltage, inductor current).
    Parallel,
}

impl Topology {
    /// Both topologies, series first.
    pub const ALL: [Topology; 2] = [Topology::Series, Topology::Parallel];

    /// Position of the inductor current in this topology's state vector.
    pub fn current_index(&self) -> usize {
        match self {
            Topology::Series => 0,
            Topology::Parallel => 1,
        }
    }

    /// Position of the capacitor voltage in this topology's state vector.
    pub fn voltage_index(&self) -> usize {
        match self {
            Topology::Series => 1,
            Topology::Parallel => 0,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Series => write!(f, "series"),
            Topology::Parallel => write!(f, "parallel"),
        }
    }
}

impl FromStr for Topology {
    type Err = RlcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "series" => Ok(Topology::Series),
            "parallel" => Ok(Topology::Parallel),
            _ => Err(RlcError::invalid_config(format!("unknown topology '{}'", s))),
        }
    }
}

/// What R = 0 means for the parallel topology.
///
/// In the parallel arrangement the resistor contributes a 1/R term, which is
/// undefined at R = 0. The series arrangement has no such term and is never
/// affected by this policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResistancePolicy {
    /// Treat R = 0 as the R -> ∞ limit: no resistive branch, an undamped tank.
    #[default]
    UndampedLimit,
    /// Refuse R = 0 with [`RlcError::DegenerateResistance`].
    Reject,
}

impl ResistancePolicy {
    /// Check whether `params` may be used for `topology` under this policy.
    pub fn check(&self, params: &CircuitParameters, topology: Topology) -> Result<()> {
        match (self, topology) {
            (ResistancePolicy::Reject, Topology::Parallel) if params.resistance() == 0.0 => {
                Err(RlcError::DegenerateResistance { topology })
            }
            _ => Ok(()),
        }
    }
}
