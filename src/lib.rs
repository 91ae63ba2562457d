//! # RLC Response
//!
//! Time- and frequency-domain response of a second-order RLC circuit in its
//! series and parallel arrangements.
//!
//! This library provides:
//! - Validated circuit parameters with µH/µF conversion at the boundary
//! - State-space models of both topologies
//! - Adaptive, L-stable time integration (Rosenbrock 2(3)) with an explicit
//!   Dormand–Prince 5(4) alternative
//! - Transfer functions and Bode evaluation over a log-spaced sweep
//! - A single [`simulate`] call returning all six output arrays
//!
//! ## Architecture
//!
//! - [`circuit`] - Parameters, topologies and the zero-resistance policy
//! - [`grid`] - Time and frequency grids
//! - [`model`] - State equations y' = f(y) of each topology
//! - [`solver`] - Adaptive integrators and sampled trajectories
//! - [`frequency`] - Transfer functions and Bode responses
//! - [`simulation`] - Orchestration and run summary
//! - `export` - JSON and CSV output (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! rlcsim --inductance 11 --capacitance 180 --resistance 0.085 --voltage 900 --format csv --output out/
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use rlc_response::{simulate, CircuitParameters, SimulationConfig, SimulationGrids};
//!
//! let params = CircuitParameters::from_micro_units(11.0, 180.0, 0.085, 900.0)?;
//! let report = simulate(&params, &SimulationGrids::reference(), &SimulationConfig::default())?;
//! println!("{}", report.summary());
//! # Ok::<(), rlc_response::RlcError>(())
//! ```
//!
//! ## State Equations
//!
//! Series, state (i, v):
//!
//! ```text
//! di/dt = (v - R·i) / L
//! dv/dt = -i / C
//! ```
//!
//! Parallel, state (v, i), with G = 1/R:
//!
//! ```text
//! dv/dt = -(G·v + i) / C
//! di/dt = v / L
//! ```
//!
//! Both start from the capacitor charged to V0 with no inductor current.

pub mod circuit;
pub mod error;
pub mod frequency;
pub mod grid;
pub mod model;
pub mod simulation;
pub mod solver;

#[cfg(feature = "cli")]
pub mod export;

// Re-export main types for convenience
pub use circuit::{CircuitParameters, ResistancePolicy, Topology};
pub use error::{FailureReason, Result, RlcError};
pub use frequency::{bode, FrequencyResponse, TransferFunction};
pub use grid::{FrequencyGrid, TimeGrid};
pub use simulation::{simulate, SimulationConfig, SimulationGrids, SimulationReport, Summary};
pub use solver::{IntegratorConfig, Method, StateTrajectory, TimeDomainSolver};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmRlcSim;

/// One micro-unit (µH, µF) in SI.
pub const MICRO: f64 = 1e-6;

/// Length of the reference time grid in seconds.
pub const REFERENCE_TIME_SPAN: f64 = 1e-3;

/// Number of points of the reference time grid.
pub const REFERENCE_TIME_POINTS: usize = 10_000;

/// First frequency of the reference sweep in Hz.
pub const REFERENCE_FREQUENCY_START: f64 = 1.0;

/// Last frequency of the reference sweep in Hz.
pub const REFERENCE_FREQUENCY_STOP: f64 = 1e6;

/// Number of log-spaced points of the reference sweep.
pub const REFERENCE_FREQUENCY_POINTS: usize = 1000;
