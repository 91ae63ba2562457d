//! End-to-end run of both topologies in both domains.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::circuit::{CircuitParameters, ResistancePolicy, Topology};
use crate::error::Result;
use crate::frequency::{bode, FrequencyResponse, HalfPowerBand, ResponsePeak, TransferFunction};
use crate::grid::{FrequencyGrid, TimeGrid};
use crate::solver::{IntegratorConfig, StateTrajectory, TimeDomainSolver};

/// Time and frequency grids of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationGrids {
    pub time: TimeGrid,
    pub frequency: FrequencyGrid,
}

impl SimulationGrids {
    pub fn new(time: TimeGrid, frequency: FrequencyGrid) -> Self {
        Self { time, frequency }
    }

    /// 0 to 1 ms with 10 000 points, and 1 Hz to 1 MHz with 1000
    /// log-spaced points.
    pub fn reference() -> Self {
        Self {
            time: TimeGrid::reference(),
            frequency: FrequencyGrid::reference(),
        }
    }
}

impl Default for SimulationGrids {
    fn default() -> Self {
        Self::reference()
    }
}

/// Configuration for [`simulate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub integrator: IntegratorConfig,
    pub resistance_policy: ResistancePolicy,
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_integrator(mut self, integrator: IntegratorConfig) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn with_resistance_policy(mut self, policy: ResistancePolicy) -> Self {
        self.resistance_policy = policy;
        self
    }
}

/// Time and frequency results of one topology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyResult {
    pub topology: Topology,
    pub transfer_function: TransferFunction,
    pub trajectory: StateTrajectory,
    pub frequency_response: FrequencyResponse,
}

impl TopologyResult {
    pub fn inductor_current(&self) -> &[f64] {
        self.trajectory.inductor_current()
    }

    pub fn capacitor_voltage(&self) -> &[f64] {
        self.trajectory.capacitor_voltage()
    }
}

/// Everything produced by one [`simulate`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub parameters: CircuitParameters,
    pub series: TopologyResult,
    pub parallel: TopologyResult,
}

impl SimulationReport {
    pub fn result(&self, topology: Topology) -> &TopologyResult {
        match topology {
            Topology::Series => &self.series,
            Topology::Parallel => &self.parallel,
        }
    }

    /// Sample times shared by both trajectories.
    pub fn time(&self) -> &[f64] {
        self.series.trajectory.time()
    }

    pub fn series_current(&self) -> &[f64] {
        self.series.inductor_current()
    }

    pub fn parallel_current(&self) -> &[f64] {
        self.parallel.inductor_current()
    }

    pub fn series_voltage(&self) -> &[f64] {
        self.series.capacitor_voltage()
    }

    pub fn parallel_voltage(&self) -> &[f64] {
        self.parallel.capacitor_voltage()
    }

    pub fn series_bode(&self) -> &FrequencyResponse {
        &self.series.frequency_response
    }

    pub fn parallel_bode(&self) -> &FrequencyResponse {
        &self.parallel.frequency_response
    }

    /// Headline figures of the run.
    pub fn summary(&self) -> Summary {
        let p = &self.parameters;
        let (peak_current, peak_current_time) = self.series.trajectory.peak_current();
        Summary {
            natural_frequency: p.natural_frequency(),
            natural_frequency_hz: p.natural_frequency_hz(),
            characteristic_impedance: p.characteristic_impedance(),
            series_quality_factor: p.series_quality_factor(),
            parallel_quality_factor: p.parallel_quality_factor(),
            series_peak_current: peak_current,
            series_peak_current_time: peak_current_time,
            series_resonance: self.series.frequency_response.peak(),
            series_bandwidth: self.series.frequency_response.bandwidth_3db(),
            parallel_resonance: self.parallel.frequency_response.peak(),
            parallel_bandwidth: self.parallel.frequency_response.bandwidth_3db(),
        }
    }
}

/// Headline figures of a [`SimulationReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// ω₀ in rad/s
    pub natural_frequency: f64,
    pub natural_frequency_hz: f64,
    /// √(L/C) in Ω
    pub characteristic_impedance: f64,
    pub series_quality_factor: f64,
    pub parallel_quality_factor: f64,
    /// Largest |i| of the series ring-down in A
    pub series_peak_current: f64,
    pub series_peak_current_time: f64,
    pub series_resonance: Option<ResponsePeak>,
    pub series_bandwidth: Option<HalfPowerBand>,
    pub parallel_resonance: Option<ResponsePeak>,
    pub parallel_bandwidth: Option<HalfPowerBand>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "natural frequency     {:.2} rad/s ({:.2} Hz)",
            self.natural_frequency, self.natural_frequency_hz
        )?;
        writeln!(f, "characteristic Z      {:.4} ohm", self.characteristic_impedance)?;
        writeln!(
            f,
            "quality factor        series {:.4}, parallel {:.4}",
            self.series_quality_factor, self.parallel_quality_factor
        )?;
        writeln!(
            f,
            "series peak current   {:.3} A at {:.3} us",
            self.series_peak_current,
            self.series_peak_current_time * 1e6
        )?;
        write_resonance(f, "series", self.series_resonance, self.series_bandwidth)?;
        write_resonance(f, "parallel", self.parallel_resonance, self.parallel_bandwidth)
    }
}

fn write_resonance(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    peak: Option<ResponsePeak>,
    band: Option<HalfPowerBand>,
) -> fmt::Result {
    match peak {
        Some(peak) => write!(
            f,
            "{:<8} resonance    {:.2} Hz, {:.2} dB",
            label, peak.frequency_hz, peak.magnitude_db
        )?,
        None => write!(f, "{:<8} resonance    n/a", label)?,
    }
    match band {
        Some(band) => writeln!(
            f,
            ", -3 dB band {:.2}..{:.2} Hz ({:.2} Hz)",
            band.lower_hz,
            band.upper_hz,
            band.width_hz()
        ),
        None => writeln!(f, ", -3 dB band outside sweep"),
    }
}

/// Solve both topologies in the time domain and sweep both transfer
/// functions.
///
/// The resistance policy and integrator settings are validated before any
/// numeric work. A failure in either topology fails the whole call.
pub fn simulate(
    params: &CircuitParameters,
    grids: &SimulationGrids,
    config: &SimulationConfig,
) -> Result<SimulationReport> {
    config.resistance_policy.check(params, Topology::Parallel)?;
    let solver = TimeDomainSolver::new(config.integrator.clone())?;

    info!(
        inductance = params.inductance(),
        capacitance = params.capacitance(),
        resistance = params.resistance(),
        initial_voltage = params.initial_voltage(),
        time_points = grids.time.len(),
        frequency_points = grids.frequency.len(),
        method = %config.integrator.method,
        "starting simulation"
    );

    let series = run_topology(Topology::Series, params, grids, config, &solver)?;
    let parallel = run_topology(Topology::Parallel, params, grids, config, &solver)?;

    info!("simulation finished");

    Ok(SimulationReport {
        parameters: *params,
        series,
        parallel,
    })
}

fn run_topology(
    topology: Topology,
    params: &CircuitParameters,
    grids: &SimulationGrids,
    config: &SimulationConfig,
    solver: &TimeDomainSolver,
) -> Result<TopologyResult> {
    let transfer_function =
        TransferFunction::for_topology(topology, params, config.resistance_policy)?;
    let trajectory = solver.solve(topology, params, &grids.time)?;
    let frequency_response = bode(&transfer_function, &grids.frequency);
    Ok(TopologyResult {
        topology,
        transfer_function,
        trajectory,
        frequency_response,
    })
}
