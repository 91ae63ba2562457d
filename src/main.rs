//! rlcsim - RLC circuit response calculator
//!
//! Solves the series and parallel ring-down of an RLC circuit and sweeps
//! both transfer functions.
//!
//! # Usage
//!
//! ```bash
//! rlcsim --inductance 11 --capacitance 180 --resistance 0.085 --voltage 900
//! rlcsim --format csv --output out/ -v
//! ```

use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rlc_response::{
    error::Result,
    export::{export_csv, export_json, write_json},
    simulate, CircuitParameters, FrequencyGrid, IntegratorConfig, Method, ResistancePolicy,
    SimulationConfig, SimulationGrids, TimeGrid, REFERENCE_FREQUENCY_POINTS,
    REFERENCE_FREQUENCY_START, REFERENCE_FREQUENCY_STOP, REFERENCE_TIME_POINTS,
    REFERENCE_TIME_SPAN,
};
use tracing::{info, Level};

/// RLC circuit time- and frequency-domain response
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Inductance in µH
    #[arg(short = 'L', long, default_value_t = 11.0)]
    inductance: f64,

    /// Capacitance in µF
    #[arg(short = 'C', long, default_value_t = 180.0)]
    capacitance: f64,

    /// Resistance in Ω
    #[arg(short = 'R', long, default_value_t = 0.085)]
    resistance: f64,

    /// Initial capacitor voltage in V
    #[arg(long, default_value_t = 900.0)]
    voltage: f64,

    /// Simulated time span in seconds
    #[arg(long, default_value_t = REFERENCE_TIME_SPAN)]
    time_span: f64,

    /// Number of time samples
    #[arg(long, default_value_t = REFERENCE_TIME_POINTS)]
    time_points: usize,

    /// First sweep frequency in Hz
    #[arg(long, default_value_t = REFERENCE_FREQUENCY_START)]
    freq_start: f64,

    /// Last sweep frequency in Hz
    #[arg(long, default_value_t = REFERENCE_FREQUENCY_STOP)]
    freq_stop: f64,

    /// Number of log-spaced sweep frequencies
    #[arg(long, default_value_t = REFERENCE_FREQUENCY_POINTS)]
    freq_points: usize,

    /// Time integration method
    #[arg(short, long, value_enum, default_value_t = MethodArg::Rosenbrock)]
    method: MethodArg,

    /// Relative tolerance
    #[arg(long, default_value_t = rlc_response::solver::DEFAULT_RTOL)]
    rtol: f64,

    /// Absolute tolerance
    #[arg(long, default_value_t = rlc_response::solver::DEFAULT_ATOL)]
    atol: f64,

    /// Step attempt budget per topology
    #[arg(long, default_value_t = rlc_response::solver::DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// How R = 0 is handled by the parallel topology
    #[arg(long, value_enum, default_value_t = ZeroResistance::Undamped)]
    zero_resistance: ZeroResistance,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Summary)]
    format: Format,

    /// Output directory for csv and json files (json goes to stdout if omitted)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Rosenbrock,
    DormandPrince,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Rosenbrock => Method::Rosenbrock23,
            MethodArg::DormandPrince => Method::DormandPrince45,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ZeroResistance {
    Undamped,
    Reject,
}

impl From<ZeroResistance> for ResistancePolicy {
    fn from(arg: ZeroResistance) -> Self {
        match arg {
            ZeroResistance::Undamped => ResistancePolicy::UndampedLimit,
            ZeroResistance::Reject => ResistancePolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Summary,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let params = CircuitParameters::from_micro_units(
        args.inductance,
        args.capacitance,
        args.resistance,
        args.voltage,
    )?;

    let grids = SimulationGrids::new(
        TimeGrid::linspace(0.0, args.time_span, args.time_points)?,
        FrequencyGrid::logspace(args.freq_start, args.freq_stop, args.freq_points)?,
    );

    let config = SimulationConfig::new()
        .with_integrator(
            IntegratorConfig::new()
                .with_method(args.method.into())
                .with_tolerances(args.rtol, args.atol)
                .with_max_steps(args.max_steps),
        )
        .with_resistance_policy(args.zero_resistance.into());

    let report = simulate(&params, &grids, &config)?;

    match (args.format, &args.output) {
        (Format::Summary, _) => print!("{}", report.summary()),
        (Format::Json, None) => {
            write_json(&report, io::stdout().lock())?;
            println!();
        }
        (Format::Json, Some(dir)) => {
            let path = export_json(&report, dir)?;
            info!(path = %path.display(), "wrote report");
        }
        (Format::Csv, dir) => {
            let dir = dir.clone().unwrap_or_else(|| PathBuf::from("."));
            for path in export_csv(&report, &dir)? {
                info!(path = %path.display(), "wrote table");
            }
        }
    }

    Ok(())
}
