//! Sample grids for the time and frequency sweeps.

use serde::Serialize;

use crate::error::{Result, RlcError};
use crate::{
    REFERENCE_FREQUENCY_POINTS, REFERENCE_FREQUENCY_START, REFERENCE_FREQUENCY_STOP,
    REFERENCE_TIME_POINTS, REFERENCE_TIME_SPAN,
};

/// Ordered time samples (seconds) at which trajectories are reported.
///
/// Always holds at least two finite, strictly increasing samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeGrid {
    points: Vec<f64>,
}

impl TimeGrid {
    /// Wrap an explicit list of samples.
    pub fn new(points: Vec<f64>) -> Result<Self> {
        if points.len() < 2 {
            return Err(RlcError::invalid_grid(format!(
                "time grid needs at least 2 points, got {}",
                points.len()
            )));
        }
        check_increasing("time", &points)?;
        Ok(Self { points })
    }

    /// `n` evenly spaced samples from `start` to `end`, both included.
    pub fn linspace(start: f64, end: f64, n: usize) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(RlcError::invalid_grid(format!(
                "time span [{}, {}] must be finite and increasing",
                start, end
            )));
        }
        Self::new(linspace(start, end, n))
    }

    /// The reference grid: 0 to 1 ms with 10 000 samples.
    pub fn reference() -> Self {
        Self {
            points: linspace(0.0, REFERENCE_TIME_SPAN, REFERENCE_TIME_POINTS),
        }
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.points[0]
    }

    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Length of the simulated interval.
    pub fn span(&self) -> f64 {
        self.end() - self.start()
    }
}

/// Ordered sweep frequencies in Hz.
///
/// Always holds at least one finite, positive, strictly increasing frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrequencyGrid {
    hz: Vec<f64>,
}

impl FrequencyGrid {
    /// Wrap an explicit list of frequencies in Hz.
    pub fn new(hz: Vec<f64>) -> Result<Self> {
        if hz.is_empty() {
            return Err(RlcError::invalid_grid("frequency grid is empty"));
        }
        if let Some(&f) = hz.iter().find(|f| **f <= 0.0) {
            return Err(RlcError::invalid_grid(format!(
                "frequencies must be positive, got {}",
                f
            )));
        }
        check_increasing("frequency", &hz)?;
        Ok(Self { hz })
    }

    /// `n` logarithmically spaced frequencies from `start_hz` to `stop_hz`.
    pub fn logspace(start_hz: f64, stop_hz: f64, n: usize) -> Result<Self> {
        if !start_hz.is_finite() || start_hz <= 0.0 || !stop_hz.is_finite() || stop_hz <= start_hz {
            return Err(RlcError::invalid_grid(format!(
                "frequency span [{}, {}] Hz must be positive and increasing",
                start_hz, stop_hz
            )));
        }
        Self::new(logspace(start_hz, stop_hz, n))
    }

    /// The reference sweep: 1 Hz to 1 MHz with 1000 log-spaced points.
    pub fn reference() -> Self {
        Self {
            hz: logspace(
                REFERENCE_FREQUENCY_START,
                REFERENCE_FREQUENCY_STOP,
                REFERENCE_FREQUENCY_POINTS,
            ),
        }
    }

    /// Frequencies in Hz.
    pub fn frequencies_hz(&self) -> &[f64] {
        &self.hz
    }

    /// Frequencies converted to angular frequency ω = 2πf (rad/s).
    pub fn angular_frequencies(&self) -> Vec<f64> {
        self.hz.iter().map(|f| angular_frequency(*f)).collect()
    }

    pub fn len(&self) -> usize {
        self.hz.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.hz.is_empty()
    }
}

/// ω = 2πf.
pub fn angular_frequency(hz: f64) -> f64 {
    std::f64::consts::TAU * hz
}

/// `n` evenly spaced samples in [start, stop]; the last sample is exactly `stop`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            let mut v: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            v[n - 1] = stop;
            v
        }
    }
}

/// `n` logarithmically spaced samples in [start, stop]. Requires start > 0.
pub fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let log_start = start.log10();
            let log_stop = stop.log10();
            let step = (log_stop - log_start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| 10f64.powf(log_start + step * i as f64))
                .collect()
        }
    }
}

fn check_increasing(kind: &str, values: &[f64]) -> Result<()> {
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(RlcError::invalid_grid(format!(
            "{} grid contains non-finite value {}",
            kind, v
        )));
    }
    if let Some(i) = values.windows(2).position(|w| w[1] <= w[0]) {
        return Err(RlcError::invalid_grid(format!(
            "{} grid is not strictly increasing at index {}",
            kind,
            i + 1
        )));
    }
    Ok(())
}
