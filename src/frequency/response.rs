//! Bode evaluation of a transfer function over a frequency sweep.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::Serialize;
use tracing::debug;

use crate::grid::FrequencyGrid;

use super::TransferFunction;

/// Magnitudes below this are clamped before taking the logarithm.
const MAGNITUDE_FLOOR: f64 = 1e-300;

/// Half-power drop in dB (10·log10(2)).
const HALF_POWER_DB: f64 = 3.010_299_956_639_812;

/// Magnitude and unwrapped phase sampled on a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyResponse {
    /// Angular frequency in rad/s
    pub angular_frequency: Vec<f64>,
    /// Magnitude in dB
    pub magnitude_db: Vec<f64>,
    /// Unwrapped phase in degrees
    pub phase_deg: Vec<f64>,
}

/// Largest magnitude sample of a response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponsePeak {
    pub angular_frequency: f64,
    pub frequency_hz: f64,
    pub magnitude_db: f64,
}

/// Frequencies where the magnitude falls 3 dB below the peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HalfPowerBand {
    pub lower_hz: f64,
    pub upper_hz: f64,
}

impl HalfPowerBand {
    pub fn width_hz(&self) -> f64 {
        self.upper_hz - self.lower_hz
    }
}

/// Evaluate `tf` at s = jω for every frequency of `grid`.
///
/// The magnitude is computed as 20·log10|N| − 20·log10|D| with each factor
/// floored at 1e-300, so numerator zeros (the parallel response at DC) give
/// a large negative finite value instead of −∞. The phase is arg N − arg D,
/// unwrapped along the sweep so consecutive samples never differ by more
/// than π.
pub fn bode(tf: &TransferFunction, grid: &FrequencyGrid) -> FrequencyResponse {
    let angular_frequency = grid.angular_frequencies();
    let mut magnitude_db = Vec::with_capacity(angular_frequency.len());
    let mut raw_phase = Vec::with_capacity(angular_frequency.len());

    for &w in &angular_frequency {
        let s = Complex64::new(0.0, w);
        let n = tf.eval_numerator(s);
        let d = tf.eval_denominator(s);
        magnitude_db.push(decibels(n.norm()) - decibels(d.norm()));
        raw_phase.push(n.arg() - d.arg());
    }

    let phase_deg = unwrap_phase(&raw_phase)
        .into_iter()
        .map(f64::to_degrees)
        .collect();

    debug!(
        points = angular_frequency.len(),
        order = tf.denominator().len() - 1,
        "evaluated frequency response"
    );

    FrequencyResponse {
        angular_frequency,
        magnitude_db,
        phase_deg,
    }
}

fn decibels(magnitude: f64) -> f64 {
    20.0 * magnitude.max(MAGNITUDE_FLOOR).log10()
}

/// Remove 2π jumps between consecutive phase samples (radians).
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let mut offset = 0.0;
    let mut previous: Option<f64> = None;
    for &p in phase {
        if let Some(prev) = previous {
            let delta = p - prev;
            if delta.abs() > PI {
                offset -= (delta / (2.0 * PI)).round() * 2.0 * PI;
            }
        }
        previous = Some(p);
        out.push(p + offset);
    }
    out
}

impl FrequencyResponse {
    pub fn len(&self) -> usize {
        self.angular_frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angular_frequency.is_empty()
    }

    /// Sweep frequencies in Hz.
    pub fn frequency_hz(&self) -> Vec<f64> {
        self.angular_frequency
            .iter()
            .map(|w| w / (2.0 * PI))
            .collect()
    }

    /// Sample with the largest magnitude. Ties resolve to the lowest frequency.
    pub fn peak(&self) -> Option<ResponsePeak> {
        let k = self.peak_index()?;
        Some(ResponsePeak {
            angular_frequency: self.angular_frequency[k],
            frequency_hz: self.angular_frequency[k] / (2.0 * PI),
            magnitude_db: self.magnitude_db[k],
        })
    }

    fn peak_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (k, m) in self.magnitude_db.iter().enumerate() {
            match best {
                Some(b) if *m <= self.magnitude_db[b] => {}
                _ => best = Some(k),
            }
        }
        best
    }

    /// −3 dB band around the peak, with edges interpolated linearly in
    /// log-frequency. `None` when either edge lies outside the sweep.
    pub fn bandwidth_3db(&self) -> Option<HalfPowerBand> {
        let k = self.peak_index()?;
        let threshold = self.magnitude_db[k] - HALF_POWER_DB;
        let f = self.frequency_hz();
        let m = &self.magnitude_db;

        let lower = (1..=k)
            .rev()
            .find(|&j| m[j - 1] < threshold)
            .map(|j| crossing(f[j - 1], f[j], m[j - 1], m[j], threshold))?;
        let upper = (k..m.len().saturating_sub(1))
            .find(|&j| m[j + 1] < threshold)
            .map(|j| crossing(f[j], f[j + 1], m[j], m[j + 1], threshold))?;

        Some(HalfPowerBand {
            lower_hz: lower,
            upper_hz: upper,
        })
    }
}

fn crossing(f_a: f64, f_b: f64, m_a: f64, m_b: f64, threshold: f64) -> f64 {
    let t = (threshold - m_a) / (m_b - m_a);
    let (la, lb) = (f_a.log10(), f_b.log10());
    10f64.powf(la + t * (lb - la))
}
