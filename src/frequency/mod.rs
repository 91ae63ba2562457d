//! Frequency-domain model of both topologies.
//!
//! Each topology is described by a rational transfer function H(s) built
//! from the same L, C and R as the time-domain model, then evaluated along
//! s = jω to give a Bode response (magnitude in dB, unwrapped phase in
//! degrees).

mod response;
mod transfer;

pub use response::{bode, unwrap_phase, FrequencyResponse, HalfPowerBand, ResponsePeak};
pub use transfer::TransferFunction;
