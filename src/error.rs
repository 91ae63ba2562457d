//! Error types for the RLC response engine.
//!
//! This module provides a unified error type [`RlcError`] that covers
//! parameter validation, grid construction, time-domain integration and
//! transfer-function construction.

use std::fmt;

use thiserror::Error;

use crate::circuit::Topology;

/// Result type alias using [`RlcError`].
pub type Result<T> = std::result::Result<T, RlcError>;

/// Unified error type for all RLC response operations.
#[derive(Error, Debug)]
pub enum RlcError {
    // ============ Validation Errors ============
    /// A circuit parameter is non-physical or non-finite
    #[error("Invalid parameter '{param}' = {value}: {message}")]
    InvalidParameter {
        param: &'static str,
        value: f64,
        message: String,
    },

    /// R = 0 on a parallel path while the resistance policy rejects it
    #[error("Zero resistance is degenerate for the {topology} topology (1/R is undefined)")]
    DegenerateResistance { topology: Topology },

    /// Time or frequency grid violates its ordering/size invariants
    #[error("Invalid grid: {message}")]
    InvalidGrid { message: String },

    /// Transfer function coefficients violate their invariants
    #[error("Invalid transfer function: {message}")]
    InvalidTransferFunction { message: String },

    /// Invalid integrator or simulation setting
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Simulation Errors ============
    /// The integrator could not meet its tolerance within its budget
    #[error("Integration failed at t = {time:.6e} s after {attempts} step attempts: {reason}")]
    IntegrationFailure {
        time: f64,
        attempts: usize,
        reason: FailureReason,
    },

    // ============ I/O Errors ============
    /// Error writing an export file
    #[cfg(feature = "cli")]
    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error serializing a report
    #[cfg(feature = "cli")]
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why the time-domain integrator gave up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureReason {
    /// More step attempts than the configured budget
    StepBudgetExhausted { max_steps: usize },
    /// The step size shrank below what floating point can resolve
    StepSizeUnderflow { step: f64 },
    /// The iteration matrix I - h*d*J could not be factored
    SingularIterationMatrix,
    /// The model returned a non-finite derivative at the initial state
    NonFiniteState,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::StepBudgetExhausted { max_steps } => {
                write!(f, "step budget of {} attempts exhausted", max_steps)
            }
            FailureReason::StepSizeUnderflow { step } => {
                write!(f, "step size underflow (h = {:.3e} s)", step)
            }
            FailureReason::SingularIterationMatrix => write!(f, "singular iteration matrix"),
            FailureReason::NonFiniteState => write!(f, "non-finite derivative at the initial state"),
        }
    }
}

impl RlcError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(param: &'static str, value: f64, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            value,
            message: message.into(),
        }
    }

    /// Create an invalid grid error
    pub fn invalid_grid(message: impl Into<String>) -> Self {
        Self::InvalidGrid {
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an integration failure error
    pub fn integration_failure(time: f64, attempts: usize, reason: FailureReason) -> Self {
        Self::IntegrationFailure {
            time,
            attempts,
            reason,
        }
    }
}
