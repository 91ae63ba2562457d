//! Circuit description: component values and topology.
//!
//! This module provides the validated [`CircuitParameters`] value that every
//! other part of the crate consumes, together with the [`Topology`] selector
//! and the [`ResistancePolicy`] that decides what a zero resistance means
//! for the parallel arrangement.

mod params;
mod topology;

pub use params::CircuitParameters;
pub use topology::{ResistancePolicy, Topology};
