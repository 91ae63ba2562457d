//! Validated circuit component values.

use serde::Serialize;

use crate::error::{Result, RlcError};
use crate::MICRO;

/// Component values of a second-order RLC circuit, in SI units.
///
/// Values can only be built through [`CircuitParameters::new`] (or one of the
/// convenience constructors), so every instance satisfies:
/// - inductance > 0 and capacitance > 0
/// - resistance >= 0 (zero is legal: an undamped series loop)
/// - all four values finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircuitParameters {
    inductance: f64,
    capacitance: f64,
    resistance: f64,
    initial_voltage: f64,
}

impl CircuitParameters {
    /// Create validated parameters from SI values (H, F, Ω, V).
    pub fn new(inductance: f64, capacitance: f64, resistance: f64, initial_voltage: f64) -> Result<Self> {
        if !inductance.is_finite() || inductance <= 0.0 {
            return Err(RlcError::invalid_parameter(
                "inductance",
                inductance,
                "must be finite and greater than zero",
            ));
        }
        if !capacitance.is_finite() || capacitance <= 0.0 {
            return Err(RlcError::invalid_parameter(
                "capacitance",
                capacitance,
                "must be finite and greater than zero",
            ));
        }
        if !resistance.is_finite() || resistance < 0.0 {
            return Err(RlcError::invalid_parameter(
                "resistance",
                resistance,
                "must be finite and non-negative",
            ));
        }
        if !initial_voltage.is_finite() {
            return Err(RlcError::invalid_parameter(
                "initial_voltage",
                initial_voltage,
                "must be finite",
            ));
        }

        Ok(Self {
            inductance,
            capacitance,
            resistance,
            initial_voltage,
        })
    }

    /// Create validated parameters from front-end units: µH, µF, Ω, V.
    pub fn from_micro_units(
        inductance_uh: f64,
        capacitance_uf: f64,
        resistance: f64,
        initial_voltage: f64,
    ) -> Result<Self> {
        Self::new(
            inductance_uh * MICRO,
            capacitance_uf * MICRO,
            resistance,
            initial_voltage,
        )
    }

    /// The default circuit of the entry form: 11 µH, 180 µF, 0.085 Ω, 900 V.
    pub fn reference() -> Self {
        Self {
            inductance: 11.0 * MICRO,
            capacitance: 180.0 * MICRO,
            resistance: 0.085,
            initial_voltage: 900.0,
        }
    }

    /// Same circuit with a different resistance.
    pub fn with_resistance(&self, resistance: f64) -> Result<Self> {
        Self::new(self.inductance, self.capacitance, resistance, self.initial_voltage)
    }

    /// Inductance in henries.
    pub fn inductance(&self) -> f64 {
        self.inductance
    }

    /// Capacitance in farads.
    pub fn capacitance(&self) -> f64 {
        self.capacitance
    }

    /// Resistance in ohms.
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Initial capacitor voltage in volts.
    pub fn initial_voltage(&self) -> f64 {
        self.initial_voltage
    }

    /// Conductance of the parallel resistor branch.
    ///
    /// R = 0 maps to the R -> ∞ limit (no resistive branch, conductance 0).
    /// Callers that must refuse that reading check a [`ResistancePolicy`]
    /// first.
    ///
    /// [`ResistancePolicy`]: super::ResistancePolicy
    pub fn shunt_conductance(&self) -> f64 {
        if self.resistance == 0.0 {
            0.0
        } else {
            1.0 / self.resistance
        }
    }

    /// Undamped natural frequency ω₀ = 1/√(LC) in rad/s.
    pub fn natural_frequency(&self) -> f64 {
        1.0 / (self.inductance * self.capacitance).sqrt()
    }

    /// Undamped natural frequency in Hz.
    pub fn natural_frequency_hz(&self) -> f64 {
        self.natural_frequency() / std::f64::consts::TAU
    }

    /// Characteristic impedance √(L/C) in ohms.
    pub fn characteristic_impedance(&self) -> f64 {
        (self.inductance / self.capacitance).sqrt()
    }

    /// Series quality factor Q = √(L/C) / R; infinite at R = 0.
    pub fn series_quality_factor(&self) -> f64 {
        self.characteristic_impedance() / self.resistance
    }

    /// Parallel quality factor Q = R / √(L/C); at R = 0 the undamped limit
    /// gives an infinite Q.
    pub fn parallel_quality_factor(&self) -> f64 {
        if self.resistance == 0.0 {
            f64::INFINITY
        } else {
            self.resistance / self.characteristic_impedance()
        }
    }

    /// Total stored energy ½Li² + ½Cv² in joules.
    pub fn stored_energy(&self, inductor_current: f64, capacitor_voltage: f64) -> f64 {
        0.5 * self.inductance * inductor_current * inductor_current
            + 0.5 * self.capacitance * capacitor_voltage * capacitor_voltage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_non_physical_values() {
        assert!(matches!(
            CircuitParameters::new(0.0, 1e-6, 1.0, 1.0),
            Err(RlcError::InvalidParameter { param: "inductance", .. })
        ));
        assert!(matches!(
            CircuitParameters::new(1e-6, -1e-6, 1.0, 1.0),
            Err(RlcError::InvalidParameter { param: "capacitance", .. })
        ));
        assert!(matches!(
            CircuitParameters::new(1e-6, 1e-6, -0.1, 1.0),
            Err(RlcError::InvalidParameter { param: "resistance", .. })
        ));
        assert!(matches!(
            CircuitParameters::new(1e-6, 1e-6, 1.0, f64::INFINITY),
            Err(RlcError::InvalidParameter { param: "initial_voltage", .. })
        ));
        assert!(CircuitParameters::new(f64::NAN, 1e-6, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_zero_resistance_is_legal() {
        let p = CircuitParameters::new(1e-3, 1e-6, 0.0, 5.0).unwrap();
        assert_eq!(p.resistance(), 0.0);
        assert_eq!(p.shunt_conductance(), 0.0);
        assert!(p.series_quality_factor().is_infinite());
        assert!(p.parallel_quality_factor().is_infinite());
    }

    #[test]
    fn test_micro_unit_conversion() {
        let p = CircuitParameters::from_micro_units(11.0, 180.0, 0.085, 900.0).unwrap();
        assert_relative_eq!(p.inductance(), 11e-6, max_relative = 1e-12);
        assert_relative_eq!(p.capacitance(), 180e-6, max_relative = 1e-12);
        assert_eq!(p, CircuitParameters::reference());
    }

    #[test]
    fn test_derived_quantities() {
        let p = CircuitParameters::reference();
        // 1/sqrt(11e-6 * 180e-6)
        assert_relative_eq!(p.natural_frequency(), 22473.4, max_relative = 1e-5);
        assert_relative_eq!(p.characteristic_impedance(), 0.247207, max_relative = 1e-5);
        assert_relative_eq!(p.series_quality_factor(), 2.90832, max_relative = 1e-4);
        assert_relative_eq!(p.stored_energy(0.0, 900.0), 0.5 * 180e-6 * 810000.0, max_relative = 1e-12);
    }
}
