//! Rational transfer functions in the Laplace variable s.

use num_complex::Complex64;
use serde::Serialize;

use crate::circuit::{CircuitParameters, ResistancePolicy, Topology};
use crate::error::{Result, RlcError};

/// H(s) = N(s) / D(s), coefficients highest degree first.
///
/// Invariants (checked by [`TransferFunction::new`]):
/// - both polynomials non-empty with finite coefficients
/// - leading denominator coefficient nonzero
/// - deg D >= deg N (proper)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferFunction {
    numerator: Vec<f64>,
    denominator: Vec<f64>,
}

impl TransferFunction {
    /// Create a validated transfer function.
    pub fn new(numerator: Vec<f64>, denominator: Vec<f64>) -> Result<Self> {
        if numerator.is_empty() || denominator.is_empty() {
            return Err(invalid("numerator and denominator must be non-empty"));
        }
        if let Some(c) = numerator.iter().chain(&denominator).find(|c| !c.is_finite()) {
            return Err(invalid(format!("coefficient {} is not finite", c)));
        }
        if denominator[0] == 0.0 {
            return Err(invalid("leading denominator coefficient is zero"));
        }
        if numerator.len() > denominator.len() {
            return Err(invalid(format!(
                "improper: numerator degree {} exceeds denominator degree {}",
                numerator.len() - 1,
                denominator.len() - 1
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Series RLC, input to capacitor voltage (second-order low-pass):
    ///
    /// ```text
    ///            1/(LC)
    /// H(s) = -------------------
    ///        s² + (R/L)s + 1/(LC)
    /// ```
    pub fn series_rlc(params: &CircuitParameters) -> Result<Self> {
        let l = params.inductance();
        let w0_sq = 1.0 / (l * params.capacitance());
        Self::new(vec![w0_sq], vec![1.0, params.resistance() / l, w0_sq])
    }

    /// Parallel RLC node impedance (band-pass form):
    ///
    /// ```text
    ///               s/C
    /// H(s) = ----------------------
    ///        s² + s/(RC) + 1/(LC)
    /// ```
    ///
    /// R = 0 is checked against `policy`: rejected, or built as the
    /// undamped limit with a zero middle coefficient.
    pub fn parallel_rlc(params: &CircuitParameters, policy: ResistancePolicy) -> Result<Self> {
        policy.check(params, Topology::Parallel)?;
        let c = params.capacitance();
        let w0_sq = 1.0 / (params.inductance() * c);
        Self::new(
            vec![1.0 / c, 0.0],
            vec![1.0, params.shunt_conductance() / c, w0_sq],
        )
    }

    /// Transfer function of `topology`.
    pub fn for_topology(
        topology: Topology,
        params: &CircuitParameters,
        policy: ResistancePolicy,
    ) -> Result<Self> {
        match topology {
            Topology::Series => Self::series_rlc(params),
            Topology::Parallel => Self::parallel_rlc(params, policy),
        }
    }

    pub fn numerator(&self) -> &[f64] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[f64] {
        &self.denominator
    }

    /// N(s).
    pub fn eval_numerator(&self, s: Complex64) -> Complex64 {
        horner(&self.numerator, s)
    }

    /// D(s).
    pub fn eval_denominator(&self, s: Complex64) -> Complex64 {
        horner(&self.denominator, s)
    }

    /// H(s). Infinite or NaN exactly at a pole.
    pub fn evaluate(&self, s: Complex64) -> Complex64 {
        self.eval_numerator(s) / self.eval_denominator(s)
    }

    /// H(j0), the DC gain.
    pub fn dc_gain(&self) -> f64 {
        let n = self.numerator[self.numerator.len() - 1];
        let d = self.denominator[self.denominator.len() - 1];
        n / d
    }

    /// Natural frequency √(a₀/a₂) of a second-order denominator
    /// a₂s² + a₁s + a₀. `None` for other degrees or a non-positive ratio.
    pub fn natural_frequency(&self) -> Option<f64> {
        match self.denominator.as_slice() {
            [a2, _, a0] if a0 / a2 > 0.0 => Some((a0 / a2).sqrt()),
            _ => None,
        }
    }

    /// Damping ratio ζ = a₁ / (2√(a₀a₂)) of a second-order denominator.
    pub fn damping_ratio(&self) -> Option<f64> {
        match self.denominator.as_slice() {
            [a2, a1, a0] if a0 * a2 > 0.0 => Some(a1 / (2.0 * (a0 * a2).sqrt())),
            _ => None,
        }
    }

    /// Roots of a second-order denominator.
    pub fn poles(&self) -> Option<[Complex64; 2]> {
        match self.denominator.as_slice() {
            [a2, a1, a0] => {
                let disc = Complex64::new(a1 * a1 - 4.0 * a2 * a0, 0.0).sqrt();
                let b = Complex64::new(-a1, 0.0);
                Some([(b + disc) / (2.0 * a2), (b - disc) / (2.0 * a2)])
            }
            _ => None,
        }
    }
}

fn horner(coefficients: &[f64], s: Complex64) -> Complex64 {
    coefficients
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * s + c)
}

fn invalid(message: impl Into<String>) -> RlcError {
    RlcError::InvalidTransferFunction {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_series_coefficients() {
        let p = CircuitParameters::reference();
        let tf = TransferFunction::series_rlc(&p).unwrap();
        let w0_sq = 1.0 / (11e-6 * 180e-6);
        assert_relative_eq!(tf.numerator()[0], w0_sq, max_relative = 1e-12);
        assert_eq!(tf.denominator()[0], 1.0);
        assert_relative_eq!(tf.denominator()[1], 0.085 / 11e-6, max_relative = 1e-12);
        assert_relative_eq!(tf.denominator()[2], w0_sq, max_relative = 1e-12);
        assert_relative_eq!(tf.dc_gain(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_parallel_coefficients() {
        let p = CircuitParameters::reference();
        let tf = TransferFunction::parallel_rlc(&p, ResistancePolicy::default()).unwrap();
        assert_eq!(tf.numerator().len(), 2);
        assert_relative_eq!(tf.numerator()[0], 1.0 / 180e-6, max_relative = 1e-12);
        assert_eq!(tf.numerator()[1], 0.0);
        assert_relative_eq!(tf.denominator()[1], 1.0 / (0.085 * 180e-6), max_relative = 1e-12);
        assert_eq!(tf.dc_gain(), 0.0);
    }

    #[test]
    fn test_parallel_zero_resistance_policies() {
        let p = CircuitParameters::reference().with_resistance(0.0).unwrap();

        let tf = TransferFunction::parallel_rlc(&p, ResistancePolicy::UndampedLimit).unwrap();
        assert!(tf.denominator().iter().all(|c| c.is_finite()));
        assert_eq!(tf.denominator()[1], 0.0);
        assert_eq!(tf.damping_ratio(), Some(0.0));

        let rejected = TransferFunction::parallel_rlc(&p, ResistancePolicy::Reject);
        assert!(matches!(
            rejected,
            Err(RlcError::DegenerateResistance {
                topology: Topology::Parallel
            })
        ));
    }

    #[test]
    fn test_invariants() {
        assert!(TransferFunction::new(vec![], vec![1.0]).is_err());
        assert!(TransferFunction::new(vec![1.0], vec![0.0, 1.0]).is_err());
        assert!(TransferFunction::new(vec![1.0, 0.0, 0.0], vec![1.0, 1.0]).is_err());
        assert!(TransferFunction::new(vec![f64::INFINITY], vec![1.0, 1.0]).is_err());
        assert!(TransferFunction::new(vec![1.0, 0.0], vec![1.0, 1.0]).is_ok());
    }

    #[test]
    fn test_evaluate_first_order() {
        // H(s) = 1/(s + 1) at s = j: (1 - j)/2
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 1.0]).unwrap();
        let h = tf.evaluate(Complex64::new(0.0, 1.0));
        assert_relative_eq!(h.re, 0.5, epsilon = 1e-15);
        assert_relative_eq!(h.im, -0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_second_order_characteristics() {
        let p = CircuitParameters::reference();
        let tf = TransferFunction::series_rlc(&p).unwrap();
        assert_relative_eq!(tf.natural_frequency().unwrap(), p.natural_frequency(), max_relative = 1e-12);
        assert_relative_eq!(
            tf.damping_ratio().unwrap(),
            1.0 / (2.0 * p.series_quality_factor()),
            max_relative = 1e-12
        );

        let poles = tf.poles().unwrap();
        let alpha = p.resistance() / (2.0 * p.inductance());
        for pole in poles {
            assert_relative_eq!(pole.re, -alpha, max_relative = 1e-9);
            assert_relative_eq!(pole.norm(), p.natural_frequency(), max_relative = 1e-9);
        }
    }
}
