//! Dormand–Prince 5(4) explicit method.
//!
//! Seven-stage embedded pair with the first-same-as-last property: the last
//! stage is f(t + h, y_new) and seeds the next step. Suited to lightly damped
//! circuits; for a parallel tank with 1/RC far above ω₀ the step size is
//! capped by stability rather than accuracy, and [`Rosenbrock23`] is the
//! better choice.
//!
//! [`Rosenbrock23`]: super::Rosenbrock23

use crate::circuit::CircuitParameters;
use crate::error::FailureReason;
use crate::model::{combine, State, StateModel, STATE_DIM};

use super::step::{DenseOutput, StepAttempt, Stepper};

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (also the seventh stage row)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between fifth- and fourth-order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// Continuous extension: stage i is weighted by Σⱼ DENSE[i][j]·θ^(j+1),
// a fourth-order interpolant that reproduces the B weights at θ = 1.
const DENSE: [[f64; 4]; 7] = [
    [
        1.0,
        -8048581381.0 / 2820520608.0,
        8663915743.0 / 2820520608.0,
        -12715105075.0 / 11282082432.0,
    ],
    [0.0, 0.0, 0.0, 0.0],
    [
        0.0,
        131558114200.0 / 32700410799.0,
        -68118460800.0 / 10900136933.0,
        87487479700.0 / 32700410799.0,
    ],
    [
        0.0,
        -1754552775.0 / 470086768.0,
        14199869525.0 / 1410260304.0,
        -10690763975.0 / 1880347072.0,
    ],
    [
        0.0,
        127303824393.0 / 49829197408.0,
        -318862633887.0 / 49829197408.0,
        701980252875.0 / 199316789632.0,
    ],
    [
        0.0,
        -282668133.0 / 205662961.0,
        2019193451.0 / 616988883.0,
        -1453857185.0 / 822651844.0,
    ],
    [
        0.0,
        40617522.0 / 29380423.0,
        -110615467.0 / 29380423.0,
        69997945.0 / 29380423.0,
    ],
];

/// Stage weights of the continuous extension at θ ∈ [0, 1].
pub(super) fn continuous_weights(theta: f64) -> [f64; 7] {
    let mut w = [0.0; 7];
    for (wi, row) in w.iter_mut().zip(DENSE.iter()) {
        *wi = theta * (row[0] + theta * (row[1] + theta * (row[2] + theta * row[3])));
    }
    w
}

/// Explicit fifth-order method with fourth-order error estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DormandPrince45;

impl Stepper for DormandPrince45 {
    fn error_exponent(&self) -> f64 {
        1.0 / 5.0
    }

    fn attempt<M: StateModel + ?Sized>(
        &self,
        model: &M,
        params: &CircuitParameters,
        t: f64,
        y: &State,
        f0: &State,
        h: f64,
    ) -> std::result::Result<StepAttempt, FailureReason> {
        let k1 = *f0;
        let k2 = model.derivative(&combine(y, &[(h * A21, &k1)]), t + C2 * h, params);
        let k3 = model.derivative(
            &combine(y, &[(h * A31, &k1), (h * A32, &k2)]),
            t + C3 * h,
            params,
        );
        let k4 = model.derivative(
            &combine(y, &[(h * A41, &k1), (h * A42, &k2), (h * A43, &k3)]),
            t + C4 * h,
            params,
        );
        let k5 = model.derivative(
            &combine(
                y,
                &[(h * A51, &k1), (h * A52, &k2), (h * A53, &k3), (h * A54, &k4)],
            ),
            t + C5 * h,
            params,
        );
        let k6 = model.derivative(
            &combine(
                y,
                &[
                    (h * A61, &k1),
                    (h * A62, &k2),
                    (h * A63, &k3),
                    (h * A64, &k4),
                    (h * A65, &k5),
                ],
            ),
            t + h,
            params,
        );

        let y_new = combine(
            y,
            &[
                (h * B1, &k1),
                (h * B3, &k3),
                (h * B4, &k4),
                (h * B5, &k5),
                (h * B6, &k6),
            ],
        );
        let k7 = model.derivative(&y_new, t + h, params);

        let zero = [0.0; STATE_DIM];
        let error = combine(
            &zero,
            &[
                (h * E1, &k1),
                (h * E3, &k3),
                (h * E4, &k4),
                (h * E5, &k5),
                (h * E6, &k6),
                (h * E7, &k7),
            ],
        );

        Ok(StepAttempt {
            y_new,
            f_new: k7,
            error,
            dense: DenseOutput::DormandPrince {
                stages: [k1, k2, k3, k4, k5, k6, k7],
            },
        })
    }
}
