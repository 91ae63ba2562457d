//! Dense LU factorization of the Rosenbrock iteration matrix.

use crate::model::{Jacobian, State, STATE_DIM};

/// Pivots smaller than this are treated as singular.
const MIN_PIVOT: f64 = 1e-15;

/// LU factors of W = I - γ·J with partial pivoting.
#[derive(Debug, Clone)]
pub struct IterationMatrix {
    /// Combined L (unit diagonal, below) and U (on and above) factors, row-major
    lu: Jacobian,
    /// Row permutation applied during factorization
    pivots: [usize; STATE_DIM],
}

impl IterationMatrix {
    /// Assemble I - γ·J and factor it.
    ///
    /// Returns `None` if the matrix is singular.
    pub fn factor(jacobian: &Jacobian, gamma: f64) -> Option<Self> {
        let n = STATE_DIM;
        let mut lu = [[0.0; STATE_DIM]; STATE_DIM];
        for i in 0..n {
            for j in 0..n {
                let identity = if i == j { 1.0 } else { 0.0 };
                lu[i][j] = identity - gamma * jacobian[i][j];
            }
        }

        let mut pivots = [0usize; STATE_DIM];
        for (i, p) in pivots.iter_mut().enumerate() {
            *p = i;
        }

        for k in 0..n {
            // Find pivot
            let mut max_val = lu[k][k].abs();
            let mut max_row = k;
            for (i, row) in lu.iter().enumerate().skip(k + 1) {
                let val = row[k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if !(max_val >= MIN_PIVOT) {
                return None;
            }

            if max_row != k {
                pivots.swap(k, max_row);
                lu.swap(k, max_row);
            }

            // Eliminate
            let pivot = lu[k][k];
            for i in (k + 1)..n {
                let factor = lu[i][k] / pivot;
                lu[i][k] = factor;
                for j in (k + 1)..n {
                    lu[i][j] -= factor * lu[k][j];
                }
            }
        }

        Some(Self { lu, pivots })
    }

    /// Solve W·x = b using the stored factors.
    pub fn solve(&self, b: &State) -> State {
        let n = STATE_DIM;
        let mut x = [0.0; STATE_DIM];

        // Apply pivot permutation
        for i in 0..n {
            x[i] = b[self.pivots[i]];
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                x[i] -= self.lu[i][j] * x[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                x[i] -= self.lu[i][j] * x[j];
            }
            x[i] /= self.lu[i][i];
        }

        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_matches_direct_inverse() {
        let jac = [[-3.0, 2.0], [-5.0, 0.0]];
        let gamma = 0.4;
        let w = IterationMatrix::factor(&jac, gamma).unwrap();

        // W = [[2.2, -0.8], [2.0, 1.0]]
        let b = [1.0, -2.0];
        let x = w.solve(&b);
        assert_relative_eq!(2.2 * x[0] - 0.8 * x[1], b[0], epsilon = 1e-12);
        assert_relative_eq!(2.0 * x[0] + 1.0 * x[1], b[1], epsilon = 1e-12);
    }

    #[test]
    fn test_pivoting_on_zero_diagonal() {
        // W = [[0, 1], [1, 0]] needs a row swap
        let jac = [[1.0, -1.0], [-1.0, 1.0]];
        let w = IterationMatrix::factor(&jac, 1.0).unwrap();
        let x = w.solve(&[3.0, 4.0]);
        assert_relative_eq!(x[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix() {
        // W = I - J = 0
        let jac = [[1.0, 0.0], [0.0, 1.0]];
        assert!(IterationMatrix::factor(&jac, 1.0).is_none());
    }
}
