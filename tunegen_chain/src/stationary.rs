// Stationary distribution and the time-reversed transition law.
//
// π solves π·P = π with Σπ = 1. Transposing gives (I − Pᵀ)·πᵀ = 0, which
// is singular because P's rows sum to 1. The normalization is folded in by
// bordering the system with a row and a column of ones:
//
//     ┌            ┐ ┌   ┐   ┌   ┐
//     │ (I − Pᵀ)  1 │ │ π │   │ 0 │
//     │    1ᵀ     1 │ │ λ │ = │ 1 │
//     └            ┘ └   ┘   └   ┘
//
// Summing the first n equations forces λ = 0, so the bordered system is
// non-singular exactly when the stationary distribution is unique.
//
// The backward matrix is Bayes' rule applied to the stationary process:
// B[i][j] = P(X(t−1) = j | X(t) = i) = P[j][i]·π[j]/π[i].

use crate::error::ChainError;
use crate::linalg::{Matrix, solve};

/// Solve for the unique stationary distribution of `p`.
///
/// Fails with [`ChainError::SingularSystem`] when the chain has more than
/// one closed class (no unique π).
pub fn stationary_distribution(p: &Matrix) -> Result<Vec<f64>, ChainError> {
    let n = p.size();
    let mut bordered = Matrix::zeros(n + 1);
    for i in 0..=n {
        for j in 0..=n {
            let value = if i < n && j < n {
                let identity = if i == j { 1.0 } else { 0.0 };
                identity - p.get(j, i)
            } else {
                1.0
            };
            bordered.set(i, j, value);
        }
    }
    let mut rhs = vec![0.0; n + 1];
    rhs[n] = 1.0;

    let mut pi = solve(&bordered, &rhs)?;
    pi.truncate(n);
    Ok(pi)
}

/// Build the time-reversed transition matrix from `p` and its stationary
/// distribution.
///
/// Rows for states with `π[i] == 0` (outside the irreducible contract) are
/// all zero rather than NaN.
pub fn backward_matrix(p: &Matrix, pi: &[f64]) -> Matrix {
    let n = p.size();
    let mut b = Matrix::zeros(n);
    for i in 0..n {
        if pi[i] <= 0.0 {
            continue;
        }
        for j in 0..n {
            b.set(i, j, p.get(j, i) * pi[j] / pi[i]);
        }
    }
    b
}
