// Minimal dense linear algebra for small chains.
//
// State spaces here are a handful of states (three cadences, a dozen chord
// roots), so a row-major `Vec<f64>` and textbook Gaussian elimination with
// partial pivoting are all that is needed. Vectors are row vectors and
// multiply from the left (`v · M`), matching the convention that row `i` of
// a transition matrix is the outgoing distribution of state `i`.

use crate::error::ChainError;

/// Pivots smaller than this are treated as zero.
const PIVOT_EPSILON: f64 = 1e-12;

/// Dense square matrix, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Matrix {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zeros(n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build from rows. Every row must have `rows.len()` entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for row in rows {
            assert_eq!(row.len(), n, "Matrix::from_rows: row length mismatch");
            data.extend_from_slice(row);
        }
        Matrix { n, data }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Matrix product `self · other`.
    pub fn mul(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.n, other.n, "Matrix::mul: size mismatch");
        let mut out = Matrix::zeros(self.n);
        for i in 0..self.n {
            for j in 0..self.n {
                let mut sum = 0.0;
                for k in 0..self.n {
                    sum += self.get(i, k) * other.get(k, j);
                }
                out.set(i, j, sum);
            }
        }
        out
    }

    /// `self^k` by repeated multiplication. `k = 0` gives the identity.
    pub fn pow(&self, k: usize) -> Matrix {
        let mut out = Matrix::identity(self.n);
        for _ in 0..k {
            out = out.mul(self);
        }
        out
    }

    /// Row-vector product `v · self`.
    pub fn left_mul(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.n, "Matrix::left_mul: length mismatch");
        (0..self.n)
            .map(|j| (0..self.n).map(|k| v[k] * self.get(k, j)).sum::<f64>())
            .collect()
    }
}

/// Solve `a · x = b` for `x` by Gaussian elimination with partial pivoting.
pub fn solve(a: &Matrix, b: &[f64]) -> Result<Vec<f64>, ChainError> {
    let n = a.size();
    assert_eq!(b.len(), n, "solve: right-hand side length mismatch");

    // Augmented rows [a | b].
    let mut rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut row = a.row(i).to_vec();
            row.push(b[i]);
            row
        })
        .collect();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| rows[r][col].abs().total_cmp(&rows[s][col].abs()))
            .unwrap_or(col);
        let magnitude = rows[pivot][col].abs();
        if magnitude.is_nan() || magnitude <= PIVOT_EPSILON {
            return Err(ChainError::SingularSystem {
                reason: format!("pivot {col} of {n} is {magnitude:e}"),
            });
        }
        rows.swap(col, pivot);

        let pivot_row = rows[col].clone();
        for row in rows.iter_mut().skip(col + 1) {
            let factor = row[col] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                row[k] -= factor * pivot_row[k];
            }
        }
    }

    let mut x = vec![0.0; n];
    for r in (0..n).rev() {
        let mut acc = rows[r][n];
        for k in (r + 1)..n {
            acc -= rows[r][k] * x[k];
        }
        x[r] = acc / rows[r][r];
    }
    Ok(x)
}
