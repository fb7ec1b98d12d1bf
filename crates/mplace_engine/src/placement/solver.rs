//! Conjugate-gradient solver for the per-axis systems.

use crate::placement::system::SparseMatrix;
use thiserror::Error;

/// Curvature below `CURVATURE_EPS · |p|² · max(diag)` means the search
/// direction lies in the null space.
const CURVATURE_EPS: f64 = 1e-14;

/// Why a solve could not produce a solution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The matrix is singular or not positive definite on the search space,
    /// or the iteration produced non-finite values.
    #[error("degenerate system (row {row:?})")]
    DegenerateSystem {
        /// The offending row when a diagonal or input entry pinpoints it.
        row: Option<usize>,
    },
}

/// Outcome of a successful solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveStats {
    /// Inner steps taken.
    pub steps: u32,
    /// Final residual norm `|b − A·x|`.
    pub residual_norm: f64,
    /// `false` if the step cap was hit before the tolerance.
    pub converged: bool,
}

/// Warm-started conjugate gradient with a relative residual stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConjugateGradient {
    /// Stop when `|r| ≤ tolerance · |b|`.
    pub tolerance: f64,
    /// Inner step cap.
    pub max_steps: u32,
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl ConjugateGradient {
    /// Creates a solver.
    pub fn new(tolerance: f64, max_steps: u32) -> Self {
        Self {
            tolerance,
            max_steps,
        }
    }

    /// Solves `A · x = b`, starting from and overwriting `x`.
    ///
    /// When `b` is zero the stop is relative to the initial residual instead.
    /// Hitting the step cap is not an error; `x` then holds the best iterate
    /// and [`SolveStats::converged`] is `false`.
    pub fn solve(
        &self,
        a: &SparseMatrix,
        b: &[f64],
        x: &mut [f64],
    ) -> Result<SolveStats, SolveError> {
        let n = a.dim();
        let mut max_diag = 0.0_f64;
        for row in 0..n {
            let d = a.diagonal(row);
            if !d.is_finite() || d <= 0.0 {
                return Err(SolveError::DegenerateSystem { row: Some(row) });
            }
            max_diag = max_diag.max(d);
        }
        if let Some(row) = (0..n).find(|&i| !b[i].is_finite() || !x[i].is_finite()) {
            return Err(SolveError::DegenerateSystem { row: Some(row) });
        }

        let mut ap = vec![0.0; n];
        a.mul_vec(x, &mut ap);
        let mut r: Vec<f64> = b.iter().zip(&ap).map(|(bi, ai)| bi - ai).collect();
        let mut rr = dot(&r, &r);
        let b_norm = dot(b, b).sqrt();
        let threshold = if b_norm > 0.0 {
            self.tolerance * b_norm
        } else {
            self.tolerance * rr.sqrt()
        };
        if rr.sqrt() <= threshold {
            return Ok(SolveStats {
                steps: 0,
                residual_norm: rr.sqrt(),
                converged: true,
            });
        }

        let mut p = r.clone();
        for step in 1..=self.max_steps {
            a.mul_vec(&p, &mut ap);
            let pap = dot(&p, &ap);
            let pp = dot(&p, &p);
            if !pap.is_finite() || pap <= CURVATURE_EPS * pp * max_diag {
                return Err(SolveError::DegenerateSystem { row: None });
            }

            let alpha = rr / pap;
            for i in 0..n {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }
            let rr_next = dot(&r, &r);
            if !rr_next.is_finite() {
                return Err(SolveError::DegenerateSystem { row: None });
            }
            if rr_next.sqrt() <= threshold {
                return Ok(SolveStats {
                    steps: step,
                    residual_norm: rr_next.sqrt(),
                    converged: true,
                });
            }

            let beta = rr_next / rr;
            for i in 0..n {
                p[i] = r[i] + beta * p[i];
            }
            rr = rr_next;
        }

        Ok(SolveStats {
            steps: self.max_steps,
            residual_norm: rr.sqrt(),
            converged: false,
        })
    }
}
