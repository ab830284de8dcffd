//! Two-component PCA.

use nalgebra::{DMatrix, SVD};

use crate::error::{ReductionError, ReductionResult};

/// Result of projecting samples onto the first two principal components.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub pc1: Vec<f64>,
    pub pc2: Vec<f64>,
    pub explained_variance_ratio: (f64, f64),
    pub singular_values: (f64, f64),
}

impl Reduction {
    pub fn len(&self) -> usize {
        self.pc1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pc1.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.pc1.iter().copied().zip(self.pc2.iter().copied())
    }
}

/// Fits two principal components and returns the sample projection.
///
/// Implementations must be deterministic: the same matrix yields the same result.
pub trait Reducer: Send + Sync {
    fn reduce(&self, matrix: &DMatrix<f64>) -> ReductionResult<Reduction>;
}

/// Exact PCA through a thin SVD of the mean-centered matrix. No whitening.
#[derive(Debug, Clone)]
pub struct SvdReducer {
    pub eps: f64,
    /// Iteration cap for the SVD; exceeding it is a decomposition failure.
    pub max_iterations: usize,
}

impl Default for SvdReducer {
    fn default() -> Self {
        Self {
            eps: 5.0 * f64::EPSILON,
            max_iterations: 100_000,
        }
    }
}

impl Reducer for SvdReducer {
    fn reduce(&self, matrix: &DMatrix<f64>) -> ReductionResult<Reduction> {
        let (rows, cols) = matrix.shape();
        if rows < 2 || cols < 2 {
            return Err(ReductionError::InsufficientData { rows, cols });
        }
        if let Some(i) = matrix.iter().position(|v| !v.is_finite()) {
            // Column-major storage.
            return Err(ReductionError::NonFinite {
                row: i % rows,
                col: i / rows,
            });
        }

        let mut centered = matrix.clone();
        for mut col in centered.column_iter_mut() {
            let mean = col.mean();
            col.apply(|x| *x -= mean);
        }
        let total_variance = centered.norm_squared();

        let svd = SVD::try_new(centered, true, false, self.eps, self.max_iterations).ok_or_else(
            || ReductionError::Decomposition {
                what: format!("SVD did not converge within {} iterations", self.max_iterations),
            },
        )?;
        let u = svd.u.as_ref().ok_or_else(|| ReductionError::Decomposition {
            what: "left singular vectors unavailable".to_string(),
        })?;
        let s = &svd.singular_values;

        let mut order: Vec<usize> = (0..s.len()).collect();
        order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));
        let (first, second) = (order[0], order[1]);

        let component = |k: usize| -> Vec<f64> {
            let col = u.column(k);
            // Sign convention: the largest-magnitude loading of each component is positive.
            let pivot = col.iter().fold(0.0_f64, |m, &x| if x.abs() > m.abs() { x } else { m });
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
            col.iter().map(|x| x * s[k] * sign).collect()
        };
        let ratio = |k: usize| -> f64 {
            if total_variance > 0.0 {
                s[k] * s[k] / total_variance
            } else {
                0.0
            }
        };

        let reduction = Reduction {
            pc1: component(first),
            pc2: component(second),
            explained_variance_ratio: (ratio(first), ratio(second)),
            singular_values: (s[first], s[second]),
        };
        tracing::debug!(
            rows,
            cols,
            ratio1 = reduction.explained_variance_ratio.0,
            ratio2 = reduction.explained_variance_ratio.1,
            "pca fitted"
        );
        Ok(reduction)
    }
}
