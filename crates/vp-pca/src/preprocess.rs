//! Optional normalization / standardization applied before reduction.
//!
//! Axis convention: [`PreprocessAxis::Features`] is axis 0 and transforms each
//! column; [`PreprocessAxis::Samples`] is axis 1 and transforms each row.

use std::fmt;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessMode {
    #[default]
    None,
    Normalize,
    Standardize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessAxis {
    /// Axis 0: one vector per feature (matrix column).
    Features,
    /// Axis 1: one vector per sample (matrix row).
    #[default]
    Samples,
}

impl PreprocessAxis {
    pub fn index(self) -> usize {
        match self {
            PreprocessAxis::Features => 0,
            PreprocessAxis::Samples => 1,
        }
    }
}

/// Vector norm used by [`PreprocessMode::Normalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    #[default]
    L1,
    L2,
    Max,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub mode: PreprocessMode,
    pub axis: PreprocessAxis,
    /// Only read when `mode` is `Normalize`.
    pub norm: Norm,
}

impl PreprocessingConfig {
    pub fn normalize(axis: PreprocessAxis, norm: Norm) -> Self {
        Self {
            mode: PreprocessMode::Normalize,
            axis,
            norm,
        }
    }

    pub fn standardize(axis: PreprocessAxis) -> Self {
        Self {
            mode: PreprocessMode::Standardize,
            axis,
            norm: Norm::default(),
        }
    }
}

impl fmt::Display for PreprocessingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = match self.axis {
            PreprocessAxis::Features => "features",
            PreprocessAxis::Samples => "samples",
        };
        match self.mode {
            PreprocessMode::None => write!(f, "none"),
            PreprocessMode::Normalize => {
                let norm = match self.norm {
                    Norm::L1 => "l1",
                    Norm::L2 => "l2",
                    Norm::Max => "max",
                };
                write!(f, "normalize {norm} ({axis})")
            }
            PreprocessMode::Standardize => write!(f, "standardize ({axis})"),
        }
    }
}

/// Apply `config` to a copy of `matrix`.
pub fn apply(matrix: &DMatrix<f64>, config: &PreprocessingConfig) -> DMatrix<f64> {
    if config.mode == PreprocessMode::None {
        return matrix.clone();
    }

    // Work column-wise; sample rows are handled on the transpose.
    let mut work = match config.axis {
        PreprocessAxis::Features => matrix.clone(),
        PreprocessAxis::Samples => matrix.transpose(),
    };

    match config.mode {
        PreprocessMode::None => {}
        PreprocessMode::Normalize => {
            for mut v in work.column_iter_mut() {
                let n = match config.norm {
                    Norm::L1 => v.lp_norm(1),
                    Norm::L2 => v.norm(),
                    Norm::Max => v.amax(),
                };
                // Zero vectors stay zero.
                if n > 0.0 {
                    v.apply(|x| *x /= n);
                }
            }
        }
        PreprocessMode::Standardize => {
            for mut v in work.column_iter_mut() {
                if v.is_empty() {
                    continue;
                }
                let mean = v.mean();
                let std = v.variance().sqrt();
                if std > 10.0 * f64::EPSILON * (1.0 + mean.abs()) {
                    v.apply(|x| *x = (*x - mean) / std);
                } else {
                    v.apply(|x| *x -= mean);
                }
            }
        }
    }

    match config.axis {
        PreprocessAxis::Features => work,
        PreprocessAxis::Samples => work.transpose(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 4, &[
            1.0, -2.0, 3.0, 0.5, //
            4.0, 5.0, -6.0, 1.5, //
            7.0, 8.0, 9.0, -2.5,
        ])
    }

    fn vectors(m: &DMatrix<f64>, axis: PreprocessAxis) -> Vec<Vec<f64>> {
        match axis {
            PreprocessAxis::Features => m
                .column_iter()
                .map(|c| c.iter().copied().collect())
                .collect(),
            PreprocessAxis::Samples => m.row_iter().map(|r| r.iter().copied().collect()).collect(),
        }
    }

    fn norm_of(v: &[f64], norm: Norm) -> f64 {
        match norm {
            Norm::L1 => v.iter().map(|x| x.abs()).sum(),
            Norm::L2 => v.iter().map(|x| x * x).sum::<f64>().sqrt(),
            Norm::Max => v.iter().fold(0.0, |m, x| m.max(x.abs())),
        }
    }

    fn assert_unit(axis: PreprocessAxis, norm: Norm) {
        let out = apply(&sample(), &PreprocessingConfig::normalize(axis, norm));
        for v in vectors(&out, axis) {
            assert!((norm_of(&v, norm) - 1.0).abs() < 1e-12, "{axis:?} {norm:?}: {v:?}");
        }
    }

    #[test]
    fn normalize_l1_samples() {
        assert_unit(PreprocessAxis::Samples, Norm::L1);
    }

    #[test]
    fn normalize_l1_features() {
        assert_unit(PreprocessAxis::Features, Norm::L1);
    }

    #[test]
    fn normalize_l2_samples() {
        assert_unit(PreprocessAxis::Samples, Norm::L2);
    }

    #[test]
    fn normalize_l2_features() {
        assert_unit(PreprocessAxis::Features, Norm::L2);
    }

    #[test]
    fn normalize_max_samples() {
        assert_unit(PreprocessAxis::Samples, Norm::Max);
    }

    #[test]
    fn normalize_max_features() {
        assert_unit(PreprocessAxis::Features, Norm::Max);
    }

    #[test]
    fn none_is_identity_copy() {
        let m = sample();
        assert_eq!(apply(&m, &PreprocessingConfig::default()), m);
    }

    #[test]
    fn input_is_not_mutated() {
        let m = sample();
        let before = m.clone();
        let _ = apply(&m, &PreprocessingConfig::standardize(PreprocessAxis::Features));
        let _ = apply(&m, &PreprocessingConfig::normalize(PreprocessAxis::Samples, Norm::L2));
        assert_eq!(m, before);
    }

    #[test]
    fn zero_vector_survives_normalization() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 3.0, 4.0]);
        let out = apply(&m, &PreprocessingConfig::normalize(PreprocessAxis::Samples, Norm::L2));
        assert_eq!(out.row(0).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0]);
        assert!((out[(1, 0)] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn standardize_features_scales_columns() {
        let out = apply(&sample(), &PreprocessingConfig::standardize(PreprocessAxis::Features));
        for c in out.column_iter() {
            assert!(c.mean().abs() < 1e-12);
            assert!((c.variance() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn standardize_samples_scales_rows() {
        let out = apply(&sample(), &PreprocessingConfig::standardize(PreprocessAxis::Samples));
        for r in out.row_iter() {
            assert!(r.mean().abs() < 1e-12);
            assert!((r.variance() - 1.0).abs() < 1e-12);
        }
        // Rows and columns are genuinely different transforms.
        let by_feature = apply(&sample(), &PreprocessingConfig::standardize(PreprocessAxis::Features));
        assert!((&out - &by_feature).amax() > 1e-3);
    }

    #[test]
    fn constant_vector_is_centered_only() {
        let m = DMatrix::from_row_slice(3, 2, &[2.0, 1.0, 2.0, 2.0, 2.0, 3.0]);
        let out = apply(&m, &PreprocessingConfig::standardize(PreprocessAxis::Features));
        assert!(out.column(0).iter().all(|x| x.abs() < 1e-12));
    }

    #[test]
    fn axis_index_mapping() {
        assert_eq!(PreprocessAxis::Features.index(), 0);
        assert_eq!(PreprocessAxis::Samples.index(), 1);
    }

    #[test]
    fn display_names() {
        assert_eq!(PreprocessingConfig::default().to_string(), "none");
        assert_eq!(
            PreprocessingConfig::normalize(PreprocessAxis::Features, Norm::Max).to_string(),
            "normalize max (features)"
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn standardize_is_idempotent(
            values in prop::collection::vec(-100.0_f64..100.0_f64, 24),
            by_rows in any::<bool>(),
        ) {
            let axis = if by_rows { PreprocessAxis::Samples } else { PreprocessAxis::Features };
            let config = PreprocessingConfig::standardize(axis);
            let m = DMatrix::from_row_slice(4, 6, &values);
            let once = apply(&m, &config);
            let twice = apply(&once, &config);
            prop_assert!((&once - &twice).amax() < 1e-9);
        }

        #[test]
        fn l2_rows_have_unit_norm(values in prop::collection::vec(0.5_f64..50.0_f64, 15)) {
            let m = DMatrix::from_row_slice(3, 5, &values);
            let out = apply(&m, &PreprocessingConfig::normalize(PreprocessAxis::Samples, Norm::L2));
            for r in out.row_iter() {
                prop_assert!((r.norm() - 1.0).abs() < 1e-12);
            }
        }
    }
}
