//! Replicate averaging.

use std::path::PathBuf;

use nalgebra::DMatrix;

/// One measured spectrum as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumRecord {
    pub label: String,
    pub path: PathBuf,
    /// Intensity per wavelength index; the wavelength column itself is not kept.
    pub intensity: Vec<f64>,
}

/// Element-wise mean of equally long vectors, `None` when `members` is empty.
pub fn mean_spectrum(members: &[&[f64]]) -> Option<Vec<f64>> {
    let first = members.first()?;
    let mut acc = vec![0.0; first.len()];
    for m in members {
        debug_assert_eq!(m.len(), acc.len());
        for (a, v) in acc.iter_mut().zip(m.iter()) {
            *a += v;
        }
    }
    let n = members.len() as f64;
    acc.iter_mut().for_each(|a| *a /= n);
    Some(acc)
}

/// Averaged replicate groups: one row per label, one column per wavelength index.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedSpectrum {
    labels: Vec<String>,
    matrix: DMatrix<f64>,
}

impl AveragedSpectrum {
    /// Assemble from `(label, averaged row)` pairs. All rows must share one length.
    pub(crate) fn from_rows(rows: Vec<(String, Vec<f64>)>) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|(_, r)| r.len()).unwrap_or(0);
        let mut labels = Vec::with_capacity(n_rows);
        let mut flat = Vec::with_capacity(n_rows * n_cols);
        for (label, row) in rows {
            labels.push(label);
            flat.extend(row);
        }
        Self {
            labels,
            matrix: DMatrix::from_row_slice(n_rows, n_cols, &flat),
        }
    }

    pub fn new(labels: Vec<String>, matrix: DMatrix<f64>) -> Option<Self> {
        (labels.len() == matrix.nrows()).then_some(Self { labels, matrix })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn cols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn replicate_order_does_not_change_mean(
            rows in prop::collection::vec(prop::collection::vec(-1e3_f64..1e3_f64, 16), 1..6),
            rotate in 0_usize..6,
        ) {
            let forward: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
            let mut permuted = forward.clone();
            permuted.rotate_left(rotate % forward.len());
            permuted.reverse();

            let a = mean_spectrum(&forward).unwrap();
            let b = mean_spectrum(&permuted).unwrap();
            for (x, y) in a.iter().zip(&b) {
                prop_assert!((x - y).abs() < 1e-9);
            }
        }
    }
}
