//! Synchronous preprocess -> reduce chain, shared by the workers and the CLI.

use std::time::Instant;

use nalgebra::DMatrix;
use vp_pca::{PreprocessingConfig, Reducer, Reduction, ReductionResult, apply};
use vp_table::SampleRow;

pub fn run_pipeline(
    matrix: &DMatrix<f64>,
    config: &PreprocessingConfig,
    reducer: &dyn Reducer,
) -> ReductionResult<Reduction> {
    let started = Instant::now();
    let processed = apply(matrix, config);
    let reduction = reducer.reduce(&processed)?;
    tracing::debug!(
        rows = matrix.nrows(),
        cols = matrix.ncols(),
        preprocessing = %config,
        pc1_ratio = reduction.explained_variance_ratio.0,
        pc2_ratio = reduction.explained_variance_ratio.1,
        elapsed_s = started.elapsed().as_secs_f64(),
        "pipeline finished"
    );
    Ok(reduction)
}

/// Pair labels with reduced coordinates, keeping label order.
pub fn rows_from_reduction(labels: &[String], reduction: &Reduction) -> Vec<SampleRow> {
    labels
        .iter()
        .zip(reduction.points())
        .map(|(label, (pc1, pc2))| SampleRow::new(label.clone(), pc1, pc2))
        .collect()
}
