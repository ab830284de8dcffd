//! Error types for the reduction step.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReductionError {
    #[error("Insufficient data for 2 components: {rows} samples x {cols} features")]
    InsufficientData { rows: usize, cols: usize },

    #[error("Non-finite value at sample {row}, feature {col}")]
    NonFinite { row: usize, col: usize },

    #[error("Decomposition failed: {what}")]
    Decomposition { what: String },
}

pub type ReductionResult<T> = Result<T, ReductionError>;
