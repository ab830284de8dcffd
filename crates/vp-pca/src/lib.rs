//! vp-pca: spectrum preprocessing and two-component PCA reduction.
//!
//! The preprocessing step is a pure function over a matrix. The reduction
//! is exposed through the [`Reducer`] trait so callers can substitute their own
//! decomposition; [`SvdReducer`] is the built-in implementation.

pub mod error;
pub mod preprocess;
pub mod reduce;

pub use error::{ReductionError, ReductionResult};
pub use preprocess::{Norm, PreprocessAxis, PreprocessMode, PreprocessingConfig, apply};
pub use reduce::{Reducer, Reduction, SvdReducer};
