//! Error types for the vp-app service layer.

use std::path::PathBuf;

use vp_core::TableHandle;

/// Unified error for the CLI and any shell built on these services.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Load failed: {0}")]
    Spectra(#[from] vp_spectra::SpectraError),

    #[error("Reduction failed: {0}")]
    Reduction(#[from] vp_pca::ReductionError),

    #[error(transparent)]
    Core(#[from] vp_core::VpError),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Run failed: {0}")]
    Run(String),

    #[error("Table not found: {0}")]
    TableNotFound(TableHandle),

    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for vp-app operations.
pub type AppResult<T> = Result<T, AppError>;
