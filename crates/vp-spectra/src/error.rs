//! Error types for spectrum loading.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum SpectraError {
    #[error("Malformed file {path} (line {line}): {reason}")]
    FileFormat {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Missing replicate for group '{group}': {path}")]
    MissingReplicate { group: String, path: PathBuf },

    #[error("Spectrum length mismatch in {path}: expected {expected} points, found {found}")]
    DimensionMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Manifest {path} lists no groups")]
    EmptyManifest { path: PathBuf },

    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Worker pool error: {0}")]
    Pool(String),
}

pub type SpectraResult<T> = Result<T, SpectraError>;

impl SpectraError {
    pub(crate) fn format(path: impl Into<PathBuf>, line: u64, reason: impl Into<String>) -> Self {
        SpectraError::FileFormat {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Build from a csv error, keeping the line number when the reader knows it.
    pub(crate) fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(source) => SpectraError::Io {
                path: path.into(),
                source,
            },
            kind => SpectraError::format(path, line, format!("{kind:?}")),
        }
    }
}
