//! vp-spectra: loading and averaging replicate spectrum measurements.
//!
//! Provides:
//! - Tag manifest parsing (semicolon-delimited group/file grid)
//! - A shared worker pool for reading sample files in parallel
//! - Element-wise averaging of replicate groups into one matrix row per label
//!
//! # Example
//!
//! ```no_run
//! use vp_spectra::{LoaderOptions, SpectrumLoader, WorkerPool};
//!
//! let pool = WorkerPool::new(None).unwrap();
//! let loader = SpectrumLoader::new(pool, LoaderOptions::default());
//! let loaded = loader.load("coins/tags.csv".as_ref()).unwrap();
//! println!("{} samples x {} points", loaded.spectrum.rows(), loaded.spectrum.cols());
//! ```

pub mod average;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod pool;

pub use average::{AveragedSpectrum, SpectrumRecord, mean_spectrum};
pub use error::{SpectraError, SpectraResult};
pub use loader::{
    LoadReport, LoadedSpectra, LoaderOptions, MissingReplicate, ShortGroup, SpectrumLoader,
    read_intensity,
};
pub use manifest::{ManifestGroup, ManifestLayout, TagManifest};
pub use pool::WorkerPool;
