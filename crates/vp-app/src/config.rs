//! Application configuration, stored as YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vp_core::VpError;
use vp_pca::PreprocessingConfig;
use vp_spectra::{LoaderOptions, ManifestLayout};

use crate::error::{AppError, AppResult};

/// How a session treats pipeline results when several runs overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPolicy {
    /// Apply every result in completion order; the last to finish is shown.
    #[default]
    LastFinishedWins,
    /// Drop results from runs that were superseded by a newer request.
    LatestRequestWins,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Loader pool size; `None` lets rayon pick.
    pub worker_threads: Option<usize>,
    pub replicate_size: usize,
    pub manifest_layout: ManifestLayout,
    pub sample_extension: String,
    pub intensity_column: usize,
    pub require_all_replicates: bool,
    pub preprocessing: PreprocessingConfig,
    pub run_policy: RunPolicy,
    /// Per-axis tolerance when matching the pointer to a plotted point.
    pub hover_epsilon: f64,
    /// Fractional padding added around the combined data range.
    pub bounds_margin: f64,
    pub clear_overlay_on_zoom_reset: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            replicate_size: 3,
            manifest_layout: ManifestLayout::default(),
            sample_extension: "txt".to_string(),
            intensity_column: 1,
            require_all_replicates: false,
            preprocessing: PreprocessingConfig::default(),
            run_policy: RunPolicy::default(),
            hover_epsilon: 1e-5,
            bounds_margin: 0.15,
            clear_overlay_on_zoom_reset: true,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        self.validate()?;
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| AppError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.worker_threads == Some(0) {
            return Err(VpError::InvalidArg {
                what: "worker_threads must be at least 1",
            }
            .into());
        }
        if self.replicate_size == 0 {
            return Err(VpError::InvalidArg {
                what: "replicate_size must be at least 1",
            }
            .into());
        }
        if !(self.hover_epsilon.is_finite() && self.hover_epsilon > 0.0) {
            return Err(VpError::InvalidArg {
                what: "hover_epsilon must be positive",
            }
            .into());
        }
        if !(self.bounds_margin.is_finite() && self.bounds_margin >= 0.0) {
            return Err(VpError::InvalidArg {
                what: "bounds_margin must be non-negative",
            }
            .into());
        }
        Ok(())
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            layout: self.manifest_layout,
            extension: self.sample_extension.clone(),
            intensity_column: self.intensity_column,
            replicate_size: self.replicate_size,
            require_all_replicates: self.require_all_replicates,
        }
    }
}
