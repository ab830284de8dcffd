//! Manifest-driven spectrum loading.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::average::{AveragedSpectrum, SpectrumRecord, mean_spectrum};
use crate::error::{SpectraError, SpectraResult};
use crate::manifest::{ManifestLayout, TagManifest};
use crate::pool::WorkerPool;

/// Knobs for [`SpectrumLoader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    pub layout: ManifestLayout,
    /// Appended to each manifest basename to form the sample file name.
    pub extension: String,
    /// Zero-based column holding the intensity in sample files.
    pub intensity_column: usize,
    /// Expected number of replicates per group; smaller groups are reported.
    pub replicate_size: usize,
    /// Treat a missing sample file as fatal instead of skipping it.
    pub require_all_replicates: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            layout: ManifestLayout::GroupPerRow,
            extension: "txt".to_string(),
            intensity_column: 1,
            replicate_size: 3,
            require_all_replicates: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingReplicate {
    pub group: String,
    pub path: PathBuf,
}

/// A group that ended up with fewer members than the replicate size.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortGroup {
    pub label: String,
    pub found: usize,
    pub expected: usize,
}

/// What happened during a load besides the matrix itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub files_requested: usize,
    pub files_loaded: usize,
    pub missing: Vec<MissingReplicate>,
    pub short_groups: Vec<ShortGroup>,
    /// Labels whose every member file was missing; they produce no row.
    pub empty_groups: Vec<String>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.short_groups.is_empty() && self.empty_groups.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LoadedSpectra {
    pub source: PathBuf,
    pub spectrum: AveragedSpectrum,
    pub report: LoadReport,
}

impl LoadedSpectra {
    pub fn labels(&self) -> &[String] {
        self.spectrum.labels()
    }
}

/// Reads a manifest, its sample files (in parallel) and averages replicate groups.
#[derive(Debug, Clone)]
pub struct SpectrumLoader {
    pool: WorkerPool,
    options: LoaderOptions,
}

struct Job {
    group: usize,
    path: PathBuf,
}

impl SpectrumLoader {
    pub fn new(pool: WorkerPool, options: LoaderOptions) -> Self {
        Self { pool, options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn load(&self, manifest_path: &Path) -> SpectraResult<LoadedSpectra> {
        let started = Instant::now();
        let manifest = TagManifest::read(manifest_path, self.options.layout)?;
        let dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut report = LoadReport {
            files_requested: manifest.member_count(),
            ..LoadReport::default()
        };

        let mut jobs = Vec::with_capacity(report.files_requested);
        for (gi, group) in manifest.groups.iter().enumerate() {
            for member in &group.members {
                let path = dir.join(format!("{member}.{}", self.options.extension));
                if path.is_file() {
                    jobs.push(Job { group: gi, path });
                } else if self.options.require_all_replicates {
                    return Err(SpectraError::MissingReplicate {
                        group: group.label.clone(),
                        path,
                    });
                } else {
                    tracing::warn!(group = %group.label, path = %path.display(), "sample file not found, skipping");
                    report.missing.push(MissingReplicate {
                        group: group.label.clone(),
                        path,
                    });
                }
            }
        }

        let column = self.options.intensity_column;
        let intensities: Vec<Vec<f64>> = self.pool.install(|| {
            jobs.par_iter()
                .map(|job| read_intensity(&job.path, column))
                .collect::<SpectraResult<Vec<_>>>()
        })?;

        let records: Vec<SpectrumRecord> = jobs
            .into_iter()
            .zip(intensities)
            .map(|(job, intensity)| SpectrumRecord {
                label: manifest.groups[job.group].label.clone(),
                path: job.path,
                intensity,
            })
            .collect();
        report.files_loaded = records.len();

        check_uniform_length(&records)?;

        let mut rows = Vec::with_capacity(manifest.groups.len());
        for group in &manifest.groups {
            let members: Vec<&[f64]> = records
                .iter()
                .filter(|r| r.label == group.label)
                .map(|r| r.intensity.as_slice())
                .collect();
            if members.len() < self.options.replicate_size {
                report.short_groups.push(ShortGroup {
                    label: group.label.clone(),
                    found: members.len(),
                    expected: self.options.replicate_size,
                });
            }
            match mean_spectrum(&members) {
                Some(avg) => rows.push((group.label.clone(), avg)),
                None => report.empty_groups.push(group.label.clone()),
            }
        }

        let spectrum = AveragedSpectrum::from_rows(rows);
        tracing::info!(
            manifest = %manifest_path.display(),
            rows = spectrum.rows(),
            cols = spectrum.cols(),
            files = report.files_loaded,
            missing = report.missing.len(),
            elapsed_s = started.elapsed().as_secs_f64(),
            "spectra loaded"
        );
        if !report.short_groups.is_empty() {
            tracing::warn!(
                groups = report.short_groups.len(),
                "some groups have fewer replicates than expected"
            );
        }

        Ok(LoadedSpectra {
            source: manifest_path.to_path_buf(),
            spectrum,
            report,
        })
    }
}

fn check_uniform_length(records: &[SpectrumRecord]) -> SpectraResult<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let expected = first.intensity.len();
    match records.iter().find(|r| r.intensity.len() != expected) {
        Some(bad) => Err(SpectraError::DimensionMismatch {
            path: bad.path.clone(),
            expected,
            found: bad.intensity.len(),
        }),
        None => Ok(()),
    }
}

/// Read the intensity column of a semicolon-delimited sample file.
pub fn read_intensity(path: &Path, column: usize) -> SpectraResult<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| SpectraError::from_csv(path, e))?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SpectraError::from_csv(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let field = record.get(column).ok_or_else(|| {
            SpectraError::format(
                path,
                line,
                format!("expected at least {} columns, found {}", column + 1, record.len()),
            )
        })?;
        let value: f64 = field.trim().parse().map_err(|_| {
            SpectraError::format(path, line, format!("'{}' is not a number", field.trim()))
        })?;
        values.push(value);
    }

    if values.is_empty() {
        return Err(SpectraError::format(path, 0, "no data rows"));
    }
    Ok(values)
}
