//! Tag manifest: which sample files belong to which labeled replicate group.
//!
//! The manifest is a semicolon-delimited grid of strings. In the default
//! [`ManifestLayout::GroupPerRow`] layout each record is one group: the first
//! field is the label and the remaining fields are sample-file basenames.
//! [`ManifestLayout::GroupPerColumn`] reads the transposed grid (labels along
//! the first row, one group per column).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SpectraError, SpectraResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestLayout {
    #[default]
    GroupPerRow,
    GroupPerColumn,
}

/// One labeled replicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestGroup {
    pub label: String,
    /// Sample-file basenames (no directory, no extension), in manifest order.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagManifest {
    pub groups: Vec<ManifestGroup>,
}

impl TagManifest {
    pub fn read(path: &Path, layout: ManifestLayout) -> SpectraResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SpectraError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, layout, path)
    }

    /// Parse manifest text. `source` is only used in error messages.
    pub fn parse(text: &str, layout: ManifestLayout, source: &Path) -> SpectraResult<Self> {
        let grid = read_grid(text, source)?;
        let grid = match layout {
            ManifestLayout::GroupPerRow => grid,
            ManifestLayout::GroupPerColumn => transpose(grid),
        };

        let mut groups: Vec<ManifestGroup> = Vec::new();
        let mut by_label: HashMap<String, usize> = HashMap::new();

        for (line, mut cells) in grid {
            let label = cells.remove(0);
            if label.is_empty() {
                return Err(SpectraError::format(source, line, "group has no label"));
            }
            let members = cells.into_iter().filter(|c| !c.is_empty());

            // Repeated labels pool their members into the first group with that label.
            match by_label.get(&label) {
                Some(&idx) => groups[idx].members.extend(members),
                None => {
                    by_label.insert(label.clone(), groups.len());
                    groups.push(ManifestGroup {
                        label,
                        members: members.collect(),
                    });
                }
            }
        }

        Ok(Self { groups })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.label.as_str())
    }

    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Records as `(line, trimmed cells)`; rejects empty and ragged grids.
fn read_grid(text: &str, source: &Path) -> SpectraResult<Vec<(u64, Vec<String>)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    let mut width: Option<usize> = None;

    for record in reader.records() {
        let record = record.map_err(|e| SpectraError::from_csv(source, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        match width {
            None => width = Some(cells.len()),
            Some(w) if w != cells.len() => {
                return Err(SpectraError::format(
                    source,
                    line,
                    format!("expected {w} fields, found {}", cells.len()),
                ));
            }
            Some(_) => {}
        }
        grid.push((line, cells));
    }

    if grid.is_empty() {
        return Err(SpectraError::EmptyManifest {
            path: source.to_path_buf(),
        });
    }
    Ok(grid)
}

/// Columns become records; the reported line of a column is the first line of the grid.
fn transpose(grid: Vec<(u64, Vec<String>)>) -> Vec<(u64, Vec<String>)> {
    let first_line = grid.first().map(|(l, _)| *l).unwrap_or(0);
    let width = grid.first().map(|(_, c)| c.len()).unwrap_or(0);
    (0..width)
        .map(|col| {
            let cells = grid.iter().map(|(_, row)| row[col].clone()).collect();
            (first_line, cells)
        })
        .collect()
}
