//! File outputs: chart image paths and table CSV.

use std::io::Write;
use std::path::{Path, PathBuf};

use vp_table::SampleTable;

use crate::error::AppResult;

/// Append `.png` unless the path already ends with it.
pub fn png_path(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    if path.to_string_lossy().ends_with(".png") {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(".png");
    PathBuf::from(raw)
}

/// Write `label,pc1,pc2` rows with a header line.
pub fn write_table_csv<W: Write>(table: &SampleTable, out: W) -> AppResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(["label", "pc1", "pc2"])?;
    for row in table.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_table_csv(table: &SampleTable, path: &Path) -> AppResult<()> {
    let file = std::fs::File::create(path)?;
    write_table_csv(table, file)?;
    tracing::info!(path = %path.display(), rows = table.len(), "table exported");
    Ok(())
}
