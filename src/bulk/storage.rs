use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::path::Path;

use super::batch::BatchReport;

/// Write a batch report as pretty JSON.
///
/// The file is replaced atomically, so a reader never sees a half-written
/// report.
pub fn save_report(path: &Path, report: &BatchReport) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, report).context("Failed to serialize batch report")?;

    file.commit()
        .with_context(|| format!("Failed to save batch report to {}", path.display()))?;

    Ok(())
}
