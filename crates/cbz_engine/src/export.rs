use std::path::{Path, PathBuf};

use cbz_core::RunStatistics;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("report path has no file name: {0:?}")]
    InvalidPath(PathBuf),
    #[error("failed to serialize statistics: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Atomically write the final run statistics as pretty-printed JSON.
pub fn write_stats_report(path: &Path, stats: &RunStatistics) -> Result<PathBuf, ExportError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ExportError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut content = serde_json::to_vec_pretty(stats)?;
    content.push(b'\n');
    let writer = AtomicFileWriter::new(dir);
    Ok(writer.write(filename, &content)?)
}
