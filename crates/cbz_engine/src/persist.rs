use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cbz_core::SequenceNumber;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Per-source scratch directory (`temp_001`, `temp_002`, ...).
///
/// Nothing is removed implicitly: callers either [`discard`](Self::discard) it
/// after a successful archive or [`retain`](Self::retain) it for inspection.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    pub fn name_for(index: usize) -> String {
        format!("temp_{index:03}")
    }

    pub fn acquire(root: &Path, index: usize) -> Result<Self, PersistError> {
        ensure_output_dir(root)?;
        let path = root.join(Self::name_for(index));
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    /// Reclaim the directory a page left behind without handing it over,
    /// if there is one.
    pub fn locate(root: &Path, index: usize) -> Option<Self> {
        let path = root.join(Self::name_for(index));
        path.is_dir().then_some(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the raw download for `sequence` is streamed to.
    pub fn raw_path(&self, sequence: SequenceNumber, pad_width: usize) -> PathBuf {
        self.path.join(format!("raw_{}", sequence.padded(pad_width)))
    }

    pub fn discard(self) -> Result<PathBuf, (PathBuf, io::Error)> {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(self.path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(self.path),
            Err(err) => Err((self.path, err)),
        }
    }

    pub fn retain(self) -> PathBuf {
        self.path
    }
}
