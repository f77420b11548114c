use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::filename::archive_stem;
use crate::persist::{ensure_output_dir, PersistError};
use crate::{ArchiveResult, NormalizedAsset};

pub const ARCHIVE_EXTENSION: &str = "cbz";

const TEMP_PREFIX: &str = ".cbz-";

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("no assets to package")]
    Empty,
    #[error("output directory: {0}")]
    Output(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("failed to move archive into place: {0}")]
    Rename(#[from] tempfile::PersistError),
}

/// Final location of the archive for a page titled `title`.
pub fn archive_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{}.{ARCHIVE_EXTENSION}", archive_stem(title)))
}

/// Write `assets` into `<output_dir>/<stem>.cbz`, ordered by sequence number.
///
/// Entries are stored uncompressed. The archive is assembled in a temporary
/// `.zip` next to the target and renamed over it only once complete; on any
/// error the temporary file is deleted and an existing archive is untouched.
/// The temporary name does not depend on the title, so it is never longer
/// than the final one.
pub fn package(
    mut assets: Vec<NormalizedAsset>,
    base_name: &str,
    output_dir: &Path,
) -> Result<ArchiveResult, PackageError> {
    if assets.is_empty() {
        return Err(PackageError::Empty);
    }
    assets.sort_by_key(|asset| asset.sequence);
    ensure_output_dir(output_dir)?;

    let target = archive_path(output_dir, base_name);
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".zip")
        .tempfile_in(output_dir)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(tmp.as_file_mut());
    for asset in &assets {
        engine_debug!("Adding {:?} as {}", asset.path, asset.entry_name);
        writer.start_file(asset.entry_name.as_str(), options)?;
        let mut source = File::open(&asset.path)?;
        io::copy(&mut source, &mut writer)?;
    }
    writer.finish()?.flush()?;
    tmp.as_file().sync_all()?;

    tmp.persist(&target)?;

    Ok(ArchiveResult {
        path: target,
        asset_count: assets.len(),
    })
}
