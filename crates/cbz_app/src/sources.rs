use std::io;
use std::path::{Path, PathBuf};

use cbz_core::parse_url_list;

#[derive(Debug, thiserror::Error)]
pub enum UrlListError {
    #[error("cannot read URL list {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("URL list {0:?} contains no URLs")]
    Empty(PathBuf),
}

/// Read the URL list, refusing a file that names no source at all.
pub fn load_url_list(path: &Path) -> Result<Vec<String>, UrlListError> {
    let raw = std::fs::read_to_string(path).map_err(|source| UrlListError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = parse_url_list(&raw);
    if urls.is_empty() {
        return Err(UrlListError::Empty(path.to_path_buf()));
    }
    Ok(urls)
}
