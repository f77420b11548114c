use std::io;
use std::path::Path;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};

use crate::fetch::Fetcher;
use crate::{DownloadFailure, DownloadJob, FailureKind, FetchError, RawAsset};

/// Download `job` into `dest`, making at most `job.retries_allowed` attempts.
///
/// Attempts are separated by `delay`. Intermediate failures are only logged at
/// debug level; reporting the exhausted failure is up to the caller. When every
/// attempt fails the partial file at `dest` is removed.
pub async fn download_with_retry(
    fetcher: &dyn Fetcher,
    job: &DownloadJob,
    dest: &Path,
    delay: Duration,
) -> Result<RawAsset, DownloadFailure> {
    let attempts = job.retries_allowed;
    let mut last_error = None;

    for attempt in 1..=attempts {
        match fetcher.download_to(&job.url, dest).await {
            Ok(byte_len) => {
                if attempt > 1 {
                    engine_debug!(
                        "Image {} downloaded on attempt {}/{}",
                        job.sequence,
                        attempt,
                        attempts
                    );
                }
                return Ok(RawAsset {
                    sequence: job.sequence,
                    path: dest.to_path_buf(),
                    byte_len,
                });
            }
            Err(err) => {
                engine_debug!(
                    "Image {} attempt {}/{} failed ({}): {}",
                    job.sequence,
                    attempt,
                    attempts,
                    job.url,
                    err
                );
                last_error = Some(err);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    remove_partial(dest).await;
    Err(DownloadFailure {
        sequence: job.sequence,
        url: job.url.clone(),
        attempts,
        error: last_error
            .unwrap_or_else(|| FetchError::new(FailureKind::NoAttempts, "retry budget is zero")),
    })
}

async fn remove_partial(dest: &Path) {
    match tokio::fs::remove_file(dest).await {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => engine_warn!("Failed to remove partial download {:?}: {}", dest, err),
    }
}
