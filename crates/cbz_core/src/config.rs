use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_QUALITY: u8 = 95;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Tunables for one archiving run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum in-flight image downloads per page.
    pub workers: usize,
    /// Download attempts per image, in total.
    pub retries: u32,
    /// JPEG quality, 1..=100.
    pub quality: u8,
    /// Skip a page whose archive already exists.
    pub skip_existing: bool,
    /// Where archives and working directories are created.
    pub output_dir: PathBuf,
    /// Pause between two download attempts of the same image.
    pub retry_delay: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            retries: DEFAULT_RETRIES,
            quality: DEFAULT_QUALITY,
            skip_existing: false,
            output_dir: PathBuf::from("."),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("worker count must be greater than zero")]
    ZeroWorkers,
    #[error("quality must be between 1 and 100, got {0}")]
    QualityOutOfRange(u8),
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::QualityOutOfRange(self.quality));
        }
        Ok(())
    }
}
