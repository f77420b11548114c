use std::path::PathBuf;
use std::sync::mpsc;

use cbz_core::{FailureReason, SequenceNumber};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

/// Progress and failure notifications produced while processing sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    PageStarted {
        index: usize,
        total: usize,
        url: String,
    },
    ExtractionFailed {
        url: String,
        message: String,
    },
    ImagesFound {
        index: usize,
        count: usize,
    },
    SkippedExisting {
        index: usize,
        path: PathBuf,
    },
    DownloadProgress {
        index: usize,
        completed: usize,
        total: usize,
    },
    DownloadFailed {
        index: usize,
        sequence: SequenceNumber,
        url: String,
        attempts: u32,
        message: String,
    },
    ConvertFailed {
        index: usize,
        sequence: SequenceNumber,
        message: String,
    },
    ArchiveWritten {
        index: usize,
        path: PathBuf,
        asset_count: usize,
    },
    PageFailed {
        index: usize,
        url: String,
        reason: FailureReason,
    },
    WorkDirRetained {
        index: usize,
        path: PathBuf,
    },
    WorkDirRemoved {
        index: usize,
        path: PathBuf,
    },
    CleanupFailed {
        path: PathBuf,
        message: String,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Forwards events to the global logger; error-level lines end up in the error log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::PageStarted { index, total, url } => {
                engine_info!("===== Processing {}/{}: {} =====", index, total, url);
            }
            PipelineEvent::ExtractionFailed { url, message } => {
                engine_error!("Failed to extract image links ({}): {}", url, message);
            }
            PipelineEvent::ImagesFound { index, count } => {
                engine_info!("Page {}: found {} images", index, count);
            }
            PipelineEvent::SkippedExisting { index, path } => {
                engine_info!("Page {}: archive exists, skipping {:?}", index, path);
            }
            PipelineEvent::DownloadProgress {
                index,
                completed,
                total,
            } => {
                engine_debug!("Page {}: downloads {}/{}", index, completed, total);
            }
            PipelineEvent::DownloadFailed {
                index,
                sequence,
                url,
                attempts,
                message,
            } => {
                engine_error!(
                    "Page {} image {}: download failed ({}) after {} attempts: {}",
                    index,
                    sequence,
                    url,
                    attempts,
                    message
                );
            }
            PipelineEvent::ConvertFailed {
                index,
                sequence,
                message,
            } => {
                engine_error!("Page {} image {}: conversion failed: {}", index, sequence, message);
            }
            PipelineEvent::ArchiveWritten {
                index,
                path,
                asset_count,
            } => {
                engine_info!("Page {}: wrote {:?} ({} images)", index, path, asset_count);
            }
            PipelineEvent::PageFailed { index, url, reason } => match reason {
                FailureReason::NoImagesFound | FailureReason::NoValidImages => {
                    engine_warn!("Page {} ({}): {}", index, url, reason);
                }
                FailureReason::Packaging(_) | FailureReason::Fatal(_) => {
                    engine_error!("Page {} ({}): {}", index, url, reason);
                }
            },
            PipelineEvent::WorkDirRetained { index, path } => {
                engine_warn!("Page {}: keeping working directory {:?}", index, path);
            }
            PipelineEvent::WorkDirRemoved { index, path } => {
                engine_debug!("Page {}: removed working directory {:?}", index, path);
            }
            PipelineEvent::CleanupFailed { path, message } => {
                engine_error!("Failed to remove working directory {:?}: {}", path, message);
            }
        }
    }
}

/// Sends events to another thread, e.g. a progress display.
pub struct ChannelSink {
    tx: mpsc::Sender<PipelineEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<PipelineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }
}
