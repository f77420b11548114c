use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Stage;

/// Per-page image counters, folded into [`RunStatistics`] once the page ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTally {
    pub expected_images: usize,
    pub downloaded_images: usize,
    pub failed_images: usize,
    pub failed_conversions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    NoImagesFound,
    NoValidImages,
    Packaging(String),
    Fatal(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoImagesFound => write!(f, "no images found"),
            FailureReason::NoValidImages => write!(f, "no valid images to package"),
            FailureReason::Packaging(msg) => write!(f, "packaging failed: {msg}"),
            FailureReason::Fatal(msg) => write!(f, "page failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Archived { path: PathBuf, asset_count: usize },
    /// Archive already present and skip-existing was requested.
    Skipped { path: PathBuf },
    Failed { stage: Stage, reason: FailureReason },
}

impl PageOutcome {
    pub fn final_stage(&self) -> Stage {
        match self {
            PageOutcome::Archived { .. } | PageOutcome::Skipped { .. } => Stage::Done,
            PageOutcome::Failed { .. } => Stage::Failed,
        }
    }
}

/// Everything the orchestrator learned about one source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub index: usize,
    pub url: String,
    pub title: String,
    pub tally: PageTally,
    pub outcome: PageOutcome,
}

/// Run-wide accumulator. Only grows; updated once per finished page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total_sources: usize,
    pub successful_archives: usize,
    pub skipped_sources: usize,
    pub failed_sources: usize,
    pub expected_images: usize,
    pub downloaded_images: usize,
    pub failed_images: usize,
    pub failed_conversions: usize,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a finished page into the totals and returns the updated accumulator.
    pub fn record(mut self, report: &PageReport) -> Self {
        self.total_sources += 1;
        match report.outcome {
            PageOutcome::Archived { .. } => self.successful_archives += 1,
            PageOutcome::Skipped { .. } => self.skipped_sources += 1,
            PageOutcome::Failed { .. } => self.failed_sources += 1,
        }
        let tally = report.tally;
        self.expected_images += tally.expected_images;
        self.downloaded_images += tally.downloaded_images;
        self.failed_images += tally.failed_images;
        self.failed_conversions += tally.failed_conversions;
        self
    }
}
