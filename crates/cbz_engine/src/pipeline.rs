use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;

use cbz_core::{
    pad_width, FailureReason, PageOutcome, PageReport, PageTally, RunConfig, RunStatistics,
    SequenceNumber, Stage,
};
use engine_logging::engine_debug;
use futures_util::stream::{self, StreamExt};
use futures_util::FutureExt;

use crate::events::{EventSink, PipelineEvent};
use crate::extract::{extract_page, Extractor, ImageRefExtractor};
use crate::fetch::Fetcher;
use crate::normalize::{normalize, ConvertError};
use crate::package::{archive_path, package};
use crate::persist::{PersistError, WorkDir};
use crate::retry::download_with_retry;
use crate::{DownloadFailure, DownloadJob, NormalizedAsset, RawAsset};

/// Conditions that abort a single page outside the per-image failure paths.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("working storage: {0}")]
    Storage(#[from] PersistError),
}

/// Drives source pages one at a time through extraction, download,
/// normalization and packaging.
pub struct Pipeline {
    config: RunConfig,
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    sink: Arc<dyn EventSink>,
}

impl Pipeline {
    pub fn new(config: RunConfig, fetcher: Arc<dyn Fetcher>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            fetcher,
            extractor: Box::new(ImageRefExtractor),
            sink,
        }
    }

    /// Process every source in order. A failing source never stops the run.
    pub async fn run(&self, urls: &[String]) -> RunStatistics {
        let total = urls.len();
        let mut stats = RunStatistics::new();
        for (i, url) in urls.iter().enumerate() {
            stats = self.process_source(stats, i + 1, total, url).await;
        }
        stats
    }

    /// Process one source and fold its report into `stats`.
    pub async fn process_source(
        &self,
        stats: RunStatistics,
        index: usize,
        total: usize,
        url: &str,
    ) -> RunStatistics {
        self.sink.emit(PipelineEvent::PageStarted {
            index,
            total,
            url: url.to_string(),
        });

        let report = match AssertUnwindSafe(self.process_page(index, url))
            .catch_unwind()
            .await
        {
            Ok(report) => report,
            Err(panic) => self.recover_from_panic(index, url, panic_message(panic.as_ref())),
        };
        match &report.outcome {
            PageOutcome::Archived { path, asset_count } => {
                self.sink.emit(PipelineEvent::ArchiveWritten {
                    index,
                    path: path.clone(),
                    asset_count: *asset_count,
                });
            }
            PageOutcome::Skipped { path } => {
                self.sink.emit(PipelineEvent::SkippedExisting {
                    index,
                    path: path.clone(),
                });
            }
            PageOutcome::Failed { reason, .. } => {
                self.sink.emit(PipelineEvent::PageFailed {
                    index,
                    url: url.to_string(),
                    reason: reason.clone(),
                });
            }
        }
        stats.record(&report)
    }

    async fn process_page(&self, index: usize, url: &str) -> PageReport {
        let mut page = PageRun::new(index, url);
        let mut work_dir = None;

        let outcome = match self.drive(&mut page, &mut work_dir).await {
            Ok(outcome) => {
                if let Some(work) = work_dir {
                    match outcome {
                        PageOutcome::Archived { .. } => self.discard(index, work),
                        _ => self.sink.emit(PipelineEvent::WorkDirRetained {
                            index,
                            path: work.retain(),
                        }),
                    }
                }
                outcome
            }
            Err(err) => {
                if let Some(work) = work_dir {
                    self.discard(index, work);
                }
                PageOutcome::Failed {
                    stage: page.stage,
                    reason: FailureReason::Fatal(err.to_string()),
                }
            }
        };

        page.enter(outcome.final_stage());
        page.into_report(outcome)
    }

    /// A panic unwound through the page; its work dir was never handed back.
    fn recover_from_panic(&self, index: usize, url: &str, message: String) -> PageReport {
        if let Some(work) = WorkDir::locate(&self.config.output_dir, index) {
            self.discard(index, work);
        }
        let mut page = PageRun::new(index, url);
        let outcome = page.fail(FailureReason::Fatal(format!("panicked: {message}")));
        page.enter(Stage::Failed);
        page.into_report(outcome)
    }

    async fn drive(
        &self,
        page: &mut PageRun,
        work_slot: &mut Option<WorkDir>,
    ) -> Result<PageOutcome, PageError> {
        page.enter(Stage::Extracting);
        let extraction = extract_page(
            self.fetcher.as_ref(),
            self.extractor.as_ref(),
            &page.url,
            self.sink.as_ref(),
        )
        .await;
        page.title = extraction.title;

        // The archive name depends on the title, so the skip check has to
        // wait for extraction.
        let target = archive_path(&self.config.output_dir, &page.title);
        if self.config.skip_existing && target.exists() {
            return Ok(PageOutcome::Skipped { path: target });
        }

        page.enter(Stage::Downloading);
        let refs = extraction.image_refs;
        page.tally.expected_images = refs.len();
        self.sink.emit(PipelineEvent::ImagesFound {
            index: page.index,
            count: refs.len(),
        });
        if refs.is_empty() {
            return Ok(page.fail(FailureReason::NoImagesFound));
        }

        let work = &*work_slot.insert(WorkDir::acquire(&self.config.output_dir, page.index)?);
        let width = pad_width(refs.len());
        let jobs = refs
            .into_iter()
            .enumerate()
            .map(|(i, url)| DownloadJob {
                sequence: SequenceNumber::from_index(i),
                url,
                retries_allowed: self.config.retries,
            })
            .collect();
        let (raw_assets, failures) = self.download_all(page.index, jobs, work, width).await;
        page.tally.downloaded_images = raw_assets.len();
        page.tally.failed_images = failures.len();

        page.enter(Stage::Converting);
        let (assets, failed_conversions) =
            self.convert_all(page.index, raw_assets, work.path(), width).await;
        page.tally.failed_conversions = failed_conversions;
        if assets.is_empty() {
            return Ok(page.fail(FailureReason::NoValidImages));
        }

        page.enter(Stage::Packaging);
        match package(assets, &page.title, &self.config.output_dir) {
            Ok(archive) => {
                Ok(PageOutcome::Archived {
                    path: archive.path,
                    asset_count: archive.asset_count,
                })
            }
            Err(err) => Ok(page.fail(FailureReason::Packaging(err.to_string()))),
        }
    }

    /// Run every download with at most `workers` in flight. Results are
    /// gathered here, in completion order, before anything else sees them.
    async fn download_all(
        &self,
        index: usize,
        jobs: Vec<DownloadJob>,
        work: &WorkDir,
        width: usize,
    ) -> (Vec<RawAsset>, Vec<DownloadFailure>) {
        let total = jobs.len();
        let fetcher = self.fetcher.as_ref();
        let delay = self.config.retry_delay;

        let mut downloads = stream::iter(jobs)
            .map(move |job| async move {
                let dest = work.raw_path(job.sequence, width);
                download_with_retry(fetcher, &job, &dest, delay).await
            })
            .buffer_unordered(self.config.workers);

        let mut raw_assets = Vec::with_capacity(total);
        let mut failures = Vec::new();
        while let Some(result) = downloads.next().await {
            match result {
                Ok(raw) => raw_assets.push(raw),
                Err(failure) => {
                    self.sink.emit(PipelineEvent::DownloadFailed {
                        index,
                        sequence: failure.sequence,
                        url: failure.url.to_string(),
                        attempts: failure.attempts,
                        message: failure.error.to_string(),
                    });
                    failures.push(failure);
                }
            }
            self.sink.emit(PipelineEvent::DownloadProgress {
                index,
                completed: raw_assets.len() + failures.len(),
                total,
            });
        }
        (raw_assets, failures)
    }

    /// Normalize downloads on the blocking pool; one failure never affects another.
    async fn convert_all(
        &self,
        index: usize,
        raw_assets: Vec<RawAsset>,
        dir: &Path,
        width: usize,
    ) -> (Vec<NormalizedAsset>, usize) {
        let quality = self.config.quality;

        let mut conversions = stream::iter(raw_assets)
            .map(move |raw| {
                let dir = dir.to_path_buf();
                async move {
                    let sequence = raw.sequence;
                    let joined =
                        tokio::task::spawn_blocking(move || normalize(raw, quality, width, &dir))
                            .await;
                    let result = joined.unwrap_or_else(|err| Err(ConvertError::Task(err.to_string())));
                    (sequence, result)
                }
            })
            .buffer_unordered(self.config.workers);

        let mut assets = Vec::new();
        let mut failed = 0;
        while let Some((sequence, result)) = conversions.next().await {
            match result {
                Ok(asset) => assets.push(asset),
                Err(err) => {
                    failed += 1;
                    self.sink.emit(PipelineEvent::ConvertFailed {
                        index,
                        sequence,
                        message: err.to_string(),
                    });
                }
            }
        }
        (assets, failed)
    }

    fn discard(&self, index: usize, work: WorkDir) {
        match work.discard() {
            Ok(path) => self.sink.emit(PipelineEvent::WorkDirRemoved { index, path }),
            Err((path, err)) => self.sink.emit(PipelineEvent::CleanupFailed {
                path,
                message: err.to_string(),
            }),
        }
    }
}

/// Mutable bookkeeping for the page currently being processed.
struct PageRun {
    index: usize,
    url: String,
    title: String,
    stage: Stage,
    tally: PageTally,
}

impl PageRun {
    fn new(index: usize, url: &str) -> Self {
        Self {
            index,
            url: url.to_string(),
            title: String::new(),
            stage: Stage::Pending,
            tally: PageTally::default(),
        }
    }

    fn enter(&mut self, stage: Stage) {
        engine_debug!("Page {}: {:?} -> {:?}", self.index, self.stage, stage);
        self.stage = stage;
    }

    /// Failure at the current stage; the caller moves the page to `Failed`.
    fn fail(&self, reason: FailureReason) -> PageOutcome {
        PageOutcome::Failed {
            stage: self.stage,
            reason,
        }
    }

    fn into_report(self, outcome: PageOutcome) -> PageReport {
        PageReport {
            index: self.index,
            url: self.url,
            title: self.title,
            tally: self.tally,
            outcome,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
