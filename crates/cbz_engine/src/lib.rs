//! Archiver engine: page extraction, image download, normalization and packaging.
mod decode;
mod events;
mod export;
mod extract;
mod fetch;
mod filename;
mod normalize;
mod package;
mod persist;
mod pipeline;
mod retry;
mod types;

pub use decode::{decode_page, DecodedPage};
pub use events::{ChannelSink, EventSink, LogSink, PipelineEvent};
pub use export::{write_stats_report, ExportError};
pub use extract::{extract_page, ExtractError, Extractor, ImageRefExtractor, UNKNOWN_TITLE};
pub use fetch::{random_user_agent, FetchSettings, Fetcher, ReqwestFetcher, USER_AGENTS};
pub use filename::{archive_stem, sanitize_title, MAX_TITLE_CHARS};
pub use normalize::{encode_jpeg, entry_name, flatten_onto_white, normalize, ConvertError};
pub use package::{archive_path, package, PackageError, ARCHIVE_EXTENSION};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, WorkDir};
pub use pipeline::{PageError, Pipeline};
pub use retry::download_with_retry;
pub use types::{
    ArchiveResult, DownloadFailure, DownloadJob, ExtractionResult, FailureKind, FetchError,
    FetchMetadata, FetchOutput, NormalizedAsset, RawAsset,
};
