use std::fmt;
use std::path::PathBuf;

use cbz_core::SequenceNumber;
use url::Url;

use crate::extract::UNKNOWN_TITLE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    /// Retry budget of zero: the download was never attempted.
    NoAttempts,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::NoAttempts => write!(f, "no download attempts allowed"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Image references found on a page plus the sanitized page title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Absolute, unique, in first-seen order.
    pub image_refs: Vec<Url>,
    pub title: String,
}

impl ExtractionResult {
    /// What a page degrades to when it cannot be fetched or parsed.
    pub fn unknown() -> Self {
        Self {
            image_refs: Vec::new(),
            title: UNKNOWN_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub sequence: SequenceNumber,
    pub url: Url,
    pub retries_allowed: u32,
}

/// Downloaded, not yet decoded bytes in working storage.
#[derive(Debug, PartialEq, Eq)]
pub struct RawAsset {
    pub sequence: SequenceNumber,
    pub path: PathBuf,
    pub byte_len: u64,
}

/// A JPEG in working storage, ready to be packaged under `entry_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAsset {
    pub sequence: SequenceNumber,
    pub entry_name: String,
    pub path: PathBuf,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResult {
    pub path: PathBuf,
    pub asset_count: usize,
}

/// An image whose retry budget ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    pub sequence: SequenceNumber,
    pub url: Url,
    pub attempts: u32,
    pub error: FetchError,
}
