use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use rand::seq::SliceRandom;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

/// Browser identities rotated per request to avoid trivial bot blocking.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.5 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36",
];

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_page_bytes: u64,
    pub max_image_bytes: u64,
    pub allowed_page_types: Vec<String>,
    pub accept_invalid_certs: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            redirect_limit: 5,
            max_page_bytes: 10 * 1024 * 1024,
            max_image_bytes: 64 * 1024 * 1024,
            allowed_page_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            accept_invalid_certs: true,
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve a page document into memory.
    async fn fetch_page(&self, url: &Url) -> Result<FetchOutput, FetchError>;

    /// Stream a resource into `dest`, returning the number of bytes written.
    ///
    /// `dest` is truncated first; on error it may hold a partial body.
    async fn download_to(&self, url: &Url, dest: &Path) -> Result<u64, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }

    fn is_page_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_page_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<FetchOutput, FetchError> {
        let max_bytes = self.settings.max_page_bytes;
        let response = self.send(url).await?;
        check_declared_length(&response, max_bytes)?;

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_page_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url,
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(FetchOutput { bytes, metadata })
    }

    async fn download_to(&self, url: &Url, dest: &Path) -> Result<u64, FetchError> {
        let max_bytes = self.settings.max_image_bytes;
        let response = self.send(url).await?;
        check_declared_length(&response, max_bytes)?;

        let mut file = tokio::fs::File::create(dest).await.map_err(map_io_error)?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(too_large(max_bytes, written));
            }
            file.write_all(&chunk).await.map_err(map_io_error)?;
        }
        file.flush().await.map_err(map_io_error)?;

        Ok(written)
    }
}

fn check_declared_length(response: &reqwest::Response, max_bytes: u64) -> Result<(), FetchError> {
    match response.content_length() {
        Some(len) if len > max_bytes => Err(too_large(max_bytes, len)),
        _ => Ok(()),
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_io_error(err: std::io::Error) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
