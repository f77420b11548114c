use std::collections::HashSet;

use engine_logging::engine_debug;
use scraper::{Html, Selector};
use url::Url;

use crate::decode::decode_page;
use crate::events::{EventSink, PipelineEvent};
use crate::fetch::Fetcher;
use crate::filename::sanitize_title;
use crate::{ExtractionResult, FetchError};

/// Title used when a page has no usable `<title>` or could not be fetched.
pub const UNKNOWN_TITLE: &str = "unknown_title";

/// `<img>` attributes checked in order; lazy-loading pages keep the real URL
/// in one of the `data-*` attributes.
const IMG_SOURCE_ATTRS: [&str; 3] = ["src", "data-src", "data-original"];

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid page url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("page fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, page_url: &Url) -> ExtractionResult;
}

/// Collects image references from `<img>` (including lazy-load attributes)
/// and `<source srcset>` elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRefExtractor;

impl Extractor for ImageRefExtractor {
    fn extract(&self, html: &str, page_url: &Url) -> ExtractionResult {
        let doc = Html::parse_document(html);
        let mut refs = RefCollector::default();

        if let Ok(sel) = Selector::parse("img") {
            for img in doc.select(&sel) {
                let candidate = IMG_SOURCE_ATTRS
                    .iter()
                    .filter_map(|attr| img.value().attr(attr))
                    .map(str::trim)
                    .find(|value| !value.is_empty() && !is_inline_data(value));
                if let Some(candidate) = candidate {
                    refs.push(candidate, page_url);
                }
            }
        }

        if let Ok(sel) = Selector::parse("source") {
            for source in doc.select(&sel) {
                let candidate = source
                    .value()
                    .attr("srcset")
                    .filter(|srcset| !is_inline_data(srcset.trim_start()))
                    .and_then(last_srcset_candidate);
                if let Some(candidate) = candidate {
                    refs.push(candidate, page_url);
                }
            }
        }

        ExtractionResult {
            image_refs: refs.into_urls(),
            title: page_title(&doc),
        }
    }
}

/// Fetch `page_url` and extract its image references.
///
/// Never fails: any fetch or URL error is reported through `sink` and the page
/// degrades to no images with the placeholder title.
pub async fn extract_page(
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    page_url: &str,
    sink: &dyn EventSink,
) -> ExtractionResult {
    match try_extract(fetcher, extractor, page_url).await {
        Ok(result) => result,
        Err(err) => {
            sink.emit(PipelineEvent::ExtractionFailed {
                url: page_url.to_string(),
                message: err.to_string(),
            });
            ExtractionResult::unknown()
        }
    }
}

async fn try_extract(
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
    page_url: &str,
) -> Result<ExtractionResult, ExtractError> {
    let url = Url::parse(page_url)?;
    let output = fetcher.fetch_page(&url).await?;
    let page = decode_page(
        &output.bytes,
        output.metadata.content_type.as_deref(),
        Some(&url),
    );
    if page.lossy {
        engine_debug!("Page {} decoded lossily as {}", page_url, page.encoding_label);
    }
    Ok(extractor.extract(&page.html, &url))
}

/// The last non-empty entry of a srcset wins; its URL is the first token.
fn last_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .map(str::trim)
        .rfind(|entry| !entry.is_empty())
        .and_then(|entry| entry.split_whitespace().next())
}

fn is_inline_data(value: &str) -> bool {
    value
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
}

fn page_title(doc: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .map(|t| sanitize_title(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Resolved, de-duplicated URLs in first-seen order.
#[derive(Default)]
struct RefCollector {
    seen: HashSet<Url>,
    urls: Vec<Url>,
}

impl RefCollector {
    fn push(&mut self, candidate: &str, base: &Url) {
        let Ok(url) = base.join(candidate) else {
            engine_debug!("Skipping unresolvable image reference {:?}", candidate);
            return;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return;
        }
        if self.seen.insert(url.clone()) {
            self.urls.push(url);
        }
    }

    fn into_urls(self) -> Vec<Url> {
        self.urls
    }
}

#[cfg(test)]
mod tests {
    use super::{is_inline_data, last_srcset_candidate};

    #[test]
    fn srcset_takes_last_candidate() {
        assert_eq!(
            last_srcset_candidate("a.jpg 1x, b.jpg 2x, c.jpg 3x"),
            Some("c.jpg")
        );
        assert_eq!(last_srcset_candidate("small.jpg 480w,large.jpg 1080w"), Some("large.jpg"));
        assert_eq!(last_srcset_candidate("only.jpg"), Some("only.jpg"));
    }

    #[test]
    fn srcset_ignores_trailing_comma() {
        assert_eq!(last_srcset_candidate("a.jpg 1x, b.jpg 2x,"), Some("b.jpg"));
        assert_eq!(last_srcset_candidate(" , "), None);
    }

    #[test]
    fn inline_data_detection() {
        assert!(is_inline_data("data:image/png;base64,AAAA"));
        assert!(is_inline_data("DATA:image/gif;base64,AAAA"));
        assert!(!is_inline_data("/data/image.png"));
        assert!(!is_inline_data("dat"));
    }
}
