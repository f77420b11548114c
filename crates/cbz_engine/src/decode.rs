use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

/// Decode a fetched page into UTF-8.
///
/// Encoding is picked by BOM, then the `Content-Type` charset, then a
/// `chardetng` guess hinted with the page's top-level domain. Malformed input
/// is decoded lossily; image references are still usable from such pages.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>, page_url: Option<&Url>) -> DecodedPage {
    let encoding = detect_encoding(bytes, content_type, page_url);
    let (text, used, lossy) = encoding.decode(bytes);
    DecodedPage {
        html: text.into_owned(),
        encoding_label: used.name().to_string(),
        lossy,
    }
}

fn detect_encoding(
    bytes: &[u8],
    content_type: Option<&str>,
    page_url: Option<&Url>,
) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    let tld = page_url
        .and_then(Url::domain)
        .and_then(|domain| domain.rsplit('.').next())
        .filter(|tld| tld.bytes().all(|b| b.is_ascii_lowercase()));
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(tld.map(str::as_bytes), true)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_page, extract_charset};

    #[test]
    fn charset_parameter_is_case_insensitive() {
        assert_eq!(
            extract_charset("text/html; Charset=\"Shift_JIS\""),
            Some("Shift_JIS".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn header_charset_wins_over_detection() {
        // "é" in windows-1252
        let page = decode_page(b"<title>caf\xe9</title>", Some("text/html; charset=windows-1252"), None);
        assert_eq!(page.html, "<title>café</title>");
        assert_eq!(page.encoding_label, "windows-1252");
        assert!(!page.lossy);
    }

    #[test]
    fn bom_selects_utf8() {
        let page = decode_page(b"\xef\xbb\xbf<p>ok</p>", Some("text/html; charset=iso-8859-1"), None);
        assert_eq!(page.encoding_label, "UTF-8");
        assert_eq!(page.html, "<p>ok</p>");
    }

    #[test]
    fn malformed_utf8_decodes_lossily() {
        let page = decode_page(b"<p>\xff\xfe broken</p>", Some("text/html; charset=utf-8"), None);
        assert!(page.lossy);
        assert!(page.html.contains("broken"));
    }
}
