use crate::extract::UNKNOWN_TITLE;

/// Longest title kept, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Replace filesystem-illegal characters with `_` and cap the length.
///
/// Illegal: `/ \ : * ? " < > |` and ASCII control characters.
pub fn sanitize_title(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// File stem for a page's archive: sanitized title with spaces replaced.
pub fn archive_stem(title: &str) -> String {
    let mut stem = sanitize_title(title).replace(' ', "_");
    if stem.is_empty() {
        stem = UNKNOWN_TITLE.to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
