// ABOUTME: Decodes raw HTML bytes to text using charset hints or statistical detection.
// ABOUTME: Used for saved pages read from disk and for renderer payloads delivered as bytes.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// How far into a document to look for a `<meta charset>` declaration.
const META_SNIFF_LIMIT: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-zA-Z0-9_\-:.]+)"#).unwrap()
});

/// Decode HTML bytes. An explicit content-type hint wins, then a `<meta>`
/// charset near the top of the document, then chardetng's guess.
pub fn decode_html(body: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(extract_charset)
        .or_else(|| sniff_meta_charset(body));
    if let Some(label) = declared {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract the charset value from a Content-Type style string.
pub fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        let charset = part.trim().strip_prefix("charset=")?;
        let charset = charset.trim_matches('"').trim_matches('\'');
        (!charset.is_empty()).then(|| charset.to_string())
    })
}

fn sniff_meta_charset(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(META_SNIFF_LIMIT)];
    let caps = META_CHARSET_RE.captures(head)?;
    let label = caps.get(1)?.as_bytes();
    Some(String::from_utf8_lossy(label).to_lowercase())
}

/// Read and decode a saved HTML page.
pub fn read_html_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_html(&bytes, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extract_charset_variants() {
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\""),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn header_hint_decodes_latin1() {
        let body = b"<p>caf\xe9</p>";
        assert_eq!(decode_html(body, Some("text/html; charset=iso-8859-1")), "<p>café</p>");
    }

    #[test]
    fn meta_charset_is_honoured() {
        let body = b"<html><head><meta charset=\"windows-1252\"></head><body>\x93quoted\x94</body></html>";
        let text = decode_html(body, None);
        assert!(text.contains("\u{201c}quoted\u{201d}"));
    }

    #[test]
    fn utf8_passes_through() {
        let body = "<p>Zürich, Genève</p>".as_bytes();
        assert_eq!(decode_html(body, None), "<p>Zürich, Genève</p>");
    }

    #[test]
    fn reads_files_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("<p>Olá</p>".as_bytes()).unwrap();
        assert_eq!(read_html_file(file.path()).unwrap(), "<p>Olá</p>");
    }
}
