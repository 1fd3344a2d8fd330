//! MIME part traversal for Gmail message payloads
//!
//! Locates readable bodies and attachments inside the nested part tree
//! returned by `messages.get?format=full`. Everything here is pure except
//! attachment fetching, which goes through [`AttachmentSource`].

use std::fmt;

use async_trait::async_trait;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::Result;
use crate::format::format_size;
use crate::gmail::types::MessagePart;

/// Returned by [`resolve_body`] when neither a plain nor an HTML body exists
pub const NO_READABLE_CONTENT: &str = "No readable text content found.";

/// Preview for PDFs whose bytes contain no printable text
pub const PDF_BINARY_PLACEHOLDER: &str = "PDF content (binary - use PDF reader)";

const LENIENT_BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64url data best-effort
///
/// Characters outside the alphabet are dropped, standard-alphabet `+` and
/// `/` are accepted, and a dangling final character is ignored.
pub fn decode_base64url_lossy(data: &str) -> Vec<u8> {
    let mut cleaned: String = data
        .chars()
        .filter_map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' => Some(c),
            '+' => Some('-'),
            '/' => Some('_'),
            _ => None,
        })
        .collect();

    if cleaned.len() % 4 == 1 {
        cleaned.pop();
    }

    LENIENT_BASE64URL.decode(cleaned).unwrap_or_default()
}

/// Decode UTF-8, dropping invalid byte sequences
pub fn decode_utf8_ignore(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match err.error_len() {
                    Some(len) => bytes = &rest[len..],
                    None => return out,
                }
            }
        }
    }
}

/// Raw body of the first part (pre-order, root first) with this exact
/// content type that carries body data
pub fn find_first<'a>(root: &'a MessagePart, content_type: &str) -> Option<&'a str> {
    if root.mime_type() == content_type {
        if let Some(data) = root.body_data() {
            return Some(data);
        }
    }
    root.parts
        .iter()
        .find_map(|part| find_first(part, content_type))
}

/// Best readable text of a message
///
/// Prefers `text/plain` verbatim, then `text/html` reduced to plain text,
/// which may be empty for markup-only bodies.
pub fn resolve_body(root: &MessagePart) -> String {
    if let Some(text) = decoded_body(root, "text/plain") {
        return text;
    }

    if let Some(html) = decoded_body(root, "text/html") {
        return html_to_text(&html);
    }

    NO_READABLE_CONTENT.to_string()
}

fn decoded_body(root: &MessagePart, content_type: &str) -> Option<String> {
    find_first(root, content_type)
        .map(|data| decode_utf8_ignore(&decode_base64url_lossy(data)))
        .filter(|text| !text.is_empty())
}

/// Reduce HTML to a single line of text
///
/// Tags are removed, entities decoded and whitespace runs collapsed.
pub fn html_to_text(html: &str) -> String {
    let stripped = strip_tags(html);
    let unescaped = decode_entities(&stripped);
    unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `<...>` tags, matching each `<` with the nearest `>` on the same line
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let line_end = after.find('\n').unwrap_or(after.len());
        match after[..line_end].find('>') {
            Some(end) => rest = &after[end + 1..],
            None => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Named references that also decode without a trailing `;`
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY",
    "Ccedil", "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc",
    "Igrave", "Iuml", "LT", "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash",
    "Otilde", "Ouml", "QUOT", "REG", "THORN", "Uacute", "Ucirc", "Ugrave", "Uuml",
    "Yacute", "aacute", "acirc", "acute", "aelig", "agrave", "amp", "aring",
    "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren", "deg",
    "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14",
    "frac34", "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo",
    "lt", "macr", "micro", "middot", "nbsp", "not", "ntilde", "oacute", "ocirc",
    "ograve", "ordf", "ordm", "oslash", "otilde", "ouml", "para", "plusmn", "pound",
    "quot", "raquo", "reg", "sect", "shy", "sup1", "sup2", "sup3", "szlig", "thorn",
    "times", "uacute", "ucirc", "ugrave", "uml", "uuml", "yacute", "yen", "yuml",
];

/// Windows-1252 characters for numeric references in 0x80..=0x9F
const CP1252_C1: [char; 32] = [
    '\u{20ac}', '\u{81}', '\u{201a}', '\u{192}', '\u{201e}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2c6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8d}', '\u{17d}', '\u{8f}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2dc}', '\u{2122}', '\u{161}', '\u{203a}', '\u{153}', '\u{9d}', '\u{17e}', '\u{178}',
];

/// Decode character references the way an HTML5 tokenizer does in text
///
/// Named references use the full HTML5 table; the legacy subset also
/// matches without `;`, including as a prefix of a longer name.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let (decoded, consumed) = match after.strip_prefix('#') {
            Some(number) => numeric_reference(number).map(|(c, len)| (c, len + 1)),
            None => named_reference(after),
        }
        .unwrap_or_else(|| ("&".to_string(), 0));
        out.push_str(&decoded);
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

/// `&#...` body: decimal or `x` hex digits, optional `;`
fn numeric_reference(text: &str) -> Option<(String, usize)> {
    let (digits, radix, prefix) = match text.strip_prefix('x').or_else(|| text.strip_prefix('X')) {
        Some(hex) => (hex, 16, 1),
        None => (text, 10, 0),
    };
    let len = digits.find(|c: char| !c.is_digit(radix)).unwrap_or(digits.len());
    if len == 0 {
        return None;
    }

    // Overflow means out of range
    let code = u32::from_str_radix(&digits[..len], radix).unwrap_or(u32::MAX);
    let semicolon = usize::from(digits[len..].starts_with(';'));

    let decoded = match code {
        0 => "\u{fffd}".to_string(),
        0x0d => "\r".to_string(),
        0x80..=0x9f => CP1252_C1[(code - 0x80) as usize].to_string(),
        0xd800..=0xdfff | 0x11_0000..=u32::MAX => "\u{fffd}".to_string(),
        c if is_disallowed_code_point(c) => String::new(),
        c => char::from_u32(c).map(String::from).unwrap_or_default(),
    };
    Some((decoded, prefix + len + semicolon))
}

fn is_disallowed_code_point(code: u32) -> bool {
    matches!(code, 0x01..=0x08 | 0x0b | 0x0e..=0x1f | 0x7f..=0x9f | 0xfdd0..=0xfdef)
        || code & 0xfffe == 0xfffe
}

/// Named reference body; returns the replacement and the bytes consumed
fn named_reference(text: &str) -> Option<(String, usize)> {
    let name_len = text
        .char_indices()
        .take(32)
        .find(|&(_, c)| matches!(c, '\t' | '\n' | '\x0c' | ' ' | '<' | '&' | '#' | ';'))
        .map(|(i, _)| i)
        .unwrap_or_else(|| text.char_indices().nth(32).map_or(text.len(), |(i, _)| i));
    if name_len == 0 {
        return None;
    }
    let name = &text[..name_len];

    if text[name_len..].starts_with(';') {
        if let Some(decoded) = lookup_entity(name) {
            return Some((decoded, name_len + 1));
        }
    }

    // Longest legacy name that prefixes the run
    (2..=name_len)
        .rev()
        .filter(|&end| name.is_char_boundary(end))
        .map(|end| &name[..end])
        .find(|prefix| LEGACY_ENTITIES.contains(prefix))
        .and_then(|prefix| lookup_entity(prefix).map(|decoded| (decoded, prefix.len())))
}

/// Value of `&name;` in the HTML5 entity table
fn lookup_entity(name: &str) -> Option<String> {
    let reference = format!("&{};", name);
    let decoded = html_escape::decode_html_entities(&reference);
    let complete = decoded != reference.as_str() && (decoded == ";" || !decoded.ends_with(';'));
    complete.then(|| decoded.into_owned())
}

/// Outcome of processing one attachment
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentStatus {
    Downloaded,
    SkippedTooLarge { size_mb: f64, limit_mb: u64 },
    DownloadFailed { reason: String },
    NotFetched,
}

impl fmt::Display for AttachmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentStatus::Downloaded => f.write_str("Successfully downloaded"),
            AttachmentStatus::SkippedTooLarge { size_mb, limit_mb } => {
                write!(f, "Skipped - too large ({:.1}MB > {}MB)", size_mb, limit_mb)
            }
            AttachmentStatus::DownloadFailed { reason } => write!(f, "Download failed: {}", reason),
            AttachmentStatus::NotFetched => f.write_str("Not downloaded"),
        }
    }
}

/// An attachment found in a message payload
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDescriptor {
    pub filename: String,
    pub mime_type: String,
    /// Human readable size, e.g. `1.5 KB`
    pub size: String,
    pub size_bytes: u64,
    pub attachment_id: String,
    pub status: AttachmentStatus,
    pub content_preview: Option<String>,
}

impl AttachmentDescriptor {
    fn from_part(part: &MessagePart, attachment_id: &str) -> Self {
        let size_bytes = part.declared_size();
        Self {
            filename: part.filename.clone().unwrap_or_default(),
            mime_type: part.mime_type().to_string(),
            size: format_size(size_bytes),
            size_bytes,
            attachment_id: attachment_id.to_string(),
            status: AttachmentStatus::NotFetched,
            content_preview: None,
        }
    }
}

/// Where attachment bytes come from
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    /// Fetch the decoded bytes of an attachment
    async fn fetch(&self, attachment_id: &str) -> Result<Vec<u8>>;
}

/// Options for [`extract_attachments`]
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Attachments strictly larger than this are skipped
    pub max_size_mb: u64,
    /// Produce a content preview for downloaded attachments
    pub read_content: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_size_mb: 10,
            read_content: true,
        }
    }
}

/// Attachment leaves in traversal order
///
/// A part with children is never itself a candidate. A leaf qualifies when
/// it has both a non-empty filename and an attachment id.
fn attachment_parts<'a>(part: &'a MessagePart, out: &mut Vec<(&'a MessagePart, &'a str)>) {
    if !part.parts.is_empty() {
        for child in &part.parts {
            attachment_parts(child, out);
        }
        return;
    }

    let has_filename = part.filename.as_deref().is_some_and(|f| !f.is_empty());
    if let (true, Some(id)) = (has_filename, part.attachment_id()) {
        out.push((part, id));
    }
}

/// Describe attachments without downloading them
pub fn list_attachments(root: &MessagePart) -> Vec<AttachmentDescriptor> {
    let mut parts = Vec::new();
    attachment_parts(root, &mut parts);
    parts
        .into_iter()
        .map(|(part, id)| AttachmentDescriptor::from_part(part, id))
        .collect()
}

/// Describe attachments, downloading those within the size limit
///
/// Fetches run sequentially in traversal order. A failed fetch is recorded
/// on its descriptor and does not stop the remaining attachments.
pub async fn extract_attachments(
    root: &MessagePart,
    source: &dyn AttachmentSource,
    options: &ExtractOptions,
) -> Vec<AttachmentDescriptor> {
    let mut parts = Vec::new();
    attachment_parts(root, &mut parts);

    let mut descriptors = Vec::with_capacity(parts.len());
    for (part, id) in parts {
        let mut descriptor = AttachmentDescriptor::from_part(part, id);
        let size_mb = descriptor.size_bytes as f64 / (1024.0 * 1024.0);

        if size_mb > options.max_size_mb as f64 {
            tracing::debug!(
                filename = %descriptor.filename,
                "Skipping attachment over {}MB",
                options.max_size_mb
            );
            descriptor.status = AttachmentStatus::SkippedTooLarge {
                size_mb,
                limit_mb: options.max_size_mb,
            };
        } else {
            match source.fetch(id).await {
                Ok(bytes) => {
                    descriptor.status = AttachmentStatus::Downloaded;
                    if options.read_content {
                        descriptor.content_preview = Some(preview(&bytes, &descriptor.mime_type));
                    }
                }
                Err(e) => {
                    tracing::warn!(filename = %descriptor.filename, "Attachment download failed: {}", e);
                    descriptor.status = AttachmentStatus::DownloadFailed {
                        reason: e.to_string(),
                    };
                }
            }
        }

        descriptors.push(descriptor);
    }

    descriptors
}

/// Short readable rendering of attachment bytes
///
/// The PDF rule is a heuristic: it keeps printable ASCII found in the raw
/// file, which is only meaningful for uncompressed content streams.
pub fn preview(bytes: &[u8], content_type: &str) -> String {
    let is_text = content_type.starts_with("text/")
        || matches!(content_type, "application/json" | "application/xml");

    if is_text {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    if content_type == "application/pdf" {
        let cleaned: String = String::from_utf8_lossy(bytes)
            .chars()
            .filter(|&c| matches!(c, ' '..='~' | '\n' | '\r' | '\t'))
            .collect();
        return if cleaned.trim().is_empty() {
            PDF_BINARY_PLACEHOLDER.to_string()
        } else {
            cleaned
        };
    }

    format!("Binary file ({}) - {} bytes", content_type, bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, Service};
    use crate::gmail::types::MessagePartBody;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn leaf(mime: &str, text: &str) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            body: Some(MessagePartBody {
                data: Some(URL_SAFE_NO_PAD.encode(text)),
                size: text.len() as i64,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn attachment(name: &str, mime: &str, id: &str, size: i64) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            filename: Some(name.to_string()),
            body: Some(MessagePartBody {
                attachment_id: Some(id.to_string()),
                size,
                data: None,
            }),
            ..Default::default()
        }
    }

    fn multipart(mime: &str, parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            parts,
            ..Default::default()
        }
    }

    struct FakeSource {
        files: HashMap<String, std::result::Result<Vec<u8>, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(entries: Vec<(&str, std::result::Result<&[u8], &str>)>) -> Self {
            let files = entries
                .into_iter()
                .map(|(id, r)| (id.to_string(), r.map(|b| b.to_vec()).map_err(|e| e.to_string())))
                .collect();
            Self {
                files,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AttachmentSource for FakeSource {
        async fn fetch(&self, attachment_id: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(attachment_id.to_string());
            let message = match self.files.get(attachment_id) {
                Some(Ok(bytes)) => return Ok(bytes.clone()),
                Some(Err(message)) => message.clone(),
                None => "missing".to_string(),
            };
            Err(ApiError::RequestFailed {
                service: Service::Gmail,
                message,
            }
            .into())
        }
    }

    #[test]
    fn test_find_first_no_match() {
        let root = multipart("multipart/alternative", vec![leaf("text/html", "<p>x</p>")]);
        assert_eq!(find_first(&root, "text/plain"), None);
    }

    #[test]
    fn test_find_first_checks_root_first() {
        let root = leaf("text/plain", "root");
        assert_eq!(find_first(&root, "text/plain"), Some(URL_SAFE_NO_PAD.encode("root").as_str()));
    }

    #[test]
    fn test_find_first_pre_order() {
        let root = multipart(
            "multipart/mixed",
            vec![
                multipart("multipart/alternative", vec![leaf("text/plain", "nested")]),
                leaf("text/plain", "later"),
            ],
        );
        let data = find_first(&root, "text/plain").unwrap();
        assert_eq!(decode_base64url_lossy(data), b"nested");
    }

    #[test]
    fn test_find_first_skips_parts_without_data() {
        let empty = MessagePart {
            mime_type: Some("text/plain".to_string()),
            body: Some(MessagePartBody::default()),
            ..Default::default()
        };
        let root = multipart("multipart/mixed", vec![empty, leaf("text/plain", "second")]);
        let data = find_first(&root, "text/plain").unwrap();
        assert_eq!(decode_base64url_lossy(data), b"second");
    }

    #[test]
    fn test_resolve_body_plain() {
        let root = leaf("text/plain", "Hello\nWorld");
        assert_eq!(resolve_body(&root), "Hello\nWorld");
    }

    #[test]
    fn test_resolve_body_prefers_plain_over_html() {
        let root = multipart(
            "multipart/alternative",
            vec![leaf("text/html", "<p>html</p>"), leaf("text/plain", "plain")],
        );
        assert_eq!(resolve_body(&root), "plain");
    }

    #[test]
    fn test_resolve_body_html_fallback() {
        let root = multipart(
            "multipart/alternative",
            vec![leaf("text/html", "<b>Hi</b>&nbsp;there")],
        );
        assert_eq!(resolve_body(&root), "Hi there");
    }

    #[test]
    fn test_resolve_body_sentinel() {
        let root = multipart(
            "multipart/mixed",
            vec![attachment("a.zip", "application/zip", "att1", 10)],
        );
        assert_eq!(resolve_body(&root), NO_READABLE_CONTENT);
    }

    #[test]
    fn test_resolve_body_is_idempotent() {
        let root = multipart(
            "multipart/alternative",
            vec![leaf("text/html", "<div>\n  One &amp; <i>two</i>\n</div>")],
        );
        let first = resolve_body(&root);
        assert_eq!(first, "One & two");
        assert_eq!(resolve_body(&root), first);
    }

    #[test]
    fn test_resolve_body_drops_invalid_utf8() {
        let data = URL_SAFE_NO_PAD.encode([b'o', b'k', 0xff, b'!']);
        let root = MessagePart {
            mime_type: Some("text/plain".to_string()),
            body: Some(MessagePartBody {
                data: Some(data),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(resolve_body(&root), "ok!");
    }

    #[test]
    fn test_decode_base64url_lossy() {
        assert_eq!(decode_base64url_lossy("SGVsbG8gV29ybGQ"), b"Hello World");
        assert_eq!(decode_base64url_lossy("SGVsbG8gV29ybGQ="), b"Hello World");
        assert_eq!(decode_base64url_lossy("SGVs\nbG8g*V29y bGQ"), b"Hello World");
        assert_eq!(decode_base64url_lossy("Pz8_"), decode_base64url_lossy("Pz8/"));
        assert!(decode_base64url_lossy("").is_empty());
        assert!(decode_base64url_lossy("A").is_empty());
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(html_to_text("<p>a</p>\n\n<p>b</p>"), "a b");
        assert_eq!(html_to_text("1 &lt; 2 &#38; 3 &#x3E; 2"), "1 < 2 & 3 > 2");
        assert_eq!(html_to_text("AT&T &unknown; x"), "AT&T &unknown; x");
        assert_eq!(html_to_text("a < b"), "a < b");
    }

    #[test]
    fn test_list_attachments_metadata_only() {
        let root = multipart(
            "multipart/mixed",
            vec![
                leaf("text/plain", "body"),
                multipart(
                    "multipart/related",
                    vec![attachment("inner.png", "image/png", "att2", 1536)],
                ),
                attachment("report.pdf", "application/pdf", "att1", 512),
            ],
        );
        let found = list_attachments(&root);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].filename, "inner.png");
        assert_eq!(found[0].size, "1.5 KB");
        assert_eq!(found[1].filename, "report.pdf");
        assert_eq!(found[1].size, "512 B");
        assert!(found.iter().all(|a| a.status == AttachmentStatus::NotFetched));
    }

    #[test]
    fn test_list_attachments_requires_filename_and_id() {
        let mut no_name = attachment("", "image/png", "att1", 10);
        no_name.filename = Some(String::new());
        let mut no_id = attachment("x.txt", "text/plain", "att2", 10);
        no_id.body = Some(MessagePartBody::default());
        let root = multipart("multipart/mixed", vec![no_name, no_id]);
        assert!(list_attachments(&root).is_empty());
    }

    #[test]
    fn test_extract_skips_too_large_without_fetch() {
        let root = multipart(
            "multipart/mixed",
            vec![attachment("big.bin", "application/octet-stream", "big", 11 * 1024 * 1024)],
        );
        let source = FakeSource::new(vec![("big", Ok(b"never"))]);
        let options = ExtractOptions {
            max_size_mb: 10,
            read_content: true,
        };

        let found = tokio_test::block_on(extract_attachments(&root, &source, &options));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status.to_string(), "Skipped - too large (11.0MB > 10MB)");
        assert!(found[0].content_preview.is_none());
        assert!(source.calls().is_empty());
    }

    #[test]
    fn test_extract_continues_after_failure() {
        let root = multipart(
            "multipart/mixed",
            vec![
                attachment("a.txt", "text/plain", "a", 5),
                attachment("b.txt", "text/plain", "b", 5),
                attachment("c.txt", "text/plain", "c", 5),
            ],
        );
        let source = FakeSource::new(vec![
            ("a", Ok(b"alpha")),
            ("b", Err("boom")),
            ("c", Ok(b"gamma")),
        ]);

        let found = tokio_test::block_on(extract_attachments(
            &root,
            &source,
            &ExtractOptions::default(),
        ));

        assert_eq!(source.calls(), vec!["a", "b", "c"]);
        assert_eq!(found[0].status, AttachmentStatus::Downloaded);
        assert_eq!(found[0].content_preview.as_deref(), Some("alpha"));
        match &found[1].status {
            AttachmentStatus::DownloadFailed { reason } => assert!(reason.contains("boom")),
            other => panic!("unexpected status: {:?}", other),
        }
        assert!(found[1].status.to_string().starts_with("Download failed: "));
        assert_eq!(found[2].status, AttachmentStatus::Downloaded);
        assert_eq!(found[2].content_preview.as_deref(), Some("gamma"));
    }

    #[test]
    fn test_extract_without_previews() {
        let root = multipart(
            "multipart/mixed",
            vec![attachment("a.txt", "text/plain", "a", 5)],
        );
        let source = FakeSource::new(vec![("a", Ok(b"alpha"))]);
        let options = ExtractOptions {
            max_size_mb: 10,
            read_content: false,
        };

        let found = tokio_test::block_on(extract_attachments(&root, &source, &options));

        assert_eq!(found[0].status, AttachmentStatus::Downloaded);
        assert!(found[0].content_preview.is_none());
    }

    #[test]
    fn test_preview_text() {
        assert_eq!(preview(b"hello", "text/plain"), "hello");
        assert_eq!(preview(b"{\"a\":1}", "application/json"), "{\"a\":1}");
        assert_eq!(preview(b"<a/>", "application/xml"), "<a/>");
    }

    #[test]
    fn test_preview_binary_placeholder() {
        let bytes = [0u8; 50];
        let text = preview(&bytes, "application/zip");
        assert_eq!(text, "Binary file (application/zip) - 50 bytes");
    }

    #[test]
    fn test_preview_pdf() {
        let raw = b"%PDF-1.4\n\xff\xfe(Hello PDF)\n";
        let text = preview(raw, "application/pdf");
        assert!(text.contains("Hello PDF"));
        assert!(text.chars().all(|c| c.is_ascii()));

        assert_eq!(preview(&[0xff, 0xfe, 0x00], "application/pdf"), PDF_BINARY_PLACEHOLDER);
    }

    #[test]
    fn test_html_to_text_named_entities() {
        assert_eq!(
            html_to_text("caf&eacute; &rarr; na&iuml;ve &zwnj;x &hearts;"),
            "café → naïve \u{200c}x ♥"
        );
        assert_eq!(html_to_text("a &amp b &nbsp c"), "a & b c");
        assert_eq!(html_to_text("&ampx; &notit;"), "&x; ¬it;");
    }

    #[test]
    fn test_html_to_text_numeric_references() {
        assert_eq!(
            html_to_text("&#0;|&#xD800;|&#150;|&#65x|&#;|&#x110000;"),
            "\u{fffd}|\u{fffd}|–|Ax|&#;|\u{fffd}"
        );
        assert_eq!(html_to_text("a&#1;b"), "ab");
    }

    #[test]
    fn test_resolve_body_markup_only_html_is_empty() {
        let root = multipart(
            "multipart/alternative",
            vec![leaf("text/html", "<img src=\"x.png\">")],
        );
        assert_eq!(resolve_body(&root), "");
    }

    #[test]
    fn test_find_first_is_idempotent() {
        let root = multipart(
            "multipart/mixed",
            vec![leaf("text/html", "<p>x</p>"), leaf("text/plain", "y")],
        );
        let first = find_first(&root, "text/plain");
        assert!(first.is_some());
        assert_eq!(find_first(&root, "text/plain"), first);
    }

    #[test]
    fn test_attachment_listing_is_idempotent() {
        let root = multipart(
            "multipart/mixed",
            vec![
                attachment("a.txt", "text/plain", "a", 5),
                attachment("big.bin", "application/octet-stream", "big", 11 * 1024 * 1024),
            ],
        );
        assert_eq!(list_attachments(&root), list_attachments(&root));

        let source = FakeSource::new(vec![("a", Ok(b"alpha"))]);
        let options = ExtractOptions::default();
        let first = tokio_test::block_on(extract_attachments(&root, &source, &options));
        let second = tokio_test::block_on(extract_attachments(&root, &source, &options));
        assert_eq!(first, second);
        assert_eq!(source.calls(), vec!["a", "a"]);
    }

    #[test]
    fn test_preview_is_idempotent() {
        let raw = b"%PDF-1.4\n(Totals)\xff";
        assert_eq!(preview(raw, "application/pdf"), preview(raw, "application/pdf"));
        assert_eq!(preview(b"hi", "text/csv"), preview(b"hi", "text/csv"));
    }
}
