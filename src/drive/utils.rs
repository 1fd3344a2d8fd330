//! Drive query building and content conversion

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::config::drive::{FOLDER_MIME_TYPE, WORKSPACE_MIME_PREFIX};
use crate::error::Result;
use crate::pdf::create_pdf_from_text;

/// Filters accepted by `drive_list_all_files`
pub const FILE_TYPE_FILTERS: &[(&str, &str)] = &[
    ("folder", "mimeType='application/vnd.google-apps.folder'"),
    ("document", "mimeType='application/vnd.google-apps.document'"),
    ("spreadsheet", "mimeType='application/vnd.google-apps.spreadsheet'"),
    ("presentation", "mimeType='application/vnd.google-apps.presentation'"),
    ("pdf", "mimeType='application/pdf'"),
    ("image", "mimeType contains 'image/'"),
    ("video", "mimeType contains 'video/'"),
    ("audio", "mimeType contains 'audio/'"),
    ("text", "mimeType contains 'text/'"),
];

/// Export format for a Google Workspace native type
pub fn export_mime_type(google_mime_type: &str) -> &'static str {
    match google_mime_type {
        "application/vnd.google-apps.document" => "text/markdown",
        "application/vnd.google-apps.spreadsheet" => "text/csv",
        "application/vnd.google-apps.presentation" => "text/plain",
        "application/vnd.google-apps.drawing" => "image/png",
        _ => "text/plain",
    }
}

pub fn is_workspace_type(mime_type: &str) -> bool {
    mime_type.starts_with(WORKSPACE_MIME_PREFIX)
}

/// Whether `content` is canonical standard base64
///
/// Plain words such as `abcd` also pass this check.
pub fn is_base64_content(content: &str) -> bool {
    match STANDARD.decode(content) {
        Ok(decoded) => STANDARD.encode(decoded) == content,
        Err(_) => false,
    }
}

/// Escape a value for use inside a single-quoted Drive query string
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn full_text_query(text: &str) -> String {
    format!("fullText contains '{}'", escape_query_value(text))
}

pub fn children_query(folder_id: &str) -> String {
    format!("'{}' in parents and trashed=false", escape_query_value(folder_id))
}

/// Query for `drive_list_all_files`; `Err` carries the user-facing message
pub fn list_all_query(file_type: Option<&str>) -> std::result::Result<String, String> {
    let Some(file_type) = file_type.filter(|t| !t.is_empty()) else {
        return Ok("trashed=false".to_string());
    };

    let key = file_type.to_lowercase();
    match FILE_TYPE_FILTERS.iter().find(|(name, _)| *name == key) {
        Some((_, filter)) => Ok(format!("trashed=false and {}", filter)),
        None => {
            let supported: Vec<&str> = FILE_TYPE_FILTERS.iter().map(|(name, _)| *name).collect();
            Err(format!(
                "Unsupported file type filter: {}. Supported types: {}",
                file_type,
                supported.join(", ")
            ))
        }
    }
}

/// Bytes to upload for `content` stored as `mime_type`
///
/// PDFs take base64 bytes as-is and render anything else as text. Other
/// non-text types accept base64 for binary payloads. Everything else is
/// uploaded as UTF-8.
pub fn encode_upload_content(mime_type: &str, content: &str) -> Result<Vec<u8>> {
    if mime_type == "application/pdf" {
        if is_base64_content(content) {
            return Ok(STANDARD.decode(content).unwrap_or_default());
        }
        return create_pdf_from_text(content);
    }

    if !mime_type.starts_with("text/") && is_base64_content(content) {
        return Ok(STANDARD.decode(content).unwrap_or_default());
    }

    Ok(content.as_bytes().to_vec())
}

pub fn is_folder_type(mime_type: &str) -> bool {
    mime_type == FOLDER_MIME_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_mime_type() {
        assert_eq!(export_mime_type("application/vnd.google-apps.document"), "text/markdown");
        assert_eq!(export_mime_type("application/vnd.google-apps.spreadsheet"), "text/csv");
        assert_eq!(export_mime_type("application/vnd.google-apps.presentation"), "text/plain");
        assert_eq!(export_mime_type("application/vnd.google-apps.drawing"), "image/png");
        assert_eq!(export_mime_type("application/vnd.google-apps.form"), "text/plain");
    }

    #[test]
    fn test_is_base64_content() {
        assert!(is_base64_content("aGVsbG8="));
        assert!(!is_base64_content("hello world"));
        assert!(!is_base64_content("aGVsbG8"));
        // a known false positive of the round-trip check
        assert!(is_base64_content("abcd"));
    }

    #[test]
    fn test_escape_query_value() {
        assert_eq!(full_text_query("it's"), "fullText contains 'it\\'s'");
        assert_eq!(escape_query_value("a\\b"), "a\\\\b");
        assert_eq!(children_query("root"), "'root' in parents and trashed=false");
    }

    #[test]
    fn test_list_all_query() {
        assert_eq!(list_all_query(None).unwrap(), "trashed=false");
        assert_eq!(
            list_all_query(Some("PDF")).unwrap(),
            "trashed=false and mimeType='application/pdf'"
        );
        let err = list_all_query(Some("binary")).unwrap_err();
        assert!(err.starts_with("Unsupported file type filter: binary."));
        assert!(err.contains("folder, document, spreadsheet"));
    }

    #[test]
    fn test_encode_upload_content_text() {
        let bytes = encode_upload_content("text/plain", "aGVsbG8=").unwrap();
        assert_eq!(bytes, b"aGVsbG8=");
    }

    #[test]
    fn test_encode_upload_content_binary() {
        let bytes = encode_upload_content("image/png", "aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        let plain = encode_upload_content("application/json", "{\"a\": 1}").unwrap();
        assert_eq!(plain, b"{\"a\": 1}");
    }

    #[test]
    fn test_encode_upload_content_pdf() {
        let rendered = encode_upload_content("application/pdf", "Quarterly report").unwrap();
        assert!(rendered.starts_with(b"%PDF"));

        let raw = encode_upload_content("application/pdf", "JVBERi0=").unwrap();
        assert_eq!(raw, b"%PDF-");
    }

    #[test]
    fn test_workspace_and_folder_types() {
        assert!(is_workspace_type("application/vnd.google-apps.document"));
        assert!(!is_workspace_type("application/pdf"));
        assert!(is_folder_type("application/vnd.google-apps.folder"));
    }
}
