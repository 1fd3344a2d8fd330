//! Drive files exposed as MCP resources under `gdrive:///{file_id}`

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::drive::{DriveClient, FileContent};
use crate::error::{McpError, Result};
use crate::mcp::types::{ReadResourceResult, ResourceContent, ResourceTemplate};

pub const DRIVE_URI_SCHEME: &str = "gdrive:///";

pub fn resource_templates() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate {
        uri_template: format!("{}{{file_id}}", DRIVE_URI_SCHEME),
        name: "Google Drive file".to_string(),
        description: Some("Content of a Google Drive file, exported or converted to text when possible".to_string()),
        mime_type: None,
    }]
}

/// File id of a `gdrive:///{file_id}` URI
pub fn parse_drive_uri(uri: &str) -> Result<&str> {
    match uri.strip_prefix(DRIVE_URI_SCHEME) {
        Some(id) if !id.is_empty() && !id.contains('/') => Ok(id),
        _ => Err(McpError::InvalidResourceUri {
            uri: uri.to_string(),
        }
        .into()),
    }
}

/// Read a Drive file as resource content
///
/// Text, exported documents and PDF text are returned as `text`; anything
/// else as a base64 `blob`.
pub async fn read_drive_resource(drive: &DriveClient, uri: &str) -> Result<ReadResourceResult> {
    let file_id = parse_drive_uri(uri)?;
    let (file, content) = drive.read_content(file_id).await?;
    tracing::debug!(file_id, name = %file.name, "Read Drive resource");

    Ok(ReadResourceResult {
        contents: vec![resource_content(uri, &file.mime_type, content)],
    })
}

fn resource_content(uri: &str, mime_type: &str, content: FileContent) -> ResourceContent {
    let (text, blob, mime_type) = match content {
        FileContent::Text(text) => (Some(text), None, mime_type),
        FileContent::PdfText(text) => (Some(text), None, "text/plain"),
        FileContent::Binary(bytes) => (None, Some(STANDARD.encode(bytes)), mime_type),
    };

    ResourceContent {
        uri: uri.to_string(),
        text,
        blob,
        mime_type: Some(mime_type.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drive_uri() {
        assert_eq!(parse_drive_uri("gdrive:///1AbC").unwrap(), "1AbC");
        assert!(parse_drive_uri("gdrive:///").is_err());
        assert!(parse_drive_uri("gdrive://1AbC").is_err());
        assert!(parse_drive_uri("file:///etc/passwd").is_err());
        assert!(parse_drive_uri("gdrive:///a/b").is_err());
    }

    #[test]
    fn test_template_uri() {
        let templates = resource_templates();
        assert_eq!(templates[0].uri_template, "gdrive:///{file_id}");
    }

    #[test]
    fn test_resource_content_kinds() {
        let text = resource_content("gdrive:///1", "text/csv", FileContent::Text("a,b".to_string()));
        assert_eq!(text.text.as_deref(), Some("a,b"));
        assert_eq!(text.mime_type.as_deref(), Some("text/csv"));

        let pdf = resource_content("gdrive:///2", "application/pdf", FileContent::PdfText("hi".to_string()));
        assert_eq!(pdf.mime_type.as_deref(), Some("text/plain"));

        let bin = resource_content("gdrive:///3", "image/png", FileContent::Binary(vec![0, 1, 2]));
        assert!(bin.text.is_none());
        assert_eq!(bin.blob.as_deref(), Some("AAEC"));
    }
}
