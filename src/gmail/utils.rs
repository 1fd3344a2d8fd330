//! Gmail utility functions
//!
//! Outgoing message construction, address validation and attachment loading.

use std::path::Path;

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};

use crate::error::{Result, ValidationError, WorkspaceMcpError};

/// Validate an email address
pub fn validate_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);

    !local.is_empty()
        && !domain.is_empty()
        && !local.contains(' ')
        && !domain.contains(' ')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Bare address of a recipient, `Jane <jane@example.com>` becomes `jane@example.com`
pub fn extract_address(recipient: &str) -> &str {
    let recipient = recipient.trim();
    match (recipient.rfind('<'), recipient.rfind('>')) {
        (Some(start), Some(end)) if start < end => recipient[start + 1..end].trim(),
        _ => recipient,
    }
}

/// Check every comma-separated recipient
pub fn validate_recipients(to: &str) -> Result<()> {
    let mut count = 0;
    for recipient in to.split(',').filter(|r| !r.trim().is_empty()) {
        count += 1;
        let address = extract_address(recipient);
        if !validate_email(address) {
            return Err(ValidationError::InvalidEmail {
                email: address.to_string(),
            }
            .into());
        }
    }

    if count == 0 {
        return Err(ValidationError::InvalidParameter {
            name: "to".to_string(),
            message: "at least one recipient is required".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Encode text for MIME header (RFC 2047)
pub fn encode_mime_header(text: &str) -> String {
    if text.chars().all(|c| c.is_ascii() && c != '\r' && c != '\n') {
        return text.to_string();
    }

    format!("=?UTF-8?B?{}?=", STANDARD.encode(text.as_bytes()))
}

/// Encode a raw email message for Gmail API (base64url, no padding)
pub fn encode_raw_message(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

/// Guess a MIME type from a file extension
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

/// A file attached to an outgoing message
#[derive(Debug, Clone)]
pub struct OutgoingAttachment {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Load an attachment from a file path
pub fn load_attachment(path: &str) -> Result<OutgoingAttachment> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err(WorkspaceMcpError::Validation(ValidationError::FileNotFound {
            path: path.display().to_string(),
        }));
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "attachment".to_string());

    let data = std::fs::read(path)?;

    Ok(OutgoingAttachment {
        filename,
        mime_type: guess_mime_type(path).to_string(),
        data,
    })
}

/// Parameters for creating an email message
#[derive(Debug, Clone, Default)]
pub struct EmailParams {
    /// Sender address, usually the mailbox profile address
    pub from: Option<String>,
    /// Comma-separated recipients
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<OutgoingAttachment>,
}

/// Create an RFC 822 message, multipart/mixed when attachments are present
pub fn create_email_message(params: &EmailParams) -> Result<String> {
    validate_recipients(&params.to)?;

    let mut lines = Vec::new();

    if let Some(ref from) = params.from {
        lines.push(format!("From: {}", from));
    }
    lines.push(format!("To: {}", params.to));
    lines.push(format!("Subject: {}", encode_mime_header(&params.subject)));
    lines.push("MIME-Version: 1.0".to_string());

    if params.attachments.is_empty() {
        lines.push("Content-Type: text/plain; charset=UTF-8".to_string());
        lines.push("Content-Transfer-Encoding: 8bit".to_string());
        lines.push(String::new());
        lines.push(params.body.clone());
        return Ok(lines.join("\r\n"));
    }

    let boundary = format!("----=_MixedPart_{}", generate_boundary());
    lines.push(format!("Content-Type: multipart/mixed; boundary=\"{}\"", boundary));
    lines.push(String::new());

    lines.push(format!("--{}", boundary));
    lines.push("Content-Type: text/plain; charset=UTF-8".to_string());
    lines.push("Content-Transfer-Encoding: 8bit".to_string());
    lines.push(String::new());
    lines.push(params.body.clone());
    lines.push(String::new());

    for attachment in &params.attachments {
        let name = encode_mime_header(&attachment.filename);
        lines.push(format!("--{}", boundary));
        lines.push(format!("Content-Type: {}; name=\"{}\"", attachment.mime_type, name));
        lines.push("Content-Transfer-Encoding: base64".to_string());
        lines.push(format!("Content-Disposition: attachment; filename=\"{}\"", name));
        lines.push(String::new());

        // RFC 2045 line length
        let encoded = STANDARD.encode(&attachment.data);
        for chunk in encoded.as_bytes().chunks(76) {
            lines.push(String::from_utf8_lossy(chunk).to_string());
        }
        lines.push(String::new());
    }

    lines.push(format!("--{}--", boundary));
    Ok(lines.join("\r\n"))
}

fn generate_boundary() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{:x}", nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com"));
        assert!(validate_email("user.name@domain.co.uk"));
        assert!(validate_email("a@b.co"));
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("@domain.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@.com"));
        assert!(!validate_email("user@domain."));
    }

    #[test]
    fn test_validate_recipients() {
        assert!(validate_recipients("a@example.com, Bob <bob@example.com>").is_ok());
        assert!(validate_recipients("a@example.com, nope").is_err());
        assert!(validate_recipients(" , ").is_err());
    }

    #[test]
    fn test_extract_address() {
        assert_eq!(extract_address("Jane <jane@example.com>"), "jane@example.com");
        assert_eq!(extract_address(" plain@example.com "), "plain@example.com");
    }

    #[test]
    fn test_encode_mime_header() {
        assert_eq!(encode_mime_header("Hello World"), "Hello World");
        let encoded = encode_mime_header("Héllo Wörld");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type(Path::new("report.PDF")), "application/pdf");
        assert_eq!(guess_mime_type(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime_type(Path::new("archive")), "application/octet-stream");
    }

    #[test]
    fn test_create_plain_message() {
        let params = EmailParams {
            from: Some("me@example.com".to_string()),
            to: "test@example.com".to_string(),
            subject: "Test Subject".to_string(),
            body: "Test body".to_string(),
            attachments: vec![],
        };
        let message = create_email_message(&params).unwrap();
        assert!(message.contains("From: me@example.com\r\n"));
        assert!(message.contains("To: test@example.com\r\n"));
        assert!(message.contains("Subject: Test Subject\r\n"));
        assert!(message.contains("Content-Type: text/plain; charset=UTF-8"));
        assert!(message.ends_with("Test body"));
    }

    #[test]
    fn test_create_message_with_attachments() {
        let params = EmailParams {
            from: None,
            to: "test@example.com".to_string(),
            subject: "Files".to_string(),
            body: "See attached".to_string(),
            attachments: vec![OutgoingAttachment {
                filename: "a.txt".to_string(),
                mime_type: "text/plain".to_string(),
                data: b"hello".to_vec(),
            }],
        };
        let message = create_email_message(&params).unwrap();
        assert!(message.contains("Content-Type: multipart/mixed; boundary="));
        assert!(message.contains("Content-Disposition: attachment; filename=\"a.txt\""));
        assert!(message.contains("aGVsbG8="));
        assert!(message.trim_end().ends_with("--"));
    }

    #[test]
    fn test_create_message_rejects_bad_recipient() {
        let params = EmailParams {
            to: "not-an-email".to_string(),
            ..Default::default()
        };
        assert!(create_email_message(&params).is_err());
    }

    #[test]
    fn test_load_attachment() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();

        let attachment = load_attachment(file.path().to_str().unwrap()).unwrap();
        assert_eq!(attachment.mime_type, "text/csv");
        assert_eq!(attachment.data, b"a,b\n1,2\n");
        assert!(attachment.filename.ends_with(".csv"));

        assert!(load_attachment("/definitely/not/here.txt").is_err());
    }

    #[test]
    fn test_encode_raw_message() {
        assert_eq!(encode_raw_message("Hello World"), "SGVsbG8gV29ybGQ");
    }
}
