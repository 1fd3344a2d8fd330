//! Google Drive API client
//!
//! Thin wrappers over the Drive v3 REST endpoints plus the Docs call used
//! to fill a freshly created document.

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use crate::config::{docs, drive::API_BASE_URL, drive::UPLOAD_BASE_URL};
use crate::drive::types::*;
use crate::drive::utils::{export_mime_type, is_workspace_type};
use crate::error::{Result, Service};
use crate::google::{Call, GoogleApi};
use crate::pdf::extract_pdf_text;

/// Content of a Drive file, converted for display
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    /// Text files and exported Workspace documents
    Text(String),
    /// Text extracted from a PDF
    PdfText(String),
    /// Anything else, as raw bytes
    Binary(Vec<u8>),
}

/// Google Drive API client
pub struct DriveClient {
    api: Arc<GoogleApi>,
}

impl DriveClient {
    pub fn new(api: Arc<GoogleApi>) -> Self {
        Self { api }
    }

    fn files_url() -> String {
        format!("{}/files", API_BASE_URL)
    }

    fn file_url(file_id: &str) -> String {
        format!("{}/files/{}", API_BASE_URL, file_id)
    }

    fn file_call<'a>(action: &'a str, file_id: &'a str) -> Call<'a> {
        Call::new(Service::Drive, action).on("File", file_id)
    }

    /// Run a `files.list` query
    pub async fn list_files(&self, request: &ListFilesRequest<'_>) -> Result<Vec<DriveFile>> {
        let mut params = vec![
            ("q", request.query.to_string()),
            ("pageSize", request.page_size.to_string()),
            ("fields", format!("files({})", request.fields)),
        ];
        if let Some(order_by) = request.order_by {
            params.push(("orderBy", order_by.to_string()));
        }

        let builder = self
            .api
            .request(Method::GET, &Self::files_url())
            .await?
            .query(&params);
        let list: FileList = self
            .api
            .json(builder, Call::new(Service::Drive, "list files"))
            .await?;

        tracing::debug!(query = %request.query, count = list.files.len(), "Listed Drive files");
        Ok(list.files)
    }

    /// Get file metadata
    pub async fn get_file(&self, file_id: &str, fields: &str) -> Result<DriveFile> {
        let builder = self
            .api
            .request(Method::GET, &Self::file_url(file_id))
            .await?
            .query(&[("fields", fields)]);
        self.api.json(builder, Self::file_call("get file", file_id)).await
    }

    /// Download the stored bytes of a regular file
    pub async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let builder = self
            .api
            .request(Method::GET, &Self::file_url(file_id))
            .await?
            .query(&[("alt", "media")]);
        self.api
            .bytes(builder, Self::file_call("download file", file_id))
            .await
    }

    /// Export a Workspace document in another format
    pub async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>> {
        let url = format!("{}/export", Self::file_url(file_id));
        let builder = self
            .api
            .request(Method::GET, &url)
            .await?
            .query(&[("mimeType", mime_type)]);
        self.api
            .bytes(builder, Self::file_call("export file", file_id))
            .await
    }

    /// Fetch a file and convert it according to its type
    pub async fn read_content(&self, file_id: &str) -> Result<(DriveFile, FileContent)> {
        let file = self.get_file(file_id, "id,name,mimeType").await?;

        let content = if is_workspace_type(&file.mime_type) {
            let export_type = export_mime_type(&file.mime_type);
            let bytes = self.export(file_id, export_type).await?;
            if export_type.starts_with("text/") {
                FileContent::Text(String::from_utf8_lossy(&bytes).into_owned())
            } else {
                FileContent::Binary(bytes)
            }
        } else {
            let bytes = self.download(file_id).await?;
            classify_download(&file.mime_type, bytes)
        };

        Ok((file, content))
    }

    /// Create a file without content (folders, empty Google Docs)
    pub async fn create_metadata(&self, metadata: &NewFile, fields: &str) -> Result<DriveFile> {
        let builder = self
            .api
            .request(Method::POST, &Self::files_url())
            .await?
            .query(&[("fields", fields)])
            .json(metadata);
        self.api
            .json(builder, Call::new(Service::Drive, "create file"))
            .await
    }

    /// Create a file with content in one multipart upload
    pub async fn create_with_content(
        &self,
        metadata: &NewFile,
        mime_type: &str,
        content: Vec<u8>,
        fields: &str,
    ) -> Result<DriveFile> {
        let boundary = format!("drive_upload_{:x}", chrono::Utc::now().timestamp_millis());
        let metadata_json = serde_json::to_vec(metadata)?;
        let body = multipart_related_body(&boundary, &metadata_json, mime_type, &content);

        let builder = self
            .api
            .request(Method::POST, &format!("{}/files", UPLOAD_BASE_URL))
            .await?
            .query(&[("uploadType", "multipart"), ("fields", fields)])
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body);

        let file: DriveFile = self
            .api
            .json(builder, Call::new(Service::Drive, "upload file"))
            .await?;
        tracing::info!(file_id = %file.id, name = %file.name, "Uploaded file to Drive");
        Ok(file)
    }

    /// Replace the content of an existing file
    pub async fn update_content(
        &self,
        file_id: &str,
        mime_type: &str,
        content: Vec<u8>,
        fields: &str,
    ) -> Result<DriveFile> {
        let url = format!("{}/files/{}", UPLOAD_BASE_URL, file_id);
        let builder = self
            .api
            .request(Method::PATCH, &url)
            .await?
            .query(&[("uploadType", "media"), ("fields", fields)])
            .header("Content-Type", mime_type)
            .body(content);
        self.api
            .json(builder, Self::file_call("update file", file_id))
            .await
    }

    /// Move a file to trash
    pub async fn trash(&self, file_id: &str) -> Result<()> {
        let builder = self
            .api
            .request(Method::PATCH, &Self::file_url(file_id))
            .await?
            .json(&json!({ "trashed": true }));
        self.api
            .empty(builder, Self::file_call("trash file", file_id))
            .await
    }

    /// Replace all parents of a file with `target_folder_id`
    pub async fn move_file(&self, file_id: &str, target_folder_id: &str) -> Result<DriveFile> {
        let current = self.get_file(file_id, "parents").await?;
        let previous_parents = current.parents.join(",");

        let builder = self
            .api
            .request(Method::PATCH, &Self::file_url(file_id))
            .await?
            .query(&[
                ("addParents", target_folder_id),
                ("removeParents", previous_parents.as_str()),
                ("fields", "id,name,parents"),
            ])
            .json(&json!({}));
        self.api
            .json(builder, Self::file_call("move file", file_id))
            .await
    }

    /// Grant a permission on a file
    pub async fn create_permission(
        &self,
        file_id: &str,
        permission: &Permission,
        send_notification: Option<bool>,
    ) -> Result<()> {
        let url = format!("{}/permissions", Self::file_url(file_id));
        let mut builder = self.api.request(Method::POST, &url).await?.json(permission);
        if let Some(notify) = send_notification {
            builder = builder.query(&[("sendNotificationEmail", notify.to_string())]);
        }
        self.api
            .empty(builder, Self::file_call("share file", file_id))
            .await
    }

    /// Insert text at the start of a Google Doc
    pub async fn insert_document_text(&self, document_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/documents/{}:batchUpdate", docs::API_BASE_URL, document_id);
        let body = json!({
            "requests": [{
                "insertText": {
                    "location": { "index": 1 },
                    "text": text,
                }
            }]
        });
        let builder = self.api.request(Method::POST, &url).await?.json(&body);
        self.api
            .empty(
                builder,
                Call::new(Service::Docs, "update document").on("Document", document_id),
            )
            .await
    }
}

/// Convert downloaded bytes of a regular (non-Workspace) file
pub fn classify_download(mime_type: &str, bytes: Vec<u8>) -> FileContent {
    if mime_type.starts_with("text/") || mime_type == "application/json" {
        FileContent::Text(String::from_utf8_lossy(&bytes).into_owned())
    } else if mime_type == "application/pdf" {
        FileContent::PdfText(extract_pdf_text(&bytes))
    } else {
        FileContent::Binary(bytes)
    }
}

/// Body of a `multipart/related` upload: JSON metadata then the media part
pub fn multipart_related_body(
    boundary: &str,
    metadata_json: &[u8],
    mime_type: &str,
    content: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + metadata_json.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata_json);
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_related_body() {
        let body = multipart_related_body("b1", br#"{"name":"a.txt"}"#, "text/plain", b"hello");
        let text = String::from_utf8(body).unwrap();
        assert_eq!(
            text,
            "--b1\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{\"name\":\"a.txt\"}\r\n\
             --b1\r\nContent-Type: text/plain\r\n\r\nhello\r\n--b1--\r\n"
        );
    }

    #[test]
    fn test_classify_download() {
        assert_eq!(
            classify_download("text/csv", b"a,b".to_vec()),
            FileContent::Text("a,b".to_string())
        );
        assert_eq!(
            classify_download("application/json", b"{}".to_vec()),
            FileContent::Text("{}".to_string())
        );
        assert_eq!(
            classify_download("image/png", vec![1, 2, 3]),
            FileContent::Binary(vec![1, 2, 3])
        );
        match classify_download("application/pdf", b"garbage".to_vec()) {
            FileContent::PdfText(text) => assert!(text.starts_with("Error extracting PDF text")),
            other => panic!("unexpected content: {:?}", other),
        }
    }
}
