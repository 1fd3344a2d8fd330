//! Google Drive tools

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{default_true, parse_args, tool_def, ToolHandler};
use crate::config::drive::{DOCUMENT_MIME_TYPE, FOLDER_MIME_TYPE};
use crate::drive::types::{DriveFile, ListFilesRequest, NewFile, Permission};
use crate::drive::utils::{children_query, encode_upload_content, full_text_query, list_all_query};
use crate::drive::FileContent;
use crate::error::Result;
use crate::format::{file_type_emoji, format_size, format_size_str};
use crate::gmail::utils::{guess_mime_type, validate_email};
use crate::mcp::types::{CallToolResult, Tool};

/// Binary files up to this size are returned base64 encoded
pub const MAX_INLINE_BINARY: usize = 1024 * 1024;

const SUBFOLDER_PREVIEW_COUNT: usize = 3;
const SUBFOLDER_PREVIEW_ITEMS: usize = 10;
const SEPARATOR_WIDTH: usize = 50;

pub(super) fn tools() -> Vec<Tool> {
    vec![
        tool_def("drive_search", "Search for files in Google Drive by full text", drive_search_schema()),
        tool_def("drive_read", "Read the contents of a file from Google Drive using its fileId", file_id_schema()),
        tool_def("drive_edit", "Replace the content of an existing file in Google Drive", drive_edit_schema()),
        tool_def("drive_delete", "Move a file in Google Drive to the trash", file_id_schema()),
        tool_def("drive_upload_file", "Upload a local file to Google Drive", drive_upload_file_schema()),
        tool_def("drive_move", "Move a file to a different folder in Google Drive", drive_move_schema()),
        tool_def("drive_share_file", "Share a Google Drive file with someone and get a shareable link", drive_share_file_schema()),
        tool_def("drive_get_shareable_link", "Get the shareable link of a Google Drive file", drive_get_shareable_link_schema()),
        tool_def("drive_create_folder", "Create a new folder in Google Drive", drive_create_folder_schema()),
        tool_def("drive_list_folder_contents", "List all files and folders within a specific folder", drive_list_folder_contents_schema()),
        tool_def("drive_list_all_files", "List files and folders in Google Drive with optional type filter", drive_list_all_files_schema()),
        tool_def("drive_create", "Create a new file in Google Drive. Handles Google Docs, PDFs and plain text", drive_create_schema()),
    ]
}

impl ToolHandler {
    pub(super) async fn handle_drive_search(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            query: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let query = full_text_query(&args.query);
        let request = ListFilesRequest {
            query: &query,
            page_size: 10,
            fields: "id, name, mimeType, modifiedTime, size",
            order_by: None,
        };

        match self.drive.list_files(&request).await {
            Ok(files) if files.is_empty() => CallToolResult::text("No files found."),
            Ok(files) => {
                let lines: Vec<String> = files
                    .iter()
                    .map(|f| format!("{} ({}) [ID: {}]", f.name, f.mime_type, f.id))
                    .collect();
                CallToolResult::text(format!("Found {} files:\n{}", files.len(), lines.join("\n")))
            }
            Err(e) => CallToolResult::error(format!("Failed to search files: {}", e)),
        }
    }

    pub(super) async fn handle_drive_read(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            file_id: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self.drive.read_content(&args.file_id).await {
            Ok((file, content)) => CallToolResult::text(render_file_content(&file, content)),
            Err(e) => CallToolResult::error(format!("Failed to read file {}: {}", args.file_id, e)),
        }
    }

    pub(super) async fn handle_drive_edit(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            file_id: String,
            content: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self.edit_file(&args.file_id, &args.content).await {
            Ok(file) => CallToolResult::text(format!(
                "File updated successfully: {} (ID: {}, MIME type: {})",
                file.name, file.id, file.mime_type
            )),
            Err(e) => CallToolResult::error(format!("Failed to edit file {}: {}", args.file_id, e)),
        }
    }

    async fn edit_file(&self, file_id: &str, content: &str) -> Result<DriveFile> {
        let current = self.drive.get_file(file_id, "mimeType,name").await?;
        let mime_type = if current.mime_type.is_empty() {
            "text/plain"
        } else {
            current.mime_type.as_str()
        };

        let bytes = encode_upload_content(mime_type, content)?;
        self.drive
            .update_content(file_id, mime_type, bytes, "id,name,mimeType")
            .await
    }

    pub(super) async fn handle_drive_delete(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            file_id: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self.drive.trash(&args.file_id).await {
            Ok(()) => CallToolResult::text(format!(
                "File with ID {} has been moved to the trash.",
                args.file_id
            )),
            Err(e) => CallToolResult::error(format!("Failed to delete file {}: {}", args.file_id, e)),
        }
    }

    pub(super) async fn handle_drive_upload_file(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            file_path: String,
            file_name: Option<String>,
            folder_id: Option<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let path = Path::new(&args.file_path);
        if !path.is_file() {
            return CallToolResult::error(format!("File not found at {}", args.file_path));
        }

        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) => return CallToolResult::error(format!("Failed to read {}: {}", args.file_path, e)),
        };
        let size = data.len();

        let name = args
            .file_name
            .filter(|n| !n.is_empty())
            .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = guess_mime_type(path);
        let metadata = NewFile::new(name).in_folder(args.folder_id.as_deref());

        match self
            .drive
            .create_with_content(&metadata, mime_type, data, "id,name,size,mimeType,webViewLink")
            .await
        {
            Ok(file) => CallToolResult::text(format!(
                "File uploaded to Google Drive successfully!\n\
                 File Name: {}\n\
                 File ID: {}\n\
                 MIME Type: {}\n\
                 Size: {} bytes\n\
                 View Link: {}\n",
                file.name,
                file.id,
                file.mime_type,
                size,
                file.web_view_link.as_deref().unwrap_or("N/A")
            )),
            Err(e) => CallToolResult::error(format!("Failed to upload file to Drive: {}", e)),
        }
    }

    pub(super) async fn handle_drive_move(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            file_id: String,
            target_folder_id: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self.drive.move_file(&args.file_id, &args.target_folder_id).await {
            Ok(file) => CallToolResult::text(format!(
                "File moved successfully: {} (ID: {}) to folder ID: {}",
                file.name, file.id, args.target_folder_id
            )),
            Err(e) => CallToolResult::error(format!("Failed to move file {}: {}", args.file_id, e)),
        }
    }

    pub(super) async fn handle_drive_share_file(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            #[serde(rename = "fileId")]
            file_id: String,
            email: String,
            #[serde(default = "default_role")]
            role: String,
            #[serde(default = "default_true")]
            send_notification: bool,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        if !validate_email(&args.email) {
            return CallToolResult::error(format!("Invalid email address: {}", args.email));
        }

        let permission = Permission::user(&args.email, &args.role);
        let shared = async {
            self.drive
                .create_permission(&args.file_id, &permission, Some(args.send_notification))
                .await?;
            self.drive.get_file(&args.file_id, "webViewLink,name").await
        };

        match shared.await {
            Ok(file) => CallToolResult::text(format!(
                "File '{}' shared with {} as {}.\nShareable link: {}",
                file.name,
                args.email,
                args.role,
                file.web_view_link.as_deref().unwrap_or("N/A")
            )),
            Err(e) => CallToolResult::error(format!("Failed to share file {}: {}", args.file_id, e)),
        }
    }

    pub(super) async fn handle_drive_get_shareable_link(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            #[serde(rename = "fileId")]
            file_id: String,
            #[serde(default)]
            make_public: bool,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let linked = async {
            if args.make_public {
                self.drive
                    .create_permission(&args.file_id, &Permission::anyone_reader(), None)
                    .await?;
            }
            self.drive
                .get_file(&args.file_id, "webViewLink,webContentLink,name")
                .await
        };

        match linked.await {
            Ok(file) => {
                let mut response = format!(
                    "File: {}\nView link: {}\n",
                    file.name,
                    file.web_view_link.as_deref().unwrap_or("N/A")
                );
                if let Some(ref link) = file.web_content_link {
                    response.push_str(&format!("Download link: {}", link));
                }
                CallToolResult::text(response)
            }
            Err(e) => CallToolResult::error(format!(
                "Failed to get shareable link for {}: {}",
                args.file_id, e
            )),
        }
    }

    pub(super) async fn handle_drive_create_folder(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            name: String,
            parent_folder_id: Option<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let parent = args.parent_folder_id.as_deref().filter(|p| !p.is_empty());
        let metadata = NewFile::new(&args.name)
            .with_mime_type(FOLDER_MIME_TYPE)
            .in_folder(parent);

        match self.drive.create_metadata(&metadata, "id,name,parents").await {
            Ok(folder) => {
                let location = match parent {
                    Some(p) => format!(" in folder ID: {}", p),
                    None => " in root directory".to_string(),
                };
                CallToolResult::text(format!(
                    "Folder created successfully: '{}' (ID: {}){}",
                    folder.name, folder.id, location
                ))
            }
            Err(e) => CallToolResult::error(format!("Failed to create folder: {}", e)),
        }
    }

    pub(super) async fn handle_drive_list_folder_contents(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            folder_id: String,
            #[serde(default = "default_true")]
            include_subfolders: bool,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let query = children_query(&args.folder_id);
        let request = ListFilesRequest {
            query: &query,
            page_size: 100,
            fields: "id, name, mimeType, size, modifiedTime, owners",
            order_by: Some("folder,name"),
        };

        let items = match self.drive.list_files(&request).await {
            Ok(items) => items,
            Err(e) => return CallToolResult::error(format!("Failed to list folder contents: {}", e)),
        };

        if items.is_empty() {
            return CallToolResult::text("No files or folders found in the specified location.");
        }

        let folder_name = self.folder_display_name(&args.folder_id).await;
        let mut response = folder_listing(&folder_name, &items);

        let folders: Vec<&DriveFile> = items.iter().filter(|f| f.is_folder()).collect();
        if args.include_subfolders && !folders.is_empty() {
            response.push_str(&format!("\n{}\n", "=".repeat(SEPARATOR_WIDTH)));
            response.push_str("SUBFOLDER CONTENTS:\n");

            for folder in folders.iter().take(SUBFOLDER_PREVIEW_COUNT) {
                let query = children_query(&folder.id);
                let request = ListFilesRequest {
                    query: &query,
                    page_size: 20,
                    fields: "id, name, mimeType",
                    order_by: None,
                };
                let children = self.drive.list_files(&request).await;
                if let Err(ref e) = children {
                    tracing::warn!(folder_id = %folder.id, "Could not list subfolder: {}", e);
                }
                response.push_str(&subfolder_preview(&folder.name, children.ok().as_deref()));
            }

            if folders.len() > SUBFOLDER_PREVIEW_COUNT {
                response.push_str(&format!(
                    "\n... and {} more subfolders not shown. Use include_subfolders=False for cleaner output.\n",
                    folders.len() - SUBFOLDER_PREVIEW_COUNT
                ));
            }
        }

        CallToolResult::text(response)
    }

    async fn folder_display_name(&self, folder_id: &str) -> String {
        if folder_id == "root" {
            return "My Drive (Root)".to_string();
        }
        match self.drive.get_file(folder_id, "name").await {
            Ok(folder) if !folder.name.is_empty() => folder.name,
            Ok(_) => "Unknown Folder".to_string(),
            Err(_) => format!("Folder ID: {}", folder_id),
        }
    }

    pub(super) async fn handle_drive_list_all_files(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            #[serde(default = "default_list_all_max")]
            max_results: u32,
            file_type: Option<String>,
            #[serde(default = "default_order_by")]
            order_by: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let file_type = args.file_type.as_deref().filter(|t| !t.is_empty());
        let query = match list_all_query(file_type) {
            Ok(q) => q,
            Err(message) => return CallToolResult::error(message),
        };

        let request = ListFilesRequest {
            query: &query,
            page_size: args.max_results.min(1000),
            fields: "id, name, mimeType, size, modifiedTime, createdTime, owners, parents, shared, webViewLink",
            order_by: Some(&args.order_by),
        };

        match self.drive.list_files(&request).await {
            Ok(items) if items.is_empty() => {
                let filter = file_type
                    .map(|t| format!(" matching filter '{}'", t))
                    .unwrap_or_default();
                CallToolResult::text(format!("No files found{}.", filter))
            }
            Ok(items) => CallToolResult::text(all_files_listing(&items, file_type, &args.order_by)),
            Err(e) => CallToolResult::error(format!("Failed to list all files: {}", e)),
        }
    }

    pub(super) async fn handle_drive_create(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            name: String,
            #[serde(rename = "mimeType")]
            mime_type: String,
            content: String,
            folder_id: Option<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let metadata = NewFile::new(&args.name)
            .with_mime_type(&args.mime_type)
            .in_folder(args.folder_id.as_deref());

        if args.mime_type == DOCUMENT_MIME_TYPE {
            return match self.create_document(&metadata, &args.content).await {
                Ok(doc) => CallToolResult::text(format!(
                    "✅ Google Document created successfully!\n\n📄 **{}**\n🆔 Document ID: {}\n🔗 Link: {}",
                    args.name,
                    doc.id,
                    doc.web_view_link.as_deref().unwrap_or("N/A")
                )),
                Err(e) => CallToolResult::error(format!("Failed to create file: {}", e)),
            };
        }

        let created = async {
            let bytes = encode_upload_content(&args.mime_type, &args.content)?;
            self.drive
                .create_with_content(&metadata, &args.mime_type, bytes, "id,name,mimeType,webViewLink")
                .await
        };

        match created.await {
            Ok(file) => CallToolResult::text(format!(
                "✅ File created successfully!\n\n📄 **{}**\n🆔 ID: {}\n📋 MIME type: {}\n🔗 Link: {}",
                file.name,
                file.id,
                file.mime_type,
                file.web_view_link.as_deref().unwrap_or("N/A")
            )),
            Err(e) => CallToolResult::error(format!("Failed to create file: {}", e)),
        }
    }

    /// Create an empty Google Doc, then fill it through the Docs API
    async fn create_document(&self, metadata: &NewFile, content: &str) -> Result<DriveFile> {
        let created = self.drive.create_metadata(metadata, "id").await?;
        if !content.is_empty() {
            self.drive.insert_document_text(&created.id, content).await?;
        }
        let mut doc = self.drive.get_file(&created.id, "webViewLink,name").await?;
        doc.id = created.id;
        Ok(doc)
    }
}

// ==================== Rendering ====================

/// Tool text for downloaded or exported file content
pub(crate) fn render_file_content(file: &DriveFile, content: FileContent) -> String {
    match content {
        FileContent::Text(text) => format!("File: {}\nContent:\n\n{}", file.name, text),
        FileContent::PdfText(text) => format!("File: {}\nExtracted Text Content:\n\n{}", file.name, text),
        FileContent::Binary(bytes) if bytes.len() <= MAX_INLINE_BINARY => format!(
            "File: {}\nBinary file (Base64 encoded):\n\n{}",
            file.name,
            STANDARD.encode(&bytes)
        ),
        FileContent::Binary(bytes) => format!(
            "File: {}\nBinary file too large to encode. File size: {} bytes, MIME type: {}",
            file.name,
            bytes.len(),
            file.mime_type
        ),
    }
}

fn size_suffix(file: &DriveFile) -> String {
    match file.size.as_deref() {
        Some(size) if !size.is_empty() => format!(" - {}", format_size_str(size)),
        _ => String::new(),
    }
}

fn folder_listing(folder_name: &str, items: &[DriveFile]) -> String {
    let (folders, files): (Vec<&DriveFile>, Vec<&DriveFile>) = items.iter().partition(|f| f.is_folder());

    let mut response = format!("Contents of '{}':\n", folder_name);
    response.push_str(&format!(
        "Total items: {} ({} folders, {} files)\n\n",
        items.len(),
        folders.len(),
        files.len()
    ));

    if !folders.is_empty() {
        response.push_str("📁 FOLDERS:\n");
        for folder in &folders {
            response.push_str(&format!(
                "  📁 {} (ID: {}) - Modified: {}\n",
                folder.name,
                folder.id,
                folder.modified_date()
            ));
        }
        response.push('\n');
    }

    if !files.is_empty() {
        response.push_str("📄 FILES:\n");
        for file in &files {
            response.push_str(&format!(
                "  {} {} (ID: {}){} - Modified: {}\n",
                file_type_emoji(&file.mime_type),
                file.name,
                file.id,
                size_suffix(file),
                file.modified_date()
            ));
        }
    }

    response
}

/// Preview block for one subfolder; `None` when it could not be listed
fn subfolder_preview(folder_name: &str, children: Option<&[DriveFile]>) -> String {
    let Some(children) = children else {
        return format!("\n📁 {}: [Could not access contents]\n", folder_name);
    };
    if children.is_empty() {
        return String::new();
    }

    let mut block = format!("\n📁 {} ({} items):\n", folder_name, children.len());
    for item in children.iter().take(SUBFOLDER_PREVIEW_ITEMS) {
        block.push_str(&format!(
            "    {} {} (ID: {})\n",
            file_type_emoji(&item.mime_type),
            item.name,
            item.id
        ));
    }
    if children.len() > SUBFOLDER_PREVIEW_ITEMS {
        block.push_str(&format!(
            "    ... and {} more items\n",
            children.len() - SUBFOLDER_PREVIEW_ITEMS
        ));
    }
    block
}

fn all_files_listing(items: &[DriveFile], file_type: Option<&str>, order_by: &str) -> String {
    let (folders, files): (Vec<&DriveFile>, Vec<&DriveFile>) = items.iter().partition(|f| f.is_folder());
    let filter = file_type
        .map(|t| format!(" (filtered by: {})", t))
        .unwrap_or_default();
    let mut response = format!("All Files in Google Drive{}:\n", filter);
    response.push_str(&format!(
        "Showing {} items (ordered by {}):\n\n",
        items.len(),
        order_by
    ));

    if !folders.is_empty() {
        response.push_str(&format!("📁 FOLDERS ({}):\n", folders.len()));
        for folder in &folders {
            response.push_str(&format!(
                "  📁 {} (ID: {}) - Modified: {}{}\n",
                folder.name,
                folder.id,
                folder.modified_date(),
                shared_marker(folder)
            ));
        }
        response.push('\n');
    }

    if !files.is_empty() {
        response.push_str(&format!("📄 FILES ({}):\n", files.len()));
        for file in &files {
            response.push_str(&format!(
                "  {} {} (ID: {}){} - Modified: {}{}\n",
                file_type_emoji(&file.mime_type),
                file.name,
                file.id,
                size_suffix(file),
                file.modified_date(),
                shared_marker(file)
            ));
        }
    }

    let sizes: Vec<u64> = items.iter().filter_map(DriveFile::size_bytes).collect();

    response.push_str("\n📊 SUMMARY:\n");
    response.push_str(&format!("  Total items: {}\n", items.len()));
    response.push_str(&format!("  Folders: {}\n", folders.len()));
    response.push_str(&format!("  Files: {}\n", files.len()));
    if !sizes.is_empty() {
        response.push_str(&format!(
            "  Total size (files with size info): {}\n",
            format_size(sizes.iter().sum())
        ));
    }

    response
}

fn shared_marker(file: &DriveFile) -> &'static str {
    if file.shared {
        " [SHARED]"
    } else {
        ""
    }
}

fn default_role() -> String {
    "reader".to_string()
}

fn default_list_all_max() -> u32 {
    50
}

fn default_order_by() -> String {
    "name".to_string()
}

// ==================== Schema Definitions ====================

fn file_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fileId": {
                "type": "string",
                "description": "ID of the Google Drive file"
            }
        },
        "required": ["fileId"]
    })
}

fn drive_search_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Text to search for in file names and contents"
            }
        },
        "required": ["query"]
    })
}

fn drive_edit_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fileId": {
                "type": "string",
                "description": "ID of the file to edit"
            },
            "content": {
                "type": "string",
                "description": "New content; base64 for binary files, plain text otherwise"
            }
        },
        "required": ["fileId", "content"]
    })
}

fn drive_upload_file_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "file_path": {
                "type": "string",
                "description": "Path to the local file to upload"
            },
            "file_name": {
                "type": "string",
                "description": "Name for the uploaded file (defaults to the local file name)"
            },
            "folder_id": {
                "type": "string",
                "description": "Drive folder to upload into (defaults to root)"
            }
        },
        "required": ["file_path"]
    })
}

fn drive_move_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fileId": {
                "type": "string",
                "description": "ID of the file to move"
            },
            "targetFolderId": {
                "type": "string",
                "description": "ID of the destination folder"
            }
        },
        "required": ["fileId", "targetFolderId"]
    })
}

fn drive_share_file_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fileId": {
                "type": "string",
                "description": "ID of the file to share"
            },
            "email": {
                "type": "string",
                "description": "Email address to share with"
            },
            "role": {
                "type": "string",
                "enum": ["reader", "commenter", "writer"],
                "default": "reader",
                "description": "Permission level"
            },
            "send_notification": {
                "type": "boolean",
                "default": true,
                "description": "Whether to send an email notification"
            }
        },
        "required": ["fileId", "email"]
    })
}

fn drive_get_shareable_link_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fileId": {
                "type": "string",
                "description": "ID of the file"
            },
            "make_public": {
                "type": "boolean",
                "default": false,
                "description": "Make the file readable by anyone with the link"
            }
        },
        "required": ["fileId"]
    })
}

fn drive_create_folder_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "Name of the folder to create"
            },
            "parent_folder_id": {
                "type": "string",
                "description": "ID of the parent folder (omit for root)"
            }
        },
        "required": ["name"]
    })
}

fn drive_list_folder_contents_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "folder_id": {
                "type": "string",
                "description": "ID of the folder to list, 'root' for My Drive"
            },
            "include_subfolders": {
                "type": "boolean",
                "default": true,
                "description": "Preview the contents of the first subfolders"
            }
        },
        "required": ["folder_id"]
    })
}

fn drive_list_all_files_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "max_results": {
                "type": "integer",
                "default": 50,
                "maximum": 1000,
                "description": "Maximum number of items to return"
            },
            "file_type": {
                "type": "string",
                "enum": ["folder", "document", "spreadsheet", "presentation", "pdf", "image", "video", "audio", "text"],
                "description": "Only list files of this type"
            },
            "order_by": {
                "type": "string",
                "default": "name",
                "description": "Sort order, e.g. 'name', 'modifiedTime', 'createdTime', 'quotaBytesUsed'"
            }
        }
    })
}

fn drive_create_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "Name of the file"
            },
            "mimeType": {
                "type": "string",
                "description": "MIME type, e.g. 'application/vnd.google-apps.document', 'application/pdf', 'text/plain'"
            },
            "content": {
                "type": "string",
                "description": "File content; the document text for Google Docs"
            },
            "folder_id": {
                "type": "string",
                "description": "Drive folder to create the file in"
            }
        },
        "required": ["name", "mimeType", "content"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, name: &str, mime: &str, size: Option<&str>) -> DriveFile {
        DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime.to_string(),
            size: size.map(str::to_string),
            modified_time: Some("2024-05-01T10:00:00.000Z".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_binary_content() {
        let png = file("1", "logo.png", "image/png", None);
        let text = render_file_content(&png, FileContent::Binary(vec![0, 1, 2]));
        assert_eq!(text, "File: logo.png\nBinary file (Base64 encoded):\n\nAAEC");

        let big = render_file_content(&png, FileContent::Binary(vec![0; MAX_INLINE_BINARY + 1]));
        assert!(big.contains("too large to encode"));
        assert!(big.contains(&format!("{} bytes, MIME type: image/png", MAX_INLINE_BINARY + 1)));
    }

    #[test]
    fn test_render_pdf_content() {
        let pdf = file("1", "a.pdf", "application/pdf", None);
        let text = render_file_content(&pdf, FileContent::PdfText("Page 1:\nhi".to_string()));
        assert_eq!(text, "File: a.pdf\nExtracted Text Content:\n\nPage 1:\nhi");
    }

    #[test]
    fn test_folder_listing_orders_folders_first() {
        let items = vec![
            file("f1", "Docs", FOLDER_MIME_TYPE, None),
            file("a1", "notes.txt", "text/plain", Some("2048")),
            file("a2", "Plan", DOCUMENT_MIME_TYPE, None),
        ];
        let text = folder_listing("Work", &items);

        assert!(text.starts_with("Contents of 'Work':\nTotal items: 3 (1 folders, 2 files)\n\n"));
        assert!(text.contains("📁 FOLDERS:\n  📁 Docs (ID: f1) - Modified: 2024-05-01\n\n📄 FILES:\n"));
        assert!(text.contains("  📄 notes.txt (ID: a1) - 2.0 KB - Modified: 2024-05-01\n"));
        assert!(text.contains("  📝 Plan (ID: a2) - Modified: 2024-05-01\n"));
    }

    #[test]
    fn test_subfolder_preview_truncates() {
        let children: Vec<DriveFile> = (0..12)
            .map(|i| file(&format!("c{}", i), &format!("f{}.txt", i), "text/plain", None))
            .collect();
        let block = subfolder_preview("Docs", Some(children.as_slice()));
        assert!(block.starts_with("\n📁 Docs (12 items):\n"));
        assert!(block.contains("    📄 f9.txt (ID: c9)\n"));
        assert!(!block.contains("f10.txt"));
        assert!(block.ends_with("    ... and 2 more items\n"));

        assert_eq!(subfolder_preview("Docs", Some(&[][..])), "");
        assert_eq!(
            subfolder_preview("Private", None),
            "\n📁 Private: [Could not access contents]\n"
        );
    }

    #[test]
    fn test_all_files_listing_summary() {
        let mut shared = file("f1", "Team", FOLDER_MIME_TYPE, None);
        shared.shared = true;
        let items = vec![
            shared,
            file("a1", "a.bin", "application/octet-stream", Some("1024")),
            file("a2", "b.bin", "application/octet-stream", Some("512")),
        ];
        let text = all_files_listing(&items, Some("pdf"), "name");

        assert!(text.starts_with("All Files in Google Drive (filtered by: pdf):\nShowing 3 items (ordered by name):\n\n"));
        assert!(text.contains("  📁 Team (ID: f1) - Modified: 2024-05-01 [SHARED]\n"));
        assert!(text.contains("📄 FILES (2):\n"));
        assert!(text.contains("  Total items: 3\n  Folders: 1\n  Files: 2\n"));
        assert!(text.ends_with("  Total size (files with size info): 1.5 KB\n"));
    }

    #[test]
    fn test_all_files_listing_without_sizes() {
        let items = vec![file("d1", "Plan", DOCUMENT_MIME_TYPE, None)];
        let text = all_files_listing(&items, None, "modifiedTime");
        assert!(text.starts_with("All Files in Google Drive:\n"));
        assert!(!text.contains("Total size"));
    }
}
