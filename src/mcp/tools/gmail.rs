//! Gmail tools

use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{default_true, parse_args, tool_def, ToolHandler};
use crate::drive::types::Permission;
use crate::error::Result;
use crate::format::{clean_sender, format_size, truncate_chars};
use crate::gmail::client::SUMMARY_HEADERS;
use crate::gmail::mime::{
    extract_attachments, list_attachments, resolve_body, AttachmentDescriptor, ExtractOptions,
};
use crate::gmail::types::{Message, MessagePart};
use crate::gmail::utils::{extract_address, load_attachment, validate_recipients, EmailParams};
use crate::mcp::types::{CallToolResult, Tool};

const PREVIEW_CHARS: usize = 300;
const SUMMARY_PREVIEW_CHARS: usize = 200;

pub(super) fn tools() -> Vec<Tool> {
    vec![
        tool_def("gmail_list_messages", "List recent emails with sender, subject and date", gmail_list_messages_schema()),
        tool_def("gmail_read_message", "Read the body of an email with optional attachment info", gmail_read_message_schema()),
        tool_def("gmail_read_attachments", "Read email attachments from one message or from a search of recent emails", gmail_read_attachments_schema()),
        tool_def("gmail_search_and_summarize", "Search emails and summarize each match", gmail_search_and_summarize_schema()),
        tool_def("gmail_send_message", "Send a plain text email", gmail_send_message_schema()),
        tool_def("gmail_list_labels", "List all Gmail labels", json!({"type": "object", "properties": {}})),
        tool_def("gmail_modify_labels", "Add or remove labels on an email", gmail_modify_labels_schema()),
        tool_def("gmail_delete_message", "Move an email to the trash", message_id_schema()),
        tool_def("gmail_send_with_drive_attachment", "Send an email linking a Google Drive file", gmail_send_with_drive_attachment_schema()),
        tool_def("gmail_send_multiple_attachments", "Send an email with local files attached", gmail_send_multiple_attachments_schema()),
    ]
}

impl ToolHandler {
    pub(super) async fn handle_gmail_list_messages(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            #[serde(default = "default_max_results")]
            max_results: u32,
            query: Option<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let refs = match self
            .gmail
            .list_messages(args.query.as_deref(), args.max_results)
            .await
        {
            Ok(refs) => refs,
            Err(e) => return CallToolResult::error(format!("Failed to list messages: {}", e)),
        };

        if refs.is_empty() {
            return CallToolResult::text("No messages found.");
        }

        let mut entries = Vec::with_capacity(refs.len());
        for message_ref in &refs {
            match self
                .gmail
                .get_message_metadata(&message_ref.id, SUMMARY_HEADERS)
                .await
            {
                Ok(message) => entries.push(message_summary(&message)),
                Err(e) => entries.push(format!(
                    "ID: {}\nError: Could not fetch details - {}\n",
                    message_ref.id, e
                )),
            }
        }

        CallToolResult::text(format!("\n{}\n{}", "=".repeat(50), entries.join("\n")))
    }

    pub(super) async fn handle_gmail_read_message(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            message_id: String,
            #[serde(default = "default_true")]
            include_attachments_info: bool,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self.gmail.get_message(&args.message_id).await {
            Ok(message) => CallToolResult::text(message_details(&message, args.include_attachments_info)),
            Err(e) => CallToolResult::error(format!("Failed to read message: {}", e)),
        }
    }

    pub(super) async fn handle_gmail_read_attachments(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            message_id: Option<String>,
            sender: Option<String>,
            subject_contains: Option<String>,
            #[serde(default = "default_days_back")]
            days_back: u32,
            #[serde(default = "default_attachment_search_max")]
            max_results: u32,
            #[serde(default = "default_max_attachment_size_mb")]
            max_attachment_size_mb: u64,
            #[serde(default = "default_true")]
            read_text_content: bool,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let options = ExtractOptions {
            max_size_mb: args.max_attachment_size_mb,
            read_content: args.read_text_content,
        };

        if let Some(message_id) = args.message_id.as_deref().filter(|id| !id.is_empty()) {
            return match self.message_attachments(message_id, &options).await {
                Ok(report) => CallToolResult::text(report),
                Err(e) => CallToolResult::error(format!("Failed to process email {}: {}", message_id, e)),
            };
        }

        let after = Local::now().date_naive() - Duration::days(i64::from(args.days_back));
        let query = attachment_search_query(
            after,
            args.sender.as_deref(),
            args.subject_contains.as_deref(),
        );

        let refs = match self.gmail.list_messages(Some(&query), args.max_results).await {
            Ok(refs) => refs,
            Err(e) => return CallToolResult::error(format!("Failed to read attachments: {}", e)),
        };

        if refs.is_empty() {
            return CallToolResult::text(format!(
                "No emails with attachments found.\nSearch criteria: {}",
                query
            ));
        }

        let mut response = format!("FOUND {} EMAIL(S) WITH ATTACHMENTS\n", refs.len());
        response.push_str(&format!("Search Query: {}\n\n", query));

        for (i, message_ref) in refs.iter().enumerate() {
            let report = match self.message_attachments(&message_ref.id, &options).await {
                Ok(report) => report,
                Err(e) => format!("Error processing email {}: {}", message_ref.id, e),
            };
            response.push_str(&format!("EMAIL {}:\n{}\n", i + 1, report));
            response.push_str(&format!("{}\n", "=".repeat(60)));
        }

        CallToolResult::text(response)
    }

    /// Fetch a message and render its attachments, downloading within limits
    async fn message_attachments(&self, message_id: &str, options: &ExtractOptions) -> Result<String> {
        let message = self.gmail.get_message(message_id).await?;
        let payload = message.payload.clone().unwrap_or_default();
        let source = self.gmail.attachments_of(message_id);
        let attachments = extract_attachments(&payload, &source, options).await;

        tracing::debug!(
            message_id,
            count = attachments.len(),
            "Processed message attachments"
        );
        Ok(attachment_report(&message, &attachments))
    }

    pub(super) async fn handle_gmail_search_and_summarize(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            query: Option<String>,
            sender: Option<String>,
            recipient: Option<String>,
            subject_contains: Option<String>,
            #[serde(default = "default_max_results")]
            max_results: u32,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let query = summarize_query(
            args.query.as_deref(),
            args.sender.as_deref(),
            args.recipient.as_deref(),
            args.subject_contains.as_deref(),
        );

        let refs = match self.gmail.list_messages(Some(&query), args.max_results).await {
            Ok(refs) => refs,
            Err(e) => return CallToolResult::error(format!("Search failed: {}", e)),
        };

        if refs.is_empty() {
            return CallToolResult::text(format!("No emails found for query: {}", query));
        }

        let mut response = format!("SEARCH RESULTS ({} emails):\n", refs.len());
        response.push_str(&format!("Query: {}\n\n", query));

        for (i, message_ref) in refs.iter().enumerate() {
            match self.gmail.get_message(&message_ref.id).await {
                Ok(message) => response.push_str(&search_summary(i + 1, &message)),
                Err(e) => response.push_str(&format!(
                    "{}. Error processing email {}: {}\n\n",
                    i + 1,
                    message_ref.id,
                    e
                )),
            }
        }

        CallToolResult::text(response)
    }

    pub(super) async fn handle_gmail_send_message(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            to: String,
            subject: String,
            body: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        if let Err(e) = validate_recipients(&args.to) {
            return CallToolResult::error(e.to_string());
        }

        let params = EmailParams {
            to: args.to.clone(),
            subject: args.subject.clone(),
            body: args.body,
            ..Default::default()
        };

        match self.send_from_profile(params).await {
            Ok(sent) => CallToolResult::text(format!(
                "Email sent successfully!\nMessage ID: {}\nTo: {}\nSubject: {}",
                sent.id, args.to, args.subject
            )),
            Err(e) => CallToolResult::error(format!("Failed to send email: {}", e)),
        }
    }

    /// Send with the mailbox profile address as `From`
    async fn send_from_profile(&self, mut params: EmailParams) -> Result<Message> {
        let profile = self.gmail.get_profile().await?;
        params.from = Some(profile.email_address);
        self.gmail.send_email(&params).await
    }

    pub(super) async fn handle_gmail_list_labels(&self) -> CallToolResult {
        match self.gmail.list_labels().await {
            Ok(labels) if labels.is_empty() => CallToolResult::text("No labels found."),
            Ok(labels) => {
                let mut result = "GMAIL LABELS:\n".to_string();
                for label in &labels {
                    result.push_str(&format!("- {} (ID: {})\n", label.name, label.id));
                }
                CallToolResult::text(result)
            }
            Err(e) => CallToolResult::error(format!("Failed to list labels: {}", e)),
        }
    }

    pub(super) async fn handle_gmail_modify_labels(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            message_id: String,
            #[serde(default)]
            add_labels: Vec<String>,
            #[serde(default)]
            remove_labels: Vec<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let summary = label_changes(&args.add_labels, &args.remove_labels);
        match self
            .gmail
            .modify_message(&args.message_id, args.add_labels, args.remove_labels)
            .await
        {
            Ok(_) => CallToolResult::text(format!(
                "Labels updated for message {}\n{}",
                args.message_id, summary
            )),
            Err(e) => CallToolResult::error(format!("Failed to modify labels: {}", e)),
        }
    }

    pub(super) async fn handle_gmail_delete_message(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            message_id: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self.gmail.trash_message(&args.message_id).await {
            Ok(()) => CallToolResult::text(format!("Email {} moved to trash.", args.message_id)),
            Err(e) => CallToolResult::error(format!("Failed to delete email: {}", e)),
        }
    }

    pub(super) async fn handle_gmail_send_with_drive_attachment(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            to: String,
            subject: String,
            body: String,
            drive_file_id: String,
            #[serde(default = "default_true")]
            share_with_recipient: bool,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        if let Err(e) = validate_recipients(&args.to) {
            return CallToolResult::error(e.to_string());
        }

        let file = match self.drive.get_file(&args.drive_file_id, "name,webViewLink").await {
            Ok(file) => file,
            Err(e) => {
                return CallToolResult::error(format!(
                    "Failed to send email with Drive attachment: {}",
                    e
                ))
            }
        };
        let link = file.web_view_link.as_deref().unwrap_or("N/A");

        let share_status = if args.share_with_recipient {
            let permission = Permission::user(extract_address(&args.to), "reader");
            match self
                .drive
                .create_permission(&args.drive_file_id, &permission, Some(false))
                .await
            {
                Ok(()) => "shared with recipient",
                Err(e) => {
                    tracing::warn!(file_id = %args.drive_file_id, "Sharing with recipient failed: {}", e);
                    "sharing failed"
                }
            }
        } else {
            "not shared"
        };

        let params = EmailParams {
            to: args.to,
            subject: args.subject,
            body: format!(
                "{}\n\n---\nAttached Google Drive File: {}\nLink: {}",
                args.body, file.name, link
            ),
            ..Default::default()
        };

        match self.send_from_profile(params).await {
            Ok(sent) => CallToolResult::text(format!(
                "Email sent with Drive file!\nMessage ID: {}\nFile: {} ({})\nLink: {}",
                sent.id, file.name, share_status, link
            )),
            Err(e) => CallToolResult::error(format!(
                "Failed to send email with Drive attachment: {}",
                e
            )),
        }
    }

    pub(super) async fn handle_gmail_send_multiple_attachments(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            to: String,
            subject: String,
            body: String,
            file_paths: Vec<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let missing: Vec<&str> = args
            .file_paths
            .iter()
            .filter(|p| !std::path::Path::new(p).is_file())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return CallToolResult::error(format!("Files not found: {}", missing.join(", ")));
        }

        if let Err(e) = validate_recipients(&args.to) {
            return CallToolResult::error(e.to_string());
        }

        let mut attachments = Vec::with_capacity(args.file_paths.len());
        for path in &args.file_paths {
            match load_attachment(path) {
                Ok(attachment) => attachments.push(attachment),
                Err(e) => {
                    return CallToolResult::error(format!(
                        "Failed to load attachment '{}': {}",
                        path, e
                    ))
                }
            }
        }

        let files_info: Vec<String> = attachments
            .iter()
            .map(|a| format!("{} ({})", a.filename, format_size(a.data.len() as u64)))
            .collect();
        let total_size: u64 = attachments.iter().map(|a| a.data.len() as u64).sum();
        let count = attachments.len();

        let params = EmailParams {
            to: args.to,
            subject: args.subject,
            body: args.body,
            attachments,
            ..Default::default()
        };

        match self.send_from_profile(params).await {
            Ok(sent) => CallToolResult::text(format!(
                "Email sent with {} attachments!\nMessage ID: {}\nFiles: {}\nTotal Size: {}",
                count,
                sent.id,
                files_info.join(", "),
                format_size(total_size)
            )),
            Err(e) => CallToolResult::error(format!("Failed to send email with attachments: {}", e)),
        }
    }
}

// ==================== Rendering ====================

fn header_or<'a>(message: &'a Message, name: &str, fallback: &'a str) -> &'a str {
    message.header(name).unwrap_or(fallback)
}

fn message_summary(message: &Message) -> String {
    format!(
        "ID: {}\nSubject: {}\nFrom: {}\nTo: {}\nDate: {}\n",
        message.id,
        header_or(message, "Subject", "No Subject"),
        clean_sender(header_or(message, "From", "Unknown Sender")),
        header_or(message, "To", "Unknown Recipient"),
        header_or(message, "Date", "Unknown Date")
    )
}

fn message_details(message: &Message, include_attachments: bool) -> String {
    let empty = MessagePart::default();
    let payload = message.payload.as_ref().unwrap_or(&empty);

    let mut response = "EMAIL DETAILS:\n".to_string();
    response.push_str(&format!("Message ID: {}\n", message.id));
    response.push_str(&format!("Subject: {}\n", header_or(message, "Subject", "No Subject")));
    response.push_str(&format!(
        "From: {}\n",
        clean_sender(header_or(message, "From", "Unknown Sender"))
    ));
    response.push_str(&format!("To: {}\n", header_or(message, "To", "Unknown Recipient")));
    response.push_str(&format!("Date: {}\n\n", header_or(message, "Date", "Unknown Date")));
    response.push_str(&format!("BODY:\n{}\n", resolve_body(payload)));

    if include_attachments {
        let attachments = list_attachments(payload);
        if attachments.is_empty() {
            response.push_str("\nNo attachments found.\n");
        } else {
            response.push_str(&format!("\nATTACHMENTS ({}):\n", attachments.len()));
            for (i, attachment) in attachments.iter().enumerate() {
                response.push_str(&format!(
                    "{}. {} ({}, {})\n",
                    i + 1,
                    attachment.filename,
                    attachment.size,
                    attachment.mime_type
                ));
            }
        }
    }

    response
}

fn attachment_report(message: &Message, attachments: &[AttachmentDescriptor]) -> String {
    let mut response = format!("Subject: {}\n", header_or(message, "Subject", "No Subject"));
    response.push_str(&format!(
        "From: {}\n",
        clean_sender(header_or(message, "From", "Unknown Sender"))
    ));
    response.push_str(&format!("Date: {}\n", header_or(message, "Date", "Unknown Date")));
    response.push_str(&format!("Message ID: {}\n\n", message.id));

    if attachments.is_empty() {
        response.push_str("No attachments found in this email.");
        return response;
    }

    response.push_str(&format!("ATTACHMENTS ({}):\n", attachments.len()));
    for (i, attachment) in attachments.iter().enumerate() {
        response.push_str(&format!("\n{}. {}\n", i + 1, attachment.filename));
        response.push_str(&format!("   Type: {}\n", attachment.mime_type));
        response.push_str(&format!("   Size: {}\n", attachment.size));
        response.push_str(&format!("   Status: {}\n", attachment.status));

        if let Some(ref preview) = attachment.content_preview {
            response.push_str(&format!(
                "   Content Preview:\n   {}...\n",
                truncate_chars(preview, PREVIEW_CHARS)
            ));
        }
    }

    response
}

fn search_summary(index: usize, message: &Message) -> String {
    let body = message
        .payload
        .as_ref()
        .map(resolve_body)
        .unwrap_or_default();

    format!(
        "{}. {}\n   From: {}\n   Date: {}\n   Preview: {}\n   ID: {}\n\n",
        index,
        header_or(message, "Subject", "No Subject"),
        clean_sender(header_or(message, "From", "Unknown")),
        header_or(message, "Date", "Unknown"),
        body_preview(&body),
        message.id
    )
}

/// First characters of a body on one line, marked when cut
fn body_preview(body: &str) -> String {
    if body.chars().count() > SUMMARY_PREVIEW_CHARS {
        let head = truncate_chars(body, SUMMARY_PREVIEW_CHARS).replace('\n', " ");
        format!("{}...", head.trim())
    } else {
        body.to_string()
    }
}

fn attachment_search_query(after: NaiveDate, sender: Option<&str>, subject: Option<&str>) -> String {
    let mut parts = vec![
        "has:attachment".to_string(),
        format!("after:{}", after.format("%Y/%m/%d")),
    ];
    if let Some(sender) = sender.filter(|s| !s.is_empty()) {
        parts.push(format!("from:({})", sender));
    }
    if let Some(subject) = subject.filter(|s| !s.is_empty()) {
        parts.push(format!("subject:\"{}\"", subject));
    }
    parts.join(" ")
}

fn summarize_query(
    query: Option<&str>,
    sender: Option<&str>,
    recipient: Option<&str>,
    subject: Option<&str>,
) -> String {
    let present = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);

    let parts: Vec<String> = [
        present(sender).map(|s| format!("from:({})", s)),
        present(recipient).map(|r| format!("to:({})", r)),
        present(subject).map(|s| format!("subject:({})", s)),
        present(query).map(|q| format!("({})", q)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        "in:inbox".to_string()
    } else {
        parts.join(" ")
    }
}

fn label_changes(add: &[String], remove: &[String]) -> String {
    let mut actions = Vec::new();
    if !add.is_empty() {
        actions.push(format!("Added: {}", add.join(", ")));
    }
    if !remove.is_empty() {
        actions.push(format!("Removed: {}", remove.join(", ")));
    }
    actions.join(" | ")
}

fn default_max_results() -> u32 {
    10
}

fn default_attachment_search_max() -> u32 {
    5
}

fn default_days_back() -> u32 {
    7
}

fn default_max_attachment_size_mb() -> u64 {
    10
}

// ==================== Schema Definitions ====================

fn message_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message_id": {
                "type": "string",
                "description": "ID of the email message"
            }
        },
        "required": ["message_id"]
    })
}

fn gmail_list_messages_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "max_results": {
                "type": "integer",
                "default": 10,
                "description": "Maximum number of messages to list"
            },
            "query": {
                "type": "string",
                "description": "Gmail search query (e.g., 'is:unread from:boss@example.com')"
            }
        }
    })
}

fn gmail_read_message_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message_id": {
                "type": "string",
                "description": "ID of the email message to read"
            },
            "include_attachments_info": {
                "type": "boolean",
                "default": true,
                "description": "List attachment names, sizes and types"
            }
        },
        "required": ["message_id"]
    })
}

fn gmail_read_attachments_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message_id": {
                "type": "string",
                "description": "Read attachments of this email only"
            },
            "sender": {
                "type": "string",
                "description": "Filter by sender email or name"
            },
            "subject_contains": {
                "type": "string",
                "description": "Filter by subject keywords"
            },
            "days_back": {
                "type": "integer",
                "default": 7,
                "description": "How many days back to search"
            },
            "max_results": {
                "type": "integer",
                "default": 5,
                "description": "Maximum number of emails to process"
            },
            "max_attachment_size_mb": {
                "type": "integer",
                "default": 10,
                "description": "Attachments larger than this are not downloaded"
            },
            "read_text_content": {
                "type": "boolean",
                "default": true,
                "description": "Include a preview of downloaded content"
            }
        }
    })
}

fn gmail_search_and_summarize_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Free-form Gmail search query"
            },
            "sender": {
                "type": "string",
                "description": "Filter by sender"
            },
            "recipient": {
                "type": "string",
                "description": "Filter by recipient"
            },
            "subject_contains": {
                "type": "string",
                "description": "Filter by subject"
            },
            "max_results": {
                "type": "integer",
                "default": 10,
                "description": "Maximum number of emails to summarize"
            }
        }
    })
}

fn gmail_send_message_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "to": {
                "type": "string",
                "description": "Recipient email address(es), comma separated"
            },
            "subject": {
                "type": "string",
                "description": "Email subject"
            },
            "body": {
                "type": "string",
                "description": "Email body (plain text)"
            }
        },
        "required": ["to", "subject", "body"]
    })
}

fn gmail_modify_labels_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message_id": {
                "type": "string",
                "description": "ID of the email message to modify"
            },
            "add_labels": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Label IDs to add"
            },
            "remove_labels": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Label IDs to remove"
            }
        },
        "required": ["message_id"]
    })
}

fn gmail_send_with_drive_attachment_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "to": {
                "type": "string",
                "description": "Recipient email address"
            },
            "subject": {
                "type": "string",
                "description": "Email subject"
            },
            "body": {
                "type": "string",
                "description": "Email body (plain text)"
            },
            "drive_file_id": {
                "type": "string",
                "description": "ID of the Google Drive file to link"
            },
            "share_with_recipient": {
                "type": "boolean",
                "default": true,
                "description": "Grant the recipient read access to the file"
            }
        },
        "required": ["to", "subject", "body", "drive_file_id"]
    })
}

fn gmail_send_multiple_attachments_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "to": {
                "type": "string",
                "description": "Recipient email address(es), comma separated"
            },
            "subject": {
                "type": "string",
                "description": "Email subject"
            },
            "body": {
                "type": "string",
                "description": "Email body (plain text)"
            },
            "file_paths": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Local files to attach"
            }
        },
        "required": ["to", "subject", "body", "file_paths"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::mime::AttachmentStatus;
    use crate::gmail::types::{Header, MessagePartBody};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn message(headers: &[(&str, &str)], payload_parts: Vec<MessagePart>) -> Message {
        Message {
            id: "m1".to_string(),
            thread_id: None,
            label_ids: vec![],
            snippet: None,
            payload: Some(MessagePart {
                mime_type: Some("multipart/mixed".to_string()),
                headers: headers
                    .iter()
                    .map(|(name, value)| Header {
                        name: name.to_string(),
                        value: value.to_string(),
                    })
                    .collect(),
                parts: payload_parts,
                ..Default::default()
            }),
        }
    }

    fn text_part(text: &str) -> MessagePart {
        MessagePart {
            mime_type: Some("text/plain".to_string()),
            body: Some(MessagePartBody {
                data: Some(URL_SAFE_NO_PAD.encode(text)),
                size: text.len() as i64,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn attachment_part(filename: &str, size: i64) -> MessagePart {
        MessagePart {
            mime_type: Some("application/pdf".to_string()),
            filename: Some(filename.to_string()),
            body: Some(MessagePartBody {
                attachment_id: Some("att-1".to_string()),
                size,
                data: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_message_summary_defaults() {
        let msg = message(&[("From", "\"Jane Doe\" <jane@example.com>")], vec![]);
        assert_eq!(
            message_summary(&msg),
            "ID: m1\nSubject: No Subject\nFrom: Jane Doe\nTo: Unknown Recipient\nDate: Unknown Date\n"
        );
    }

    #[test]
    fn test_message_details_with_attachments() {
        let msg = message(
            &[("Subject", "Report"), ("From", "bob@example.com")],
            vec![text_part("See attached."), attachment_part("q1.pdf", 1536)],
        );
        let text = message_details(&msg, true);
        assert!(text.starts_with("EMAIL DETAILS:\nMessage ID: m1\nSubject: Report\nFrom: bob@example.com\n"));
        assert!(text.contains("\n\nBODY:\nSee attached.\n"));
        assert!(text.ends_with("\nATTACHMENTS (1):\n1. q1.pdf (1.5 KB, application/pdf)\n"));

        let without = message_details(&msg, false);
        assert!(!without.contains("ATTACHMENTS"));
    }

    #[test]
    fn test_message_details_without_payload() {
        let mut msg = message(&[], vec![]);
        msg.payload = None;
        let text = message_details(&msg, true);
        assert!(text.contains("BODY:\nNo readable text content found.\n"));
        assert!(text.ends_with("\nNo attachments found.\n"));
    }

    #[test]
    fn test_attachment_report_truncates_preview() {
        let msg = message(&[("Subject", "Logs")], vec![]);
        let descriptor = AttachmentDescriptor {
            filename: "log.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size: "400 B".to_string(),
            size_bytes: 400,
            attachment_id: "a".to_string(),
            status: AttachmentStatus::Downloaded,
            content_preview: Some("x".repeat(400)),
        };
        let text = attachment_report(&msg, &[descriptor]);
        assert!(text.contains("ATTACHMENTS (1):\n\n1. log.txt\n   Type: text/plain\n   Size: 400 B\n   Status: Successfully downloaded\n"));
        assert!(text.ends_with(&format!("   Content Preview:\n   {}...\n", "x".repeat(300))));
    }

    #[test]
    fn test_attachment_report_empty() {
        let msg = message(&[("Date", "Mon, 1 Jan 2024")], vec![]);
        assert_eq!(
            attachment_report(&msg, &[]),
            "Subject: No Subject\nFrom: Unknown Sender\nDate: Mon, 1 Jan 2024\nMessage ID: m1\n\nNo attachments found in this email."
        );
    }

    #[test]
    fn test_body_preview() {
        assert_eq!(body_preview("short\nbody"), "short\nbody");
        let long = format!("{}\n{}", "a".repeat(150), "b".repeat(100));
        let preview = body_preview(&long);
        assert!(preview.ends_with("..."));
        assert!(!preview.contains('\n'));
        assert_eq!(preview.chars().count(), 203);
    }

    #[test]
    fn test_attachment_search_query() {
        let after = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            attachment_search_query(after, None, None),
            "has:attachment after:2024/03/05"
        );
        assert_eq!(
            attachment_search_query(after, Some("boss@example.com"), Some("Q1 report")),
            "has:attachment after:2024/03/05 from:(boss@example.com) subject:\"Q1 report\""
        );
    }

    #[test]
    fn test_summarize_query() {
        assert_eq!(summarize_query(None, None, None, None), "in:inbox");
        assert_eq!(summarize_query(Some(""), None, None, None), "in:inbox");
        assert_eq!(
            summarize_query(Some("is:unread"), Some("a@x.com"), Some("b@x.com"), Some("hello")),
            "from:(a@x.com) to:(b@x.com) subject:(hello) (is:unread)"
        );
    }

    #[test]
    fn test_label_changes() {
        let add = vec!["STARRED".to_string(), "IMPORTANT".to_string()];
        let remove = vec!["INBOX".to_string()];
        assert_eq!(
            label_changes(&add, &remove),
            "Added: STARRED, IMPORTANT | Removed: INBOX"
        );
        assert_eq!(label_changes(&[], &remove), "Removed: INBOX");
    }
}
