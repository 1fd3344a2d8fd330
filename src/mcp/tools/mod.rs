//! MCP Tool definitions and handlers
//!
//! Tools are grouped per service; each submodule adds its schemas and
//! handlers to [`ToolHandler`].

mod calendar;
mod drive;
mod gmail;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::calendar::CalendarClient;
use crate::drive::DriveClient;
use crate::gmail::GmailClient;
use crate::mcp::types::{CallToolResult, Tool};

/// Tool handler
pub struct ToolHandler {
    gmail: Arc<GmailClient>,
    drive: Arc<DriveClient>,
    calendar: Arc<CalendarClient>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(gmail: Arc<GmailClient>, drive: Arc<DriveClient>, calendar: Arc<CalendarClient>) -> Self {
        Self {
            gmail,
            drive,
            calendar,
        }
    }

    /// Drive client, shared with the resource reader
    pub fn drive(&self) -> &DriveClient {
        &self.drive
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools = drive::tools();
        tools.extend(gmail::tools());
        tools.extend(calendar::tools());
        tools
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        tracing::debug!(tool = name, "Calling tool");

        match name {
            "drive_search" => self.handle_drive_search(args).await,
            "drive_read" => self.handle_drive_read(args).await,
            "drive_edit" => self.handle_drive_edit(args).await,
            "drive_delete" => self.handle_drive_delete(args).await,
            "drive_upload_file" => self.handle_drive_upload_file(args).await,
            "drive_move" => self.handle_drive_move(args).await,
            "drive_share_file" => self.handle_drive_share_file(args).await,
            "drive_get_shareable_link" => self.handle_drive_get_shareable_link(args).await,
            "drive_create_folder" => self.handle_drive_create_folder(args).await,
            "drive_list_folder_contents" => self.handle_drive_list_folder_contents(args).await,
            "drive_list_all_files" => self.handle_drive_list_all_files(args).await,
            "drive_create" => self.handle_drive_create(args).await,

            "gmail_list_messages" => self.handle_gmail_list_messages(args).await,
            "gmail_read_message" => self.handle_gmail_read_message(args).await,
            "gmail_read_attachments" => self.handle_gmail_read_attachments(args).await,
            "gmail_search_and_summarize" => self.handle_gmail_search_and_summarize(args).await,
            "gmail_send_message" => self.handle_gmail_send_message(args).await,
            "gmail_list_labels" => self.handle_gmail_list_labels().await,
            "gmail_modify_labels" => self.handle_gmail_modify_labels(args).await,
            "gmail_delete_message" => self.handle_gmail_delete_message(args).await,
            "gmail_send_with_drive_attachment" => self.handle_gmail_send_with_drive_attachment(args).await,
            "gmail_send_multiple_attachments" => self.handle_gmail_send_multiple_attachments(args).await,

            "calendar_list_events" => self.handle_calendar_list_events(args).await,
            "calendar_create_event_with_invitations" => self.handle_calendar_create_event(args).await,
            "calendar_get_availability" => self.handle_calendar_get_availability(args).await,
            "calendar_update_event" => self.handle_calendar_update_event(args).await,
            "calendar_delete_event" => self.handle_calendar_delete_event(args).await,

            _ => CallToolResult::error(format!("Unknown tool: {}", name)),
        }
    }
}

// ==================== Helper Functions ====================

fn tool_def(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

/// Deserialize tool arguments; a missing `arguments` object counts as `{}`
fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, CallToolResult> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| CallToolResult::error(format!("Invalid arguments: {}", e)))
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Args {
        #[serde(default = "default_true")]
        flag: bool,
        name: Option<String>,
    }

    #[test]
    fn test_parse_args_null_is_empty_object() {
        let args: Args = parse_args(Value::Null).unwrap();
        assert!(args.flag);
        assert!(args.name.is_none());
    }

    #[test]
    fn test_parse_args_type_mismatch() {
        let err = parse_args::<Args>(serde_json::json!({"flag": "yes"})).unwrap_err();
        assert!(err.is_error);
        assert!(err.first_text().starts_with("Error: Invalid arguments:"));
    }
}
