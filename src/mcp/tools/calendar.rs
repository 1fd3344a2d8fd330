//! Google Calendar tools

use serde::Deserialize;
use serde_json::{json, Value};

use super::{default_true, parse_args, tool_def, ToolHandler};
use crate::calendar::types::{Attendee, BusyPeriod, Event, EventPatch, EventTime};
use crate::format::truncate_chars;
use crate::mcp::types::{CallToolResult, Tool};

const DESCRIPTION_PREVIEW_CHARS: usize = 100;

pub(super) fn tools() -> Vec<Tool> {
    vec![
        tool_def("calendar_list_events", "List calendar events within a time range", calendar_list_events_schema()),
        tool_def(
            "calendar_create_event_with_invitations",
            "Create a calendar event and send invitations to attendees",
            calendar_create_event_schema(),
        ),
        tool_def("calendar_get_availability", "Get busy periods of the primary calendar", calendar_get_availability_schema()),
        tool_def("calendar_update_event", "Update an existing calendar event", calendar_update_event_schema()),
        tool_def("calendar_delete_event", "Delete a calendar event", calendar_delete_event_schema()),
    ]
}

impl ToolHandler {
    pub(super) async fn handle_calendar_list_events(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            time_min: String,
            time_max: String,
            #[serde(default = "default_max_results")]
            max_results: u32,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self
            .calendar
            .list_events(&args.time_min, &args.time_max, args.max_results)
            .await
        {
            Ok(events) if events.is_empty() => CallToolResult::text("No upcoming events found."),
            Ok(events) => {
                let entries: Vec<String> = events.iter().map(event_entry).collect();
                CallToolResult::text(format!(
                    "Found {} events:\n\n{}",
                    events.len(),
                    entries.join("\n\n---\n\n")
                ))
            }
            Err(e) => CallToolResult::error(format!("Failed to list events: {}", e)),
        }
    }

    pub(super) async fn handle_calendar_create_event(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            summary: String,
            start_time: String,
            end_time: String,
            #[serde(default)]
            attendees: Vec<String>,
            location: Option<String>,
            description: Option<String>,
            #[serde(default = "default_true", rename = "send_invitations")]
            send_invitations: bool,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let location = args.location.filter(|l| !l.is_empty());
        let description = args.description.filter(|d| !d.is_empty());

        let event = Event {
            summary: Some(args.summary.clone()),
            location: location.clone(),
            description: description.clone(),
            start: Some(EventTime::utc(&args.start_time)),
            end: Some(EventTime::utc(&args.end_time)),
            attendees: args.attendees.iter().map(|e| Attendee::new(e)).collect(),
            ..Default::default()
        };

        let send_updates = if args.send_invitations && !args.attendees.is_empty() {
            "all"
        } else {
            "none"
        };

        let created = match self.calendar.insert_event(&event, send_updates).await {
            Ok(created) => created,
            Err(e) => return CallToolResult::error(format!("Failed to create calendar event: {}", e)),
        };

        let mut response = "Calendar event created successfully!\n".to_string();
        response.push_str(&format!("Event ID: {}\n", created.id));
        response.push_str(&format!("Title: {}\n", args.summary));
        response.push_str(&format!("Start: {}\n", args.start_time));
        response.push_str(&format!("End: {}\n", args.end_time));
        if let Some(ref location) = location {
            response.push_str(&format!("Location: {}\n", location));
        }
        if let Some(ref description) = description {
            response.push_str(&format!("Description: {}\n", description));
        }
        if let Some(link) = created.html_link.as_deref().filter(|l| !l.is_empty()) {
            response.push_str(&format!("Event Link: {}\n", link));
        }
        response.push_str(&attendee_notice(&args.attendees, args.send_invitations));

        CallToolResult::text(response)
    }

    pub(super) async fn handle_calendar_get_availability(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            time_min: String,
            time_max: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self.calendar.free_busy(&args.time_min, &args.time_max).await {
            Ok(busy) => CallToolResult::text(availability_text(&args.time_min, &args.time_max, &busy)),
            Err(e) => CallToolResult::error(format!("Failed to get availability: {}", e)),
        }
    }

    pub(super) async fn handle_calendar_update_event(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            #[serde(rename = "event_id")]
            event_id: String,
            summary: Option<String>,
            start_time: Option<String>,
            end_time: Option<String>,
            attendees: Option<Vec<String>>,
            location: Option<String>,
            description: Option<String>,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        let patch = EventPatch {
            summary: args.summary,
            start_time: args.start_time,
            end_time: args.end_time,
            attendees: args.attendees,
            location: args.location,
            description: args.description,
        };

        match self.calendar.update_event(&args.event_id, &patch).await {
            Ok(updated) => CallToolResult::text(format!(
                "Event updated successfully!\n\nUpdated Details:\n- Title: {}\n- Event ID: {}\n- Link: {}",
                updated.summary.as_deref().unwrap_or("No title"),
                args.event_id,
                updated.html_link.as_deref().unwrap_or("N/A")
            )),
            Err(e) => CallToolResult::error(format!("Failed to update event: {}", e)),
        }
    }

    pub(super) async fn handle_calendar_delete_event(&self, args: Value) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            event_id: String,
        }

        let args: Args = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return e,
        };

        match self.calendar.delete_event(&args.event_id).await {
            Ok(()) => CallToolResult::text(format!(
                "Event with ID '{}' has been deleted successfully!",
                args.event_id
            )),
            Err(e) => CallToolResult::error(format!("Failed to delete event: {}", e)),
        }
    }
}

// ==================== Rendering ====================

fn event_entry(event: &Event) -> String {
    let description = event.description.as_deref().unwrap_or("No description");
    let cut = truncate_chars(description, DESCRIPTION_PREVIEW_CHARS);
    let ellipsis = if cut.len() < description.len() { "..." } else { "" };

    format!(
        "ID: {}\nTitle: {}\nTime: {}\nLocation: {}\nDescription: {}{}",
        if event.id.is_empty() { "No ID" } else { event.id.as_str() },
        event.summary.as_deref().unwrap_or("No title"),
        event.start.as_ref().map(EventTime::display).unwrap_or("Unknown"),
        event.location.as_deref().unwrap_or("No location"),
        cut,
        ellipsis
    )
}

fn attendee_notice(attendees: &[String], send_invitations: bool) -> String {
    if attendees.is_empty() {
        return String::new();
    }

    let list: String = attendees.iter().map(|e| format!("- {}\n", e)).collect();
    if send_invitations {
        format!(
            "\nInvitations sent to {} attendees:\n{}\nNote: Calendar invitations have been automatically sent via Google Calendar.",
            attendees.len(),
            list
        )
    } else {
        format!("\nAttendees added (no invitations sent):\n{}", list)
    }
}

fn availability_text(time_min: &str, time_max: &str, busy: &[BusyPeriod]) -> String {
    if busy.is_empty() {
        return format!(
            "No busy times found between {} and {}\nYou appear to be free during this entire period!",
            time_min, time_max
        );
    }

    let periods: Vec<String> = busy
        .iter()
        .map(|p| format!("- Busy from {} to {}", p.start, p.end))
        .collect();
    format!(
        "Busy periods between {} and {}:\n\n{}",
        time_min,
        time_max,
        periods.join("\n")
    )
}

fn default_max_results() -> u32 {
    10
}

// ==================== Schema Definitions ====================

fn time_range_properties() -> Value {
    json!({
        "timeMin": {
            "type": "string",
            "description": "RFC3339 start of the range (e.g., '2024-01-01T00:00:00Z')"
        },
        "timeMax": {
            "type": "string",
            "description": "RFC3339 end of the range (e.g., '2024-01-31T23:59:59Z')"
        }
    })
}

fn calendar_list_events_schema() -> Value {
    let mut properties = time_range_properties();
    properties["maxResults"] = json!({
        "type": "integer",
        "default": 10,
        "description": "Maximum number of events to return"
    });
    json!({
        "type": "object",
        "properties": properties,
        "required": ["timeMin", "timeMax"]
    })
}

fn calendar_get_availability_schema() -> Value {
    json!({
        "type": "object",
        "properties": time_range_properties(),
        "required": ["timeMin", "timeMax"]
    })
}

fn calendar_create_event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "Event title"
            },
            "startTime": {
                "type": "string",
                "description": "RFC3339 start time (e.g., '2024-01-15T10:00:00Z')"
            },
            "endTime": {
                "type": "string",
                "description": "RFC3339 end time (e.g., '2024-01-15T11:00:00Z')"
            },
            "attendees": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Attendee email addresses"
            },
            "location": {
                "type": "string",
                "description": "Event location"
            },
            "description": {
                "type": "string",
                "description": "Event description"
            },
            "send_invitations": {
                "type": "boolean",
                "default": true,
                "description": "Email invitations to attendees"
            }
        },
        "required": ["summary", "startTime", "endTime"]
    })
}

fn calendar_update_event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event_id": {
                "type": "string",
                "description": "ID of the event to update"
            },
            "summary": {
                "type": "string",
                "description": "New event title"
            },
            "startTime": {
                "type": "string",
                "description": "New RFC3339 start time"
            },
            "endTime": {
                "type": "string",
                "description": "New RFC3339 end time"
            },
            "attendees": {
                "type": "array",
                "items": { "type": "string" },
                "description": "New list of attendee emails"
            },
            "location": {
                "type": "string",
                "description": "New event location"
            },
            "description": {
                "type": "string",
                "description": "New event description"
            }
        },
        "required": ["event_id"]
    })
}

fn calendar_delete_event_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event_id": {
                "type": "string",
                "description": "ID of the event to delete"
            }
        },
        "required": ["event_id"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_entry_truncates_description() {
        let event = Event {
            id: "e1".to_string(),
            summary: Some("Planning".to_string()),
            start: Some(EventTime::utc("2024-01-15T10:00:00Z")),
            description: Some("d".repeat(120)),
            ..Default::default()
        };
        let text = event_entry(&event);
        assert!(text.starts_with("ID: e1\nTitle: Planning\nTime: 2024-01-15T10:00:00Z\nLocation: No location\n"));
        assert!(text.ends_with(&format!("Description: {}...", "d".repeat(100))));
    }

    #[test]
    fn test_event_entry_defaults() {
        let text = event_entry(&Event::default());
        assert_eq!(
            text,
            "ID: No ID\nTitle: No title\nTime: Unknown\nLocation: No location\nDescription: No description"
        );
    }

    #[test]
    fn test_attendee_notice() {
        let attendees = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        let sent = attendee_notice(&attendees, true);
        assert!(sent.starts_with("\nInvitations sent to 2 attendees:\n- a@example.com\n- b@example.com\n"));
        assert!(sent.ends_with("automatically sent via Google Calendar."));

        assert_eq!(
            attendee_notice(&attendees[..1], false),
            "\nAttendees added (no invitations sent):\n- a@example.com\n"
        );
        assert_eq!(attendee_notice(&[], true), "");
    }

    #[test]
    fn test_availability_text() {
        assert!(availability_text("a", "b", &[]).starts_with("No busy times found between a and b\n"));

        let busy = vec![BusyPeriod {
            start: "2024-01-15T10:00:00Z".to_string(),
            end: "2024-01-15T11:00:00Z".to_string(),
        }];
        assert_eq!(
            availability_text("a", "b", &busy),
            "Busy periods between a and b:\n\n- Busy from 2024-01-15T10:00:00Z to 2024-01-15T11:00:00Z"
        );
    }
}
