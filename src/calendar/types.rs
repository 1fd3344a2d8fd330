//! Google Calendar API type definitions

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A calendar event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

/// Start or end of an event; all-day events only carry `date`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn utc(date_time: &str) -> Self {
        Self {
            date_time: Some(date_time.to_string()),
            date: None,
            time_zone: Some("UTC".to_string()),
        }
    }

    /// `dateTime` for timed events, `date` for all-day events
    pub fn display(&self) -> &str {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            response_status: None,
        }
    }
}

/// Response of `events.list`
#[derive(Debug, Clone, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<Event>,
}

/// Entry of `calendarList.list`
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarListEntry {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarList {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
}

/// A busy interval from `freeBusy.query`
#[derive(Debug, Clone, Deserialize)]
pub struct BusyPeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<BusyPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: std::collections::HashMap<String, FreeBusyCalendar>,
}

/// Fields to change on an existing event; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub summary: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventPatch {
    /// Apply to the raw event resource, preserving every other field
    pub fn apply(&self, event: &mut Value) {
        let Some(obj) = event.as_object_mut() else {
            return;
        };

        if let Some(ref summary) = self.summary {
            obj.insert("summary".to_string(), json!(summary));
        }
        if let Some(ref start) = self.start_time {
            set_date_time(obj, "start", start);
        }
        if let Some(ref end) = self.end_time {
            set_date_time(obj, "end", end);
        }
        if let Some(ref attendees) = self.attendees {
            let list: Vec<Value> = attendees.iter().map(|e| json!({ "email": e })).collect();
            obj.insert("attendees".to_string(), Value::Array(list));
        }
        if let Some(ref location) = self.location {
            obj.insert("location".to_string(), json!(location));
        }
        if let Some(ref description) = self.description {
            obj.insert("description".to_string(), json!(description));
        }
    }
}

fn set_date_time(obj: &mut serde_json::Map<String, Value>, key: &str, value: &str) {
    let slot = obj.entry(key.to_string()).or_insert_with(|| json!({}));
    if !slot.is_object() {
        *slot = json!({});
    }
    if let Some(time) = slot.as_object_mut() {
        time.insert("dateTime".to_string(), json!(value));
    }
}
