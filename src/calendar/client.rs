//! Google Calendar API client
//!
//! All operations target the user's primary calendar.

use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};

use crate::calendar::types::*;
use crate::config::calendar::{API_BASE_URL, PRIMARY};
use crate::error::{Result, Service};
use crate::google::{Call, GoogleApi};

/// Google Calendar API client
pub struct CalendarClient {
    api: Arc<GoogleApi>,
}

impl CalendarClient {
    pub fn new(api: Arc<GoogleApi>) -> Self {
        Self { api }
    }

    fn events_url() -> String {
        format!("{}/calendars/{}/events", API_BASE_URL, PRIMARY)
    }

    fn event_url(event_id: &str) -> String {
        format!("{}/{}", Self::events_url(), event_id)
    }

    fn event_call<'a>(action: &'a str, event_id: &'a str) -> Call<'a> {
        Call::new(Service::Calendar, action).on("Event", event_id)
    }

    /// Summary of the primary calendar, if the calendar list exposes one
    pub async fn primary_summary(&self) -> Result<Option<String>> {
        let url = format!("{}/users/me/calendarList", API_BASE_URL);
        let builder = self.api.request(Method::GET, &url).await?;
        let list: CalendarList = self
            .api
            .json(builder, Call::new(Service::Calendar, "list calendars"))
            .await?;
        Ok(list
            .items
            .into_iter()
            .find(|c| c.primary)
            .map(|c| c.summary.unwrap_or(c.id)))
    }

    /// Single events in `[time_min, time_max)` ordered by start time
    pub async fn list_events(&self, time_min: &str, time_max: &str, max_results: u32) -> Result<Vec<Event>> {
        let builder = self
            .api
            .request(Method::GET, &Self::events_url())
            .await?
            .query(&[
                ("timeMin", time_min.to_string()),
                ("timeMax", time_max.to_string()),
                ("maxResults", max_results.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]);
        let list: EventList = self
            .api
            .json(builder, Call::new(Service::Calendar, "list events"))
            .await?;
        Ok(list.items)
    }

    /// Create an event; `send_updates` is `all` or `none`
    pub async fn insert_event(&self, event: &Event, send_updates: &str) -> Result<Event> {
        let builder = self
            .api
            .request(Method::POST, &Self::events_url())
            .await?
            .query(&[("sendUpdates", send_updates)])
            .json(event);
        let created: Event = self
            .api
            .json(builder, Call::new(Service::Calendar, "create event"))
            .await?;
        tracing::info!(event_id = %created.id, "Created calendar event");
        Ok(created)
    }

    /// Raw event resource, kept untyped so an update can send it back intact
    pub async fn get_event_raw(&self, event_id: &str) -> Result<Value> {
        let builder = self.api.request(Method::GET, &Self::event_url(event_id)).await?;
        self.api
            .json(builder, Self::event_call("get event", event_id))
            .await
    }

    /// Fetch, patch and store an event, notifying attendees
    pub async fn update_event(&self, event_id: &str, patch: &EventPatch) -> Result<Event> {
        let mut event = self.get_event_raw(event_id).await?;
        patch.apply(&mut event);

        let builder = self
            .api
            .request(Method::PUT, &Self::event_url(event_id))
            .await?
            .query(&[("sendUpdates", "all")])
            .json(&event);
        self.api
            .json(builder, Self::event_call("update event", event_id))
            .await
    }

    /// Delete an event, notifying attendees
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        let builder = self
            .api
            .request(Method::DELETE, &Self::event_url(event_id))
            .await?
            .query(&[("sendUpdates", "all")]);
        self.api
            .empty(builder, Self::event_call("delete event", event_id))
            .await
    }

    /// Busy periods of the primary calendar
    pub async fn free_busy(&self, time_min: &str, time_max: &str) -> Result<Vec<BusyPeriod>> {
        let url = format!("{}/freeBusy", API_BASE_URL);
        let body = json!({
            "timeMin": time_min,
            "timeMax": time_max,
            "items": [{ "id": PRIMARY }],
        });
        let builder = self.api.request(Method::POST, &url).await?.json(&body);
        let response: FreeBusyResponse = self
            .api
            .json(builder, Call::new(Service::Calendar, "query availability"))
            .await?;

        Ok(response
            .calendars
            .get(PRIMARY)
            .map(|c| c.busy.clone())
            .unwrap_or_default())
    }
}
