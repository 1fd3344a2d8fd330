//! Gmail API client
//!
//! High-level client for Gmail API operations.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use crate::config::gmail::{API_BASE_URL, USER_ID};
use crate::error::{Result, Service};
use crate::gmail::mime::{decode_base64url_lossy, AttachmentSource};
use crate::gmail::types::*;
use crate::gmail::utils::{create_email_message, encode_raw_message, EmailParams};
use crate::google::{Call, GoogleApi};

/// Headers requested when only message metadata is needed
pub const SUMMARY_HEADERS: &[&str] = &["From", "Subject", "Date", "To"];

/// Gmail API client
pub struct GmailClient {
    api: Arc<GoogleApi>,
}

impl GmailClient {
    /// Create a new Gmail client
    pub fn new(api: Arc<GoogleApi>) -> Self {
        Self { api }
    }

    fn messages_url() -> String {
        format!("{}/users/{}/messages", API_BASE_URL, USER_ID)
    }

    /// Profile of the authenticated mailbox
    pub async fn get_profile(&self) -> Result<Profile> {
        let url = format!("{}/users/{}/profile", API_BASE_URL, USER_ID);
        let request = self.api.request(Method::GET, &url).await?;
        self.api
            .json(request, Call::new(Service::Gmail, "get profile"))
            .await
    }

    /// List message references matching a Gmail search query
    pub async fn list_messages(&self, query: Option<&str>, max_results: u32) -> Result<Vec<MessageRef>> {
        let mut params = vec![("maxResults", max_results.to_string())];
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }

        let request = self
            .api
            .request(Method::GET, &Self::messages_url())
            .await?
            .query(&params);
        let list: MessageList = self
            .api
            .json(request, Call::new(Service::Gmail, "list messages"))
            .await?;
        Ok(list.messages)
    }

    /// Get a message with its full MIME payload
    pub async fn get_message(&self, message_id: &str) -> Result<Message> {
        let url = format!("{}/{}", Self::messages_url(), message_id);
        let request = self
            .api
            .request(Method::GET, &url)
            .await?
            .query(&[("format", "full")]);
        self.api
            .json(
                request,
                Call::new(Service::Gmail, "get message").on("Message", message_id),
            )
            .await
    }

    /// Get a message with only the listed headers
    pub async fn get_message_metadata(&self, message_id: &str, headers: &[&str]) -> Result<Message> {
        let url = format!("{}/{}", Self::messages_url(), message_id);
        let mut params = vec![("format", "metadata")];
        params.extend(headers.iter().map(|h| ("metadataHeaders", *h)));

        let request = self.api.request(Method::GET, &url).await?.query(&params);
        self.api
            .json(
                request,
                Call::new(Service::Gmail, "get message").on("Message", message_id),
            )
            .await
    }

    /// Send an email
    pub async fn send_email(&self, params: &EmailParams) -> Result<Message> {
        let raw_message = create_email_message(params)?;
        let request = SendMessageRequest {
            raw: encode_raw_message(&raw_message),
        };

        let url = format!("{}/send", Self::messages_url());
        let builder = self.api.request(Method::POST, &url).await?.json(&request);
        let sent: Message = self
            .api
            .json(builder, Call::new(Service::Gmail, "send email"))
            .await?;

        tracing::info!(message_id = %sent.id, "Email sent");
        Ok(sent)
    }

    /// Modify message labels
    pub async fn modify_message(
        &self,
        message_id: &str,
        add_label_ids: Vec<String>,
        remove_label_ids: Vec<String>,
    ) -> Result<Message> {
        let url = format!("{}/{}/modify", Self::messages_url(), message_id);
        let request = ModifyMessageRequest {
            add_label_ids,
            remove_label_ids,
        };

        let builder = self.api.request(Method::POST, &url).await?.json(&request);
        self.api
            .json(
                builder,
                Call::new(Service::Gmail, "modify message").on("Message", message_id),
            )
            .await
    }

    /// Move a message to trash
    ///
    /// Permanent deletion needs the full `mail.google.com` scope, which is
    /// not requested.
    pub async fn trash_message(&self, message_id: &str) -> Result<()> {
        let url = format!("{}/{}/trash", Self::messages_url(), message_id);
        let builder = self
            .api
            .request(Method::POST, &url)
            .await?
            .header("Content-Length", "0");
        self.api
            .empty(
                builder,
                Call::new(Service::Gmail, "trash message").on("Message", message_id),
            )
            .await
    }

    /// Download an attachment body
    pub async fn get_attachment(&self, message_id: &str, attachment_id: &str) -> Result<AttachmentBody> {
        let url = format!(
            "{}/{}/attachments/{}",
            Self::messages_url(),
            message_id,
            attachment_id
        );
        let builder = self.api.request(Method::GET, &url).await?;
        self.api
            .json(
                builder,
                Call::new(Service::Gmail, "get attachment").on("Attachment", attachment_id),
            )
            .await
    }

    /// List all labels
    pub async fn list_labels(&self) -> Result<Vec<Label>> {
        let url = format!("{}/users/{}/labels", API_BASE_URL, USER_ID);
        let builder = self.api.request(Method::GET, &url).await?;
        let list: LabelList = self
            .api
            .json(builder, Call::new(Service::Gmail, "list labels"))
            .await?;
        Ok(list.labels)
    }

    /// Attachment source bound to one message
    pub fn attachments_of<'a>(&'a self, message_id: &'a str) -> MessageAttachments<'a> {
        MessageAttachments {
            client: self,
            message_id,
        }
    }
}

/// Fetches attachments of a single message through the Gmail API
pub struct MessageAttachments<'a> {
    client: &'a GmailClient,
    message_id: &'a str,
}

#[async_trait]
impl AttachmentSource for MessageAttachments<'_> {
    async fn fetch(&self, attachment_id: &str) -> Result<Vec<u8>> {
        let body = self
            .client
            .get_attachment(self.message_id, attachment_id)
            .await?;
        Ok(decode_base64url_lossy(&body.data))
    }
}
