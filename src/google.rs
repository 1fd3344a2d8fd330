//! Authorized HTTP access to Google REST APIs
//!
//! Every service client shares one [`GoogleApi`] so that token refresh and
//! status-code handling stay in one place.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::auth::Authenticator;
use crate::error::{ApiError, Result, Service, WorkspaceMcpError};

/// Describes an API call for error reporting
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub service: Service,
    /// Verb phrase used in failure messages, e.g. `"get file"`
    pub action: &'a str,
    /// Resource kind reported on 404, e.g. `"File"`
    pub resource: &'static str,
    /// Identifier reported on 404
    pub id: &'a str,
}

impl<'a> Call<'a> {
    pub fn new(service: Service, action: &'a str) -> Self {
        Self {
            service,
            action,
            resource: "Resource",
            id: "",
        }
    }

    /// Attach the resource kind and identifier used for 404 reporting
    pub fn on(mut self, resource: &'static str, id: &'a str) -> Self {
        self.resource = resource;
        self.id = id;
        self
    }
}

/// Shared HTTP client with OAuth bearer authorization
pub struct GoogleApi {
    http_client: reqwest::Client,
    authenticator: Arc<Authenticator>,
}

impl GoogleApi {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            authenticator,
        }
    }

    /// Start a request carrying a fresh access token
    pub async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let token = self.authenticator.get_access_token().await?;
        Ok(self.http_client.request(method, url).bearer_auth(token))
    }

    /// Send a request and decode the JSON response
    pub async fn json<T: DeserializeOwned>(&self, request: RequestBuilder, call: Call<'_>) -> Result<T> {
        let response = send_checked(request, call).await?;
        Ok(response.json().await?)
    }

    /// Send a request and return the raw response body
    pub async fn bytes(&self, request: RequestBuilder, call: Call<'_>) -> Result<Vec<u8>> {
        let response = send_checked(request, call).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Send a request whose response body is irrelevant
    pub async fn empty(&self, request: RequestBuilder, call: Call<'_>) -> Result<()> {
        send_checked(request, call).await?;
        Ok(())
    }
}

async fn send_checked(request: RequestBuilder, call: Call<'_>) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    tracing::debug!(
        service = %call.service,
        status = %status,
        "Failed to {}: {}",
        call.action,
        text
    );
    Err(status_error(status, &text, call))
}

/// Map a non-success HTTP status to an [`ApiError`]
pub fn status_error(status: StatusCode, body: &str, call: Call<'_>) -> WorkspaceMcpError {
    let err = match status {
        StatusCode::NOT_FOUND if !call.id.is_empty() => ApiError::NotFound {
            service: call.service,
            resource: call.resource,
            id: call.id.to_string(),
        },
        StatusCode::FORBIDDEN => ApiError::InsufficientPermissions {
            service: call.service,
            message: format!("Failed to {} ({}): {}", call.action, status, body),
        },
        _ => ApiError::RequestFailed {
            service: call.service,
            message: format!("Failed to {} ({}): {}", call.action, status, body),
        },
    };
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_resource() {
        let call = Call::new(Service::Gmail, "get message").on("Message", "m1");
        let err = status_error(StatusCode::NOT_FOUND, "", call);
        assert_eq!(err.to_string(), "Gmail API error: Message not found: m1");
    }

    #[test]
    fn test_not_found_without_id_is_request_failure() {
        let call = Call::new(Service::Calendar, "list events");
        let err = status_error(StatusCode::NOT_FOUND, "gone", call);
        assert!(err.to_string().contains("Failed to list events (404 Not Found): gone"));
    }

    #[test]
    fn test_forbidden_is_permission_error() {
        let call = Call::new(Service::Drive, "share file").on("File", "f1");
        let err = status_error(StatusCode::FORBIDDEN, "denied", call);
        assert!(matches!(
            err,
            WorkspaceMcpError::Api(ApiError::InsufficientPermissions { .. })
        ));
    }
}
