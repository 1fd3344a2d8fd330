//! Error types for the Google Workspace MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use std::fmt;

use thiserror::Error;

/// Main error type for the Google Workspace MCP Server
#[derive(Error, Debug)]
pub enum WorkspaceMcpError {
    /// OAuth authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Google API errors (Drive, Gmail, Calendar, Docs)
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// PDF rendering errors
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// OAuth authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth client credentials not found: set GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET or provide {path}")]
    KeysFileNotFound { path: String },

    #[error("Invalid OAuth keys format: expected 'installed' or 'web' credentials")]
    InvalidKeysFormat,

    #[error("Credentials file not found: {path}")]
    CredentialsNotFound { path: String },

    #[error("Failed to refresh access token: {message}")]
    TokenRefreshFailed { message: String },

    #[error("OAuth callback error: {message}")]
    CallbackError { message: String },

    #[error("No authorization code provided")]
    NoAuthCode,

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },
}

/// The Google service an API call was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Drive,
    Gmail,
    Calendar,
    Docs,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Drive => "Google Drive",
            Service::Gmail => "Gmail",
            Service::Calendar => "Google Calendar",
            Service::Docs => "Google Docs",
        };
        f.write_str(name)
    }
}

/// Google API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{service} API error: {resource} not found: {id}")]
    NotFound {
        service: Service,
        resource: &'static str,
        id: String,
    },

    #[error("{service} API error: {message}")]
    RequestFailed { service: Service, message: String },

    #[error("{service} API error: insufficient permissions ({message})")]
    InsufficientPermissions { service: Service, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to create config directory: {path}")]
    DirCreationFailed { path: String },
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Invalid resource URI: {uri}")]
    InvalidResourceUri { uri: String },
}

/// PDF errors
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Error creating PDF: {0}")]
    Render(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::Render(err.to_string())
    }
}

/// Result type alias for Google Workspace MCP operations
pub type Result<T> = std::result::Result<T, WorkspaceMcpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::KeysFileNotFound {
            path: "/path/to/keys.json".to_string(),
        };
        assert!(err.to_string().contains("/path/to/keys.json"));
    }

    #[test]
    fn test_error_conversion() {
        let auth_err = AuthError::NoAuthCode;
        let err: WorkspaceMcpError = auth_err.into();
        assert!(matches!(err, WorkspaceMcpError::Auth(_)));
    }

    #[test]
    fn test_api_error_names_service() {
        let err: WorkspaceMcpError = ApiError::NotFound {
            service: Service::Drive,
            resource: "File",
            id: "abc".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Google Drive API error: File not found: abc"
        );
    }
}
