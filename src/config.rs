//! Configuration management for the Google Workspace MCP Server
//!
//! Handles paths, environment variables, and configuration loading.

use std::path::PathBuf;

use crate::error::{ConfigError, Result, WorkspaceMcpError};

/// OAuth scopes requested for Drive, Gmail, Calendar and Docs
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.labels",
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/calendar.events",
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/documents",
];

/// Configuration for the Google Workspace MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for storing configuration files
    pub config_dir: PathBuf,

    /// Path to OAuth keys file (client credentials)
    pub oauth_path: PathBuf,

    /// Path to the session token file (access/refresh tokens)
    pub credentials_path: PathBuf,

    /// OAuth client ID from the environment
    pub client_id: Option<String>,

    /// OAuth client secret from the environment
    pub client_secret: Option<String>,

    /// Access token handed over by the host process
    pub env_access_token: Option<String>,

    /// Refresh token handed over by the host process
    pub env_refresh_token: Option<String>,

    /// OAuth callback URL
    pub oauth_callback_url: String,

    /// OAuth callback port
    pub oauth_callback_port: u16,

    /// Google API scopes
    pub scopes: Vec<String>,
}

impl Config {
    /// Create a new configuration from the environment and default paths
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;

        let oauth_path = std::env::var("GOOGLE_OAUTH_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("gcp-oauth.keys.json"));

        let credentials_path = std::env::var("SESSION_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("token.json"));

        let oauth_callback_port = std::env::var("GOOGLE_OAUTH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let oauth_callback_url = format!("http://localhost:{}/oauth2callback", oauth_callback_port);

        Ok(Self {
            config_dir,
            oauth_path,
            credentials_path,
            client_id: non_empty_env("GOOGLE_CLIENT_ID"),
            client_secret: non_empty_env("GOOGLE_CLIENT_SECRET"),
            env_access_token: non_empty_env("GOOGLE_ACCESS_TOKEN"),
            env_refresh_token: non_empty_env("GOOGLE_REFRESH_TOKEN"),
            oauth_callback_url,
            oauth_callback_port,
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Get the configuration directory, creating it if necessary
    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| {
                WorkspaceMcpError::Config(ConfigError::DirNotFound {
                    path: "~".to_string(),
                })
            })?
            .join(".google-workspace-mcp");

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|_| {
                WorkspaceMcpError::Config(ConfigError::DirCreationFailed {
                    path: config_dir.display().to_string(),
                })
            })?;
        }

        Ok(config_dir)
    }

    /// Check if OAuth client credentials are available (env or keys file)
    pub fn oauth_keys_exist(&self) -> bool {
        (self.client_id.is_some() && self.client_secret.is_some()) || self.oauth_path.exists()
    }

    /// Check if the session token file exists
    pub fn credentials_exist(&self) -> bool {
        self.credentials_path.exists()
    }

    /// Try to find OAuth keys in current directory and copy to config dir
    pub fn find_and_copy_oauth_keys(&self) -> Result<bool> {
        let local_oauth = std::env::current_dir()
            .map_err(WorkspaceMcpError::Io)?
            .join("gcp-oauth.keys.json");

        if local_oauth.exists() && !self.oauth_path.exists() {
            std::fs::copy(&local_oauth, &self.oauth_path).map_err(WorkspaceMcpError::Io)?;
            return Ok(true);
        }

        Ok(false)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Gmail API constants
pub mod gmail {
    /// Base URL for Gmail API
    pub const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

    /// User ID for the authenticated user
    pub const USER_ID: &str = "me";
}

/// Google Drive API constants
pub mod drive {
    /// Base URL for Drive metadata calls
    pub const API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

    /// Base URL for Drive media uploads
    pub const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

    /// MIME type Drive uses for folders
    pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

    /// MIME type Drive uses for Google Docs
    pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";

    /// Prefix shared by all Google Workspace native types
    pub const WORKSPACE_MIME_PREFIX: &str = "application/vnd.google-apps";
}

/// Google Docs API constants
pub mod docs {
    /// Base URL for Docs API
    pub const API_BASE_URL: &str = "https://docs.googleapis.com/v1";
}

/// Google Calendar API constants
pub mod calendar {
    /// Base URL for Calendar API
    pub const API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

    /// Calendar all tools operate on
    pub const PRIMARY: &str = "primary";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new();
        assert!(config.is_ok());
    }

    #[test]
    fn test_default_scopes() {
        let config = Config::new().unwrap();
        assert_eq!(config.scopes.len(), 8);
        assert!(config.scopes[0].ends_with("/auth/drive"));
        assert!(config.scopes.iter().any(|s| s.contains("calendar.events")));
    }
}
