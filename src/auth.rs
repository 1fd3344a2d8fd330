//! Google OAuth 2.0 session handling
//!
//! Client credentials come from the environment or a keys file. The session
//! token is read from the token file, or handed over through the environment
//! by a host process, and refreshed shortly before it expires.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AuthError, Result, WorkspaceMcpError};

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Seconds before expiry at which a token is refreshed
const REFRESH_MARGIN_SECS: i64 = 300;

/// OAuth client credentials
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthKeys {
    /// Client ID
    pub client_id: String,

    /// Client secret
    pub client_secret: String,

    /// Auth URI
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    /// Token URI
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// OAuth keys file format (can be "installed" or "web")
#[derive(Debug, Deserialize)]
struct OAuthKeysFile {
    #[serde(alias = "web")]
    installed: Option<OAuthKeys>,
}

/// Stored credentials (tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Access token
    #[serde(alias = "token")]
    pub access_token: String,

    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Expiry timestamp (Unix seconds, or millis as written by Node clients)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,

    /// RFC 3339 expiry as written by google-auth's `to_json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,

    /// Scopes
    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl StoredCredentials {
    /// Expiry as Unix seconds, if known
    pub fn expires_at(&self) -> Option<i64> {
        if let Some(date) = self.expiry_date {
            // Millisecond timestamps are 13 digits for any date after 2001
            return Some(if date > 100_000_000_000 { date / 1000 } else { date });
        }
        self.expiry
            .as_deref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.timestamp())
    }

    /// Whether the token expires within the refresh margin
    pub fn needs_refresh(&self, now: i64) -> bool {
        self.expires_at()
            .map(|expiry| expiry - now < REFRESH_MARGIN_SECS)
            .unwrap_or(false)
    }
}

/// Token response from OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<i64>,
    #[serde(default)]
    scope: String,
}

impl TokenResponse {
    fn into_credentials(self, fallback_refresh: Option<String>) -> StoredCredentials {
        StoredCredentials {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(fallback_refresh),
            token_type: self.token_type,
            expiry_date: self.expires_in.map(|e| unix_now() + e),
            expiry: None,
            scope: self.scope,
        }
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// OAuth authenticator
pub struct Authenticator {
    /// Configuration
    config: Config,

    /// HTTP client
    http_client: reqwest::Client,

    /// OAuth client credentials
    keys: OAuthKeys,

    /// Current credentials (tokens)
    credentials: Arc<RwLock<Option<StoredCredentials>>>,
}

impl Authenticator {
    /// Create a new authenticator
    pub async fn new(config: Config) -> Result<Self> {
        config.find_and_copy_oauth_keys()?;

        let keys = Self::resolve_oauth_keys(&config)?;

        let auth = Self {
            config,
            http_client: reqwest::Client::new(),
            keys,
            credentials: Arc::new(RwLock::new(None)),
        };

        let initial = if auth.config.credentials_exist() {
            match auth.load_credentials().await {
                Ok(creds) => Some(creds),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable token file: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let initial = initial.or_else(|| {
            auth.config
                .env_access_token
                .clone()
                .map(|access_token| StoredCredentials {
                    access_token,
                    refresh_token: auth.config.env_refresh_token.clone(),
                    token_type: default_token_type(),
                    expiry_date: None,
                    expiry: None,
                    scope: String::new(),
                })
        });

        *auth.credentials.write().await = initial;

        Ok(auth)
    }

    /// Client credentials from the environment, falling back to the keys file
    fn resolve_oauth_keys(config: &Config) -> Result<OAuthKeys> {
        if let (Some(client_id), Some(client_secret)) = (&config.client_id, &config.client_secret) {
            return Ok(OAuthKeys {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                auth_uri: default_auth_uri(),
                token_uri: default_token_uri(),
            });
        }
        Self::load_oauth_keys(&config.oauth_path)
    }

    fn load_oauth_keys(path: &Path) -> Result<OAuthKeys> {
        if !path.exists() {
            return Err(WorkspaceMcpError::Auth(AuthError::KeysFileNotFound {
                path: path.display().to_string(),
            }));
        }

        let content = std::fs::read_to_string(path)?;
        let keys_file: OAuthKeysFile = serde_json::from_str(&content)?;

        keys_file
            .installed
            .ok_or(WorkspaceMcpError::Auth(AuthError::InvalidKeysFormat))
    }

    async fn load_credentials(&self) -> Result<StoredCredentials> {
        let content = tokio::fs::read_to_string(&self.config.credentials_path).await?;
        let creds: StoredCredentials = serde_json::from_str(&content)?;
        Ok(creds)
    }

    async fn save_credentials(&self, credentials: &StoredCredentials) -> Result<()> {
        let content = serde_json::to_string_pretty(credentials)?;
        tokio::fs::write(&self.config.credentials_path, content).await?;
        Ok(())
    }

    /// Whether a session token is loaded
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Bearer token for the next API call
    ///
    /// Tokens within the refresh margin of their expiry are refreshed first.
    pub async fn get_access_token(&self) -> Result<String> {
        let (token, stale) = match self.credentials.read().await.as_ref() {
            Some(c) => (c.access_token.clone(), c.needs_refresh(unix_now())),
            None => {
                return Err(WorkspaceMcpError::Auth(AuthError::CredentialsNotFound {
                    path: self.config.credentials_path.display().to_string(),
                }))
            }
        };

        if !stale {
            return Ok(token);
        }

        tracing::info!("Access token about to expire, refreshing");
        self.refresh_access_token().await
    }

    async fn refresh_access_token(&self) -> Result<String> {
        let refresh_token = self
            .credentials
            .read()
            .await
            .as_ref()
            .and_then(|c| c.refresh_token.clone())
            .ok_or_else(|| {
                WorkspaceMcpError::Auth(AuthError::TokenRefreshFailed {
                    message: "session has no refresh token".to_string(),
                })
            })?;

        let response = self
            .token_request(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token.as_str())])
            .await
            .map_err(|message| WorkspaceMcpError::Auth(AuthError::TokenRefreshFailed { message }))?;

        let refreshed = response.into_credentials(Some(refresh_token));
        let token = refreshed.access_token.clone();
        self.store(refreshed).await?;
        Ok(token)
    }

    /// Browser URL starting the consent flow for the configured scopes
    pub fn generate_auth_url(&self) -> String {
        let scopes = self.config.scopes.join(" ");
        let query = [
            ("client_id", self.keys.client_id.as_str()),
            ("redirect_uri", self.config.oauth_callback_url.as_str()),
            ("response_type", "code"),
            ("scope", scopes.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ]
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

        format!("{}?{}", self.keys.auth_uri, query)
    }

    /// Trade an authorization code for a session token and persist it
    pub async fn exchange_code(&self, code: &str) -> Result<StoredCredentials> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.oauth_callback_url.as_str()),
            ])
            .await
            .map_err(|message| WorkspaceMcpError::Auth(AuthError::TokenExchangeFailed { message }))?;

        let credentials = response.into_credentials(None);
        self.store(credentials.clone()).await?;
        Ok(credentials)
    }

    /// POST to the token endpoint; `Err` carries the endpoint's message
    async fn token_request(&self, grant: &[(&str, &str)]) -> std::result::Result<TokenResponse, String> {
        let mut form = vec![
            ("client_id", self.keys.client_id.as_str()),
            ("client_secret", self.keys.client_secret.as_str()),
        ];
        form.extend_from_slice(grant);

        let response = self
            .http_client
            .post(&self.keys.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(response.text().await.unwrap_or_default());
        }
        response.json().await.map_err(|e| e.to_string())
    }

    async fn store(&self, credentials: StoredCredentials) -> Result<()> {
        self.save_credentials(&credentials).await?;
        *self.credentials.write().await = Some(credentials);
        Ok(())
    }

    /// Consent in the browser, then catch the redirect on the callback port
    pub async fn authenticate_interactive(&self) -> Result<()> {
        let auth_url = self.generate_auth_url();
        eprintln!("\nOpen this URL to grant Drive, Gmail and Calendar access:\n{}\n", auth_url);

        if let Err(e) = open::that(&auth_url) {
            tracing::warn!("Could not launch a browser: {}", e);
        }

        let code = wait_for_code(self.config.oauth_callback_port).await?;
        eprintln!("Authorization code received, requesting tokens...");
        self.exchange_code(&code).await?;
        eprintln!("Session token saved to {}", self.config.credentials_path.display());

        Ok(())
    }
}

/// Serve `/oauth2callback` on localhost until a `code` arrives
async fn wait_for_code(port: u16) -> Result<String> {
    use axum::{extract::Query, response::Html, routing::get, Router};
    use std::collections::HashMap;
    use tokio::sync::oneshot;

    let (tx, rx) = oneshot::channel::<String>();
    let tx = Arc::new(std::sync::Mutex::new(Some(tx)));

    let app = Router::new().route(
        "/oauth2callback",
        get(move |Query(params): Query<HashMap<String, String>>| async move {
            let Some(code) = params.get("code") else {
                return Html("<h1>Google Workspace MCP</h1><p>The redirect carried no authorization code.</p>");
            };
            if let Some(sender) = tx.lock().ok().and_then(|mut slot| slot.take()) {
                let _ = sender.send(code.clone());
            }
            Html("<h1>Google Workspace MCP</h1><p>Signed in. This tab can be closed.</p>")
        }),
    );

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tracing::info!(port, "Waiting for the OAuth redirect");

    tokio::select! {
        served = axum::serve(listener, app) => {
            let message = match served {
                Ok(()) => "callback server stopped".to_string(),
                Err(e) => e.to_string(),
            };
            Err(WorkspaceMcpError::Auth(AuthError::CallbackError { message }))
        }
        code = rx => code.map_err(|_| WorkspaceMcpError::Auth(AuthError::NoAuthCode)),
    }
}
