//! Google Workspace MCP Server
//!
//! A Model Context Protocol (MCP) server for Google Drive, Gmail and
//! Google Calendar.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use google_workspace_mcp::auth::Authenticator;
use google_workspace_mcp::calendar::CalendarClient;
use google_workspace_mcp::config::Config;
use google_workspace_mcp::drive::DriveClient;
use google_workspace_mcp::gmail::GmailClient;
use google_workspace_mcp::google::GoogleApi;
use google_workspace_mcp::mcp::server::McpServer;
use google_workspace_mcp::mcp::tools::ToolHandler;

/// Google Workspace MCP Server
#[derive(Parser)]
#[command(name = "google-workspace-mcp")]
#[command(author, version, about = "Google Workspace MCP Server - Drive, Gmail and Calendar tools over the Model Context Protocol")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Google (run this first)
    Auth,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new().context("Failed to load configuration")?;

    match cli.command {
        Some(Commands::Auth) => {
            let authenticator = Authenticator::new(config).await?;
            authenticator.authenticate_interactive().await?;
            eprintln!("Authentication completed successfully!");
        }
        None => run_server(config).await?,
    }

    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    if !config.oauth_keys_exist() {
        bail!(
            "OAuth client credentials not found. Set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET or place gcp-oauth.keys.json in {}",
            config.config_dir.display()
        );
    }

    let authenticator = Authenticator::new(config).await?;
    if !authenticator.is_authenticated().await {
        bail!("Not authenticated. Run 'google-workspace-mcp auth' first or set GOOGLE_ACCESS_TOKEN.");
    }

    let api = Arc::new(GoogleApi::new(Arc::new(authenticator)));
    let gmail = Arc::new(GmailClient::new(api.clone()));
    let drive = Arc::new(DriveClient::new(api.clone()));
    let calendar = Arc::new(CalendarClient::new(api));

    // Fail fast when the token cannot reach the services
    let calendar_name = calendar
        .primary_summary()
        .await
        .context("Failed to initialize Calendar service")?;
    tracing::info!(
        calendar = calendar_name.as_deref().unwrap_or("primary"),
        "Calendar service ready"
    );

    let profile = gmail
        .get_profile()
        .await
        .context("Failed to initialize Gmail service")?;
    tracing::info!(email = %profile.email_address, "Gmail service ready");

    let mut server = McpServer::new(ToolHandler::new(gmail, drive, calendar));
    tracing::info!("Serving MCP on stdio");
    server.run_stdio().await?;

    Ok(())
}
