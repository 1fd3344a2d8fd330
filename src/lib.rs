//! Google Workspace MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing Google Drive, Gmail and
//! Google Calendar operations as tools for an automation client.

pub mod auth;
pub mod calendar;
pub mod config;
pub mod drive;
pub mod error;
pub mod format;
pub mod gmail;
pub mod google;
pub mod mcp;
pub mod pdf;

pub use config::Config;
pub use error::{Result, WorkspaceMcpError};
