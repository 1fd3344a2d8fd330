//! MCP (Model Context Protocol) module
//!
//! Implements the MCP server protocol for tool invocation and Drive
//! resource reads.

pub mod resources;
pub mod server;
pub mod tools;
pub mod types;
