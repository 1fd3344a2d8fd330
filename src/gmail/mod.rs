//! Gmail API module
//!
//! Message retrieval, MIME traversal and outgoing mail construction.

pub mod client;
pub mod mime;
pub mod types;
pub mod utils;

pub use client::GmailClient;
