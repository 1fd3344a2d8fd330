//! Google Drive API module

pub mod client;
pub mod types;
pub mod utils;

pub use client::{DriveClient, FileContent};
