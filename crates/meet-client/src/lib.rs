//!
//! Meet Client - talks to the results processing service
//!
//! Provides the reqwest-backed [`ProcessingApi`](meet_core::ProcessingApi)
//! implementation, a status probe for the sleeping hosted service, and a
//! download sink that saves returned files to disk.

/// HTTP submission client
pub mod client;

/// Configuration module
pub mod config;

/// Download sink
pub mod download;

/// Error module
pub mod error;

/// Service status probe
pub mod health;

// Re-export key types
pub use client::ProcessingClient;
pub use config::ClientConfig;
pub use download::DirectoryDownloadSink;
pub use error::{ClientError, ClientResult};
pub use health::{ApiStatus, StatusProbe};
