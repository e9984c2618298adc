//! API module for the meet server
//!
//! This module contains the routes and shared handler state.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod health;
pub mod parse_results;

use crate::config::ServerConfig;
use crate::script::{ProcessScriptRunner, ScriptRunner};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Runs the parser on staged uploads
    pub runner: Arc<dyn ScriptRunner>,
    /// Where uploads are staged
    pub upload_dir: PathBuf,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl AppState {
    /// State that spawns the configured parser script
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            runner: Arc::new(ProcessScriptRunner::new(
                config.script_interpreter.clone(),
                config.script_path.clone(),
            )),
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Build the router for API endpoints
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_status))
        .route("/health", get(health::health_check))
        .route("/parse-results", post(parse_results::parse_results))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
