//! LocaLibrary - Library Locator System
//!
//! A Rust REST API server that lets readers locate libraries holding the
//! books they want, and lets libraries manage their own catalog behind a
//! stateless token-based identity layer.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
