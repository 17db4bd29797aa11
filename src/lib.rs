//! Bookshelf Server
//!
//! Backend for a personal book catalog: registered readers add, edit,
//! search and delete their books through a REST JSON API, with cover
//! images uploaded alongside the records.

use std::sync::Arc;

pub mod api;
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
