//! Libris Book Library Catalog Server
//!
//! A Rust implementation of a small library catalog service, providing a
//! REST JSON API for managing books, users, and borrowings, together with
//! a scheduled scanner that emails reminders for borrowings due within the
//! next 24 hours.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
