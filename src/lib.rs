//! Sproutlog child-care log server
//!
//! Records point-in-time child-care observations submitted in bulk by
//! caregivers and derives per-child, per-day aggregate reports for
//! caregivers and guardians.

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
