//! Typed Toggl Track client used to pull time entries for the sync job.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::TogglClient;
pub use config::TogglConfig;
pub use error::{Result, TogglError};
pub use models::TimeEntry;
