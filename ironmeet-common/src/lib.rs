//! # Ironmeet Common Library
//!
//! Shared code for the ironmeet meet coordination service:
//! - Domain models (lifters, classes, attempts, meet cursor)
//! - Event types (MeetEvent enum)
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
