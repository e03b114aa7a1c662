//! Database access layer
//!
//! Provides connection setup and per-table query modules. The SQLite
//! database is the single source of truth; read endpoints consult it
//! directly with no component-local caching.

pub mod attempts;
pub mod classes;
pub mod cursor;
pub mod init;
pub mod lifters;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Open (creating if missing) the meet database
///
/// Foreign keys are enabled on every pooled connection; attempt rows cascade
/// with their owning lifter and additional-class references prune with their
/// class.
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    info!("Opened meet database at {}", path.display());
    Ok(pool)
}
