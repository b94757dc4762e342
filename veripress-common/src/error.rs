//! Errors shared by the Veripress crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures below the HTTP layer: storage, filesystem and configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unreadable configuration file, bad value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored evidence lists are JSON; a row that fails to round-trip lands here
    #[error("Evidence encoding error: {0}")]
    Evidence(#[from] serde_json::Error),
}
