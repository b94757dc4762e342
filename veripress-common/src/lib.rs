//! # Veripress Common Library
//!
//! Shared code for the Veripress verification service:
//! - Error and result types
//! - Configuration file location and root folder resolution
//! - Content hashing (SHA-256, hex encoded)
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod hash;
pub mod time;

pub use error::{Error, Result};
pub use hash::{content_hash, text_hash};
