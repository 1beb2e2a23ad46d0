//! PVEGate Common Library
//!
//! Shared types, error taxonomy, response envelope, and state database for
//! the PVEGate gateway.

pub mod db;
pub mod envelope;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use db::Database;
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use types::*;

/// PVEGate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default store path
pub fn default_store_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".pvegate")
}

/// Default database path
pub fn default_db_path() -> std::path::PathBuf {
    default_store_path().join("state.db")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
