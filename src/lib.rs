//! scrollback - bounded scrollback history for interactive line editors
//!
//! This library provides:
//! - A bounded, thread-safe history store with immediate-duplicate suppression
//! - Prefix and substring search over past input lines
//! - A plain-text, one-entry-per-line persistence format
//! - An alternate SQLite backend behind the same `History` trait
//!
//! # Examples
//!
//! ```rust
//! use scrollback::{History, MemoryHistory};
//!
//! let history = MemoryHistory::new();
//! history.append_history("cargo build");
//! history.append_history("cargo test");
//! assert_eq!(history.find_by_prefix("cargo t"), vec!["cargo test"]);
//!
//! let mut saved = Vec::new();
//! history.persist(&mut saved)?;
//! assert_eq!(saved, b"cargo build\ncargo test\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::PathBuf;

pub mod backend;
pub mod cli;
pub mod codec;
pub mod config;
pub mod database;
pub mod error;
pub mod history;
pub mod prelude;
pub mod search;

pub use backend::{History, ManagedHistory};
pub use config::Config;
pub use database::SqliteHistory;
pub use error::{Error, Result};
pub use history::{HISTORY_LIMIT, MemoryHistory};
pub use search::SearchEngine;

/// The default history file name
pub const DEFAULT_HISTORY_FILE: &str = ".scrollback_history";

/// Get the default history file path
pub fn default_history_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(Error::HomeDirectoryNotFound)?;
    Ok(home.join(DEFAULT_HISTORY_FILE))
}

/// Create an in-memory history sized by the given configuration
pub fn init_with_config(config: &Config) -> MemoryHistory {
    MemoryHistory::with_capacity(config.capacity).with_max_line_length(config.max_line_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_history_path() {
        let path = default_history_path().unwrap();
        assert!(path.ends_with(DEFAULT_HISTORY_FILE));
    }

    #[test]
    fn test_init_with_config() {
        let mut config = Config::default();
        config.capacity = 10;
        config.max_line_length = 80;

        let history = init_with_config(&config);
        assert_eq!(history.capacity(), 10);
        assert_eq!(history.max_line_length(), 80);
    }
}
