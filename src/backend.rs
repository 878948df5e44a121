//! History contracts shared by every backend
//!
//! [`History`] is the capability a line editor consumes: append committed
//! lines and search them while the user types. [`ManagedHistory`] adds the
//! maintenance operations (listing, clearing, restoring and persisting) so
//! the CLI can drive any backend without matching on its concrete type.

use crate::error::Result;
use std::io::{Read, Write};
use std::sync::Arc;

/// Scrollback history as seen by a line editor
///
/// Implementations synchronize internally, so every method takes `&self`
/// and a store can be shared between the editing session and a background
/// task that saves it.
pub trait History: Send + Sync {
    /// Append a committed input line
    ///
    /// Should be called once per line the prompt accepted. Appending the same
    /// line as the newest entry is a no-op.
    fn append_history(&self, item: &str);

    /// Get the history lines starting with `prefix`, oldest first
    #[must_use = "Search results should be used"]
    fn find_by_prefix(&self, prefix: &str) -> Vec<String>;

    /// Get the history lines containing `pattern` with the byte offset of
    /// the first occurrence in each, oldest first
    #[must_use = "Search results should be used"]
    fn find_by_pattern(&self, pattern: &str) -> (Vec<String>, Vec<usize>);
}

/// Maintenance operations over a history backend
pub trait ManagedHistory: History {
    /// Get all history entries, oldest first
    #[must_use = "Query results should be used"]
    fn entries(&self) -> Result<Vec<String>>;

    /// Number of entries currently stored
    fn len(&self) -> Result<usize>;

    /// Whether the history holds no entries
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove all entries
    fn clear(&self) -> Result<()>;

    /// Load lines from `reader` without duplicate suppression
    ///
    /// Returns the number of lines restored; on failure the lines already
    /// restored are kept and the error carries their count.
    fn restore(&self, reader: &mut dyn Read) -> Result<usize>;

    /// Write every entry to `writer`, one per line
    ///
    /// Returns the number of lines written; on failure the error carries the
    /// count written before it.
    fn persist(&self, writer: &mut dyn Write) -> Result<usize>;
}

impl<T: History + ?Sized> History for Arc<T> {
    fn append_history(&self, item: &str) {
        (**self).append_history(item)
    }

    fn find_by_prefix(&self, prefix: &str) -> Vec<String> {
        (**self).find_by_prefix(prefix)
    }

    fn find_by_pattern(&self, pattern: &str) -> (Vec<String>, Vec<usize>) {
        (**self).find_by_pattern(pattern)
    }
}

impl<T: History + ?Sized> History for Box<T> {
    fn append_history(&self, item: &str) {
        (**self).append_history(item)
    }

    fn find_by_prefix(&self, prefix: &str) -> Vec<String> {
        (**self).find_by_prefix(prefix)
    }

    fn find_by_pattern(&self, pattern: &str) -> (Vec<String>, Vec<usize>) {
        (**self).find_by_pattern(pattern)
    }
}
