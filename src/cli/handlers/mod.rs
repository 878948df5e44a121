//! Command handler implementations for scrollback CLI
//!
//! This module organizes command handlers into logical groups:
//! - `basic`: Everyday commands (add, list, prefix, search, clear, status)
//! - `import_export`: Restoring from and persisting to files
//! - `config`: Configuration handler

mod basic;
mod config;
mod import_export;

pub use basic::*;
pub use config::*;
pub use import_export::*;
