//! Prelude module for scrollback
//!
//! Re-exports the types a line editor needs to wire up history.
//!
//! # Usage
//!
//! ```rust
//! use scrollback::prelude::*;
//!
//! let history = MemoryHistory::new();
//! history.append_history("ls");
//! ```

pub use crate::backend::{History, ManagedHistory};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::history::{HISTORY_LIMIT, MemoryHistory};
