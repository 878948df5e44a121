//! In-memory scrollback history
//!
//! [`MemoryHistory`] is the default [`History`] implementation: a bounded,
//! chronologically ordered log of input lines behind a reader/writer lock.
//! Appending, clearing and restoring take the write lock; searching,
//! listing and persisting take the read lock, so history can be saved from
//! another thread (for example on Ctrl-C) while a prompt is still active.

use crate::backend::{History, ManagedHistory};
use crate::codec::{self, DEFAULT_MAX_LINE_LENGTH};
use crate::error::Result;
use crate::search;
use std::collections::VecDeque;
use std::io::{BufReader, Read, Write};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Maximum number of entries kept in the scrollback history by default
pub const HISTORY_LIMIT: usize = 1000;

/// Bounded, thread-safe scrollback history
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RwLock<VecDeque<String>>,
    capacity: usize,
    max_line_length: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistory {
    /// Create an empty history holding up to [`HISTORY_LIMIT`] entries
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_LIMIT)
    }

    /// Create an empty history holding up to `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(HISTORY_LIMIT))),
            capacity,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Set the longest line [`MemoryHistory::restore`] accepts, in bytes
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    /// Maximum number of entries kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Longest line accepted by restore, in bytes
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Append an entry unless it repeats the newest one
    ///
    /// Evicts the oldest entry once the history is over capacity.
    pub fn append(&self, item: &str) {
        let mut entries = self.write();
        if entries.back().is_some_and(|last| last == item) {
            return;
        }
        push_bounded(&mut entries, item.to_owned(), self.capacity);
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The newest entry
    pub fn last(&self) -> Option<String> {
        self.read().back().cloned()
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.read().iter().cloned().collect()
    }

    /// Read history lines from `reader`, appending each as the newest entry
    ///
    /// Lines are loaded as-is, without duplicate suppression, and older
    /// entries are evicted as usual once the history is full. Returns the
    /// number of lines read. A line that is too long or not valid UTF-8 stops
    /// the restore with [`crate::Error::Interrupted`]; the lines read before
    /// it remain in the history.
    pub fn restore<R: Read>(&self, reader: R) -> Result<usize> {
        let mut entries = self.write();
        let capacity = self.capacity;
        let result = codec::read_lines(BufReader::new(reader), self.max_line_length, |line| {
            push_bounded(&mut entries, line, capacity);
            Ok(())
        });

        match &result {
            Ok(count) => tracing::debug!(count, "restored history"),
            Err(e) => tracing::debug!(count = e.processed(), error = %e, "history restore stopped"),
        }
        result
    }

    /// Write every entry to `writer`, one per line, oldest first
    ///
    /// Returns the number of lines written. Stops at the first write error,
    /// reporting the lines written so far through
    /// [`crate::Error::Interrupted`]. Safe to call from another thread while
    /// the history is in use; the output is a consistent snapshot.
    pub fn persist<W: Write>(&self, mut writer: W) -> Result<usize> {
        let entries = self.read();
        let result = codec::write_lines(&mut writer, entries.iter().map(String::as_str));

        match &result {
            Ok(count) => tracing::debug!(count, "persisted history"),
            Err(e) => tracing::debug!(count = e.processed(), error = %e, "history persist stopped"),
        }
        result
    }

    fn read(&self) -> RwLockReadGuard<'_, VecDeque<String>> {
        // Mutations never leave the deque half-updated, so a poisoned lock
        // still guards a valid history.
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn push_bounded(entries: &mut VecDeque<String>, item: String, capacity: usize) {
    entries.push_back(item);
    while entries.len() > capacity {
        if let Some(evicted) = entries.pop_front() {
            tracing::trace!(entry = %evicted, "evicted oldest history entry");
        }
    }
}

impl History for MemoryHistory {
    fn append_history(&self, item: &str) {
        self.append(item);
    }

    fn find_by_prefix(&self, prefix: &str) -> Vec<String> {
        let entries = self.read();
        search::find_by_prefix(entries.iter().map(String::as_str), prefix)
    }

    fn find_by_pattern(&self, pattern: &str) -> (Vec<String>, Vec<usize>) {
        let entries = self.read();
        search::find_by_pattern(entries.iter().map(String::as_str), pattern)
    }
}

impl ManagedHistory for MemoryHistory {
    fn entries(&self) -> Result<Vec<String>> {
        Ok(MemoryHistory::entries(self))
    }

    fn len(&self) -> Result<usize> {
        Ok(MemoryHistory::len(self))
    }

    fn clear(&self) -> Result<()> {
        MemoryHistory::clear(self);
        Ok(())
    }

    fn restore(&self, reader: &mut dyn Read) -> Result<usize> {
        MemoryHistory::restore(self, reader)
    }

    fn persist(&self, writer: &mut dyn Write) -> Result<usize> {
        MemoryHistory::persist(self, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::{self, Cursor};
    use std::sync::Arc;
    use std::thread;

    fn history_with(lines: &[&str]) -> MemoryHistory {
        let history = MemoryHistory::new();
        for line in lines {
            history.append(line);
        }
        history
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = MemoryHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), HISTORY_LIMIT);
        assert_eq!(history.last(), None);
    }

    #[test]
    fn test_append_keeps_chronological_order() {
        let history = history_with(&["ls", "cd /tmp", "pwd"]);
        assert_eq!(history.entries(), vec!["ls", "cd /tmp", "pwd"]);
        assert_eq!(history.last().as_deref(), Some("pwd"));
    }

    #[test]
    fn test_immediate_duplicate_is_suppressed() {
        let history = history_with(&["x", "x"]);
        assert_eq!(history.entries(), vec!["x"]);

        let history = history_with(&["x", "y", "x"]);
        assert_eq!(history.entries(), vec!["x", "y", "x"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let history = MemoryHistory::with_capacity(3);
        for i in 0..3 {
            history.append(&format!("cmd{i}"));
        }
        assert_eq!(history.len(), 3);

        history.append("cmd3");
        assert_eq!(history.entries(), vec!["cmd1", "cmd2", "cmd3"]);

        history.append("cmd4");
        assert_eq!(history.entries(), vec!["cmd2", "cmd3", "cmd4"]);
    }

    #[test]
    fn test_default_capacity_is_enforced() {
        let history = MemoryHistory::new();
        for i in 0..HISTORY_LIMIT + 5 {
            history.append(&i.to_string());
            assert!(history.len() <= HISTORY_LIMIT);
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0], "5");
    }

    #[test]
    fn test_clear() {
        let history = history_with(&["a", "b"]);
        history.clear();
        assert!(history.is_empty());

        // The duplicate check starts over after a clear.
        history.append("b");
        assert_eq!(history.entries(), vec!["b"]);
    }

    #[test]
    fn test_search_through_trait() {
        let history = history_with(&["cat", "car", "dog"]);
        assert_eq!(history.find_by_prefix("ca"), vec!["cat", "car"]);
        assert_eq!(history.find_by_prefix("").len(), 3);
        assert!(history.find_by_prefix("z").is_empty());

        let history = history_with(&["hello world", "say hello"]);
        let (found, positions) = history.find_by_pattern("hello");
        assert_eq!(found, vec!["hello world", "say hello"]);
        assert_eq!(positions, vec![0, 4]);

        let (found, positions) = history.find_by_pattern("");
        assert!(found.is_empty() && positions.is_empty());
    }

    #[test]
    fn test_persist_writes_one_entry_per_line() {
        let history = history_with(&["git status", "cargo test"]);
        let mut out = Vec::new();
        let count = history.persist(&mut out).unwrap();
        assert_eq!(count, 2);
        assert_eq!(out, b"git status\ncargo test\n");
    }

    #[test]
    fn test_restore_bypasses_duplicate_suppression() {
        let history = MemoryHistory::new();
        let count = history.restore(Cursor::new("a\na\nb\n")).unwrap();
        assert_eq!(count, 3);
        assert_eq!(history.entries(), vec!["a", "a", "b"]);
    }

    #[test]
    fn test_restore_appends_after_existing_entries() {
        let history = history_with(&["first"]);
        history.restore(Cursor::new("second\nthird")).unwrap();
        assert_eq!(history.entries(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_restore_respects_capacity() {
        let history = MemoryHistory::with_capacity(2);
        let count = history.restore(Cursor::new("1\n2\n3\n4\n")).unwrap();
        assert_eq!(count, 4);
        assert_eq!(history.entries(), vec!["3", "4"]);
    }

    #[test]
    fn test_restore_invalid_encoding_keeps_prefix() {
        let history = MemoryHistory::new();
        let err = history
            .restore(Cursor::new(b"one\ntwo\n\xff\nfour\n".to_vec()))
            .unwrap_err();

        assert_eq!(err.processed(), Some(2));
        assert!(matches!(err.root_cause(), Error::InvalidEncoding { line: 3 }));
        assert_eq!(history.entries(), vec!["one", "two"]);
    }

    #[test]
    fn test_restore_line_too_long() {
        let history = MemoryHistory::new().with_max_line_length(8);
        let err = history
            .restore(Cursor::new("short\nmuch too long for this\n"))
            .unwrap_err();

        assert_eq!(err.processed(), Some(1));
        assert!(matches!(err.root_cause(), Error::LineTooLong { line: 2 }));
        assert_eq!(history.entries(), vec!["short"]);
    }

    #[test]
    fn test_unbounded_limits() {
        let history = MemoryHistory::with_capacity(usize::MAX).with_max_line_length(usize::MAX);
        let count = history.restore(Cursor::new("abc\ndef\n")).unwrap();
        assert_eq!(count, 2);
        assert_eq!(history.entries(), vec!["abc", "def"]);
    }

    struct BrokenReader {
        served: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"));
            }
            self.served = true;
            let data = b"kept\n";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn test_restore_read_error_is_reported() {
        let history = MemoryHistory::new();
        let err = history.restore(BrokenReader { served: false }).unwrap_err();
        assert_eq!(err.processed(), Some(1));
        assert!(matches!(err.root_cause(), Error::Io(_)));
        assert_eq!(history.entries(), vec!["kept"]);
    }

    struct RefusingWriter;

    impl Write for RefusingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_persist_write_error_is_reported() {
        let history = history_with(&["a", "b"]);
        let err = history.persist(RefusingWriter).unwrap_err();
        assert_eq!(err.processed(), Some(0));
        assert!(matches!(err.root_cause(), Error::Io(_)));
    }

    #[test]
    fn test_round_trip() {
        let history = history_with(&["make", "make test", "", "vim src/lib.rs", "make"]);
        let mut saved = Vec::new();
        history.persist(&mut saved).unwrap();

        let restored = MemoryHistory::new();
        let count = restored.restore(saved.as_slice()).unwrap();
        assert_eq!(count, 5);
        assert_eq!(restored.entries(), history.entries());
    }

    #[test]
    fn test_persist_while_appending() {
        let history = Arc::new(MemoryHistory::new());
        let writer = {
            let history = Arc::clone(&history);
            thread::spawn(move || {
                history.append_history("foo");
                history.append_history("bar");
            })
        };

        let mut out = Vec::new();
        history.persist(&mut out).unwrap();
        writer.join().unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(["", "foo\n", "foo\nbar\n"].contains(&text.as_str()));
    }

    #[test]
    fn test_concurrent_appends_and_persists_are_consistent() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 200;

        let history = Arc::new(MemoryHistory::with_capacity(THREADS * PER_THREAD));

        thread::scope(|scope| {
            for t in 0..THREADS {
                let history = &history;
                scope.spawn(move || {
                    for n in 0..PER_THREAD {
                        history.append_history(&format!("t{t}-{n}"));
                    }
                });
            }

            for _ in 0..THREADS {
                let history = &history;
                scope.spawn(move || {
                    for _ in 0..20 {
                        let mut out = Vec::new();
                        history.persist(&mut out).unwrap();
                        assert_snapshot_is_consistent(&out, THREADS);
                    }
                });
            }
        });

        assert_eq!(history.len(), THREADS * PER_THREAD);
    }

    // Every appending thread's entries must form a gapless prefix 0..k of
    // what it appended: no duplicates, nothing missing, no reordering.
    fn assert_snapshot_is_consistent(out: &[u8], threads: usize) {
        let text = std::str::from_utf8(out).unwrap();
        let mut next = vec![0usize; threads];
        for line in text.lines() {
            let (t, n) = line[1..].split_once('-').unwrap();
            let t: usize = t.parse().unwrap();
            let n: usize = n.parse().unwrap();
            assert_eq!(n, next[t], "entry {line} out of order");
            next[t] += 1;
        }
    }

    #[test]
    fn test_managed_history_through_trait_object() {
        let history: Box<dyn ManagedHistory> = Box::new(MemoryHistory::with_capacity(5));
        history.append_history("one");
        history.append_history("two");
        assert_eq!(history.len().unwrap(), 2);

        let mut out = Vec::new();
        assert_eq!(history.persist(&mut out).unwrap(), 2);

        history.clear().unwrap();
        assert!(history.is_empty().unwrap());

        assert_eq!(history.restore(&mut out.as_slice()).unwrap(), 2);
        assert_eq!(history.entries().unwrap(), vec!["one", "two"]);
    }
}
