//! Search engine for scrollback
//!
//! Prefix and substring queries over history entries. Both queries keep the
//! chronological order of the input; presentation concerns (limits,
//! newest-first ordering, highlighting) live in [`SearchEngine`].

use crate::config::SearchConfig;

/// Entries starting with `prefix`, oldest first
///
/// The empty prefix matches every entry.
pub fn find_by_prefix<'a, I>(entries: I, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    entries
        .into_iter()
        .filter(|entry| entry.starts_with(prefix))
        .map(str::to_owned)
        .collect()
}

/// Entries containing `pattern`, paired with the byte offset of its first
/// occurrence, oldest first
///
/// The empty pattern matches nothing, so an incremental search that has not
/// been typed yet does not list the whole history.
pub fn find_by_pattern<'a, I>(entries: I, pattern: &str) -> (Vec<String>, Vec<usize>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut found = Vec::new();
    let mut positions = Vec::new();
    if pattern.is_empty() {
        return (found, positions);
    }

    for entry in entries {
        if let Some(pos) = entry.find(pattern) {
            found.push(entry.to_owned());
            positions.push(pos);
        }
    }
    (found, positions)
}

/// A single search hit prepared for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The matching history entry
    pub entry: String,
    /// Byte range of the match in `entry`
    pub span: (usize, usize),
    /// Entry with the match highlighted (if highlighting is enabled)
    pub highlighted: Option<String>,
}

/// Presentation layer over the raw queries
#[derive(Debug, Clone)]
pub struct SearchEngine {
    /// Maximum number of results to return
    pub max_results: usize,
    /// Whether to list the most recent matches first
    pub newest_first: bool,
    /// Whether to highlight matches in search results
    pub highlight_matches: bool,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Create a new search engine with default settings
    pub fn new() -> Self {
        Self::with_config(&SearchConfig::default())
    }

    /// Create a new search engine from the search configuration
    pub fn with_config(config: &SearchConfig) -> Self {
        Self {
            max_results: config.max_results,
            newest_first: config.newest_first,
            highlight_matches: config.highlight_matches,
        }
    }

    /// Shape prefix-search output for display
    pub fn prefix_results(&self, found: Vec<String>, prefix: &str) -> Vec<SearchResult> {
        let hits = found.into_iter().map(|entry| (entry, 0)).collect();
        self.shape(hits, prefix.len())
    }

    /// Shape pattern-search output for display
    pub fn pattern_results(
        &self,
        found: Vec<String>,
        positions: Vec<usize>,
        pattern: &str,
    ) -> Vec<SearchResult> {
        let hits = found.into_iter().zip(positions).collect();
        self.shape(hits, pattern.len())
    }

    fn shape(&self, mut hits: Vec<(String, usize)>, len: usize) -> Vec<SearchResult> {
        if self.newest_first {
            hits.reverse();
        }
        hits.truncate(self.max_results);

        hits.into_iter()
            .map(|(entry, start)| {
                let span = (start, start + len);
                let highlighted = if self.highlight_matches && len > 0 {
                    Some(self.highlight(&entry, span))
                } else {
                    None
                };
                SearchResult {
                    entry,
                    span,
                    highlighted,
                }
            })
            .collect()
    }

    /// Highlight a byte range of `entry` with ANSI bold yellow
    pub fn highlight(&self, entry: &str, span: (usize, usize)) -> String {
        let (start, end) = span;
        match (entry.get(..start), entry.get(start..end), entry.get(end..)) {
            (Some(before), Some(matched), Some(after)) => {
                format!("{before}\x1b[1;33m{matched}\x1b[0m{after}")
            }
            _ => entry.to_owned(),
        }
    }
}
