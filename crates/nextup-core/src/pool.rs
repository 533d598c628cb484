// Pool store: candidate entries, insertion order, size cap.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::history::SelectionHistory;

/// Hard upper bound on the number of entries a pool can hold.
pub const MAX_POOL_SIZE: usize = 1000;

/// A single candidate label.
///
/// Always non-empty and trimmed. Equality is exact string equality, so
/// `"Ada"` and `"ada"` are different entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(String);

impl Entry {
    /// Build an entry from raw text. Returns `None` when the trimmed text is
    /// empty.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Entry(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Entry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Entry {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Entry {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Split raw list text into entries: one per line, trimmed, blank lines
/// dropped. Handles both `\n` and `\r\n` line endings.
pub fn parse_lines(text: &str) -> Vec<Entry> {
    text.lines().filter_map(Entry::parse).collect()
}

/// The editable set of candidates for a draw.
///
/// Order is insertion order; it matters for display but not for selection.
/// The pool never deduplicates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Pool {
    entries: Vec<Entry>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pool wholesale with the given entries.
    ///
    /// Anything past [`MAX_POOL_SIZE`] is dropped. Returns the new size.
    /// Clearing history on reload is the facade's job, not the pool's.
    pub fn load(&mut self, entries: Vec<Entry>) -> usize {
        let mut entries = entries;
        if entries.len() > MAX_POOL_SIZE {
            warn!(
                "List has {} entries, keeping the first {}",
                entries.len(),
                MAX_POOL_SIZE
            );
            entries.truncate(MAX_POOL_SIZE);
        }
        self.entries = entries;
        self.entries.len()
    }

    /// Append an entry built from `text`.
    ///
    /// Returns `false` (and leaves the pool untouched) when the trimmed text
    /// is empty or the pool is already full.
    pub fn add(&mut self, text: &str) -> bool {
        if self.is_full() {
            debug!("Pool is full ({} entries), ignoring add", MAX_POOL_SIZE);
            return false;
        }
        match Entry::parse(text) {
            Some(entry) => {
                self.entries.push(entry);
                true
            }
            None => {
                debug!("Ignoring blank entry");
                false
            }
        }
    }

    /// Remove the first entry exactly equal to `entry`. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, entry: &str) -> bool {
        match self.entries.iter().position(|e| e == entry) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_POOL_SIZE
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries not yet present in `history`, in pool order.
    ///
    /// Exclusion is by equality, so every copy of a duplicated label drops
    /// out once any copy has been drawn.
    pub fn eligible_against(&self, history: &SelectionHistory) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| !history.contains(e.as_str()))
            .cloned()
            .collect()
    }
}
