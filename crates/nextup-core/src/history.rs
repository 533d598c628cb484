// Selection history: the ordered record of drawn entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pool::Entry;

/// One committed draw.
#[derive(Debug, Clone, Serialize)]
pub struct DrawRecord {
    /// The winning entry.
    pub entry: Entry,
    /// When the draw settled.
    pub drawn_at: DateTime<Utc>,
}

/// Append-only record of past draws, cleared only by an explicit reset.
///
/// History is a record of events, not a live view of the pool: an entry
/// removed from the pool after being drawn stays here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionHistory {
    records: Vec<DrawRecord>,
}

impl SelectionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a drawn entry, stamped with the current time.
    ///
    /// Duplicates are not rejected here. The scheduler only ever commits
    /// entries taken from the eligible set, which already excludes history.
    pub fn append(&mut self, entry: Entry) {
        self.records.push(DrawRecord {
            entry,
            drawn_at: Utc::now(),
        });
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.records.iter().any(|r| r.entry == entry)
    }

    /// 1-based rank of the first occurrence of `entry`, if it was drawn.
    pub fn ordinal_of(&self, entry: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.entry == entry)
            .map(|idx| idx + 1)
    }

    /// Display label ("1st", "2nd", ...) for `entry`, if it was drawn.
    pub fn ordinal_label_of(&self, entry: &str) -> Option<String> {
        self.ordinal_of(entry).map(ordinal_label)
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    /// Drawn entries in draw order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.records.iter().map(|r| &r.entry)
    }

    pub fn last(&self) -> Option<&DrawRecord> {
        self.records.last()
    }
}

/// Format a 1-based rank as a short ordinal label.
///
/// Only the first three ranks get their own suffix; everything from 4 on is
/// "{n}th" (so 21 renders as "21th").
pub fn ordinal_label(rank: usize) -> String {
    match rank {
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        n => format!("{n}th"),
    }
}
