//! Linear undo/redo log over snapshots of one floor's elements.
//!
//! The log is scoped to the current floor: switching floors or loading a
//! drawing reseeds it, so undo never crosses a floor boundary. Snapshots are
//! owned clones of the element list and are independent of later edits.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use tracing::debug;

use crate::consts::HISTORY_LIMIT;
use crate::doc::Element;

/// Snapshot log with a cursor at the currently applied entry.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Vec<Element>>,
    /// Position of the applied snapshot; `None` when the log is empty.
    index: Option<usize>,
}

impl History {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding a single snapshot of `elements`, applied.
    #[must_use]
    pub fn seeded(elements: &[Element]) -> Self {
        Self { entries: vec![elements.to_vec()], index: Some(0) }
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }

    /// Replace the log with a single snapshot of `elements`.
    pub fn reseed(&mut self, elements: &[Element]) {
        *self = Self::seeded(elements);
    }

    /// Record a new snapshot after a mutation.
    ///
    /// Any redo-able future is discarded first. When the log grows past
    /// [`HISTORY_LIMIT`], the oldest snapshot is dropped and the cursor stays
    /// on the same logical entry.
    pub fn commit(&mut self, elements: &[Element]) {
        let keep = self.index.map_or(0, |i| i + 1);
        if keep < self.entries.len() {
            debug!(discarded = self.entries.len() - keep, "history branch truncated");
            self.entries.truncate(keep);
        }

        self.entries.push(elements.to_vec());
        let mut index = self.entries.len() - 1;

        if self.entries.len() > HISTORY_LIMIT {
            self.entries.remove(0);
            index -= 1;
        }
        self.index = Some(index);
    }

    /// Step back one snapshot and return a copy of it to apply.
    ///
    /// Returns `None` (and changes nothing) when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<Element>> {
        let index = self.index.filter(|&i| i > 0)? - 1;
        self.index = Some(index);
        Some(self.entries[index].clone())
    }

    /// Step forward one snapshot and return a copy of it to apply.
    ///
    /// Returns `None` (and changes nothing) when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Vec<Element>> {
        if !self.can_redo() {
            return None;
        }
        let index = self.index.map_or(0, |i| i + 1);
        self.index = Some(index);
        Some(self.entries[index].clone())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        match self.index {
            Some(i) => i + 1 < self.entries.len(),
            None => !self.entries.is_empty(),
        }
    }

    /// Number of snapshots held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, `None` when empty.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}
