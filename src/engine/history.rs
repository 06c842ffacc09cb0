//! Execution history with a replay cursor.

use std::sync::Arc;

use crate::machine::MachineState;

/// Append-only list of snapshots plus a cursor.
///
/// Never empty: entry 0 is the initial state of the run. Cloning a history
/// clones `Arc`s, not snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<Arc<MachineState>>,
    cursor: usize,
}

impl History {
    pub fn new(initial: MachineState) -> Self {
        Self {
            entries: vec![Arc::new(initial)],
            cursor: 0,
        }
    }

    /// Snapshot under the cursor.
    #[inline]
    pub fn current(&self) -> &Arc<MachineState> {
        &self.entries[self.cursor]
    }

    /// Entry 0.
    #[inline]
    pub fn initial(&self) -> &Arc<MachineState> {
        &self.entries[0]
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: entry 0 is never removed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Cursor sits on the newest entry.
    #[inline]
    pub fn at_live_edge(&self) -> bool {
        self.cursor + 1 == self.entries.len()
    }

    pub fn entries(&self) -> &[Arc<MachineState>] {
        &self.entries
    }

    /// Move the cursor back one entry. Returns false at entry 0.
    pub fn back(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor forward through recorded entries. Returns false at
    /// the live edge.
    pub fn replay(&mut self) -> bool {
        if self.at_live_edge() {
            false
        } else {
            self.cursor += 1;
            true
        }
    }

    /// Append a freshly executed snapshot and move the cursor onto it.
    ///
    /// Callers only push from the live edge, so nothing is overwritten.
    pub fn push(&mut self, state: MachineState) {
        debug_assert!(self.at_live_edge());
        self.entries.push(Arc::new(state));
        self.cursor = self.entries.len() - 1;
    }

    /// Drop everything after entry 0.
    pub fn reset(&mut self) {
        self.entries.truncate(1);
        self.cursor = 0;
    }
}
