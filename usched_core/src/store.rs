//! Assignment store.
//!
//! Holds the one current assignment set. The only mutators are whole-set
//! replacement and clear, so a caller can never leave a half-applied run
//! behind.

use crate::AssignmentSet;

/// In-memory holder of the current allocation result
#[derive(Debug, Default)]
pub struct AssignmentStore {
    current: AssignmentSet,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically swap in a new assignment set, discarding the previous one
    pub fn replace_all(&mut self, set: AssignmentSet) {
        tracing::debug!(
            previous = self.current.len(),
            next = set.len(),
            run_id = ?set.run_id,
            "Replacing assignment set"
        );
        self.current = set;
    }

    pub fn clear(&mut self) {
        if !self.current.is_empty() {
            tracing::debug!(discarded = self.current.len(), "Clearing assignment set");
        }
        self.current = AssignmentSet::default();
    }

    pub fn count(&self) -> usize {
        self.current.len()
    }

    /// Snapshot of the current set
    pub fn all(&self) -> AssignmentSet {
        self.current.clone()
    }

    /// Borrow the current set without cloning
    pub fn current(&self) -> &AssignmentSet {
        &self.current
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}
