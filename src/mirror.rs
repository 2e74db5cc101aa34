use log::{debug, warn};

use crate::expense::{Change, ChangeKind, Expense, ExpenseId};

/// A change that did not line up with the mirror's contents
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// An added record whose id was already mirrored; it replaced the old entry
    DuplicateAdd(ExpenseId),

    /// A modification for an id that is not mirrored; it was ignored
    UnknownModified(ExpenseId),

    /// A removal for an id that is not mirrored; it was ignored
    UnknownRemoved(ExpenseId),
}

/// Result of applying one batch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Applied {
    /// The mirror contents after the batch, in arrival order
    pub snapshot: Vec<Expense>,

    /// Changes that referenced ids in an unexpected state
    pub mismatches: Vec<Mismatch>,
}

/// Local, ordered copy of the expenses collection
///
/// The mirror is rebuilt incrementally from subscription batches. Records keep
/// the order in which they were first added; modifications replace a record in
/// place and removals drop it. Ids are never duplicated.
#[derive(Clone, Debug, Default)]
pub struct ExpenseMirror {
    records: Vec<Expense>,
}

impl ExpenseMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every change of a batch in order and returns the new snapshot
    ///
    /// Rendering is left to the caller, which should redraw once per batch.
    pub fn apply_batch(&mut self, batch: &[Change]) -> Applied {
        let mut mismatches = Vec::new();
        for change in batch {
            if let Some(mismatch) = self.apply(change) {
                warn!("Ignoring out-of-sync change: {:?}", mismatch);
                mismatches.push(mismatch);
            }
        }
        debug!(
            "Applied batch of {} change(s); mirror holds {} record(s)",
            batch.len(),
            self.records.len()
        );
        Applied {
            snapshot: self.snapshot(),
            mismatches,
        }
    }

    fn apply(&mut self, change: &Change) -> Option<Mismatch> {
        match change.kind {
            ChangeKind::Added => match self.position(&change.id) {
                Some(index) => {
                    self.records[index] = change.to_expense();
                    Some(Mismatch::DuplicateAdd(change.id.clone()))
                }
                None => {
                    self.records.push(change.to_expense());
                    None
                }
            },
            ChangeKind::Modified => match self.position(&change.id) {
                Some(index) => {
                    self.records[index] = change.to_expense();
                    None
                }
                None => Some(Mismatch::UnknownModified(change.id.clone())),
            },
            ChangeKind::Removed => {
                let before = self.records.len();
                self.records.retain(|e| e.id != change.id);
                if self.records.len() == before {
                    Some(Mismatch::UnknownRemoved(change.id.clone()))
                } else {
                    None
                }
            }
        }
    }

    fn position(&self, id: &ExpenseId) -> Option<usize> {
        self.records.iter().position(|e| &e.id == id)
    }

    /// Current contents, in arrival order
    pub fn snapshot(&self) -> Vec<Expense> {
        self.records.clone()
    }

    pub fn records(&self) -> &[Expense] {
        &self.records
    }

    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.records.iter().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
