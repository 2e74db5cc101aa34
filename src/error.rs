//! Error types shared across the tracker.

use crate::expense::ExpenseId;
use thiserror::Error;

/// Validation failure of the expense form.
///
/// The `Display` text is what the form shows in its error region.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Either the name or the cost field is empty.
    #[error("Please enter values before submitting")]
    MissingValues,

    /// The cost field does not start with a whole number.
    #[error("Cost must be a whole number")]
    InvalidCost(String),

    /// The cost parsed to a value below zero.
    #[error("Cost cannot be negative")]
    NegativeCost(i64),
}

/// Failure reported by an expense store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this id exists in the collection.
    #[error("Expense not found: {0}")]
    NotFound(ExpenseId),

    /// Reading or writing the snapshot file failed.
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a failed form submission.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error("Failed to create expense: {0}")]
    Store(#[from] StoreError),
}

/// Failure while drawing a chart frame.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing error: {0}")]
    Drawing(String),

    #[error("Image encoding error: {0}")]
    Encoding(String),
}
