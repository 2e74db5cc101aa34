use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to an expense by the store
///
/// The value is opaque to the rest of the application; only equality matters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        ExpenseId(id.into())
    }

    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        ExpenseId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(id: &str) -> Self {
        ExpenseId::new(id)
    }
}

/// Payload of an expense without its identity
///
/// This is what the form submits and what the store hands out in change events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    /// Label shown in the legend and the tooltip
    pub name: String,

    /// Amount spent, in whole currency units
    pub cost: u64,
}

impl NewExpense {
    pub fn new(name: impl Into<String>, cost: u64) -> Self {
        NewExpense {
            name: name.into(),
            cost,
        }
    }

    pub fn with_id(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            name: self.name,
            cost: self.cost,
        }
    }
}

/// An expense record as mirrored from the store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub name: String,
    pub cost: u64,
}

impl Expense {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost: u64) -> Self {
        Expense {
            id: ExpenseId::new(id),
            name: name.into(),
            cost,
        }
    }
}

/// Kind of a change reported by a store subscription
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// A single document change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub id: ExpenseId,
    pub data: NewExpense,
}

impl Change {
    pub fn added(expense: &Expense) -> Self {
        Self::from_expense(ChangeKind::Added, expense)
    }

    pub fn modified(expense: &Expense) -> Self {
        Self::from_expense(ChangeKind::Modified, expense)
    }

    pub fn removed(expense: &Expense) -> Self {
        Self::from_expense(ChangeKind::Removed, expense)
    }

    fn from_expense(kind: ChangeKind, expense: &Expense) -> Self {
        Change {
            kind,
            id: expense.id.clone(),
            data: NewExpense::new(expense.name.clone(), expense.cost),
        }
    }

    /// The record this change carries, with its id attached
    pub fn to_expense(&self) -> Expense {
        self.data.clone().with_id(self.id.clone())
    }
}

/// Changes delivered together by one subscription callback
pub type ChangeBatch = Vec<Change>;
