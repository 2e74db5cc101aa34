//! Document store holding the expenses collection.
//!
//! The rest of the application only sees the [`ExpenseStore`] trait: a live
//! subscription that reports changes in batches, plus create, update and
//! delete requests that resolve to an explicit result. [`MemoryStore`] is the
//! in-process implementation used by the web server and the tests.

use chrono::Utc;
use log::{debug, info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::error::StoreError;
use crate::expense::{Change, ChangeBatch, ExpenseId, NewExpense};
use crate::saving::{StoreSnapshot, StoredExpense, load_snapshot, save_snapshot};

/// Receiving end of a store subscription
///
/// Batches arrive in the order the store produced them.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<ChangeBatch>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<ChangeBatch>) -> Self {
        Subscription { rx }
    }

    /// Waits for the next batch; `None` once the store is gone
    pub async fn next(&mut self) -> Option<ChangeBatch> {
        self.rx.recv().await
    }

    /// Returns the next batch if one is already queued
    pub fn try_next(&mut self) -> Option<ChangeBatch> {
        self.rx.try_recv().ok()
    }
}

/// Contract of the document store backing the tracker
pub trait ExpenseStore: Clone + Send + Sync + 'static {
    /// Starts a live subscription to the collection
    ///
    /// The first batch lists every current record as added, even when empty.
    fn subscribe(&self) -> Subscription;

    /// Adds a record and returns the id the store assigned to it
    fn create(
        &self,
        expense: NewExpense,
    ) -> impl Future<Output = Result<ExpenseId, StoreError>> + Send;

    /// Replaces the payload of an existing record
    fn update(
        &self,
        id: &ExpenseId,
        expense: NewExpense,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes a record by id
    fn delete(&self, id: &ExpenseId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

struct Inner {
    collection: String,
    expenses: Vec<StoredExpense>,
    subscribers: Vec<mpsc::UnboundedSender<ChangeBatch>>,
    snapshot_path: Option<PathBuf>,
}

impl Inner {
    fn broadcast(&mut self, batch: ChangeBatch) {
        debug!(
            "{}: broadcasting {} change(s) to {} subscriber(s)",
            self.collection,
            batch.len(),
            self.subscribers.len()
        );
        self.subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
    }

    /// Saves the collection when a snapshot path is configured
    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let snapshot = StoreSnapshot {
            collection: self.collection.clone(),
            expenses: self.expenses.clone(),
        };
        save_snapshot(&snapshot, path).map_err(|e| {
            warn!("Failed to save snapshot to {}: {}", path.display(), e);
            StoreError::Io(e)
        })
    }

    fn position(&self, id: &ExpenseId) -> Option<usize> {
        self.expenses.iter().position(|e| &e.id == id)
    }
}

/// In-process store that pushes change batches to its subscribers
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new(collection: impl Into<String>) -> Self {
        MemoryStore {
            inner: Arc::new(Mutex::new(Inner {
                collection: collection.into(),
                expenses: Vec::new(),
                subscribers: Vec::new(),
                snapshot_path: None,
            })),
        }
    }

    /// Opens a store persisted at `path`
    ///
    /// A missing file yields an empty store; every later write is saved back.
    pub fn open(collection: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let store = MemoryStore::new(collection);
        {
            let mut inner = store.lock();
            if path.exists() {
                let snapshot = load_snapshot(path)?;
                info!(
                    "Loaded {} expense(s) from {}",
                    snapshot.expenses.len(),
                    path.display()
                );
                inner.expenses = snapshot.expenses;
            }
            inner.snapshot_path = Some(path.to_path_buf());
        }
        Ok(store)
    }

    pub fn collection(&self) -> String {
        self.lock().collection.clone()
    }

    /// Number of records currently in the collection
    pub fn len(&self) -> usize {
        self.lock().expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of subscriptions still being fed
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a writer panicked mid-broadcast
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Each write is saved before it is broadcast. A failed save rolls the
    // change back and no batch is sent.
    fn insert(&self, expense: NewExpense) -> Result<ExpenseId, StoreError> {
        let mut inner = self.lock();
        let stored = StoredExpense {
            id: ExpenseId::generate(),
            name: expense.name,
            cost: expense.cost,
            created_at: Utc::now(),
        };
        let id = stored.id.clone();
        let change = Change::added(&stored.to_expense());
        inner.expenses.push(stored);
        if let Err(e) = inner.persist() {
            inner.expenses.pop();
            return Err(e);
        }
        info!("{}: added {} ({} = {})", inner.collection, id, change.data.name, change.data.cost);
        inner.broadcast(vec![change]);
        Ok(id)
    }

    fn replace(&self, id: &ExpenseId, expense: NewExpense) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let index = inner
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let stored = &mut inner.expenses[index];
        let previous = (
            std::mem::replace(&mut stored.name, expense.name),
            std::mem::replace(&mut stored.cost, expense.cost),
        );
        let change = Change::modified(&stored.to_expense());
        if let Err(e) = inner.persist() {
            let stored = &mut inner.expenses[index];
            (stored.name, stored.cost) = previous;
            return Err(e);
        }
        info!("{}: modified {}", inner.collection, id);
        inner.broadcast(vec![change]);
        Ok(())
    }

    fn remove(&self, id: &ExpenseId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let index = inner
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let stored = inner.expenses.remove(index);
        if let Err(e) = inner.persist() {
            inner.expenses.insert(index, stored);
            return Err(e);
        }
        info!("{}: removed {}", inner.collection, id);
        inner.broadcast(vec![Change::removed(&stored.to_expense())]);
        Ok(())
    }
}

impl ExpenseStore for MemoryStore {
    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let initial: ChangeBatch = inner
            .expenses
            .iter()
            .map(|e| Change::added(&e.to_expense()))
            .collect();
        // The receiver is alive, so the initial send cannot fail
        if tx.send(initial).is_ok() {
            inner.subscribers.push(tx);
        }
        Subscription::new(rx)
    }

    fn create(
        &self,
        expense: NewExpense,
    ) -> impl Future<Output = Result<ExpenseId, StoreError>> + Send {
        async move { self.insert(expense) }
    }

    fn update(
        &self,
        id: &ExpenseId,
        expense: NewExpense,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move { self.replace(id, expense) }
    }

    fn delete(&self, id: &ExpenseId) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move { self.remove(id) }
    }
}
