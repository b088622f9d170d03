//! Display order reconciliation
//!
//! The remote API knows nothing about display order. The user's order lives
//! in one local slot as a JSON array of item ids, and is merged with every
//! freshly fetched list:
//!
//! ```text
//! persisted: [3, 1, 7]        fetched: [9, 7, 3, 1]
//! new items: [9]              projection: [3, 1, 7]
//! view:      [9, 3, 1, 7]
//! ```
//!
//! Items the persisted order has never seen go first, in the order they were
//! received. Persisted ids with no matching item are skipped; they stay in
//! the slot until the item is deleted through this client or the user
//! reorders the list (which rewrites the slot from the current view).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::Todo;
use crate::storage::{SlotStore, StorageError};

/// Errors from reading, writing or applying the display order
#[derive(Error, Debug)]
pub enum OrderError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to encode display order: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Position {index} is out of range for a list of {len} item(s)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl OrderError {
    /// Recovery hint for storage failures
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            OrderError::Storage(e) => e.recovery_suggestion(),
            _ => None,
        }
    }
}

/// User-defined sequence of item ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedOrder(Vec<i64>);

impl PersistedOrder {
    pub fn new(ids: Vec<i64>) -> Self {
        Self(ids)
    }

    /// Order matching a list of items as given
    pub fn from_todos(todos: &[Todo]) -> Self {
        Self(todos.iter().map(|t| t.id).collect())
    }

    /// Parse the slot representation (a JSON array of integers)
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Slot representation
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    /// Remove every occurrence of `id`, returning whether anything changed
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.0.len();
        self.0.retain(|&x| x != id);
        self.0.len() != before
    }
}

/// Merge a persisted order with the current items
///
/// Items missing from `order` come first (in received order), followed by
/// the items `order` names, in persisted order. Ids in `order` without a
/// matching item are dropped, and each item appears at most once.
pub fn reconcile(order: &PersistedOrder, items: Vec<Todo>) -> Vec<Todo> {
    let known: HashSet<i64> = order.ids().iter().copied().collect();

    let mut view = Vec::with_capacity(items.len());
    let mut ordered: HashMap<i64, Todo> = HashMap::new();

    for item in items {
        if known.contains(&item.id) {
            ordered.insert(item.id, item);
        } else {
            view.push(item);
        }
    }

    view.extend(order.ids().iter().filter_map(|id| ordered.remove(id)));
    view
}

/// Move the element at `from` so it ends up at index `to`
pub fn move_item<T>(list: &mut Vec<T>, from: usize, to: usize) -> Result<(), OrderError> {
    let len = list.len();
    for index in [from, to] {
        if index >= len {
            return Err(OrderError::IndexOutOfRange { index, len });
        }
    }

    let item = list.remove(from);
    list.insert(to, item);
    Ok(())
}

/// Keeps the persisted display order in step with the fetched list
#[derive(Debug)]
pub struct OrderReconciler<S> {
    store: S,
    key: String,
}

impl<S: SlotStore> OrderReconciler<S> {
    /// Create a reconciler persisting under `key` in `store`
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the persisted order
    ///
    /// Returns `None` if nothing was persisted yet. Slot content that is not
    /// a JSON array of integers is logged and treated as absent.
    pub fn load(&self) -> Result<Option<PersistedOrder>, OrderError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };

        match PersistedOrder::parse(&raw) {
            Ok(order) => Ok(Some(order)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable display order in slot '{}': {}",
                    self.key, e
                );
                Ok(None)
            }
        }
    }

    /// Persist an order, replacing the previous one
    pub fn save(&self, order: &PersistedOrder) -> Result<(), OrderError> {
        let raw = order.to_json()?;
        self.store.set(&self.key, &raw)?;
        debug!("Persisted display order of {} id(s)", order.len());
        Ok(())
    }

    /// Build the view list for freshly fetched items
    ///
    /// With no usable persisted order, the order is initialised to the
    /// fetched id sequence and the items are returned as received.
    pub fn reconcile(&self, items: Vec<Todo>) -> Result<Vec<Todo>, OrderError> {
        if items.is_empty() {
            return Ok(items);
        }

        match self.load()? {
            Some(order) if !order.is_empty() => Ok(reconcile(&order, items)),
            _ => {
                let order = PersistedOrder::from_todos(&items);
                self.save(&order)?;
                info!("Initialised display order with {} item(s)", order.len());
                Ok(items)
            }
        }
    }

    /// Move a view entry from `from` to `to` and persist the new order
    ///
    /// `view` is only replaced once the new order has been written.
    pub fn reorder(&self, view: &mut Vec<Todo>, from: usize, to: usize) -> Result<(), OrderError> {
        let mut next = view.clone();
        move_item(&mut next, from, to)?;
        self.save(&PersistedOrder::from_todos(&next))?;
        *view = next;
        Ok(())
    }

    /// Drop a deleted id from the persisted order
    ///
    /// Returns whether the persisted order changed.
    pub fn forget(&self, id: i64) -> Result<bool, OrderError> {
        let Some(mut order) = self.load()? else {
            return Ok(false);
        };

        if !order.remove(id) {
            return Ok(false);
        }

        self.save(&order)?;
        Ok(true)
    }

    /// Reset to an empty order; the next non-empty fetch re-initialises it
    pub fn clear(&self) -> Result<(), OrderError> {
        self.save(&PersistedOrder::default())
    }
}
