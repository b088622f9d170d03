//! Data models for todo
//!
//! Defines the wire shapes exchanged with the remote list API: `Todo` for
//! items the server has assigned an id to, and `NewTodo` for create requests.

use serde::{Deserialize, Serialize};

/// Owner id used when the configuration does not provide one
pub const DEFAULT_USER_ID: i64 = 1;

/// A todo item as returned by the remote API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    /// Unique identifier, assigned by the remote API
    pub id: i64,
    /// Owner of the item
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Display text
    pub title: String,
    /// Whether the item is done
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Copy of this item with `completed` flipped
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// A todo item that has not been created yet (no id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTodo {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

impl NewTodo {
    /// Create an open item for the given owner
    pub fn new(user_id: i64, title: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            completed: false,
        }
    }

    /// Attach a server-assigned id
    pub fn with_id(self, id: i64) -> Todo {
        Todo {
            id,
            user_id: self.user_id,
            title: self.title,
            completed: self.completed,
        }
    }
}

/// Sort items by descending id (newest first)
///
/// This is the presentation order of a fresh fetch, before the locally
/// persisted order is applied.
pub fn sort_newest_first(todos: &mut [Todo]) {
    todos.sort_by(|a, b| b.id.cmp(&a.id));
}
