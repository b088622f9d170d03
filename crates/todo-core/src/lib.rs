//! todo core library
//!
//! This crate provides the core functionality for `todo`, a client for a
//! remote todo-list API that keeps the user's display order locally.
//!
//! # Architecture
//!
//! - **Remote API**: source of truth for items (identity, title, completed)
//! - **Slot store**: local key-value storage holding the display order
//! - **Order reconciler**: merges the persisted order into every fetched list
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut list = TodoList::open_with_config(&config)?;
//! list.refresh().await?;
//!
//! for todo in list.view() {
//!     println!("{} {}", todo.id, todo.title);
//! }
//! ```
//!
//! # Modules
//!
//! - `list`: List synchronizer (main entry point)
//! - `order`: Display order persistence and reconciliation
//! - `api`: Remote API seam and its HTTP / in-memory backends
//! - `storage`: Key-value slot stores
//! - `draft`: Editable title for new items
//! - `models`: Wire data structures
//! - `config`: Application configuration

pub mod api;
pub mod config;
pub mod draft;
pub mod list;
pub mod models;
pub mod order;
pub mod storage;

pub use api::{ApiError, HttpTodoApi, MemoryTodoApi, TodoApi};
pub use config::Config;
pub use draft::Draft;
pub use list::{ListError, ListState, MutationKind, TodoList};
pub use models::{NewTodo, Todo};
pub use order::{OrderError, OrderReconciler, PersistedOrder};
pub use storage::{FileSlotStore, MemorySlotStore, SlotStore, StorageError};
