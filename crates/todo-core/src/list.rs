//! List synchronizer
//!
//! `TodoList` owns the authoritative items fetched from the remote API, the
//! view list derived from them, and the load state.
//!
//! ## Mutations
//!
//! Every successful mutation (create, update, delete) is followed by a full
//! refetch, so the server's list always wins. Effects that need no server
//! answer are applied first: a delete drops the id from the persisted order
//! and from the view before the request is sent. Those local effects are not
//! rolled back when the request fails; the error is returned to the caller.
//!
//! ## Usage
//!
//! ```ignore
//! let mut list = TodoList::open_with_config(&config)?;
//! list.refresh().await?;
//!
//! list.create(NewTodo::new(config.user_id, "buy milk")).await?;
//! list.reorder(0, Some(2))?;
//! ```

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, HttpTodoApi, TodoApi};
use crate::config::Config;
use crate::draft::Draft;
use crate::models::{sort_newest_first, NewTodo, Todo};
use crate::order::{OrderError, OrderReconciler};
use crate::storage::{FileSlotStore, SlotStore};

/// Load state of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    /// A fetch is in flight (or none has completed yet)
    Loading,
    /// The last fetch succeeded
    Ready,
    /// The last fetch failed with this message
    Error(String),
}

/// Kind of remote mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// Errors surfaced by `TodoList` operations
#[derive(Error, Debug)]
pub enum ListError {
    #[error("Failed to load todos: {0}")]
    Fetch(#[source] ApiError),

    #[error("Failed to {kind} todo: {source}")]
    Mutation {
        kind: MutationKind,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("No todo with id {0} in the current list")]
    NotFound(i64),

    #[error("The list has not loaded, refresh and try again")]
    NotReady,
}

impl ListError {
    /// What the user can do about a local storage failure, if anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ListError::Order(e) => e.recovery_suggestion(),
            _ => None,
        }
    }
}

/// Result type for list operations
pub type ListResult<T> = Result<T, ListError>;

/// Remote todo list with a locally persisted display order
pub struct TodoList<A, S> {
    api: A,
    reconciler: OrderReconciler<S>,
    user_id: i64,
    view: Vec<Todo>,
    state: ListState,
}

impl TodoList<HttpTodoApi, FileSlotStore> {
    /// Build the HTTP-backed list described by `config`
    ///
    /// The display order is stored under `config.order_key` in
    /// `config.data_dir`. Nothing is fetched until `refresh` is called.
    pub fn open_with_config(config: &Config) -> anyhow::Result<Self> {
        let api = HttpTodoApi::from_config(config)?;
        let store = FileSlotStore::new(&config.data_dir);
        Ok(Self::new(
            api,
            OrderReconciler::new(store, &config.order_key),
            config.user_id,
        ))
    }
}

impl<A: TodoApi, S: SlotStore> TodoList<A, S> {
    /// Create a list in the `Loading` state with an empty view
    pub fn new(api: A, reconciler: OrderReconciler<S>, user_id: i64) -> Self {
        Self {
            api,
            reconciler,
            user_id,
            view: Vec::new(),
            state: ListState::Loading,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn reconciler(&self) -> &OrderReconciler<S> {
        &self.reconciler
    }

    /// Owner id attached to items created from drafts
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ListState::Ready
    }

    /// Items in display order
    pub fn view(&self) -> &[Todo] {
        &self.view
    }

    /// Index of an item in the view
    pub fn position(&self, id: i64) -> Option<usize> {
        self.view.iter().position(|t| t.id == id)
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.view.iter().find(|t| t.id == id)
    }

    /// Fetch every item, newest (highest id) first
    pub async fn fetch_all(&self) -> Result<Vec<Todo>, ApiError> {
        let mut todos = self.api.fetch_all().await?;
        sort_newest_first(&mut todos);
        Ok(todos)
    }

    /// Refetch and reconcile the view
    ///
    /// On failure the state becomes `Error` carrying the message and the
    /// previous view is left in place.
    pub async fn refresh(&mut self) -> ListResult<()> {
        self.state = ListState::Loading;

        let items = match self.fetch_all().await {
            Ok(items) => items,
            Err(e) => {
                warn!("Fetching todos failed: {}", e);
                self.state = ListState::Error(e.to_string());
                return Err(ListError::Fetch(e));
            }
        };

        match self.reconciler.reconcile(items) {
            Ok(view) => {
                debug!("Loaded {} todo(s)", view.len());
                self.view = view;
                self.state = ListState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("Reconciling display order failed: {}", e);
                self.state = ListState::Error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Create an item, then refetch
    pub async fn create(&mut self, todo: NewTodo) -> ListResult<Todo> {
        let created = self
            .api
            .create(&todo)
            .await
            .map_err(|source| ListError::Mutation {
                kind: MutationKind::Create,
                source,
            })?;

        self.refetch_after(MutationKind::Create).await;
        Ok(created)
    }

    /// Submit a draft as a new item owned by this list's user
    ///
    /// The draft is cleared before the request is sent.
    pub async fn submit(&mut self, draft: &mut Draft) -> ListResult<Todo> {
        let todo = draft.submit(self.user_id);
        self.create(todo).await
    }

    /// Replace an item, then refetch
    pub async fn update(&mut self, todo: Todo) -> ListResult<Todo> {
        let updated = self
            .api
            .update(&todo)
            .await
            .map_err(|source| ListError::Mutation {
                kind: MutationKind::Update,
                source,
            })?;

        self.refetch_after(MutationKind::Update).await;
        Ok(updated)
    }

    /// Flip `completed` on an item in the view
    pub async fn toggle(&mut self, id: i64) -> ListResult<Todo> {
        self.ensure_ready()?;
        let todo = self.get(id).ok_or(ListError::NotFound(id))?.toggled();
        self.update(todo).await
    }

    /// Delete an item
    ///
    /// The id leaves the persisted order and the view immediately; the
    /// remote delete and refetch follow. Only a loaded list can be changed
    /// this way.
    pub async fn delete(&mut self, id: i64) -> ListResult<()> {
        self.ensure_ready()?;
        self.reconciler.forget(id)?;
        self.view.retain(|t| t.id != id);

        self.api
            .delete(id)
            .await
            .map_err(|source| ListError::Mutation {
                kind: MutationKind::Delete,
                source,
            })?;

        self.refetch_after(MutationKind::Delete).await;
        Ok(())
    }

    /// Move the item at `from` to `to` in the view and persist the order
    ///
    /// `to` is `None` when the item was dropped outside the list, which is
    /// a no-op. Returns whether the view changed. The remote API is not
    /// involved.
    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> ListResult<bool> {
        self.ensure_ready()?;

        let Some(to) = to else {
            return Ok(false);
        };

        self.reconciler.reorder(&mut self.view, from, to)?;
        Ok(from != to)
    }

    fn ensure_ready(&self) -> ListResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ListError::NotReady)
        }
    }

    async fn refetch_after(&mut self, kind: MutationKind) {
        // Failures land in `state`; the mutation itself already succeeded
        if let Err(e) = self.refresh().await {
            debug!("Refetch after {} failed: {}", kind, e);
        }
    }
}
