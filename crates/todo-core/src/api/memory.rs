//! In-process backend for the todo API
//!
//! Behaves like a json-server `/todos` resource held in memory. Every call is
//! recorded so callers can assert on what was sent, and failures can be
//! switched on to exercise error paths.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{ApiError, ApiResult, TodoApi};
use crate::models::{NewTodo, Todo};

/// A call made against `MemoryTodoApi`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    FetchAll,
    Create(NewTodo),
    Update(Todo),
    Delete(i64),
}

#[derive(Debug, Default)]
struct MemoryState {
    todos: Vec<Todo>,
    next_id: i64,
    calls: Vec<ApiCall>,
    failing: Option<u16>,
}

/// In-memory todo list implementing `TodoApi`
#[derive(Debug, Default)]
pub struct MemoryTodoApi {
    state: Mutex<MemoryState>,
}

impl MemoryTodoApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given items; new ids continue after the largest one
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(MemoryState {
                todos,
                next_id,
                ..MemoryState::default()
            }),
        }
    }

    /// Current items in server order
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    /// Every call received so far, oldest first
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Make every following call fail with the given HTTP status
    pub fn fail_with(&self, status: u16) {
        self.lock().failing = Some(status);
    }

    /// Stop failing calls
    pub fn recover(&self) {
        self.lock().failing = None;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a call and return the configured failure, if any
    fn record(&self, call: ApiCall, method: &'static str, path: String) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failing {
            Some(status) => Err(ApiError::Status {
                method,
                url: path,
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TodoApi for MemoryTodoApi {
    async fn fetch_all(&self) -> ApiResult<Vec<Todo>> {
        self.record(ApiCall::FetchAll, "GET", "/todos".to_string())?;
        Ok(self.todos())
    }

    async fn create(&self, todo: &NewTodo) -> ApiResult<Todo> {
        self.record(ApiCall::Create(todo.clone()), "POST", "/todos".to_string())?;

        let mut state = self.lock();
        if state.next_id == 0 {
            state.next_id = 1;
        }
        let created = todo.clone().with_id(state.next_id);
        state.next_id += 1;
        state.todos.push(created.clone());
        Ok(created)
    }

    async fn update(&self, todo: &Todo) -> ApiResult<Todo> {
        let path = format!("/todos/{}", todo.id);
        self.record(ApiCall::Update(todo.clone()), "PATCH", path.clone())?;

        let mut state = self.lock();
        match state.todos.iter_mut().find(|t| t.id == todo.id) {
            Some(existing) => {
                *existing = todo.clone();
                Ok(todo.clone())
            }
            None => Err(ApiError::Status {
                method: "PATCH",
                url: path,
                status: 404,
                body: String::new(),
            }),
        }
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        let path = format!("/todos/{}", id);
        self.record(ApiCall::Delete(id), "DELETE", path.clone())?;

        let mut state = self.lock();
        let before = state.todos.len();
        state.todos.retain(|t| t.id != id);
        if state.todos.len() == before {
            return Err(ApiError::Status {
                method: "DELETE",
                url: path,
                status: 404,
                body: String::new(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let api = MemoryTodoApi::with_todos(vec![NewTodo::new(1, "a").with_id(10)]);

        let first = api.create(&NewTodo::new(1, "b")).await.unwrap();
        let second = api.create(&NewTodo::new(1, "c")).await.unwrap();
        assert_eq!(first.id, 11);
        assert_eq!(second.id, 12);
        assert_eq!(api.todos().len(), 3);

        let empty = MemoryTodoApi::new();
        assert_eq!(empty.create(&NewTodo::new(1, "x")).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let api = MemoryTodoApi::with_todos(vec![NewTodo::new(1, "a").with_id(1)]);

        let toggled = api.todos()[0].toggled();
        api.update(&toggled).await.unwrap();
        assert!(api.todos()[0].completed);

        api.delete(1).await.unwrap();
        assert!(api.todos().is_empty());
        assert!(api.delete(1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failures_are_recorded() {
        let api = MemoryTodoApi::new();
        api.fail_with(500);

        let err = api.fetch_all().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(api.calls(), vec![ApiCall::FetchAll]);

        api.recover();
        assert!(api.fetch_all().await.unwrap().is_empty());
    }
}
