//! Remote todo API
//!
//! The remote list API owns item identity and content. This module defines
//! the `TodoApi` seam the list synchronizer talks to, plus two backends:
//!
//! - `HttpTodoApi`: REST client (`GET/POST /todos`, `PATCH/DELETE /todos/:id`)
//! - `MemoryTodoApi`: in-process list, used as a test double

mod http;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTodo, Todo};

pub use http::HttpTodoApi;
pub use memory::{ApiCall, MemoryTodoApi};

/// Errors returned by a `TodoApi` backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Base URL could not be used
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection, timeout or other transport failure
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the item addressed by the request does not exist remotely
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// CRUD operations against the remote todo list
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// Fetch every item, in whatever order the server returns them
    async fn fetch_all(&self) -> ApiResult<Vec<Todo>>;

    /// Create an item; the server assigns its id
    async fn create(&self, todo: &NewTodo) -> ApiResult<Todo>;

    /// Replace an item
    async fn update(&self, todo: &Todo) -> ApiResult<Todo>;

    /// Delete an item by id
    async fn delete(&self, id: i64) -> ApiResult<()>;
}
