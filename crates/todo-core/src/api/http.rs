//! REST backend for the todo API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ApiError, ApiResult, TodoApi};
use crate::config::Config;
use crate::models::{NewTodo, Todo};

/// Longest error body kept in `ApiError::Status`
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for a json-server style `/todos` resource
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("todo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(&config.api_url, config.timeout())
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }

    /// Send a request and return the body of a successful response
    async fn send(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> ApiResult<String> {
        debug!("{} {}", method, url);

        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            warn!("{} {} returned {}", method, url, status);
            return Err(ApiError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn fetch_all(&self) -> ApiResult<Vec<Todo>> {
        let url = self.collection_url();
        let body = self.send("GET", &url, self.client.get(&url)).await?;
        decode(&url, &body)
    }

    async fn create(&self, todo: &NewTodo) -> ApiResult<Todo> {
        let url = self.collection_url();
        let body = self
            .send("POST", &url, self.client.post(&url).json(todo))
            .await?;
        decode(&url, &body)
    }

    async fn update(&self, todo: &Todo) -> ApiResult<Todo> {
        let url = self.item_url(todo.id);
        let body = self
            .send("PATCH", &url, self.client.patch(&url).json(todo))
            .await?;
        decode(&url, &body)
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        let url = self.item_url(id);
        self.send("DELETE", &url, self.client.delete(&url)).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serve one canned response per connection, returning the raw requests
    async fn serve(
        responses: Vec<(&'static str, &'static str)>,
    ) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut stream).await);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            requests
        });

        (format!("http://{}", addr), handle)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = find(&buf, b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while buf.len() < end + 4 + length {
                    let n = stream.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                break;
            }
        }

        String::from_utf8_lossy(&buf).to_string()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn api(base: &str) -> HttpTodoApi {
        HttpTodoApi::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_urls() {
        assert!(matches!(
            HttpTodoApi::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpTodoApi::new("ftp://example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let api = api("http://localhost:3500/");
        assert_eq!(api.base_url(), "http://localhost:3500");
        assert_eq!(api.collection_url(), "http://localhost:3500/todos");
        assert_eq!(api.item_url(12), "http://localhost:3500/todos/12");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.len(), MAX_ERROR_BODY + 3);
    }

    #[tokio::test]
    async fn test_fetch_all() {
        let (base, server) = serve(vec![(
            "200 OK",
            r#"[{"userId":1,"id":1,"title":"a","completed":false},{"userId":1,"id":2,"title":"b","completed":true}]"#,
        )])
        .await;

        let todos = api(&base).fetch_all().await.unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[1].id, 2);
        assert!(todos[1].completed);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /todos HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_create_posts_json() {
        let (base, server) = serve(vec![(
            "201 Created",
            r#"{"userId":1,"id":201,"title":"","completed":false}"#,
        )])
        .await;

        let created = api(&base).create(&NewTodo::new(1, "")).await.unwrap();
        assert_eq!(created.id, 201);
        assert_eq!(created.title, "");

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /todos HTTP/1.1"));
        assert!(requests[0].ends_with(r#"{"userId":1,"title":"","completed":false}"#));
    }

    #[tokio::test]
    async fn test_update_patches_item() {
        let (base, server) = serve(vec![(
            "200 OK",
            r#"{"userId":1,"id":5,"title":"t","completed":true}"#,
        )])
        .await;

        let todo = NewTodo::new(1, "t").with_id(5).toggled();
        let updated = api(&base).update(&todo).await.unwrap();
        assert!(updated.completed);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("PATCH /todos/5 HTTP/1.1"));
        assert!(requests[0].contains(r#""completed":true"#));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let (base, server) = serve(vec![("200 OK", "")]).await;

        api(&base).delete(9).await.unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("DELETE /todos/9 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (base, server) = serve(vec![("404 Not Found", "{}")]).await;

        let err = api(&base).delete(404).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("DELETE"));
        assert!(err.to_string().contains("404"));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_decode_error() {
        let (base, server) = serve(vec![("200 OK", "<html>oops</html>")]).await;

        let err = api(&base).fetch_all().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = api(&format!("http://{}", addr))
            .fetch_all()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert!(err.status().is_none());
    }
}
