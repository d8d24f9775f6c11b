//! In-memory transport for tests and offline development
//!
//! Responses are registered per `(method, url)`. Every executed request is
//! recorded so tests can assert how many calls reached the "network".

use super::{HttpRequest, HttpTransport, Method};
use crate::core::error::{ApiProblem, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// A request seen by [`MockTransport`]
pub type RecordedRequest = HttpRequest;

/// Canned response of a mock route
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with a JSON body
    Json(Value),

    /// 2xx without body
    Empty,

    /// Non-2xx status with an optional problem body
    Status(u16, Option<Value>),

    /// Connection-level failure, no status
    Unreachable(String),

    /// Wait before answering
    Delayed(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn delayed(self, delay: Duration) -> Self {
        MockResponse::Delayed(delay, Box::new(self))
    }
}

/// Recording in-memory transport
///
/// A route registered with several responses answers them in order and
/// keeps repeating the last one. Unknown routes answer 404. A URL with a
/// query string falls back to the route registered without it.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<RwLock<HashMap<(Method, String), VecDeque<MockResponse>>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create an empty mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a route
    pub fn on(&self, method: Method, url: impl Into<String>, response: MockResponse) -> &Self {
        let mut routes = self.routes.write().unwrap_or_else(|e| e.into_inner());
        routes
            .entry((method, url.into()))
            .or_default()
            .push_back(response);
        self
    }

    /// Answer GET `url` with `body`
    pub fn on_get(&self, url: impl Into<String>, body: Value) -> &Self {
        self.on(Method::Get, url, MockResponse::Json(body))
    }

    /// Drop every response registered for a route
    pub fn clear_route(&self, method: Method, url: &str) {
        let mut routes = self.routes.write().unwrap_or_else(|e| e.into_inner());
        routes.remove(&(method, url.to_string()));
    }

    /// All requests executed so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests executed with `method` on exactly `url`
    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    /// Number of requests executed with `method`
    pub fn count_method(&self, method: Method) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }

    pub fn clear_requests(&self) {
        self.requests
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn next_response(&self, method: Method, url: &str) -> Result<Option<MockResponse>, TransportError> {
        let mut routes = self
            .routes
            .write()
            .map_err(|e| TransportError::new(method, url, format!("Failed to acquire route lock: {}", e)))?;

        let without_query = url.split_once('?').map(|(base, _)| base.to_string());
        let key = match (routes.contains_key(&(method, url.to_string())), without_query) {
            (true, _) => (method, url.to_string()),
            (false, Some(base)) => (method, base),
            (false, None) => return Ok(None),
        };

        Ok(routes.get_mut(&key).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        }))
    }
}

fn respond(
    request: &HttpRequest,
    response: MockResponse,
) -> futures::future::BoxFuture<'_, Result<Option<Value>, TransportError>> {
    Box::pin(async move {
        match response {
            MockResponse::Json(body) => Ok(Some(body)),
            MockResponse::Empty => Ok(None),
            MockResponse::Status(status, body) => {
                let mut err = TransportError::new(request.method, &request.url, "mock error response")
                    .with_status(status);
                if let Some(problem) = body.and_then(|b| serde_json::from_value::<ApiProblem>(b).ok()) {
                    if let Some(title) = &problem.title {
                        err.message = title.clone();
                    }
                    err = err.with_problem(problem);
                }
                Err(err)
            }
            MockResponse::Unreachable(message) => {
                Err(TransportError::new(request.method, &request.url, message))
            }
            MockResponse::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                respond(request, *inner).await
            }
        }
    })
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<Option<Value>, TransportError> {
        {
            let mut requests = self.requests.write().map_err(|e| {
                TransportError::new(request.method, &request.url, format!("Failed to acquire request lock: {}", e))
            })?;
            requests.push(request.clone());
        }

        match self.next_response(request.method, &request.url)? {
            Some(response) => respond(&request, response).await,
            None => Err(TransportError::new(request.method, &request.url, "no mock route").with_status(404)),
        }
    }
}
