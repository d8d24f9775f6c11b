//! `reqwest`-backed transport

use super::{HttpRequest, HttpTransport, Method};
use crate::core::error::{ApiProblem, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP transport over a shared [`reqwest::Client`]
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a 30s request timeout
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client (auth headers, proxies...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn handle_response(
        method: Method,
        url: &str,
        response: reqwest::Response,
    ) -> Result<Option<Value>, TransportError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::new(method, url, e.to_string()).with_status(status.as_u16()))?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(None);
            }
            return serde_json::from_str(&text).map(Some).map_err(|e| {
                TransportError::new(method, url, format!("invalid JSON body: {}", e))
                    .with_status(status.as_u16())
            });
        }

        let mut err = TransportError::new(
            method,
            url,
            status.canonical_reason().unwrap_or("request failed"),
        )
        .with_status(status.as_u16());

        if let Ok(problem) = serde_json::from_str::<ApiProblem>(&text) {
            err = err.with_problem(problem);
        } else if !text.is_empty() {
            err.message = text;
        }
        Err(err)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<Option<Value>, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(method, &url, e.to_string()))?;

        Self::handle_response(method, &url, response).await
    }
}
