//! HTTP transport abstraction
//!
//! The hypermedia client never talks to the network directly. It hands an
//! [`HttpRequest`] to an injected [`HttpTransport`] and gets back the parsed
//! JSON body, or nothing for empty responses.

pub mod mock;
#[cfg(feature = "reqwest-transport")]
pub mod reqwest;

pub use mock::{MockResponse, MockTransport, RecordedRequest};
#[cfg(feature = "reqwest-transport")]
pub use self::reqwest::ReqwestTransport;

use crate::core::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP verbs used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Method for a declared action, case-insensitive
    ///
    /// Returns `None` for GET and for any verb the client does not dispatch.
    pub fn for_action(declared: &str) -> Option<Self> {
        match declared.to_ascii_uppercase().as_str() {
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request handed to the transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,

    /// Absolute URL, query string included
    pub url: String,

    pub headers: Vec<(String, String)>,

    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Value of a header, case-insensitive on the name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes HTTP requests on behalf of the client
///
/// Implementations must return `Ok(None)` for successful responses without
/// a body (204, or an empty DELETE response) and a [`TransportError`]
/// carrying the status for non-2xx responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<Option<Value>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_for_action() {
        assert_eq!(Method::for_action("post"), Some(Method::Post));
        assert_eq!(Method::for_action("Put"), Some(Method::Put));
        assert_eq!(Method::for_action("DELETE"), Some(Method::Delete));
        assert_eq!(Method::for_action("GET"), None);
        assert_eq!(Method::for_action("PATCH"), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest::new(Method::Get, "http://api")
            .header("Accept", "application/prs.hal-forms+json");
        assert_eq!(
            request.header_value("accept"),
            Some("application/prs.hal-forms+json")
        );
        assert_eq!(request.header_value("content-type"), None);
    }
}
