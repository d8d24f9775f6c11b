//! Typed error handling for the hypermedia client
//!
//! Every fallible operation of the crate returns [`HalError`]. Callers can
//! match on the category instead of dealing with opaque errors.
//!
//! # Error Categories
//!
//! - [`ProtocolError`]: a relation or action is absent from a resource's
//!   hypermedia controls. Raised client-side, before any network call.
//! - [`TransportError`]: the underlying HTTP exchange failed. Passed through
//!   unchanged, including the server's problem document when there is one.
//! - [`StoreError`]: a store was used before its snapshot was loaded.
//! - [`SagaError`]: a composite write failed after the aggregate root was
//!   created or updated (see [`crate::saga`]).
//!
//! # Example
//!
//! ```rust,ignore
//! match client.invoke(&team, "deleteTeam", None).await {
//!     Ok(_) => {}
//!     Err(HalError::Protocol(ProtocolError::MissingAction { action, .. })) => {
//!         println!("{} is not offered for this team", action);
//!     }
//!     Err(HalError::Transport(e)) if e.status == Some(409) => {
//!         println!("conflict: {}", e.message_for_field(None));
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use crate::saga::SagaError;
use crate::transport::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result alias used throughout the crate
pub type Result<T, E = HalError> = std::result::Result<T, E>;

/// The main error type of the crate
///
/// The enum is `Clone` because the root resource cell latches its terminal
/// error and replays it to every late subscriber.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HalError {
    /// A hypermedia control is missing
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The HTTP exchange failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body did not match the expected payload shape
    #[error("Failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    /// Invalid configuration value (base URL, link href...)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Store misuse
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A composite write failed after its aggregate root was written
    #[error(transparent)]
    AggregateOrphan(Box<SagaError>),
}

impl HalError {
    /// Build a decode error from a serde failure
    pub fn decode(context: impl Into<String>, err: impl fmt::Display) -> Self {
        HalError::Decode {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HalError::Protocol(e) => e.error_code(),
            HalError::Transport(_) => "TRANSPORT_ERROR",
            HalError::Decode { .. } => "DECODE_ERROR",
            HalError::Config(_) => "CONFIG_ERROR",
            HalError::Store(e) => e.error_code(),
            HalError::AggregateOrphan(_) => "AGGREGATE_ORPHAN",
        }
    }

    /// The transport failure behind this error, if any
    ///
    /// Looks through composite failures so callers see the original cause.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            HalError::Transport(e) => Some(e),
            HalError::AggregateOrphan(saga) => saga.cause().transport(),
            _ => None,
        }
    }

    /// Whether the error was raised before any request left the client
    pub fn is_protocol(&self) -> bool {
        matches!(self, HalError::Protocol(_))
    }
}

impl From<SagaError> for HalError {
    fn from(err: SagaError) -> Self {
        HalError::AggregateOrphan(Box::new(err))
    }
}

// =============================================================================
// Protocol Errors
// =============================================================================

/// A requested hypermedia control is absent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The relation is not present in `_links`
    #[error("Relation '{rel}' is not defined in the links of resource '{href}'")]
    MissingRelation { rel: String, href: String },

    /// The action is not present in `_templates`
    #[error("Action '{action}' is not defined in the templates of resource '{href}'")]
    MissingAction { action: String, href: String },

    /// The relation is not present in `_embedded`
    #[error("Embedded relation '{rel}' is not present in resource '{href}'")]
    MissingEmbedded { rel: String, href: String },

    /// A links map without a `self` entry
    #[error("Links map has no single 'self' link")]
    MissingSelfLink,

    /// A template declares a method this client never dispatches
    #[error("Action '{action}' declares method '{method}' which cannot be dispatched")]
    UnsupportedMethod { action: String, method: String },

    /// A single link was required but the relation holds an array
    #[error("Relation '{rel}' holds {count} links where a single link was expected")]
    UnexpectedLinkArray { rel: String, count: usize },
}

impl ProtocolError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ProtocolError::MissingRelation { .. } => "MISSING_RELATION",
            ProtocolError::MissingAction { .. } => "MISSING_ACTION",
            ProtocolError::MissingEmbedded { .. } => "MISSING_EMBEDDED",
            ProtocolError::MissingSelfLink => "MISSING_SELF_LINK",
            ProtocolError::UnsupportedMethod { .. } => "UNSUPPORTED_METHOD",
            ProtocolError::UnexpectedLinkArray { .. } => "UNEXPECTED_LINK_ARRAY",
        }
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// A failed HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    /// Verb of the failed request
    pub method: Method,

    /// Target URL of the failed request
    pub url: String,

    /// HTTP status, absent for connection-level failures
    pub status: Option<u16>,

    /// Human-readable description
    pub message: String,

    /// Problem document returned by the server, when it sent one
    pub problem: Option<ApiProblem>,
}

impl TransportError {
    /// Create a transport error without status (connection failure, timeout...)
    pub fn new(method: Method, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            status: None,
            message: message.into(),
            problem: None,
        }
    }

    /// Attach the HTTP status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the parsed problem document
    pub fn with_problem(mut self, problem: ApiProblem) -> Self {
        self.problem = Some(problem);
        self
    }

    /// True for 5xx responses
    pub fn is_server_error(&self) -> bool {
        matches!(self.status, Some(s) if s >= 500)
    }

    /// Message to show for a form field
    ///
    /// Falls back to the generic message when there is no problem document
    /// or no detail entry for the field.
    pub fn message_for_field(&self, field: Option<&str>) -> String {
        match &self.problem {
            Some(problem) => problem.message_for_field(field),
            None => ApiProblem::GENERIC_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "{} {} failed with status {}: {}",
                self.method, self.url, status, self.message
            ),
            None => write!(f, "{} {} failed: {}", self.method, self.url, self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// RFC 7807 problem document sent by the API on failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiProblem {
    /// URI identifying the problem type
    #[serde(rename = "type", default)]
    pub problem_type: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub status: Option<u16>,

    /// Free text, by convention `"fieldA: message, fieldB: message"`
    #[serde(default)]
    pub detail: Option<String>,

    #[serde(default)]
    pub instance: Option<String>,
}

/// One `field: message` entry of a problem detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl ApiProblem {
    /// Message used when nothing more specific is known
    pub const GENERIC_MESSAGE: &'static str = "An error occurred.";

    /// Split `detail` into per-field messages
    ///
    /// Entries are separated by `,` and split on their first `:`; entries
    /// missing either side are dropped.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let Some(detail) = self.detail.as_deref() else {
            return Vec::new();
        };

        detail
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| {
                let (field, message) = part.split_once(':')?;
                let (field, message) = (field.trim(), message.trim());
                (!field.is_empty() && !message.is_empty()).then(|| FieldError {
                    field: field.to_string(),
                    message: message.to_string(),
                })
            })
            .collect()
    }

    /// Message for `field`, or the generic message
    pub fn message_for_field(&self, field: Option<&str>) -> String {
        let Some(field) = field else {
            return Self::GENERIC_MESSAGE.to_string();
        };

        self.field_errors()
            .into_iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
            .unwrap_or_else(|| Self::GENERIC_MESSAGE.to_string())
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by the resource stores
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A mutation needs the collection snapshot but nothing was loaded yet
    #[error("Store '{store}' has no loaded snapshot")]
    NotLoaded { store: String },

    /// A detail store has no URI selected
    #[error("Store '{store}' has no resource selected")]
    NoSelection { store: String },
}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotLoaded { .. } => "STORE_NOT_LOADED",
            StoreError::NoSelection { .. } => "STORE_NO_SELECTION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(detail: &str) -> ApiProblem {
        ApiProblem {
            detail: Some(detail.to_string()),
            status: Some(400),
            ..Default::default()
        }
    }

    #[test]
    fn test_field_errors_split_on_first_colon() {
        let p = problem("name: must not be blank, email: bad format: expected a@b");
        let errors = p.field_errors();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "must not be blank");
        assert_eq!(errors[1].message, "bad format: expected a@b");
    }

    #[test]
    fn test_field_errors_drop_incomplete_entries() {
        let p = problem("orphan, : no field, phone:   ,  ");
        assert!(p.field_errors().is_empty());
    }

    #[test]
    fn test_message_for_field_falls_back_to_generic() {
        let p = problem("name: required");
        assert_eq!(p.message_for_field(Some("name")), "required");
        assert_eq!(p.message_for_field(Some("phone")), ApiProblem::GENERIC_MESSAGE);
        assert_eq!(p.message_for_field(None), ApiProblem::GENERIC_MESSAGE);
    }

    #[test]
    fn test_problem_deserializes_type_field() {
        let p: ApiProblem = serde_json::from_value(serde_json::json!({
            "type": "about:blank",
            "title": "Bad Request",
            "status": 400,
            "detail": "teamNumber: must be positive",
            "instance": "/api/teams"
        }))
        .unwrap();

        assert_eq!(p.problem_type.as_deref(), Some("about:blank"));
        assert_eq!(p.message_for_field(Some("teamNumber")), "must be positive");
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::new(Method::Get, "http://api/teams", "boom").with_status(500);
        assert_eq!(
            err.to_string(),
            "GET http://api/teams failed with status 500: boom"
        );
        assert!(err.is_server_error());

        let err = TransportError::new(Method::Post, "http://api/teams", "refused");
        assert_eq!(err.to_string(), "POST http://api/teams failed: refused");
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_error_codes() {
        let err: HalError = ProtocolError::MissingAction {
            action: "deleteTeam".to_string(),
            href: "http://api/teams/1".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "MISSING_ACTION");
        assert!(err.is_protocol());

        let err: HalError = StoreError::NotLoaded {
            store: "teams".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "STORE_NOT_LOADED");
        assert!(!err.is_protocol());
    }
}
