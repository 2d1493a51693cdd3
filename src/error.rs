// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error types shared by the validator, the query normalizer, the indexer and
//! the HTTP backend.
//!
//! Every failure is surfaced to the caller. The only place where a failure is
//! reported as data instead of an error is a bulk write, whose per-item
//! failures come back inside [`crate::models::search::BulkOutcome`].

use thiserror::Error;

/// Boxed cause attached to connection and backend errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Reasons a candidate document is refused before it reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Every required field that is absent (or null), in schema order
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// The `date` field is present but is not a `YYYY-MM-DD` string
    #[error("invalid date format {0:?}, expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    /// The record is not a JSON object
    #[error("document must be a JSON object")]
    NotAnObject,

    /// The value could not be turned into a JSON record at all
    #[error("document cannot be serialized: {0}")]
    Unserializable(String),
}

/// Error payload returned by the search service for a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {reason}")]
pub struct ApiError {
    pub status: u16,
    /// The service's error type, e.g. `index_not_found_exception`
    pub error_type: Option<String>,
    pub reason: String,
}

impl ApiError {
    /// Build from a response status and its raw body.
    ///
    /// Understands the `{"error": {"type": .., "reason": ..}, "status": ..}`
    /// envelope and falls back to the raw body text otherwise.
    pub fn from_body(status: u16, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error"));

        let error_type = error
            .and_then(|e| e.get("type"))
            .and_then(|t| t.as_str())
            .map(str::to_string);

        let reason = match error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(e) => e
                .get("reason")
                .and_then(|r| r.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| e.to_string()),
            None if body.trim().is_empty() => "empty response body".to_string(),
            None => body.trim().to_string(),
        };

        Self {
            status,
            error_type,
            reason,
        }
    }

    /// The service reports that this API does not exist in its deployment
    /// flavour (serverless projects answer this way for cluster health and
    /// index stats).
    pub fn is_api_unavailable(&self) -> bool {
        self.status == 410 || self.error_type.as_deref() == Some("api_not_available_exception")
    }
}

/// The main error type of the crate.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Missing or out-of-range settings, raised before any connection attempt
    #[error("invalid configuration: {}", .0.join("; "))]
    Configuration(Vec<String>),

    /// Credentials were rejected by the service
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },

    /// The service could not be reached
    #[error("connection to {endpoint} failed: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    /// A single document failed validation
    #[error("document rejected: {0}")]
    Validation(#[from] ValidationError),

    /// A document inside a batch failed validation; nothing was submitted
    #[error("document at position {position} rejected: {source}")]
    InvalidBatchDocument {
        position: usize,
        #[source]
        source: ValidationError,
    },

    /// Any other failure while talking to the backend
    #[error("{context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl SearchError {
    pub fn backend<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        SearchError::Backend {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn connection<E>(endpoint: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        SearchError::Connection {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// True for both single-document and batch validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SearchError::Validation(_) | SearchError::InvalidBatchDocument { .. }
        )
    }

    /// The service's error payload, when this is a backend error caused by a
    /// non-2xx response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SearchError::Backend { source, .. } => source.downcast_ref::<ApiError>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_elasticsearch_envelope() {
        let body = r#"{"error":{"root_cause":[],"type":"index_not_found_exception","reason":"no such index [cuentos]"},"status":404}"#;
        let err = ApiError::from_body(404, body);
        assert_eq!(err.status, 404);
        assert_eq!(err.error_type.as_deref(), Some("index_not_found_exception"));
        assert_eq!(err.reason, "no such index [cuentos]");
        assert!(!err.is_api_unavailable());
    }

    #[test]
    fn test_api_error_from_plain_body() {
        let err = ApiError::from_body(502, "Bad Gateway\n");
        assert_eq!(err.error_type, None);
        assert_eq!(err.reason, "Bad Gateway");

        let empty = ApiError::from_body(500, "");
        assert_eq!(empty.reason, "empty response body");
    }

    #[test]
    fn test_api_unavailable_detection() {
        assert!(ApiError::from_body(410, "").is_api_unavailable());

        let body = r#"{"error":{"type":"api_not_available_exception","reason":"not available"},"status":400}"#;
        assert!(ApiError::from_body(400, body).is_api_unavailable());

        assert!(!ApiError::from_body(500, "boom").is_api_unavailable());
        assert!(!ApiError::from_body(503, "").is_api_unavailable());
    }

    #[test]
    fn test_backend_error_exposes_api_error() {
        let err = SearchError::backend("search failed", ApiError::from_body(400, "bad query"));
        let api = err.api_error().expect("api error attached");
        assert_eq!(api.status, 400);
        assert_eq!(err.to_string(), "search failed: HTTP 400: bad query");
    }

    #[test]
    fn test_configuration_error_lists_all_violations() {
        let err = SearchError::Configuration(vec!["a is missing".into(), "b is zero".into()]);
        assert_eq!(
            err.to_string(),
            "invalid configuration: a is missing; b is zero"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(SearchError::from(ValidationError::NotAnObject).is_validation());
        assert!(SearchError::InvalidBatchDocument {
            position: 3,
            source: ValidationError::MissingFields(vec!["date".into()]),
        }
        .is_validation());
        assert!(!SearchError::Authentication {
            reason: "nope".into()
        }
        .is_validation());
    }
}
