//! API error types for dispatched operations
//!
//! Every non-success outcome of a resource handler is an [`ApiError`]. The
//! kind decides the status code; the response body is a small JSON object
//! that never carries collaborator error details.
//!
//! # Example
//!
//! ```rust
//! use acton_rest::handlers::{ApiError, ApiErrorKind, ApiOperation};
//!
//! let error = ApiError::not_found(ApiOperation::Get).with_resource("items");
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! assert_eq!(error.resource.as_deref(), Some("items"));
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Operation being dispatched when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing the whole collection
    List,
    /// Listing one page of the collection
    ListPaged,
    /// Getting a single entity by key
    Get,
    /// Searching with a filter body
    Search,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
    /// Listing a sub-collection of an entity
    SubEntity,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::ListPaged => write!(f, "list_paged"),
            Self::Get => write!(f, "get"),
            Self::Search => write!(f, "search"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::SubEntity => write!(f, "sub_entity"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Request body or page token could not be decoded
    BadRequest,
    /// Authorization predicate denied the action
    Unauthorized,
    /// Entity does not exist and the caller may know that
    NotFound,
    /// A collaborator function returned an error
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub fn error_code(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being dispatched
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Client-facing message
    pub message: String,
    /// Mount path of the resource involved
    pub resource: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            resource: None,
        }
    }

    /// Body or token could not be decoded
    pub fn bad_request(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::BadRequest, message)
    }

    /// Authorization denied
    ///
    /// The message is fixed so that a denial for a missing item and a denial
    /// for an existing item produce identical responses.
    pub fn unauthorized(operation: ApiOperation) -> Self {
        Self::new(operation, ApiErrorKind::Unauthorized, "Not authorized")
    }

    /// Entity not found
    pub fn not_found(operation: ApiOperation) -> Self {
        Self::new(operation, ApiErrorKind::NotFound, "Entity not found")
    }

    /// Internal error with a generic client-facing message
    pub fn internal(operation: ApiOperation) -> Self {
        Self::new(
            operation,
            ApiErrorKind::InternalError,
            "An internal error occurred",
        )
    }

    /// A collaborator function failed
    ///
    /// The cause is logged here and dropped; the caller only ever sees the
    /// generic internal error.
    pub fn collaborator_failure(
        operation: ApiOperation,
        resource: &str,
        cause: &anyhow::Error,
    ) -> Self {
        tracing::error!(
            operation = %operation,
            resource = %resource,
            error = %cause,
            "Collaborator function failed"
        );
        Self::internal(operation).with_resource(resource)
    }

    /// Attach the resource mount path
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref resource) = self.resource {
            write!(f, " [{}]", resource)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response body for API errors
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub(crate) error: String,
    pub(crate) code: String,
    pub(crate) status: u16,
    pub(crate) operation: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();
        let code = self.kind.error_code();

        // Internal errors are logged at their source with the cause.
        tracing::debug!(
            operation = %self.operation,
            kind = %self.kind,
            resource = ?self.resource,
            "API error: {}", self.message
        );

        let response = ApiErrorResponse {
            error: self.message,
            code,
            status: status.as_u16(),
            operation: self.operation.to_string(),
        };

        (status, Json(response)).into_response()
    }
}
