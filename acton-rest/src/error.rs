//! Error types for resource construction, configuration, and serving
//!
//! Request-time failures are reported through
//! [`ApiError`](crate::handlers::ApiError); this module covers everything
//! that happens outside a single request.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// A resource descriptor failed validation at build time
    #[error("Invalid resource '{path}': {reason}")]
    InvalidResource {
        /// Mount path of the offending resource
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid resource error
    pub fn invalid_resource(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResource {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_resource_display() {
        let err = Error::invalid_resource("items", "missing find function");
        assert_eq!(
            err.to_string(),
            "Invalid resource 'items': missing find function"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }
}
