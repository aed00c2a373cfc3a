//! Per-request context handed to authorization predicates
//!
//! [`RequestContext`] is an owned snapshot of the request head. It is
//! extracted before the body is read, so predicates can inspect headers,
//! the URI, and any extensions inserted by upstream middleware (for example
//! verified token claims) without the handler having to know about them.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use http::{Extensions, HeaderMap, Method, Uri};

/// Snapshot of the request head
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    extensions: Extensions,
}

impl RequestContext {
    /// Create a context from its parts
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            extensions: Extensions::new(),
        }
    }

    /// Attach request extensions
    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// All request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A single header value, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Request extensions
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// A typed extension inserted by middleware
    pub fn extension<E: Send + Sync + 'static>(&self) -> Option<&E> {
        self.extensions.get::<E>()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            extensions: parts.extensions.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[derive(Debug, Clone, PartialEq)]
    struct Tenant(&'static str);

    #[tokio::test]
    async fn test_extract_from_parts() {
        let mut request = Request::builder()
            .method("PUT")
            .uri("/items/7?dry_run=true")
            .header("x-role", "admin")
            .body(())
            .unwrap();
        request.extensions_mut().insert(Tenant("acme"));
        let (mut parts, ()) = request.into_parts();

        let ctx = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(*ctx.method(), Method::PUT);
        assert_eq!(ctx.uri().path(), "/items/7");
        assert_eq!(ctx.header("x-role"), Some("admin"));
        assert_eq!(ctx.extension::<Tenant>(), Some(&Tenant("acme")));
    }

    #[test]
    fn test_missing_header() {
        let ctx = RequestContext::new(Method::GET, Uri::from_static("/"), HeaderMap::new());
        assert!(ctx.header("authorization").is_none());
        assert!(ctx.extension::<Tenant>().is_none());
    }
}
