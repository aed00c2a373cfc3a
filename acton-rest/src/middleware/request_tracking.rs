//! Request tracking middleware
//!
//! Every request gets an ID (generated unless the client already sent one),
//! the ID is echoed on the response, and credentials are marked sensitive so
//! the trace layer never prints them. Authorization predicates usually read
//! exactly those credential headers, so masking them in logs matters here.

use axum::Router;
use http::HeaderName;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

use crate::config::RequestTrackingConfig;
use crate::error::{Error, Result};

/// Sensitive headers that should be masked in logs
pub const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Create a layer that assigns a UUID request ID under `header`
pub fn request_id_layer(header: HeaderName) -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(header, MakeRequestUuid)
}

/// Create a layer that copies the request ID under `header` onto the response
pub fn request_id_propagation_layer(header: HeaderName) -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(header)
}

/// Create a sensitive headers layer
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    let headers = SENSITIVE_HEADERS
        .iter()
        .copied()
        .map(HeaderName::from_static)
        .collect::<Vec<_>>();

    SetSensitiveRequestHeadersLayer::new(headers)
}

/// Apply the request tracking layers enabled in `config`
///
/// Returns an error when the configured request ID header is not a valid
/// header name.
pub fn apply<S>(router: Router<S>, config: &RequestTrackingConfig) -> Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let header = HeaderName::try_from(config.request_id_header.as_str()).map_err(|e| {
        Error::Internal(format!(
            "Invalid request ID header '{}': {}",
            config.request_id_header, e
        ))
    })?;

    let mut router = router;
    if config.mask_sensitive_headers {
        router = router.layer(sensitive_headers_layer());
    }
    if config.propagate_headers {
        router = router.layer(request_id_propagation_layer(header.clone()));
    }
    if config.request_id_enabled {
        router = router.layer(request_id_layer(header));
    }

    Ok(router)
}
