//! Authorization checkpoints
//!
//! Item-addressed operations go through [`locate`]; collection-level
//! operations go through [`authorize_collection`]. Both return the
//! [`ApiError`] to send when the request must stop.
//!
//! A missing item is only reported as missing after the predicate has been
//! asked about the action with no items. A caller who may not perform the
//! action gets the same 401 whether or not the key exists.

use crate::context::RequestContext;
use crate::resource::{Action, Resource};

use super::error::{ApiError, ApiOperation};

/// Look up `key` and authorize `action` on it
pub(crate) fn locate<T, D>(
    resource: &Resource<T, D>,
    ctx: &RequestContext,
    key: &str,
    action: Action,
    operation: ApiOperation,
) -> Result<T, ApiError> {
    let Some(item) = resource.find(key) else {
        if !resource.authorize(ctx, action, &[]) {
            return Err(denied(resource, action, operation));
        }
        tracing::debug!(resource = %resource.path(), %operation, "Entity not found");
        return Err(ApiError::not_found(operation).with_resource(resource.path()));
    };

    if !resource.authorize(ctx, action, std::slice::from_ref(&item)) {
        return Err(denied(resource, action, operation));
    }

    Ok(item)
}

/// Authorize an action that addresses no single item
pub(crate) fn authorize_collection<T, D>(
    resource: &Resource<T, D>,
    ctx: &RequestContext,
    action: Action,
    operation: ApiOperation,
) -> Result<(), ApiError> {
    if resource.authorize(ctx, action, &[]) {
        Ok(())
    } else {
        Err(denied(resource, action, operation))
    }
}

fn denied<T, D>(resource: &Resource<T, D>, action: Action, operation: ApiOperation) -> ApiError {
    tracing::warn!(
        resource = %resource.path(),
        %action,
        %operation,
        "Authorization denied"
    );
    ApiError::unauthorized(operation).with_resource(resource.path())
}
