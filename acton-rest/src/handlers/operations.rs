//! Axum handlers for resource operations
//!
//! Each handler runs the same fixed sequence: decode input, pass the
//! checkpoint, call the collaborator function, convert to the transport
//! type, respond. Handlers share nothing but the immutable descriptor.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::resource::{Action, Resource};

use super::checkpoint::{authorize_collection, locate};
use super::error::{ApiError, ApiOperation};
use super::page::Page;

/// Body of a successful delete
pub const DELETED: &str = "deleted";

type Shared<T, D> = State<Arc<Resource<T, D>>>;

/// `GET /`
pub(crate) async fn list_all<T, D>(
    State(resource): Shared<T, D>,
    ctx: RequestContext,
) -> Result<Json<Vec<D>>, ApiError>
where
    T: Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
{
    authorize_collection(&resource, &ctx, Action::GetAll, ApiOperation::List)?;

    let items = resource.find_all();
    tracing::debug!(resource = %resource.path(), count = items.len(), "Listing entities");
    Ok(Json(items.iter().map(|item| resource.to_dto(item)).collect()))
}

/// `GET /page/{token}`
pub(crate) async fn list_paged<T, D>(
    State(resource): Shared<T, D>,
    ctx: RequestContext,
    Path(token): Path<String>,
) -> Result<Json<Page<D>>, ApiError>
where
    T: Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
{
    let token: i64 = token.parse().map_err(|_| {
        ApiError::bad_request(ApiOperation::ListPaged, format!("Invalid page token '{token}'"))
            .with_resource(resource.path())
    })?;

    authorize_collection(&resource, &ctx, Action::GetAll, ApiOperation::ListPaged)?;

    let page = resource.find_all_paged(token);
    tracing::debug!(resource = %resource.path(), page = token, count = page.items.len(), "Listing page");
    Ok(Json(page.map(|item| resource.to_dto(&item))))
}

/// `GET /{id}`
pub(crate) async fn get_one<T, D>(
    State(resource): Shared<T, D>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<D>, ApiError>
where
    T: Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
{
    let item = locate(&resource, &ctx, &id, Action::GetOne, ApiOperation::Get)?;
    Ok(Json(resource.to_dto(&item)))
}

/// `POST /filter`
pub(crate) async fn search<T, D>(
    State(resource): Shared<T, D>,
    ctx: RequestContext,
    payload: Result<Json<D>, JsonRejection>,
) -> Result<Json<Vec<D>>, ApiError>
where
    T: Send + Sync + 'static,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let filter = parse_body(&resource, payload, ApiOperation::Search)?;
    authorize_collection(&resource, &ctx, Action::GetAll, ApiOperation::Search)?;

    let Some(search) = resource.search.as_ref() else {
        return Err(unsupported(&resource, ApiOperation::Search));
    };
    let items = search(filter);
    tracing::debug!(resource = %resource.path(), count = items.len(), "Search matched");
    Ok(Json(items.iter().map(|item| resource.to_dto(item)).collect()))
}

/// `POST /`
pub(crate) async fn create<T, D>(
    State(resource): Shared<T, D>,
    ctx: RequestContext,
    payload: Result<Json<D>, JsonRejection>,
) -> Result<Json<D>, ApiError>
where
    T: Send + Sync + 'static,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let patch = parse_body(&resource, payload, ApiOperation::Create)?;
    authorize_collection(&resource, &ctx, Action::Create, ApiOperation::Create)?;

    let Some(create) = resource.create.as_ref() else {
        return Err(unsupported(&resource, ApiOperation::Create));
    };
    let item = create(patch).map_err(|e| {
        ApiError::collaborator_failure(ApiOperation::Create, resource.path(), &e)
    })?;

    tracing::info!(resource = %resource.path(), "Entity created");
    Ok(Json(resource.to_dto(&item)))
}

/// `PUT /{id}`
pub(crate) async fn update<T, D>(
    State(resource): Shared<T, D>,
    ctx: RequestContext,
    Path(id): Path<String>,
    payload: Result<Json<D>, JsonRejection>,
) -> Result<Json<D>, ApiError>
where
    T: Send + Sync + 'static,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let patch = parse_body(&resource, payload, ApiOperation::Update)?;
    let existing = locate(&resource, &ctx, &id, Action::Mutate, ApiOperation::Update)?;

    let Some(mutate) = resource.mutate.as_ref() else {
        return Err(unsupported(&resource, ApiOperation::Update));
    };
    let item = mutate(existing, patch).map_err(|e| {
        ApiError::collaborator_failure(ApiOperation::Update, resource.path(), &e)
    })?;

    tracing::info!(resource = %resource.path(), id = %id, "Entity updated");
    Ok(Json(resource.to_dto(&item)))
}

/// `DELETE /{id}`
pub(crate) async fn delete<T, D>(
    State(resource): Shared<T, D>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<&'static str, ApiError>
where
    T: Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    let existing = locate(&resource, &ctx, &id, Action::Delete, ApiOperation::Delete)?;

    let Some(delete) = resource.delete.as_ref() else {
        return Err(unsupported(&resource, ApiOperation::Delete));
    };
    delete(existing).map_err(|e| {
        ApiError::collaborator_failure(ApiOperation::Delete, resource.path(), &e)
    })?;

    tracing::info!(resource = %resource.path(), id = %id, "Entity deleted");
    Ok(DELETED)
}

/// `GET /{id}/<sub_path>` for the sub-entity at `index`
pub(crate) async fn sub_entity<T, D>(
    resource: Arc<Resource<T, D>>,
    ctx: RequestContext,
    id: String,
    index: usize,
) -> Result<Json<Value>, ApiError>
where
    T: Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    let parent = locate(&resource, &ctx, &id, Action::GetOne, ApiOperation::SubEntity)?;

    let Some(sub_entity) = resource.sub_entities().get(index) else {
        return Err(unsupported(&resource, ApiOperation::SubEntity));
    };
    let collection = sub_entity.collect(&parent).map_err(|e| {
        ApiError::collaborator_failure(ApiOperation::SubEntity, resource.path(), &anyhow::Error::from(e))
    })?;

    Ok(Json(collection))
}

fn parse_body<T, D>(
    resource: &Resource<T, D>,
    payload: Result<Json<D>, JsonRejection>,
    operation: ApiOperation,
) -> Result<D, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::warn!(
            resource = %resource.path(),
            %operation,
            error = %rejection.body_text(),
            "Error parsing body"
        );
        ApiError::bad_request(operation, rejection.body_text()).with_resource(resource.path())
    })
}

// Routes are only registered for capabilities that exist, so this is
// unreachable through the router.
fn unsupported<T, D>(resource: &Resource<T, D>, operation: ApiOperation) -> ApiError {
    tracing::error!(resource = %resource.path(), %operation, "Handler invoked without capability");
    ApiError::internal(operation).with_resource(resource.path())
}
