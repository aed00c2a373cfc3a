//! Route resolution and router construction
//!
//! The route table of a resource depends only on which optional functions
//! its descriptor carries. [`Resource::routes`] computes that table and
//! [`Resource::into_router`] turns it into an [`axum::Router`]; nothing is
//! re-evaluated per request.
//!
//! | Method | Path | Present when |
//! |---|---|---|
//! | GET | `/` | always |
//! | GET | `/page/{token}` | always |
//! | POST | `/` | `create` is set |
//! | POST | `/filter` | `search` is set |
//! | GET | `/{id}/<sub_path>` | per sub-entity |
//! | GET | `/{id}` | always |
//! | PUT | `/{id}` | `mutate` is set |
//! | DELETE | `/{id}` | `delete` is set |
//!
//! Literal segments win over `{id}`, so items keyed `filter` or `page` get
//! extra routes from [`Resource::literal_key_routes`]: `GET`, `PUT`, and
//! `DELETE` on `/filter` when search is set, and `GET /page/<sub_path>` per
//! sub-entity.
//!
//! # Example
//!
//! ```rust
//! use acton_rest::handlers::Page;
//! use acton_rest::resource::Resource;
//! use acton_rest::routes::{register, Operation};
//! use axum::Router;
//!
//! let resource = Resource::<String, String>::builder("notes")
//!     .find(|key| Some(key.to_string()))
//!     .find_all(Vec::new)
//!     .find_all_paged(|page| Page::empty(page, 10))
//!     .to_dto(|note| note.clone())
//!     .delete(|note| Ok(note))
//!     .build()
//!     .unwrap();
//!
//! assert!(resource.routes().iter().any(|r| r.operation == Operation::Delete));
//!
//! let app: Router = register(Router::new(), resource);
//! ```

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post, put, MethodRouter},
    Json, Router,
};
use http::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::context::RequestContext;
use crate::handlers::operations;
use crate::resource::Resource;

const FILTER_SEGMENT: &str = "filter";
const PAGE_SEGMENT: &str = "page";

/// Operation served by a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /`
    ListAll,
    /// `GET /page/{token}`
    ListPaged,
    /// `POST /`
    Create,
    /// `POST /filter`
    Search,
    /// `GET /{id}/<sub_path>`, by declaration index
    SubEntity(usize),
    /// `GET /{id}`
    GetOne,
    /// `PUT /{id}`
    Update,
    /// `DELETE /{id}`
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListAll => write!(f, "list_all"),
            Self::ListPaged => write!(f, "list_paged"),
            Self::Create => write!(f, "create"),
            Self::Search => write!(f, "search"),
            Self::SubEntity(index) => write!(f, "sub_entity[{index}]"),
            Self::GetOne => write!(f, "get_one"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// One entry of a resource's route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    /// HTTP method
    pub method: Method,
    /// Path relative to the resource mount, in axum syntax
    pub path: String,
    /// Operation served
    pub operation: Operation,
}

impl RouteSpec {
    fn new(method: Method, path: impl Into<String>, operation: Operation) -> Self {
        Self {
            method,
            path: path.into(),
            operation,
        }
    }
}

impl<T, D> Resource<T, D> {
    /// Route table in registration order
    ///
    /// Sub-entity routes come before the single-item getter so that a
    /// literal sub path always takes precedence over an item key.
    pub fn routes(&self) -> Vec<RouteSpec> {
        let mut routes = vec![
            RouteSpec::new(Method::GET, "/", Operation::ListAll),
            RouteSpec::new(
                Method::GET,
                format!("/{PAGE_SEGMENT}/{{token}}"),
                Operation::ListPaged,
            ),
        ];

        if self.create.is_some() {
            routes.push(RouteSpec::new(Method::POST, "/", Operation::Create));
        }
        if self.search.is_some() {
            routes.push(RouteSpec::new(
                Method::POST,
                format!("/{FILTER_SEGMENT}"),
                Operation::Search,
            ));
        }

        for (index, sub_entity) in self.sub_entities().iter().enumerate() {
            routes.push(RouteSpec::new(
                Method::GET,
                format!("/{{id}}/{}", sub_entity.sub_path()),
                Operation::SubEntity(index),
            ));
        }

        routes.push(RouteSpec::new(Method::GET, "/{id}", Operation::GetOne));

        if self.mutate.is_some() {
            routes.push(RouteSpec::new(Method::PUT, "/{id}", Operation::Update));
        }
        if self.delete.is_some() {
            routes.push(RouteSpec::new(Method::DELETE, "/{id}", Operation::Delete));
        }

        routes
    }

    /// Item routes for keys equal to a literal segment of the table
    ///
    /// With search enabled, `filter` is a literal path and would otherwise
    /// hide the item keyed `filter` from `GET`, `PUT`, and `DELETE`. With
    /// sub-entities declared, `page/<sub_path>` would be taken for a page
    /// token. These routes serve such keys through the same handlers.
    pub fn literal_key_routes(&self) -> Vec<(&'static str, RouteSpec)> {
        let mut routes = Vec::new();

        if self.search.is_some() {
            let path = format!("/{FILTER_SEGMENT}");
            routes.push((
                FILTER_SEGMENT,
                RouteSpec::new(Method::GET, path.clone(), Operation::GetOne),
            ));
            if self.mutate.is_some() {
                routes.push((
                    FILTER_SEGMENT,
                    RouteSpec::new(Method::PUT, path.clone(), Operation::Update),
                ));
            }
            if self.delete.is_some() {
                routes.push((
                    FILTER_SEGMENT,
                    RouteSpec::new(Method::DELETE, path, Operation::Delete),
                ));
            }
        }

        for (index, sub_entity) in self.sub_entities().iter().enumerate() {
            routes.push((
                PAGE_SEGMENT,
                RouteSpec::new(
                    Method::GET,
                    format!("/{PAGE_SEGMENT}/{}", sub_entity.sub_path()),
                    Operation::SubEntity(index),
                ),
            ));
        }

        routes
    }
}

impl<T, D> Resource<T, D>
where
    T: Send + Sync + 'static,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Build a router serving this resource under `/<path>`
    ///
    /// The collection root answers on both `/<path>` and `/<path>/`.
    pub fn into_router<S>(self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mount = format!("/{}", self.path());
        let routes = self.routes();
        let literal_key_routes = self.literal_key_routes();

        let mut router: Router<Arc<Resource<T, D>>> = Router::new();
        for spec in routes {
            let method_router = method_router::<T, D>(spec.operation);
            if spec.path == "/" {
                router = router
                    .route(&mount, method_router.clone())
                    .route(&format!("{mount}/"), method_router);
            } else {
                router = router.route(&format!("{mount}{}", spec.path), method_router);
            }
        }

        for (key, spec) in literal_key_routes {
            if let Some(method_router) = keyed_method_router::<T, D>(spec.operation, key) {
                router = router.route(&format!("{mount}{}", spec.path), method_router);
            }
        }

        router.with_state(Arc::new(self))
    }
}

/// Merge a resource's routes into `router`
pub fn register<S, T, D>(router: Router<S>, resource: Resource<T, D>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let routes = resource.routes();
    tracing::info!(
        resource = %resource.path(),
        routes = routes.len(),
        "Registering REST resource"
    );
    for spec in &routes {
        tracing::debug!(
            resource = %resource.path(),
            method = %spec.method,
            path = %spec.path,
            operation = %spec.operation,
            "Route registered"
        );
    }

    router.merge(resource.into_router())
}

fn method_router<T, D>(operation: Operation) -> MethodRouter<Arc<Resource<T, D>>>
where
    T: Send + Sync + 'static,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    match operation {
        Operation::ListAll => get(operations::list_all::<T, D>),
        Operation::ListPaged => get(operations::list_paged::<T, D>),
        Operation::Create => post(operations::create::<T, D>),
        Operation::Search => post(operations::search::<T, D>),
        Operation::SubEntity(index) => get(
            move |State(resource): State<Arc<Resource<T, D>>>,
                  ctx: RequestContext,
                  Path(id): Path<String>| {
                operations::sub_entity(resource, ctx, id, index)
            },
        ),
        Operation::GetOne => get(operations::get_one::<T, D>),
        Operation::Update => put(operations::update::<T, D>),
        Operation::Delete => delete(operations::delete::<T, D>),
    }
}

/// Handlers for an item route whose key is fixed by the path
fn keyed_method_router<T, D>(
    operation: Operation,
    key: &'static str,
) -> Option<MethodRouter<Arc<Resource<T, D>>>>
where
    T: Send + Sync + 'static,
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let method_router = match operation {
        Operation::GetOne => get(
            move |state: State<Arc<Resource<T, D>>>, ctx: RequestContext| {
                operations::get_one(state, ctx, Path(key.to_string()))
            },
        ),
        Operation::Update => put(
            move |state: State<Arc<Resource<T, D>>>,
                  ctx: RequestContext,
                  payload: Result<Json<D>, JsonRejection>| {
                operations::update(state, ctx, Path(key.to_string()), payload)
            },
        ),
        Operation::Delete => delete(
            move |state: State<Arc<Resource<T, D>>>, ctx: RequestContext| {
                operations::delete(state, ctx, Path(key.to_string()))
            },
        ),
        Operation::SubEntity(index) => get(
            move |State(resource): State<Arc<Resource<T, D>>>, ctx: RequestContext| {
                operations::sub_entity(resource, ctx, key.to_string(), index)
            },
        ),
        Operation::ListAll | Operation::ListPaged | Operation::Create | Operation::Search => {
            return None
        }
    };
    Some(method_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Page;
    use crate::resource::{ResourceBuilder, SubEntity};

    fn base() -> ResourceBuilder<u32, u32> {
        Resource::builder("numbers")
            .find(|key| key.parse().ok())
            .find_all(Vec::new)
            .find_all_paged(|page| Page::empty(page, 10))
            .to_dto(|n| *n)
    }

    fn table(resource: &Resource<u32, u32>) -> Vec<(Method, String)> {
        resource
            .routes()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }

    #[test]
    fn test_minimal_routes() {
        let resource = base().build().unwrap();
        assert_eq!(
            table(&resource),
            vec![
                (Method::GET, "/".to_string()),
                (Method::GET, "/page/{token}".to_string()),
                (Method::GET, "/{id}".to_string()),
            ]
        );
    }

    #[test]
    fn test_full_routes_in_order() {
        let resource = base()
            .create(Ok)
            .search(|n| vec![n])
            .mutate(|_, n| Ok(n))
            .delete(Ok)
            .sub_entity(SubEntity::new("digits", |n: &u32| vec![*n % 10]))
            .build()
            .unwrap();

        let operations: Vec<Operation> = resource.routes().into_iter().map(|r| r.operation).collect();
        assert_eq!(
            operations,
            vec![
                Operation::ListAll,
                Operation::ListPaged,
                Operation::Create,
                Operation::Search,
                Operation::SubEntity(0),
                Operation::GetOne,
                Operation::Update,
                Operation::Delete,
            ]
        );
    }

    #[test]
    fn test_create_gated_independently_of_mutate() {
        let create_only = base().create(Ok).build().unwrap();
        let ops: Vec<_> = create_only.routes().into_iter().map(|r| r.operation).collect();
        assert!(ops.contains(&Operation::Create));
        assert!(!ops.contains(&Operation::Update));

        let mutate_only = base().mutate(|_, n| Ok(n)).build().unwrap();
        let ops: Vec<_> = mutate_only.routes().into_iter().map(|r| r.operation).collect();
        assert!(ops.contains(&Operation::Update));
        assert!(!ops.contains(&Operation::Create));
    }

    #[test]
    fn test_sub_entities_precede_get_one() {
        let resource = base()
            .sub_entity(SubEntity::new("digits", |n: &u32| vec![*n % 10]))
            .sub_entity(SubEntity::new("square", |n: &u32| vec![n * n]))
            .build()
            .unwrap();

        let paths: Vec<String> = resource.routes().into_iter().map(|r| r.path).collect();
        let get_one = paths.iter().position(|p| p == "/{id}").unwrap();
        let digits = paths.iter().position(|p| p == "/{id}/digits").unwrap();
        let square = paths.iter().position(|p| p == "/{id}/square").unwrap();
        assert!(digits < square);
        assert!(square < get_one);
    }

    #[test]
    fn test_literal_key_routes() {
        let minimal = base().build().unwrap();
        assert!(minimal.literal_key_routes().is_empty());

        let resource = base()
            .search(|n| vec![n])
            .delete(Ok)
            .sub_entity(SubEntity::new("digits", |n: &u32| vec![*n % 10]))
            .build()
            .unwrap();

        let keyed: Vec<(&str, Method, String, Operation)> = resource
            .literal_key_routes()
            .into_iter()
            .map(|(key, r)| (key, r.method, r.path, r.operation))
            .collect();
        assert_eq!(
            keyed,
            vec![
                ("filter", Method::GET, "/filter".to_string(), Operation::GetOne),
                ("filter", Method::DELETE, "/filter".to_string(), Operation::Delete),
                ("page", Method::GET, "/page/digits".to_string(), Operation::SubEntity(0)),
            ]
        );
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::ListAll.to_string(), "list_all");
        assert_eq!(Operation::SubEntity(2).to_string(), "sub_entity[2]");
        assert_eq!(Operation::Delete.to_string(), "delete");
    }
}
